pub mod etl;
pub mod lookup;
pub mod pipeline;
pub mod throttle;

pub use crate::domain::model::{PostalCodeRecord, RecordOutcome, RunReport, RunTally};
pub use crate::domain::ports::{ConfigProvider, PostalCodeLookup, PostalCodeStore, RateLimiter};
pub use crate::utils::error::Result;
