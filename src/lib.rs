pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{Cli, Command};
pub use crate::config::TomlConfig;

pub use crate::adapters::{CsvSource, CttClient, SqliteStore};
pub use crate::core::{
    etl::EtlEngine,
    lookup::{resolve, LookupOutcome},
    pipeline::EnrichmentPipeline,
    throttle::{FixedDelay, NoDelay},
};
pub use crate::domain::postal_code::{NormalizedPostalCode, RejectedFormat};
pub use crate::utils::error::{EtlError, Result};
