// Adapters layer: concrete implementations for external systems (input file, lookup API, database).

pub mod csv_source;
pub mod ctt_client;
pub mod sqlite_store;

pub use csv_source::CsvSource;
pub use ctt_client::CttClient;
pub use sqlite_store::SqliteStore;
