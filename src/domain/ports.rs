use crate::domain::model::{EnrichmentResult, StoredRecord, UpsertOutcome};
use crate::domain::postal_code::NormalizedPostalCode;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn input_path(&self) -> &Path;
    fn input_column(&self) -> &str;
    fn input_delimiter(&self) -> u8;
    fn db_path(&self) -> &Path;
    fn request_delay(&self) -> Duration;
    fn skip_known(&self) -> bool;
}

/// Per-request failure of the lookup service. Never fatal to a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API returned no data")]
    Empty,

    #[error("API responded with status {status}")]
    Status { status: u16 },

    #[error("unexpected payload format: {payload}")]
    UnexpectedFormat { payload: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_empty(&self) -> bool {
        matches!(self, FetchError::Empty)
    }
}

#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    async fn fetch(
        &self,
        postal_code: &NormalizedPostalCode,
    ) -> std::result::Result<EnrichmentResult, FetchError>;
}

/// Durable table of enriched postal codes keyed by code.
pub trait PostalCodeStore: Send {
    fn ensure_schema(&self) -> Result<()>;
    fn upsert_if_absent(&self, record: &EnrichmentResult) -> Result<UpsertOutcome>;
    fn lookup(&self, postal_code: &NormalizedPostalCode) -> Result<Option<StoredRecord>>;
    fn count(&self) -> Result<u64>;
}

/// Pacing applied after every call to the lookup service.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn wait(&self);
}
