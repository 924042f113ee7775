use crate::domain::model::{
    EnrichmentResult, PostalCodeRecord, RecordOutcome, RunTally, UpsertOutcome,
};
use crate::domain::ports::{FetchError, PostalCodeLookup, PostalCodeStore, RateLimiter};
use crate::domain::postal_code::NormalizedPostalCode;

/// Normalize → fetch → upsert for each input row, one row at a time.
///
/// Per-row faults become a [`RecordOutcome`]; nothing here aborts a pass.
pub struct EnrichmentPipeline<L, S, R> {
    lookup: L,
    store: S,
    limiter: R,
    skip_known: bool,
}

impl<L, S, R> EnrichmentPipeline<L, S, R>
where
    L: PostalCodeLookup,
    S: PostalCodeStore,
    R: RateLimiter,
{
    pub fn new(lookup: L, store: S, limiter: R) -> Self {
        Self {
            lookup,
            store,
            limiter,
            skip_known: false,
        }
    }

    /// Skip the API call for codes the store already holds.
    pub fn with_skip_known(mut self, skip_known: bool) -> Self {
        self.skip_known = skip_known;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn run(&self, records: &[PostalCodeRecord]) -> RunTally {
        let mut tally = RunTally::default();
        for record in records {
            let outcome = self.process(record).await;
            tally.record(&outcome);
        }
        tally
    }

    pub async fn process(&self, record: &PostalCodeRecord) -> RecordOutcome {
        let postal_code = match NormalizedPostalCode::parse(&record.raw) {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("⚠️ Line {}: {}", record.line, e);
                return RecordOutcome::Rejected {
                    line: record.line,
                    raw: record.raw.clone(),
                };
            }
        };
        tracing::debug!("Line {}: formatted postal code {}", record.line, postal_code);

        if self.skip_known && self.is_known(&postal_code) {
            tracing::info!("⏭️ {} already stored, skipping API call", postal_code);
            return RecordOutcome::SkippedKnown(postal_code);
        }

        let fetched = self.lookup.fetch(&postal_code).await;
        let outcome = self.persist(postal_code, fetched);
        self.limiter.wait().await;
        outcome
    }

    fn is_known(&self, postal_code: &NormalizedPostalCode) -> bool {
        match self.store.lookup(postal_code) {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!("Could not check store for {}: {}", postal_code, e);
                false
            }
        }
    }

    fn persist(
        &self,
        postal_code: NormalizedPostalCode,
        fetched: Result<EnrichmentResult, FetchError>,
    ) -> RecordOutcome {
        let result = match fetched {
            Ok(result) => result,
            Err(FetchError::Empty) => {
                tracing::warn!("No data returned by the API for {}", postal_code);
                return RecordOutcome::EmptyResponse(postal_code);
            }
            Err(e) => {
                tracing::error!("❌ Lookup failed for {}: {}", postal_code, e);
                return RecordOutcome::FetchFailed {
                    postal_code,
                    reason: e.to_string(),
                };
            }
        };

        tracing::info!(
            "{}: municipality {}, district {}",
            postal_code,
            result.municipality,
            result.district
        );

        match self.store.upsert_if_absent(&result) {
            Ok(UpsertOutcome::Inserted) => RecordOutcome::Inserted(postal_code),
            Ok(UpsertOutcome::AlreadyPresent) => RecordOutcome::AlreadyPresent(postal_code),
            Err(e) => {
                tracing::error!("❌ Could not store {}: {}", postal_code, e);
                RecordOutcome::StoreFailed {
                    postal_code,
                    reason: e.to_string(),
                }
            }
        }
    }
}
