use crate::adapters::csv_source::CsvSource;
use crate::core::pipeline::EnrichmentPipeline;
use crate::domain::model::RunReport;
use crate::domain::ports::{PostalCodeLookup, PostalCodeStore, RateLimiter};
use crate::utils::error::Result;
use chrono::Utc;

/// Reads the input, runs every row through the pipeline and reports.
pub struct EtlEngine<L, S, R> {
    source: CsvSource,
    pipeline: EnrichmentPipeline<L, S, R>,
}

impl<L, S, R> EtlEngine<L, S, R>
where
    L: PostalCodeLookup,
    S: PostalCodeStore,
    R: RateLimiter,
{
    pub fn new(source: CsvSource, pipeline: EnrichmentPipeline<L, S, R>) -> Self {
        Self { source, pipeline }
    }

    pub fn pipeline(&self) -> &EnrichmentPipeline<L, S, R> {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> EnrichmentPipeline<L, S, R> {
        self.pipeline
    }

    /// Input errors are returned before any row is processed.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        tracing::info!("🚀 Starting enrichment of {}", self.source.path().display());

        let records = self.source.read()?;
        let tally = self.pipeline.run(&records).await;
        let stored_rows = self.pipeline.store().count()?;

        let report = RunReport {
            tally,
            stored_rows,
            started_at,
            finished_at: Utc::now(),
        };
        log_summary(&report);
        Ok(report)
    }
}

fn log_summary(report: &RunReport) {
    let tally = &report.tally;
    tracing::info!("✅ Enrichment finished in {}s", report.elapsed().num_seconds());
    tracing::info!("Rows in table 'codigos_postais': {}", report.stored_rows);
    tracing::info!("Postal codes in input: {}", tally.total);
    tracing::info!(
        "Inserted: {}, already stored: {}, skipped as known: {}",
        tally.inserted,
        tally.already_present,
        tally.skipped_known
    );
    tracing::info!("Postal codes not saved: {}", tally.not_saved());
    tracing::info!("  reason - invalid format: {}", tally.rejected_format);
    tracing::info!("  reason - empty API response: {}", tally.empty_response);
    tracing::info!("  reason - other errors: {}", tally.other_errors);
}
