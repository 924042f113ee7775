use crate::domain::postal_code::NormalizedPostalCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored when the lookup API omits a field.
pub const NOT_AVAILABLE: &str = "N/A";

/// One data row of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCodeRecord {
    /// 1-based data row index, header excluded.
    pub line: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub postal_code: NormalizedPostalCode,
    pub municipality: String,
    pub district: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub postal_code: String,
    pub municipality: String,
    pub district: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Where a single input row ended up after one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted(NormalizedPostalCode),
    AlreadyPresent(NormalizedPostalCode),
    SkippedKnown(NormalizedPostalCode),
    Rejected { line: usize, raw: String },
    EmptyResponse(NormalizedPostalCode),
    FetchFailed {
        postal_code: NormalizedPostalCode,
        reason: String,
    },
    StoreFailed {
        postal_code: NormalizedPostalCode,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTally {
    pub total: usize,
    pub inserted: usize,
    pub already_present: usize,
    pub skipped_known: usize,
    pub rejected_format: usize,
    pub empty_response: usize,
    pub other_errors: usize,
}

impl RunTally {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.total += 1;
        match outcome {
            RecordOutcome::Inserted(_) => self.inserted += 1,
            RecordOutcome::AlreadyPresent(_) => self.already_present += 1,
            RecordOutcome::SkippedKnown(_) => self.skipped_known += 1,
            RecordOutcome::Rejected { .. } => self.rejected_format += 1,
            RecordOutcome::EmptyResponse(_) => self.empty_response += 1,
            RecordOutcome::FetchFailed { .. } | RecordOutcome::StoreFailed { .. } => {
                self.other_errors += 1
            }
        }
    }

    /// Rows that did not end up in the store during this pass.
    pub fn not_saved(&self) -> usize {
        self.rejected_format + self.empty_response + self.other_errors
    }
}

impl FromIterator<RecordOutcome> for RunTally {
    fn from_iter<I: IntoIterator<Item = RecordOutcome>>(iter: I) -> Self {
        let mut tally = RunTally::default();
        for outcome in iter {
            tally.record(&outcome);
        }
        tally
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub tally: RunTally,
    pub stored_rows: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Postal codes in input:      {}", self.tally.total)?;
        writeln!(f, "Inserted:                   {}", self.tally.inserted)?;
        writeln!(f, "Already stored:             {}", self.tally.already_present)?;
        if self.tally.skipped_known > 0 {
            writeln!(f, "Skipped (known):            {}", self.tally.skipped_known)?;
        }
        writeln!(f, "Not saved:                  {}", self.tally.not_saved())?;
        writeln!(f, "  - invalid format:         {}", self.tally.rejected_format)?;
        writeln!(f, "  - empty API response:     {}", self.tally.empty_response)?;
        writeln!(f, "  - other errors:           {}", self.tally.other_errors)?;
        write!(f, "Rows in codigos_postais:    {}", self.stored_rows)
    }
}
