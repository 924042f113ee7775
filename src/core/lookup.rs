use crate::domain::model::StoredRecord;
use crate::domain::ports::PostalCodeStore;
use crate::domain::postal_code::NormalizedPostalCode;
use crate::utils::error::Result;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(StoredRecord),
    NotFound { query: String },
}

/// Resolves one user-supplied code against the store only.
pub fn resolve<S: PostalCodeStore>(store: &S, input: &str) -> Result<LookupOutcome> {
    let postal_code = match NormalizedPostalCode::parse(input) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("{}", e);
            return Ok(LookupOutcome::NotFound {
                query: input.trim().to_string(),
            });
        }
    };

    Ok(match store.lookup(&postal_code)? {
        Some(record) => LookupOutcome::Found(record),
        None => LookupOutcome::NotFound {
            query: input.trim().to_string(),
        },
    })
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Found(record) => {
                writeln!(f, "Código Postal: {}", record.postal_code)?;
                writeln!(f, "Concelho: {}", record.municipality)?;
                write!(f, "Distrito: {}", record.district)
            }
            LookupOutcome::NotFound { query } => {
                write!(f, "Postal code {} not found in the database.", query)
            }
        }
    }
}
