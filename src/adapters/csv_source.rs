use crate::domain::model::PostalCodeRecord;
use crate::utils::error::{EtlError, Result};
use std::path::PathBuf;

const PREVIEW_ROWS: usize = 5;

/// Reads candidate postal codes from one column of a delimited file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    column: String,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            column: column.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<PostalCodeRecord>> {
        if !self.path.exists() {
            return Err(EtlError::SourceNotFound {
                path: self.path.display().to_string(),
            });
        }

        tracing::info!("📥 Reading postal codes from {}", self.path.display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        tracing::info!("Columns in input: {:?}", headers);

        let column_index = headers
            .iter()
            .position(|h| h == &self.column)
            .ok_or_else(|| EtlError::SchemaError {
                column: self.column.clone(),
                available: headers.clone(),
            })?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            if index < PREVIEW_ROWS {
                tracing::info!("  row {}: {}", index + 1, row.iter().collect::<Vec<_>>().join(" | "));
            }
            records.push(PostalCodeRecord {
                line: index + 1,
                raw: row.get(column_index).unwrap_or_default().to_string(),
            });
        }

        tracing::info!("📊 Read {} candidate postal codes", records.len());
        Ok(records)
    }
}
