//! SQLite-backed postal code store.

use crate::domain::model::{EnrichmentResult, StoredRecord, UpsertOutcome};
use crate::domain::ports::PostalCodeStore;
use crate::domain::postal_code::NormalizedPostalCode;
use crate::utils::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS codigos_postais (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo_postal TEXT UNIQUE,
    concelho TEXT,
    distrito TEXT
)";

/// Owns the connection; it is closed when the store is dropped.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the table exists.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            conn: Connection::open(db_path)?,
        };
        store.ensure_schema()?;

        info!(
            "Postal code store ready at {}: {} rows",
            db_path.display(),
            store.count()?
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.ensure_schema()?;
        Ok(store)
    }
}

impl PostalCodeStore for SqliteStore {
    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute(CREATE_TABLE, [])?;
        Ok(())
    }

    fn upsert_if_absent(&self, record: &EnrichmentResult) -> Result<UpsertOutcome> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO codigos_postais (codigo_postal, concelho, distrito)
             VALUES (?1, ?2, ?3)",
            params![
                record.postal_code.as_str(),
                record.municipality,
                record.district
            ],
        )?;

        let outcome = if changed == 0 {
            UpsertOutcome::AlreadyPresent
        } else {
            UpsertOutcome::Inserted
        };
        debug!("Upsert {} -> {:?}", record.postal_code, outcome);
        Ok(outcome)
    }

    fn lookup(&self, postal_code: &NormalizedPostalCode) -> Result<Option<StoredRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, codigo_postal, concelho, distrito
             FROM codigos_postais WHERE codigo_postal = ?1",
        )?;
        let record = stmt
            .query_row(params![postal_code.as_str()], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    postal_code: row.get(1)?,
                    municipality: row.get(2)?,
                    district: row.get(3)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM codigos_postais", [], |r| r.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(raw: &str, municipality: &str, district: &str) -> EnrichmentResult {
        EnrichmentResult {
            postal_code: NormalizedPostalCode::parse(raw).unwrap(),
            municipality: municipality.to_string(),
            district: district.to_string(),
        }
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_never_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store
            .upsert_if_absent(&result("1000000", "Lisboa", "Lisboa"))
            .unwrap();
        let second = store
            .upsert_if_absent(&result("1000-000", "Sintra", "Outro"))
            .unwrap();

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::AlreadyPresent);
        assert_eq!(store.count().unwrap(), 1);

        let stored = store
            .lookup(&NormalizedPostalCode::parse("1000000").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.municipality, "Lisboa");
        assert_eq!(stored.district, "Lisboa");
    }

    #[test]
    fn test_lookup_missing_code() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing = store
            .lookup(&NormalizedPostalCode::parse("9999-999").unwrap())
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_ids_are_assigned_in_insert_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_if_absent(&result("1000000", "Lisboa", "Lisboa")).unwrap();
        store.upsert_if_absent(&result("2000123", "Leiria", "Leiria")).unwrap();

        let first = store.lookup(&"1000-000".parse().unwrap()).unwrap().unwrap();
        let second = store.lookup(&"2000-123".parse().unwrap()).unwrap().unwrap();
        assert!(first.id < second.id);
        assert_eq!(second.postal_code, "2000-123");
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("codigos_postais.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.upsert_if_absent(&result("4000123", "Porto", "Porto")).unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let stored = store.lookup(&"4000123".parse().unwrap()).unwrap().unwrap();
        assert_eq!(stored.municipality, "Porto");
    }
}
