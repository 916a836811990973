// Component store module
// Reads and writes the component table as a flat JSON file

mod error;

pub use error::StoreError;

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::catalog::{ComponentRecord, LookupTable};
use crate::logger;

/// File-backed component table
///
/// Every operation goes to disk; nothing is cached here. The write is a plain
/// overwrite, so a crash mid-write can leave a truncated file. Readers treat
/// such a file as empty, but `add` and `delete` refuse to write over it.
#[derive(Debug, Clone)]
pub struct ComponentStore {
    path: PathBuf,
}

impl ComponentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table for reading; a missing or unparsable file yields an empty table
    pub async fn load(&self) -> LookupTable {
        match self.read_table().await {
            Ok(table) => table,
            Err(e) => {
                logger::log_warning(&format!("{e}, using an empty table"));
                LookupTable::new()
            }
        }
    }

    /// Load the table for a rewrite
    ///
    /// Only a missing or blank file counts as empty. Anything else that cannot
    /// be parsed is an error, so the caller never replaces records it could
    /// not see.
    async fn read_table(&self) -> Result<LookupTable, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                logger::log_warning(&format!(
                    "Component file {} not found, starting from an empty table",
                    self.path.display()
                ));
                return Ok(LookupTable::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(LookupTable::new());
        }

        let table: LookupTable =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let unreadable: Vec<&str> = table.unreadable_keys().collect();
        if !unreadable.is_empty() {
            logger::log_warning(&format!(
                "{}: entries kept as-is but not matchable: {}",
                self.path.display(),
                unreadable.join(", ")
            ));
        }
        Ok(table)
    }

    /// Overwrite the file with the table, 4-space indented, non-ASCII kept literal
    pub async fn save(&self, table: &LookupTable) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        table.serialize(&mut serializer)?;

        fs::write(&self.path, buf)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }

    /// Add a record under a new key; an existing key is refused and nothing is written
    pub async fn add(&self, key: &str, record: ComponentRecord) -> Result<(), StoreError> {
        let mut table = self.read_table().await?;
        if !table.insert(key, record) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }
        self.save(&table).await
    }

    /// Delete a record; a missing key is refused and nothing is written
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut table = self.read_table().await?;
        if !table.remove(key) {
            return Err(StoreError::MissingKey(key.to_string()));
        }
        self.save(&table).await
    }
}
