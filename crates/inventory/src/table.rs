//! Keyed table loader.
//!
//! Reads a headerless comma-separated source into a map from one key column
//! to the full row. Rows keep the order in which their key first appeared;
//! a repeated key replaces the stored row (last occurrence wins).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::StocktakeError;

/// Column holding the item id in every input source.
pub const DEFAULT_KEY_INDEX: usize = 0;

/// A row as read from the source, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: u64,
    pub fields: Vec<String>,
}

impl SourceRow {
    /// Field `index` of the row, or `MalformedRow` naming `source`.
    pub fn field(&self, source: &str, index: usize) -> Result<&str, StocktakeError> {
        self.fields
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| StocktakeError::MalformedRow {
                source: source.to_string(),
                line: self.line,
                expected: index + 1,
                found: self.fields.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyedTable {
    source: String,
    index: HashMap<String, usize>,
    rows: Vec<(String, SourceRow)>,
}

impl KeyedTable {
    /// Load `path`, keying each row by column `key_index`.
    pub fn load(path: &Path, key_index: usize) -> Result<Self, StocktakeError> {
        let file = std::fs::File::open(path).map_err(|e| StocktakeError::SourceNotFound {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let table = Self::from_reader(&path.display().to_string(), file, key_index)?;
        log::debug!("loaded {} keyed row(s) from {}", table.len(), table.source);
        Ok(table)
    }

    /// Parse rows from any reader. `source` labels error messages.
    pub fn from_reader<R: Read>(
        source: &str,
        reader: R,
        key_index: usize,
    ) -> Result<Self, StocktakeError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = KeyedTable {
            source: source.to_string(),
            ..Default::default()
        };

        for result in reader.records() {
            let record = result.map_err(|e| StocktakeError::Csv {
                source: source.to_string(),
                line: e.position().map(|p| p.line()),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row = SourceRow {
                line,
                fields: record.iter().map(|f| f.to_string()).collect(),
            };
            let key = row.field(source, key_index)?.to_string();
            table.insert(key, row);
        }

        Ok(table)
    }

    fn insert(&mut self, key: String, row: SourceRow) {
        match self.index.get(&key) {
            Some(&pos) => self.rows[pos].1 = row,
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push((key, row));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&SourceRow> {
        self.index.get(key).map(|&pos| &self.rows[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Label of the source this table was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in order of first key appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceRow)> {
        self.rows.iter().map(|(k, r)| (k.as_str(), r))
    }
}
