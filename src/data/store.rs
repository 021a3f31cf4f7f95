//! SQLite dataset store
//!
//! Holds the assembled training table. Each write replaces the table for
//! its season span inside one transaction, so readers see either the old
//! table or the complete new one.

use super::dataset::Dataset;
use crate::{FieldValue, GridironError, Result};
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

/// Columns downstream training scripts depend on
pub const KEY_COLUMNS: [&str; 4] = ["Home-Team-Win", "OU-Cover", "Score", "TEAM_NAME"];

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Int(v) => ToSqlOutput::from(*v),
            FieldValue::Real(v) => ToSqlOutput::from(*v),
            FieldValue::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

/// Outcome of a dataset write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistSummary {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
}

/// Shape of one stored table
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    /// (column name, declared type)
    pub columns: Vec<(String, String)>,
    pub row_count: usize,
    /// Which of [`KEY_COLUMNS`] the table carries
    pub key_columns: Vec<&'static str>,
}

/// Dataset database connection and operations
pub struct DatasetStore {
    conn: Connection,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl DatasetStore {
    /// Open or create the dataset database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(DatasetStore {
            conn: Connection::open(path)?,
        })
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(DatasetStore {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Table name for a season span, e.g. `nfl_dataset_2019-2024`
    pub fn table_name(seasons: &[u16]) -> String {
        let min = seasons.iter().min().copied().unwrap_or_default();
        let max = seasons.iter().max().copied().unwrap_or_default();
        format!("nfl_dataset_{}-{}", min, max)
    }

    /// Replace the table for the `seasons` span with the dataset's rows.
    ///
    /// `seasons` is the planned season list, so the name does not depend on
    /// which seasons happened to produce rows. An empty list falls back to
    /// the seasons present in the dataset.
    pub fn replace(&mut self, dataset: &Dataset, seasons: &[u16]) -> Result<PersistSummary> {
        if dataset.is_empty() {
            return Err(GridironError::NothingProduced {
                seasons: seasons.to_vec(),
            });
        }

        let table = if seasons.is_empty() {
            Self::table_name(&dataset.seasons())
        } else {
            Self::table_name(seasons)
        };
        let names = dataset.column_names();
        let types: Vec<&'static str> = dataset
            .records()
            .first()
            .map(|r| r.values().iter().map(FieldValue::sql_type).collect())
            .unwrap_or_default();

        let column_defs: Vec<String> = names
            .iter()
            .zip(types.iter())
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
            .collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns});",
            table = quote_ident(&table),
            columns = column_defs.join(", "),
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(&table),
                placeholders.join(", ")
            ))?;
            for record in dataset.records() {
                stmt.execute(params_from_iter(record.values().iter()))?;
            }
        }
        tx.commit()?;

        log::info!(
            "Wrote {} rows x {} columns to table {}",
            dataset.len(),
            names.len(),
            table
        );

        Ok(PersistSummary {
            table,
            rows: dataset.len(),
            columns: names.len(),
        })
    }

    /// Names of all tables, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Columns, row count and key-column coverage of one table
    pub fn describe_table(&self, table: &str) -> Result<TableInfo> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let row_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;

        let key_columns = KEY_COLUMNS
            .iter()
            .copied()
            .filter(|key| columns.iter().any(|(name, _)| name == key))
            .collect();

        Ok(TableInfo {
            name: table.to_string(),
            columns,
            row_count: row_count as usize,
            key_columns,
        })
    }

    /// Describe every table in the store
    pub fn describe(&self) -> Result<Vec<TableInfo>> {
        self.tables()?
            .iter()
            .map(|table| self.describe_table(table))
            .collect()
    }
}
