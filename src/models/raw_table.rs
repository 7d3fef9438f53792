//! Raw tabular input as handed over by the ingestion layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An untyped table: a header plus rows of JSON cells keyed by column name.
///
/// `columns` is authoritative for schema checks; a row may omit keys for
/// cells that were blank in the source file.
///
/// # Example
///
/// ```
/// use absence_rating::models::RawTable;
/// use serde_json::json;
///
/// let table = RawTable::from_rows(
///     &["employee_id", "period_id"],
///     vec![vec![json!("E1"), json!("2021-2022")]],
/// );
/// assert!(table.has_column("period_id"));
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names in source order.
    pub columns: Vec<String>,
    /// Rows keyed by column name.
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

impl RawTable {
    /// Creates an empty table with the given header.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from positional rows. Extra cells beyond the header are dropped.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns.iter().copied());
        for cells in rows {
            table.push_cells(cells);
        }
        table
    }

    /// Appends a positional row.
    pub fn push_cells(&mut self, cells: Vec<Value>) {
        let row = self
            .columns
            .iter()
            .cloned()
            .zip(cells)
            .collect::<Map<String, Value>>();
        self.rows.push(row);
    }

    /// Returns true if the header contains `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
