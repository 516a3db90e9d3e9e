// src/table/mod.rs
pub mod summary;
pub mod value;

pub use summary::ColumnSummary;
pub use value::{Value, UNKNOWN};

use crate::error::{PipelineError, Result};
use serde_json::Map;
use std::collections::HashMap;

/// Rows × named columns. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from already-aligned rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from JSON objects. Columns are the union of keys in
    /// first-seen order; a record lacking a key gets `Null` there.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Map<String, serde_json::Value>>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sparse: Vec<Vec<(usize, Value)>> = Vec::new();

        for record in records {
            let mut cells = Vec::with_capacity(record.len());
            for (key, val) in record {
                let idx = match index.get(&key) {
                    Some(&i) => i,
                    None => {
                        let i = columns.len();
                        index.insert(key.clone(), i);
                        columns.push(key);
                        i
                    }
                };
                cells.push((idx, Value::from(val)));
            }
            sparse.push(cells);
        }

        let width = columns.len();
        let rows = sparse
            .into_iter()
            .map(|cells| {
                let mut row = vec![Value::Null; width];
                for (i, v) in cells {
                    row[i] = v;
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// True when either axis has length zero.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Rename `from` to `to`. Returns `Ok(false)` when `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<bool> {
        let Some(idx) = self.column_index(from) else {
            return Ok(false);
        };
        if from != to && self.has_column(to) {
            return Err(PipelineError::ColumnCollision {
                column: to.to_string(),
            });
        }
        self.columns[idx] = to.to_string();
        Ok(true)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<String> {
        &mut self.columns
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> Map<String, serde_json::Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn ragged_records_take_the_union_of_keys() {
        let t = Table::from_records(vec![
            obj(json!({"id": 1, "name": "Ruth"})),
            obj(json!({"id": 2, "email": "boaz@example.org"})),
        ]);
        assert_eq!(t.columns(), ["id", "name", "email"]);
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.rows()[0][2], Value::Null);
        assert_eq!(t.rows()[1][1], Value::Null);
        assert_eq!(t.rows()[1][2], Value::from("boaz@example.org"));
    }

    #[test]
    fn new_rejects_rows_of_the_wrong_width() {
        let err = Table::new(vec!["a".into()], vec![vec![Value::Int(1), Value::Int(2)]])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RaggedRow {
                row: 0,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn rename_is_noop_for_absent_column_and_rejects_collisions() {
        let mut t = Table::new(
            vec!["id".into(), "event_id".into()],
            vec![vec![Value::Int(1), Value::Int(1)]],
        )
        .unwrap();
        assert!(!t.rename_column("missing", "x").unwrap());
        assert!(matches!(
            t.rename_column("id", "event_id"),
            Err(PipelineError::ColumnCollision { .. })
        ));
        assert!(t.rename_column("id", "key").unwrap());
        assert_eq!(t.columns(), ["key", "event_id"]);
    }

    #[test]
    fn empty_table_is_empty() {
        assert!(Table::empty().is_empty());
        assert!(Table::from_records(Vec::new()).is_empty());
        let no_cols = Table::from_records(vec![Map::new()]);
        assert_eq!(no_cols.shape(), (1, 0));
        assert!(no_cols.is_empty());
    }
}
