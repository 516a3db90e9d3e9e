// src/table/summary.rs
use super::{Table, Value};
use std::collections::HashMap;
use tracing::info;

/// Per-column profile: inferred type, non-null count, distinct values and
/// the most frequent value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: &'static str,
    pub non_null: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl Table {
    /// Profile every column. Null and `NullDate` cells are not counted.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let mut counts: HashMap<&Value, usize> = HashMap::new();
                // first-seen order breaks frequency ties
                let mut order: Vec<&Value> = Vec::new();
                let mut dtype: Option<&'static str> = None;

                for row in self.rows() {
                    let v = &row[idx];
                    if matches!(v, Value::Null | Value::NullDate) {
                        continue;
                    }
                    dtype = match dtype {
                        None => Some(v.kind()),
                        Some(d) if d == v.kind() => Some(d),
                        Some(_) => Some("mixed"),
                    };
                    let c = counts.entry(v).or_insert(0);
                    if *c == 0 {
                        order.push(v);
                    }
                    *c += 1;
                }

                let mut top: Option<(&Value, usize)> = None;
                for v in order {
                    let n = counts[v];
                    if top.map_or(true, |(_, best)| n > best) {
                        top = Some((v, n));
                    }
                }

                ColumnSummary {
                    name: name.clone(),
                    dtype: dtype.unwrap_or("null"),
                    non_null: counts.values().sum(),
                    unique: counts.len(),
                    top: top.map(|(v, _)| v.to_string()),
                    freq: top.map_or(0, |(_, n)| n),
                }
            })
            .collect()
    }

    /// Emit the shape, column list and per-column profile at `info`.
    pub fn log_summary(&self, label: &str) {
        let (rows, columns) = self.shape();
        info!(table = label, rows, columns, "shape");
        info!(table = label, columns = ?self.columns(), "columns");
        for s in self.describe() {
            info!(
                table = label,
                column = %s.name,
                dtype = s.dtype,
                non_null = s.non_null,
                unique = s.unique,
                top = s.top.as_deref().unwrap_or(""),
                freq = s.freq,
                "describe"
            );
        }
    }
}
