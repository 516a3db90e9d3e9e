// src/process/mod.rs
pub mod date_parser;

use crate::table::{Table, Value, UNKNOWN};
use std::collections::HashSet;
use tracing::debug;

/// Column that gets date parsing.
pub const DATE_COLUMN: &str = "date";

/// Counters collected while normalizing one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub stringified_columns: Vec<String>,
    pub nulls_filled: usize,
    pub unparseable_dates: usize,
    pub renamed_columns: usize,
    pub duplicates_removed: usize,
}

/// Clean a freshly fetched table. See [`normalize_with_stats`].
pub fn normalize(table: Table) -> Table {
    normalize_with_stats(table).0
}

/// Clean a table, in this order:
/// 1) stringify every compound cell in columns that hold any
/// 2) fill nulls with `"Unknown"`, whatever the column type
/// 3) lower-case column names
/// 4) parse the column literally named `date`, unparseable cells become
///    `NullDate`
/// 5) drop full-row duplicates, first occurrence wins
///
/// Dedup runs last so a second pass finds nothing left to change.
#[tracing::instrument(level = "debug", skip(table), fields(rows = table.num_rows(), columns = table.num_columns()))]
pub fn normalize_with_stats(mut table: Table) -> (Table, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    if table.is_empty() {
        return (table, stats);
    }

    stats.stringified_columns = stringify_compound_columns(&mut table);
    stats.nulls_filled = fill_nulls(&mut table);
    stats.renamed_columns = lowercase_columns(&mut table);
    stats.unparseable_dates = parse_date_column(&mut table);
    stats.duplicates_removed = drop_duplicates(&mut table);

    debug!(?stats, "normalized");
    (table, stats)
}

fn stringify_compound_columns(table: &mut Table) -> Vec<String> {
    let compound: Vec<usize> = (0..table.num_columns())
        .filter(|&i| table.rows().iter().any(|r| r[i].is_compound()))
        .collect();

    for row in table.rows_mut() {
        for &i in &compound {
            if let Value::Compound(c) = &row[i] {
                row[i] = Value::Text(c.to_string());
            }
        }
    }

    compound
        .into_iter()
        .map(|i| table.columns()[i].clone())
        .collect()
}

fn fill_nulls(table: &mut Table) -> usize {
    let mut filled = 0;
    for cell in table.rows_mut().iter_mut().flatten() {
        if cell.is_null() {
            *cell = Value::Text(UNKNOWN.to_string());
            filled += 1;
        }
    }
    filled
}

/// Lower-case names; a name that collides with an earlier one gets `_<n>`.
/// `date` stays reserved for the column that was literally named `date`, so
/// `Date` or `DATE` lower-case to `date_<n>` and are never date-parsed.
fn lowercase_columns(table: &mut Table) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut renamed = 0;

    for name in table.columns_mut().iter_mut() {
        let lower = name.to_lowercase();
        let reserved = lower == DATE_COLUMN && name.as_str() != DATE_COLUMN;
        let mut candidate = lower.clone();
        let mut n = 1;
        while seen.contains(&candidate) || (reserved && candidate == DATE_COLUMN) {
            candidate = format!("{}_{}", lower, n);
            n += 1;
        }
        if *name != candidate {
            renamed += 1;
            *name = candidate.clone();
        }
        seen.insert(candidate);
    }
    renamed
}

/// The fill text survives as text; other strings that fail to parse and
/// non-text scalars become `NullDate`.
fn parse_date_column(table: &mut Table) -> usize {
    let Some(idx) = table.column_index(DATE_COLUMN) else {
        return 0;
    };

    let mut bad = 0;
    for row in table.rows_mut() {
        let parsed = match &row[idx] {
            Value::Date(_) | Value::NullDate => continue,
            Value::Text(s) if s == UNKNOWN => continue,
            Value::Text(s) => date_parser::parse_datetime(s).map(Value::Date),
            _ => None,
        };
        row[idx] = match parsed {
            Some(d) => d,
            None => {
                debug!(value = %row[idx], "unparseable date");
                bad += 1;
                Value::NullDate
            }
        };
    }
    bad
}

fn drop_duplicates(table: &mut Table) -> usize {
    let before = table.num_rows();
    let rows = std::mem::take(table.rows_mut());

    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.contains(&row) {
            seen.insert(row.clone());
            kept.push(row);
        }
    }

    *table.rows_mut() = kept;
    before - table.num_rows()
}
