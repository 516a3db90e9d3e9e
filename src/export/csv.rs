// src/export/csv.rs
use crate::error::Result;
use crate::table::{Table, Value};
use ::csv::WriterBuilder;
use chrono::{NaiveDateTime, Timelike};
use std::path::Path;

const DATE_ONLY: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Header row of column names, then one record per row. No index column.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(table.columns())?;

    let date_formats: Vec<&str> = (0..table.num_columns())
        .map(|i| date_format_for(table.rows().iter().map(|r| &r[i])))
        .collect();

    let mut fields: Vec<String> = Vec::with_capacity(table.num_columns());
    for row in table.rows() {
        fields.clear();
        fields.extend(
            row.iter()
                .zip(&date_formats)
                .map(|(v, fmt)| render(v, fmt)),
        );
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dates print without a time part when every date in the column is midnight.
fn date_format_for<'a>(cells: impl Iterator<Item = &'a Value>) -> &'static str {
    let mut all_midnight = true;
    for v in cells {
        if let Value::Date(d) = v {
            if !is_midnight(d) {
                all_midnight = false;
                break;
            }
        }
    }
    if all_midnight {
        DATE_ONLY
    } else {
        DATE_TIME
    }
}

fn is_midnight(d: &NaiveDateTime) -> bool {
    d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0
}

fn render(v: &Value, date_format: &str) -> String {
    match v {
        Value::Date(d) => d.format(date_format).to_string(),
        other => other.to_string(),
    }
}
