// src/export/parquet.rs
use crate::error::Result;
use crate::table::{Table, Value};
use ::parquet::{
    arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties,
};
use arrow::{
    array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray},
    datatypes::{DataType, Field, Schema, TimeUnit},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::{fs::File, path::Path, sync::Arc};

/// Pick an Arrow type from the non-null cells of a column.
pub fn infer_column_type<'a>(cells: impl Iterator<Item = &'a Value>) -> DataType {
    let (mut ints, mut floats, mut bools, mut dates, mut other) = (0, 0, 0, 0, 0);
    for v in cells {
        match v {
            Value::Null => {}
            Value::NullDate | Value::Date(_) => dates += 1,
            Value::Int(_) => ints += 1,
            Value::Float(_) => floats += 1,
            Value::Bool(_) => bools += 1,
            Value::Text(_) | Value::Compound(_) => other += 1,
        }
    }

    match (ints, floats, bools, dates, other) {
        (0, 0, 0, 0, _) => DataType::Utf8,
        (_, 0, 0, 0, 0) => DataType::Int64,
        (_, _, 0, 0, 0) => DataType::Float64,
        (0, 0, _, 0, 0) => DataType::Boolean,
        (0, 0, 0, _, 0) => DataType::Timestamp(TimeUnit::Millisecond, None),
        _ => DataType::Utf8,
    }
}

fn build_array(cells: &[&Value], ty: &DataType) -> ArrayRef {
    match ty {
        DataType::Int64 => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            cells
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i as f64),
                    Value::Float(f) => Some(*f),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Timestamp(TimeUnit::Millisecond, _) => Arc::new(TimestampMillisecondArray::from(
            cells
                .iter()
                .map(|v| match v {
                    Value::Date(d) => Some(d.and_utc().timestamp_millis()),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|v| match v {
                    Value::Null | Value::NullDate => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
    }
}

/// Convert a table into a single Arrow record batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays = Vec::with_capacity(table.num_columns());

    for (i, name) in table.columns().iter().enumerate() {
        let cells: Vec<&Value> = table.rows().iter().map(|r| &r[i]).collect();
        let ty = infer_column_type(cells.iter().copied());
        arrays.push(build_array(&cells, &ty));
        fields.push(Field::new(name, ty, true));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
    Ok(batch)
}

/// Single-batch Parquet file, SNAPPY compressed.
pub fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
