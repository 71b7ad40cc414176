use crate::dataset::{Cell, Column, Dataset};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use mmprofiler_common::{MmProfilerError, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const CSV_BATCH_SIZE: usize = 8192;

/// Load a CSV or Parquet file, picked by extension.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let (schema, batches) = match ext.as_str() {
        "csv" => read_csv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        _ => {
            return Err(MmProfilerError::UnsupportedInput(format!(
                "{} (expected .csv or .parquet)",
                path.display()
            )))
        }
    };
    debug!(path = %path.display(), batches = batches.len(), "dataset loaded");
    batches_to_dataset(&schema, &batches)
}

fn read_csv(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let format = arrow::csv::reader::Format::default().with_header(true);
    let (schema, _) = format.infer_schema(std::fs::File::open(path)?, None)?;
    let schema = Arc::new(schema);
    let reader = arrow::csv::ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(CSV_BATCH_SIZE)
        .build(std::fs::File::open(path)?)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn read_parquet(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

pub fn batches_to_dataset(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Dataset> {
    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();
    for batch in batches {
        for (idx, array) in batch.columns().iter().enumerate() {
            if let Some(col) = columns.get_mut(idx) {
                col.values.extend(array_cells(array)?);
            }
        }
    }
    Dataset::new(columns)
}

fn array_cells(array: &ArrayRef) -> Result<Vec<Option<Cell>>> {
    let dt = array.data_type();
    if dt.is_numeric() {
        let floats = cast(array, &DataType::Float64)?;
        let floats = downcast::<Float64Array>(&floats)?;
        return Ok(floats.iter().map(|v| v.map(Cell::Number)).collect());
    }
    match dt {
        DataType::Boolean => {
            let bools = downcast::<BooleanArray>(array)?;
            Ok(bools.iter().map(|v| v.map(Cell::Bool)).collect())
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let strings = cast(array, &DataType::Utf8)?;
            let strings = downcast::<StringArray>(&strings)?;
            Ok(strings.iter().map(|v| v.map(Cell::from)).collect())
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            Ok((0..array.len())
                .map(|i| (!array.is_null(i)).then(|| Cell::Text(formatter.value(i).to_string())))
                .collect())
        }
    }
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| MmProfilerError::Other(format!("unexpected array type {}", array.data_type())))
}
