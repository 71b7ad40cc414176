use crate::classifier::is_numeric;
use crate::dataset::{Cell, Column, Dataset};
use crate::detectors::{analyze_numeric, NumericMetrics};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub dtype: String, // "number", "string", "bool", "mixed" or "empty"
    pub missing: usize,
    pub unique: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_summary: Option<NumericMetrics>,
}

pub fn summarize_tabular(dataset: &Dataset, include_numeric: bool) -> BTreeMap<String, ColumnSummary> {
    dataset
        .columns()
        .iter()
        .map(|col| {
            let unique: HashSet<String> = col.values.iter().flatten().map(Cell::to_string).collect();
            let summary = ColumnSummary {
                dtype: dtype_of(col).to_owned(),
                missing: col.null_count(),
                unique: unique.len(),
                numeric_summary: (include_numeric && is_numeric(col)).then(|| analyze_numeric(col)),
            };
            (col.name.clone(), summary)
        })
        .collect()
}

fn dtype_of(col: &Column) -> &'static str {
    let mut kinds = col.values.iter().flatten().map(|c| match c {
        Cell::Number(_) => "number",
        Cell::Text(_) => "string",
        Cell::Bool(_) => "bool",
    });
    match kinds.next() {
        None => "empty",
        Some(first) if kinds.all(|k| k == first) => first,
        Some(_) => "mixed",
    }
}
