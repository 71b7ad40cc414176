use crate::dataset::{Column, Dataset};
use crate::detectors::round2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Checked in this order; the first one present is the label column.
pub const LABEL_CANDIDATES: [&str; 3] = ["label", "target", "class"];
pub const NULL_LABEL: &str = "NULL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    pub total_rows: usize,
    pub missing_modalities_count: usize,
    pub missing_modalities_percent: f64,
    pub label_distribution: Option<BTreeMap<String, u64>>,
}

/// Rows with no non-blank text cell and no non-blank image cell count as
/// missing a modality. Audio and numeric columns are not considered.
pub fn check_consistency(dataset: &Dataset, text_cols: &[String], image_cols: &[String]) -> ConsistencyMetrics {
    let total = dataset.row_count();
    let lookup = |names: &[String]| -> Vec<&Column> {
        names.iter().filter_map(|n| dataset.column(n)).collect()
    };
    let text = lookup(text_cols);
    let images = lookup(image_cols);

    let missing = (0..total)
        .filter(|&row| !any_filled(&text, row) && !any_filled(&images, row))
        .count();

    ConsistencyMetrics {
        total_rows: total,
        missing_modalities_count: missing,
        missing_modalities_percent: round2(100.0 * missing as f64 / total.max(1) as f64),
        label_distribution: label_distribution(dataset),
    }
}

fn any_filled(columns: &[&Column], row: usize) -> bool {
    columns.iter().any(|c| {
        c.values
            .get(row)
            .and_then(Option::as_ref)
            .is_some_and(|cell| !cell.to_string().trim().is_empty())
    })
}

pub fn label_distribution(dataset: &Dataset) -> Option<BTreeMap<String, u64>> {
    let label = LABEL_CANDIDATES.iter().find_map(|name| dataset.column(name))?;
    let mut dist = BTreeMap::new();
    for v in &label.values {
        let key = v.as_ref().map_or_else(|| NULL_LABEL.to_owned(), |c| c.to_string());
        *dist.entry(key).or_insert(0) += 1;
    }
    Some(dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_rows_missing_both_modalities() {
        let ds = Dataset::new(vec![
            Column::new("caption", vec![Some("a".into()), Some("  ".into()), None, None]),
            Column::new("img", vec![None, Some("x.png".into()), Some("".into()), None]),
            Column::new("price", vec![Some(1.0.into()), Some(2.0.into()), Some(3.0.into()), Some(4.0.into())]),
        ])
        .unwrap();
        let m = check_consistency(&ds, &names(&["caption"]), &names(&["img"]));
        assert_eq!(m.total_rows, 4);
        assert_eq!(m.missing_modalities_count, 2);
        assert_eq!(m.missing_modalities_percent, 50.0);
        assert_eq!(m.label_distribution, None);
    }

    #[test]
    fn fully_covered_rows_have_zero_percent() {
        let ds = Dataset::new(vec![
            Column::new("caption", vec![Some("a".into()), None]),
            Column::new("img", vec![None, Some("b.png".into())]),
        ])
        .unwrap();
        let m = check_consistency(&ds, &names(&["caption"]), &names(&["img", "ghost"]));
        assert_eq!(m.missing_modalities_percent, 0.0);
    }

    #[test]
    fn label_priority_and_null_bucket() {
        let ds = Dataset::new(vec![
            Column::new("class", vec![Some("x".into()), Some("x".into()), Some("x".into())]),
            Column::new("target", vec![Some(Cell::Number(1.0)), None, Some(Cell::Number(1.0))]),
        ])
        .unwrap();
        let dist = check_consistency(&ds, &[], &[]).label_distribution.unwrap();
        assert_eq!(dist.get("1"), Some(&2));
        assert_eq!(dist.get(NULL_LABEL), Some(&1));
        assert_eq!(dist.values().sum::<u64>(), 3);
    }

    #[test]
    fn zero_rows_is_zero_percent() {
        let ds = Dataset::new(vec![Column::new("label", vec![])]).unwrap();
        let m = check_consistency(&ds, &[], &[]);
        assert_eq!(m.total_rows, 0);
        assert_eq!(m.missing_modalities_percent, 0.0);
        assert_eq!(m.label_distribution, Some(BTreeMap::new()));
    }
}
