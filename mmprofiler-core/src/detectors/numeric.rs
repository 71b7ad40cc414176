use super::{mean, round2};
use crate::dataset::{Cell, Column};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericMetrics {
    pub count: usize,
    pub total: usize,
    pub missing: usize,
    pub missing_percent: f64,
    pub zeros: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
    pub skew: Option<f64>,
}

/// Numeric view of a cell; anything that is not a number becomes `None`.
pub fn coerce(cell: Option<&Cell>) -> Option<f64> {
    let v = match cell? {
        Cell::Number(n) => *n,
        Cell::Bool(b) => f64::from(u8::from(*b)),
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    (!v.is_nan()).then_some(v)
}

pub fn analyze_numeric(column: &Column) -> NumericMetrics {
    let values: Vec<f64> = column.values.iter().filter_map(|c| coerce(c.as_ref())).collect();
    let total = column.len();
    let count = values.len();
    let missing = total - count;

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);

    NumericMetrics {
        count,
        total,
        missing,
        missing_percent: round2(missing as f64 / total.max(1) as f64 * 100.0),
        zeros: values.iter().filter(|&&v| v == 0.0).count(),
        mean: mean(&values),
        std: sample_std(&values),
        min: sorted.first().copied(),
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.50),
        p75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
        skew: if count >= 3 { population_skew(&values) } else { None },
    }
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Third standardized moment, m3 / m2^1.5. Constant data has zero skew.
fn population_skew(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    let m = mean(values)?;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let skew = m3 / m2.powf(1.5);
    skew.is_finite().then_some(skew)
}
