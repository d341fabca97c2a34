//! Descriptive statistics primitives.
//!
//! Every function accepts an empty input and returns zeros rather than
//! failing; callers report the sample size alongside.

use serde::Serialize;

/// Arithmetic mean, `0.0` for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the two middle values are averaged for even-length samples.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample size, mean, and median of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        Self {
            n: values.len(),
            mean: mean(values),
            median: median(values),
        }
    }
}

/// One fixed-width histogram bin, `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub start_secs: u64,
    pub end_secs: u64,
    pub count: usize,
}

/// Fixed-width histogram.
///
/// The bin count is derived from the observed maximum, capped at `max_bins`;
/// each value goes to `floor(value / width)`, clamped to the last bin.
/// Negative or non-finite values are ignored.
pub fn histogram(values_secs: &[f64], width_secs: u64, max_bins: usize) -> Vec<HistogramBin> {
    let width = width_secs.max(1);
    let max_bins = max_bins.max(1);
    let values: Vec<f64> = values_secs
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };

    let bin_count = bin_index(max, width).saturating_add(1).min(max_bins);
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start_secs: (i as u64).saturating_mul(width),
            end_secs: (i as u64 + 1).saturating_mul(width),
            count: 0,
        })
        .collect();

    for value in values {
        let index = bin_index(value, width).min(bin_count - 1);
        bins[index].count += 1;
    }
    bins
}

/// Float-to-int casts saturate, so huge values map to `usize::MAX`.
fn bin_index(value: f64, width: u64) -> usize {
    (value / width as f64).floor() as usize
}

/// `part / whole`, `0.0` when `whole` is zero.
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
