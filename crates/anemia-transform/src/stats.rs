//! Summary statistics for distribution charts.

use serde::Serialize;

/// Default evaluation grid size for density curves.
pub const KDE_POINTS: usize = 40;

/// Bandwidth used when the sample has no spread.
const FALLBACK_BANDWIDTH: f64 = 0.5;

/// Quantile of already-sorted values, interpolating linearly between the
/// closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(mean) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Lowest value within 1.5 IQR below Q1.
    pub lower_whisker: f64,
    /// Highest value within 1.5 IQR above Q3.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_copy(values);
        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            n: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted)?,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Equal-width bin edges (`bins + 1` values) covering `values`.
///
/// A sample with no spread gets a single unit-wide bin centred on the value.
pub fn bin_edges(values: &[f64], bins: usize) -> Option<Vec<f64>> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    if max <= min {
        return Some(vec![min - 0.5, max + 0.5]);
    }
    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| min + width * i as f64).collect();
    edges.push(max);
    Some(edges)
}

/// Count `values` into the bins described by `edges`.
///
/// Bins are half-open except the last, which also takes its upper edge.
/// Values outside the edges are ignored.
pub fn bin_counts(edges: &[f64], values: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    let start = edges[0];
    let end = edges[bins];
    let width = (end - start) / bins as f64;
    for &value in values {
        if value < start || value > end {
            continue;
        }
        let slot = (((value - start) / width).floor() as usize).min(bins - 1);
        counts[slot] += 1;
    }
    counts
}

/// Gaussian kernel density estimate sampled on a regular grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelDensity {
    pub bandwidth: f64,
    /// `(x, density)` pairs in increasing `x`.
    pub points: Vec<(f64, f64)>,
}

impl KernelDensity {
    /// Estimate with Scott's rule, h = sd * n^(-1/5), over `[min - 3h, max + 3h]`.
    pub fn estimate(values: &[f64], grid: usize) -> Option<Self> {
        let min = values.iter().copied().reduce(f64::min)?;
        let max = values.iter().copied().reduce(f64::max)?;
        let n = values.len() as f64;
        let scott = std_dev(values) * n.powf(-0.2);
        let bandwidth = if scott.is_finite() && scott > 0.0 {
            scott
        } else {
            FALLBACK_BANDWIDTH
        };

        let grid = grid.max(2);
        let lo = min - 3.0 * bandwidth;
        let hi = max + 3.0 * bandwidth;
        let step = (hi - lo) / (grid - 1) as f64;
        let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let points = (0..grid)
            .map(|i| {
                let x = lo + step * i as f64;
                let density: f64 = values
                    .iter()
                    .map(|v| {
                        let z = (x - v) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum();
                (x, density * norm)
            })
            .collect();
        Some(Self { bandwidth, points })
    }

    pub fn max_density(&self) -> f64 {
        self.points.iter().map(|(_, d)| *d).fold(0.0, f64::max)
    }

    /// Trapezoid-rule area under the sampled curve.
    pub fn area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| (pair[1].0 - pair[0].0) * (pair[0].1 + pair[1].1) / 2.0)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let stats = BoxStats::from_values(&[10.0, 11.0, 12.0, 11.5, 10.5, 30.0]).unwrap();
        assert_eq!(stats.n, 6);
        assert_eq!(stats.outliers, vec![30.0]);
        assert_eq!(stats.upper_whisker, 12.0);
        assert_eq!(stats.lower_whisker, 10.0);
        assert_eq!(stats.max, 30.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn histogram_places_max_in_last_bin() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let edges = bin_edges(&values, 4).unwrap();
        assert_eq!(edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(bin_counts(&edges, &values), vec![1, 1, 1, 2]);
    }

    #[test]
    fn constant_sample_gets_one_bin() {
        let edges = bin_edges(&[7.0, 7.0], 20).unwrap();
        assert_eq!(edges, vec![6.5, 7.5]);
        assert_eq!(bin_counts(&edges, &[7.0, 7.0]), vec![2]);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let values = [9.1, 10.4, 10.9, 11.2, 11.8, 12.5, 8.7];
        let kde = KernelDensity::estimate(&values, KDE_POINTS).unwrap();
        assert_eq!(kde.points.len(), KDE_POINTS);
        assert!((kde.area() - 1.0).abs() < 0.03, "area {}", kde.area());

        let single = KernelDensity::estimate(&[11.0], KDE_POINTS).unwrap();
        assert_eq!(single.bandwidth, 0.5);
        assert!((single.area() - 1.0).abs() < 0.03);
    }
}
