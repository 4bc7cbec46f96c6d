//! Size classification: body size and heading sizes.
//!
//! Three independent signals decide which font sizes may carry headings:
//!
//! - **ranked** sizes strictly above the body size; their rank defines the
//!   font-derived heading level (largest = `H1`);
//! - **clustered** sizes outside the most populated density cluster;
//! - **histogram** sizes more than a margin above the body size.
//!
//! A size qualifies when it lies above the body size and any signal accepts
//! it. Only the ranked set assigns levels.

use std::collections::{BTreeMap, BTreeSet};

use super::options::StructureOptions;
use crate::model::Level;

/// Fallback body size for documents without text.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// A font size quantized to 0.1 pt.
pub type SizeKey = i32;

/// Quantize a font size to the 0.1 pt grid used for all size comparisons.
pub fn size_key(size: f32) -> SizeKey {
    (size * 10.0).round() as SizeKey
}

fn key_to_size(key: SizeKey) -> f32 {
    key as f32 / 10.0
}

/// Body size: `mean + weight * stddev` (population deviation), rounded to one
/// decimal.
pub fn body_size(sizes: &[f32], weight: f32) -> f32 {
    if sizes.is_empty() {
        return DEFAULT_BODY_SIZE;
    }

    let n = sizes.len() as f64;
    let mean = sizes.iter().map(|&s| s as f64).sum::<f64>() / n;
    let variance = sizes
        .iter()
        .map(|&s| (s as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let body = mean + weight as f64 * variance.sqrt();

    ((body * 10.0).round() / 10.0) as f32
}

/// Distinct sizes strictly above the body size, largest first.
pub fn ranked_heading_sizes(sizes: &[f32], body: f32) -> Vec<SizeKey> {
    let body_key = size_key(body);
    let distinct: BTreeSet<SizeKey> = sizes
        .iter()
        .map(|&s| size_key(s))
        .filter(|&k| k > body_key)
        .collect();
    distinct.into_iter().rev().collect()
}

/// Sizes more than `margin` above the body size.
pub fn histogram_heading_sizes(sizes: &[f32], body: f32, margin: f32) -> BTreeSet<SizeKey> {
    let floor = size_key(body + margin);
    sizes
        .iter()
        .map(|&s| size_key(s))
        .filter(|&k| k > floor)
        .collect()
}

/// Sizes outside the most populated density cluster, noise included.
///
/// Empty when no cluster forms at all.
pub fn clustered_heading_sizes(
    sizes: &[f32],
    radius: f32,
    min_population: usize,
) -> BTreeSet<SizeKey> {
    let mut sorted = sizes.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let labels = density_labels(&sorted, radius, min_population);

    let mut population: BTreeMap<usize, usize> = BTreeMap::new();
    for label in labels.iter().flatten() {
        *population.entry(*label).or_default() += 1;
    }

    // Ties go to the cluster of smaller sizes.
    let Some(body_label) = population
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(label, _)| *label)
    else {
        return BTreeSet::new();
    };

    sorted
        .iter()
        .zip(&labels)
        .filter(|(_, label)| **label != Some(body_label))
        .map(|(&s, _)| size_key(s))
        .collect()
}

/// One-dimensional density clustering over ascending values.
///
/// A value is a core point when at least `min_population` values (itself
/// included) lie within `radius`. Core points within `radius` of each other
/// share a cluster; non-core values join the cluster of their nearest core
/// point within `radius`, or stay noise (`None`).
fn density_labels(sorted: &[f32], radius: f32, min_population: usize) -> Vec<Option<usize>> {
    let n = sorted.len();
    let eps = radius + 1e-4;

    let mut core = vec![false; n];
    let (mut lo, mut hi) = (0, 0);
    for i in 0..n {
        while sorted[i] - sorted[lo] > eps {
            lo += 1;
        }
        hi = hi.max(i);
        while hi + 1 < n && sorted[hi + 1] - sorted[i] <= eps {
            hi += 1;
        }
        core[i] = hi - lo + 1 >= min_population;
    }

    let mut labels = vec![None; n];
    let mut next_cluster = 0;
    let mut last_core: Option<usize> = None;
    for i in (0..n).filter(|&i| core[i]) {
        labels[i] = match last_core {
            Some(j) if sorted[i] - sorted[j] <= eps => labels[j],
            _ => {
                next_cluster += 1;
                Some(next_cluster - 1)
            }
        };
        last_core = Some(i);
    }

    let mut prev_core = vec![None; n];
    let mut seen = None;
    for i in 0..n {
        if core[i] {
            seen = Some(i);
        }
        prev_core[i] = seen;
    }
    let mut next_core = vec![None; n];
    seen = None;
    for i in (0..n).rev() {
        if core[i] {
            seen = Some(i);
        }
        next_core[i] = seen;
    }

    for i in (0..n).filter(|&i| !core[i]) {
        let left = prev_core[i].filter(|&j| sorted[i] - sorted[j] <= eps);
        let right = next_core[i].filter(|&j| sorted[j] - sorted[i] <= eps);
        let nearest = match (left, right) {
            (Some(l), Some(r)) if sorted[r] - sorted[i] < sorted[i] - sorted[l] => Some(r),
            (Some(l), _) => Some(l),
            (None, r) => r,
        };
        if let Some(j) = nearest {
            labels[i] = labels[j];
        }
    }

    labels
}

/// The size profile of one document.
#[derive(Debug, Clone, Default)]
pub struct SizeProfile {
    body_size: f32,
    ranked: Vec<SizeKey>,
    clustered: BTreeSet<SizeKey>,
    histogram: BTreeSet<SizeKey>,
}

impl SizeProfile {
    /// Classify the sizes observed across a document, one entry per line.
    pub fn from_sizes(sizes: &[f32], options: &StructureOptions) -> Self {
        let body = body_size(sizes, options.body_stddev_weight);
        let profile = Self {
            body_size: body,
            ranked: ranked_heading_sizes(sizes, body),
            clustered: clustered_heading_sizes(
                sizes,
                options.cluster_radius,
                options.cluster_min_population,
            ),
            histogram: histogram_heading_sizes(sizes, body, options.histogram_margin),
        };

        log::debug!(
            "body size {:.1}, ranked {:?}, clustered {:?}, histogram {:?}",
            profile.body_size,
            profile.ranked_sizes(),
            profile.clustered.iter().map(|&k| key_to_size(k)).collect::<Vec<_>>(),
            profile.histogram.iter().map(|&k| key_to_size(k)).collect::<Vec<_>>(),
        );

        profile
    }

    /// Inferred body text size.
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Ranked heading sizes, largest first.
    pub fn ranked_sizes(&self) -> Vec<f32> {
        self.ranked.iter().map(|&k| key_to_size(k)).collect()
    }

    /// Smallest ranked heading size.
    pub fn min_ranked_size(&self) -> Option<f32> {
        self.ranked.last().map(|&k| key_to_size(k))
    }

    /// Font-derived level of a size, if it is a ranked heading size.
    pub fn level_for(&self, size: f32) -> Option<Level> {
        let key = size_key(size);
        self.ranked
            .iter()
            .position(|&k| k == key)
            .map(|i| Level::new(i as u32 + 1))
    }

    /// Font-derived level, defaulting to `H1` for sizes outside the ranking.
    pub fn level_or_top(&self, size: f32) -> Level {
        self.level_for(size).unwrap_or(Level::TOP)
    }

    /// Size → level pairs, largest size first.
    pub fn level_map(&self) -> Vec<(f32, Level)> {
        self.ranked
            .iter()
            .enumerate()
            .map(|(i, &k)| (key_to_size(k), Level::new(i as u32 + 1)))
            .collect()
    }

    /// Whether the size is above the body size and any signal treats it as
    /// a heading size. Clusters below the body size never qualify.
    pub fn is_heading_size(&self, size: f32) -> bool {
        let key = size_key(size);
        if key <= size_key(self.body_size) {
            return false;
        }
        self.ranked.contains(&key) || self.clustered.contains(&key) || self.histogram.contains(&key)
    }

    /// Whether the size is at or above the smallest ranked size.
    pub fn clears_floor(&self, size: f32) -> bool {
        self.ranked
            .last()
            .is_some_and(|&floor| size_key(size) >= floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes_with_body(body: f32, body_count: usize, extra: &[f32]) -> Vec<f32> {
        let mut sizes = vec![body; body_count];
        sizes.extend_from_slice(extra);
        sizes
    }

    #[test]
    fn test_body_size_uniform() {
        assert_eq!(body_size(&[11.0; 20], 0.25), 11.0);
        assert_eq!(body_size(&[], 0.25), DEFAULT_BODY_SIZE);
    }

    #[test]
    fn test_level_map_from_heading_sizes() {
        let sizes = sizes_with_body(10.0, 100, &[18.0, 18.0, 14.0, 14.0, 12.0]);
        let profile = SizeProfile::from_sizes(&sizes, &StructureOptions::default());

        assert!(profile.body_size() > 10.0 && profile.body_size() < 12.0);
        assert_eq!(
            profile.level_map(),
            vec![
                (18.0, Level::new(1)),
                (14.0, Level::new(2)),
                (12.0, Level::new(3)),
            ]
        );
        assert_eq!(profile.level_for(14.0), Some(Level::new(2)));
        assert_eq!(profile.level_for(10.0), None);
        assert_eq!(profile.level_or_top(9.0), Level::TOP);
    }

    #[test]
    fn test_body_below_smallest_ranked_size() {
        let sizes = sizes_with_body(9.5, 60, &[9.0, 9.0, 11.0, 16.0, 24.0]);
        let profile = SizeProfile::from_sizes(&sizes, &StructureOptions::default());
        let min = profile.min_ranked_size().unwrap();
        assert!(profile.body_size() < min);
    }

    #[test]
    fn test_histogram_margin() {
        let set = histogram_heading_sizes(&[10.0, 10.4, 10.6, 12.0], 10.0, 0.5);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![106, 120]);
    }

    #[test]
    fn test_clustered_sizes_include_other_clusters_and_noise() {
        let mut sizes = vec![10.0; 30];
        sizes.extend_from_slice(&[10.5; 10]);
        sizes.extend_from_slice(&[16.0; 6]);
        sizes.push(24.0);
        sizes.push(6.0);

        let set = clustered_heading_sizes(&sizes, 1.5, 5);
        assert!(set.contains(&size_key(16.0)));
        assert!(set.contains(&size_key(24.0)));
        assert!(set.contains(&size_key(6.0)));
        assert!(!set.contains(&size_key(10.0)));
        assert!(!set.contains(&size_key(10.5)));
    }

    #[test]
    fn test_clustered_sizes_empty_without_clusters() {
        let set = clustered_heading_sizes(&[8.0, 12.0, 16.0, 20.0], 1.5, 5);
        assert!(set.is_empty());
    }

    #[test]
    fn test_density_border_point_joins_cluster() {
        let sorted = [10.0, 10.0, 10.0, 10.0, 10.0, 11.4, 12.8, 20.0];
        let labels = density_labels(&sorted, 1.5, 6);
        // 12.8 is not dense enough itself but sits next to a core point.
        assert_eq!(labels[6], Some(0));
        assert_eq!(labels[7], None);
        assert!(labels[..7].iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn test_union_and_floor() {
        let mut sizes = vec![10.0; 40];
        sizes.extend_from_slice(&[7.0; 8]);
        sizes.extend_from_slice(&[14.0, 14.0]);
        let profile = SizeProfile::from_sizes(&sizes, &StructureOptions::default());

        assert!(profile.is_heading_size(14.0));
        assert!(profile.clears_floor(14.0));
        assert!(!profile.is_heading_size(10.0));

        // The 7pt cluster lies outside the body cluster but below the body
        // size, so it never qualifies.
        assert!(profile.clustered.contains(&size_key(7.0)));
        assert!(!profile.is_heading_size(7.0));
        assert!(!profile.clears_floor(7.0));
    }
}
