//! Thresholds for structure inference.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable thresholds for every heuristic in the structure pipeline.
///
/// Defaults reproduce the classifier's reference behavior; a JSON file with
/// any subset of these fields can override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureOptions {
    /// Body size = mean + weight * stddev
    pub body_stddev_weight: f32,

    /// Density clustering radius, in points
    pub cluster_radius: f32,

    /// Minimum neighbours (self included) for a core point
    pub cluster_min_population: usize,

    /// Histogram signal: sizes above body + margin
    pub histogram_margin: f32,

    /// Lines above this top offset score as top-of-page
    pub top_of_page: f32,

    /// Lines with at most this many words score as short
    pub short_heading_words: usize,

    /// Minimum composite score for an unnumbered candidate
    pub min_heading_score: u8,

    /// Reject lines (over two words) whose stop-word share exceeds this
    pub stopword_ratio: f32,

    /// Title lines are within this ratio of the page-1 maximum size
    pub title_size_ratio: f32,

    /// ... and start above this top offset
    pub title_top: f32,

    /// Lines this close to the page-1 maximum size are title lines anywhere
    pub title_size_tolerance: f32,

    /// Merge headings wrapped over consecutive lines
    pub merge_multiline: bool,

    /// Maximum line gap for merging, as a multiple of the font size
    pub merge_gap_factor: f32,

    /// Minimum words for a heading to open a section
    pub min_section_words: usize,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            body_stddev_weight: 0.25,
            cluster_radius: 1.5,
            cluster_min_population: 5,
            histogram_margin: 0.5,
            top_of_page: 150.0,
            short_heading_words: 5,
            min_heading_score: 2,
            stopword_ratio: 0.7,
            title_size_ratio: 0.85,
            title_top: 200.0,
            title_size_tolerance: 0.1,
            merge_multiline: true,
            merge_gap_factor: 3.0,
            min_section_words: 3,
        }
    }
}

impl StructureOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values that make the heuristics meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_radius <= 0.0 {
            return Err(Error::Config("cluster_radius must be positive".into()));
        }
        if self.cluster_min_population == 0 {
            return Err(Error::Config(
                "cluster_min_population must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.title_size_ratio) {
            return Err(Error::Config(
                "title_size_ratio must be within 0..=1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stopword_ratio) {
            return Err(Error::Config("stopword_ratio must be within 0..=1".into()));
        }
        Ok(())
    }

    /// Set the density clustering parameters.
    pub fn with_clustering(mut self, radius: f32, min_population: usize) -> Self {
        self.cluster_radius = radius;
        self.cluster_min_population = min_population;
        self
    }

    /// Set the top-of-page threshold used in scoring.
    pub fn with_top_of_page(mut self, top: f32) -> Self {
        self.top_of_page = top;
        self
    }

    /// Set the minimum composite score.
    pub fn with_min_heading_score(mut self, score: u8) -> Self {
        self.min_heading_score = score;
        self
    }

    /// Enable or disable multi-line heading merging.
    pub fn with_multiline_merge(mut self, merge: bool) -> Self {
        self.merge_multiline = merge;
        self
    }

    /// Set the minimum word count for section headings.
    pub fn with_min_section_words(mut self, words: usize) -> Self {
        self.min_section_words = words;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = StructureOptions::new()
            .with_clustering(2.0, 3)
            .with_multiline_merge(false)
            .with_min_heading_score(1);
        assert_eq!(options.cluster_radius, 2.0);
        assert_eq!(options.cluster_min_population, 3);
        assert!(!options.merge_multiline);
        assert_eq!(options.min_heading_score, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = StructureOptions::from_json(r#"{"top_of_page": 120.0}"#).unwrap();
        assert_eq!(options.top_of_page, 120.0);
        assert_eq!(options.cluster_min_population, 5);
        assert!(options.merge_multiline);
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            StructureOptions::from_json(r#"{"cluster_radius": -1.0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            StructureOptions::from_json("nope"),
            Err(Error::Config(_))
        ));
    }
}
