//! Structure inference: title, heading outline and sections from a line
//! stream.
//!
//! The pipeline runs per document and keeps no state between documents:
//!
//! 1. [`SizeProfile`] derives the body size and the heading sizes.
//! 2. Repeated lines and the page-1 title block are collected.
//! 3. [`HeadingAssembler`] filters, merges and levels heading candidates.
//! 4. Numbered headings are reconciled against their parents.
//! 5. Headings are tagged with a language and the title is resolved.
//!
//! [`segment`] then slices the body text at the dominant headings.

mod assemble;
pub mod filter;
mod hierarchy;
mod lang;
pub mod numbering;
mod options;
mod segment;
pub mod sizes;
mod title;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use assemble::{clean_heading, merge_multiline, HeadingAssembler, HeadingCandidate};
pub use filter::{LineFilter, Rejection};
pub use hierarchy::{reconcile_hierarchy, NumberingTree};
pub use lang::{LanguageDetector, ScriptDetector, UNKNOWN};
pub use numbering::NumberingContext;
pub use options::StructureOptions;
pub use segment::{dominant_headings, is_true_heading, locate_heading, segment, section_level, HeadingLocation};
pub use sizes::SizeProfile;
pub use title::{resolve_title, TitleBlock};

use crate::model::{DocumentLines, Outline, Section};

/// Outline and sections of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Document identifier (file base name)
    pub document: String,
    pub outline: Outline,
    pub sections: Vec<Section>,
}

/// Runs structure inference on line streams.
#[derive(Clone)]
pub struct OutlineExtractor {
    options: StructureOptions,
    detector: Arc<dyn LanguageDetector>,
}

impl fmt::Debug for OutlineExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineExtractor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::with_options(StructureOptions::default())
    }
}

impl OutlineExtractor {
    /// Create an extractor with default options and the script-based
    /// language detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with custom thresholds.
    pub fn with_options(options: StructureOptions) -> Self {
        Self {
            options,
            detector: Arc::new(ScriptDetector::new()),
        }
    }

    /// Replace the language detector.
    pub fn with_detector(self, detector: impl LanguageDetector + 'static) -> Self {
        self.with_shared_detector(Arc::new(detector))
    }

    /// Replace the language detector with a shared one.
    pub fn with_shared_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Thresholds in use.
    pub fn options(&self) -> &StructureOptions {
        &self.options
    }

    /// The language detector, shared.
    pub fn detector(&self) -> Arc<dyn LanguageDetector> {
        Arc::clone(&self.detector)
    }

    /// Size profile of a document.
    pub fn profile(&self, doc: &DocumentLines) -> SizeProfile {
        SizeProfile::from_sizes(&doc.font_sizes(), &self.options)
    }

    /// Infer the title and heading outline.
    pub fn extract(&self, doc: &DocumentLines) -> Outline {
        let options = &self.options;

        if doc.is_empty() {
            log::info!("{}: no text lines, empty outline", doc.id);
            let title = resolve_title(&TitleBlock::default(), doc.metadata_title.as_deref(), &doc.id);
            return Outline::new(title, Vec::new());
        }

        let profile = self.profile(doc);
        let repeated = filter::find_repeated_lines(&doc.lines, doc.page_count);
        let title_block = TitleBlock::from_lines(&doc.lines, options);
        log::debug!(
            "{}: {} repeated lines, {} title lines",
            doc.id,
            repeated.len(),
            title_block.lines().len()
        );

        let line_filter = LineFilter::new(&profile, &repeated, options);
        let assembler = HeadingAssembler::new(&profile, line_filter, &title_block, options);
        let mut headings = assembler.assemble(&doc.lines);

        reconcile_hierarchy(&mut headings);

        for heading in &mut headings {
            heading.language = self.detector.detect(&heading.text);
        }

        if headings.is_empty() {
            log::info!("{}: no heading candidates survived filtering", doc.id);
        } else {
            log::debug!("{}: {} headings", doc.id, headings.len());
        }

        let title = resolve_title(&title_block, doc.metadata_title.as_deref(), &doc.id);
        Outline::new(title, headings)
    }

    /// Slice the body text at the outline's dominant headings.
    pub fn segment(&self, doc: &DocumentLines, outline: &Outline) -> Vec<Section> {
        segment::segment(doc, outline, &self.options)
    }

    /// Extract the outline, then the sections.
    pub fn analyze(&self, doc: &DocumentLines) -> DocumentAnalysis {
        let outline = self.extract(doc);
        let sections = self.segment(doc, &outline);
        DocumentAnalysis {
            document: doc.id.clone(),
            outline,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, LineRecord};

    fn report() -> DocumentLines {
        let mut lines = vec![LineRecord::new("Field Survey Report", 24.0, true, 60.0, 1)];
        for page in 1..=3u32 {
            lines.push(LineRecord::new(
                format!("Chapter {page} Findings Summary"),
                16.0,
                true,
                100.0,
                page,
            ));
            for i in 0..15 {
                lines.push(LineRecord::new(
                    format!("Observation {i} was recorded on page {page}."),
                    10.0,
                    false,
                    140.0 + i as f32 * 14.0,
                    page,
                ));
            }
        }
        DocumentLines::new("survey.pdf", lines)
    }

    #[test]
    fn test_extract_outline() {
        let outline = OutlineExtractor::new().extract(&report());
        assert_eq!(outline.title, "Field Survey Report");
        let texts: Vec<&str> = outline.headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Chapter 1 Findings Summary",
                "Chapter 2 Findings Summary",
                "Chapter 3 Findings Summary"
            ]
        );
        assert!(outline.headings.iter().all(|h| h.level == Level::new(2)));
    }

    #[test]
    fn test_custom_detector() {
        let extractor = OutlineExtractor::new().with_detector(|_: &str| "xx".to_string());
        let outline = extractor.extract(&report());
        assert!(outline.headings.iter().all(|h| h.language == "xx"));
    }

    #[test]
    fn test_analyze_sections() {
        let analysis = OutlineExtractor::new().analyze(&report());
        assert_eq!(analysis.document, "survey.pdf");
        assert_eq!(analysis.sections.len(), 3);
        assert_eq!(analysis.sections[1].page_number, 2);
        assert_eq!(analysis.sections[1].line_count(), 15);
    }

    #[test]
    fn test_empty_document() {
        let doc = DocumentLines::new("blank.pdf", Vec::new()).with_metadata_title("Blank Form");
        let outline = OutlineExtractor::new().extract(&doc);
        assert!(outline.is_empty());
        assert_eq!(outline.title, "Blank Form");
    }
}
