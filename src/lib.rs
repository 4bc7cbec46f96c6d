//! # pdfsect
//!
//! Infers the logical structure of PDF documents from text-layout signals:
//! a title, a leveled heading outline (H1..Hn) and titled body sections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsect::{analyze_file, render};
//!
//! fn main() -> pdfsect::Result<()> {
//!     let analysis = analyze_file("report.pdf")?;
//!
//!     let json = render::outline_to_json(&analysis.outline, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     for section in &analysis.sections {
//!         println!("{} (p. {})", section.section_title, section.page_number);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Line extraction**: lopdf content streams become physical lines with
//!   font size, boldness and position
//! - **Size classification**: body size and heading-size levels from the
//!   document's own font statistics
//! - **Heading inference**: textual filters, numbering prefixes, multi-line
//!   merging and hierarchy repair
//! - **Segmentation**: body text sliced at the dominant heading population
//! - **Batch mode**: many documents on a rayon worker pool

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod structure;
pub mod text;

// Re-export commonly used types
pub use batch::{BatchProcessor, DocumentReport};
pub use error::{Error, Result};
pub use model::{DocumentLines, Heading, Level, LineRecord, Outline, Section};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::{JsonFormat, Manifest};
pub use structure::{
    DocumentAnalysis, LanguageDetector, OutlineExtractor, ScriptDetector, StructureOptions,
};

use std::path::Path;

/// Extract the title and heading outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfsect::extract_outline;
///
/// let outline = extract_outline("report.pdf").unwrap();
/// for heading in &outline.headings {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Pdfsect::new().outline(path)
}

/// Extract the titled body sections of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfsect::extract_sections;
///
/// let sections = extract_sections("report.pdf").unwrap();
/// println!("{} sections", sections.len());
/// ```
pub fn extract_sections<P: AsRef<Path>>(path: P) -> Result<Vec<Section>> {
    Ok(analyze_file(path)?.sections)
}

/// Extract outline and sections of a PDF file in one pass.
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<DocumentAnalysis> {
    Pdfsect::new().analyze(path)
}

/// Run structure inference on an already extracted line stream.
///
/// # Example
///
/// ```
/// use pdfsect::{analyze_lines, DocumentLines, LineRecord};
///
/// let doc = DocumentLines::new(
///     "memo.pdf",
///     vec![LineRecord::new("Quarterly Memo", 20.0, true, 60.0, 1)],
/// );
/// let analysis = analyze_lines(&doc);
/// assert_eq!(analysis.outline.title, "Quarterly Memo");
/// ```
pub fn analyze_lines(doc: &DocumentLines) -> DocumentAnalysis {
    OutlineExtractor::new().analyze(doc)
}

/// Builder for configuring and running the pipeline.
///
/// # Example
///
/// ```no_run
/// use pdfsect::{Pdfsect, StructureOptions};
///
/// let analysis = Pdfsect::new()
///     .with_options(StructureOptions::default().with_min_section_words(2))
///     .lenient()
///     .analyze("report.pdf")?;
/// # Ok::<(), pdfsect::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdfsect {
    parse_options: ParseOptions,
    extractor: OutlineExtractor,
}

impl Pdfsect {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip unreadable pages instead of failing the document.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set structure inference thresholds, keeping the language detector.
    pub fn with_options(mut self, options: StructureOptions) -> Self {
        let detector = self.extractor.detector();
        self.extractor = OutlineExtractor::with_options(options).with_shared_detector(detector);
        self
    }

    /// Replace the heading language detector.
    pub fn with_detector(mut self, detector: impl LanguageDetector + 'static) -> Self {
        self.extractor = self.extractor.with_detector(detector);
        self
    }

    /// The configured extractor.
    pub fn extractor(&self) -> &OutlineExtractor {
        &self.extractor
    }

    /// Read the line stream of a PDF file.
    pub fn lines<P: AsRef<Path>>(&self, path: P) -> Result<DocumentLines> {
        PdfParser::open_with_options(path, self.parse_options.clone())?.lines()
    }

    /// Extract the outline of a PDF file.
    pub fn outline<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        Ok(self.extractor.extract(&self.lines(path)?))
    }

    /// Extract outline and sections of a PDF file.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<DocumentAnalysis> {
        Ok(self.extractor.analyze(&self.lines(path)?))
    }

    /// Extract outline and sections of an in-memory PDF.
    pub fn analyze_bytes(&self, data: &[u8], id: impl Into<String>) -> Result<DocumentAnalysis> {
        let parser = PdfParser::from_bytes_with_options(data, id, self.parse_options.clone())?;
        Ok(self.extractor.analyze(&parser.lines()?))
    }

    /// A batch processor sharing this configuration.
    pub fn batch(&self) -> BatchProcessor {
        BatchProcessor::new(self.extractor.clone()).with_parse_options(self.parse_options.clone())
    }
}
