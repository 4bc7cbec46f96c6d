//! PDF document parser using lopdf.

use std::path::Path;

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result};
use crate::model::{DocumentLines, LineRecord};

use super::backend::{LopdfBackend, PdfBackend};
use super::extract::LineExtractor;
use super::options::{ErrorMode, ParseOptions};

/// Reads the layout line stream of one PDF document.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
    id: String,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options. The document id is the file's
    /// base name.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        sniff_path(path)?;

        let backend = LopdfBackend::load_file(path)?;
        let id = document_id(path);
        Self::with_backend(backend, options, id)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8], id: impl Into<String>) -> Result<Self> {
        Self::from_bytes_with_options(data, id, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(
        data: &[u8],
        id: impl Into<String>,
        options: ParseOptions,
    ) -> Result<Self> {
        sniff_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Self::with_backend(backend, options, id.into())
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions, id: String) -> Result<Self> {
        // lopdf 0.34 cannot decrypt; text from encrypted streams is garbage.
        if backend.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self {
            backend,
            options,
            id,
        })
    }

    /// Document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Title from the document information dictionary, if set and non-blank.
    pub fn metadata_title(&self) -> Option<String> {
        self.backend
            .info_string(b"Title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Extract the line stream of every page.
    pub fn lines(&self) -> Result<DocumentLines> {
        let extractor = LineExtractor::new(&self.backend, &self.options);
        let page_count = self.page_count();
        let mut lines: Vec<LineRecord> = Vec::new();

        for page_num in self.backend.pages().into_keys() {
            match extractor.extract_page(page_num) {
                Ok(page_lines) => lines.extend(page_lines),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("{}: skipping page {}: {}", self.id, page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "{}: {} lines from {} pages",
            self.id,
            lines.len(),
            page_count
        );

        let mut doc = DocumentLines::new(self.id.clone(), lines).with_page_count(page_count);
        if let Some(title) = self.metadata_title() {
            doc = doc.with_metadata_title(title);
        }
        Ok(doc)
    }
}

/// File base name used to identify a document in outputs.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_file() {
        let result = PdfParser::open("/nonexistent/report.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = PdfParser::from_bytes(b"PK\x03\x04 not a pdf", "archive.zip");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_truncated_pdf_is_unreadable() {
        let result = PdfParser::from_bytes(b"%PDF-1.7\n1 0 obj\n<<", "broken.pdf");
        let err = result.err().unwrap();
        assert!(err.is_unreadable());
    }

    #[test]
    fn test_document_id_is_base_name() {
        assert_eq!(document_id(Path::new("/data/in/report.pdf")), "report.pdf");
        assert_eq!(document_id(Path::new("plain.pdf")), "plain.pdf");
    }
}
