//! The layout line stream: one record per physical text line.

use serde::{Deserialize, Serialize};

/// A physical text line as produced by the layout extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line text (spans joined, whitespace-normalized)
    pub text: String,
    /// Largest font size among the line's spans, in points
    pub font_size: f32,
    /// Whether any span uses a bold face
    pub is_bold: bool,
    /// Distance of the line's top edge from the top of the page
    pub top_y: f32,
    /// 1-indexed page number
    pub page: u32,
}

impl LineRecord {
    /// Create a new line record.
    pub fn new(text: impl Into<String>, font_size: f32, is_bold: bool, top_y: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            top_y,
            page,
        }
    }
}

/// All lines of one document, in reading order (page, then position).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentLines {
    /// Stable document identifier, normally the file's base name
    pub id: String,
    /// Title from the document information dictionary, if any
    #[serde(default)]
    pub metadata_title: Option<String>,
    /// Number of pages, including pages without text
    #[serde(default)]
    pub page_count: u32,
    /// Line records in reading order
    pub lines: Vec<LineRecord>,
}

impl DocumentLines {
    /// Build a line stream. Lines are stably ordered by page; order within a
    /// page is kept as given. The page count is the highest page seen.
    pub fn new(id: impl Into<String>, mut lines: Vec<LineRecord>) -> Self {
        lines.sort_by_key(|l| l.page);
        let page_count = lines.iter().map(|l| l.page).max().unwrap_or(0);
        Self {
            id: id.into(),
            metadata_title: None,
            page_count,
            lines,
        }
    }

    /// Set the metadata title.
    pub fn with_metadata_title(mut self, title: impl Into<String>) -> Self {
        self.metadata_title = Some(title.into());
        self
    }

    /// Set the page count (never below the highest page number in the stream).
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = self.page_count.max(page_count);
        self
    }

    /// Whether the document has no text lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines on one page, in reading order.
    pub fn page_lines(&self, page: u32) -> impl Iterator<Item = &LineRecord> {
        self.lines.iter().filter(move |l| l.page == page)
    }

    /// Index range of a page's lines within [`Self::lines`].
    pub fn page_range(&self, page: u32) -> std::ops::Range<usize> {
        let start = self.lines.partition_point(|l| l.page < page);
        let end = self.lines.partition_point(|l| l.page <= page);
        start..end
    }

    /// Every observed font size, one per line.
    pub fn font_sizes(&self) -> Vec<f32> {
        self.lines.iter().map(|l| l.font_size).collect()
    }

    /// Parse a line stream from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mut doc: DocumentLines = serde_json::from_str(json)?;
        doc.lines.sort_by_key(|l| l.page);
        let highest = doc.lines.iter().map(|l| l.page).max().unwrap_or(0);
        doc.page_count = doc.page_count.max(highest);
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentLines {
        DocumentLines::new(
            "sample.pdf",
            vec![
                LineRecord::new("b", 10.0, false, 100.0, 2),
                LineRecord::new("a", 10.0, false, 100.0, 1),
                LineRecord::new("c", 10.0, false, 200.0, 2),
                LineRecord::new("d", 12.0, true, 50.0, 4),
            ],
        )
    }

    #[test]
    fn test_lines_sorted_by_page() {
        let doc = sample();
        let texts: Vec<&str> = doc.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        assert_eq!(doc.page_count, 4);
    }

    #[test]
    fn test_page_range() {
        let doc = sample();
        assert_eq!(doc.page_range(1), 0..1);
        assert_eq!(doc.page_range(2), 1..3);
        assert_eq!(doc.page_range(3), 3..3);
        assert_eq!(doc.page_lines(2).count(), 2);
    }

    #[test]
    fn test_page_count_floor() {
        let doc = sample().with_page_count(2);
        assert_eq!(doc.page_count, 4);
        let doc = sample().with_page_count(9);
        assert_eq!(doc.page_count, 9);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "id": "x.pdf",
            "lines": [
                {"text": "Second", "font_size": 10.0, "is_bold": false, "top_y": 80.0, "page": 2},
                {"text": "First", "font_size": 14.0, "is_bold": true, "top_y": 60.0, "page": 1}
            ]
        }"#;
        let doc = DocumentLines::from_json(json).unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.lines[0].text, "First");
        assert!(doc.metadata_title.is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            DocumentLines::from_json("[1, 2"),
            Err(crate::Error::InvalidLines(_))
        ));
    }
}
