//! Title extraction from the largest lines on page 1.

use std::collections::HashSet;

use super::options::StructureOptions;
use crate::model::LineRecord;
use crate::text;

/// Lines identified as the document title.
#[derive(Debug, Clone, Default)]
pub struct TitleBlock {
    lines: Vec<String>,
    keys: HashSet<String>,
}

impl TitleBlock {
    /// Collect title lines from page 1.
    ///
    /// A line belongs to the title when its size is within
    /// `title_size_ratio` of the page maximum and it starts above
    /// `title_top`, or when it has the maximum size itself (any position,
    /// at least 4 characters).
    pub fn from_lines(lines: &[LineRecord], options: &StructureOptions) -> Self {
        let first_page: Vec<&LineRecord> = lines
            .iter()
            .filter(|l| l.page == 1 && !l.text.trim().is_empty())
            .collect();
        let max_size = first_page
            .iter()
            .map(|l| l.font_size)
            .fold(0.0_f32, f32::max);

        let mut block = TitleBlock::default();
        if max_size <= 0.0 {
            return block;
        }

        for line in &first_page {
            let prominent =
                line.font_size >= max_size * options.title_size_ratio && line.top_y < options.title_top;
            let largest = (line.font_size - max_size).abs() < options.title_size_tolerance
                && line.text.trim().chars().count() >= 4;
            if prominent || largest {
                block.push(&line.text);
            }
        }

        block
    }

    fn push(&mut self, line: &str) {
        let line = text::normalize_text(line);
        if self.keys.insert(line.to_lowercase()) {
            self.lines.push(line);
        }
    }

    /// Whether no title line was found.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Title lines in encounter order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether a text matches a title line (case-insensitive).
    pub fn contains(&self, text: &str) -> bool {
        self.keys.contains(&text::normalize_key(text))
    }

    /// Title lines joined by a double space, or `None` when empty.
    pub fn text(&self) -> Option<String> {
        (!self.lines.is_empty()).then(|| self.lines.join("  "))
    }
}

/// Resolve the title: title block, then metadata title (unless blank or the
/// `untitled` placeholder), then the document id.
pub fn resolve_title(block: &TitleBlock, metadata_title: Option<&str>, document_id: &str) -> String {
    if let Some(title) = block.text() {
        return title;
    }

    metadata_title
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("untitled"))
        .map(str::to_string)
        .unwrap_or_else(|| document_id.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, size: f32, top: f32, page: u32) -> LineRecord {
        LineRecord::new(text, size, false, top, page)
    }

    #[test]
    fn test_title_block_selection() {
        let lines = vec![
            line("Annual Report", 24.0, 60.0, 1),
            line("Fiscal Year 2024", 21.0, 90.0, 1),
            line("Prepared by Finance", 12.0, 120.0, 1),
            line("Late Large Banner", 24.0, 700.0, 1),
            line("Huge On Page Two", 30.0, 50.0, 2),
        ];
        let block = TitleBlock::from_lines(&lines, &StructureOptions::default());

        assert_eq!(
            block.lines(),
            &["Annual Report", "Fiscal Year 2024", "Late Large Banner"]
        );
        assert_eq!(
            block.text().as_deref(),
            Some("Annual Report  Fiscal Year 2024  Late Large Banner")
        );
        assert!(block.contains("annual   REPORT"));
        assert!(!block.contains("Prepared by Finance"));
    }

    #[test]
    fn test_prominent_line_below_cutoff_is_ignored() {
        let lines = vec![
            line("Cover Title", 20.0, 100.0, 1),
            line("Subtitle Low", 19.0, 400.0, 1),
        ];
        let block = TitleBlock::from_lines(&lines, &StructureOptions::default());
        assert_eq!(block.lines(), &["Cover Title"]);
    }

    #[test]
    fn test_duplicate_title_lines_collapse() {
        let lines = vec![
            line("Product Guide", 20.0, 50.0, 1),
            line("PRODUCT GUIDE", 20.0, 80.0, 1),
        ];
        let block = TitleBlock::from_lines(&lines, &StructureOptions::default());
        assert_eq!(block.lines(), &["Product Guide"]);
    }

    #[test]
    fn test_fallback_chain() {
        let empty = TitleBlock::from_lines(&[], &StructureOptions::default());
        assert!(empty.is_empty());

        assert_eq!(resolve_title(&empty, Some(" Handbook "), "doc.pdf"), "Handbook");
        assert_eq!(resolve_title(&empty, Some("Untitled"), "doc.pdf"), "doc.pdf");
        assert_eq!(resolve_title(&empty, Some("   "), "doc.pdf"), "doc.pdf");
        assert_eq!(resolve_title(&empty, None, "doc.pdf"), "doc.pdf");
    }
}
