//! Titled body sections.

use serde::{Deserialize, Serialize};

/// Body text spanning from one retained heading to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the originating document
    #[serde(rename = "document")]
    pub document_id: String,
    /// Heading text
    pub section_title: String,
    /// Page the heading sits on
    pub page_number: u32,
    /// Body lines joined by newlines
    pub text: String,
}

impl Section {
    /// Number of body lines.
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_json_shape() {
        let section = Section {
            document_id: "guide.pdf".into(),
            section_title: "Getting Started Quickly".into(),
            page_number: 2,
            text: "line one\nline two".into(),
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["document"], "guide.pdf");
        assert_eq!(json["section_title"], "Getting Started Quickly");
        assert_eq!(json["page_number"], 2);
        assert_eq!(section.line_count(), 2);
    }
}
