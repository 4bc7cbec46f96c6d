//! Outline types: heading levels, headings, and the document outline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Heading rank. `Level(1)` renders as `"H1"`; smaller numbers are more
/// prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    /// The top level, `H1`.
    pub const TOP: Level = Level(1);

    /// Create a level; values below 1 are clamped to 1.
    pub fn new(n: u32) -> Self {
        Level(n.max(1))
    }

    /// The numeric rank (1 for `H1`).
    pub fn number(self) -> u32 {
        self.0
    }

    /// The next more prominent level, never above `H1`.
    pub fn raised(self) -> Self {
        Level::new(self.0.saturating_sub(1))
    }

    /// The next less prominent level.
    pub fn lowered(self) -> Self {
        Level(self.0 + 1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('H')
            .or_else(|| s.strip_prefix('h'))
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n >= 1)
            .map(Level)
            .ok_or_else(|| format!("invalid heading level: {s:?}"))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Layout facts about a heading that the segmenter needs but the outline
/// output does not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadingLayout {
    /// Font size of the heading line(s)
    pub font_size: Option<f32>,
    /// Whether the heading is set in bold
    pub is_bold: bool,
    /// Top edge of the first physical line
    pub top_y: f32,
    /// Text of the first physical line (differs from the heading text when
    /// several lines were merged)
    pub anchor: String,
    /// Number of physical lines the heading occupies
    pub line_span: usize,
}

/// A finalized outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Hierarchy rank
    pub level: Level,
    /// Heading text
    pub text: String,
    /// 1-indexed page number
    pub page: u32,
    /// Best-effort language tag ("en", ISO code, or "unknown")
    #[serde(rename = "lang", default = "unknown_lang")]
    pub language: String,
    /// Layout details, not serialized
    #[serde(skip)]
    pub layout: HeadingLayout,
}

fn unknown_lang() -> String {
    "unknown".to_string()
}

impl Heading {
    /// Create a heading without layout details.
    pub fn new(level: Level, text: impl Into<String>, page: u32) -> Self {
        let text = text.into();
        Self {
            level,
            layout: HeadingLayout {
                anchor: text.clone(),
                line_span: 1,
                ..HeadingLayout::default()
            },
            text,
            page,
            language: unknown_lang(),
        }
    }

    /// Attach layout details.
    pub fn with_layout(mut self, layout: HeadingLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Document title plus headings in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,
    /// Headings ordered by page, then position
    #[serde(rename = "outline")]
    pub headings: Vec<Heading>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: impl Into<String>, headings: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            headings,
        }
    }

    /// Whether no headings were detected.
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.headings.len()
    }

    /// Headings at a given level.
    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }
}
