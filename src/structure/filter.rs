//! Heading candidacy: rejects lines that look like body text, list bullets,
//! form fields, running headers and footers.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::options::StructureOptions;
use super::sizes::SizeProfile;
use crate::model::LineRecord;
use crate::text;

/// Function words that rarely make up a heading.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "of", "in", "to", "for", "with", "on", "by", "is", "as", "at", "from", "an",
    "be", "are", "or", "that", "this", "it",
];

const BULLETS: &[char] = &['•', '-', '‣', '◦', '▪', '●', '*', '–'];
const TERMINAL_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?'];

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_ ]+:$").unwrap())
}

/// Why a line was not accepted as a heading candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No size signal treats the line's size as a heading size
    NotHeadingSize,
    /// Below the smallest ranked heading size and not bold
    BelowFloor,
    /// Fewer than 4 characters or no word
    TooShort,
    /// Ends in `. , : ; ! ?`
    TerminalPunctuation,
    /// Entirely lower case
    LowerCase,
    /// Starts with a bullet glyph
    Bullet,
    /// More than half digits
    DigitHeavy,
    /// More than half punctuation or symbols
    SymbolHeavy,
    /// Mostly stop-words
    StopWordHeavy,
    /// Recurs on many pages
    Repeated,
    /// Looks like a form field or label
    FormField,
    /// Composite layout score too low
    LowScore,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::NotHeadingSize => "size is not a heading size",
            Rejection::BelowFloor => "below heading floor and not bold",
            Rejection::TooShort => "too short",
            Rejection::TerminalPunctuation => "ends in punctuation",
            Rejection::LowerCase => "all lower case",
            Rejection::Bullet => "bullet item",
            Rejection::DigitHeavy => "mostly digits",
            Rejection::SymbolHeavy => "mostly symbols",
            Rejection::StopWordHeavy => "mostly stop-words",
            Rejection::Repeated => "repeated header/footer",
            Rejection::FormField => "form field",
            Rejection::LowScore => "low layout score",
        };
        f.write_str(reason)
    }
}

/// Texts that occur on more than `max(2, page_count / 2)` distinct pages.
pub fn find_repeated_lines(lines: &[LineRecord], page_count: u32) -> HashSet<String> {
    let mut pages_by_text: HashMap<&str, BTreeSet<u32>> = HashMap::new();
    for line in lines {
        pages_by_text
            .entry(line.text.trim())
            .or_default()
            .insert(line.page);
    }

    let threshold = (page_count / 2).max(2) as usize;
    pages_by_text
        .into_iter()
        .filter(|(_, pages)| pages.len() > threshold)
        .map(|(text, _)| text.to_string())
        .collect()
}

/// Heuristic for form labels and fill-in fields: two or more colons, mostly
/// very short words, or a bare `Label:`.
pub fn is_probable_form_field(text: &str) -> bool {
    let words: Vec<&str> = text::words(text).collect();
    if words.len() > 2 {
        let short = words.iter().filter(|w| w.chars().count() <= 3).count();
        if short as f32 / words.len() as f32 > 0.5 {
            return true;
        }
    }
    if text.matches(':').count() > 1 {
        return true;
    }
    label_pattern().is_match(text.trim())
}

/// Share of stop-words among the words, or `None` for two words or fewer.
pub fn stop_word_share(text: &str) -> Option<f32> {
    let words: Vec<String> = text::words(text).map(str::to_lowercase).collect();
    if words.len() <= 2 {
        return None;
    }
    let stops = words
        .iter()
        .filter(|w| STOP_WORDS.contains(&w.as_str()))
        .count();
    Some(stops as f32 / words.len() as f32)
}

/// Composite layout score: one point each for bold type, a top-of-page
/// position and a short text.
pub fn heading_score(line: &LineRecord, text: &str, options: &StructureOptions) -> u8 {
    let mut score = 0;
    if line.is_bold {
        score += 1;
    }
    if line.top_y < options.top_of_page {
        score += 1;
    }
    if text::word_count(text) <= options.short_heading_words {
        score += 1;
    }
    score
}

/// Textual rejections that do not depend on layout.
pub fn check_text(text: &str, options: &StructureOptions) -> Result<(), Rejection> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len < 4 || !trimmed.chars().any(char::is_alphanumeric) {
        return Err(Rejection::TooShort);
    }
    if trimmed.ends_with(TERMINAL_PUNCTUATION) {
        return Err(Rejection::TerminalPunctuation);
    }
    if text::is_all_lower(trimmed) {
        return Err(Rejection::LowerCase);
    }
    if trimmed.starts_with(BULLETS) {
        return Err(Rejection::Bullet);
    }

    let half = len / 2;
    if trimmed.chars().filter(char::is_ascii_digit).count() > half {
        return Err(Rejection::DigitHeavy);
    }
    let symbols = trimmed
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    if symbols > half {
        return Err(Rejection::SymbolHeavy);
    }
    if stop_word_share(trimmed).is_some_and(|share| share > options.stopword_ratio) {
        return Err(Rejection::StopWordHeavy);
    }
    Ok(())
}

/// Per-document heading candidacy filter.
pub struct LineFilter<'a> {
    profile: &'a SizeProfile,
    repeated: &'a HashSet<String>,
    options: &'a StructureOptions,
}

impl<'a> LineFilter<'a> {
    /// Create a filter over one document's size profile and repeated lines.
    pub fn new(
        profile: &'a SizeProfile,
        repeated: &'a HashSet<String>,
        options: &'a StructureOptions,
    ) -> Self {
        Self {
            profile,
            repeated,
            options,
        }
    }

    /// Size, text, repetition and form-field checks.
    pub fn check_without_score(&self, line: &LineRecord, text: &str) -> Result<(), Rejection> {
        if !self.profile.is_heading_size(line.font_size) {
            return Err(Rejection::NotHeadingSize);
        }
        if !line.is_bold && !self.profile.clears_floor(line.font_size) {
            return Err(Rejection::BelowFloor);
        }
        check_text(text, self.options)?;
        if self.repeated.contains(text.trim()) || self.repeated.contains(line.text.trim()) {
            return Err(Rejection::Repeated);
        }
        if is_probable_form_field(text) {
            return Err(Rejection::FormField);
        }
        Ok(())
    }

    /// Full candidacy check, composite score included.
    pub fn check(&self, line: &LineRecord, text: &str) -> Result<(), Rejection> {
        self.check_without_score(line, text)?;
        if heading_score(line, text, self.options) < self.options.min_heading_score {
            return Err(Rejection::LowScore);
        }
        Ok(())
    }
}
