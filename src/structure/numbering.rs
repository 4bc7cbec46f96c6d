//! Dotted numbering prefixes (`2.3.1 Results`) and per-document promotion
//! state.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::sizes::{size_key, SizeKey};
use crate::model::Level;

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)+").unwrap())
}

/// The dotted numeric prefix of a heading, e.g. `"2.3"` for `"2.3 Scope"`.
///
/// Single numbers (`"1 Introduction"`) carry no prefix.
pub fn numbering_prefix(text: &str) -> Option<&str> {
    prefix_pattern().find(text.trim_start()).map(|m| m.as_str())
}

/// Depth implied by the prefix: `"2.3.1"` → 3.
pub fn numbering_level(text: &str) -> Option<u32> {
    numbering_prefix(text).map(|prefix| prefix.split('.').count() as u32)
}

/// The prefix of the enclosing heading: `"2.3.1"` → `"2.3"`, `"2.3"` → `"2"`.
pub fn parent_prefix(prefix: &str) -> Option<&str> {
    prefix.rfind('.').map(|dot| &prefix[..dot])
}

/// Font sizes most recently used at each numbering depth.
///
/// One context serves exactly one document; create a fresh one per parse.
#[derive(Debug, Default)]
pub struct NumberingContext {
    last_size: BTreeMap<u32, SizeKey>,
}

impl NumberingContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the level of a numbered heading and record its size.
    ///
    /// The heading takes `H{depth}` unless the line is larger than a size
    /// already recorded at a shallower depth, in which case the font-derived
    /// level wins. Depth starts at 2: single numbers (`"1 Introduction"`)
    /// carry no prefix and take the font-derived level in the assembler.
    pub fn assign(&mut self, depth: u32, size: f32, font_level: Level) -> Level {
        let key = size_key(size);
        let promote = self
            .last_size
            .range(..depth)
            .any(|(_, &recorded)| key > recorded);

        let level = if promote {
            font_level
        } else {
            Level::new(depth)
        };

        self.last_size.insert(depth, key);
        level
    }

    /// Size recorded at a depth.
    pub fn recorded(&self, depth: u32) -> Option<f32> {
        self.last_size.get(&depth).map(|&k| k as f32 / 10.0)
    }
}
