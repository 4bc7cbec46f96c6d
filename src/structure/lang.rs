//! Best-effort language tagging for headings.

use std::collections::BTreeMap;

/// Tags a text with a language code (`"en"`, `"ja"`, ...) or `"unknown"`.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> String;
}

impl<F> LanguageDetector for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn detect(&self, text: &str) -> String {
        self(text)
    }
}

/// Tag returned when no language can be determined.
pub const UNKNOWN: &str = "unknown";

const MIN_CHARS: usize = 10;

const ENGLISH: &[&str] = &[
    "the", "and", "of", "in", "to", "for", "with", "on", "by", "is", "as", "at", "from", "an",
    "be", "are", "or", "that", "this", "it",
];

const LATIN_STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", ENGLISH),
    (
        "fr",
        &[
            "le", "la", "les", "des", "du", "et", "est", "une", "pour", "dans", "par", "sur", "au",
            "aux", "avec", "qui", "ce", "ces",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "mit", "von", "den", "zu", "ein", "eine",
            "für", "auf", "dem", "im", "zur", "über",
        ],
    ),
    (
        "es",
        &[
            "el", "los", "las", "del", "y", "que", "por", "para", "con", "una", "su", "al", "como",
            "más", "sobre",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "di", "della", "delle", "e", "che", "per", "non", "nel", "nella",
            "sono", "alla",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "do", "da", "dos", "das", "em", "não", "no", "na", "com", "uma", "um",
            "pelo", "pela", "ao",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
    Latin,
    Hangul,
    Kana,
    Han,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
}

impl Script {
    fn of(c: char) -> Option<Script> {
        let script = match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => Script::Latin,
            0x0370..=0x03FF => Script::Greek,
            0x0400..=0x04FF => Script::Cyrillic,
            0x0590..=0x05FF => Script::Hebrew,
            0x0600..=0x06FF => Script::Arabic,
            0x0900..=0x097F => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x1100..=0x11FF | 0xAC00..=0xD7AF | 0x3130..=0x318F => Script::Hangul,
            0x3040..=0x30FF => Script::Kana,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
            _ => return None,
        };
        Some(script)
    }

    fn tag(self) -> &'static str {
        match self {
            Script::Latin => UNKNOWN,
            Script::Hangul => "ko",
            Script::Kana => "ja",
            Script::Han => "zh",
            Script::Cyrillic => "ru",
            Script::Greek => "el",
            Script::Arabic => "ar",
            Script::Hebrew => "he",
            Script::Devanagari => "hi",
            Script::Thai => "th",
        }
    }
}

/// Script majority for non-Latin text, stop-word vote for Latin text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    fn dominant_script(text: &str) -> Option<Script> {
        let mut counts: BTreeMap<Script, usize> = BTreeMap::new();
        for script in text.chars().filter_map(Script::of) {
            *counts.entry(script).or_default() += 1;
        }

        // Japanese mixes kana with kanji.
        if counts.contains_key(&Script::Kana) {
            let han = counts.remove(&Script::Han).unwrap_or(0);
            *counts.entry(Script::Kana).or_default() += han;
        }

        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then((b.0 == Script::Latin).cmp(&(a.0 == Script::Latin))))
            .map(|(script, _)| script)
    }

    fn latin_language(text: &str) -> Option<&'static str> {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        if is_mostly_ascii(text) && tokens.iter().any(|t| ENGLISH.contains(&t.as_str())) {
            return Some("en");
        }

        let mut best: Option<(&'static str, usize)> = None;
        for (lang, stop_words) in LATIN_STOP_WORDS {
            let hits = tokens
                .iter()
                .filter(|t| stop_words.contains(&t.as_str()))
                .count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((*lang, hits));
            }
        }
        best.map(|(lang, _)| lang)
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> String {
        if text.trim().chars().count() < MIN_CHARS {
            return UNKNOWN.to_string();
        }

        let lang = match Self::dominant_script(text) {
            Some(Script::Latin) => Self::latin_language(text).unwrap_or(UNKNOWN),
            Some(script) => script.tag(),
            None => UNKNOWN,
        };
        lang.to_string()
    }
}

fn is_mostly_ascii(text: &str) -> bool {
    let total = text.chars().count().max(1);
    let ascii = text.chars().filter(char::is_ascii).count();
    ascii as f32 / total as f32 > 0.85
}
