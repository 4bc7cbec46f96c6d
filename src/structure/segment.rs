//! Section segmentation: slicing the line stream at the dominant headings.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::options::StructureOptions;
use super::sizes::size_key;
use crate::model::{DocumentLines, Heading, Level, Outline, Section};
use crate::text;

fn numbered_item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+\. ").unwrap())
}

/// Whether a heading looks like a real section title rather than a list item
/// or a short fragment.
pub fn is_true_heading(
    text: &str,
    size: f32,
    is_bold: bool,
    min_size: f32,
    max_size: f32,
    min_words: usize,
) -> bool {
    if size < min_size || size > max_size {
        return false;
    }
    if !is_bold && !text::is_title_case(text) && !text::is_all_upper(text) {
        return false;
    }
    let trimmed = text.trim();
    if trimmed.starts_with(['-', '•', '*']) || numbered_item_pattern().is_match(trimmed) {
        return false;
    }
    text::word_count(text) >= min_words
}

/// The headings that open sections.
///
/// With font sizes known, these are the true headings at the most common
/// heading size (ties go to the size seen first). Without sizes, the
/// headings at the most common level.
pub fn dominant_headings<'h>(headings: &'h [Heading], options: &StructureOptions) -> Vec<&'h Heading> {
    let sized: Vec<(&Heading, f32)> = headings
        .iter()
        .filter_map(|h| h.layout.font_size.map(|s| (h, s)))
        .collect();

    if sized.is_empty() {
        let Some(level) = most_common(headings.iter().map(|h| h.level)) else {
            return Vec::new();
        };
        return headings.iter().filter(|h| h.level == level).collect();
    }

    let min_size = sized.iter().map(|&(_, s)| s).fold(f32::INFINITY, f32::min);
    let max_size = sized.iter().map(|&(_, s)| s).fold(f32::NEG_INFINITY, f32::max);
    let Some(common) = most_common(sized.iter().map(|&(_, s)| size_key(s))) else {
        return Vec::new();
    };

    sized
        .into_iter()
        .filter(|&(h, s)| {
            size_key(s) == common
                && is_true_heading(
                    &h.text,
                    s,
                    h.layout.is_bold,
                    min_size,
                    max_size,
                    options.min_section_words,
                )
        })
        .map(|(h, _)| h)
        .collect()
}

fn most_common<T, I>(items: I) -> Option<T>
where
    T: Copy + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, item) in items.into_iter().enumerate() {
        counts.entry(item).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(item, _)| item)
}

/// Where a heading sits in the line stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingLocation {
    /// Index of the heading's first line, or of the page's first line when
    /// the heading could not be found
    pub index: usize,
    /// Lines occupied by the heading itself (0 when not found)
    pub span: usize,
}

/// Find a heading's first line on its page, searching from `from` first.
pub fn locate_heading(doc: &DocumentLines, heading: &Heading, from: usize) -> HeadingLocation {
    let range = doc.page_range(heading.page);
    let anchor = if heading.layout.anchor.is_empty() {
        &heading.text
    } else {
        &heading.layout.anchor
    };
    let wanted = text::normalize_text(anchor);
    let matches = |i: &usize| text::normalize_text(&doc.lines[*i].text) == wanted;

    let start = from.clamp(range.start, range.end);
    let found = (start..range.end)
        .find(matches)
        .or_else(|| (range.start..start).find(matches));

    match found {
        Some(index) => HeadingLocation {
            index,
            span: heading.layout.line_span.max(1),
        },
        None => {
            log::warn!(
                "{}: heading {:?} not found on page {}, anchoring at page start",
                doc.id,
                heading.text,
                heading.page
            );
            HeadingLocation {
                index: range.start,
                span: 0,
            }
        }
    }
}

/// Carve a document into sections, one per dominant heading.
pub fn segment(doc: &DocumentLines, outline: &Outline, options: &StructureOptions) -> Vec<Section> {
    let headings = dominant_headings(&outline.headings, options);
    if headings.is_empty() {
        return Vec::new();
    }

    let mut locations = Vec::with_capacity(headings.len());
    let mut cursor = 0;
    for heading in &headings {
        let location = locate_heading(doc, heading, cursor);
        cursor = location.index + location.span;
        locations.push(location);
    }

    let mut sections = Vec::new();
    for (i, heading) in headings.iter().enumerate() {
        if heading.text.trim().chars().count() < 3 {
            continue;
        }

        let start = locations[i].index + locations[i].span;
        let end = locations
            .get(i + 1)
            .map_or(doc.lines.len(), |next| next.index);
        if end <= start {
            continue;
        }

        let body: Vec<&str> = doc.lines[start..end]
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if body.is_empty() {
            continue;
        }

        sections.push(Section {
            document_id: doc.id.clone(),
            section_title: heading.text.clone(),
            page_number: heading.page,
            text: body.join("\n"),
        });
    }

    log::debug!(
        "{}: {} sections from {} dominant headings",
        doc.id,
        sections.len(),
        headings.len()
    );
    sections
}

/// Heading level most sections were cut at, for reporting.
pub fn section_level(outline: &Outline, options: &StructureOptions) -> Option<Level> {
    most_common(
        dominant_headings(&outline.headings, options)
            .into_iter()
            .map(|h| h.level),
    )
}
