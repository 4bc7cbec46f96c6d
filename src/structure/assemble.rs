//! Heading assembly: candidate selection, multi-line merging, level
//! assignment and de-duplication.

use std::collections::HashSet;

use super::filter::LineFilter;
use super::numbering::{self, NumberingContext};
use super::options::StructureOptions;
use super::sizes::{size_key, SizeProfile};
use super::title::TitleBlock;
use crate::model::{Heading, HeadingLayout, Level, LineRecord};
use crate::text;

/// Trim a line and keep it only if it has at least 3 characters and a
/// letter.
pub fn clean_heading(text: &str) -> Option<String> {
    let cleaned = text::normalize_text(text);
    if cleaned.chars().count() < 3 || !cleaned.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(cleaned)
}

/// A line that passed the filter, possibly merged with its continuation
/// lines.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub text: String,
    pub font_size: f32,
    pub is_bold: bool,
    pub top_y: f32,
    pub page: u32,
    /// Depth of the dotted numbering prefix, if any
    pub numbering_level: Option<u32>,
    /// Index of the first physical line in the document line stream
    pub line_index: usize,
    /// Text of the first physical line
    pub anchor: String,
    /// Number of physical lines merged into this candidate
    pub line_span: usize,
}

impl HeadingCandidate {
    fn from_line(index: usize, line: &LineRecord, text: String) -> Self {
        Self {
            numbering_level: numbering::numbering_level(&text),
            font_size: line.font_size,
            is_bold: line.is_bold,
            top_y: line.top_y,
            page: line.page,
            line_index: index,
            anchor: text.clone(),
            line_span: 1,
            text,
        }
    }

    fn last_line_index(&self) -> usize {
        self.line_index + self.line_span - 1
    }
}

/// Turns one document's lines into leveled headings.
pub struct HeadingAssembler<'a> {
    profile: &'a SizeProfile,
    filter: LineFilter<'a>,
    title: &'a TitleBlock,
    options: &'a StructureOptions,
}

impl<'a> HeadingAssembler<'a> {
    /// Create an assembler for one document.
    pub fn new(
        profile: &'a SizeProfile,
        filter: LineFilter<'a>,
        title: &'a TitleBlock,
        options: &'a StructureOptions,
    ) -> Self {
        Self {
            profile,
            filter,
            title,
            options,
        }
    }

    /// Run candidate selection, merging and level assignment.
    pub fn assemble(&self, lines: &[LineRecord]) -> Vec<Heading> {
        let mut candidates = self.candidates(lines);
        if self.options.merge_multiline {
            candidates = merge_multiline(candidates, lines, self.options.merge_gap_factor);
        }
        self.assign_levels(candidates)
    }

    /// Lines that pass the filter, in document order.
    ///
    /// Numbered lines skip the composite score: the prefix is already a
    /// structural cue.
    pub fn candidates(&self, lines: &[LineRecord]) -> Vec<HeadingCandidate> {
        let mut candidates = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(text) = clean_heading(&line.text) else {
                continue;
            };

            let verdict = if numbering::numbering_prefix(&text).is_some() {
                self.filter.check_without_score(line, &text)
            } else {
                self.filter.check(line, &text)
            };

            match verdict {
                Ok(()) => candidates.push(HeadingCandidate::from_line(index, line, text)),
                Err(reason) => {
                    log::trace!("page {}: rejected {:?}: {}", line.page, text, reason)
                }
            }
        }

        candidates
    }

    /// Assign levels, then drop title lines and duplicates.
    pub fn assign_levels(&self, candidates: Vec<HeadingCandidate>) -> Vec<Heading> {
        let mut numbering = NumberingContext::new();
        let mut seen: HashSet<(Level, String, u32)> = HashSet::new();
        let mut headings = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let font_level = self.profile.level_or_top(candidate.font_size);
            let level = match candidate.numbering_level {
                Some(depth) => numbering.assign(depth, candidate.font_size, font_level),
                None => font_level,
            };

            if candidate.page == 1
                && (self.title.contains(&candidate.text) || self.title.contains(&candidate.anchor))
            {
                log::trace!("skipping title line {:?}", candidate.text);
                continue;
            }

            let key = (level, text::normalize_key(&candidate.text), candidate.page);
            if !seen.insert(key) {
                log::trace!("duplicate heading {:?} on page {}", candidate.text, candidate.page);
                continue;
            }

            let layout = HeadingLayout {
                font_size: Some(candidate.font_size),
                is_bold: candidate.is_bold,
                top_y: candidate.top_y,
                anchor: candidate.anchor,
                line_span: candidate.line_span,
            };
            headings.push(Heading::new(level, candidate.text, candidate.page).with_layout(layout));
        }

        headings
    }
}

/// Join headings wrapped over consecutive physical lines.
///
/// A candidate is absorbed into the previous one when it is the next line in
/// the stream, sits on the same page with the same size, starts less than
/// `gap_factor * size` below the previous line and has no numbering prefix
/// of its own.
pub fn merge_multiline(
    candidates: Vec<HeadingCandidate>,
    lines: &[LineRecord],
    gap_factor: f32,
) -> Vec<HeadingCandidate> {
    let mut merged: Vec<HeadingCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if let Some(current) = merged.last_mut() {
            let previous_top = lines
                .get(current.last_line_index())
                .map_or(current.top_y, |l| l.top_y);
            let continues = candidate.line_index == current.last_line_index() + 1
                && candidate.page == current.page
                && size_key(candidate.font_size) == size_key(current.font_size)
                && candidate.numbering_level.is_none()
                && (candidate.top_y - previous_top).abs() < gap_factor * current.font_size;

            if continues {
                current.text.push(' ');
                current.text.push_str(&candidate.text);
                current.line_span += 1;
                current.is_bold |= candidate.is_bold;
                continue;
            }
        }
        merged.push(candidate);
    }

    merged
}
