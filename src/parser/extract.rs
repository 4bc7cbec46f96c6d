//! Line extraction: content stream → text spans → physical lines →
//! [`LineRecord`]s.
//!
//! Spans are positioned with a minimal text-state machine, grouped into lines
//! by baseline, and read column by column when the page has a two-column
//! layout. Coordinates are converted to a top-left origin so that `top_y`
//! grows down the page.

use std::collections::HashMap;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use super::options::ParseOptions;
use crate::error::{Error, Result};
use crate::model::LineRecord;
use crate::text;

/// Spans whose baselines differ by less than this share of the font size
/// belong to the same line.
const LINE_TOLERANCE: f32 = 0.3;

/// Upper bound on page width for column detection (200 inches).
const MAX_PAGE_WIDTH: f32 = 14_400.0;

/// A run of text drawn by a single show-text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline, PDF coordinates (origin bottom-left)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a span; boldness is read from the font name. Negative sizes
    /// (mirrored glyphs) are taken by magnitude.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let font_size = font_size.abs();
        let lower = font_name.to_lowercase();
        let is_bold = ["bold", "black", "heavy"].iter().any(|w| lower.contains(w));
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
        }
    }

    /// Approximate top of the glyphs (ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }

    fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Horizontal extent, ordered and clamped to `0..=page_width`.
    fn extent(&self, page_width: f32) -> (f32, f32) {
        let clamp = |x: f32| if x.is_nan() { 0.0 } else { x.clamp(0.0, page_width) };
        let (a, b) = (clamp(self.x), clamp(self.right()));
        (a.min(b), a.max(b))
    }
}

/// Spans sharing a baseline, left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Build a line, ordering spans by x.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { spans }
    }

    /// Largest span size.
    pub fn font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }

    /// Whether any span is bold.
    pub fn is_bold(&self) -> bool {
        self.spans.iter().any(|s| s.is_bold)
    }

    /// Highest glyph top across spans.
    pub fn top(&self) -> f32 {
        self.spans.iter().map(TextSpan::top).fold(f32::MIN, f32::max)
    }

    /// Baseline of the first span.
    pub fn baseline(&self) -> f32 {
        self.spans.first().map_or(0.0, |s| s.y)
    }

    /// Joined text. A space goes between spans separated by a visible gap,
    /// except between characters of scripts written without spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                let threshold = span.font_size * 0.5 * 0.2;
                let cjk_pair = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = result.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);
                if gap > threshold && !cjk_pair && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result
    }
}

/// Scripts that do not separate words with spaces (Han, kana). Hangul is
/// excluded: Korean uses word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x30FF
        | 0x3000..=0x303F)
}

/// Text state while walking a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_start: (f32, f32),
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_start: (0.0, 0.0),
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn reset(&mut self) {
        let leading = self.leading;
        *self = Self {
            leading,
            ..Self::default()
        };
    }

    fn set(&mut self, m: [f32; 6]) {
        let [a, b, c, d, e, f] = m;
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_start: (e, f),
            leading: self.leading,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let (x0, y0) = self.line_start;
        self.e = x0 + tx * self.a + ty * self.c;
        self.f = y0 + tx * self.b + ty * self.d;
        self.line_start = (self.e, self.f);
    }

    fn next_line(&mut self, fallback_leading: f32) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            fallback_leading
        };
        self.translate(0.0, -leading);
    }

    fn advance(&mut self, width: f32) {
        self.e += width * self.a;
        self.f += width * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Extracts line records from the pages of one document.
pub struct LineExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: &'a ParseOptions,
}

impl<'a, B: PdfBackend> LineExtractor<'a, B> {
    /// Create an extractor over a backend.
    pub fn new(backend: &'a B, options: &'a ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Line records of one page, top to bottom in reading order.
    pub fn extract_page(&self, page_num: u32) -> Result<Vec<LineRecord>> {
        let page_id = self.page_id(page_num)?;
        let (width, height) = self.backend.page_size(page_id);
        let spans = self.extract_page_spans(page_num)?;

        let lines = if self.options.detect_columns {
            group_spans_into_lines(spans, width)
        } else {
            group_single_column(spans)
        };

        Ok(lines
            .iter()
            .filter_map(|line| {
                let text = text::normalize_text(&line.text());
                (!text.is_empty()).then(|| {
                    LineRecord::new(
                        text,
                        line.font_size(),
                        line.is_bold(),
                        (height - line.top()).max(0.0),
                        page_num,
                    )
                })
            })
            .collect())
    }

    fn page_id(&self, page_num: u32) -> Result<PageId> {
        let pages = self.backend.pages();
        pages
            .get(&page_num)
            .copied()
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))
    }

    /// Positioned text spans of a page, in content-stream order.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let page_id = self.page_id(page_num)?;
        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name, f.base_font))
            .collect();
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        Ok(self.interpret(page_id, &ops, &fonts))
    }

    fn interpret(
        &self,
        page_id: PageId,
        ops: &[ContentOp],
        fonts: &HashMap<Vec<u8>, String>,
    ) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix.reset();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        font_name = fonts
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                        font_key = name.clone();
                    }
                    font_size = op.number(1, 12.0).abs();
                }
                "TL" => matrix.leading = op.number(0, 0.0),
                "Td" => matrix.translate(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    matrix.leading = -ty;
                    matrix.translate(op.number(0, 0.0), ty);
                }
                "Tm" if op.operands.len() >= 6 => matrix.set([
                    op.number(0, 1.0),
                    op.number(1, 0.0),
                    op.number(2, 0.0),
                    op.number(3, 1.0),
                    op.number(4, 0.0),
                    op.number(5, 0.0),
                ]),
                "T*" => matrix.next_line(font_size * 1.2),
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        matrix.next_line(font_size * 1.2);
                    }
                    if !in_text {
                        continue;
                    }
                    let text = self.show_text(page_id, &font_key, op);
                    if text.trim().is_empty() {
                        continue;
                    }
                    let (x, y) = matrix.position();
                    let span = TextSpan::new(text, x, y, font_size * matrix.scale(), font_name.clone());
                    matrix.advance(span.width / matrix.scale().max(f32::EPSILON));
                    spans.push(span);
                }
                _ => {}
            }
        }

        spans
    }

    /// Decode the string operand(s) of a show-text operator. In `TJ` arrays,
    /// kerning adjustments above 200 thousandths of an em become spaces.
    fn show_text(&self, page_id: PageId, font_key: &[u8], op: &ContentOp) -> String {
        let decode = |bytes: &[u8]| self.backend.decode_text(page_id, font_key, bytes);

        match op.operator.as_str() {
            "TJ" => {
                let Some(PdfValue::Array(items)) = op.operands.first() else {
                    return String::new();
                };
                let mut combined = String::new();
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => combined.push_str(&decode(bytes)),
                        other => {
                            let adjustment = -other.as_number().unwrap_or(0.0);
                            let breaks_word = adjustment > 200.0
                                && combined
                                    .chars()
                                    .last()
                                    .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                            if breaks_word {
                                combined.push(' ');
                            }
                        }
                    }
                }
                combined
            }
            "\"" => match op.operands.get(2) {
                Some(PdfValue::Str(bytes)) => decode(bytes),
                _ => String::new(),
            },
            _ => match op.operands.first() {
                Some(PdfValue::Str(bytes)) => decode(bytes),
                _ => String::new(),
            },
        }
    }
}

/// A column's horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub left: f32,
    pub right: f32,
}

impl Column {
    fn holds(&self, span: &TextSpan) -> bool {
        (self.left..=self.right).contains(&span.center())
    }
}

/// Find a vertical gutter splitting the page into two columns.
///
/// The page width is cut into 3pt slices; the widest empty run in the middle
/// 70% of the page (at least 12pt) is a gutter candidate. It is accepted
/// only when both sides are at least 80pt wide and each holds a tenth of the
/// spans (and at least two). Span extents are clamped to the page width.
pub fn detect_columns(spans: &[TextSpan], page_width: f32) -> Vec<Column> {
    const SLICE: f32 = 3.0;

    if spans.is_empty() {
        return Vec::new();
    }
    let page_width = if page_width.is_finite() && page_width > 0.0 {
        page_width.min(MAX_PAGE_WIDTH)
    } else {
        MAX_PAGE_WIDTH
    };

    let extents: Vec<(f32, f32)> = spans.iter().map(|s| s.extent(page_width)).collect();
    let min_x = extents.iter().map(|e| e.0).fold(f32::INFINITY, f32::min);
    let max_x = extents.iter().map(|e| e.1).fold(f32::NEG_INFINITY, f32::max);
    if max_x - min_x < 250.0 {
        return Vec::new();
    }

    let slices = ((max_x - min_x) / SLICE) as usize + 1;
    let mut occupied = vec![false; slices];
    for &(left, right) in &extents {
        let first = (((left - min_x) / SLICE) as usize).min(slices - 1);
        let last = (((right - min_x) / SLICE) as usize).min(slices - 1);
        for slot in &mut occupied[first..=last] {
            *slot = true;
        }
    }

    let (lo, hi) = (slices * 15 / 100, slices * 85 / 100);
    let center = slices as f32 / 2.0;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for i in lo..=hi.min(slices) {
        let empty = i < hi && !occupied[i];
        match (empty, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                let len = i - start;
                let better = best.map_or(true, |(best_start, best_len)| {
                    let dist = |s: usize, l: usize| (s as f32 + l as f32 / 2.0 - center).abs();
                    len > best_len || (len == best_len && dist(start, len) < dist(best_start, best_len))
                });
                if better {
                    best = Some((start, len));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    let Some((start, len)) = best else {
        return Vec::new();
    };
    if len as f32 * SLICE < 12.0 {
        return Vec::new();
    }

    let gutter = min_x + (start as f32 + len as f32 / 2.0) * SLICE;
    if gutter - min_x < 80.0 || max_x - gutter < 80.0 {
        return Vec::new();
    }

    let left = spans.iter().filter(|s| s.center() < gutter).count();
    let right = spans.len() - left;
    let min_spans = (spans.len() / 10).max(2);
    if left < min_spans || right < min_spans {
        return Vec::new();
    }

    log::debug!("two columns, gutter at x={gutter:.1}");
    vec![
        Column {
            left: f32::NEG_INFINITY,
            right: gutter,
        },
        Column {
            left: gutter,
            right: f32::INFINITY,
        },
    ]
}

/// Group spans into lines, reading a two-column page column by column.
pub fn group_spans_into_lines(spans: Vec<TextSpan>, page_width: f32) -> Vec<TextLine> {
    let columns = detect_columns(&spans, page_width);
    if columns.is_empty() {
        return group_single_column(spans);
    }

    let mut per_column: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
    for span in spans {
        let index = columns.iter().position(|c| c.holds(&span)).unwrap_or(0);
        per_column[index].push(span);
    }

    per_column.into_iter().flat_map(group_single_column).collect()
}

/// Group spans into lines by baseline, top to bottom.
pub fn group_single_column(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    for span in spans {
        let same_line = current
            .first()
            .is_some_and(|first| (span.y - first.y).abs() <= span.font_size * LINE_TOLERANCE);
        if !same_line && !current.is_empty() {
            lines.push(TextLine::from_spans(std::mem::take(&mut current)));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::parser::backend::{decode_text_simple, BackendFontInfo};

    struct MockBackend {
        ops: Vec<ContentOp>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (3, 0))])
        }

        fn page_size(&self, _page: PageId) -> (f32, f32) {
            (612.0, 792.0)
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![
                BackendFontInfo {
                    name: b"F1".to_vec(),
                    base_font: "Helvetica-Bold".into(),
                },
                BackendFontInfo {
                    name: b"F2".to_vec(),
                    base_font: "Helvetica".into(),
                },
            ])
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }

        fn info_string(&self, _key: &[u8]) -> Option<String> {
            None
        }
    }

    fn name(n: &str) -> PdfValue {
        PdfValue::Name(n.as_bytes().to_vec())
    }

    fn string(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn num(n: f32) -> PdfValue {
        PdfValue::Real(n)
    }

    fn sample_ops() -> Vec<ContentOp> {
        vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![name("F1"), num(18.0)]),
            ContentOp::new("Td", vec![num(72.0), num(700.0)]),
            ContentOp::new("Tj", vec![string("Project Overview")]),
            ContentOp::new("ET", vec![]),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![name("F2"), num(10.0)]),
            ContentOp::new("TL", vec![num(14.0)]),
            ContentOp::new("Td", vec![num(72.0), num(650.0)]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    string("First"),
                    PdfValue::Integer(-250),
                    string("line"),
                ])],
            ),
            ContentOp::new("'", vec![string("Second line")]),
            ContentOp::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_extract_page_lines() {
        let backend = MockBackend { ops: sample_ops() };
        let options = ParseOptions::default();
        let lines = LineExtractor::new(&backend, &options).extract_page(1).unwrap();

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Project Overview", "First line", "Second line"]);

        assert!(lines[0].is_bold);
        assert_eq!(lines[0].font_size, 18.0);
        assert!((lines[0].top_y - (792.0 - (700.0 + 18.0 * 0.8))).abs() < 1e-3);
        assert!(!lines[1].is_bold);
        assert!(lines[2].top_y - lines[1].top_y > 13.0);
        assert!(lines.iter().all(|l| l.page == 1));
    }

    #[test]
    fn test_page_out_of_range() {
        let backend = MockBackend { ops: Vec::new() };
        let options = ParseOptions::default();
        let err = LineExtractor::new(&backend, &options).extract_page(4).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange(4, 1)));
    }

    #[test]
    fn test_bold_detection_from_font_name() {
        let span = TextSpan::new("x".into(), 0.0, 0.0, 12.0, "Arial-BoldMT".into());
        assert!(span.is_bold);
        let span = TextSpan::new("x".into(), 0.0, 0.0, 12.0, "Roboto-Black".into());
        assert!(span.is_bold);
        let span = TextSpan::new("x".into(), 0.0, 0.0, 12.0, "Times-Roman".into());
        assert!(!span.is_bold);
    }

    #[test]
    fn test_line_takes_max_size_and_any_bold() {
        let line = TextLine::from_spans(vec![
            TextSpan::new("Body".into(), 100.0, 500.0, 10.0, "Helvetica".into()),
            TextSpan::new("Big".into(), 50.0, 500.0, 14.0, "Helvetica-Bold".into()),
        ]);
        assert_eq!(line.font_size(), 14.0);
        assert!(line.is_bold());
        assert_eq!(line.text(), "Big Body");
    }

    #[test]
    fn test_cjk_spans_join_without_space() {
        let line = TextLine::from_spans(vec![
            TextSpan::new("概要".into(), 0.0, 500.0, 10.0, "F".into()),
            TextSpan::new("説明".into(), 30.0, 500.0, 10.0, "F".into()),
        ]);
        assert_eq!(line.text(), "概要説明");
    }

    #[test]
    fn test_two_column_reading_order() {
        let mut spans = Vec::new();
        for i in 0..10 {
            let y = 700.0 - i as f32 * 14.0;
            spans.push(TextSpan::new(format!("Left {i} text"), 50.0, y, 10.0, "F".into()));
            spans.push(TextSpan::new(format!("Right {i} text"), 330.0, y, 10.0, "F".into()));
        }

        let columns = detect_columns(&spans, 612.0);
        assert_eq!(columns.len(), 2);

        let lines = group_spans_into_lines(spans, 612.0);
        assert_eq!(lines.len(), 20);
        assert!(lines[..10].iter().all(|l| l.text().starts_with("Left")));
        assert!(lines[10..].iter().all(|l| l.text().starts_with("Right")));
    }

    #[test]
    fn test_narrow_page_is_single_column() {
        let spans = vec![
            TextSpan::new("Alpha".into(), 50.0, 700.0, 10.0, "F".into()),
            TextSpan::new("Beta".into(), 120.0, 700.0, 10.0, "F".into()),
        ];
        assert!(detect_columns(&spans, 612.0).is_empty());
        assert_eq!(group_spans_into_lines(spans, 612.0).len(), 1);
    }

    #[test]
    fn test_negative_font_size_is_mirrored_magnitude() {
        let span = TextSpan::new("Mirrored".into(), 400.0, 500.0, -10.0, "F".into());
        assert_eq!(span.font_size, 10.0);
        assert!(span.width > 0.0);

        let mut ops = sample_ops();
        ops[1] = ContentOp::new("Tf", vec![name("F1"), num(-18.0)]);
        let backend = MockBackend { ops };
        let options = ParseOptions::default();
        let lines = LineExtractor::new(&backend, &options).extract_page(1).unwrap();
        assert_eq!(lines[0].text, "Project Overview");
        assert_eq!(lines[0].font_size, 18.0);
    }

    #[test]
    fn test_columns_tolerate_reversed_spans() {
        let reversed = TextSpan {
            width: -215.0,
            ..TextSpan::new("x".repeat(43), 400.0, 600.0, 10.0, "F".into())
        };
        let spans = vec![
            TextSpan::new("Left margin note".into(), 0.0, 600.0, 10.0, "F".into()),
            reversed,
            TextSpan::new("Right edge".into(), 500.0, 600.0, 10.0, "F".into()),
        ];
        assert!(detect_columns(&spans, 612.0).is_empty());
        assert_eq!(group_spans_into_lines(spans, 612.0).len(), 1);
    }

    #[test]
    fn test_columns_clamp_far_offscreen_spans() {
        let spans = vec![
            TextSpan::new("On page".into(), 50.0, 600.0, 10.0, "F".into()),
            TextSpan::new("Far away".into(), 1.0e30, 600.0, 10.0, "F".into()),
            TextSpan::new("Nowhere".into(), f32::NAN, 580.0, 10.0, "F".into()),
        ];
        assert!(detect_columns(&spans, 612.0).is_empty());
        assert!(detect_columns(&spans, f32::INFINITY).is_empty());
    }
}
