//! Integration tests for outline extraction over synthetic line streams.

use pdfsect::render::{outline_to_json, JsonFormat};
use pdfsect::structure::reconcile_hierarchy;
use pdfsect::{DocumentLines, Level, LineRecord, OutlineExtractor};

fn body(page: u32, range: std::ops::Range<u32>) -> Vec<LineRecord> {
    range
        .map(|i| {
            LineRecord::new(
                format!("Policy statement {i} describes the daily routine in detail."),
                10.0,
                false,
                150.0 + i as f32 * 14.0,
                page,
            )
        })
        .collect()
}

/// Four-page handbook with a running header, a title, chapter headings at
/// 16pt, subheadings at 13pt and a form line on the last page.
fn handbook() -> DocumentLines {
    let header = |page| LineRecord::new("ACME Corp Handbook", 13.0, true, 30.0, page);
    let mut lines = Vec::new();

    lines.push(header(1));
    lines.push(LineRecord::new("Employee Handbook", 24.0, true, 60.0, 1));
    lines.push(LineRecord::new("Welcome From Leadership", 16.0, true, 120.0, 1));
    lines.extend(body(1, 0..15));

    lines.push(header(2));
    lines.push(LineRecord::new("Working Hours Policy", 16.0, true, 60.0, 2));
    lines.extend(body(2, 0..8));
    lines.push(LineRecord::new("Flexible Schedules", 13.0, true, 255.0, 2));
    lines.extend(body(2, 8..15));

    lines.push(header(3));
    lines.push(LineRecord::new("Code of Conduct", 16.0, true, 60.0, 3));
    lines.extend(body(3, 0..8));
    lines.push(LineRecord::new("Reporting Concerns", 13.0, true, 255.0, 3));
    lines.extend(body(3, 8..15));

    lines.push(header(4));
    lines.push(LineRecord::new("Contacts and Resources", 16.0, true, 60.0, 4));
    lines.extend(body(4, 0..15));
    lines.push(LineRecord::new("Name: ____ Date: ____", 16.0, true, 400.0, 4));

    DocumentLines::new("handbook.pdf", lines)
}

#[test]
fn test_handbook_outline() {
    let outline = OutlineExtractor::new().extract(&handbook());

    assert_eq!(outline.title, "Employee Handbook");

    let entries: Vec<(String, &str, u32)> = outline
        .headings
        .iter()
        .map(|h| (h.level.to_string(), h.text.as_str(), h.page))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("H2".to_string(), "Welcome From Leadership", 1),
            ("H2".to_string(), "Working Hours Policy", 2),
            ("H3".to_string(), "Flexible Schedules", 2),
            ("H2".to_string(), "Code of Conduct", 3),
            ("H3".to_string(), "Reporting Concerns", 3),
            ("H2".to_string(), "Contacts and Resources", 4),
        ]
    );
}

#[test]
fn test_small_bold_notes_are_not_headings() {
    let mut lines = vec![LineRecord::new("Field Study Report", 24.0, true, 40.0, 1)];
    for page in 1..=3 {
        lines.push(LineRecord::new(
            format!("Chapter {page} Field Results"),
            16.0,
            true,
            80.0,
            page,
        ));
        for i in 0..20 {
            lines.push(LineRecord::new(
                format!("Observation {i} on page {page} matched the forecast"),
                11.0,
                false,
                110.0 + i as f32 * 15.0,
                page,
            ));
        }
        lines.push(LineRecord::new(format!("Table Note {page}0"), 8.0, true, 700.0, page));
        lines.push(LineRecord::new(format!("Table Note {page}1"), 8.0, true, 712.0, page));
    }
    let outline = OutlineExtractor::new().extract(&DocumentLines::new("study.pdf", lines));

    let entries: Vec<(String, &str, u32)> = outline
        .headings
        .iter()
        .map(|h| (h.level.to_string(), h.text.as_str(), h.page))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("H2".to_string(), "Chapter 1 Field Results", 1),
            ("H2".to_string(), "Chapter 2 Field Results", 2),
            ("H2".to_string(), "Chapter 3 Field Results", 3),
        ]
    );
}

#[test]
fn test_running_header_and_form_field_excluded() {
    let outline = OutlineExtractor::new().extract(&handbook());
    assert!(outline.headings.iter().all(|h| h.text != "ACME Corp Handbook"));
    assert!(outline.headings.iter().all(|h| !h.text.contains("Name:")));
}

#[test]
fn test_level_map_scenario() {
    let mut lines = Vec::new();
    for (i, size) in [18.0, 18.0, 14.0, 14.0, 12.0].into_iter().enumerate() {
        lines.push(LineRecord::new(
            format!("Heading Number {i}"),
            size,
            true,
            60.0,
            i as u32 + 1,
        ));
    }
    for page in 1..=5 {
        lines.extend(body(page, 0..12));
    }
    let doc = DocumentLines::new("levels.pdf", lines);

    let profile = OutlineExtractor::new().profile(&doc);
    assert!(profile.body_size() < 12.0);
    assert_eq!(
        profile.level_map(),
        vec![
            (18.0, Level::new(1)),
            (14.0, Level::new(2)),
            (12.0, Level::new(3))
        ]
    );
}

#[test]
fn test_numbered_parent_repaired() {
    let mut lines = body(1, 0..15);
    lines.push(LineRecord::new("3.1 Data Sources", 12.0, true, 60.0, 2));
    lines.extend(body(2, 0..15));
    lines.push(LineRecord::new("3.1.1 Survey Design", 16.0, true, 60.0, 3));
    lines.extend(body(3, 0..15));
    let doc = DocumentLines::new("study.pdf", lines);

    let outline = OutlineExtractor::new().extract(&doc);
    let levels: Vec<(&str, u32)> = outline
        .headings
        .iter()
        .map(|h| (h.text.as_str(), h.level.number()))
        .collect();
    assert_eq!(levels, vec![("3.1 Data Sources", 1), ("3.1.1 Survey Design", 2)]);

    let mut headings = outline.headings.clone();
    assert_eq!(reconcile_hierarchy(&mut headings), 0);
}

#[test]
fn test_uniform_font_gives_empty_outline() {
    let mut lines = Vec::new();
    for page in 1..=3 {
        lines.extend(body(page, 0..20));
    }
    let doc = DocumentLines::new("plain.pdf", lines);
    let extractor = OutlineExtractor::new();

    let outline = extractor.extract(&doc);
    assert!(outline.is_empty());
    assert!(!outline.title.is_empty());
    assert!(extractor.segment(&doc, &outline).is_empty());
}

#[test]
fn test_language_tags() {
    let outline = OutlineExtractor::new().extract(&handbook());
    let conduct = outline
        .headings
        .iter()
        .find(|h| h.text == "Code of Conduct")
        .unwrap();
    assert_eq!(conduct.language, "en");
}

#[test]
fn test_outline_is_idempotent() {
    let extractor = OutlineExtractor::new();
    let first = outline_to_json(&extractor.extract(&handbook()), JsonFormat::Compact).unwrap();
    let second = outline_to_json(&extractor.extract(&handbook()), JsonFormat::Compact).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_outline_from_line_stream_json() {
    let json = serde_json::to_string(&handbook()).unwrap();
    let doc = DocumentLines::from_json(&json).unwrap();
    let outline = OutlineExtractor::new().extract(&doc);
    assert_eq!(outline.len(), 6);
    assert_eq!(outline.at_level(Level::new(3)).count(), 2);
}
