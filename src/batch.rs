//! Batch processing: many documents on a fixed-size worker pool.
//!
//! Each document is analysed start to finish on one worker with no shared
//! mutable state. Reports are streamed back over a channel as documents
//! finish; a failing document never stops its siblings.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::error::{Error, Result};
use crate::model::DocumentLines;
use crate::parser::{document_id, ParseOptions, PdfParser};
use crate::structure::{DocumentAnalysis, OutlineExtractor};

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct DocumentReport {
    /// Position in the input list
    pub index: usize,
    /// Document identifier (file base name)
    pub document: String,
    pub path: PathBuf,
    pub outcome: Result<DocumentAnalysis>,
}

impl DocumentReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs the pipeline over a list of files in parallel.
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    extractor: OutlineExtractor,
    parse_options: ParseOptions,
    jobs: Option<usize>,
}

impl BatchProcessor {
    /// Create a processor using `extractor` for every document.
    pub fn new(extractor: OutlineExtractor) -> Self {
        Self {
            extractor,
            ..Self::default()
        }
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set the worker count (defaults to the number of CPUs).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Analyse one file: a PDF, or a pre-extracted line stream (`.json`).
    pub fn analyze_path(&self, path: &Path) -> Result<DocumentAnalysis> {
        let doc = load_lines(path, &self.parse_options)?;
        Ok(self.extractor.analyze(&doc))
    }

    /// Process `paths`, sending a report per document as it completes.
    /// The receiver disconnects once every document has been reported.
    pub fn run_streaming(&self, paths: Vec<PathBuf>) -> Result<Receiver<DocumentReport>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .thread_name(|i| format!("pdfsect-worker-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("cannot build worker pool: {e}")))?;

        let (sender, receiver) = unbounded();
        let processor = self.clone();
        log::debug!(
            "batch of {} documents on {} workers",
            paths.len(),
            pool.current_num_threads()
        );

        thread::spawn(move || {
            pool.install(|| {
                paths
                    .into_par_iter()
                    .enumerate()
                    .for_each_with(sender, |sender, (index, path)| {
                        let outcome = processor.analyze_path(&path);
                        if let Err(e) = &outcome {
                            log::warn!("{}: {}", path.display(), e);
                        }
                        let report = DocumentReport {
                            index,
                            document: document_id(&path),
                            path,
                            outcome,
                        };
                        // The caller may stop listening early.
                        let _ = sender.send(report);
                    });
            });
        });

        Ok(receiver)
    }

    /// Process `paths` and return every report in input order.
    pub fn run(&self, paths: Vec<PathBuf>) -> Result<Vec<DocumentReport>> {
        let mut reports: Vec<DocumentReport> = self.run_streaming(paths)?.iter().collect();
        reports.sort_by_key(|r| r.index);
        Ok(reports)
    }
}

/// Read the line stream of a PDF or of a line-stream JSON file.
pub fn load_lines(path: &Path, options: &ParseOptions) -> Result<DocumentLines> {
    if is_line_stream(path) {
        let json = fs::read_to_string(path)?;
        let mut doc = DocumentLines::from_json(&json)?;
        if doc.id.is_empty() {
            doc.id = document_id(path);
        }
        return Ok(doc);
    }

    PdfParser::open_with_options(path, options.clone())?.lines()
}

fn is_line_stream(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Expand the given paths into a sorted list of input files. Directories
/// contribute their `.pdf` files (not recursively); files are kept as given.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
                })
                .collect();
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }
    Ok(inputs)
}

/// File name of the batch manifest written next to the per-document outlines.
pub const MANIFEST_FILE: &str = "sections.json";

/// Outline file names for `paths`, one per input and in input order.
///
/// Each document gets `<stem>.json`. A stem shared by several inputs
/// (ignoring case), or one that would overwrite [`MANIFEST_FILE`], gets its
/// input index appended: `<stem>-<index>.json`.
pub fn outline_file_names(paths: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = paths
        .iter()
        .map(|p| {
            p.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "document".to_string())
        })
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.to_lowercase()).or_default() += 1;
    }

    let mut used: HashSet<String> = HashSet::from([MANIFEST_FILE.to_lowercase()]);
    let mut names = Vec::with_capacity(stems.len());
    for (i, stem) in stems.iter().enumerate() {
        let mut name = if counts[&stem.to_lowercase()] > 1 {
            format!("{stem}-{i}.json")
        } else {
            format!("{stem}.json")
        };
        let mut extra = 0;
        while !used.insert(name.to_lowercase()) {
            extra += 1;
            name = if extra == 1 {
                format!("{stem}-{i}.json")
            } else {
                format!("{stem}-{i}-{extra}.json")
            };
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_inputs_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let extra = PathBuf::from("/elsewhere/c.pdf");

        let inputs = collect_inputs(&[dir.path().to_path_buf(), extra.clone()]).unwrap();
        let names: Vec<String> = inputs.iter().map(|p| document_id(p)).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);
        assert_eq!(inputs[2], extra);
    }

    #[test]
    fn test_load_line_stream_json_defaults_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.json");
        fs::write(
            &path,
            r#"{"id": "", "lines": [{"text": "Hello", "font_size": 10.0, "is_bold": false, "top_y": 70.0, "page": 1}]}"#,
        )
        .unwrap();

        let doc = load_lines(&path, &ParseOptions::default()).unwrap();
        assert_eq!(doc.id, "memo.json");
        assert_eq!(doc.lines.len(), 1);
    }

    #[test]
    fn test_failures_are_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.pdf");
        fs::write(&bad, b"not a pdf at all").unwrap();
        let missing = dir.path().join("missing.pdf");

        let reports = BatchProcessor::default()
            .with_jobs(2)
            .run(vec![bad, missing])
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].document, "bad.pdf");
        assert!(matches!(reports[0].outcome, Err(Error::UnknownFormat)));
        assert!(matches!(reports[1].outcome, Err(Error::Io(_))));
    }
}
