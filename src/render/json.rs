//! JSON rendering for outlines, section lists and batch manifests.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Outline, Section};
use crate::structure::DocumentAnalysis;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render an outline as `{ "title", "outline": [...] }`.
pub fn outline_to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    to_json(outline, format)
}

/// Render sections as a JSON array.
pub fn sections_to_json(sections: &[Section], format: JsonFormat) -> Result<String> {
    to_json(sections, format)
}

/// Render a full analysis (document id, outline and sections).
pub fn analysis_to_json(analysis: &DocumentAnalysis, format: JsonFormat) -> Result<String> {
    to_json(analysis, format)
}

/// Summary of a batch run: every outline, every section and every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub metadata: ManifestMetadata,
    pub documents: Vec<ManifestDocument>,
    pub sections: Vec<Section>,
    pub failures: Vec<ManifestFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub input_documents: Vec<String>,
    /// RFC 3339, UTC
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub document: String,
    #[serde(flatten)]
    pub outline: Outline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFailure {
    pub document: String,
    pub error: String,
}

impl Manifest {
    /// Empty manifest stamped with `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            metadata: ManifestMetadata {
                input_documents: Vec::new(),
                processing_timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            documents: Vec::new(),
            sections: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Empty manifest stamped with the current time.
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Record a successfully analysed document.
    pub fn add_analysis(&mut self, analysis: DocumentAnalysis) {
        self.metadata.input_documents.push(analysis.document.clone());
        self.sections.extend(analysis.sections);
        self.documents.push(ManifestDocument {
            document: analysis.document,
            outline: analysis.outline,
        });
    }

    /// Record a document that could not be read.
    pub fn add_failure(&mut self, document: impl Into<String>, error: impl ToString) {
        let document = document.into();
        self.metadata.input_documents.push(document.clone());
        self.failures.push(ManifestFailure {
            document,
            error: error.to_string(),
        });
    }

    /// Render the manifest.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }
}
