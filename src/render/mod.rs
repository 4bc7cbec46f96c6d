//! Rendering module for converting analysis results to output formats.

mod json;

pub use json::{
    analysis_to_json, outline_to_json, sections_to_json, JsonFormat, Manifest, ManifestDocument,
    ManifestFailure, ManifestMetadata,
};
