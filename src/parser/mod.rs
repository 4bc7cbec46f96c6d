//! PDF parsing module: turns a PDF file into the layout line stream.

mod backend;
mod extract;
mod options;
mod pdf_parser;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
};
pub use extract::{
    detect_columns, group_single_column, group_spans_into_lines, Column, LineExtractor, TextLine,
    TextSpan,
};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::{document_id, PdfParser};
