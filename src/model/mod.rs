//! Document model types.
//!
//! This module defines the line stream consumed by structure inference and
//! the outline and section types it produces.

mod line;
mod outline;
mod section;

pub use line::{DocumentLines, LineRecord};
pub use outline::{Heading, HeadingLayout, Level, Outline};
pub use section::Section;
