//! Rendering module for turning reports into output formats.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::to_summary;
