//! Rendering of outlines to their output format.

mod json;

pub use json::{output_path, to_json, write_json, JsonFormat};
