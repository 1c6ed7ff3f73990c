// Line framing and decoding for the NDJSON relay input

pub mod types;
pub mod base_parser;
pub mod line_reader;
pub mod ndjson_parser;

// Re-export main types
pub use types::*;
pub use base_parser::LineParser;
pub use line_reader::{LineReader, RawLine};
pub use ndjson_parser::NdjsonParser;
