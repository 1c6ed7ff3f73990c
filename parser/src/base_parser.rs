use crate::{Message, ParseError};

/// Base trait for turning one framed input line into a `Message`.
pub trait LineParser: Send + Sync {
    /// Returns the name of this parser (e.g., "ndjson")
    fn name(&self) -> &'static str;

    /// Decode a single line, without its terminator.
    /// An error is local to the line and never affects later lines.
    fn parse_line(&self, line: &[u8]) -> Result<Message, ParseError>;
}
