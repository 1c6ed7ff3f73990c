use crate::{base_parser::LineParser, Message, ParseError};
use tracing::debug;

/// NDJSON parser - one JSON value of any kind per line
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD before decoding,
/// so such a line is still relayed rather than dropped.
pub struct NdjsonParser;

impl LineParser for NdjsonParser {
    fn name(&self) -> &'static str {
        "ndjson"
    }

    fn parse_line(&self, line: &[u8]) -> Result<Message, ParseError> {
        let text = String::from_utf8_lossy(line);
        let value: serde_json::Value = serde_json::from_str(&text)?;
        debug!("Decoded {} byte line", line.len());
        Ok(Message::new(value))
    }
}
