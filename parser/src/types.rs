/// One decoded input line. The relay never looks inside it; it only
/// re-serializes the value as a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct Message(serde_json::Value);

impl Message {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Compact JSON encoding used as the outbound request body
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
