use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::models::ResponseBody;

/// Writes each completed response body as one output line
pub struct ResponseEmitter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ResponseEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Body bytes go out untouched, followed by a single newline
    pub async fn emit(&mut self, body: &ResponseBody) -> std::io::Result<()> {
        self.writer.write_all(body.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}
