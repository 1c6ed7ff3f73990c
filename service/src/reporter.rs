use relay_parser::ParseError;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::error::{error_chain, DispatchError};

/// Writes human-readable diagnostics to the error channel.
///
/// A failed write is logged and otherwise ignored; diagnostics never stop
/// the relay.
pub struct ErrorReporter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ErrorReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn report_parse(&mut self, line_number: u64, err: &ParseError) {
        let text = format!("Error parsing JSON on line {line_number}: {err}\n");
        self.write(&text).await
    }

    pub async fn report_transport(&mut self, err: &DispatchError) {
        let text = format!("Error: {}\n", error_chain(err));
        self.write(&text).await
    }

    async fn write(&mut self, text: &str) {
        if let Err(err) = self.write_line(text).await {
            warn!("Failed to write diagnostic: {}", err);
        }
    }

    async fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use relay_parser::{LineParser, NdjsonParser};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Error channel whose every write fails
    pub(crate) struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stderr closed")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_parse_diagnostic_names_line() {
        let err = NdjsonParser.parse_line(b"{bad json").unwrap_err();
        let mut out = Vec::new();
        ErrorReporter::new(&mut out).report_parse(3, &err).await;

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error parsing JSON on line 3: "));
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_transport_diagnostic_includes_cause() {
        let json_err = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let err = DispatchError::from(json_err);
        let mut out = Vec::new();
        ErrorReporter::new(&mut out).report_transport(&err).await;

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error: failed to serialize message: "));
        assert_eq!(text.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_is_not_an_error() {
        let err = NdjsonParser.parse_line(b"{bad json").unwrap_err();
        let mut reporter = ErrorReporter::new(BrokenPipe);

        reporter.report_parse(1, &err).await;
        reporter.report_parse(2, &err).await;
    }
}
