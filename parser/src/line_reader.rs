use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// One line of input with its terminator removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based position in the input stream
    pub number: u64,
    pub bytes: Vec<u8>,
}

/// Splits an async byte stream into lines.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. Bytes of an unfinished line
/// are kept between calls, so a line that arrives over several reads is
/// produced once, whole, even when a `\r\n` pair is split between reads. A
/// final line without a terminator is produced at end of input.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    // Previous line ended in `\r`; a `\n` that follows belongs to it.
    skip_lf: bool,
    lines_read: u64,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            skip_lf: false,
            lines_read: 0,
        }
    }

    /// Read the next line, or `None` once the input is exhausted.
    ///
    /// Cancel safe: bytes are moved out of the underlying buffer only
    /// between awaits, so dropping the future loses nothing.
    pub async fn next_line(&mut self) -> io::Result<Option<RawLine>> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                self.skip_lf = false;
                if self.pending.is_empty() {
                    debug!("Input closed after {} lines", self.lines_read);
                    return Ok(None);
                }
                return Ok(Some(self.finish_line()));
            }

            let mut start = 0;
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    start = 1;
                }
            }

            let terminator = available[start..]
                .iter()
                .position(|b| *b == b'\n' || *b == b'\r');

            match terminator {
                Some(offset) => {
                    let end = start + offset;
                    self.pending.extend_from_slice(&available[start..end]);

                    let mut used = end + 1;
                    if available[end] == b'\r' {
                        match available.get(used) {
                            Some(b'\n') => used += 1,
                            Some(_) => {}
                            None => self.skip_lf = true,
                        }
                    }

                    self.inner.consume(used);
                    return Ok(Some(self.finish_line()));
                }
                None => {
                    self.pending.extend_from_slice(&available[start..]);
                    let used = available.len();
                    self.inner.consume(used);
                }
            }
        }
    }

    fn finish_line(&mut self) -> RawLine {
        self.lines_read += 1;
        RawLine {
            number: self.lines_read,
            bytes: std::mem::take(&mut self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn collect<R: AsyncBufRead + Unpin>(reader: &mut LineReader<R>) -> Vec<RawLine> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    fn bytes_of(lines: &[RawLine]) -> Vec<&[u8]> {
        lines.iter().map(|line| line.bytes.as_slice()).collect()
    }

    #[tokio::test]
    async fn test_lines_in_order() {
        let mut reader = LineReader::new(&b"{\"id\":1}\n{\"id\":2}\n"[..]);
        let lines = collect(&mut reader).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, b"{\"id\":1}");
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].bytes, b"{\"id\":2}");
        assert_eq!(lines[1].number, 2);
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",")
            .read(b"\"id\":1}\n{\"id\"")
            .read(b":2}\n")
            .build();
        let mut reader = LineReader::new(BufReader::new(mock));
        let lines = collect(&mut reader).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, b"{\"jsonrpc\":\"2.0\",\"id\":1}");
        assert_eq!(lines[1].bytes, b"{\"id\":2}");
    }

    #[tokio::test]
    async fn test_crlf_and_unterminated_last_line() {
        let mut reader = LineReader::new(&b"{\"a\":1}\r\n\n{\"b\":2}"[..]);
        let lines = collect(&mut reader).await;

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].bytes, b"{\"a\":1}");
        assert!(lines[1].bytes.is_empty());
        assert_eq!(lines[2].bytes, b"{\"b\":2}");
        assert_eq!(lines[2].number, 3);
    }

    #[tokio::test]
    async fn test_bare_carriage_return_ends_line() {
        let mut reader = LineReader::new(&b"{\"a\":1}\r{\"b\":2}\n{\"c\":3}\r\r"[..]);
        let lines = collect(&mut reader).await;

        assert_eq!(
            bytes_of(&lines),
            vec![&b"{\"a\":1}"[..], &b"{\"b\":2}"[..], &b"{\"c\":3}"[..], &b""[..]]
        );
    }

    #[tokio::test]
    async fn test_crlf_split_between_reads() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"a\":1}\r")
            .read(b"\n{\"b\":2}\r")
            .read(b"{\"c\":3}\r")
            .read(b"\n")
            .build();
        let mut reader = LineReader::new(BufReader::new(mock));
        let lines = collect(&mut reader).await;

        assert_eq!(
            bytes_of(&lines),
            vec![&b"{\"a\":1}"[..], &b"{\"b\":2}"[..], &b"{\"c\":3}"[..]]
        );
        assert_eq!(lines[2].number, 3);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_passed_through() {
        let mut reader = LineReader::new(&b"{\"name\":\"\xff\"}\n{}\n"[..]);
        let lines = collect(&mut reader).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, b"{\"name\":\"\xff\"}");
        assert_eq!(lines[1].bytes, b"{}");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mut reader = LineReader::new(&b""[..]);
        assert!(reader.next_line().await.unwrap().is_none());
        assert!(reader.next_line().await.unwrap().is_none());
    }
}
