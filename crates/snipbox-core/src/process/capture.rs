//! Bounded capture of a child's output pipe

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

const CHUNK_SIZE: usize = 8 * 1024;

/// Bytes read from one pipe, never more than the cap
#[derive(Debug, Default)]
pub(crate) struct Captured {
    pub bytes: Vec<u8>,
    pub exceeded: bool,
    /// Reading was cut off before EOF
    pub stopped: bool,
}

impl Captured {
    /// Lossy UTF-8 text, still within `cap` bytes after replacement characters
    pub fn into_text(self, cap: usize) -> String {
        bounded_text(&self.bytes, cap)
    }
}

/// Read `reader` to EOF, keeping at most `cap` bytes.
///
/// Once more than `cap` bytes have arrived the overflow token (if any) is
/// cancelled. Reading continues and discards the excess so the writer never
/// blocks on a full pipe. Cancelling `stop` ends the read early and keeps
/// whatever was captured so far.
pub(crate) async fn capture_limited<R>(
    reader: Option<R>,
    cap: usize,
    overflow: Option<CancellationToken>,
    stop: CancellationToken,
) -> Captured
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Captured::default();
    };

    let mut captured = Captured::default();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = tokio::select! {
            biased;
            _ = stop.cancelled() => {
                captured.stopped = true;
                break;
            }
            read = reader.read(&mut chunk) => read,
        };
        match read {
            Ok(0) => break,
            Ok(n) => {
                let room = cap.saturating_sub(captured.bytes.len());
                if n > room {
                    captured.bytes.extend_from_slice(&chunk[..room]);
                    if !captured.exceeded {
                        captured.exceeded = true;
                        if let Some(token) = &overflow {
                            token.cancel();
                        }
                    }
                } else {
                    captured.bytes.extend_from_slice(&chunk[..n]);
                }
            }
            Err(_) => break,
        }
    }

    captured
}

/// Decode bytes lossily and cut the result back to `cap` bytes on a char
/// boundary. Replacement characters are wider than the bytes they replace.
pub(crate) fn bounded_text(bytes: &[u8], cap: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > cap {
        let mut end = cap;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_within_cap() {
        let data: &[u8] = b"hello\nworld\n";
        let captured = capture_limited(Some(data), 1024, None, CancellationToken::new()).await;
        assert!(!captured.exceeded);
        assert_eq!(captured.bytes, data);
    }

    #[tokio::test]
    async fn test_capture_exactly_at_cap_is_not_exceeded() {
        let data = vec![b'x'; 64];
        let stop = CancellationToken::new();
        let captured = capture_limited(Some(data.as_slice()), 64, None, stop).await;
        assert!(!captured.exceeded);
        assert_eq!(captured.bytes.len(), 64);
    }

    #[tokio::test]
    async fn test_capture_over_cap_cancels_token() {
        let data = vec![b'x'; 10_000];
        let token = CancellationToken::new();
        let captured = capture_limited(
            Some(data.as_slice()),
            1024,
            Some(token.clone()),
            CancellationToken::new(),
        )
        .await;
        assert!(captured.exceeded);
        assert!(token.is_cancelled());
        assert_eq!(captured.bytes.len(), 1024);
    }

    #[tokio::test]
    async fn test_missing_pipe() {
        let captured = capture_limited::<&[u8]>(None, 10, None, CancellationToken::new()).await;
        assert!(captured.bytes.is_empty());
        assert!(!captured.exceeded);
    }

    #[tokio::test]
    async fn test_stop_keeps_partial_capture_of_open_pipe() {
        use tokio::io::AsyncWriteExt;

        // The writer half stays open, so the reader never sees EOF
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"partial\n").await.unwrap();

        let stop = CancellationToken::new();
        let task = tokio::spawn(capture_limited(Some(reader), 1024, None, stop.clone()));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        stop.cancel();

        let captured = task.await.unwrap();
        assert!(captured.stopped);
        assert!(!captured.exceeded);
        assert_eq!(captured.bytes, b"partial\n");
        drop(writer);
    }

    #[test]
    fn test_bounded_text_respects_char_boundary() {
        // "é" is two bytes; a cap of 3 cannot hold two of them
        let text = bounded_text("éé".as_bytes(), 3);
        assert_eq!(text, "é");

        // invalid byte becomes a 3-byte replacement char, trimmed away
        let text = bounded_text(&[b'a', 0xff], 2);
        assert_eq!(text, "a");
    }
}
