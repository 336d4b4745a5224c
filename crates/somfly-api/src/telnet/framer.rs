// Line framer for the JSON-RPC stream
//
// The controller writes one JSON object per line, interleaved with prompt
// echoes and other noise. The decoder splits on `\n`, trims, and only
// yields lines that look like a JSON object. It is a cheap sniff, not a
// parse: validity is checked by the reader when it decodes the frame.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

/// Returns the trimmed line if it starts with `{` and ends with `}`.
pub(crate) fn sniff(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
}

/// Splits a byte stream into candidate JSON frames.
///
/// One decoder lives for one session; its buffer is dropped with the
/// session, so nothing carries over a reconnect.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes already scanned for a newline in the current buffer.
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameDecoder {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(offset) = buf[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = buf.len();
                return Ok(None);
            };

            let line = buf.split_to(self.scanned + offset + 1);
            self.scanned = 0;

            let text = String::from_utf8_lossy(&line);
            if let Some(frame) = sniff(&text) {
                return Ok(Some(frame.to_owned()));
            }
            trace!(line = %text.trim(), "discarding non-JSON line");
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.decode(buf)?;
        if frame.is_none() && !buf.is_empty() {
            // An unterminated tail is a partial write; drop it.
            trace!(bytes = buf.len(), "discarding unterminated tail at EOF");
            buf.clear();
            self.scanned = 0;
        }
        Ok(frame)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use tokio_util::codec::FramedRead;

    use super::*;

    fn decode_all(input: &[u8]) -> Vec<String> {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(input);
        let mut out = Vec::new();
        while let Some(frame) = decoder.decode(&mut buf).unwrap() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn sniff_accepts_objects_only() {
        assert_eq!(sniff("  {\"id\":1}\r"), Some("{\"id\":1}"));
        assert_eq!(sniff("Connected:"), None);
        assert_eq!(sniff("[1,2]"), None);
        assert_eq!(sniff("{\"partial\":"), None);
    }

    #[test]
    fn splits_concatenated_frames() {
        let frames = decode_all(b"{\"id\":1,\"result\":true}\r\n{\"id\":2,\"result\":false}\r\n");
        assert_eq!(
            frames,
            vec![
                "{\"id\":1,\"result\":true}".to_owned(),
                "{\"id\":2,\"result\":false}".to_owned()
            ]
        );
    }

    #[test]
    fn discards_noise_lines() {
        let frames = decode_all(b"Connected:\r\n\r\n   \n{\"id\":3}\n>>> \n");
        assert_eq!(frames, vec!["{\"id\":3}".to_owned()]);
    }

    #[test]
    fn buffers_partial_lines_until_newline() {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&b"{\"id\":4,"[..]);
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"\"result\":12}");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"\n");
        assert_eq!(
            decoder.decode(&mut buf).unwrap().as_deref(),
            Some("{\"id\":4,\"result\":12}")
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn eof_drops_unterminated_tail() {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&b"{\"id\":5}\n{\"id\":6"[..]);
        assert_eq!(decoder.decode_eof(&mut buf).unwrap().as_deref(), Some("{\"id\":5}"));
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let frames = decode_all(b"{\"name\":\"\xff\"}\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].starts_with("{\"name\""));
    }

    #[tokio::test]
    async fn framed_read_yields_frames_across_fragmented_reads() {
        let io = tokio_test::io::Builder::new()
            .read(b"{\"id\":7,\"res")
            .read(b"ult\":[\"132A01\"]}\r")
            .read(b"\n{\"id\":8,\"result\":true}\n{\"id\":9,\"result\":0}\n")
            .build();
        let frames: Vec<String> = FramedRead::new(io, FrameDecoder::new())
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(
            frames,
            vec![
                "{\"id\":7,\"result\":[\"132A01\"]}".to_owned(),
                "{\"id\":8,\"result\":true}".to_owned(),
                "{\"id\":9,\"result\":0}".to_owned(),
            ]
        );
    }
}
