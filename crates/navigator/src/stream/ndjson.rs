use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

use crate::errors::{TurnError, TurnResult};
use crate::models::event::StreamEvent;

/// Incremental decoder for newline-delimited JSON.
///
/// Chunks may split a line anywhere, including inside a multi-byte UTF-8
/// sequence; bytes are buffered until a full line is available.
#[derive(Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
}

impl NdjsonDecoder {
    /// Feed a chunk, returning every value completed by it
    pub fn push_chunk(&mut self, chunk: &[u8]) -> TurnResult<Vec<Value>> {
        self.buf.extend_from_slice(chunk);
        let mut values = Vec::new();
        while let Some(idx) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=idx).collect();
            if let Some(value) = decode_line(&line[..idx])? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Decode whatever is left once the body ends without a trailing newline
    pub fn finish(&mut self) -> TurnResult<Option<Value>> {
        let rest = std::mem::take(&mut self.buf);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> TurnResult<Option<Value>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(line)
        .map(Some)
        .map_err(|e| TurnError::transport(format!("invalid NDJSON line: {}", e)))
}

/// Turn a raw response body into classified stream events.
///
/// A body read error or a malformed line ends the stream with a transport error.
pub fn decode_events<S, B, E>(body: S) -> BoxStream<'static, TurnResult<StreamEvent>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = NdjsonDecoder::default();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| TurnError::transport(e.to_string()))?;
            for value in decoder.push_chunk(chunk.as_ref())? {
                yield StreamEvent::classify(value);
            }
        }

        if let Some(value) = decoder.finish()? {
            yield StreamEvent::classify(value);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decoder_handles_split_lines() {
        let mut decoder = NdjsonDecoder::default();
        let first = decoder.push_chunk(b"{\"delta\":{\"content\":\"He").unwrap();
        assert!(first.is_empty());

        let second = decoder
            .push_chunk(b"l\"}}\n{\"delta\":{\"content\":\"lo\"}}\n")
            .unwrap();
        assert_eq!(
            second,
            vec![
                json!({"delta": {"content": "Hel"}}),
                json!({"delta": {"content": "lo"}})
            ]
        );
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_decoder_skips_blank_lines_and_crlf() {
        let mut decoder = NdjsonDecoder::default();
        let values = decoder.push_chunk(b"\r\n{\"a\":1}\r\n   \n").unwrap();
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_decoder_split_utf8() {
        let line = "{\"delta\":{\"content\":\"caf\u{e9}\"}}\n".as_bytes();
        let split = line.len() - 5;
        let mut decoder = NdjsonDecoder::default();
        assert!(decoder.push_chunk(&line[..split]).unwrap().is_empty());
        let values = decoder.push_chunk(&line[split..]).unwrap();
        assert_eq!(values[0]["delta"]["content"], json!("caf\u{e9}"));
    }

    #[test]
    fn test_decoder_trailing_line_without_newline() {
        let mut decoder = NdjsonDecoder::default();
        assert!(decoder.push_chunk(b"{\"error\":\"boom\"}").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), Some(json!({"error": "boom"})));
    }

    #[test]
    fn test_decoder_rejects_malformed_line() {
        let mut decoder = NdjsonDecoder::default();
        let err = decoder.push_chunk(b"{oops}\n").unwrap_err();
        assert!(matches!(err, TurnError::Transport(_)));
    }

    #[tokio::test]
    async fn test_decode_events_from_chunks() {
        let chunks: Vec<Result<&'static [u8], std::io::Error>> = vec![
            Ok(&b"{\"delta\":{\"content\":\"Hel\",\"role\":\"assistant\"}}\n{\"del"[..]),
            Ok(&b"ta\":{\"content\":\"lo\"}}\n"[..]),
            Ok(&b"{\"context\":{\"data_points\":[\"p1\"]}}"[..]),
        ];
        let events: Vec<_> = decode_events(futures::stream::iter(chunks))
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            Ok(StreamEvent::ContentDelta { ref content, .. }) if content == "Hel"
        ));
        assert!(matches!(events[2], Ok(StreamEvent::ContextUpdate { .. })));
    }

    #[tokio::test]
    async fn test_decode_events_body_error() {
        let chunks: Vec<Result<&'static [u8], String>> = vec![
            Ok(&b"{\"delta\":{\"content\":\"partial\"}}\n"[..]),
            Err("connection reset".to_string()),
        ];
        let events: Vec<_> = decode_events(futures::stream::iter(chunks))
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert_eq!(
            events[1],
            Err(TurnError::Transport("connection reset".to_string()))
        );
    }
}
