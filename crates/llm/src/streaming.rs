//! Line-oriented decoding of streamed provider responses
//!
//! Both SSE (`data: ...` frames) and NDJSON bodies arrive as arbitrary byte
//! chunks. Bytes are buffered until a full line is available, so frames and
//! multi-byte characters split across chunks decode correctly.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use summarist_common::SummaristError;

use crate::llm_trait::FragmentStream;

/// What a single decoded line means for the fragment stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineEvent {
    /// Text to forward to the caller
    Fragment(String),
    /// Last text of the response; the stream ends after it
    FinalFragment(String),
    /// Line carries nothing for the caller (pings, metadata)
    Skip,
    /// Provider signalled normal completion
    Finished,
    /// Provider reported an error in-band
    Failed(String),
}

struct LineState<F> {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    buffer: Vec<u8>,
    parse_line: F,
    eof: bool,
    done: bool,
}

/// Turn a streaming HTTP body (`Response::bytes_stream`) into a fragment stream
///
/// A body that ends without a completion marker is reported as an error
/// rather than silently truncated.
pub(crate) fn fragment_stream<S, F>(body: S, parse_line: F) -> FragmentStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    F: FnMut(&str) -> LineEvent + Send + 'static,
{
    let state = LineState {
        body: body.boxed(),
        buffer: Vec::new(),
        parse_line,
        eof: false,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = state.buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match (state.parse_line)(line) {
                    LineEvent::Fragment(text) => return Some((Ok(text), state)),
                    LineEvent::FinalFragment(text) => {
                        state.done = true;
                        return Some((Ok(text), state));
                    }
                    LineEvent::Skip => continue,
                    LineEvent::Finished => return None,
                    LineEvent::Failed(message) => {
                        state.done = true;
                        return Some((Err(SummaristError::provider(message)), state));
                    }
                }
            }

            if state.eof {
                state.done = true;
                return Some((
                    Err(SummaristError::provider(
                        "Provider stream ended before completion",
                    )),
                    state,
                ));
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((
                        Err(SummaristError::provider(format!("Stream interrupted: {}", e))),
                        state,
                    ));
                }
                None => {
                    state.eof = true;
                    // Flush a trailing line that has no newline
                    if !state.buffer.is_empty() {
                        state.buffer.push(b'\n');
                    }
                }
            }
        }
    })
    .boxed()
}

/// Payload of an SSE `data:` line, `None` for other SSE fields
pub(crate) fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}
