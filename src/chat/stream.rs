use bytes::{Buf, BufMut, BytesMut};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, error, trace};

use super::{Message, Role};

/// Blank line between two server-sent events
const EVENT_SEPARATOR: &[u8] = b"\n\n";
/// Prefix of every event carrying a payload
const DATA_PREFIX: &[u8] = b"data: ";
/// Payload of the final event
const DONE_MARKER: &[u8] = b"[DONE]";

/// Turns a completion event stream into text. Chunks travel through a channel to a writer
/// while the full reply is assembled for the caller.
pub trait Streamer: Clone + Send {
    /// Write every chunk received until the sender is dropped
    fn forward_chunks(
        &self,
        writer: &mut (impl tokio::io::AsyncWrite + Unpin + Send),
        receiver: Receiver<String>,
    ) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;

    /// Read the stream to the end and return the assembled reply. Bytes of an event split
    /// across network chunks stay in the buffer until the rest of the event arrives.
    async fn collect_stream(
        &self,
        mut stream: (impl Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin),
        sender: Sender<String>,
    ) -> anyhow::Result<Message> {
        let mut response = String::new();

        debug!("Opening stream");
        let mut buffer = BytesMut::with_capacity(8192);
        while let Some(chunk) = stream.next().await {
            trace!(?chunk, "processing");
            buffer.put_slice(&chunk?);

            let (deltas, consumed) = parse_events(&buffer)?;
            buffer.advance(consumed);
            for delta in deltas {
                response.push_str(&delta);
                sender.send(delta).await?;
            }
        }

        if !buffer.is_empty() {
            debug!(remaining = buffer.len(), "Stream ended with an incomplete event");
        }

        Ok(Message {
            role: Role::Assistant,
            content: response,
        })
    }
}

/// Parse every complete event in `buffer`. Returns the text deltas found and how many bytes
/// were consumed; a trailing partial event is left for the next call.
pub fn parse_events(buffer: &[u8]) -> anyhow::Result<(Vec<String>, usize)> {
    let mut deltas = Vec::new();
    let mut consumed = 0;

    while let Some(end) = buffer[consumed..]
        .windows(EVENT_SEPARATOR.len())
        .position(|window| window == EVENT_SEPARATOR)
    {
        let event = &buffer[consumed..consumed + end];
        consumed += end + EVENT_SEPARATOR.len();

        let Some(payload) = event.strip_prefix(DATA_PREFIX) else {
            // Comments and keep-alives
            continue;
        };

        if payload.starts_with(DONE_MARKER) {
            debug!("DONE detected");
            break;
        }

        match serde_json::from_slice::<CompletionChunk>(payload) {
            Ok(chunk) => {
                if let Some(content) = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta)
                    .and_then(|delta| delta.content)
                    .filter(|content| !content.is_empty())
                {
                    deltas.push(content);
                }
            }
            Err(e) => {
                return match serde_json::from_slice::<ErrorPayload>(payload) {
                    Ok(err) => {
                        error!(message = %err.error.message, "error in stream");
                        Err(anyhow::anyhow!(err.error.message))
                    }
                    Err(_) => {
                        error!("Failed to parse event: {}", String::from_utf8_lossy(payload));
                        Err(anyhow::anyhow!("cannot parse event: {e}"))
                    }
                };
            }
        }
    }

    Ok((deltas, consumed))
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// One streamed completion event
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    choices: Vec<Choice>,
}

/// Content 'delta' of the message: a partial chunk of the complete message
#[derive(Deserialize, Debug)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

/// Writes each chunk as soon as it arrives
#[derive(Clone)]
pub struct ChatStreamer;

impl Streamer for ChatStreamer {
    async fn forward_chunks(
        &self,
        writer: &mut (impl tokio::io::AsyncWrite + Unpin + Send),
        mut receiver: Receiver<String>,
    ) -> anyhow::Result<()> {
        while let Some(content) = receiver.recv().await {
            writer.write_all(content.as_bytes()).await?;
            writer.flush().await?;
        }

        debug!("End of streaming");
        Ok(())
    }
}
