//! Console transport
//!
//! Reads one update per stdin line and prints outbound messages to stdout.
//! A line is plain text from the default user, a `/location <lat> <lon>`
//! shorthand, or a JSON update shaped like a chat-platform message:
//!
//! ```text
//! {"user_id": 7, "chat_id": 70, "text": "/start"}
//! {"user_id": 7, "location": {"latitude": 45.5, "longitude": -73.6}}
//! ```

use crate::runtime::{BotRuntime, MessageSink, SendError, VehicleSearch};
use crate::search::Coordinate;
use crate::state_machine::{ChatId, Inbound, InboundMessage, UserId};
use async_trait::async_trait;
use serde::Deserialize;
use std::borrow::Cow;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed update: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed location {0:?}, expected a latitude in [-90, 90] and a longitude in [-180, 180]")]
    Location(String),
}

/// JSON update as received on the console
#[derive(Debug, Deserialize)]
struct Update {
    user_id: UserId,
    #[serde(default)]
    chat_id: Option<ChatId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    location: Option<Coordinate>,
}

/// Parse one console line. `Ok(None)` means the line carries nothing to handle.
pub fn parse_line(
    line: &str,
    default_user: UserId,
    default_chat: ChatId,
) -> Result<Option<InboundMessage>, TransportError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line.starts_with('{') {
        let update: Update = serde_json::from_str(line)?;
        // A user writes to the bot in a private chat whose id matches theirs
        let chat_id = update.chat_id.unwrap_or(ChatId(update.user_id.0));
        let payload = match (update.location, update.text) {
            (Some(coordinate), _) => located(coordinate.latitude, coordinate.longitude, line)?,
            (None, Some(text)) => Inbound::Text(text),
            (None, None) => return Ok(None),
        };
        return Ok(Some(InboundMessage {
            user_id: update.user_id,
            chat_id,
            payload,
        }));
    }

    let payload = parse_location_shorthand(line)?.unwrap_or_else(|| Inbound::text(line));
    Ok(Some(InboundMessage {
        user_id: default_user,
        chat_id: default_chat,
        payload,
    }))
}

fn parse_location_shorthand(line: &str) -> Result<Option<Inbound>, TransportError> {
    let mut parts = line.split_whitespace();
    if !parts
        .next()
        .is_some_and(|cmd| cmd.eq_ignore_ascii_case("/location"))
    {
        return Ok(None);
    }

    let mut coordinate = parts.map(str::parse::<f64>);
    let (Some(Ok(latitude)), Some(Ok(longitude)), None) =
        (coordinate.next(), coordinate.next(), coordinate.next())
    else {
        return Err(TransportError::Location(line.to_string()));
    };
    located(latitude, longitude, line).map(Some)
}

/// Location payload, provided the position lies on the globe
fn located(latitude: f64, longitude: f64, raw: &str) -> Result<Inbound, TransportError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(TransportError::Location(raw.to_string()));
    }
    Ok(Inbound::location(latitude, longitude))
}

/// Message sink printing `[chat <id>] <text>` lines to stdout
pub struct ConsoleSink {
    out: Mutex<tokio::io::Stdout>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        let mut out = self.out.lock().await;
        let written = async {
            out.write_all(format_outbound(chat_id, text).as_bytes())
                .await?;
            out.flush().await
        }
        .await;
        written.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => SendError::Closed,
            _ => SendError::Delivery(e),
        })
    }
}

fn format_outbound(chat_id: ChatId, text: &str) -> String {
    format!("[chat {chat_id}] {text}\n")
}

/// Feed stdin to the runtime until it closes. Updates are handled in order.
pub async fn run_console<V, M>(
    runtime: &BotRuntime<V, M>,
    default_user: UserId,
    default_chat: ChatId,
) -> Result<(), TransportError>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    run_lines(
        BufReader::new(tokio::io::stdin()),
        runtime,
        default_user,
        default_chat,
    )
    .await
}

/// Feed `input` line by line until EOF. Bytes that are not UTF-8 are replaced
/// rather than ending the loop; only a failing read stops it.
async fn run_lines<R, V, M>(
    mut input: R,
    runtime: &BotRuntime<V, M>,
    default_user: UserId,
    default_chat: ChatId,
) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            tracing::warn!("Console line is not valid UTF-8, replacing invalid bytes");
        }
        match parse_line(&line, default_user, default_chat) {
            Ok(Some(message)) => runtime.handle_message(message).await,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring console line"),
        }
    }
    tracing::info!("Console input closed");
    Ok(())
}
