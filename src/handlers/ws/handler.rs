//! Voice WebSocket handler
//!
//! One task per connection reads client frames, queues transcripts on the
//! connection's [`ConnectionSession`], and forwards each settled job as an
//! `ai-reply`. A separate writer task owns the socket sink.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::future::{self, BoxFuture};
use futures::stream::FuturesOrdered;
use futures::{FutureExt, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::{select, time::Duration};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::messages::{IncomingMessage, MessageRoute, OutgoingMessage};
use super::session::{ConnectionSession, reply_text};

/// Buffer between the session loop and the writer task
const CHANNEL_BUFFER_SIZE: usize = 256;

/// How long the writer may take to flush after the session ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Reply texts in the order their transcripts arrived
type PendingReplies = FuturesOrdered<BoxFuture<'static, String>>;

/// Voice WebSocket handler
///
/// Upgrades the HTTP connection to a WebSocket speaking the named-event
/// protocol described in [`super::messages`].
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    debug!("WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one connection until the client goes away.
async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let session_id = Uuid::new_v4().to_string();
    let span = info_span!("ws_session", session_id = %session_id);
    run_session(socket, app_state, session_id)
        .instrument(span)
        .await;
}

async fn run_session(socket: WebSocket, app_state: Arc<AppState>, session_id: String) {
    info!("Client connected");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing messages
    let mut sender_task = tokio::spawn(
        async move {
            while let Some(route) = message_rx.recv().await {
                let result = match route {
                    MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                        Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                        Err(e) => {
                            error!("Failed to serialize outgoing message: {}", e);
                            continue;
                        }
                    },
                    MessageRoute::Close => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                };

                if let Err(e) = result {
                    debug!("Failed to send WebSocket message: {}", e);
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let session = ConnectionSession::new(
        Arc::clone(&app_state.provider),
        Arc::clone(&app_state.model),
        app_state.config.queue_config(),
    );

    if message_tx
        .send(MessageRoute::Outgoing(OutgoingMessage::Connected {
            id: session_id,
        }))
        .await
        .is_err()
    {
        warn!("Writer closed before the connection was acknowledged");
        sender_task.abort();
        return;
    }

    let mut replies = PendingReplies::new();

    loop {
        select! {
            msg_result = receiver.next() => {
                match msg_result {
                    Some(Ok(msg)) => {
                        if !process_message(msg, &session, &mut replies, &message_tx).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                }
            }
            Some(text) = replies.next(), if !replies.is_empty() => {
                if message_tx
                    .send(MessageRoute::Outgoing(OutgoingMessage::reply(text)))
                    .await
                    .is_err()
                {
                    debug!("Writer closed, dropping reply");
                    break;
                }
            }
        }
    }

    // Queued jobs are abandoned with the session; the one in flight, if any,
    // finishes and its result is discarded.
    let abandoned = session.pending();
    drop(replies);
    drop(session);

    // Let the writer flush a pending close frame, then stop it
    drop(message_tx);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut sender_task)
        .await
        .is_err()
    {
        sender_task.abort();
    }
    info!(abandoned, "Client disconnected");
}

/// Handle one inbound frame. Returns `false` when the connection should end.
async fn process_message(
    msg: Message,
    session: &ConnectionSession,
    replies: &mut PendingReplies,
    message_tx: &mpsc::Sender<MessageRoute>,
) -> bool {
    match msg {
        Message::Text(text) => {
            let incoming: IncomingMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Ignoring unrecognized message: {}", e);
                    return true;
                }
            };

            if let Err(reason) = incoming.validate_size() {
                warn!("Rejecting oversized transcript");
                replies.push_back(future::ready(reason).boxed());
                return true;
            }

            match incoming {
                IncomingMessage::UserTranscript(transcript) => {
                    if let Some(handle) = session.submit_transcript(&transcript) {
                        replies.push_back(handle.map(reply_text).boxed());
                    }
                }
                IncomingMessage::AudioChunk(_) => {
                    debug!("Ignoring audio-chunk event");
                }
            }
            true
        }
        Message::Binary(data) => {
            debug!("Ignoring binary frame: {} bytes", data.len());
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            debug!("WebSocket close received");
            let _ = message_tx.send(MessageRoute::Close).await;
            false
        }
    }
}
