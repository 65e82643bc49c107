//! Socket ownership and lifecycle for a single streaming connection.
//!
//! A [`WsConnection`] owns exactly one WebSocket: the topic descriptor it was
//! opened for, the write half (shared with the reader task for pong and
//! deferred-command transmission), and the connection state — auth progress,
//! the pending command, and the caller's [`CallbackSet`]. Inbound frames are
//! consumed by a dedicated reader task spawned at open time; everything the
//! state machine tells the reader to transmit goes out before the next frame
//! is read.
//!
//! Callbacks are only ever invoked while the state lock is held, so a single
//! connection never reenters them from two tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::constants::{API_HOST, AWS_API_HOST};
use crate::error::{HuobiError, Result};
use crate::topics::TopicDescriptor;
use crate::ws::callbacks::{CallbackSet, ErrorEvent};
use crate::ws::protocol;
use crate::ws::session::{ReqType, WsOptions};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WriterHalf = SplitSink<WsStream, Message>;
type ReaderHalf = SplitStream<WsStream>;

/// Process-wide connection counter; keeps synthesized request ids unique
/// within this process.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Authentication progress of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Public topic; no handshake involved.
    NotRequired,
    /// Auth-required topic; the handshake has not been acknowledged yet.
    Pending,
    /// The server accepted the auth request.
    Authenticated,
    /// The server rejected the auth request. There is no automatic retry;
    /// the connection must be recreated.
    Failed,
}

/// A command stored while the auth handshake is in flight, transmitted
/// exactly once when the acknowledgment arrives.
#[derive(Debug, Clone)]
pub(crate) struct PendingCommand {
    pub(crate) req_type: ReqType,
    pub(crate) params: Vec<(String, String)>,
}

/// Mutable per-connection state shared between the dispatcher and the
/// reader task.
pub(crate) struct SessionState {
    pub(crate) auth: AuthState,
    pub(crate) pending: Option<PendingCommand>,
    pub(crate) callbacks: CallbackSet,
    pub(crate) closed: bool,
}

// ---------------------------------------------------------------------------
// WsConnection
// ---------------------------------------------------------------------------

/// One WebSocket, the topic it was opened for, and its reader task.
pub struct WsConnection {
    id: u64,
    descriptor: TopicDescriptor,
    writer: Arc<Mutex<Option<WriterHalf>>>,
    state: Arc<Mutex<SessionState>>,
    reader: Option<JoinHandle<()>>,
}

impl WsConnection {
    /// Establish the socket for `descriptor` and spawn its reader task.
    ///
    /// The `open` callback fires once the handshake completes, before any
    /// inbound frame is delivered.
    pub(crate) async fn open(
        descriptor: TopicDescriptor,
        options: &WsOptions,
        callbacks: CallbackSet,
    ) -> Result<Self> {
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        let url = stream_url(&descriptor, options)?;

        let (stream, _resp) = connect_async(url.as_str()).await?;
        let (write, read) = stream.split();
        tracing::info!(connection = id, url = %url, topic = %descriptor.topic, "WebSocket connected");

        let auth = if descriptor.auth_required {
            AuthState::Pending
        } else {
            AuthState::NotRequired
        };
        let state = Arc::new(Mutex::new(SessionState {
            auth,
            pending: None,
            callbacks,
            closed: false,
        }));
        let writer = Arc::new(Mutex::new(Some(write)));

        state.lock().await.callbacks.emit_open();

        let reader = tokio::spawn(read_loop(
            id,
            read,
            writer.clone(),
            state.clone(),
            descriptor.clone(),
        ));

        Ok(Self {
            id,
            descriptor,
            writer,
            state,
            reader: Some(reader),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn descriptor(&self) -> &TopicDescriptor {
        &self.descriptor
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<SessionState>> {
        &self.state
    }

    /// Transmit one already-rendered envelope.
    pub(crate) async fn send(&self, envelope: String) -> Result<()> {
        send_on(&self.writer, envelope).await
    }

    /// Close the socket, stop the reader task, and fire the `close`
    /// callback. Idempotent.
    pub(crate) async fn close(&mut self) {
        if let Some(mut write) = self.writer.lock().await.take() {
            let _ = write.send(Message::Close(None)).await;
        }
        if let Some(task) = self.reader.take() {
            task.abort();
        }
        let mut state = self.state.lock().await;
        if !state.closed {
            state.closed = true;
            state.callbacks.emit_close();
            tracing::info!(connection = self.id, "WebSocket closed");
        }
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        if let Some(task) = self.reader.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Reader task
// ---------------------------------------------------------------------------

async fn read_loop(
    id: u64,
    mut read: ReaderHalf,
    writer: Arc<Mutex<Option<WriterHalf>>>,
    state: Arc<Mutex<SessionState>>,
    descriptor: TopicDescriptor,
) {
    while let Some(next) = read.next().await {
        match next {
            Ok(Message::Binary(data)) => {
                deliver(id, &data, &writer, &state, &descriptor).await;
            }
            Ok(Message::Text(text)) => {
                deliver(id, text.as_bytes(), &writer, &state, &descriptor).await;
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Transport-level keep-alive, answered by tungstenite itself.
                // The application-level ping/pong frames arrive as Text/Binary.
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection = id, "WebSocket closed by server");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(connection = id, error = %e, "WebSocket transport error");
                state
                    .lock()
                    .await
                    .callbacks
                    .emit_error(&ErrorEvent::Transport(e.to_string()));
                break;
            }
        }
    }

    // The socket is gone: later sends must report NotOpen.
    *writer.lock().await = None;
    let mut guard = state.lock().await;
    if !guard.closed {
        guard.closed = true;
        guard.callbacks.emit_close();
    }
}

/// Run one inbound frame through the protocol state machine and transmit
/// whatever it produced — pong, deferred command — before reading on.
async fn deliver(
    id: u64,
    raw: &[u8],
    writer: &Arc<Mutex<Option<WriterHalf>>>,
    state: &Arc<Mutex<SessionState>>,
    descriptor: &TopicDescriptor,
) {
    let outbound = {
        let mut guard = state.lock().await;
        protocol::handle_frame(&mut guard, descriptor, id, raw)
    };
    for envelope in outbound {
        if let Err(e) = send_on(writer, envelope).await {
            tracing::warn!(connection = id, error = %e, "failed to transmit protocol reply");
        }
    }
}

async fn send_on(writer: &Arc<Mutex<Option<WriterHalf>>>, envelope: String) -> Result<()> {
    let mut guard = writer.lock().await;
    let write = guard.as_mut().ok_or(HuobiError::NotOpen)?;
    write.send(Message::Text(envelope.into())).await?;
    Ok(())
}

fn stream_url(descriptor: &TopicDescriptor, options: &WsOptions) -> Result<Url> {
    let base = match &options.base_url {
        Some(base) => base.trim_end_matches('/').to_owned(),
        None => {
            let host = if options.aws { AWS_API_HOST } else { API_HOST };
            format!("wss://{host}")
        }
    };
    Ok(Url::parse(&format!("{base}/{}", descriptor.endpoint))?)
}
