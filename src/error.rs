//! Error types for the `huobi-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, HuobiError>`.
//!
//! [`HuobiError`] covers:
//! - **Caller errors** — unknown topics, missing credentials, bad arguments
//! - **Config errors** — a template placeholder with no parameter behind it
//! - **Lifecycle errors** — transmitting on a socket that is not open
//! - **Frame errors** — undecompressable or unparseable inbound frames
//! - **Transport errors** — WebSocket and URL failures from the underlying stack
//!
//! Failures that occur while the reader task is processing inbound frames are
//! never thrown across the event-delivery boundary; they reach the caller
//! through the `error` callback of the
//! [`CallbackSet`](crate::ws::callbacks::CallbackSet) instead.

/// All possible errors produced by the `huobi-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum HuobiError {
    /// The named topic is not registered in the catalog in use.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// A template references a placeholder that no parameter resolves.
    ///
    /// This is a programmer/configuration error, not a runtime condition —
    /// it fails fast at catalog construction or envelope-rendering time.
    #[error("unresolved placeholder `${0}$` in template")]
    MissingPlaceholder(String),

    /// A transmission was attempted before the socket was open (or after it
    /// closed). Wait for the `open` callback before issuing commands.
    #[error("connection is not open")]
    NotOpen,

    /// An inbound frame could not be decompressed or parsed as JSON.
    ///
    /// The connection remains usable; subsequent frames are processed.
    #[error("failed to decode inbound frame: {0}")]
    FrameDecode(String),

    /// A WebSocket-level error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HuobiError>;
