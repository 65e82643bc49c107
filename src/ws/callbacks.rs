//! Caller-supplied event handlers.
//!
//! Every command registers a [`CallbackSet`]: six optional handlers covering
//! the lifecycle (`open`, `close`), the data path (`message`), failures
//! (`error`), keep-alive observability (`ping`), and a raw protocol log
//! (`log`). The set is replaced wholesale on each command — handlers from a
//! previous command are dropped, never merged.
//!
//! Handlers are invoked from the connection's reader task (the `open`
//! handler from the opening call) and never reentered concurrently for a
//! single connection. A panicking handler is caught and logged; it cannot
//! abort frame processing.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;

/// Handler invoked with a decoded JSON frame.
pub type FrameHandler = Box<dyn FnMut(&Value) + Send + 'static>;

/// Handler invoked on a lifecycle transition (`open`, `close`).
pub type LifecycleHandler = Box<dyn FnMut() + Send + 'static>;

/// Handler invoked with one line of protocol-level logging.
pub type LogHandler = Box<dyn FnMut(&str) + Send + 'static>;

/// Handler invoked with an [`ErrorEvent`].
pub type ErrorHandler = Box<dyn FnMut(&ErrorEvent) + Send + 'static>;

/// The payload handed to an `error` handler.
#[derive(Debug)]
pub enum ErrorEvent {
    /// A server frame that classified as an error, including a rejected
    /// auth acknowledgment.
    Frame(Value),
    /// An inbound frame that could not be decompressed or parsed. The
    /// connection remains usable.
    Decode(String),
    /// A socket-level failure. The `close` handler fires afterwards.
    Transport(String),
}

/// The six optional handlers a command registers.
///
/// # Example
///
/// ```
/// use huobi_rs::CallbackSet;
///
/// let callbacks = CallbackSet::new()
///     .on_open(|| println!("connected"))
///     .on_message(|frame| println!("event: {frame}"))
///     .on_error(|event| eprintln!("error: {event:?}"));
/// ```
#[derive(Default)]
pub struct CallbackSet {
    pub(crate) open: Option<LifecycleHandler>,
    pub(crate) message: Option<FrameHandler>,
    pub(crate) error: Option<ErrorHandler>,
    pub(crate) close: Option<LifecycleHandler>,
    pub(crate) ping: Option<FrameHandler>,
    pub(crate) log: Option<LogHandler>,
}

impl CallbackSet {
    /// An empty set; every event is dropped until handlers are attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked once the socket handshake completes.
    pub fn on_open(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.open = Some(Box::new(handler));
        self
    }

    /// Invoked with every decoded data event.
    pub fn on_message(mut self, handler: impl FnMut(&Value) + Send + 'static) -> Self {
        self.message = Some(Box::new(handler));
        self
    }

    /// Invoked on error frames, decode failures, and transport failures.
    pub fn on_error(mut self, handler: impl FnMut(&ErrorEvent) + Send + 'static) -> Self {
        self.error = Some(Box::new(handler));
        self
    }

    /// Invoked once when the socket is gone, whichever side closed it.
    pub fn on_close(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.close = Some(Box::new(handler));
        self
    }

    /// Invoked with each server ping, after the pong has been queued.
    pub fn on_ping(mut self, handler: impl FnMut(&Value) + Send + 'static) -> Self {
        self.ping = Some(Box::new(handler));
        self
    }

    /// Invoked with every frame sent or received, formatted as a log line.
    pub fn on_log(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.log = Some(Box::new(handler));
        self
    }

    // -----------------------------------------------------------------------
    // Emitters: panic-isolated, a handler cannot abort frame processing
    // -----------------------------------------------------------------------

    pub(crate) fn emit_open(&mut self) {
        if let Some(handler) = self.open.as_mut() {
            guarded("open", || handler());
        }
    }

    pub(crate) fn emit_message(&mut self, frame: &Value) {
        if let Some(handler) = self.message.as_mut() {
            guarded("message", || handler(frame));
        }
    }

    pub(crate) fn emit_error(&mut self, event: &ErrorEvent) {
        if let Some(handler) = self.error.as_mut() {
            guarded("error", || handler(event));
        }
    }

    pub(crate) fn emit_close(&mut self) {
        if let Some(handler) = self.close.as_mut() {
            guarded("close", || handler());
        }
    }

    pub(crate) fn emit_ping(&mut self, frame: &Value) {
        if let Some(handler) = self.ping.as_mut() {
            guarded("ping", || handler(frame));
        }
    }

    pub(crate) fn emit_log(&mut self, line: &str) {
        if let Some(handler) = self.log.as_mut() {
            guarded("log", || handler(line));
        }
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("open", &self.open.is_some())
            .field("message", &self.message.is_some())
            .field("error", &self.error.is_some())
            .field("close", &self.close.is_some())
            .field("ping", &self.ping.is_some())
            .field("log", &self.log.is_some())
            .finish()
    }
}

fn guarded(name: &str, invoke: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(invoke)).is_err() {
        tracing::warn!(callback = name, "callback panicked; frame processing continues");
    }
}
