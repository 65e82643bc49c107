//! The command surface of the streaming client.
//!
//! A [`WsSession`] pairs one [`WsConnection`](crate::ws::connection::WsConnection)
//! with the topic catalog and the command dispatcher: `subscribe`,
//! `unsubscribe`, and `request` each render the topic's envelope (catalog
//! defaults overridden by recognized caller parameters) and transmit it. On
//! auth-required topics the first command is deferred behind the auth
//! handshake and released by the server's acknowledgment.
//!
//! A session is not safe for concurrent command invocation: the caller must
//! serialize calls to `subscribe`/`unsubscribe`/`request` on a given
//! session. Inbound delivery runs on the session's own reader task and is
//! unaffected by this contract.
//!
//! # Example
//!
//! ```no_run
//! use huobi_rs::{CallbackSet, Topic, WsOptions, WsSession};
//!
//! # #[tokio::main]
//! # async fn main() -> huobi_rs::Result<()> {
//! let mut session = WsSession::connect(
//!     Topic::Candlestick,
//!     WsOptions::new(),
//!     CallbackSet::new().on_open(|| println!("connected")),
//! )
//! .await?;
//!
//! session
//!     .subscribe(
//!         &[("symbol", "btcusdt"), ("period", "5min")],
//!         CallbackSet::new().on_message(|frame| println!("{frame}")),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use chrono::Utc;
use url::Url;

use crate::constants::{API_HOST, AWS_API_HOST};
use crate::error::{HuobiError, Result};
use crate::signer;
use crate::template;
use crate::topics::{Topic, TopicCatalog, TopicDescriptor};
use crate::ws::callbacks::CallbackSet;
use crate::ws::connection::{AuthState, PendingCommand, WsConnection};

// ---------------------------------------------------------------------------
// Request type
// ---------------------------------------------------------------------------

/// The three command verbs of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqType {
    /// Subscribe to a stream.
    Sub,
    /// Cancel a subscription.
    Unsub,
    /// One-shot data request.
    Req,
}

impl ReqType {
    /// Wire spelling. On legacy topics this becomes the envelope's JSON
    /// *key*; on v2 topics it is the `action` value.
    pub fn as_str(self) -> &'static str {
        match self {
            ReqType::Sub => "sub",
            ReqType::Unsub => "unsub",
            ReqType::Req => "req",
        }
    }
}

impl fmt::Display for ReqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for opening a streaming session.
#[derive(Debug, Clone, Default)]
pub struct WsOptions {
    /// Connect to the AWS edge host instead of `api.huobi.pro`.
    pub aws: bool,
    /// Replace the production URL entirely, e.g. `ws://127.0.0.1:9443` when
    /// testing against a local server. The topic's endpoint path is appended.
    pub base_url: Option<String>,
    /// API key, required by auth-required topics.
    pub access_key: Option<String>,
    /// API secret, required by auth-required topics.
    pub secret_key: Option<String>,
}

impl WsOptions {
    /// Default options: production host, no credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route through the AWS edge host.
    pub fn aws(mut self) -> Self {
        self.aws = true;
        self
    }

    /// Point the session at a custom server (testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API credentials needed by auth-required topics.
    pub fn credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Batch entries
// ---------------------------------------------------------------------------

/// One entry of a batched dispatch: a topic plus its parameter overrides.
#[derive(Debug, Clone)]
pub struct TopicRequest {
    /// The topic to subscribe to.
    pub topic: Topic,
    /// Parameter overrides; unrecognized keys are dropped at render time.
    pub params: Vec<(String, String)>,
}

impl TopicRequest {
    /// A request for `topic` with catalog-default parameters.
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            params: Vec::new(),
        }
    }

    /// Override one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

// ---------------------------------------------------------------------------
// WsSession
// ---------------------------------------------------------------------------

/// A streaming session: one socket, one topic, and the command dispatcher.
pub struct WsSession {
    topic: Topic,
    catalog: TopicCatalog,
    host: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    connection: WsConnection,
}

impl WsSession {
    /// Open a session for `topic` using the production topic catalog.
    ///
    /// `callbacks` is the initial [`CallbackSet`]; its `open` handler fires
    /// once the socket handshake completes. Each subsequent command replaces
    /// the set wholesale.
    pub async fn connect(topic: Topic, options: WsOptions, callbacks: CallbackSet) -> Result<Self> {
        Self::connect_with_catalog(&TopicCatalog::default(), topic, options, callbacks).await
    }

    /// Open a session resolving `topic` from an explicitly supplied catalog.
    pub async fn connect_with_catalog(
        catalog: &TopicCatalog,
        topic: Topic,
        options: WsOptions,
        callbacks: CallbackSet,
    ) -> Result<Self> {
        let descriptor = catalog.resolve(topic)?.clone();
        if descriptor.auth_required
            && (options.access_key.is_none() || options.secret_key.is_none())
        {
            return Err(HuobiError::InvalidArgument(format!(
                "topic `{topic}` requires credentials"
            )));
        }

        let host = resolve_host(&options)?;
        let connection = WsConnection::open(descriptor, &options, callbacks).await?;

        Ok(Self {
            topic,
            catalog: catalog.clone(),
            host,
            access_key: options.access_key,
            secret_key: options.secret_key,
            connection,
        })
    }

    /// The topic this session was opened for.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Current authentication state of the underlying connection.
    pub async fn auth_state(&self) -> AuthState {
        self.connection.state().lock().await.auth
    }

    /// Subscribe to this session's topic.
    pub async fn subscribe(
        &mut self,
        params: &[(&str, &str)],
        callbacks: CallbackSet,
    ) -> Result<()> {
        self.run(ReqType::Sub, params, callbacks).await
    }

    /// Cancel the subscription on this session's topic.
    pub async fn unsubscribe(
        &mut self,
        params: &[(&str, &str)],
        callbacks: CallbackSet,
    ) -> Result<()> {
        self.run(ReqType::Unsub, params, callbacks).await
    }

    /// Issue a one-shot data request on this session's topic.
    pub async fn request(&mut self, params: &[(&str, &str)], callbacks: CallbackSet) -> Result<()> {
        self.run(ReqType::Req, params, callbacks).await
    }

    /// Dispatch a command: re-register `callbacks` (wholesale replace), then
    /// either transmit the rendered envelope or — on an auth-required topic
    /// that is not yet authenticated — store the command and transmit the
    /// auth envelope instead. The stored command is released by the server's
    /// acknowledgment.
    pub async fn run(
        &mut self,
        req_type: ReqType,
        params: &[(&str, &str)],
        callbacks: CallbackSet,
    ) -> Result<()> {
        let auth_required = self.connection.descriptor().auth_required;
        let needs_auth = {
            let mut state = self.connection.state().lock().await;
            state.callbacks = callbacks;
            auth_required && state.auth != AuthState::Authenticated
        };

        if needs_auth {
            let (access_key, secret_key) = self.credentials()?;
            let envelope = signer::auth_envelope(&self.host, access_key, secret_key)?;
            {
                let mut state = self.connection.state().lock().await;
                state.auth = AuthState::Pending;
                state.pending = Some(PendingCommand {
                    req_type,
                    params: params
                        .iter()
                        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                        .collect(),
                });
                state.callbacks.emit_log(&format!("Send auth: {envelope}"));
            }
            return self.connection.send(envelope).await;
        }

        let envelope = build_envelope(
            self.connection.descriptor(),
            req_type,
            params,
            self.connection.id(),
        )?;
        self.log_send(&envelope).await;
        self.connection.send(envelope).await
    }

    /// Subscribe to several public topics over this one socket, sharing one
    /// [`CallbackSet`]. Envelopes are transmitted in input order; the
    /// server's acknowledgment order is not guaranteed to match.
    pub async fn subscribe_batch(
        &mut self,
        requests: &[TopicRequest],
        callbacks: CallbackSet,
    ) -> Result<()> {
        {
            let mut state = self.connection.state().lock().await;
            state.callbacks = callbacks;
        }

        for request in requests {
            let descriptor = self.catalog.resolve(request.topic)?;
            if descriptor.auth_required {
                return Err(HuobiError::InvalidArgument(format!(
                    "batch dispatch supports public topics only, got `{}`",
                    request.topic
                )));
            }
            let params: Vec<(&str, &str)> = request
                .params
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let envelope =
                build_envelope(descriptor, ReqType::Sub, &params, self.connection.id())?;
            self.log_send(&envelope).await;
            self.connection.send(envelope).await?;
        }
        Ok(())
    }

    /// Close the socket and fire the `close` callback. Idempotent.
    pub async fn close(&mut self) {
        self.connection.close().await;
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access_key), Some(secret_key)) => Ok((access_key, secret_key)),
            _ => Err(HuobiError::InvalidArgument(format!(
                "topic `{}` requires credentials",
                self.topic
            ))),
        }
    }

    async fn log_send(&self, envelope: &str) {
        self.connection
            .state()
            .lock()
            .await
            .callbacks
            .emit_log(&format!("Send: {envelope}"));
    }
}

/// The host name used in the auth canonical string: the host the session
/// actually connects to.
fn resolve_host(options: &WsOptions) -> Result<String> {
    match &options.base_url {
        Some(base) => {
            let url = Url::parse(base)?;
            Ok(url.host_str().unwrap_or(API_HOST).to_owned())
        }
        None => Ok(if options.aws { AWS_API_HOST } else { API_HOST }.to_owned()),
    }
}

// ---------------------------------------------------------------------------
// Envelope rendering
// ---------------------------------------------------------------------------

/// Render the wire envelope for a command against `descriptor`.
///
/// Caller parameters override the descriptor's defaults; keys outside the
/// descriptor's default set are silently dropped. A `req_id` parameter
/// overrides the synthesized request id.
pub fn build_envelope(
    descriptor: &TopicDescriptor,
    req_type: ReqType,
    params: &[(&str, &str)],
    connection_id: u64,
) -> Result<String> {
    let mut merged = descriptor.default_params.clone();
    let mut req_id = None;
    for (key, value) in params {
        if *key == "req_id" {
            req_id = Some((*value).to_owned());
        } else if merged.contains_key(*key) {
            merged.insert((*key).to_owned(), (*value).to_owned());
        }
    }
    merged.insert("req_type".to_owned(), req_type.as_str().to_owned());
    merged.insert(
        "id".to_owned(),
        req_id.unwrap_or_else(|| synthesize_id(connection_id, req_type)),
    );
    template::render(&descriptor.template, &merged)
}

/// Request ids are unique within the process: connection counter, request
/// type, millisecond timestamp.
fn synthesize_id(connection_id: u64, req_type: ReqType) -> String {
    format!(
        "{connection_id}_{}_{}",
        req_type.as_str(),
        Utc::now().timestamp_millis()
    )
}
