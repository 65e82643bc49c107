//! Constants for the Huobi streaming API.
//!
//! Contains API hosts, WebSocket endpoint paths, and signature-scheme
//! identifiers. These are used internally by the
//! [`WsSession`](crate::ws::session::WsSession) and
//! [`signer`](crate::signer) modules, but are also exported for advanced
//! usage.

// ---------------------------------------------------------------------------
// Hosts
// ---------------------------------------------------------------------------

/// Production API host.
pub const API_HOST: &str = "api.huobi.pro";

/// AWS-edge API host, lower latency for clients hosted inside AWS.
pub const AWS_API_HOST: &str = "api-aws.huobi.pro";

// ---------------------------------------------------------------------------
// WebSocket endpoint paths
// ---------------------------------------------------------------------------

/// Legacy public market-data endpoint (gzip-compressed frames).
pub const WS_MARKET_ENDPOINT: &str = "ws";

/// Legacy incremental market-by-price feed endpoint (gzip-compressed frames).
pub const WS_FEED_ENDPOINT: &str = "feed";

/// v2 private endpoint (plain JSON frames, auth handshake required).
pub const WS_V2_ENDPOINT: &str = "ws/v2";

// ---------------------------------------------------------------------------
// Signature scheme
// ---------------------------------------------------------------------------

/// Signature algorithm reported in auth requests.
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// Signature scheme version for the v2 auth handshake.
pub const SIGNATURE_VERSION: &str = "2.1";

// ---------------------------------------------------------------------------
// Keep-alive
// ---------------------------------------------------------------------------

/// Server-side keep-alive cadence. A ping left unanswered past the server's
/// window terminates the connection, so pongs are transmitted immediately
/// upon receipt rather than batched.
pub mod keep_alive {
    /// Interval between server pings on the legacy market endpoints.
    pub const MARKET_PING_INTERVAL_SECS: u32 = 5;

    /// Interval between server pings on the v2 private endpoint.
    pub const V2_PING_INTERVAL_SECS: u32 = 20;
}
