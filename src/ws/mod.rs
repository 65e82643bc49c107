//! WebSocket streaming engine for Huobi push data.
//!
//! Huobi serves streaming data over two coexisting wire generations,
//! distinguished by endpoint path:
//!
//! ## Legacy market endpoints (`/ws`, `/feed`)
//!
//! Public market data — candlesticks, tickers, depth, MBP, BBO, trades —
//! as **gzip-compressed** JSON frames. Keep-alive pings are shaped
//! `{"ping": ts}` and must be answered `{"pong": ts}`.
//!
//! ## v2 private endpoint (`/ws/v2`)
//!
//! Order updates, trade clearing, and account changes as **plain JSON**
//! frames, behind a signed auth handshake. Pings are shaped
//! `{"action":"ping","data":{"ts":..}}` and answered in kind.
//!
//! The generation distinction is carried by the topic catalog and applied
//! per frame: payload decompression follows the topic, pong shape follows
//! the ping that was received.
//!
//! ## Usage
//!
//! Open a [`session::WsSession`] for a topic, then issue commands with a
//! [`callbacks::CallbackSet`] describing where events should go. Commands on
//! auth-required topics are held back until the server acknowledges the
//! handshake; the deferred command is then transmitted exactly once.
//!
//! ## Caller contracts
//!
//! - Serialize command invocation per session; inbound delivery runs on the
//!   session's own reader task and never reenters callbacks concurrently.
//! - There is no automatic reconnect. Transport failures surface through the
//!   `error` and `close` callbacks; recreate the session to reconnect.

pub mod callbacks;
pub mod connection;
pub(crate) mod protocol;
pub mod session;
