//! # huobi-rs
//!
//! A Rust client library for the Huobi exchange WebSocket streaming API:
//! market-data subscriptions, private-channel authentication, keep-alive
//! handling, and payload decompression.
//!
//! ## Quick Start
//!
//! ```no_run
//! use huobi_rs::{CallbackSet, Topic, WsOptions, WsSession};
//!
//! #[tokio::main]
//! async fn main() -> huobi_rs::Result<()> {
//!     let mut session = WsSession::connect(
//!         Topic::Ticker,
//!         WsOptions::new(),
//!         CallbackSet::new().on_open(|| println!("connected")),
//!     )
//!     .await?;
//!
//!     session
//!         .subscribe(
//!             &[("symbol", "btcusdt")],
//!             CallbackSet::new()
//!                 .on_message(|frame| println!("{frame}"))
//!                 .on_error(|event| eprintln!("{event:?}")),
//!         )
//!         .await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod signer;
pub mod template;
pub mod topics;
pub mod ws;

/// Re-export the error type and Result alias.
pub use error::{HuobiError, Result};
/// Re-export the topic catalog types at crate root for convenience.
pub use topics::{Topic, TopicCatalog, TopicDescriptor};
/// Re-export the streaming surface at crate root for convenience.
pub use ws::callbacks::{CallbackSet, ErrorEvent};
pub use ws::connection::AuthState;
pub use ws::session::{ReqType, TopicRequest, WsOptions, WsSession};
