//! Binary to connect to the Huobi market WebSocket and subscribe to the
//! BTC/USDT ticker and depth streams for inspecting live data.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin ws_check --features cli
//! ```

use std::time::Duration;

use huobi_rs::{CallbackSet, Topic, TopicRequest, WsOptions, WsSession};
use tokio::time;

#[tokio::main]
async fn main() -> huobi_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Connecting to the Huobi market WebSocket…");
    let mut session = WsSession::connect(
        Topic::Ticker,
        WsOptions::new(),
        CallbackSet::new().on_open(|| println!("connected")),
    )
    .await?;

    println!("Subscribing to btcusdt ticker + depth over one socket…");
    session
        .subscribe_batch(
            &[
                TopicRequest::new(Topic::Ticker).param("symbol", "btcusdt"),
                TopicRequest::new(Topic::Depth).param("symbol", "btcusdt"),
            ],
            CallbackSet::new()
                .on_message(|frame| println!("{frame:#}"))
                .on_ping(|frame| println!("ping: {frame}"))
                .on_error(|event| eprintln!("error: {event:?}"))
                .on_close(|| println!("closed")),
        )
        .await?;

    println!("Listening for events for 10 seconds…\n");
    time::sleep(Duration::from_secs(10)).await;

    println!("\n10 seconds elapsed — disconnecting…");
    session.close().await;
    println!("Done.");

    Ok(())
}
