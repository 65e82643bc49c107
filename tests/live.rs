//! Live smoke tests against the production Huobi WebSocket API.
//!
//! # Running
//!
//! These tests open real sockets to `api.huobi.pro` and are skipped unless
//! explicitly enabled:
//!
//! ```sh
//! export HUOBI_LIVE_WS=1
//! # additionally, for the private-channel test:
//! export HUOBI_ACCESS_KEY="your-access-key"
//! export HUOBI_SECRET_KEY="your-secret-key"
//! cargo test --test live -- --nocapture
//! ```
//!
//! Without `HUOBI_LIVE_WS`, every test is silently skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use huobi_rs::{AuthState, CallbackSet, Topic, WsOptions, WsSession};

/// Helper: skip the test when live runs are not enabled.
macro_rules! require_live {
    () => {
        if std::env::var("HUOBI_LIVE_WS").is_err() {
            eprintln!("⏭  Skipped (HUOBI_LIVE_WS not set)");
            return;
        }
    };
}

#[tokio::test]
async fn test_public_ticker_stream() {
    require_live!();

    let messages = Arc::new(AtomicUsize::new(0));
    let pings = Arc::new(AtomicUsize::new(0));
    let message_count = messages.clone();
    let ping_count = pings.clone();

    let mut session = WsSession::connect(
        Topic::Ticker,
        WsOptions::new(),
        CallbackSet::new().on_open(|| println!("✔ Connected")),
    )
    .await
    .expect("connect failed");

    session
        .subscribe(
            &[("symbol", "btcusdt")],
            CallbackSet::new()
                .on_message(move |frame| {
                    message_count.fetch_add(1, Ordering::Relaxed);
                    println!("✔ Tick: {frame}");
                })
                .on_ping(move |_| {
                    ping_count.fetch_add(1, Ordering::Relaxed);
                })
                .on_error(|event| eprintln!("error: {event:?}")),
        )
        .await
        .expect("subscribe failed");

    tokio::time::sleep(Duration::from_secs(10)).await;
    session.close().await;

    assert!(
        messages.load(Ordering::Relaxed) > 0,
        "no ticker events within 10s"
    );
    println!(
        "✔ Received {} events, {} pings",
        messages.load(Ordering::Relaxed),
        pings.load(Ordering::Relaxed)
    );
}

#[tokio::test]
async fn test_private_accounts_update_auth() {
    require_live!();
    let (Ok(access_key), Ok(secret_key)) = (
        std::env::var("HUOBI_ACCESS_KEY"),
        std::env::var("HUOBI_SECRET_KEY"),
    ) else {
        eprintln!("⏭  Skipped (HUOBI_ACCESS_KEY / HUOBI_SECRET_KEY not set)");
        return;
    };

    let mut session = WsSession::connect(
        Topic::AccountsUpdate,
        WsOptions::new().credentials(access_key, secret_key),
        CallbackSet::new().on_open(|| println!("✔ Connected to /ws/v2")),
    )
    .await
    .expect("connect failed");

    session
        .subscribe(
            &[],
            CallbackSet::new()
                .on_message(|frame| println!("✔ Account event: {frame}"))
                .on_error(|event| eprintln!("error: {event:?}")),
        )
        .await
        .expect("subscribe failed");

    // give the handshake a moment to complete
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        match session.auth_state().await {
            AuthState::Authenticated => break,
            AuthState::Failed => panic!("authentication rejected"),
            _ if tokio::time::Instant::now() >= deadline => {
                panic!("authentication timed out")
            }
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    println!("✔ Authenticated");
    session.close().await;
}
