//! Inbound frame classification and the protocol state machine.
//!
//! Every frame a connection receives runs through [`handle_frame`]:
//! decompress if the topic's generation requires it, parse as JSON, classify
//! into exactly one of the frame classes below, then apply the class's
//! effects — update auth state, queue a pong of the matching generation,
//! release the deferred command, or hand the payload to the caller.
//!
//! Classification table (first match wins):
//!
//! | Frame | Class | Effect |
//! |---|---|---|
//! | `status == "ok"` with `subbed` | `SubscribeAck` | swallowed, no callback |
//! | `ch == "auth"`, `code == 200` | `AuthOk` | authenticated; pending command released |
//! | `ch == "auth"`, `code != 200` | `AuthRejected` | state `Failed`; `error` callback |
//! | `ping` field (legacy) | `PingV1` | `{"pong": ts}` queued; `ping` callback |
//! | `action == "ping"` (v2) | `PingV2` | v2 pong queued; `ping` callback |
//! | `status == "error"` | `ErrorFrame` | `error` callback |
//! | anything else | `Data` | `message` callback |
//!
//! The `log` callback sees every decoded frame before the class-specific
//! handler runs. Answering a legacy ping with a v2 pong (or vice versa) is a
//! protocol violation, so the pong shape is derived from the ping that was
//! actually received, never from the topic.

use std::io::Read;

use flate2::read::GzDecoder;
use serde_json::{Value, json};

use crate::error::{HuobiError, Result};
use crate::topics::TopicDescriptor;
use crate::ws::callbacks::ErrorEvent;
use crate::ws::connection::{AuthState, SessionState};
use crate::ws::session::build_envelope;

/// What one decoded frame turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameClass {
    SubscribeAck,
    AuthOk,
    AuthRejected,
    PingV1,
    PingV2,
    ErrorFrame,
    Data,
}

/// Classify a decoded frame. Stateless; auth-state transitions happen in
/// [`handle_frame`].
pub(crate) fn classify(frame: &Value) -> FrameClass {
    if frame["status"] == "ok" && frame.get("subbed").is_some() {
        return FrameClass::SubscribeAck;
    }
    if frame["ch"] == "auth" {
        return if frame["code"] == 200 {
            FrameClass::AuthOk
        } else {
            FrameClass::AuthRejected
        };
    }
    if frame.get("ping").is_some() {
        return FrameClass::PingV1;
    }
    if frame["action"] == "ping" {
        return FrameClass::PingV2;
    }
    if frame["status"] == "error" {
        return FrameClass::ErrorFrame;
    }
    FrameClass::Data
}

/// Decode a raw frame: gunzip when the topic's generation compresses, then
/// parse as JSON.
pub(crate) fn decode_frame(raw: &[u8], compressed: bool) -> Result<Value> {
    if compressed {
        let mut decoder = GzDecoder::new(raw);
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .map_err(|e| HuobiError::FrameDecode(format!("gunzip failed: {e}")))?;
        serde_json::from_str(&text).map_err(|e| HuobiError::FrameDecode(e.to_string()))
    } else {
        let text = std::str::from_utf8(raw)
            .map_err(|e| HuobiError::FrameDecode(format!("invalid UTF-8: {e}")))?;
        serde_json::from_str(text).map_err(|e| HuobiError::FrameDecode(e.to_string()))
    }
}

/// Build the pong answering `frame`, echoing the generation that was
/// received.
pub(crate) fn pong_for(frame: &Value) -> Option<String> {
    if let Some(ts) = frame.get("ping") {
        return Some(json!({ "pong": ts }).to_string());
    }
    if frame["action"] == "ping" {
        return Some(json!({ "action": "pong", "data": { "ts": frame["data"]["ts"] } }).to_string());
    }
    None
}

/// Run one inbound frame through the state machine.
///
/// Returns the envelopes the connection must transmit in response, in order.
/// Pongs must go out before the next frame is read; the reader task sends
/// them immediately after this returns.
pub(crate) fn handle_frame(
    state: &mut SessionState,
    descriptor: &TopicDescriptor,
    connection_id: u64,
    raw: &[u8],
) -> Vec<String> {
    let frame = match decode_frame(raw, descriptor.compressed) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(connection = connection_id, error = %e, "dropping undecodable frame");
            state.callbacks.emit_error(&ErrorEvent::Decode(e.to_string()));
            return Vec::new();
        }
    };

    state.callbacks.emit_log(&format!("Got message: {frame}"));

    let mut outbound = Vec::new();
    match classify(&frame) {
        // Subscription confirmations never reach a handler; callers rely on
        // the quiet-ack contract.
        FrameClass::SubscribeAck => {}

        FrameClass::AuthOk => {
            state.auth = AuthState::Authenticated;
            if let Some(pending) = state.pending.take() {
                let params: Vec<(&str, &str)> = pending
                    .params
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect();
                match build_envelope(descriptor, pending.req_type, &params, connection_id) {
                    Ok(envelope) => {
                        state.callbacks.emit_log(&format!("Send: {envelope}"));
                        outbound.push(envelope);
                    }
                    Err(e) => {
                        tracing::error!(
                            connection = connection_id,
                            error = %e,
                            "failed to render deferred command"
                        );
                    }
                }
            }
        }

        FrameClass::AuthRejected => {
            state.auth = AuthState::Failed;
            state.callbacks.emit_error(&ErrorEvent::Frame(frame));
        }

        FrameClass::PingV1 | FrameClass::PingV2 => {
            if let Some(pong) = pong_for(&frame) {
                state.callbacks.emit_log(&format!("Send pong: {pong}"));
                outbound.push(pong);
            }
            state.callbacks.emit_ping(&frame);
        }

        FrameClass::ErrorFrame => {
            state.callbacks.emit_error(&ErrorEvent::Frame(frame));
        }

        FrameClass::Data => {
            state.callbacks.emit_message(&frame);
        }
    }

    outbound
}
