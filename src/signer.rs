//! Request signing for authenticated channels.
//!
//! Huobi authenticates both the v2 private WebSocket channel and REST
//! requests with the same primitive: a base64-encoded HMAC-SHA256 digest
//! over a canonical string. This module provides the primitive plus the two
//! canonical-string shapes, and builds the complete signed auth envelope for
//! the `/ws/v2` handshake.
//!
//! The REST endpoint catalog itself lives outside this crate; only the
//! canonical shape is provided here because the signing primitive is shared.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::constants::{SIGNATURE_METHOD, SIGNATURE_VERSION};
use crate::error::Result;
use crate::template;

type HmacSha256 = Hmac<Sha256>;

/// Canonical string signed during the `/ws/v2` auth handshake.
///
/// The timestamp placeholder receives the URL-encoded form; the value
/// transmitted in the auth request itself stays plain.
const AUTH_CANONICAL_TEMPLATE: &str = "GET\n$host$\n/ws/v2\naccessKey=$access_key$&signatureMethod=HmacSHA256&signatureVersion=2.1&timestamp=$timestamp$";

/// Compute `base64(HMAC-SHA256(secret, canonical))`.
pub fn sign(secret: &str, canonical: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(canonical.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Build the canonical string for the `/ws/v2` auth handshake.
///
/// `timestamp` must be UTC with second precision in `YYYY-MM-DDTHH:MM:SS`
/// form; its `:` separators are URL-encoded inside the signed string only.
pub fn auth_canonical(host: &str, access_key: &str, timestamp: &str) -> Result<String> {
    let mut params = BTreeMap::new();
    params.insert("host".to_owned(), host.to_owned());
    params.insert("access_key".to_owned(), access_key.to_owned());
    params.insert("timestamp".to_owned(), timestamp.replace(':', "%3A"));
    template::render(AUTH_CANONICAL_TEMPLATE, &params)
}

/// Build the canonical string for REST request signing:
/// `<METHOD>\n<host>\n<path>\n<key-sorted query string>`.
pub fn rest_canonical(method: &str, host: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut pairs = query.to_vec();
    pairs.sort();
    let encoded = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}\n{host}\n{path}\n{encoded}", method.to_uppercase())
}

/// Current UTC time in the second-precision ISO-8601 form the server expects.
pub fn auth_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Auth envelope
// ---------------------------------------------------------------------------

/// Parameter block of the v2 auth request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthParams {
    auth_type: &'static str,
    access_key: String,
    signature_method: &'static str,
    signature_version: &'static str,
    timestamp: String,
    signature: String,
}

/// The v2 auth request envelope.
#[derive(Debug, Serialize)]
struct AuthRequest {
    action: &'static str,
    ch: &'static str,
    params: AuthParams,
}

/// Build the signed auth envelope for the `/ws/v2` handshake, stamped with
/// the current UTC time.
pub fn auth_envelope(host: &str, access_key: &str, secret: &str) -> Result<String> {
    auth_envelope_at(host, access_key, secret, &auth_timestamp())
}

/// Build the signed auth envelope for an explicit `timestamp`.
pub fn auth_envelope_at(
    host: &str,
    access_key: &str,
    secret: &str,
    timestamp: &str,
) -> Result<String> {
    let canonical = auth_canonical(host, access_key, timestamp)?;
    let request = AuthRequest {
        action: "req",
        ch: "auth",
        params: AuthParams {
            auth_type: "api",
            access_key: access_key.to_owned(),
            signature_method: SIGNATURE_METHOD,
            signature_version: SIGNATURE_VERSION,
            timestamp: timestamp.to_owned(),
            signature: sign(secret, &canonical),
        },
    };
    Ok(serde_json::to_string(&request)?)
}
