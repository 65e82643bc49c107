//! Wire-format tests: catalog templates, envelope rendering, and request
//! signing. These are pure — no socket is opened.

use std::collections::BTreeMap;
use std::str::FromStr;

use huobi_rs::ws::session::build_envelope;
use huobi_rs::{HuobiError, ReqType, Topic, TopicCatalog, TopicDescriptor, signer, template};
use serde_json::Value;

// ===================================================================
// Topic catalog
// ===================================================================

#[test]
fn every_topic_renders_a_parseable_envelope() {
    let catalog = TopicCatalog::default();
    for topic in Topic::ALL {
        let descriptor = catalog.resolve(topic).expect("topic registered");
        let envelope = build_envelope(descriptor, ReqType::Sub, &[("req_id", "test-1")], 1)
            .unwrap_or_else(|e| panic!("{topic}: {e}"));

        assert!(
            !envelope.contains('$'),
            "{topic}: unresolved placeholder in {envelope}"
        );
        let parsed: Value =
            serde_json::from_str(&envelope).unwrap_or_else(|e| panic!("{topic}: {e}"));
        assert!(parsed.is_object(), "{topic}: envelope is not an object");
    }
}

#[test]
fn legacy_envelope_uses_req_type_as_key() {
    let catalog = TopicCatalog::default();
    let depth = catalog.resolve(Topic::Depth).unwrap();

    let envelope = build_envelope(depth, ReqType::Sub, &[("req_id", "abc")], 1).unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();
    assert_eq!(parsed["sub"], "market.btcusdt.depth.step0");
    assert_eq!(parsed["id"], "abc");

    let envelope = build_envelope(depth, ReqType::Unsub, &[("req_id", "abc")], 1).unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();
    assert_eq!(parsed["unsub"], "market.btcusdt.depth.step0");
}

#[test]
fn v2_envelope_uses_action_and_channel() {
    let catalog = TopicCatalog::default();
    let clearing = catalog.resolve(Topic::TradeClearing).unwrap();

    let envelope =
        build_envelope(clearing, ReqType::Sub, &[("symbol", "ethusdt"), ("mode", "1")], 1).unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();
    assert_eq!(parsed["action"], "sub");
    assert_eq!(parsed["ch"], "trade.clearing#ethusdt#1");
}

#[test]
fn unrecognized_parameters_are_dropped() {
    let catalog = TopicCatalog::default();
    let depth = catalog.resolve(Topic::Depth).unwrap();

    let envelope = build_envelope(
        depth,
        ReqType::Sub,
        &[("symbol", "ethusdt"), ("bogus", "value"), ("req_id", "r1")],
        1,
    )
    .unwrap();

    assert!(envelope.contains("market.ethusdt.depth.step0"));
    assert!(!envelope.contains("bogus"));
    assert!(!envelope.contains("value"));
}

#[test]
fn parameter_subset_falls_back_to_defaults() {
    let catalog = TopicCatalog::default();
    let candlestick = catalog.resolve(Topic::Candlestick).unwrap();

    // only the symbol is overridden; the period comes from the catalog
    let envelope =
        build_envelope(candlestick, ReqType::Sub, &[("symbol", "ethusdt")], 1).unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();
    assert_eq!(parsed["sub"], "market.ethusdt.kline.1min");
}

#[test]
fn synthesized_id_carries_connection_and_req_type() {
    let catalog = TopicCatalog::default();
    let depth = catalog.resolve(Topic::Depth).unwrap();

    let envelope = build_envelope(depth, ReqType::Req, &[], 42).unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();
    let id = parsed["id"].as_str().expect("id present");
    assert!(id.starts_with("42_req_"), "unexpected id: {id}");
}

#[test]
fn topic_names_round_trip() {
    for topic in Topic::ALL {
        assert_eq!(Topic::from_str(topic.as_str()).unwrap(), topic);
    }
    assert!(matches!(
        Topic::from_str("order_book_9000"),
        Err(HuobiError::UnknownTopic(name)) if name == "order_book_9000"
    ));
}

#[test]
fn catalog_rejects_template_with_unbacked_placeholder() {
    let bad = TopicDescriptor {
        topic: Topic::Ticker,
        endpoint: "ws".to_owned(),
        default_params: BTreeMap::from([("symbol".to_owned(), "btcusdt".to_owned())]),
        template: r#"{"$req_type$":"market.$symbol$.$granularity$"}"#.to_owned(),
        compressed: true,
        auth_required: false,
    };
    assert!(matches!(
        TopicCatalog::new(vec![bad]),
        Err(HuobiError::MissingPlaceholder(name)) if name == "granularity"
    ));
}

// ===================================================================
// Template substitution
// ===================================================================

#[test]
fn render_replaces_every_placeholder() {
    let mut params = BTreeMap::new();
    params.insert("symbol".to_owned(), "btcusdt".to_owned());
    params.insert("period".to_owned(), "5min".to_owned());
    params.insert("unused".to_owned(), "ignored".to_owned());

    let rendered = template::render("market.$symbol$.kline.$period$", &params).unwrap();
    assert_eq!(rendered, "market.btcusdt.kline.5min");
}

#[test]
fn render_fails_fast_on_missing_placeholder() {
    let params = BTreeMap::from([("symbol".to_owned(), "btcusdt".to_owned())]);
    assert!(matches!(
        template::render("market.$symbol$.kline.$period$", &params),
        Err(HuobiError::MissingPlaceholder(name)) if name == "period"
    ));
}

// ===================================================================
// Signer
// ===================================================================

#[test]
fn auth_canonical_encodes_timestamp_colons() {
    let canonical =
        signer::auth_canonical("api.huobi.pro", "test-access-key", "2024-01-02T03:04:05").unwrap();
    assert_eq!(
        canonical,
        "GET\napi.huobi.pro\n/ws/v2\naccessKey=test-access-key&signatureMethod=HmacSHA256&signatureVersion=2.1&timestamp=2024-01-02T03%3A04%3A05"
    );
}

#[test]
fn signature_matches_known_vector() {
    let canonical =
        signer::auth_canonical("api.huobi.pro", "test-access-key", "2024-01-02T03:04:05").unwrap();
    assert_eq!(
        signer::sign("test-secret-key", &canonical),
        "ip+rt+KqJLG/IW7OplfNTSfiIFHVz1/RKIlYc8t7Fok="
    );
}

#[test]
fn auth_envelope_has_documented_shape() {
    let envelope = signer::auth_envelope_at(
        "api.huobi.pro",
        "test-access-key",
        "test-secret-key",
        "2024-01-02T03:04:05",
    )
    .unwrap();
    let parsed: Value = serde_json::from_str(&envelope).unwrap();

    assert_eq!(parsed["action"], "req");
    assert_eq!(parsed["ch"], "auth");
    assert_eq!(parsed["params"]["authType"], "api");
    assert_eq!(parsed["params"]["accessKey"], "test-access-key");
    assert_eq!(parsed["params"]["signatureMethod"], "HmacSHA256");
    assert_eq!(parsed["params"]["signatureVersion"], "2.1");
    // transmitted timestamp stays unencoded — only the signed string encodes it
    assert_eq!(parsed["params"]["timestamp"], "2024-01-02T03:04:05");
    assert_eq!(
        parsed["params"]["signature"],
        "ip+rt+KqJLG/IW7OplfNTSfiIFHVz1/RKIlYc8t7Fok="
    );
}

#[test]
fn rest_canonical_sorts_query_parameters() {
    let canonical = signer::rest_canonical(
        "get",
        "api.huobi.pro",
        "/v1/account/accounts",
        &[("Timestamp", "2024-01-02T03%3A04%3A05"), ("AccessKeyId", "k")],
    );
    assert_eq!(
        canonical,
        "GET\napi.huobi.pro\n/v1/account/accounts\nAccessKeyId=k&Timestamp=2024-01-02T03%3A04%3A05"
    );
}
