//! Topic catalog: the closed set of streams this client can subscribe to.
//!
//! Every stream the server offers is described by a [`TopicDescriptor`]:
//! which endpoint carries it, which parameters its channel name takes (with
//! defaults), the envelope template used to subscribe to it, whether its
//! frames arrive gzip-compressed, and whether it sits behind the auth
//! handshake.
//!
//! Two wire generations coexist and are distinguished by endpoint path:
//!
//! | Generation | Endpoints | Frames | Ping shape | Auth |
//! |---|---|---|---|---|
//! | legacy | `ws`, `feed` | gzip | `{"ping": ts}` | no |
//! | v2 | `ws/v2` | plain JSON | `{"action":"ping","data":{"ts":..}}` | yes |
//!
//! The catalog is an immutable value constructed once and handed to the
//! session; tests may construct synthetic catalogs with
//! [`TopicCatalog::new`] to point topics at a local server or change their
//! wire conventions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{WS_FEED_ENDPOINT, WS_MARKET_ENDPOINT, WS_V2_ENDPOINT};
use crate::error::{HuobiError, Result};
use crate::template;

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A named stream of exchange data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// Candlestick (kline) updates for a symbol and period.
    Candlestick,
    /// 24h-rolling ticker for a symbol.
    Ticker,
    /// Aggregated order-book depth snapshots.
    Depth,
    /// Incremental market-by-price updates (`feed` endpoint).
    ByPriceIncremental,
    /// Full-refresh market-by-price snapshots.
    ByPriceRefresh,
    /// Best bid / best offer updates.
    BestBidOffer,
    /// Individual trade prints.
    TradeDetail,
    /// Aggregated 24h market details.
    Details,
    /// ETP net-asset-value updates.
    Etp,
    /// Private: order lifecycle updates.
    OrderUpdates,
    /// Private: trade clearing confirmations.
    TradeClearing,
    /// Private: account balance changes.
    AccountsUpdate,
}

impl Topic {
    /// Every supported topic, in catalog order.
    pub const ALL: [Topic; 12] = [
        Topic::Candlestick,
        Topic::Ticker,
        Topic::Depth,
        Topic::ByPriceIncremental,
        Topic::ByPriceRefresh,
        Topic::BestBidOffer,
        Topic::TradeDetail,
        Topic::Details,
        Topic::Etp,
        Topic::OrderUpdates,
        Topic::TradeClearing,
        Topic::AccountsUpdate,
    ];

    /// The topic's identifier as used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Candlestick => "candlestick",
            Topic::Ticker => "ticker",
            Topic::Depth => "depth",
            Topic::ByPriceIncremental => "by_price_incremental",
            Topic::ByPriceRefresh => "by_price_refresh",
            Topic::BestBidOffer => "best_bid_offer",
            Topic::TradeDetail => "trade_detail",
            Topic::Details => "details",
            Topic::Etp => "etp",
            Topic::OrderUpdates => "order_updates",
            Topic::TradeClearing => "trade_clearing",
            Topic::AccountsUpdate => "accounts_update",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = HuobiError;

    fn from_str(s: &str) -> Result<Self> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| HuobiError::UnknownTopic(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// TopicDescriptor
// ---------------------------------------------------------------------------

/// Wire conventions for one topic.
#[derive(Debug, Clone)]
pub struct TopicDescriptor {
    /// The topic this descriptor describes.
    pub topic: Topic,
    /// Endpoint path under the API host (`ws`, `feed` or `ws/v2`).
    pub endpoint: String,
    /// Recognized channel parameters and their defaults. Caller-supplied
    /// parameters outside this key set are dropped from rendered envelopes.
    pub default_params: BTreeMap<String, String>,
    /// Envelope template with `$name$` placeholders. Besides the parameter
    /// names, `$req_type$` and `$id$` are resolved at render time.
    pub template: String,
    /// Whether inbound frames for this topic arrive gzip-compressed.
    pub compressed: bool,
    /// Whether commands on this topic require the auth handshake first.
    pub auth_required: bool,
}

impl TopicDescriptor {
    /// Check that every placeholder the template references is resolvable:
    /// either a recognized parameter or one of the render-time extras.
    fn validate(&self) -> Result<()> {
        for name in template::placeholders(&self.template) {
            if name != "req_type" && name != "id" && !self.default_params.contains_key(&name) {
                return Err(HuobiError::MissingPlaceholder(name));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TopicCatalog
// ---------------------------------------------------------------------------

/// Immutable registry mapping topics to their wire conventions.
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    entries: BTreeMap<Topic, TopicDescriptor>,
}

impl TopicCatalog {
    /// Build a catalog from explicit descriptors, validating that every
    /// template placeholder is backed by a recognized parameter.
    pub fn new(descriptors: impl IntoIterator<Item = TopicDescriptor>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for descriptor in descriptors {
            descriptor.validate()?;
            entries.insert(descriptor.topic, descriptor);
        }
        Ok(Self { entries })
    }

    /// Look up the descriptor for `topic`.
    pub fn resolve(&self, topic: Topic) -> Result<&TopicDescriptor> {
        self.entries
            .get(&topic)
            .ok_or_else(|| HuobiError::UnknownTopic(topic.as_str().to_owned()))
    }

    /// Topics registered in this catalog.
    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.entries.keys().copied()
    }
}

impl Default for TopicCatalog {
    /// The production topic table.
    fn default() -> Self {
        let descriptors = vec![
            descriptor(
                Topic::Candlestick,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt"), ("period", "1min")],
                r#"{"$req_type$":"market.$symbol$.kline.$period$","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::Ticker,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"$req_type$":"market.$symbol$.ticker"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::Depth,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt"), ("type", "step0")],
                r#"{"$req_type$":"market.$symbol$.depth.$type$","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::ByPriceIncremental,
                WS_FEED_ENDPOINT,
                &[("symbol", "btcusdt"), ("levels", "5")],
                r#"{"$req_type$":"market.$symbol$.mbp.$levels$","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::ByPriceRefresh,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt"), ("levels", "5")],
                r#"{"$req_type$":"market.$symbol$.mbp.refresh.$levels$","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::BestBidOffer,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"$req_type$":"market.$symbol$.bbo","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::TradeDetail,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"$req_type$":"market.$symbol$.trade.detail","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::Details,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"$req_type$":"market.$symbol$.detail","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::Etp,
                WS_MARKET_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"$req_type$":"market.$symbol$.etp","id":"$id$"}"#,
                true,
                false,
            ),
            descriptor(
                Topic::OrderUpdates,
                WS_V2_ENDPOINT,
                &[("symbol", "btcusdt")],
                r#"{"action":"$req_type$","ch":"orders#$symbol$"}"#,
                false,
                true,
            ),
            descriptor(
                Topic::TradeClearing,
                WS_V2_ENDPOINT,
                &[("symbol", "btcusdt"), ("mode", "0")],
                r#"{"action":"$req_type$","ch":"trade.clearing#$symbol$#$mode$"}"#,
                false,
                true,
            ),
            descriptor(
                Topic::AccountsUpdate,
                WS_V2_ENDPOINT,
                &[("mode", "0")],
                r#"{"action":"$req_type$","ch":"accounts.update#$mode$"}"#,
                false,
                true,
            ),
        ];

        Self::new(descriptors).expect("production topic table is valid")
    }
}

fn descriptor(
    topic: Topic,
    endpoint: &str,
    defaults: &[(&str, &str)],
    template: &str,
    compressed: bool,
    auth_required: bool,
) -> TopicDescriptor {
    TopicDescriptor {
        topic,
        endpoint: endpoint.to_owned(),
        default_params: defaults
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect(),
        template: template.to_owned(),
        compressed,
        auth_required,
    }
}
