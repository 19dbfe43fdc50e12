use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One time-stamped OHLC observation from the brokerage historicals endpoint.
///
/// Upstream guarantees `high >= max(open, close)` and `low <= min(open, close)`;
/// this core does not re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub begins_at: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Ordered bar history for one symbol, ascending by timestamp, one entry per
/// bar interval. Built fresh on each poll cycle and discarded after a single
/// strategy evaluation.
pub type PriceSeries = Vec<PriceBar>;

/// Discrete outcome of one strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl TradeSignal {
    /// The order side this signal maps to, or `None` for hold.
    pub fn side(self) -> Option<OrderSide> {
        match self {
            TradeSignal::Buy => Some(OrderSide::Buy),
            TradeSignal::Sell => Some(OrderSide::Sell),
            TradeSignal::Hold => None,
        }
    }
}

impl std::fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "buy"),
            TradeSignal::Sell => write!(f, "sell"),
            TradeSignal::Hold => write!(f, "hold"),
        }
    }
}

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Confirmation of an accepted fractional order returned by the brokerage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Brokerage-assigned order id.
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    /// Dollar notional of the fractional order.
    pub amount_usd: f64,
    /// Upstream order state, e.g. "confirmed" or "simulated".
    pub state: String,
    pub placed_at: DateTime<Utc>,
}

/// Result of routing one trade signal through the trade gate.
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    /// Hold signal — no broker call was made.
    Held,
    /// Order confirmed and accepted upstream.
    Placed(OrderReceipt),
    /// Confirmation policy declined the trade.
    Declined,
    /// Upstream rejected the order (or the request failed). Never retried.
    Rejected(String),
}

/// One item from the brokerage news feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    /// Sentiment score in roughly [-1, 1] when the feed provides one.
    pub sentiment: Option<f64>,
    pub published_at: DateTime<Utc>,
}

/// Authenticated brokerage session. Owned by the run entry point and passed
/// by reference into every broker call; torn down exactly once on exit.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    /// URL of the trading account orders are placed against.
    pub account_url: String,
    pub issued_at: DateTime<Utc>,
}

/// Whether orders reach the real brokerage or a simulated ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Live,
    Paper,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "live"),
            TradingMode::Paper => write!(f, "paper"),
        }
    }
}

impl std::str::FromStr for TradingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "live" => Ok(TradingMode::Live),
            "paper" => Ok(TradingMode::Paper),
            other => Err(Error::Config(format!(
                "TRADING_MODE must be 'live' or 'paper', got '{other}'"
            ))),
        }
    }
}

/// Lifecycle state of the polling monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    Monitoring,
    Stopped,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Monitoring => write!(f, "monitoring"),
            MonitorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Candle width of the historicals request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarInterval {
    #[default]
    FiveMinute,
    TenMinute,
    Hour,
    Day,
    Week,
}

impl BarInterval {
    /// Token the brokerage API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            BarInterval::FiveMinute => "5minute",
            BarInterval::TenMinute => "10minute",
            BarInterval::Hour => "hour",
            BarInterval::Day => "day",
            BarInterval::Week => "week",
        }
    }
}

impl std::str::FromStr for BarInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "5minute" => Ok(BarInterval::FiveMinute),
            "10minute" => Ok(BarInterval::TenMinute),
            "hour" => Ok(BarInterval::Hour),
            "day" => Ok(BarInterval::Day),
            "week" => Ok(BarInterval::Week),
            other => Err(Error::Config(format!("unknown bar interval '{other}'"))),
        }
    }
}

/// How far back the historicals request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarSpan {
    Day,
    Week,
    #[default]
    Month,
    ThreeMonth,
    Year,
}

impl BarSpan {
    pub fn as_str(self) -> &'static str {
        match self {
            BarSpan::Day => "day",
            BarSpan::Week => "week",
            BarSpan::Month => "month",
            BarSpan::ThreeMonth => "3month",
            BarSpan::Year => "year",
        }
    }
}

impl std::str::FromStr for BarSpan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(BarSpan::Day),
            "week" => Ok(BarSpan::Week),
            "month" => Ok(BarSpan::Month),
            "3month" => Ok(BarSpan::ThreeMonth),
            "year" => Ok(BarSpan::Year),
            other => Err(Error::Config(format!("unknown bar span '{other}'"))),
        }
    }
}
