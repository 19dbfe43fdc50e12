use async_trait::async_trait;

use crate::{BarInterval, BarSpan, NewsItem, OrderReceipt, OrderSide, PriceSeries, Result, Session};

/// Abstraction over the brokerage connection.
///
/// `RobinhoodClient` implements this for live trading.
/// `PaperBroker` wraps a live client and intercepts order placement.
///
/// Every call after `authenticate` takes the session explicitly; the run
/// entry point owns it and is responsible for the single teardown call.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Log in and return the session used for all subsequent calls.
    async fn authenticate(&self) -> Result<Session>;

    /// Log out. Best-effort; callers log failure and move on.
    async fn deauthenticate(&self, session: &Session) -> Result<()>;

    /// Symbols in the named watchlist, in upstream resolution order.
    async fn watchlist_symbols(&self, session: &Session, name: &str) -> Result<Vec<String>>;

    /// Add symbols to the named watchlist.
    async fn add_to_watchlist(&self, session: &Session, name: &str, symbols: &[String])
        -> Result<()>;

    /// Remove symbols from the named watchlist.
    async fn remove_from_watchlist(
        &self,
        session: &Session,
        name: &str,
        symbols: &[String],
    ) -> Result<()>;

    /// Historical OHLC bars for one symbol, oldest first.
    /// Fails with `DataUnavailable` when the upstream has no data or the
    /// symbol is unknown.
    async fn fetch_historical(
        &self,
        session: &Session,
        symbol: &str,
        interval: BarInterval,
        span: BarSpan,
    ) -> Result<PriceSeries>;

    /// Last trade price for one symbol. Also used to validate symbols.
    async fn latest_quote(&self, session: &Session, symbol: &str) -> Result<f64>;

    /// Place a fractional order sized in dollars.
    /// Fails with `OrderRejected` on upstream rejection.
    async fn place_order(
        &self,
        session: &Session,
        symbol: &str,
        side: OrderSide,
        amount_usd: f64,
    ) -> Result<OrderReceipt>;

    /// Recent news items for one symbol, with sentiment scores where the
    /// feed provides them.
    async fn fetch_news(&self, session: &Session, symbol: &str) -> Result<Vec<NewsItem>>;
}
