use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{
    BarInterval, BarSpan, BrokerClient, NewsItem, OrderReceipt, OrderSide, PriceSeries, Result,
    Session,
};

/// Simulated order placement for dry runs.
///
/// Wraps a live broker: authentication, watchlists, historicals, quotes and
/// news all pass straight through, so the strategies see real market data.
/// `place_order` never reaches the brokerage — the order is recorded in an
/// in-memory ledger instead.
pub struct PaperBroker {
    inner: Arc<dyn BrokerClient>,
    orders: Arc<RwLock<Vec<OrderReceipt>>>,
}

impl PaperBroker {
    pub fn new(inner: Arc<dyn BrokerClient>) -> Self {
        info!("PaperBroker active — orders will be simulated");
        Self {
            inner,
            orders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The simulated order ledger, for end-of-run reporting.
    pub fn orders_handle(&self) -> Arc<RwLock<Vec<OrderReceipt>>> {
        self.orders.clone()
    }
}

#[async_trait]
impl BrokerClient for PaperBroker {
    async fn authenticate(&self) -> Result<Session> {
        self.inner.authenticate().await
    }

    async fn deauthenticate(&self, session: &Session) -> Result<()> {
        self.inner.deauthenticate(session).await
    }

    async fn watchlist_symbols(&self, session: &Session, name: &str) -> Result<Vec<String>> {
        self.inner.watchlist_symbols(session, name).await
    }

    async fn add_to_watchlist(
        &self,
        session: &Session,
        name: &str,
        symbols: &[String],
    ) -> Result<()> {
        self.inner.add_to_watchlist(session, name, symbols).await
    }

    async fn remove_from_watchlist(
        &self,
        session: &Session,
        name: &str,
        symbols: &[String],
    ) -> Result<()> {
        self.inner.remove_from_watchlist(session, name, symbols).await
    }

    async fn fetch_historical(
        &self,
        session: &Session,
        symbol: &str,
        interval: BarInterval,
        span: BarSpan,
    ) -> Result<PriceSeries> {
        self.inner
            .fetch_historical(session, symbol, interval, span)
            .await
    }

    async fn latest_quote(&self, session: &Session, symbol: &str) -> Result<f64> {
        self.inner.latest_quote(session, symbol).await
    }

    async fn place_order(
        &self,
        session: &Session,
        symbol: &str,
        side: OrderSide,
        amount_usd: f64,
    ) -> Result<OrderReceipt> {
        // Validate the symbol the same way a live order would.
        let reference_price = self.inner.latest_quote(session, symbol).await?;

        debug!(
            symbol,
            side = %side,
            amount = amount_usd,
            reference_price,
            "Paper fill simulated"
        );

        let receipt = OrderReceipt {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            amount_usd,
            state: "simulated".to_string(),
            placed_at: Utc::now(),
        };
        self.orders.write().await.push(receipt.clone());
        Ok(receipt)
    }

    async fn fetch_news(&self, session: &Session, symbol: &str) -> Result<Vec<NewsItem>> {
        self.inner.fetch_news(session, symbol).await
    }
}
