use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use common::{
    BarInterval, BarSpan, BrokerClient, Error, NewsItem, OrderReceipt, OrderSide, PriceSeries,
    Result, Session,
};

/// Configurable in-memory broker shared by the engine unit tests.
#[derive(Default)]
pub(crate) struct MockBroker {
    /// Watchlist contents returned verbatim, in this order.
    pub symbols: Vec<String>,
    /// Per-symbol bar history; a missing or empty entry means no data.
    pub bars: HashMap<String, PriceSeries>,
    pub news: HashMap<String, Vec<NewsItem>>,
    /// Symbols whose quote lookup fails (unknown upstream).
    pub invalid_symbols: HashSet<String>,
    pub reject_orders: bool,
    pub historical_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub added: std::sync::Mutex<Vec<String>>,
    pub removed: std::sync::Mutex<Vec<String>>,
}

impl MockBroker {
    pub fn session() -> Session {
        Session {
            access_token: "test-token".to_string(),
            account_url: "https://broker.test/accounts/1/".to_string(),
            issued_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    async fn authenticate(&self) -> Result<Session> {
        Ok(Self::session())
    }

    async fn deauthenticate(&self, _session: &Session) -> Result<()> {
        Ok(())
    }

    async fn watchlist_symbols(&self, _session: &Session, _name: &str) -> Result<Vec<String>> {
        Ok(self.symbols.clone())
    }

    async fn add_to_watchlist(
        &self,
        _session: &Session,
        _name: &str,
        symbols: &[String],
    ) -> Result<()> {
        self.added.lock().unwrap().extend_from_slice(symbols);
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        _session: &Session,
        _name: &str,
        symbols: &[String],
    ) -> Result<()> {
        self.removed.lock().unwrap().extend_from_slice(symbols);
        Ok(())
    }

    async fn fetch_historical(
        &self,
        _session: &Session,
        symbol: &str,
        _interval: BarInterval,
        _span: BarSpan,
    ) -> Result<PriceSeries> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);
        match self.bars.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no historical data returned".to_string(),
            }),
        }
    }

    async fn latest_quote(&self, _session: &Session, symbol: &str) -> Result<f64> {
        if self.invalid_symbols.contains(symbol) {
            return Err(Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".to_string(),
            });
        }
        Ok(100.0)
    }

    async fn place_order(
        &self,
        _session: &Session,
        symbol: &str,
        side: OrderSide,
        amount_usd: f64,
    ) -> Result<OrderReceipt> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_orders {
            return Err(Error::OrderRejected {
                symbol: symbol.to_string(),
                reason: "account restricted".to_string(),
            });
        }
        Ok(OrderReceipt {
            id: format!("order-{}", self.order_calls.load(Ordering::SeqCst)),
            symbol: symbol.to_string(),
            side,
            amount_usd,
            state: "confirmed".to_string(),
            placed_at: Utc::now(),
        })
    }

    async fn fetch_news(&self, _session: &Session, symbol: &str) -> Result<Vec<NewsItem>> {
        match self.news.get(symbol) {
            Some(items) if !items.is_empty() => Ok(items.clone()),
            _ => Err(Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no news returned".to_string(),
            }),
        }
    }
}
