use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use async_trait::async_trait;
use common::{
    BarInterval, BarSpan, BrokerClient, Error, NewsItem, OrderReceipt, OrderSide, PriceBar,
    PriceSeries, Result, Session,
};

const BASE_URL: &str = "https://api.robinhood.com";
const OAUTH_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// REST API client for Robinhood. Handles login, watchlists, historical
/// bars, quotes, news and fractional order placement.
pub struct RobinhoodClient {
    username: String,
    password: String,
    /// Stable per-process device token sent with the login request.
    device_token: String,
    http: Client,
}

impl RobinhoodClient {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            device_token: uuid::Uuid::new_v4().to_string(),
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn get(&self, session: &Session, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn post(&self, session: &Session, url: &str, payload: &serde_json::Value) -> Result<String> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&session.access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    /// The list id behind a watchlist display name.
    async fn watchlist_id(&self, session: &Session, name: &str) -> Result<String> {
        let body = self
            .get(session, &format!("{BASE_URL}/midlands/lists/default/"))
            .await?;
        let lists: Paginated<WatchlistEntry> = serde_json::from_str(&body)?;

        lists
            .results
            .into_iter()
            .find(|l| l.display_name == name)
            .map(|l| l.id)
            .ok_or_else(|| {
                Error::Config(format!(
                    "watchlist '{name}' does not exist. Create it in the app."
                ))
            })
    }
}

#[async_trait]
impl BrokerClient for RobinhoodClient {
    async fn authenticate(&self) -> Result<Session> {
        let payload = json!({
            "username": self.username,
            "password": self.password,
            "grant_type": "password",
            "client_id": OAUTH_CLIENT_ID,
            "device_token": self.device_token,
            "scope": "internal",
            "expires_in": 86_400,
        });

        let resp = self
            .http
            .post(format!("{BASE_URL}/oauth2/token/"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Session(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Session(format!("login failed: HTTP {status}: {body}")));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Session(e.to_string()))?;

        // The trading account URL is required for order placement.
        let mut session = Session {
            access_token: token.access_token,
            account_url: String::new(),
            issued_at: Utc::now(),
        };
        let body = self.get(&session, &format!("{BASE_URL}/accounts/")).await?;
        let accounts: Paginated<AccountEntry> = serde_json::from_str(&body)?;
        session.account_url = accounts
            .results
            .into_iter()
            .next()
            .map(|a| a.url)
            .ok_or_else(|| Error::Session("no trading account on this login".into()))?;

        Ok(session)
    }

    async fn deauthenticate(&self, session: &Session) -> Result<()> {
        let payload = json!({
            "client_id": OAUTH_CLIENT_ID,
            "token": session.access_token,
        });
        self.http
            .post(format!("{BASE_URL}/oauth2/revoke_token/"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Session(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Session(e.to_string()))?;
        Ok(())
    }

    async fn watchlist_symbols(&self, session: &Session, name: &str) -> Result<Vec<String>> {
        let list_id = self.watchlist_id(session, name).await?;
        let body = self
            .get(
                session,
                &format!("{BASE_URL}/midlands/lists/items/?list_id={list_id}"),
            )
            .await?;
        let items: Paginated<WatchlistItem> = serde_json::from_str(&body)?;
        Ok(items.results.into_iter().map(|i| i.symbol).collect())
    }

    async fn add_to_watchlist(
        &self,
        session: &Session,
        name: &str,
        symbols: &[String],
    ) -> Result<()> {
        let list_id = self.watchlist_id(session, name).await?;
        for symbol in symbols {
            let payload = json!({ "list_id": list_id, "symbol": symbol });
            self.post(session, &format!("{BASE_URL}/midlands/lists/items/"), &payload)
                .await?;
        }
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        session: &Session,
        name: &str,
        symbols: &[String],
    ) -> Result<()> {
        let list_id = self.watchlist_id(session, name).await?;
        for symbol in symbols {
            let url = format!("{BASE_URL}/midlands/lists/items/{list_id}/{symbol}/");
            self.http
                .delete(&url)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .map_err(|e| Error::Http(e.to_string()))?
                .error_for_status()
                .map_err(|e| Error::Http(e.to_string()))?;
        }
        Ok(())
    }

    async fn fetch_historical(
        &self,
        session: &Session,
        symbol: &str,
        interval: BarInterval,
        span: BarSpan,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{BASE_URL}/marketdata/historicals/{symbol}/?interval={}&span={}&bounds=regular",
            interval.as_str(),
            span.as_str()
        );

        debug!(symbol, interval = interval.as_str(), span = span.as_str(), "Fetching historicals");
        let body = self.get(session, &url).await.map_err(|e| Error::DataUnavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        let resp: HistoricalsResponse = serde_json::from_str(&body)?;
        let bars: PriceSeries = resp
            .historicals
            .into_iter()
            .filter_map(|raw| match raw.parse() {
                Some(bar) => Some(bar),
                None => {
                    warn!(symbol, "Dropping unparseable historical bar");
                    None
                }
            })
            .collect();

        if bars.is_empty() {
            return Err(Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no historical data returned".to_string(),
            });
        }
        Ok(bars)
    }

    async fn latest_quote(&self, session: &Session, symbol: &str) -> Result<f64> {
        let body = self
            .get(session, &format!("{BASE_URL}/quotes/{symbol}/"))
            .await
            .map_err(|e| Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;
        let quote: QuoteResponse = serde_json::from_str(&body)?;
        quote
            .last_trade_price
            .parse::<f64>()
            .map_err(|e| Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })
    }

    async fn place_order(
        &self,
        session: &Session,
        symbol: &str,
        side: OrderSide,
        amount_usd: f64,
    ) -> Result<OrderReceipt> {
        let payload = json!({
            "account": session.account_url,
            "symbol": symbol,
            "side": side.to_string(),
            "type": "market",
            "trigger": "immediate",
            "time_in_force": "gfd",
            "extended_hours": false,
            "dollar_based_amount": format!("{amount_usd:.2}"),
            "ref_id": uuid::Uuid::new_v4().to_string(),
        });

        debug!(symbol, side = %side, amount = amount_usd, "Submitting fractional order");
        let resp = self
            .http
            .post(format!("{BASE_URL}/orders/"))
            .bearer_auth(&session.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            let reason = serde_json::from_str::<RejectionBody>(&body)
                .map(|r| r.detail)
                .unwrap_or(body);
            return Err(Error::OrderRejected {
                symbol: symbol.to_string(),
                reason: format!("HTTP {status}: {reason}"),
            });
        }

        let order: OrderResponse = serde_json::from_str(&body)?;
        Ok(OrderReceipt {
            id: order.id,
            symbol: symbol.to_string(),
            side,
            amount_usd,
            state: order.state,
            placed_at: Utc::now(),
        })
    }

    async fn fetch_news(&self, session: &Session, symbol: &str) -> Result<Vec<NewsItem>> {
        let body = self
            .get(session, &format!("{BASE_URL}/midlands/news/{symbol}/"))
            .await
            .map_err(|e| Error::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;
        let news: Paginated<NewsEntry> = serde_json::from_str(&body)?;
        Ok(news
            .results
            .into_iter()
            .map(|n| NewsItem {
                headline: n.title,
                sentiment: n.sentiment,
                published_at: n.published_at,
            })
            .collect())
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct AccountEntry {
    url: String,
}

#[derive(Deserialize)]
struct WatchlistEntry {
    id: String,
    display_name: String,
}

#[derive(Deserialize)]
struct WatchlistItem {
    symbol: String,
}

#[derive(Deserialize)]
struct HistoricalsResponse {
    #[serde(default)]
    historicals: Vec<RawBar>,
}

/// Prices arrive as JSON strings and are parsed into floats.
#[derive(Deserialize)]
struct RawBar {
    begins_at: DateTime<Utc>,
    open_price: String,
    high_price: String,
    low_price: String,
    close_price: String,
}

impl RawBar {
    fn parse(&self) -> Option<PriceBar> {
        Some(PriceBar {
            begins_at: self.begins_at,
            open: self.open_price.parse().ok()?,
            high: self.high_price.parse().ok()?,
            low: self.low_price.parse().ok()?,
            close: self.close_price.parse().ok()?,
        })
    }
}

#[derive(Deserialize)]
struct QuoteResponse {
    last_trade_price: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    state: String,
}

#[derive(Deserialize)]
struct RejectionBody {
    detail: String,
}

#[derive(Deserialize)]
struct NewsEntry {
    title: String,
    #[serde(default)]
    sentiment: Option<f64>,
    published_at: DateTime<Utc>,
}
