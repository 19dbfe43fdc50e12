use std::time::Duration;

use crate::{BarInterval, BarSpan, Error, Result, TradingMode};

/// All configuration loaded from environment variables at startup.
/// Every invalid or missing value is an `Error::Config` naming the variable,
/// surfaced before any brokerage session exists.
#[derive(Debug, Clone)]
pub struct Config {
    // Brokerage credentials
    pub username: String,
    pub password: String,

    // Monitoring session
    pub watchlist_name: String,
    pub trade_amount_usd: f64,
    pub refresh_interval: Duration,
    pub bar_interval: BarInterval,
    pub bar_span: BarSpan,

    // Trading
    pub trading_mode: TradingMode,
    /// When true the trade gate places orders without prompting.
    pub auto_confirm: bool,

    // Strategy config file path
    pub strategy_config_path: String,

    // Watchlist edits applied during pre-flight, before monitoring
    pub watchlist_add: Vec<String>,
    pub watchlist_remove: Vec<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let trade_amount_usd = required_env("TRADE_AMOUNT_USD")?
            .parse::<f64>()
            .map_err(|_| Error::Config("TRADE_AMOUNT_USD must be a number".into()))?;
        if !(trade_amount_usd > 0.0) {
            return Err(Error::Config(format!(
                "TRADE_AMOUNT_USD must be positive, got {trade_amount_usd}"
            )));
        }

        let refresh_secs = required_env("REFRESH_INTERVAL_SECS")?
            .parse::<u64>()
            .map_err(|_| Error::Config("REFRESH_INTERVAL_SECS must be a whole number".into()))?;
        if refresh_secs == 0 {
            return Err(Error::Config("REFRESH_INTERVAL_SECS must be positive".into()));
        }

        let bar_interval = match optional_env("BAR_INTERVAL") {
            Some(v) => v.parse()?,
            None => BarInterval::default(),
        };
        let bar_span = match optional_env("BAR_SPAN") {
            Some(v) => v.parse()?,
            None => BarSpan::default(),
        };

        Ok(Config {
            username: required_env("ROBINHOOD_USERNAME")?,
            password: required_env("ROBINHOOD_PASSWORD")?,
            watchlist_name: required_env("WATCHLIST_NAME")?,
            trade_amount_usd,
            refresh_interval: Duration::from_secs(refresh_secs),
            bar_interval,
            bar_span,
            trading_mode: required_env("TRADING_MODE")?.parse()?,
            auto_confirm: optional_env("AUTO_CONFIRM")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategy.toml".to_string()),
            watchlist_add: symbol_list(optional_env("WATCHLIST_ADD")),
            watchlist_remove: symbol_list(optional_env("WATCHLIST_REMOVE")),
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        Error::Config(format!(
            "required environment variable '{key}' is not set. Check your .env file."
        ))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma list into trimmed, uppercased symbols.
fn symbol_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::symbol_list;

    #[test]
    fn symbol_list_trims_uppercases_and_drops_empties() {
        let parsed = symbol_list(Some(" aapl, msft ,,tsla".to_string()));
        assert_eq!(parsed, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn symbol_list_empty_when_unset() {
        assert!(symbol_list(None).is_empty());
    }
}
