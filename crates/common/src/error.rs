use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration. Fatal — observed only before monitoring starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication or deauthentication failure.
    #[error("Session error: {0}")]
    Session(String),

    /// The upstream has no usable data for one symbol. Recovered locally:
    /// the symbol is logged and skipped for the current cycle.
    #[error("No data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The brokerage rejected an order. Logged and reported, never retried.
    #[error("Order rejected for {symbol}: {reason}")]
    OrderRejected { symbol: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
