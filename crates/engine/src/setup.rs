use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use common::{BrokerClient, Error, Result, Session};

/// Apply configured watchlist additions and removals before monitoring.
/// Per-symbol failures are logged and skipped; a bad edit never aborts the
/// run. Additions are validated with a quote lookup first, the way an
/// unknown symbol is cheapest to detect.
pub async fn apply_watchlist_edits(
    broker: &Arc<dyn BrokerClient>,
    session: &Session,
    name: &str,
    add: &[String],
    remove: &[String],
) {
    for symbol in remove {
        match broker
            .remove_from_watchlist(session, name, std::slice::from_ref(symbol))
            .await
        {
            Ok(()) => info!(symbol, watchlist = name, "Removed from watchlist"),
            Err(e) => warn!(symbol, error = %e, "Failed to remove from watchlist"),
        }
    }

    for symbol in add {
        if let Err(e) = broker.latest_quote(session, symbol).await {
            warn!(symbol, error = %e, "Symbol not recognized upstream, not added");
            continue;
        }
        match broker
            .add_to_watchlist(session, name, std::slice::from_ref(symbol))
            .await
        {
            Ok(()) => info!(symbol, watchlist = name, "Added to watchlist"),
            Err(e) => warn!(symbol, error = %e, "Failed to add to watchlist"),
        }
    }
}

/// Fetch the watchlist and freeze it into the monitoring snapshot:
/// uppercase, deduplicated, resolution order preserved. An empty result is
/// a configuration error — monitoring never starts with nothing to watch.
pub async fn resolve_watchlist(
    broker: &Arc<dyn BrokerClient>,
    session: &Session,
    name: &str,
) -> Result<Vec<String>> {
    let raw = broker.watchlist_symbols(session, name).await?;

    let mut seen = HashSet::new();
    let symbols: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    if symbols.is_empty() {
        return Err(Error::Config(format!("watchlist '{name}' has no symbols")));
    }
    info!(watchlist = name, symbols = ?symbols, "Watchlist resolved");
    Ok(symbols)
}
