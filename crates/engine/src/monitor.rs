use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use common::{
    BarInterval, BarSpan, BrokerClient, Error, MonitorState, Result, Session, TradeOutcome,
    TradeSignal,
};
use strategy::{DataRequirement, Strategy, SymbolSnapshot};

use crate::gate::TradeGate;

/// Fixed pause between symbols, for upstream rate limits.
const SYMBOL_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub refresh_interval: Duration,
    pub symbol_pause: Duration,
    pub bar_interval: BarInterval,
    pub bar_span: BarSpan,
}

impl MonitorConfig {
    pub fn new(refresh_interval: Duration, bar_interval: BarInterval, bar_span: BarSpan) -> Self {
        Self {
            refresh_interval,
            symbol_pause: SYMBOL_PAUSE,
            bar_interval,
            bar_span,
        }
    }
}

/// The polling loop: walks the watchlist snapshot on a fixed cadence,
/// fetches fresh data per symbol, evaluates the strategy and routes the
/// signal to the trade gate.
///
/// `Idle → Monitoring → Stopped`. Construction is the tail end of
/// pre-flight; `run` enters `Monitoring` and leaves it only through the
/// shutdown flag. Session teardown belongs to the caller, not the monitor.
pub struct Monitor {
    broker: Arc<dyn BrokerClient>,
    strategy: Box<dyn Strategy>,
    gate: TradeGate,
    watchlist: Vec<String>,
    cfg: MonitorConfig,
    state: MonitorState,
}

impl Monitor {
    /// Rejects an empty watchlist snapshot; the loop would have nothing to do.
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        strategy: Box<dyn Strategy>,
        gate: TradeGate,
        watchlist: Vec<String>,
        cfg: MonitorConfig,
    ) -> Result<Self> {
        if watchlist.is_empty() {
            return Err(Error::Config("watchlist snapshot is empty".to_string()));
        }
        Ok(Self {
            broker,
            strategy,
            gate,
            watchlist,
            cfg,
            state: MonitorState::Idle,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Poll until the shutdown flag flips. Cancellation is observed only
    /// between logical steps, never mid-fetch or mid-order.
    pub async fn run(&mut self, session: &Session, mut shutdown: watch::Receiver<bool>) {
        self.state = MonitorState::Monitoring;
        info!(
            state = %self.state,
            strategy = self.strategy.name(),
            symbols = self.watchlist.len(),
            "Monitoring started"
        );

        'monitoring: loop {
            for i in 0..self.watchlist.len() {
                if *shutdown.borrow() {
                    break 'monitoring;
                }
                let symbol = self.watchlist[i].clone();
                self.poll_symbol(session, &symbol).await;

                if !sleep_or_shutdown(self.cfg.symbol_pause, &mut shutdown).await {
                    break 'monitoring;
                }
            }

            debug!(
                secs = self.cfg.refresh_interval.as_secs(),
                "Cycle complete, waiting before next check"
            );
            if !sleep_or_shutdown(self.cfg.refresh_interval, &mut shutdown).await {
                break;
            }
        }

        self.state = MonitorState::Stopped;
        info!(state = %self.state, "Monitoring stopped");
    }

    /// One symbol's fetch → evaluate → gate step.
    /// `None` means the symbol was skipped for lack of data; the strategy is
    /// not consulted and no order can result.
    pub async fn poll_symbol(&self, session: &Session, symbol: &str) -> Option<TradeOutcome> {
        let snapshot = match self.fetch_snapshot(session, symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(symbol, error = %e, "No data, skipping symbol");
                return None;
            }
        };

        let signal = self.strategy.evaluate(&snapshot);
        if signal == TradeSignal::Hold {
            debug!(symbol, "No action");
        }
        Some(self.gate.evaluate(session, symbol, signal).await)
    }

    async fn fetch_snapshot(&self, session: &Session, symbol: &str) -> Result<SymbolSnapshot> {
        match self.strategy.requirement() {
            DataRequirement::PriceHistory => {
                let bars = self
                    .broker
                    .fetch_historical(session, symbol, self.cfg.bar_interval, self.cfg.bar_span)
                    .await?;
                if bars.is_empty() {
                    return Err(Error::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: "empty price series".to_string(),
                    });
                }
                Ok(SymbolSnapshot::from_bars(symbol, bars))
            }
            DataRequirement::NewsFeed => {
                let news = self.broker.fetch_news(session, symbol).await?;
                if news.is_empty() {
                    return Err(Error::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: "empty news feed".to_string(),
                    });
                }
                Ok(SymbolSnapshot::from_news(symbol, news))
            }
        }
    }
}

/// Sleep, or return false immediately when shutdown is requested.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = shutdown.changed() => false,
    }
}
