use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{BrokerClient, Config, Result, Session, TradingMode};
use engine::{
    setup, AutoConfirm, ConfirmPolicy, Monitor, MonitorConfig, PromptConfirm, RobinhoodClient,
    TradeGate,
};
use paper::PaperBroker;
use strategy::{build_strategy, Strategy, StrategyFileConfig};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "RoostBot exiting on error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    // Everything here is a ConfigurationError path: fail before any session
    // exists, so there is nothing to tear down.
    let cfg = Config::from_env()?;
    info!(mode = %cfg.trading_mode, watchlist = %cfg.watchlist_name, "RoostBot starting");

    let strategy_file = StrategyFileConfig::load(&cfg.strategy_config_path)?;
    let strategy = build_strategy(&strategy_file.strategy)?;

    // ── Broker (injected based on TRADING_MODE) ───────────────────────────────
    let live = Arc::new(RobinhoodClient::new(&cfg.username, &cfg.password));
    let mut paper_orders = None;
    let broker: Arc<dyn BrokerClient> = match cfg.trading_mode {
        TradingMode::Live => {
            info!("Live trading mode — orders reach the brokerage");
            live
        }
        TradingMode::Paper => {
            let paper = PaperBroker::new(live);
            paper_orders = Some(paper.orders_handle());
            Arc::new(paper)
        }
    };

    // ── Session ───────────────────────────────────────────────────────────────
    let session = broker.authenticate().await?;
    info!(issued_at = %session.issued_at, "Logged in");

    // Every path past this point funnels into the single logout below.
    let outcome = monitor_session(&cfg, strategy, broker.clone(), &session).await;

    match broker.deauthenticate(&session).await {
        Ok(()) => info!("Logged out"),
        Err(e) => warn!(error = %e, "Logout failed"),
    }

    if let Some(orders) = paper_orders {
        info!(
            simulated_orders = orders.read().await.len(),
            "Paper session complete"
        );
    }
    outcome
}

async fn monitor_session(
    cfg: &Config,
    strategy: Box<dyn Strategy>,
    broker: Arc<dyn BrokerClient>,
    session: &Session,
) -> Result<()> {
    // ── Pre-flight ────────────────────────────────────────────────────────────
    setup::apply_watchlist_edits(
        &broker,
        session,
        &cfg.watchlist_name,
        &cfg.watchlist_add,
        &cfg.watchlist_remove,
    )
    .await;
    let watchlist = setup::resolve_watchlist(&broker, session, &cfg.watchlist_name).await?;

    let policy: Box<dyn ConfirmPolicy> = if cfg.auto_confirm {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    };
    let gate = TradeGate::new(broker.clone(), policy, cfg.trade_amount_usd);
    let monitor_cfg = MonitorConfig::new(cfg.refresh_interval, cfg.bar_interval, cfg.bar_span);
    let mut monitor = Monitor::new(broker, strategy, gate, watchlist, monitor_cfg)?;

    // ── Cancellation ──────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for the shutdown signal");
                // Keep the sender alive so a closed channel never reads
                // as a shutdown request.
                std::future::pending::<()>().await;
            }
        }
    });

    info!("Monitoring stocks. Press Ctrl+C to exit.");
    monitor.run(session, shutdown_rx).await;
    Ok(())
}
