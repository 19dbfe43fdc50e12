use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use common::{BrokerClient, OrderSide, Session, TradeOutcome, TradeSignal};

/// Decides whether a non-hold signal may reach the brokerage.
///
/// Injected into the trade gate so decision logic stays free of I/O:
/// automated runs use `AutoConfirm`, interactive runs use `PromptConfirm`.
pub trait ConfirmPolicy: Send + Sync {
    fn confirm(&self, symbol: &str, side: OrderSide, amount_usd: f64) -> bool;
}

/// Confirms every trade without asking.
pub struct AutoConfirm;

impl ConfirmPolicy for AutoConfirm {
    fn confirm(&self, _symbol: &str, _side: OrderSide, _amount_usd: f64) -> bool {
        true
    }
}

/// Asks y/n on stdin before every trade.
pub struct PromptConfirm;

impl ConfirmPolicy for PromptConfirm {
    fn confirm(&self, symbol: &str, side: OrderSide, amount_usd: f64) -> bool {
        print!("Do you want to {side} {symbol} for ${amount_usd:.2}? (y/n): ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case("y")
    }
}

/// Routes trade signals to the brokerage.
///
/// This is the ONLY component that calls `BrokerClient::place_order`. Per
/// signal it makes at most one order request, and only after the
/// confirmation policy approves. Rejected orders are never retried.
pub struct TradeGate {
    broker: Arc<dyn BrokerClient>,
    policy: Box<dyn ConfirmPolicy>,
    amount_usd: f64,
}

impl TradeGate {
    pub fn new(broker: Arc<dyn BrokerClient>, policy: Box<dyn ConfirmPolicy>, amount_usd: f64) -> Self {
        Self {
            broker,
            policy,
            amount_usd,
        }
    }

    /// Evaluate one signal for one symbol. A no-op on hold.
    pub async fn evaluate(
        &self,
        session: &Session,
        symbol: &str,
        signal: TradeSignal,
    ) -> TradeOutcome {
        let Some(side) = signal.side() else {
            return TradeOutcome::Held;
        };

        info!(symbol, signal = %signal, "Signal detected");
        if !self.policy.confirm(symbol, side, self.amount_usd) {
            info!(symbol, "Trade canceled");
            return TradeOutcome::Declined;
        }

        match self
            .broker
            .place_order(session, symbol, side, self.amount_usd)
            .await
        {
            Ok(receipt) => {
                info!(
                    symbol,
                    side = %side,
                    amount = self.amount_usd,
                    order_id = %receipt.id,
                    "Trade executed"
                );
                TradeOutcome::Placed(receipt)
            }
            Err(e) => {
                warn!(symbol, error = %e, "Order not placed");
                TradeOutcome::Rejected(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_broker::MockBroker;
    use std::sync::atomic::Ordering;

    struct DenyAll;

    impl ConfirmPolicy for DenyAll {
        fn confirm(&self, _symbol: &str, _side: OrderSide, _amount_usd: f64) -> bool {
            false
        }
    }

    fn gate(broker: &Arc<MockBroker>, policy: Box<dyn ConfirmPolicy>) -> TradeGate {
        TradeGate::new(broker.clone() as Arc<dyn BrokerClient>, policy, 25.0)
    }

    #[tokio::test]
    async fn hold_makes_no_broker_call() {
        let broker = Arc::new(MockBroker::default());
        let gate = gate(&broker, Box::new(AutoConfirm));
        let session = MockBroker::session();

        let outcome = gate.evaluate(&session, "AAPL", TradeSignal::Hold).await;
        assert!(matches!(outcome, TradeOutcome::Held));
        assert_eq!(broker.order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declined_confirmation_places_nothing() {
        let broker = Arc::new(MockBroker::default());
        let gate = gate(&broker, Box::new(DenyAll));
        let session = MockBroker::session();

        let outcome = gate.evaluate(&session, "AAPL", TradeSignal::Buy).await;
        assert!(matches!(outcome, TradeOutcome::Declined));
        assert_eq!(broker.order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirmed_signal_places_exactly_one_order() {
        let broker = Arc::new(MockBroker::default());
        let gate = gate(&broker, Box::new(AutoConfirm));
        let session = MockBroker::session();

        let outcome = gate.evaluate(&session, "AAPL", TradeSignal::Sell).await;
        match outcome {
            TradeOutcome::Placed(receipt) => {
                assert_eq!(receipt.symbol, "AAPL");
                assert_eq!(receipt.side, OrderSide::Sell);
            }
            other => panic!("expected Placed, got {other:?}"),
        }
        assert_eq!(broker.order_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upstream_rejection_is_reported_not_retried() {
        let broker = Arc::new(MockBroker {
            reject_orders: true,
            ..MockBroker::default()
        });
        let gate = gate(&broker, Box::new(AutoConfirm));
        let session = MockBroker::session();

        let outcome = gate.evaluate(&session, "AAPL", TradeSignal::Buy).await;
        assert!(matches!(outcome, TradeOutcome::Rejected(_)));
        assert_eq!(broker.order_calls.load(Ordering::SeqCst), 1);
    }
}
