pub mod gate;
pub mod monitor;
pub mod robinhood;
pub mod setup;

pub use gate::{AutoConfirm, ConfirmPolicy, PromptConfirm, TradeGate};
pub use monitor::{Monitor, MonitorConfig};
pub use robinhood::RobinhoodClient;

#[cfg(test)]
pub(crate) mod test_broker;
