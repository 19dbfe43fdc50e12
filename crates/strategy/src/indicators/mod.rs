pub mod heikin_ashi;
pub mod sma;

pub use heikin_ashi::{heikin_ashi, HaBar};
pub use sma::{SmaCross, SmaPoint};
