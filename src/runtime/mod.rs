//! Runtime adapters that raise trigger signals for a scheduler.

#[cfg(feature = "tokio-runtime")]
pub mod idle_ticker;

#[cfg(feature = "tokio-runtime")]
pub use idle_ticker::{IdleTicker, IdleTickerHost, TickerSummary};
