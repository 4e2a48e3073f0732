//! Configuration models for the scheduler and its trigger sources.

pub mod scheduler;

pub use scheduler::{IdleTickerConfig, SchedulerConfig, ENV_PREFIX, MAX_BATCH_BUDGET_MS};
