//! Scheduler and idle ticker configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix for environment variables read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "IDLE_BATCH_";

/// Batch scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum wall-clock milliseconds spent in one budgeted drain.
    pub batch_budget_ms: u64,
    /// Drain when the host reports idle.
    pub do_work_during_idle: bool,
    /// Drain when the host reports progress.
    pub do_work_during_progress: bool,
    /// Ask the host to re-trigger without delay after a budget-limited drain.
    pub raise_immediately_on_next_trigger: bool,
    /// Attach to the host as soon as the scheduler is built.
    pub attach_on_start: bool,
    /// Capacity of the built-in failure history; 0 disables it.
    pub failure_history: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_budget_ms: 100,
            do_work_during_idle: true,
            do_work_during_progress: true,
            raise_immediately_on_next_trigger: false,
            attach_on_start: false,
            failure_history: 64,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-drain time budget in milliseconds.
    #[must_use]
    pub const fn with_batch_budget_ms(mut self, ms: u64) -> Self {
        self.batch_budget_ms = ms;
        self
    }

    /// Enable or disable draining on idle signals.
    #[must_use]
    pub const fn with_idle_work(mut self, enabled: bool) -> Self {
        self.do_work_during_idle = enabled;
        self
    }

    /// Enable or disable draining on progress signals.
    #[must_use]
    pub const fn with_progress_work(mut self, enabled: bool) -> Self {
        self.do_work_during_progress = enabled;
        self
    }

    /// Enable or disable the immediate redrive hint.
    #[must_use]
    pub const fn with_raise_immediately(mut self, enabled: bool) -> Self {
        self.raise_immediately_on_next_trigger = enabled;
        self
    }

    /// Attach on build.
    #[must_use]
    pub const fn with_attach_on_start(mut self, enabled: bool) -> Self {
        self.attach_on_start = enabled;
        self
    }

    /// Set the built-in failure history capacity.
    #[must_use]
    pub const fn with_failure_history(mut self, capacity: usize) -> Self {
        self.failure_history = capacity;
        self
    }

    /// Budget as a [`Duration`].
    #[must_use]
    pub const fn batch_budget(&self) -> Duration {
        Duration::from_millis(self.batch_budget_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_budget_ms > MAX_BATCH_BUDGET_MS {
            return Err(format!(
                "batch_budget_ms must be at most {MAX_BATCH_BUDGET_MS}, got {}",
                self.batch_budget_ms
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `IDLE_BATCH_*` environment variables, loading
    /// a `.env` file first if one is present. Unset variables keep defaults.
    ///
    /// Recognized: `IDLE_BATCH_BATCH_BUDGET_MS`, `IDLE_BATCH_DO_WORK_DURING_IDLE`,
    /// `IDLE_BATCH_DO_WORK_DURING_PROGRESS`,
    /// `IDLE_BATCH_RAISE_IMMEDIATELY_ON_NEXT_TRIGGER`,
    /// `IDLE_BATCH_ATTACH_ON_START`, `IDLE_BATCH_FAILURE_HISTORY`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparseable or invalid value.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary `IDLE_BATCH_*` key lookup.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparseable or invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut cfg = Self::default();

        if let Some(v) = get("BATCH_BUDGET_MS") {
            cfg.batch_budget_ms = parse_value("BATCH_BUDGET_MS", &v)?;
        }
        if let Some(v) = get("DO_WORK_DURING_IDLE") {
            cfg.do_work_during_idle = parse_flag("DO_WORK_DURING_IDLE", &v)?;
        }
        if let Some(v) = get("DO_WORK_DURING_PROGRESS") {
            cfg.do_work_during_progress = parse_flag("DO_WORK_DURING_PROGRESS", &v)?;
        }
        if let Some(v) = get("RAISE_IMMEDIATELY_ON_NEXT_TRIGGER") {
            cfg.raise_immediately_on_next_trigger =
                parse_flag("RAISE_IMMEDIATELY_ON_NEXT_TRIGGER", &v)?;
        }
        if let Some(v) = get("ATTACH_ON_START") {
            cfg.attach_on_start = parse_flag("ATTACH_ON_START", &v)?;
        }
        if let Some(v) = get("FAILURE_HISTORY") {
            cfg.failure_history = parse_value("FAILURE_HISTORY", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Upper bound on the batch budget (one hour).
pub const MAX_BATCH_BUDGET_MS: u64 = 60 * 60 * 1000;

fn parse_value<T>(name: &str, raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}: {e}"))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("{ENV_PREFIX}{name}: expected a boolean, got `{other}`")),
    }
}

/// Configuration for the tokio idle ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleTickerConfig {
    /// Delay between idle signals, skipped after a redrive request.
    pub idle_interval_ms: u64,
    /// Raise a progress signal every N ticks; 0 never raises one.
    pub progress_every: u32,
}

impl Default for IdleTickerConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: 50,
            progress_every: 0,
        }
    }
}

impl IdleTickerConfig {
    /// Interval as a [`Duration`].
    #[must_use]
    pub const fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Validate ticker values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_interval_ms == 0 {
            return Err("idle_interval_ms must be greater than 0".into());
        }
        Ok(())
    }
}
