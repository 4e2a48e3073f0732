//! Builder assembling a [`BatchScheduler`] from configuration and parts.

use std::fmt;
use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    BatchScheduler, FailureSink, NoopHost, SchedulerError, TriggerHost, WorkProcessor, WorkQueue,
};
use crate::util::clock::{Clock, SystemClock};

/// Step-by-step construction of a [`BatchScheduler`].
///
/// Only the processing action is mandatory. Without a host the scheduler uses
/// [`NoopHost`]; without a clock, [`SystemClock`]; without a queue, a fresh
/// [`WorkQueue`].
pub struct SchedulerBuilder<T> {
    config: SchedulerConfig,
    processor: Option<Box<dyn WorkProcessor<T>>>,
    host: Option<Box<dyn TriggerHost>>,
    clock: Option<Arc<dyn Clock>>,
    queue: Option<Arc<WorkQueue<T>>>,
    failure_sinks: Vec<Box<dyn FailureSink>>,
}

impl<T: Send + 'static> SchedulerBuilder<T> {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            processor: None,
            host: None,
            clock: None,
            queue: None,
            failure_sinks: Vec::new(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the processing action.
    #[must_use]
    pub fn processor<P>(mut self, processor: P) -> Self
    where
        P: WorkProcessor<T> + 'static,
    {
        self.processor = Some(Box::new(processor));
        self
    }

    /// Set the trigger host notified on attach, detach and redrive.
    #[must_use]
    pub fn host<H>(mut self, host: H) -> Self
    where
        H: TriggerHost + 'static,
    {
        self.host = Some(Box::new(host));
        self
    }

    /// Set the time source used for budgeting.
    #[must_use]
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Drain an existing queue instead of creating one.
    #[must_use]
    pub fn queue(mut self, queue: Arc<WorkQueue<T>>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Register a failure observer.
    #[must_use]
    pub fn failure_sink<S>(mut self, sink: S) -> Self
    where
        S: FailureSink + 'static,
    {
        self.failure_sinks.push(Box::new(sink));
        self
    }

    /// Validate and assemble the scheduler, attaching it if the
    /// configuration asks for it.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if no processing
    /// action was supplied or the configuration is invalid.
    pub fn build(self) -> Result<BatchScheduler<T>, SchedulerError> {
        self.config
            .validate()
            .map_err(SchedulerError::InvalidConfiguration)?;
        let processor = self.processor.ok_or_else(|| {
            SchedulerError::InvalidConfiguration("a processing action is required".into())
        })?;

        let attach = self.config.attach_on_start;
        let mut scheduler = BatchScheduler::from_parts(
            self.config,
            self.queue.unwrap_or_default(),
            processor,
            self.host.unwrap_or_else(|| Box::new(NoopHost)),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.failure_sinks,
        );
        if attach {
            scheduler.attach()?;
        }
        Ok(scheduler)
    }
}

impl<T: Send + 'static> Default for SchedulerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SchedulerBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerBuilder")
            .field("config", &self.config)
            .field("has_processor", &self.processor.is_some())
            .field("has_host", &self.host.is_some())
            .field("failure_sinks", &self.failure_sinks.len())
            .finish_non_exhaustive()
    }
}

/// Parse a JSON configuration and build a scheduler around `processor`.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidConfiguration`] if the JSON does not parse
/// or fails validation.
pub fn build_from_json<T, P>(json: &str, processor: P) -> Result<BatchScheduler<T>, SchedulerError>
where
    T: Send + 'static,
    P: WorkProcessor<T> + 'static,
{
    let config = SchedulerConfig::from_json_str(json)
        .map_err(|e| SchedulerError::InvalidConfiguration(format!("config invalid: {e}")))?;
    SchedulerBuilder::new()
        .config(config)
        .processor(processor)
        .build()
}
