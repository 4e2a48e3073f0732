//! Processing action abstraction.

/// Action applied to each dequeued work item.
///
/// The drain loop calls `process` once per item on the scheduling thread.
/// An `Err` (or a panic) is contained by the loop and reported as a
/// [`ProcessingFailure`](crate::core::ProcessingFailure); it never stops
/// the drain or reaches the trigger source.
///
/// Any `FnMut(T) -> Result<(), E>` closure is a processor:
///
/// ```
/// use idle_batch::core::WorkProcessor;
///
/// let mut seen = Vec::new();
/// let mut action = |id: u32| -> anyhow::Result<()> {
///     seen.push(id);
///     Ok(())
/// };
/// action.process(7).unwrap();
/// ```
pub trait WorkProcessor<T>: Send {
    /// Handle one work item.
    ///
    /// # Errors
    ///
    /// Returns the reason this item could not be processed.
    fn process(&mut self, item: T) -> anyhow::Result<()>;
}

impl<T, F, E> WorkProcessor<T> for F
where
    F: FnMut(T) -> Result<(), E> + Send,
    E: Into<anyhow::Error>,
{
    fn process(&mut self, item: T) -> anyhow::Result<()> {
        self(item).map_err(Into::into)
    }
}

/// Processor wrapping an infallible closure.
pub struct InfallibleFn<F>(F);

impl<T, F> WorkProcessor<T> for InfallibleFn<F>
where
    F: FnMut(T) + Send,
{
    fn process(&mut self, item: T) -> anyhow::Result<()> {
        (self.0)(item);
        Ok(())
    }
}

/// Adapt a closure that cannot fail into a [`WorkProcessor`].
pub const fn processor_fn<F>(f: F) -> InfallibleFn<F> {
    InfallibleFn(f)
}
