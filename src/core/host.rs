//! Contract between the scheduler and the host that raises trigger signals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host signal that offers the scheduler a chance to do background work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// The host event loop has nothing else to do.
    Idle,
    /// The host is reporting progress of a long operation.
    Progress,
}

impl TriggerKind {
    /// Both kinds, in subscription order.
    pub const ALL: [Self; 2] = [Self::Idle, Self::Progress];
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Progress => f.write_str("progress"),
        }
    }
}

/// Abstraction over whatever delivers idle/progress signals.
///
/// The scheduler calls `subscribe` once per kind when it attaches and
/// `unsubscribe` once per kind when it detaches. The host is then expected to
/// call [`BatchScheduler::on_trigger`](crate::core::BatchScheduler::on_trigger)
/// while subscribed. Implementations may wrap a GUI idle event, a timer or a
/// plain polling loop.
pub trait TriggerHost: Send {
    /// Start delivering `kind` signals.
    fn subscribe(&mut self, kind: TriggerKind);

    /// Stop delivering `kind` signals.
    fn unsubscribe(&mut self, kind: TriggerKind);

    /// Re-raise `kind` without the host's usual delay. Best effort.
    fn raise_without_delay(&mut self, kind: TriggerKind);
}

/// Host for callers that invoke the trigger handlers themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl TriggerHost for NoopHost {
    fn subscribe(&mut self, _kind: TriggerKind) {}

    fn unsubscribe(&mut self, _kind: TriggerKind) {}

    fn raise_without_delay(&mut self, _kind: TriggerKind) {}
}
