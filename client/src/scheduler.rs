use std::collections::BTreeMap;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Heartbeat + ping, re-armed by the bootstrap each time it fires.
    Ping,
    /// Re-evaluation of the walk request.
    WalkStep,
    /// Sends the queued move action after a walk ends.
    MoveActionSettle,
}

/// Identifies one scheduled timer; cancelling a stale handle is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// Tick-driven one-shot timers.
///
/// Nothing runs on its own: the engine asks for due timers once per update and runs them in
/// (deadline, scheduling order).
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    // Keyed by (deadline, id) so iteration is already in firing order.
    timers: BTreeMap<(u64, u64), TimerKind>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: u64, kind: TimerKind) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.insert((at, id), kind);
        TimerHandle(id)
    }

    /// Removes the timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self.timers.keys().find(|(_, id)| *id == handle.0).copied();
        match key {
            Some(key) => self.timers.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.keys().any(|(_, id)| *id == handle.0)
    }

    /// Number of pending timers of `kind`.
    pub fn count(&self, kind: TimerKind) -> usize {
        self.timers.values().filter(|k| **k == kind).count()
    }

    /// Removes and returns every timer whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: u64) -> Vec<(TimerHandle, TimerKind)> {
        let later = self.timers.split_off(&(now.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.timers, later);
        due.into_iter()
            .map(|((_, id), kind)| (TimerHandle(id), kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        let late = scheduler.schedule(600, TimerKind::Ping);
        let first = scheduler.schedule(500, TimerKind::WalkStep);
        let second = scheduler.schedule(500, TimerKind::MoveActionSettle);

        assert!(scheduler.take_due(499).is_empty());
        assert_eq!(
            scheduler.take_due(500),
            vec![
                (first, TimerKind::WalkStep),
                (second, TimerKind::MoveActionSettle)
            ]
        );
        assert!(scheduler.is_pending(late));
        assert_eq!(scheduler.take_due(10_000), vec![(late, TimerKind::Ping)]);
        assert!(!scheduler.is_pending(late));
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(10, TimerKind::WalkStep);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.count(TimerKind::WalkStep), 0);
        assert!(scheduler.take_due(100).is_empty());
    }
}
