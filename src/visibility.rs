use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::debug;

use crate::events::Wakeup;
use crate::tasks::scoped::ScopedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub from: Visibility,
    pub to: Visibility,
}

#[derive(Debug)]
struct PendingSelectAll {
    generation: u64,
    _task: ScopedTask,
}

/// Tracks the host-owned `open` flag and reacts to its edges.
///
/// A rising edge arms a delayed select-all; a falling edge or teardown
/// disarms it. Each arming gets a fresh generation so a wakeup that raced a
/// cancellation is recognized as stale.
#[derive(Debug)]
pub struct VisibilityController {
    state: Visibility,
    select_all_delay: Duration,
    pending: Option<PendingSelectAll>,
    next_generation: u64,
}

impl VisibilityController {
    pub fn new(select_all_delay: Duration) -> Self {
        Self {
            state: Visibility::Closed,
            select_all_delay,
            pending: None,
            next_generation: 0,
        }
    }

    pub fn current(&self) -> Visibility {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == Visibility::Open
    }

    pub fn has_pending_select_all(&self) -> bool {
        self.pending.is_some()
    }

    /// Feeds the host's current `open` value. Steady values are ignored; only
    /// edges produce a change.
    pub fn observe(
        &mut self,
        open: bool,
        wakeups: &UnboundedSender<Wakeup>,
    ) -> Option<VisibilityChange> {
        let to = if open { Visibility::Open } else { Visibility::Closed };
        if self.state == to {
            return None;
        }
        let change = VisibilityChange {
            from: self.state,
            to,
        };
        self.state = to;
        match to {
            Visibility::Open => self.arm_select_all(wakeups),
            Visibility::Closed => self.disarm(),
        }
        debug!(from = ?change.from, to = ?change.to, "visibility edge");
        Some(change)
    }

    /// Claims a select-all wakeup. Only the currently armed generation is
    /// honored, and only while open.
    pub fn take_due(&mut self, generation: u64) -> bool {
        let armed = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation);
        if armed && self.is_open() {
            self.pending = None;
            return true;
        }
        debug!(generation, "stale select-all wakeup ignored");
        false
    }

    pub fn teardown(&mut self) {
        self.disarm();
    }

    fn arm_select_all(&mut self, wakeups: &UnboundedSender<Wakeup>) {
        self.disarm();
        let generation = self.next_generation;
        self.next_generation += 1;
        let delay = self.select_all_delay;
        let tx = wakeups.clone();
        let task = ScopedTask::spawn(move |cancel| async move {
            select! {
                _ = cancel.cancelled() => {}
                _ = sleep(delay) => {
                    let _ = tx.send(Wakeup::SelectAllDue { generation });
                }
            }
        });
        self.pending = Some(PendingSelectAll {
            generation,
            _task: task,
        });
    }

    fn disarm(&mut self) {
        if let Some(p) = self.pending.take() {
            debug!(generation = p.generation, "select-all disarmed");
        }
    }
}
