//! Logical clock: a due-ordered callback queue advanced one tick at a time

use crate::{ClockError, DispatchError, Result};
use neuma_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use tracing::{debug, trace};

/// Work run by the clock; it may schedule further work on the clock it gets
pub type Action = Box<dyn FnOnce(&mut Clock) -> anyhow::Result<()>>;

/// Lifecycle of a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockState {
    Stopped,
    Running,
    /// Final: the queue is gone and nothing changes any more
    Terminated,
}

/// A queued action with its due tick and insertion index
pub struct ScheduledCallback {
    pub due: u64,
    /// Monotonic insertion counter, breaks ties between equal due ticks
    pub index: u64,
    action: Action,
}

impl fmt::Debug for ScheduledCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledCallback")
            .field("due", &self.due)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScheduledCallback {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.index) == (other.due, other.index)
    }
}

impl Eq for ScheduledCallback {}

impl PartialOrd for ScheduledCallback {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledCallback {
    // Reversed so the max-heap pops the earliest (due, index) first
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.index).cmp(&(self.due, self.index))
    }
}

/// Single-owner scheduler driven entirely by [`Clock::tick`]
///
/// There is no background timer and no locking: the owner decides when
/// logical time moves. Callbacks due on the same tick run in the order they
/// were scheduled.
pub struct Clock {
    now: u64,
    state: ClockState,
    queue: BinaryHeap<ScheduledCallback>,
    next_index: u64,
    /// Set while `tick()` is running callbacks
    dispatching: bool,
}

impl Clock {
    /// Create a stopped clock at tick zero
    pub fn new() -> Self {
        Clock {
            now: 0,
            state: ClockState::Stopped,
            queue: BinaryHeap::new(),
            next_index: 0,
            dispatching: false,
        }
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Number of callbacks waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Start the clock, optionally queueing an action for the next tick
    ///
    /// Calling `run` on a running clock only queues the action; the tick
    /// counter and the queue are left alone. On a terminated clock this does
    /// nothing and the action is dropped.
    pub fn run(&mut self, action: Option<Action>) {
        match self.state {
            ClockState::Terminated => {
                trace!("run ignored, clock is terminated");
                return;
            }
            ClockState::Stopped => {
                debug!(tick = self.now, "clock running");
                self.state = ClockState::Running;
            }
            ClockState::Running => {}
        }

        if let Some(action) = action {
            self.enqueue(0, action);
        }
    }

    /// Queue `action` to run `offset` ticks from now
    ///
    /// An offset of zero means the next `tick()`. Work scheduled from inside a
    /// running callback is never due before the following tick. Scheduling on
    /// a terminated clock is a silent no-op.
    pub fn schedule<F>(&mut self, offset: i64, action: F) -> Result<()>
    where
        F: FnOnce(&mut Clock) -> anyhow::Result<()> + 'static,
    {
        if offset < 0 {
            return Err(ConfigError::NegativeOffset(offset).into());
        }
        if self.state == ClockState::Terminated {
            return Ok(());
        }
        self.enqueue(offset as u64, Box::new(action));
        Ok(())
    }

    fn enqueue(&mut self, offset: u64, action: Action) {
        let mut due = self.now.saturating_add(offset);
        if self.dispatching {
            due = due.max(self.now + 1);
        }

        let index = self.next_index;
        self.next_index += 1;
        trace!(due, index, "scheduled callback");
        self.queue.push(ScheduledCallback { due, index, action });
    }

    /// Advance logical time by one tick
    ///
    /// Runs every callback due at or before the current tick, in
    /// `(due, index)` order, then moves the counter forward by one. Does
    /// nothing unless the clock is running.
    ///
    /// If a callback fails, dispatch stops right there: the callbacks already
    /// run stay removed, the counter still advances, and the rest of this
    /// tick's callbacks stay queued and become due on the next tick. The
    /// failure is returned as-is; the clock does not log or retry it.
    ///
    /// A callback calling `tick()` on the clock it was handed gets `Ok(())`
    /// and nothing happens; only the owner advances time.
    pub fn tick(&mut self) -> Result<()> {
        if self.state != ClockState::Running || self.dispatching {
            return Ok(());
        }

        let tick = self.now;
        let mut outcome = Ok(());
        self.dispatching = true;

        while self.queue.peek().map_or(false, |head| head.due <= tick) {
            let ScheduledCallback { index, action, .. } = match self.queue.pop() {
                Some(callback) => callback,
                None => break,
            };

            trace!(tick, index, "dispatching callback");
            if let Err(source) = action(self) {
                outcome = Err(ClockError::from(DispatchError { tick, index, source }));
                break;
            }
            if self.state == ClockState::Terminated {
                break;
            }
        }

        self.dispatching = false;
        if self.state == ClockState::Running {
            self.now += 1;
        }
        outcome
    }

    /// Enter the final state and drop every pending callback
    pub fn terminate(&mut self) {
        if self.state == ClockState::Terminated {
            return;
        }
        debug!(tick = self.now, dropped = self.queue.len(), "clock terminated");
        self.state = ClockState::Terminated;
        self.queue.clear();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("now", &self.now)
            .field("state", &self.state)
            .field("pending", &self.queue.len())
            .finish()
    }
}
