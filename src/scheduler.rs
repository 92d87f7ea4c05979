//! Single-threaded host clock with timers and per-frame callbacks.
//!
//! Every registration is represented by an owned handle. Dropping or
//! cancelling the handle removes the registration, and it is released
//! exactly once no matter which path gets there first.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::trace;

/// Receives the time it fired at and returns the delay until the next firing,
/// or `None` to stop.
pub type TimerCallback = Box<dyn FnMut(Duration) -> Option<Duration>>;
pub type FrameCallback = Box<dyn FnMut(Duration)>;

/// Shortest delay a timer may ask for, so a zero delay cannot spin `advance`.
const MIN_TIMER_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub timer_fires: u64,
    pub frame_calls: u64,
    pub active_timers: usize,
    pub active_frames: usize,
    pub released_timers: u64,
    pub released_frames: u64,
}

struct TimerEntry {
    due: Duration,
    // Taken out while the callback runs.
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct Registry {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<u64, TimerEntry>,
    frames: BTreeMap<u64, Option<FrameCallback>>,
    timer_fires: u64,
    frame_calls: u64,
    released_timers: u64,
    released_frames: u64,
}

impl Registry {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn next_due(&self, limit: Duration) -> Option<(u64, Duration)> {
        self.timers
            .iter()
            .filter(|(_, entry)| entry.callback.is_some() && entry.due <= limit)
            .min_by_key(|(id, entry)| (entry.due, **id))
            .map(|(id, entry)| (*id, entry.due))
    }
}

/// Cheap to clone; all clones drive the same clock.
#[derive(Clone, Default)]
pub struct Scheduler {
    registry: Rc<RefCell<Registry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.registry.borrow().now
    }

    /// Run `callback` once `delay` has elapsed, then again after whatever delay
    /// it returns.
    pub fn set_timer<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnMut(Duration) -> Option<Duration> + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.allocate_id();
        let due = registry.now.saturating_add(delay.max(MIN_TIMER_DELAY));
        registry.timers.insert(
            id,
            TimerEntry {
                due,
                callback: Some(Box::new(callback)),
            },
        );
        trace!(id, ?due, "timer registered");
        TimerHandle {
            id,
            registry: Rc::downgrade(&self.registry),
            released: false,
        }
    }

    /// Run `callback` on every frame until the handle is released.
    pub fn on_frame<F>(&self, callback: F) -> FrameHandle
    where
        F: FnMut(Duration) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.allocate_id();
        registry.frames.insert(id, Some(Box::new(callback)));
        trace!(id, "frame subscription registered");
        FrameHandle {
            id,
            registry: Rc::downgrade(&self.registry),
            released: false,
        }
    }

    /// Move the clock forward by `dt`: fire due timers in order, then run one
    /// frame.
    pub fn advance(&self, dt: Duration) {
        let target = self.registry.borrow().now.saturating_add(dt);

        loop {
            let next = self.registry.borrow().next_due(target);
            let Some((id, due)) = next else { break };

            let callback = {
                let mut registry = self.registry.borrow_mut();
                registry.now = due;
                registry.timer_fires += 1;
                registry.timers.get_mut(&id).and_then(|entry| entry.callback.take())
            };
            let Some(mut callback) = callback else { continue };

            let next_delay = callback(due);

            let mut registry = self.registry.borrow_mut();
            let finished = match (registry.timers.get_mut(&id), next_delay) {
                (Some(entry), Some(delay)) => {
                    let next_due = due.saturating_add(delay.max(MIN_TIMER_DELAY));
                    // A saturated clock can never reach a later firing.
                    if next_due > due {
                        entry.due = next_due;
                        entry.callback = Some(callback);
                        false
                    } else {
                        true
                    }
                }
                (Some(_), None) => true,
                // Cancelled from inside its own callback.
                (None, _) => false,
            };
            if finished {
                let removed = registry.timers.remove(&id);
                registry.released_timers += 1;
                drop(registry);
                drop(removed);
            }
        }

        self.registry.borrow_mut().now = target;
        self.run_frame(target);
    }

    fn run_frame(&self, now: Duration) {
        let ids: Vec<u64> = self.registry.borrow().frames.keys().copied().collect();
        for id in ids {
            let callback = {
                let mut registry = self.registry.borrow_mut();
                registry.frames.get_mut(&id).and_then(Option::take)
            };
            let Some(mut callback) = callback else { continue };

            callback(now);

            let mut registry = self.registry.borrow_mut();
            registry.frame_calls += 1;
            if let Some(slot) = registry.frames.get_mut(&id) {
                *slot = Some(callback);
            }
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        let registry = self.registry.borrow();
        SchedulerStats {
            timer_fires: registry.timer_fires,
            frame_calls: registry.frame_calls,
            active_timers: registry.timers.len(),
            active_frames: registry.frames.len(),
            released_timers: registry.released_timers,
            released_frames: registry.released_frames,
        }
    }
}

/// Owned registration of a timer. Cancels on drop.
pub struct TimerHandle {
    id: u64,
    registry: Weak<RefCell<Registry>>,
    released: bool,
}

impl TimerHandle {
    pub fn cancel(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            let removed = {
                let mut registry = registry.borrow_mut();
                let removed = registry.timers.remove(&self.id);
                if removed.is_some() {
                    registry.released_timers += 1;
                }
                removed
            };
            // The callback's captures are dropped outside the borrow.
            drop(removed);
            trace!(id = self.id, "timer released");
        }
    }

    pub fn is_active(&self) -> bool {
        !self.released
            && self
                .registry
                .upgrade()
                .is_some_and(|registry| registry.borrow().timers.contains_key(&self.id))
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Owned registration of a per-frame callback. Unsubscribes on drop.
pub struct FrameHandle {
    id: u64,
    registry: Weak<RefCell<Registry>>,
    released: bool,
}

impl FrameHandle {
    pub fn cancel(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            let removed = {
                let mut registry = registry.borrow_mut();
                let removed = registry.frames.remove(&self.id);
                if removed.is_some() {
                    registry.released_frames += 1;
                }
                removed
            };
            drop(removed);
            trace!(id = self.id, "frame subscription released");
        }
    }

    pub fn is_active(&self) -> bool {
        !self.released
            && self
                .registry
                .upgrade()
                .is_some_and(|registry| registry.borrow().frames.contains_key(&self.id))
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
