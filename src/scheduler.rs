//! Alarm scheduling
//!
//! The engine never sleeps or spawns timers. It asks a [`Scheduler`] to
//! deliver an [`AlarmMessage`] later, either once or repeatedly, and keeps
//! the returned [`AlarmHandle`] so the alarm can be cancelled the moment the
//! condition that armed it goes away. The host hands every fired alarm back
//! to [`Game::receive_alarm`](crate::game::Game::receive_alarm), one at a
//! time.
//!
//! [`VirtualScheduler`] is a deterministic implementation driven by the
//! host (or a test) advancing virtual time.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::AlarmMessage;

/// Identifies an armed alarm so it can be cancelled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("alarm#{_0}")]
pub struct AlarmHandle(u64);

impl AlarmHandle {
    /// Wraps a raw handle value, for schedulers implemented outside the crate
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Timer facility the engine arms its clock and cooldown alarms with
pub trait Scheduler {
    /// Delivers `alarm` every `interval` until cancelled, the first time one
    /// full interval from now
    fn schedule_repeating(&mut self, interval: Duration, alarm: AlarmMessage) -> AlarmHandle;

    /// Delivers `alarm` once after `delay`
    fn schedule_once(&mut self, delay: Duration, alarm: AlarmMessage) -> AlarmHandle;

    /// Disarms an alarm, unknown or already fired handles are ignored
    fn cancel(&mut self, handle: AlarmHandle);

    /// Time left until the alarm next fires, `None` if it is not armed
    fn remaining(&self, handle: AlarmHandle) -> Option<Duration>;
}

#[derive(Debug, Clone)]
struct Pending {
    handle: AlarmHandle,
    alarm: AlarmMessage,
    repeat: Option<Duration>,
}

/// A scheduler running on virtual time
///
/// Alarms fire in due-time order, ties in the order they were first armed.
/// A repeating alarm keeps its place among ties every time it is re-armed,
/// so a clock started before a cooldown also ticks before it. Time only
/// moves when [`run_for`](Self::run_for) or [`pop_due`](Self::pop_due)
/// is called, which makes round behaviour fully reproducible.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    sequence: u64,
    queue: BTreeMap<(Duration, AlarmHandle), Pending>,
    armed: HashMap<AlarmHandle, Duration>,
}

impl VirtualScheduler {
    /// Creates a scheduler at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed alarms
    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Whether the alarm behind `handle` is still armed
    pub fn is_armed(&self, handle: AlarmHandle) -> bool {
        self.armed.contains_key(&handle)
    }

    fn arm(&mut self, delay: Duration, alarm: AlarmMessage, repeat: Option<Duration>) -> AlarmHandle {
        self.sequence += 1;
        let handle = AlarmHandle::new(self.sequence);
        let due = self.now + delay;
        self.queue.insert(
            (due, handle),
            Pending {
                handle,
                alarm,
                repeat,
            },
        );
        self.armed.insert(handle, due);
        handle
    }

    /// Fires the earliest alarm due at or before `until`, moving time to its
    /// due instant
    ///
    /// Repeating alarms are re-armed one interval later under the same
    /// handle before being returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<AlarmMessage> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until {
            return None;
        }
        let pending = self.queue.remove(&key)?;
        self.now = self.now.max(key.0);
        match pending.repeat {
            Some(interval) => {
                let next = key.0 + interval;
                self.armed.insert(pending.handle, next);
                self.queue.insert((next, pending.handle), pending.clone());
            }
            None => {
                self.armed.remove(&pending.handle);
            }
        }
        Some(pending.alarm)
    }

    /// Advances virtual time by `duration`, handing each alarm that comes
    /// due to `deliver` together with the scheduler itself
    ///
    /// Alarms are delivered one at a time, so an alarm cancelled while an
    /// earlier one is handled never fires.
    pub fn run_for<F>(&mut self, duration: Duration, mut deliver: F)
    where
        F: FnMut(&mut Self, AlarmMessage),
    {
        let until = self.now + duration;
        while let Some(alarm) = self.pop_due(until) {
            deliver(self, alarm);
        }
        self.now = until;
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_repeating(&mut self, interval: Duration, alarm: AlarmMessage) -> AlarmHandle {
        // a zero interval would fire forever without time moving
        let interval = interval.max(Duration::from_millis(1));
        self.arm(interval, alarm, Some(interval))
    }

    fn schedule_once(&mut self, delay: Duration, alarm: AlarmMessage) -> AlarmHandle {
        self.arm(delay, alarm, None)
    }

    fn cancel(&mut self, handle: AlarmHandle) {
        if let Some(due) = self.armed.remove(&handle) {
            self.queue.remove(&(due, handle));
        }
    }

    fn remaining(&self, handle: AlarmHandle) -> Option<Duration> {
        self.armed
            .get(&handle)
            .map(|due| due.saturating_sub(self.now))
    }
}
