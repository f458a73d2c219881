//! The shared countdown clock
//!
//! There is exactly one clock per game. It is bound to at most one player
//! at a time and ticks through a repeating alarm, so stopping it cancels
//! the alarm and no tick is ever queued while it is stopped.

use web_time::Duration;

use crate::{
    AlarmMessage,
    player::Player,
    round::{Round, RoundId},
    scheduler::{AlarmHandle, Scheduler},
};

#[derive(Debug, Clone, Copy)]
struct Binding {
    player: Player,
    serial: u64,
    handle: AlarmHandle,
}

/// Countdown clock bound to whichever player is active
#[derive(Debug)]
pub struct Clock {
    interval: Duration,
    starts: u64,
    binding: Option<Binding>,
}

impl Clock {
    /// Creates a stopped clock ticking every `interval` once started
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            starts: 0,
            binding: None,
        }
    }

    /// Binds the clock to `player`, stopping any running clock first
    pub fn start<S: Scheduler>(&mut self, player: Player, round: RoundId, scheduler: &mut S) {
        self.stop(scheduler);
        self.starts += 1;
        let serial = self.starts;
        let handle = scheduler.schedule_repeating(
            self.interval,
            AlarmMessage::Tick {
                round,
                player,
                serial,
            },
        );
        tracing::trace!(%player, %round, serial, %handle, "clock started");
        self.binding = Some(Binding {
            player,
            serial,
            handle,
        });
    }

    /// Stops the clock, does nothing if it is already stopped
    pub fn stop<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(binding) = self.binding.take() {
            scheduler.cancel(binding.handle);
        }
    }

    /// Player the clock is currently running for
    pub fn player(&self) -> Option<Player> {
        self.binding.map(|b| b.player)
    }

    /// Whether the clock is running
    pub fn is_running(&self) -> bool {
        self.binding.is_some()
    }

    /// Applies one tick for `player` to the round
    ///
    /// A tick armed by an earlier start of the clock, or for a player the
    /// clock is not bound to, is ignored. The decrement stops at zero,
    /// detecting the expiry is left to the caller.
    ///
    /// # Returns
    ///
    /// `true` if the tick belonged to the running clock
    pub fn tick(&self, player: Player, serial: u64, round: &mut Round) -> bool {
        if !self
            .binding
            .is_some_and(|b| b.player == player && b.serial == serial)
        {
            return false;
        }
        round.consume_second(player);
        true
    }
}
