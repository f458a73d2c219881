//! # Picture Battle
//!
//! Turn, timer and scoring engine for a two-player picture-guessing duel.
//! Both players share one queue of pictures from a chosen category. Only
//! the active player's countdown runs. A correct guess scores a point,
//! reveals the next picture and hands the clock to the opponent. A skip
//! freezes scoring for a short cooldown while the clock keeps running. The
//! round ends when the queue is exhausted or the active player runs out of
//! time.
//!
//! The crate owns the rules only. Rendering, sound and real timers belong
//! to the host, which talks to the engine through [`session::Tunnel`] and
//! [`scheduler::Scheduler`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod game;
pub mod player;
pub mod round;
pub mod scheduler;
pub mod session;

pub use game::{SyncMessage, UpdateMessage};

/// Alarm messages for timed events of a round
///
/// Every alarm carries the id of the round that armed it and the serial of
/// the arming within that round, so an alarm that outlives its round, or
/// the clock run or cooldown that armed it, is recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One clock tick for the player the clock was started for
    Tick {
        /// Round that started the clock
        round: round::RoundId,
        /// Player whose time the tick consumes
        player: player::Player,
        /// Start of the clock that armed the tick
        serial: u64,
    },
    /// The cooldown following a skip has run out
    SkipCooldownElapsed {
        /// Round in which the skip happened
        round: round::RoundId,
        /// Arming of the cooldown, re-arming after a pause counts again
        serial: u64,
    },
}

impl AlarmMessage {
    /// Round that armed the alarm
    pub fn round(&self) -> round::RoundId {
        match self {
            Self::Tick { round, .. } | Self::SkipCooldownElapsed { round, .. } => *round,
        }
    }
}
