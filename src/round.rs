//! The round aggregate
//!
//! All mutable state of one play-through lives in [`Round`]: the queue,
//! the position in it, both players' remaining time and score, who holds
//! the clock and the skip and pause flags. The state machine in
//! [`game`](crate::game) mutates it only through the methods here, which
//! keeps the invariants in one place:
//!
//! * a round without an active player has ended
//! * the position never moves backwards and never passes the queue length
//! * remaining time never drops below zero

use std::cmp::Ordering;

use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};

use crate::player::Player;

/// Monotonic identifier of a round within a game
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("round#{_0}")]
pub struct RoundId(u64);

impl RoundId {
    /// Wraps a raw round number
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The identifier of the round following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Observable phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No round has been started yet
    Idle,
    /// A player's clock is running and guesses are accepted
    Running,
    /// A skip is pending, the clock runs but guesses are refused
    SkipCooldown,
    /// The clock is stopped until the round is resumed
    Paused,
    /// The round is over until the next start
    Ended,
}

impl Phase {
    /// Whether a player holds the clock in this phase
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::SkipCooldown | Self::Paused)
    }
}

/// Result of an ended round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// One player scored more, or scored the same with more time left
    Winner(Player),
    /// Same score and same time left
    Draw,
}

/// One play-through of a category's queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    id: RoundId,
    category: String,
    queue: Vec<String>,
    position: usize,
    remaining_time: EnumMap<Player, u64>,
    score: EnumMap<Player, u64>,
    active_player: Option<Player>,
    skip_cooldown_active: bool,
    paused: bool,
}

impl Round {
    /// Starts a fresh round with the first player to move
    pub fn new(id: RoundId, category: String, queue: Vec<String>, initial_time: u64) -> Self {
        Self {
            id,
            category,
            queue,
            position: 0,
            remaining_time: enum_map! { _ => initial_time },
            score: EnumMap::default(),
            active_player: Some(Player::Zero),
            skip_cooldown_active: false,
            paused: false,
        }
    }

    /// Identifier stamped into the round's alarms
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Category the queue was loaded from
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Index of the item on display
    pub fn position(&self) -> usize {
        self.position
    }

    /// Items in the order they are revealed
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    /// Number of items in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Seconds left for each player
    pub fn remaining_time(&self) -> &EnumMap<Player, u64> {
        &self.remaining_time
    }

    /// Points of each player
    pub fn score(&self) -> &EnumMap<Player, u64> {
        &self.score
    }

    /// Player holding the clock, `None` once the round has ended
    pub fn active_player(&self) -> Option<Player> {
        self.active_player
    }

    /// Whether scoring is frozen by a skip
    pub fn skip_cooldown_active(&self) -> bool {
        self.skip_cooldown_active
    }

    /// Whether the round is paused
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Phase derived from the round's flags
    pub fn phase(&self) -> Phase {
        match self.active_player {
            None => Phase::Ended,
            Some(_) if self.paused => Phase::Paused,
            Some(_) if self.skip_cooldown_active => Phase::SkipCooldown,
            Some(_) => Phase::Running,
        }
    }

    /// Item on display, hidden once the round has ended
    pub fn current_item(&self) -> Option<&str> {
        self.active_player?;
        self.queue.get(self.position).map(String::as_str)
    }

    /// Whether the item on display is the last one of the queue
    pub fn is_last_item(&self) -> bool {
        self.position + 1 >= self.queue.len()
    }

    /// Winner of an ended round, `None` while it is still live
    pub fn outcome(&self) -> Option<Outcome> {
        if self.active_player.is_some() {
            return None;
        }
        let key = |p: Player| (self.score[p], self.remaining_time[p]);
        Some(match key(Player::Zero).cmp(&key(Player::One)) {
            Ordering::Greater => Outcome::Winner(Player::Zero),
            Ordering::Less => Outcome::Winner(Player::One),
            Ordering::Equal => Outcome::Draw,
        })
    }

    /// Removes one second from `player`, stopping at zero
    pub(crate) fn consume_second(&mut self, player: Player) {
        self.remaining_time[player] = self.remaining_time[player].saturating_sub(1);
    }

    /// Whether the player holding the clock has run out of time
    pub(crate) fn active_time_expired(&self) -> bool {
        self.active_player
            .is_some_and(|player| self.remaining_time[player] == 0)
    }

    /// Gives the active player a point
    pub(crate) fn award_active(&mut self) {
        if let Some(player) = self.active_player {
            self.score[player] += 1;
        }
    }

    /// Moves to the next item
    ///
    /// # Returns
    ///
    /// `true` if the queue is exhausted
    pub(crate) fn advance(&mut self) -> bool {
        self.position = (self.position + 1).min(self.queue.len());
        self.position == self.queue.len()
    }

    /// Picks who plays next after a correct guess
    ///
    /// The opponent if they have time left, otherwise the current player if
    /// they have time left, otherwise nobody.
    pub(crate) fn next_player(&self) -> Option<Player> {
        let current = self.active_player?;
        [current.opponent(), current]
            .into_iter()
            .find(|player| self.remaining_time[*player] > 0)
    }

    pub(crate) fn set_active_player(&mut self, player: Player) {
        self.active_player = Some(player);
    }

    pub(crate) fn set_skip_cooldown(&mut self, active: bool) {
        self.skip_cooldown_active = active;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Ends the round, the position stays where it is
    pub(crate) fn finish(&mut self) {
        self.active_player = None;
        self.skip_cooldown_active = false;
        self.paused = false;
    }
}
