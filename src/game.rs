//! Core game logic and state management
//!
//! This module contains the [`Game`] struct, the state machine driving a
//! picture battle: it selects categories, starts rounds, reacts to the
//! players' intents and to the alarms of the clock and of the skip
//! cooldown, and reports every change through a [`Tunnel`].
//!
//! Every action is total. An intent that the current phase does not allow
//! is dropped without touching the state.

use std::fmt::Debug;

use enum_map::{EnumMap, enum_map};
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    AlarmMessage,
    catalog::Catalog,
    clock::Clock,
    config::{Error, Options, PausePolicy},
    player::Player,
    round::{Outcome, Phase, Round, RoundId},
    scheduler::{AlarmHandle, Scheduler},
    session::{AudioCue, Tunnel, request_cue},
};

/// Intents forwarded by the presentation layer
#[derive(Debug, Deserialize, Clone)]
pub enum IncomingMessage {
    /// Choose the category of the next round
    SelectCategory(String),
    /// Start a round with the selected category
    StartRound,
    /// Select a category and start a round with it
    StartRoundWith(String),
    /// The active player named the picture
    GuessCorrect,
    /// The active player passes on the picture
    Skip,
    /// Pause a live round, or resume a paused one
    TogglePause,
}

/// Read-only view of the game recomputed after every transition
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Current phase
    pub state: Phase,
    /// Category of the live or last round, or the selected one when idle
    pub category: String,
    /// Seconds left for each player
    pub remaining_time: EnumMap<Player, u64>,
    /// Points of each player
    pub score: EnumMap<Player, u64>,
    /// Player holding the clock
    pub active_player: Option<Player>,
    /// Item on display while a round is live
    pub current_item: Option<String>,
    /// Index of the item on display
    pub position: usize,
    /// Length of the queue
    pub queue_len: usize,
    /// Whether scoring is frozen by a skip
    pub skip_cooldown_active: bool,
    /// Whether the round is paused
    pub paused: bool,
    /// Result once a round has ended
    pub outcome: Option<Outcome>,
}

/// Update messages sent to the presentation layer
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// The state after a transition
    Snapshot(Snapshot),
    /// A round has just ended
    RoundOver {
        /// Who won
        outcome: Outcome,
        /// Final points of each player
        score: EnumMap<Player, u64>,
    },
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// A category as listed by the category picker
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryMessage {
    /// Key to send back in [`IncomingMessage::SelectCategory`]
    pub name: String,
    /// Human readable name
    pub display_name: String,
    /// Number of items in the category
    pub item_count: usize,
}

/// Sync messages for a presentation layer that (re)connects
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// No round is live, the category picker is available
    Lobby {
        /// Categories to choose from
        categories: Vec<CategoryMessage>,
        /// State of the game
        snapshot: Snapshot,
    },
    /// A round is live
    Round(Snapshot),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The picture battle state machine
pub struct Game {
    /// Categories to choose from
    catalog: Catalog,
    /// Timing options of every round
    options: Options,
    /// Category the next round starts with
    selected_category: String,
    /// The live or last round, `None` before the first start
    round: Option<Round>,
    /// Identifier the next round will carry
    next_round_id: RoundId,
    /// The single countdown clock
    clock: Clock,
    /// Pending skip cooldown alarm
    skip_alarm: Option<ArmedCooldown>,
    /// Cooldown alarms armed so far
    cooldowns: u64,
    /// Cooldown left over when a pause interrupted a skip
    suspended_cooldown: Option<Duration>,
}

/// A skip cooldown alarm waiting to fire
#[derive(Debug, Clone, Copy)]
struct ArmedCooldown {
    handle: AlarmHandle,
    serial: u64,
}

impl Debug for Game {
    /// Custom debug implementation that avoids printing the whole catalog
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("selected_category", &self.selected_category)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates an idle game
    ///
    /// The first category of the catalog is selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] or [`Error::InvalidCatalog`] when
    /// either input fails validation.
    pub fn new(catalog: Catalog, options: Options) -> Result<Self, Error> {
        let options = options.checked()?;
        catalog.validate().map_err(Error::InvalidCatalog)?;
        let selected_category = catalog
            .first()
            .map(|category| category.name().to_owned())
            .unwrap_or_default();
        Ok(Self {
            clock: Clock::new(options.tick_interval()),
            catalog,
            options,
            selected_category,
            round: None,
            next_round_id: RoundId::new(1),
            skip_alarm: None,
            cooldowns: 0,
            suspended_cooldown: None,
        })
    }

    /// Current phase of the game
    pub fn phase(&self) -> Phase {
        self.round.as_ref().map_or(Phase::Idle, Round::phase)
    }

    /// The live or last round
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Category the next round starts with
    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    /// Options the game was created with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Player the clock is running for
    pub fn clock_player(&self) -> Option<Player> {
        self.clock.player()
    }

    fn is_live(&self) -> bool {
        self.phase().is_live()
    }

    fn reject(&self, intent: &str) {
        tracing::debug!(intent, phase = ?self.phase(), "intent rejected");
    }

    /// Builds the observable state
    pub fn snapshot(&self) -> Snapshot {
        match &self.round {
            Some(round) => Snapshot {
                state: round.phase(),
                category: round.category().to_owned(),
                remaining_time: *round.remaining_time(),
                score: *round.score(),
                active_player: round.active_player(),
                current_item: round.current_item().map(ToOwned::to_owned),
                position: round.position(),
                queue_len: round.queue_len(),
                skip_cooldown_active: round.skip_cooldown_active(),
                paused: round.paused(),
                outcome: round.outcome(),
            },
            None => Snapshot {
                state: Phase::Idle,
                category: self.selected_category.clone(),
                remaining_time: enum_map! { _ => self.options.initial_time() },
                score: EnumMap::default(),
                active_player: None,
                current_item: None,
                position: 0,
                queue_len: self
                    .catalog
                    .get(&self.selected_category)
                    .map_or(0, |category| category.items().len()),
                skip_cooldown_active: false,
                paused: false,
                outcome: None,
            },
        }
    }

    /// Returns the message necessary to synchronize a presentation layer
    pub fn state_message(&self) -> SyncMessage {
        let snapshot = self.snapshot();
        if self.is_live() {
            SyncMessage::Round(snapshot)
        } else {
            SyncMessage::Lobby {
                categories: self
                    .catalog
                    .categories()
                    .iter()
                    .map(|category| CategoryMessage {
                        name: category.name().to_owned(),
                        display_name: category.display_name(),
                        item_count: category.items().len(),
                    })
                    .collect_vec(),
                snapshot,
            }
        }
    }

    fn announce<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_message(&UpdateMessage::Snapshot(self.snapshot()));
    }

    fn cancel_skip_alarm<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(armed) = self.skip_alarm.take() {
            scheduler.cancel(armed.handle);
        }
    }

    fn arm_cooldown<S: Scheduler>(&mut self, delay: Duration, round: RoundId, scheduler: &mut S) {
        self.cooldowns += 1;
        let serial = self.cooldowns;
        let handle = scheduler.schedule_once(delay, AlarmMessage::SkipCooldownElapsed { round, serial });
        self.skip_alarm = Some(ArmedCooldown { handle, serial });
    }

    /// Chooses the category of the next round
    ///
    /// Ignored while a round is live or when the category is unknown.
    pub fn set_category<T: Tunnel>(&mut self, name: &str, tunnel: &T) {
        if self.is_live() {
            self.reject("set_category");
            return;
        }
        if !self.catalog.contains(name) {
            tracing::debug!(category = name, "unknown category");
            return;
        }
        name.clone_into(&mut self.selected_category);
        // a finished round of another category no longer describes the lobby
        if self.round.as_ref().is_some_and(|round| round.category() != name) {
            self.round = None;
        }
        self.announce(tunnel);
    }

    /// Starts a round with the selected category
    pub fn start_selected_round<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        let category = self.selected_category.clone();
        self.start_round(&category, scheduler, tunnel);
    }

    /// Starts a new round of `category`, replacing any round in progress
    ///
    /// Resets the queue, both clocks and both scores, then starts the clock
    /// for the first player. Ignored when the category is unknown.
    pub fn start_round<S: Scheduler, T: Tunnel>(
        &mut self,
        category: &str,
        scheduler: &mut S,
        tunnel: &T,
    ) {
        let Some(items) = self.catalog.get(category).map(|c| c.items().to_vec()) else {
            tracing::debug!(category, "unknown category");
            return;
        };

        let superseded = self.is_live();
        self.clock.stop(scheduler);
        self.cancel_skip_alarm(scheduler);
        self.suspended_cooldown = None;
        if superseded {
            request_cue(tunnel, AudioCue::StopMusic);
        }

        let mut queue = items;
        if self.options.shuffle_queue() {
            fastrand::shuffle(&mut queue);
        }

        let id = self.next_round_id;
        self.next_round_id = id.next();
        category.clone_into(&mut self.selected_category);
        let round = Round::new(
            id,
            category.to_owned(),
            queue,
            self.options.initial_time(),
        );
        tracing::info!(round = %id, category, items = round.queue_len(), "round started");
        self.round = Some(round);

        self.clock.start(Player::Zero, id, scheduler);
        request_cue(tunnel, AudioCue::RoundStartMusic);
        self.announce(tunnel);
    }

    /// Scores the active player's guess and hands over the clock
    ///
    /// Only accepted while running. The queue advances by one; when it is
    /// exhausted the round ends, otherwise the clock goes to the opponent if
    /// they have time left, else stays with the current player if they have
    /// time left, else the round ends.
    pub fn guess_correct<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        let Some(round) = self.round.as_mut().filter(|r| r.phase() == Phase::Running) else {
            self.reject("guess_correct");
            return;
        };

        round.award_active();
        let exhausted = round.advance();
        let next = round.next_player();
        let id = round.id();

        self.clock.stop(scheduler);
        match next {
            Some(player) if !exhausted => {
                round.set_active_player(player);
                self.clock.start(player, id, scheduler);
                tracing::debug!(round = %id, %player, "turn passed");
                self.announce(tunnel);
            }
            _ => self.end_round(scheduler, tunnel),
        }
    }

    /// Passes on the current item
    ///
    /// Only accepted while running. Scoring is frozen for the configured
    /// cooldown while the active player's clock keeps running; afterwards the
    /// queue advances, or the round ends if the item was the last one.
    pub fn skip<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        let Some(round) = self.round.as_mut().filter(|r| r.phase() == Phase::Running) else {
            self.reject("skip");
            return;
        };

        round.set_skip_cooldown(true);
        let id = round.id();
        self.arm_cooldown(self.options.skip_cooldown(), id, scheduler);
        tracing::debug!(round = %id, "skip cooldown started");
        self.announce(tunnel);
    }

    /// Pauses a live round or resumes a paused one
    ///
    /// Pausing stops the clock and suspends a pending skip cooldown. On
    /// resume the clock restarts for the same player with a full interval.
    /// Whether the suspended cooldown continues depends on the
    /// [`PausePolicy`].
    pub fn toggle_pause<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        match self.phase() {
            Phase::Running | Phase::SkipCooldown => self.pause(scheduler, tunnel),
            Phase::Paused => self.resume(scheduler, tunnel),
            Phase::Idle | Phase::Ended => self.reject("toggle_pause"),
        }
    }

    fn pause<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        self.clock.stop(scheduler);
        if let Some(armed) = self.skip_alarm.take() {
            self.suspended_cooldown = scheduler.remaining(armed.handle);
            scheduler.cancel(armed.handle);
        }
        if let Some(round) = self.round.as_mut() {
            round.set_paused(true);
        }
        request_cue(tunnel, AudioCue::PauseMusic);
        self.announce(tunnel);
    }

    fn resume<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let Some(player) = round.active_player() else {
            return;
        };
        round.set_paused(false);
        let id = round.id();

        let suspended = self.suspended_cooldown.take();
        let rearm = match (self.options.pause_policy(), suspended) {
            (PausePolicy::PreserveCooldown, Some(left)) if round.skip_cooldown_active() => Some(left),
            _ => None,
        };
        if rearm.is_none() {
            round.set_skip_cooldown(false);
        }

        // the clock is armed first so its tick wins a tie with the cooldown
        self.clock.start(player, id, scheduler);
        if let Some(left) = rearm {
            self.arm_cooldown(left, id, scheduler);
        }
        request_cue(tunnel, AudioCue::ResumeMusic);
        self.announce(tunnel);
    }

    fn end_round<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        self.clock.stop(scheduler);
        self.cancel_skip_alarm(scheduler);
        self.suspended_cooldown = None;

        let Some(round) = self.round.as_mut() else {
            return;
        };
        round.finish();
        let score = *round.score();
        let outcome = round.outcome().unwrap_or(Outcome::Draw);
        tracing::info!(
            round = %round.id(),
            p1 = score[Player::Zero],
            p2 = score[Player::One],
            ?outcome,
            "round ended"
        );

        request_cue(tunnel, AudioCue::RoundEndSound);
        request_cue(tunnel, AudioCue::StopMusic);
        self.announce(tunnel);
        tunnel.send_message(&UpdateMessage::RoundOver { outcome, score });
    }

    /// Handles an alarm previously armed through the scheduler
    ///
    /// Alarms from a superseded round are dropped, and so are ticks of a
    /// clock run that was stopped and cooldowns that were cancelled, even if
    /// the scheduler still delivers them.
    pub fn receive_alarm<S: Scheduler, T: Tunnel>(
        &mut self,
        message: AlarmMessage,
        scheduler: &mut S,
        tunnel: &T,
    ) {
        let Some(round) = self.round.as_mut().filter(|r| r.id() == message.round()) else {
            tracing::trace!(round = %message.round(), "stale alarm dropped");
            return;
        };

        match message {
            AlarmMessage::Tick { player, serial, .. } => {
                if !matches!(round.phase(), Phase::Running | Phase::SkipCooldown)
                    || !self.clock.tick(player, serial, round)
                {
                    return;
                }
                if round.active_time_expired() {
                    tracing::debug!(round = %round.id(), %player, "time expired");
                    self.end_round(scheduler, tunnel);
                } else {
                    self.announce(tunnel);
                }
            }
            AlarmMessage::SkipCooldownElapsed { serial, .. } => {
                if round.phase() != Phase::SkipCooldown
                    || self.skip_alarm.is_none_or(|armed| armed.serial != serial)
                {
                    return;
                }
                self.skip_alarm = None;
                if round.is_last_item() {
                    self.end_round(scheduler, tunnel);
                } else {
                    round.advance();
                    round.set_skip_cooldown(false);
                    self.announce(tunnel);
                }
            }
        }
    }

    /// Dispatches an intent from the presentation layer
    pub fn receive_message<S: Scheduler, T: Tunnel>(
        &mut self,
        message: IncomingMessage,
        scheduler: &mut S,
        tunnel: &T,
    ) {
        match message {
            IncomingMessage::SelectCategory(name) => self.set_category(&name, tunnel),
            IncomingMessage::StartRound => self.start_selected_round(scheduler, tunnel),
            IncomingMessage::StartRoundWith(name) => self.start_round(&name, scheduler, tunnel),
            IncomingMessage::GuessCorrect => self.guess_correct(scheduler, tunnel),
            IncomingMessage::Skip => self.skip(scheduler, tunnel),
            IncomingMessage::TogglePause => self.toggle_pause(scheduler, tunnel),
        }
    }
}
