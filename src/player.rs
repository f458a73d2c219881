//! The two contestants of a picture battle

use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// One of the two players of a round
///
/// Players own their entries in the per-player time and score maps of a
/// [`Round`](crate::round::Round) but never own the clock itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    /// The player who opens every round
    #[display("P1")]
    Zero,
    /// The player who answers second
    #[display("P2")]
    One,
}

impl Player {
    /// Both players in turn order
    pub const ALL: [Player; 2] = [Player::Zero, Player::One];

    /// Returns the other player
    pub fn opponent(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}
