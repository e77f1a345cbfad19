//! Cells in the cellular automaton.

use crate::error::Error;
use std::ops::Not;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Possible states of a cell.
///
/// A cell is either [`DEAD`] or [`ALIVE`]; no other value is ever stored
/// in a [`Board`](crate::Board).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct State(pub(crate) u8);

/// The Dead state.
pub const DEAD: State = State(0);
/// The Alive state.
pub const ALIVE: State = State(1);

impl State {
    /// Whether the cell is alive.
    #[inline]
    pub fn is_alive(self) -> bool {
        self == ALIVE
    }

    /// The numeric value of the state, `0` or `1`.
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Flips the state.
impl Not for State {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        match self {
            ALIVE => DEAD,
            _ => ALIVE,
        }
    }
}

impl From<bool> for State {
    #[inline]
    fn from(alive: bool) -> Self {
        if alive {
            ALIVE
        } else {
            DEAD
        }
    }
}

impl TryFrom<u8> for State {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DEAD),
            1 => Ok(ALIVE),
            v => Err(Error::ParseBoardError(format!("invalid cell value {}", v))),
        }
    }
}

impl From<State> for u8 {
    #[inline]
    fn from(state: State) -> Self {
        state.0
    }
}

/// The coordinates of a cell.
///
/// `(row, column)`, both 0-indexed.
pub type Coord = (usize, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip() {
        assert_eq!(!ALIVE, DEAD);
        assert_eq!(!DEAD, ALIVE);
    }

    #[test]
    fn from_bool() {
        assert_eq!(State::from(true), ALIVE);
        assert_eq!(State::from(false), DEAD);
        assert!(ALIVE.is_alive());
        assert_eq!(DEAD.value(), 0);
    }

    #[test]
    fn from_u8() {
        assert_eq!(State::try_from(1).ok(), Some(ALIVE));
        assert_eq!(u8::from(DEAD), 0);
        assert!(matches!(
            State::try_from(2),
            Err(Error::ParseBoardError(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_other_values() {
        assert_eq!(serde_json::from_str::<State>("1").ok(), Some(ALIVE));
        assert!(serde_json::from_str::<State>("7").is_err());
        assert_eq!(serde_json::to_string(&ALIVE).ok().as_deref(), Some("1"));
    }
}
