use serde::{Deserialize, Serialize};
use std::fmt;

/// The two political parties of the game.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Party {
    Liberal,
    Fascist,
}

impl Party {
    /// Gets the other party.
    pub fn opposite(self) -> Self {
        match self {
            Party::Liberal => Party::Fascist,
            Party::Fascist => Party::Liberal,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Liberal => write!(f, "Liberal"),
            Party::Fascist => write!(f, "Fascist"),
        }
    }
}
