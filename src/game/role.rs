use super::party::Party;
use crate::error::GameError;
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::iter::repeat;
use std::{fmt, str};

/// A player's secret role.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretRole {
    Liberal,
    Fascist,
    Hitler,
}

impl SecretRole {
    /// The party this role belongs to; Hitler sits with the fascists.
    pub fn party(self) -> Party {
        match self {
            SecretRole::Liberal => Party::Liberal,
            SecretRole::Fascist | SecretRole::Hitler => Party::Fascist,
        }
    }
}

impl fmt::Display for SecretRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRole::Liberal => write!(f, "Liberal"),
            SecretRole::Fascist => write!(f, "Fascist"),
            SecretRole::Hitler => write!(f, "Hitler"),
        }
    }
}

impl str::FromStr for SecretRole {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l" | "lib" | "liberal" => Ok(SecretRole::Liberal),
            "f" | "fas" | "fascist" => Ok(SecretRole::Fascist),
            "h" | "hitler" => Ok(SecretRole::Hitler),
            _ => Err(GameError::UnknownRole(s.to_owned())),
        }
    }
}

/// The number of (liberal, fascist) players for a starting player count.
/// The fascist count includes Hitler.
pub fn party_split(num_players: usize) -> (usize, usize) {
    match num_players {
        5 => (3, 2),
        6 => (4, 2),
        7 => (4, 3),
        8 => (5, 3),
        9 => (5, 4),
        10 => (6, 4),
        _ => panic!("invalid player count: {num_players}"),
    }
}

/// Deals a uniformly random role to each seat.
pub fn assign_roles(num_players: usize, rng: &mut impl Rng) -> Vec<SecretRole> {
    let (num_liberals, num_fascists) = party_split(num_players);
    let mut roles = Vec::with_capacity(num_players);
    roles.push(SecretRole::Hitler);
    roles.extend(repeat(SecretRole::Fascist).take(num_fascists - 1));
    roles.extend(repeat(SecretRole::Liberal).take(num_liberals));
    roles.shuffle(rng);
    roles
}

/// Every distinct seat assignment of the role multiset for `num_players`.
pub fn possible_role_tuples(num_players: usize) -> Vec<Vec<SecretRole>> {
    let (_, num_fascists) = party_split(num_players);
    let mut tuples = vec![];
    for hitler in 0..num_players {
        let others = (0..num_players).filter(|p| *p != hitler).collect_vec();
        for fascists in others.into_iter().combinations(num_fascists - 1) {
            let roles = (0..num_players)
                .map(|p| {
                    if p == hitler {
                        SecretRole::Hitler
                    } else if fascists.contains(&p) {
                        SecretRole::Fascist
                    } else {
                        SecretRole::Liberal
                    }
                })
                .collect();
            tuples.push(roles);
        }
    }
    tuples
}
