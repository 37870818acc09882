use serde::{Deserialize, Serialize};

/// An executive power granted to the president by a fascist policy.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Power {
    None,
    Deckpeek,
    Bullet,
    Investigate,
    SpecialElection,
}

/// The executive power track for a starting player count, indexed by the
/// number of enacted fascist policies minus one.
pub fn power_track(num_players: usize) -> [Power; 6] {
    use Power::*;
    match num_players {
        5 | 6 => [None, None, Deckpeek, Bullet, Bullet, None],
        7 | 8 => [None, Investigate, SpecialElection, Bullet, Bullet, None],
        9 | 10 => [Investigate, Investigate, SpecialElection, Bullet, Bullet, None],
        _ => panic!("invalid player count: {num_players}"),
    }
}
