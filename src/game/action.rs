use super::party::Party;
use serde::{Deserialize, Serialize};

/// A move submitted by one of the currently moving players.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Nominate a player as chancellor.
    Nominate { chancellor: usize },
    /// Vote on the proposed government.
    Vote { ja: bool },
    /// Discard (president) or enact (chancellor) a policy of this party.
    PolicyChoice { policy: Party },
    /// Call for a veto (chancellor), or approve/refuse one (president).
    Veto { veto: bool },
    /// Acknowledge the deck peek power.
    DeckpeekAck,
    /// Execute a player.
    Bullet { target: usize },
    /// Investigate a player's party membership.
    Investigate { target: usize },
    /// Appoint the next presidential candidate.
    SpecialElection { target: usize },
}

/// A private observation delivered to the moving players of a step.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Observation {
    /// The top three cards of the draw pile, in draw order.
    DeckpeekPeek { policies: [Party; 3] },
    /// The party membership of an investigated player.
    InvestigateResult { player: usize, party: Party },
    /// The two cards the president handed to the chancellor.
    PresidentPass { policies: [Party; 2] },
}
