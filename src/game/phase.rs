use serde::{Deserialize, Serialize};

/// The current phase in the game loop.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The president must nominate a chancellor.
    Nomination,
    /// All alive players vote on the proposed government.
    Vote,
    /// The president must discard one of three drawn policies.
    PresidentSelectPolicy,
    /// The chancellor must enact one of two policies, or call for a veto.
    ChancellorSelectPolicy,
    /// The president must approve or refuse the chancellor's veto.
    Veto,
    /// The president must use an unlocked executive power.
    PresidentPower,
    /// The game is over.
    End,
}
