use super::deck::{PolicyDeck, DECK_SIZE, NUM_FASCIST_POLICIES, NUM_LIBERAL_POLICIES};
use super::party::Party;
use super::role::SecretRole;
use serde::{Deserialize, Serialize};

/// The concealed portion of the world: the role behind each seat, the
/// ordered draw pile, the discard pile, and any cards held by the active
/// government during a legislative session.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct HiddenState {
    pub hidden_roles: Vec<SecretRole>,
    pub policy_deck: PolicyDeck,
    pub discard_pile: Vec<Party>,
    pub proposed_policies: Vec<Party>,
}

impl HiddenState {
    pub fn new(hidden_roles: Vec<SecretRole>, policy_deck: PolicyDeck) -> Self {
        Self {
            hidden_roles,
            policy_deck,
            discard_pile: vec![],
            proposed_policies: vec![],
        }
    }

    /// Checks that every policy card is accounted for across the draw pile,
    /// discard pile, proposal and enacted counts.
    pub fn valid_policy_count(
        draw_pile: &[Party],
        discard_pile: &[Party],
        proposal: &[Party],
        fas_policy: usize,
        lib_policy: usize,
    ) -> bool {
        let components = [draw_pile, discard_pile, proposal];
        let count = |party| {
            components
                .iter()
                .map(|c| c.iter().filter(|p| **p == party).count())
                .sum::<usize>()
        };
        draw_pile.len() + discard_pile.len() + proposal.len() + fas_policy + lib_policy == DECK_SIZE
            && count(Party::Fascist) + fas_policy == NUM_FASCIST_POLICIES
            && count(Party::Liberal) + lib_policy == NUM_LIBERAL_POLICIES
    }
}
