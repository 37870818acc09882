//! Helpers shared by the state machine tests.

use super::super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::iter::repeat;

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A deterministic game start for the given seat count.
pub fn start(num_players: usize, seed: u64) -> (GameState, HiddenState, ChaCha8Rng) {
    let mut rng = rng(seed);
    let (state, hidden) = GameState::start_state(num_players, &mut rng).unwrap();
    (state, hidden, rng)
}

/// A role assignment with Hitler and the ordinary fascists at fixed seats.
pub fn roles(num_players: usize, hitler: usize, fascists: &[usize]) -> Vec<SecretRole> {
    (0..num_players)
        .map(|p| {
            if p == hitler {
                SecretRole::Hitler
            } else if fascists.contains(&p) {
                SecretRole::Fascist
            } else {
                SecretRole::Liberal
            }
        })
        .collect()
}

/// A hidden state whose draw pile is exactly `deck` (bottom first); the
/// discard pile absorbs every unaccounted card so that conservation holds
/// for the given enacted counts.
pub fn hidden_with_deck(
    hidden_roles: Vec<SecretRole>,
    deck: Vec<Party>,
    fas_policy: usize,
    lib_policy: usize,
    proposed_policies: Vec<Party>,
) -> HiddenState {
    let count = |cards: &[Party], party| cards.iter().filter(|p| **p == party).count();
    let libs_used =
        lib_policy + count(&deck, Party::Liberal) + count(&proposed_policies, Party::Liberal);
    let fas_used =
        fas_policy + count(&deck, Party::Fascist) + count(&proposed_policies, Party::Fascist);

    let mut discard_pile = vec![];
    discard_pile.extend(repeat(Party::Liberal).take(NUM_LIBERAL_POLICIES - libs_used));
    discard_pile.extend(repeat(Party::Fascist).take(NUM_FASCIST_POLICIES - fas_used));

    HiddenState {
        hidden_roles,
        policy_deck: PolicyDeck::new(deck),
        discard_pile,
        proposed_policies,
    }
}

/// A public state in the given phase with all seats alive, consistent with
/// `hidden`.
pub fn state_in(
    num_players: usize,
    phase: Phase,
    president: usize,
    chancellor: Option<usize>,
    fas_policy: usize,
    lib_policy: usize,
    hidden: &HiddenState,
) -> GameState {
    GameState {
        starting_num_players: num_players,
        current_num_players: num_players,
        alive_players: (0..num_players).collect(),
        president,
        chancellor,
        se_prev_pres: None,
        phase,
        fas_policy,
        lib_policy,
        chaos: 0,
        policy_deck_size: hidden.policy_deck.len(),
        prev_gov: None,
        president_veto: true,
        powers: power_track(num_players),
        game_end: None,
        game_end_reason: None,
    }
}

/// Votes for `num_players` seats, the first `ja` of them in favour.
pub fn ja_votes(num_players: usize, ja: usize) -> Vec<Action> {
    (0..num_players).map(|i| Action::Vote { ja: i < ja }).collect()
}

pub fn pc(policy: Party) -> Action {
    Action::PolicyChoice { policy }
}
