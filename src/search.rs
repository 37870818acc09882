pub use self::determinize::Determinizer;
pub use self::pimc::PimcAgent;
pub use self::soismcts::SoIsmctsAgent;
use crate::game::{Action, GameState, HiddenState};
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::SliceRandom;
use rand::Rng;

mod determinize;
mod pimc;
mod soismcts;

/// Probability mass the assumed opponent policy spreads uniformly over all
/// legal actions.
pub const OPPONENT_TREMBLE: f64 = 0.1;

/// Default search budget for the tree-search agents.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Samples an index according to the given weights.
pub(crate) fn weighted_choice(weights: &[f64], rng: &mut impl Rng) -> usize {
    WeightedIndex::new(weights).unwrap().sample(rng)
}

/// Blends a base policy with the uniform distribution.
fn tremble_mix(base: &[f64]) -> Vec<f64> {
    let uniform = 1.0 / base.len() as f64;
    base.iter()
        .map(|p| (1.0 - OPPONENT_TREMBLE) * p + OPPONENT_TREMBLE * uniform)
        .collect()
}

/// Samples a move from the uniform-with-tremble policy assumed for players
/// outside the searcher's control.
pub(crate) fn sample_tremble_move(
    state: &GameState,
    hidden: &HiddenState,
    player: usize,
    rng: &mut impl Rng,
) -> Action {
    let legal_actions = state.legal_actions(hidden, player);
    if legal_actions.len() == 1 {
        return legal_actions[0];
    }
    let base = vec![1.0 / legal_actions.len() as f64; legal_actions.len()];
    let probs = tremble_mix(&base);
    legal_actions[weighted_choice(&probs, rng)]
}

/// Plays uniformly random moves until the game ends, returning each seat's
/// payoff.
pub(crate) fn rollout(state: &GameState, hidden: &HiddenState, rng: &mut impl Rng) -> Vec<f64> {
    let mut state = state.clone();
    let mut hidden = hidden.clone();
    while !state.is_terminal() {
        let moves: Vec<Action> = state
            .moving_players()
            .into_iter()
            .map(|p| *state.legal_actions(&hidden, p).choose(rng).unwrap())
            .collect();
        let (next_state, next_hidden, _) = state.transition(&hidden, &moves, rng);
        state = next_state;
        hidden = next_hidden;
    }
    state.terminal_value(&hidden)
}
