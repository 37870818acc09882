//! Whole-game conservation and payoff properties.

use super::super::*;
use super::test_utils::*;
use rand::prelude::SliceRandom;
use rand::Rng;

fn play_random_game(num_players: usize, rng: &mut impl Rng) -> (GameState, HiddenState) {
    let (mut state, mut hidden) = GameState::start_state(num_players, rng).unwrap();
    while !state.is_terminal() {
        let moves: Vec<Action> = state
            .moving_players()
            .into_iter()
            .map(|player| *state.legal_actions(&hidden, player).choose(rng).unwrap())
            .collect();
        let (next_state, next_hidden, _) = state.transition(&hidden, &moves, rng);

        assert_eq!(next_state.policy_deck_size, next_hidden.policy_deck.len());
        assert!(HiddenState::valid_policy_count(
            next_hidden.policy_deck.cards(),
            &next_hidden.discard_pile,
            &next_hidden.proposed_policies,
            next_state.fas_policy,
            next_state.lib_policy,
        ));
        assert_eq!(next_state.current_num_players, next_state.alive_players.len());

        state = next_state;
        hidden = next_hidden;
    }
    (state, hidden)
}

#[test]
fn policies_are_conserved_across_random_games() {
    for seed in 0..30 {
        let num_players = MIN_PLAYERS + seed as usize % 6;
        play_random_game(num_players, &mut rng(seed));
    }
}

#[test]
fn terminal_payoffs_are_zero_sum() {
    for seed in 0..30 {
        let num_players = MIN_PLAYERS + seed as usize % 6;
        let (state, hidden) = play_random_game(num_players, &mut rng(1000 + seed));
        let payoffs = state.terminal_value(&hidden);
        assert_eq!(payoffs.len(), num_players);
        assert!(payoffs.iter().sum::<f64>().abs() < 1e-9);
    }
}

#[test]
fn winners_receive_positive_payoffs() {
    for seed in 0..10 {
        let (state, hidden) = play_random_game(7, &mut rng(2000 + seed));
        let winner = state.game_end.unwrap();
        for (role, payoff) in hidden.hidden_roles.iter().zip(state.terminal_value(&hidden)) {
            if role.party() == winner {
                assert!(payoff > 0.0);
            } else {
                assert!(payoff < 0.0);
            }
        }
    }
}
