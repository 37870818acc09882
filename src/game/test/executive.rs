//! Executive power tests.

use super::super::*;
use super::test_utils::*;

#[test]
fn shooting_hitler_ends_the_game() {
    let hidden = hidden_with_deck(roles(7, 3, &[1, 2]), vec![], 4, 0, vec![]);
    let state = state_in(7, Phase::PresidentPower, 0, None, 4, 0, &hidden);

    let (next, _, _) = state.transition(&hidden, &[Action::Bullet { target: 3 }], &mut rng(1));
    assert!(next.is_terminal());
    assert_eq!(next.game_end, Some(Party::Liberal));
    assert_eq!(next.game_end_reason, Some(GameEndReason::HitlerKilled));
}

#[test]
fn shooting_a_liberal_removes_them_from_the_game() {
    let hidden = hidden_with_deck(roles(7, 3, &[1, 2]), vec![], 4, 0, vec![]);
    let mut state = state_in(7, Phase::PresidentPower, 0, None, 4, 0, &hidden);
    state.prev_gov = Some((Some(5), 6));

    let (next, _, _) = state.transition(&hidden, &[Action::Bullet { target: 4 }], &mut rng(1));
    assert_eq!(next.phase, Phase::Nomination);
    assert_eq!(next.current_num_players, 6);
    assert!(!next.alive_players.contains(&4));
    assert_eq!(next.president, 1);
    assert_eq!(next.prev_gov, Some((Some(5), 6)));
}

#[test]
fn the_bullet_clears_the_presidential_term_limit_at_five_alive() {
    let hidden = hidden_with_deck(roles(6, 3, &[1]), vec![], 4, 0, vec![]);
    let mut state = state_in(6, Phase::PresidentPower, 0, None, 4, 0, &hidden);
    state.prev_gov = Some((Some(4), 5));

    let (next, _, _) = state.transition(&hidden, &[Action::Bullet { target: 2 }], &mut rng(1));
    assert_eq!(next.current_num_players, 5);
    assert_eq!(next.prev_gov, Some((None, 5)));
}

#[test]
fn dead_players_do_not_vote_or_get_shot() {
    let hidden = hidden_with_deck(roles(7, 3, &[1, 2]), vec![], 4, 0, vec![]);
    let mut state = state_in(7, Phase::PresidentPower, 0, None, 4, 0, &hidden);
    state.alive_players = vec![0, 1, 2, 3, 5, 6];
    state.current_num_players = 6;

    let targets: Vec<usize> = state
        .legal_actions(&hidden, 0)
        .iter()
        .map(|action| match action {
            Action::Bullet { target } => *target,
            other => panic!("unexpected action {other:?}"),
        })
        .collect();
    assert_eq!(targets, vec![1, 2, 3, 5, 6]);
}

#[test]
fn investigation_reveals_party_membership() {
    let hidden = hidden_with_deck(roles(9, 3, &[1, 2, 4]), vec![], 1, 0, vec![]);
    let state = state_in(9, Phase::PresidentPower, 0, None, 1, 0, &hidden);

    let (next, _, observation) =
        state.transition(&hidden, &[Action::Investigate { target: 4 }], &mut rng(1));
    assert_eq!(next.phase, Phase::Nomination);
    assert_eq!(next.president, 1);
    assert!(next.alive_players.contains(&4));
    assert_eq!(
        observation,
        Some(Observation::InvestigateResult {
            player: 4,
            party: Party::Fascist
        })
    );
}

#[test]
fn deckpeek_shows_the_top_three_and_leaves_the_deck_unchanged() {
    let mut deck = vec![Party::Fascist; 5];
    deck.extend([Party::Liberal, Party::Fascist, Party::Liberal]);
    let hidden = hidden_with_deck(roles(5, 3, &[1]), deck, 3, 0, vec![]);
    let state = state_in(5, Phase::PresidentPower, 0, None, 3, 0, &hidden);

    assert_eq!(state.legal_actions(&hidden, 0), vec![Action::DeckpeekAck]);

    let (next, next_hidden, observation) =
        state.transition(&hidden, &[Action::DeckpeekAck], &mut rng(1));
    assert_eq!(next.phase, Phase::Nomination);
    assert_eq!(next.president, 1);
    assert_eq!(next_hidden.policy_deck, hidden.policy_deck);
    assert_eq!(
        observation,
        Some(Observation::DeckpeekPeek {
            policies: [Party::Liberal, Party::Fascist, Party::Liberal]
        })
    );
}
