//! Game construction and rules-table tests.

use super::super::*;
use super::test_utils::*;

#[test]
fn five_player_start_state() {
    let (state, hidden, _) = start(5, 42);
    assert_eq!(state.phase, Phase::Nomination);
    assert_eq!(state.fas_policy, 0);
    assert_eq!(state.lib_policy, 0);
    assert_eq!(state.chaos, 0);
    assert_eq!(state.policy_deck_size, 17);
    assert!(state.president < 5);
    assert_eq!(state.chancellor, None);
    assert_eq!(state.alive_players, vec![0, 1, 2, 3, 4]);
    assert_eq!(state.current_num_players, 5);
    assert_eq!(hidden.hidden_roles.len(), 5);
    assert!(hidden.discard_pile.is_empty());
    assert!(hidden.proposed_policies.is_empty());
}

#[test]
fn invalid_player_counts_are_rejected() {
    let mut rng = rng(0);
    assert!(GameState::start_state(4, &mut rng).is_err());
    assert!(GameState::start_state(11, &mut rng).is_err());
}

#[test]
fn mismatched_role_lists_are_rejected() {
    let mut rng = rng(0);
    // Two Hitlers, no ordinary fascist
    let roles = vec![
        SecretRole::Hitler,
        SecretRole::Hitler,
        SecretRole::Liberal,
        SecretRole::Liberal,
        SecretRole::Liberal,
    ];
    assert!(GameState::start_state_from_roles(roles, &mut rng).is_err());
}

#[test]
fn dealt_roles_match_the_composition_table() {
    for num_players in MIN_PLAYERS..=MAX_PLAYERS {
        let (num_lib, num_fas) = party_split(num_players);
        let (_, hidden, _) = start(num_players, num_players as u64);
        let roles = &hidden.hidden_roles;
        assert_eq!(roles.iter().filter(|r| r.party() == Party::Liberal).count(), num_lib);
        assert_eq!(roles.iter().filter(|r| r.party() == Party::Fascist).count(), num_fas);
        assert_eq!(roles.iter().filter(|r| **r == SecretRole::Hitler).count(), 1);
    }
}

#[test]
fn every_role_hypothesis_matches_the_composition_table() {
    for num_players in MIN_PLAYERS..=MAX_PLAYERS {
        let (num_lib, num_fas) = party_split(num_players);
        for roles in possible_role_tuples(num_players) {
            assert_eq!(roles.len(), num_players);
            assert_eq!(roles.iter().filter(|r| r.party() == Party::Liberal).count(), num_lib);
            assert_eq!(roles.iter().filter(|r| r.party() == Party::Fascist).count(), num_fas);
            assert_eq!(roles.iter().filter(|r| **r == SecretRole::Hitler).count(), 1);
        }
    }
}

#[test]
fn hypothesis_counts_match_the_multiset_permutations() {
    let expected = [(5, 20), (6, 30), (7, 105), (8, 168), (9, 504), (10, 840)];
    for (num_players, count) in expected {
        assert_eq!(possible_role_tuples(num_players).len(), count);
    }
}

#[test]
fn power_track_matches_the_rules() {
    use Power::*;
    assert_eq!(power_track(5), [None, None, Deckpeek, Bullet, Bullet, None]);
    assert_eq!(power_track(6), [None, None, Deckpeek, Bullet, Bullet, None]);
    assert_eq!(power_track(7), [None, Investigate, SpecialElection, Bullet, Bullet, None]);
    assert_eq!(power_track(8), [None, Investigate, SpecialElection, Bullet, Bullet, None]);
    assert_eq!(power_track(9), [Investigate, Investigate, SpecialElection, Bullet, Bullet, None]);
    assert_eq!(power_track(10), [Investigate, Investigate, SpecialElection, Bullet, Bullet, None]);
}
