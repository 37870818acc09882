use crate::game::{
    Action, GameState, HiddenState, Party, Phase, PolicyDeck, SecretRole, DECK_SIZE,
    NUM_FASCIST_POLICIES, NUM_LIBERAL_POLICIES,
};
use rand::prelude::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::iter::repeat;

/// Yields hidden worlds consistent with an agent's beliefs, the known top of
/// the deck, and policy conservation.
///
/// Candidates for the draw pile, discard pile, government proposal and role
/// assignment are enumerated up front; the iterator then loops over them
/// nested-randomized, yielding one hidden state per innermost combination
/// until the requested number of samples is produced. Samples are
/// independent draws suitable for determinized tree search.
pub struct Determinizer {
    draw_piles: Vec<Vec<Party>>,
    discard_piles: Vec<Vec<Party>>,
    proposals: Vec<Vec<Party>>,
    role_tuples: Vec<Vec<SecretRole>>,
    fas_policy: usize,
    lib_policy: usize,
    remaining: usize,
    yielded_this_pass: bool,
    combo_valid: bool,
    draw_idx: usize,
    discard_idx: usize,
    proposal_idx: usize,
    role_idx: usize,
    rng: ChaCha8Rng,
}

impl Determinizer {
    pub fn new(
        state: &GameState,
        legal_actions: &[Action],
        role_tuples: &[Vec<SecretRole>],
        deck_knowledge: &[Party],
        president_pass: &[Party],
        num_iterations: usize,
        mut rng: ChaCha8Rng,
    ) -> Self {
        assert!(
            state.policy_deck_size >= deck_knowledge.len(),
            "deck smaller than what is known about it"
        );

        let mut draw_piles = candidate_draw_piles(
            state.policy_deck_size,
            deck_knowledge,
            state.lib_policy,
            state.fas_policy,
        );
        let mut proposals = candidate_proposals(state.phase, legal_actions, president_pass);
        let proposal_len = proposals.first().map(|p| p.len()).unwrap_or(0);
        let accounted =
            state.policy_deck_size + proposal_len + state.fas_policy + state.lib_policy;
        assert!(accounted <= DECK_SIZE, "more policies than exist in the game");
        let mut discard_piles = candidate_discard_piles(DECK_SIZE - accounted);
        let mut role_tuples = role_tuples.to_vec();

        draw_piles.shuffle(&mut rng);
        discard_piles.shuffle(&mut rng);
        proposals.shuffle(&mut rng);
        role_tuples.shuffle(&mut rng);

        let combo_valid = match (draw_piles.first(), discard_piles.first(), proposals.first()) {
            (Some(draw), Some(discard), Some(proposal)) => HiddenState::valid_policy_count(
                draw,
                discard,
                proposal,
                state.fas_policy,
                state.lib_policy,
            ),
            _ => false,
        };

        Self {
            draw_piles,
            discard_piles,
            proposals,
            role_tuples,
            fas_policy: state.fas_policy,
            lib_policy: state.lib_policy,
            remaining: num_iterations,
            yielded_this_pass: false,
            combo_valid,
            draw_idx: 0,
            discard_idx: 0,
            proposal_idx: 0,
            role_idx: 0,
            rng,
        }
    }

    /// Steps to the next (draw pile, discard pile, proposal) combination,
    /// reshuffling each candidate list as its cursor wraps. Returns false
    /// once a full pass over every combination has yielded nothing.
    fn advance(&mut self) -> bool {
        self.role_idx = 0;
        self.proposal_idx += 1;
        if self.proposal_idx >= self.proposals.len() {
            self.proposal_idx = 0;
            self.discard_idx += 1;
            if self.discard_idx >= self.discard_piles.len() {
                self.discard_idx = 0;
                self.draw_idx += 1;
                if self.draw_idx >= self.draw_piles.len() {
                    if !self.yielded_this_pass {
                        return false;
                    }
                    self.yielded_this_pass = false;
                    self.draw_idx = 0;
                    self.draw_piles.shuffle(&mut self.rng);
                }
                self.discard_piles.shuffle(&mut self.rng);
            }
            self.proposals.shuffle(&mut self.rng);
        }

        self.combo_valid = HiddenState::valid_policy_count(
            &self.draw_piles[self.draw_idx],
            &self.discard_piles[self.discard_idx],
            &self.proposals[self.proposal_idx],
            self.fas_policy,
            self.lib_policy,
        );
        if self.combo_valid {
            self.role_tuples.shuffle(&mut self.rng);
        }
        true
    }
}

impl Iterator for Determinizer {
    type Item = HiddenState;

    fn next(&mut self) -> Option<HiddenState> {
        if self.draw_piles.is_empty()
            || self.discard_piles.is_empty()
            || self.proposals.is_empty()
            || self.role_tuples.is_empty()
        {
            return None;
        }

        while self.remaining > 0 {
            if self.combo_valid && self.role_idx < self.role_tuples.len() {
                let hidden = HiddenState {
                    hidden_roles: self.role_tuples[self.role_idx].clone(),
                    policy_deck: PolicyDeck::new(self.draw_piles[self.draw_idx].clone()),
                    discard_pile: self.discard_piles[self.discard_idx].clone(),
                    proposed_policies: self.proposals[self.proposal_idx].clone(),
                };
                self.role_idx += 1;
                self.remaining -= 1;
                self.yielded_this_pass = true;
                return Some(hidden);
            }
            if !self.advance() {
                return None;
            }
        }
        None
    }
}

/// Every draw pile of the observed size whose cards about to be drawn match
/// the known top of the deck.
fn candidate_draw_piles(
    deck_size: usize,
    deck_knowledge: &[Party],
    lib_policy: usize,
    fas_policy: usize,
) -> Vec<Vec<Party>> {
    let known_libs = deck_knowledge.iter().filter(|p| **p == Party::Liberal).count();
    let known_fas = deck_knowledge.len() - known_libs;
    let max_lib = (NUM_LIBERAL_POLICIES - lib_policy).saturating_sub(known_libs);
    let max_fas = (NUM_FASCIST_POLICIES - fas_policy).saturating_sub(known_fas);
    let free_len = deck_size - deck_knowledge.len();

    party_sequences(free_len, max_lib, max_fas)
        .into_iter()
        .map(|mut pile| {
            pile.extend(deck_knowledge.iter().rev());
            pile
        })
        .collect()
}

/// All card sequences of the given length within the composition bounds.
fn party_sequences(len: usize, max_lib: usize, max_fas: usize) -> Vec<Vec<Party>> {
    if len == 0 {
        return vec![vec![]];
    }
    let mut sequences = vec![];
    if max_lib > 0 {
        for mut seq in party_sequences(len - 1, max_lib - 1, max_fas) {
            seq.push(Party::Liberal);
            sequences.push(seq);
        }
    }
    if max_fas > 0 {
        for mut seq in party_sequences(len - 1, max_lib, max_fas - 1) {
            seq.push(Party::Fascist);
            sequences.push(seq);
        }
    }
    sequences
}

/// Discard piles are unordered, so one candidate per liberal count suffices.
fn candidate_discard_piles(len: usize) -> Vec<Vec<Party>> {
    let mut piles = vec![];
    for libs in 0..=len.min(NUM_LIBERAL_POLICIES) {
        let fascists = len - libs;
        if fascists > NUM_FASCIST_POLICIES {
            continue;
        }
        let mut pile = vec![Party::Liberal; libs];
        pile.extend(repeat(Party::Fascist).take(fascists));
        piles.push(pile);
    }
    piles
}

/// The proposals the moving player's knowledge admits: during a legislative
/// session, every multiset of the right size over the parties visible in the
/// legal actions; during a veto, exactly the cards the president passed.
fn candidate_proposals(
    phase: Phase,
    legal_actions: &[Action],
    president_pass: &[Party],
) -> Vec<Vec<Party>> {
    match phase {
        Phase::PresidentSelectPolicy | Phase::ChancellorSelectPolicy => {
            let size = if phase == Phase::PresidentSelectPolicy { 3 } else { 2 };
            let parties: Vec<Party> = legal_actions
                .iter()
                .filter_map(|action| match action {
                    Action::PolicyChoice { policy } => Some(*policy),
                    _ => None,
                })
                .collect();
            proposal_multisets(size, &parties)
        }
        Phase::Veto => vec![president_pass.to_vec()],
        _ => vec![vec![]],
    }
}

/// Multisets of the given size over the observed parties, each party
/// appearing at least once.
fn proposal_multisets(size: usize, parties: &[Party]) -> Vec<Vec<Party>> {
    match parties {
        [single] => vec![vec![*single; size]],
        [first, second] => (1..size)
            .map(|count| {
                let mut proposal = vec![*first; count];
                proposal.extend(repeat(*second).take(size - count));
                proposal
            })
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::{possible_role_tuples, GameState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_state() -> (GameState, Vec<Vec<SecretRole>>) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (state, _) = GameState::start_state(5, &mut rng).unwrap();
        (state, possible_role_tuples(5))
    }

    #[test]
    fn yields_the_requested_number_of_samples() {
        let (state, roles) = sample_state();
        let samples: Vec<_> = Determinizer::new(
            &state,
            &[],
            &roles,
            &[],
            &[],
            25,
            ChaCha8Rng::seed_from_u64(1),
        )
        .collect();
        assert_eq!(samples.len(), 25);
    }

    #[test]
    fn samples_conserve_policies_and_match_the_public_state() {
        let (state, roles) = sample_state();
        for hidden in Determinizer::new(
            &state,
            &[],
            &roles,
            &[],
            &[],
            50,
            ChaCha8Rng::seed_from_u64(2),
        ) {
            assert_eq!(hidden.policy_deck.len(), state.policy_deck_size);
            assert!(hidden.proposed_policies.is_empty());
            assert!(HiddenState::valid_policy_count(
                hidden.policy_deck.cards(),
                &hidden.discard_pile,
                &hidden.proposed_policies,
                state.fas_policy,
                state.lib_policy,
            ));
            assert!(roles.contains(&hidden.hidden_roles));
        }
    }

    #[test]
    fn samples_respect_known_deck_top() {
        let (mut state, roles) = sample_state();
        state.policy_deck_size = 4;
        state.lib_policy = 4;
        state.fas_policy = 3;
        state.chaos = 0;
        // 17 = 4 (deck) + 6 (discard) + 4 + 3 enacted
        let knowledge = [Party::Fascist, Party::Liberal, Party::Fascist];
        for hidden in Determinizer::new(
            &state,
            &[],
            &roles,
            &knowledge,
            &[],
            30,
            ChaCha8Rng::seed_from_u64(3),
        ) {
            let cards = hidden.policy_deck.cards();
            assert_eq!(cards[cards.len() - 1], Party::Fascist);
            assert_eq!(cards[cards.len() - 2], Party::Liberal);
            assert_eq!(cards[cards.len() - 3], Party::Fascist);
        }
    }
}
