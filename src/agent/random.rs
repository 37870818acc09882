use super::{Agent, Belief};
use crate::game::{Action, GameState, HiddenState, Observation, SecretRole};
use rand::prelude::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Baseline agent that plays uniformly at random.
pub struct RandomAgent {
    name: String,
    belief: Belief,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(player_id: usize, num_players: usize, secret_role: SecretRole) -> Self {
        Self {
            name: "random".into(),
            belief: Belief::new(player_id, num_players, secret_role),
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn player_id(&self) -> usize {
        self.belief.player_id
    }

    fn secret_role(&self) -> SecretRole {
        self.belief.secret_role
    }

    fn get_action(&mut self, _state: &GameState, legal_actions: &[Action]) -> Action {
        let action = *legal_actions.choose(&mut self.rng).expect("no legal actions");
        log::debug!("{}:{} chose {:?}", self.name, self.belief.player_id, action);
        action
    }

    fn handle_observation(&mut self, observation: &Observation) {
        self.belief.handle_observation(observation);
    }

    fn handle_transition(
        &mut self,
        old_state: &GameState,
        new_state: &GameState,
        old_hidden: &HiddenState,
        new_hidden: &HiddenState,
        moves: &[Action],
    ) {
        self.belief
            .handle_transition(old_state, new_state, old_hidden, new_hidden, moves, &mut self.rng);
    }

    fn communicate_hidden_state(&mut self, hidden_roles: &[SecretRole]) {
        self.belief.communicate(hidden_roles);
    }
}
