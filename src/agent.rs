pub use self::belief::Belief;
pub use self::random::RandomAgent;
pub use self::selfish::SelfishAgent;
use crate::game::{Action, GameState, HiddenState, Observation, SecretRole};

mod belief;
mod random;
mod selfish;

/// A player in the game loop: chooses moves and digests observations.
pub trait Agent {
    /// The agent's display name, used in result records.
    fn name(&self) -> &str;

    /// The seat this agent occupies.
    fn player_id(&self) -> usize;

    /// The agent's secret role.
    fn secret_role(&self) -> SecretRole;

    /// Chooses one of the legal actions.
    fn get_action(&mut self, state: &GameState, legal_actions: &[Action]) -> Action;

    /// Digests a private observation delivered after one of this agent's moves.
    fn handle_observation(&mut self, observation: &Observation);

    /// Digests a public transition, visible to every agent.
    fn handle_transition(
        &mut self,
        old_state: &GameState,
        new_state: &GameState,
        old_hidden: &HiddenState,
        new_hidden: &HiddenState,
        moves: &[Action],
    );

    /// Receives the full role assignment at game start. Called for members of
    /// the fascist team who know each other under the rules.
    fn communicate_hidden_state(&mut self, hidden_roles: &[SecretRole]);
}
