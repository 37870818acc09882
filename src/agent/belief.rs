use crate::game::{
    possible_role_tuples, Action, GameState, HiddenState, Observation, Party, Phase, SecretRole,
};
use rand::Rng;

/// What one agent knows about the hidden world: the role assignments still
/// consistent with every observation so far, plus any deck knowledge gained
/// through the legislative session or a deck peek.
#[derive(Clone, Debug)]
pub struct Belief {
    pub player_id: usize,
    pub secret_role: SecretRole,
    /// Role-tuple hypotheses compatible with everything observed.
    pub hidden_role_beliefs: Vec<Vec<SecretRole>>,
    /// The top of the draw pile as last revealed by a deck peek, top first.
    pub deck_knowledge: Vec<Party>,
    /// The two cards handed to the chancellor, remembered by the president
    /// through the veto exchange.
    pub president_pass: Vec<Party>,
}

impl Belief {
    pub fn new(player_id: usize, num_players: usize, secret_role: SecretRole) -> Self {
        let mut belief = Self {
            player_id,
            secret_role,
            hidden_role_beliefs: possible_role_tuples(num_players),
            deck_knowledge: vec![],
            president_pass: vec![],
        };
        belief.filter_on_role(player_id, secret_role);
        belief
    }

    /// Collapses the role beliefs to the one true assignment. Used for the
    /// fascist team reveal at game start.
    pub fn communicate(&mut self, hidden_roles: &[SecretRole]) {
        self.hidden_role_beliefs = vec![hidden_roles.to_vec()];
        log::debug!("player {} was told the full role assignment", self.player_id);
    }

    pub fn handle_observation(&mut self, observation: &Observation) {
        match observation {
            Observation::DeckpeekPeek { policies } => self.deck_knowledge = policies.to_vec(),
            Observation::InvestigateResult { player, party } => {
                self.filter_on_party(*player, *party)
            }
            Observation::PresidentPass { policies } => self.president_pass = policies.to_vec(),
        }
    }

    pub fn handle_transition(
        &mut self,
        old_state: &GameState,
        new_state: &GameState,
        old_hidden: &HiddenState,
        new_hidden: &HiddenState,
        moves: &[Action],
        rng: &mut impl Rng,
    ) {
        self.filter_on_terminal(old_state, new_state, old_hidden, moves, rng);

        let old_len = old_hidden.policy_deck.len();
        let new_len = new_hidden.policy_deck.len();
        if new_len > old_len {
            // A reshuffle invalidates whatever was known about the deck top.
            self.deck_knowledge.clear();
        } else if old_len > new_len {
            let drawn = (old_len - new_len).min(self.deck_knowledge.len());
            self.deck_knowledge.drain(..drawn);
        }

        if !matches!(new_state.phase, Phase::ChancellorSelectPolicy | Phase::Veto) {
            self.president_pass.clear();
        }
    }

    /// Keeps only the hypotheses that assign `role` to `player`.
    pub fn filter_on_role(&mut self, player: usize, role: SecretRole) {
        self.hidden_role_beliefs.retain(|roles| roles[player] == role);
    }

    /// Keeps only the hypotheses that put `player` in `party`.
    pub fn filter_on_party(&mut self, player: usize, party: Party) {
        self.hidden_role_beliefs.retain(|roles| roles[player].party() == party);
    }

    /// Discards hypotheses under which the observed transition would have
    /// ended the game when in fact it did not. A survived assassination, for
    /// instance, rules out every world in which the target was Hitler.
    fn filter_on_terminal(
        &mut self,
        old_state: &GameState,
        new_state: &GameState,
        old_hidden: &HiddenState,
        moves: &[Action],
        rng: &mut impl Rng,
    ) {
        if new_state.is_terminal() {
            return;
        }
        self.hidden_role_beliefs.retain(|roles| {
            let mut world = old_hidden.clone();
            world.hidden_roles = roles.clone();
            let (next, _, _) = old_state.transition(&world, moves, rng);
            !next.is_terminal()
        });
    }
}
