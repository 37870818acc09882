use super::{sample_tremble_move, Determinizer, DEFAULT_ITERATIONS};
use crate::agent::{Agent, Belief};
use crate::game::{Action, GameState, HiddenState, Observation, Party, SecretRole};
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A child edge: the searcher's action plus the world it landed in.
type EdgeKey = (Action, u64, u64);

/// A node in the single-player search tree, one per searcher action history.
struct Node {
    parent: Option<usize>,
    incoming_action: Option<Action>,
    kind: NodeKind,
}

enum NodeKind {
    Terminal {
        value: f64,
    },
    Interior {
        legal_actions: Vec<Action>,
        choose_counts: HashMap<Action, usize>,
        total_payoffs: HashMap<Action, f64>,
        children: HashMap<EdgeKey, usize>,
        total_choices: usize,
    },
}

impl NodeKind {
    fn interior(legal_actions: Vec<Action>) -> Self {
        let choose_counts = legal_actions.iter().map(|a| (*a, 0)).collect();
        let total_payoffs = legal_actions.iter().map(|a| (*a, 0.0)).collect();
        NodeKind::Interior {
            legal_actions,
            choose_counts,
            total_payoffs,
            children: HashMap::new(),
            total_choices: 0,
        }
    }
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new(root_actions: Vec<Action>) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                incoming_action: None,
                kind: NodeKind::interior(root_actions),
            }],
        }
    }

    /// Picks an unseen move uniformly at random, falling back to UCB1 once
    /// every move has been tried.
    fn select_move(&self, node: usize, rng: &mut impl Rng) -> Action {
        let NodeKind::Interior {
            legal_actions,
            choose_counts,
            total_payoffs,
            total_choices,
            ..
        } = &self.nodes[node].kind
        else {
            panic!("selected a move from a terminal node");
        };

        let unseen: Vec<Action> = legal_actions
            .iter()
            .copied()
            .filter(|a| choose_counts[a] == 0)
            .collect();
        if let Some(action) = unseen.choose(rng) {
            return *action;
        }

        let ucb = |action: &Action| {
            let count = choose_counts[action] as f64;
            total_payoffs[action] / count + (2.0 * (*total_choices as f64).ln() / count).sqrt()
        };
        *legal_actions
            .iter()
            .max_by(|a, b| ucb(a).total_cmp(&ucb(b)))
            .unwrap()
    }

    /// Plays the searcher's move plus sampled opponent moves, advancing the
    /// world until the searcher moves again or the game ends, and returns the
    /// child node reached.
    fn step(
        &mut self,
        node: usize,
        state: GameState,
        hidden: HiddenState,
        player: usize,
        action: Action,
        rng: &mut impl Rng,
    ) -> (usize, GameState, HiddenState, bool) {
        let moves: Vec<Action> = state
            .moving_players()
            .into_iter()
            .map(|p| {
                if p == player {
                    action
                } else {
                    sample_tremble_move(&state, &hidden, p, rng)
                }
            })
            .collect();
        let (mut state, mut hidden, _) = state.transition(&hidden, &moves, rng);

        while !state.is_terminal() && !state.moving_players().contains(&player) {
            let moves: Vec<Action> = state
                .moving_players()
                .into_iter()
                .map(|p| sample_tremble_move(&state, &hidden, p, rng))
                .collect();
            let (next_state, next_hidden, _) = state.transition(&hidden, &moves, rng);
            state = next_state;
            hidden = next_hidden;
        }

        let key = (action, hash_of(&state), hash_of(&hidden));
        let NodeKind::Interior { children, .. } = &self.nodes[node].kind else {
            panic!("stepped from a terminal node");
        };
        if let Some(child) = children.get(&key) {
            return (*child, state, hidden, false);
        }

        let kind = if state.is_terminal() {
            NodeKind::Terminal {
                value: state.terminal_value(&hidden)[player],
            }
        } else {
            NodeKind::interior(state.legal_actions(&hidden, player))
        };
        let child = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(node),
            incoming_action: Some(action),
            kind,
        });
        let NodeKind::Interior { children, .. } = &mut self.nodes[node].kind else {
            unreachable!();
        };
        children.insert(key, child);
        (child, state, hidden, true)
    }

    /// Descends from the root until a new node is created or a terminal node
    /// is reached, returning the leaf and the payoff to credit.
    fn descend(
        &mut self,
        root: usize,
        state: GameState,
        hidden: HiddenState,
        player: usize,
        rng: &mut impl Rng,
    ) -> (usize, f64) {
        let mut node = root;
        let mut state = state;
        let mut hidden = hidden;
        loop {
            if let NodeKind::Terminal { value } = &self.nodes[node].kind {
                return (node, *value);
            }
            let action = self.select_move(node, rng);
            let (child, next_state, next_hidden, is_new) =
                self.step(node, state, hidden, player, action, rng);
            if is_new {
                let payoff = match &self.nodes[child].kind {
                    NodeKind::Terminal { value } => *value,
                    NodeKind::Interior { .. } => {
                        tremble_playout(&next_state, &next_hidden, player, rng)
                    }
                };
                return (child, payoff);
            }
            node = child;
            state = next_state;
            hidden = next_hidden;
        }
    }

    /// Credits the payoff to every edge along the leaf's parent chain.
    fn backprop(&mut self, leaf: usize, payoff: f64) {
        let mut node = leaf;
        while let (Some(parent), Some(action)) =
            (self.nodes[node].parent, self.nodes[node].incoming_action)
        {
            let NodeKind::Interior {
                choose_counts,
                total_payoffs,
                total_choices,
                ..
            } = &mut self.nodes[parent].kind
            else {
                panic!("terminal node has children");
            };
            *total_choices += 1;
            *choose_counts.get_mut(&action).unwrap() += 1;
            *total_payoffs.get_mut(&action).unwrap() += payoff;
            node = parent;
        }
    }
}

/// Plays every seat with the uniform-with-tremble policy until the game
/// ends, returning the searcher's payoff.
fn tremble_playout(
    state: &GameState,
    hidden: &HiddenState,
    player: usize,
    rng: &mut impl Rng,
) -> f64 {
    let mut state = state.clone();
    let mut hidden = hidden.clone();
    while !state.is_terminal() {
        let moves: Vec<Action> = state
            .moving_players()
            .into_iter()
            .map(|p| sample_tremble_move(&state, &hidden, p, rng))
            .collect();
        let (next_state, next_hidden, _) = state.transition(&hidden, &moves, rng);
        state = next_state;
        hidden = next_hidden;
    }
    state.terminal_value(&hidden)[player]
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Runs the full search: one tree descent per determinized world. Worlds in
/// which the searcher's legal actions disagree with the public ones are
/// skipped.
pub(crate) fn search_pimc(
    state: &GameState,
    player: usize,
    legal_actions: &[Action],
    role_tuples: &[Vec<SecretRole>],
    deck_knowledge: &[Party],
    president_pass: &[Party],
    iterations: usize,
    rng: &mut ChaCha8Rng,
) -> Action {
    let mut tree = Tree::new(legal_actions.to_vec());
    let determinizer = Determinizer::new(
        state,
        legal_actions,
        role_tuples,
        deck_knowledge,
        president_pass,
        iterations,
        ChaCha8Rng::seed_from_u64(rng.gen()),
    );

    let mut skipped = 0usize;
    for hidden in determinizer {
        if state.legal_actions(&hidden, player) != legal_actions {
            skipped += 1;
            continue;
        }
        let (leaf, payoff) = tree.descend(0, state.clone(), hidden, player, rng);
        tree.backprop(leaf, payoff);
    }
    if skipped > 0 {
        log::debug!("skipped {skipped} inconsistent determinizations");
    }

    tree.select_move(0, rng)
}

/// Perfect-Information Monte Carlo agent: repeatedly determinizes the hidden
/// world and runs UCB1 over its own action tree against uniformly trembling
/// opponents.
pub struct PimcAgent {
    name: String,
    belief: Belief,
    iterations: usize,
    rng: ChaCha8Rng,
}

impl PimcAgent {
    pub fn new(player_id: usize, num_players: usize, secret_role: SecretRole) -> Self {
        Self::with_iterations(player_id, num_players, secret_role, DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(
        player_id: usize,
        num_players: usize,
        secret_role: SecretRole,
        iterations: usize,
    ) -> Self {
        Self {
            name: format!("pimc-{iterations}"),
            belief: Belief::new(player_id, num_players, secret_role),
            iterations,
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Agent for PimcAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn player_id(&self) -> usize {
        self.belief.player_id
    }

    fn secret_role(&self) -> SecretRole {
        self.belief.secret_role
    }

    fn get_action(&mut self, state: &GameState, legal_actions: &[Action]) -> Action {
        if legal_actions.len() == 1 {
            return legal_actions[0];
        }
        let action = search_pimc(
            state,
            self.belief.player_id,
            legal_actions,
            &self.belief.hidden_role_beliefs,
            &self.belief.deck_knowledge,
            &self.belief.president_pass,
            self.iterations,
            &mut self.rng,
        );
        log::info!("{}:{} chose {:?}", self.name, self.belief.player_id, action);
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::GameState;

    #[test]
    fn search_returns_a_legal_nomination() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (state, hidden) = GameState::start_state(5, &mut rng).unwrap();
        let mut agent = PimcAgent::with_iterations(state.president, 5,
            hidden.hidden_roles[state.president], 30);
        let legal_actions = state.legal_actions(&hidden, state.president);
        let action = agent.get_action(&state, &legal_actions);
        assert!(legal_actions.contains(&action));
    }
}
