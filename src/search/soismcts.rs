use super::{rollout, weighted_choice, Determinizer, DEFAULT_ITERATIONS};
use crate::agent::{Agent, Belief};
use crate::game::{Action, GameState, HiddenState, Observation, Party, SecretRole};
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// UCB1 exploration constant, scaled to the reward magnitudes of the game.
const UCB_EXPLORATION: f64 = 2000.0;

/// The simultaneous moves of every moving player, in seat order.
type JointAction = Vec<Action>;

/// A node in the information-set tree. Reward statistics live on the child;
/// the EXP3 tables for simultaneous movers live on the parent.
#[derive(Default)]
struct Node {
    children: HashMap<JointAction, usize>,
    total_reward: f64,
    availability_count: usize,
    visit_count: usize,
    /// Cumulative importance-weighted reward per (moving player, action).
    exp3_sums: HashMap<(usize, Action), f64>,
}

impl Node {
    /// EXP3 selection probabilities for one player over its available
    /// actions.
    fn exp3_probs(&self, player: usize, available: &[Action]) -> Vec<f64> {
        let k = available.len() as f64;
        let gamma = if self.visit_count == 0 {
            1.0
        } else {
            let n = self.visit_count as f64;
            (k * k.ln() / (n * (std::f64::consts::E - 1.0))).sqrt().min(1.0)
        };
        let eta = gamma / k;
        let sum = |action: &Action| self.exp3_sums.get(&(player, *action)).copied().unwrap_or(0.0);

        available
            .iter()
            .map(|action| {
                let denom: f64 = available
                    .iter()
                    .map(|a| (eta * (sum(a) - sum(action))).min(700.0).exp())
                    .sum();
                gamma / k + (1.0 - gamma) / denom
            })
            .collect()
    }
}

/// The joint actions available in the given world.
fn compatible_children(state: &GameState, hidden: &HiddenState) -> Vec<JointAction> {
    state
        .moving_players()
        .into_iter()
        .map(|player| state.legal_actions(hidden, player))
        .multi_cartesian_product()
        .collect()
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Chooses the next joint action during descent: UCB1 when a single
    /// player moves, independent EXP3 draws when several move at once.
    fn select_child(
        &self,
        node: usize,
        state: &GameState,
        hidden: &HiddenState,
        rng: &mut impl Rng,
    ) -> JointAction {
        let node = &self.nodes[node];
        let moving_players = state.moving_players();

        if moving_players.len() == 1 {
            let compatible = compatible_children(state, hidden);
            if compatible.len() == 1 {
                return compatible[0].clone();
            }
            let ucb = |action: &JointAction| {
                let child = &self.nodes[node.children[action]];
                child.total_reward / child.visit_count as f64
                    + UCB_EXPLORATION
                        * ((child.availability_count as f64).ln() / child.visit_count as f64)
                            .sqrt()
            };
            compatible
                .into_iter()
                .max_by(|a, b| ucb(a).total_cmp(&ucb(b)))
                .unwrap()
        } else {
            moving_players
                .iter()
                .map(|player| {
                    let actions = state.legal_actions(hidden, *player);
                    if actions.len() == 1 {
                        actions[0]
                    } else {
                        let probs = node.exp3_probs(*player, &actions);
                        actions[weighted_choice(&probs, rng)]
                    }
                })
                .collect()
        }
    }

    /// Replays the recorded descent, crediting rewards and availability.
    fn backprop(
        &mut self,
        path: &[JointAction],
        states: &[(GameState, HiddenState)],
        rewards: &[f64],
    ) {
        let mut node = 0;
        for (step, action) in path.iter().enumerate() {
            let (state, hidden) = &states[step];
            let moving_players = state.moving_players();

            for sibling in compatible_children(state, hidden) {
                if let Some(child) = self.nodes[node].children.get(&sibling).copied() {
                    self.nodes[child].availability_count += 1;
                }
            }
            let chosen = self.nodes[node].children[action];
            self.nodes[chosen].visit_count += 1;

            if moving_players.len() == 1 {
                self.nodes[chosen].total_reward += rewards[moving_players[0]];
            } else {
                for (player, mv) in moving_players.iter().zip(action.iter()) {
                    let key = (*player, *mv);
                    if let Some(total) = self.nodes[node].exp3_sums.get(&key).copied() {
                        let actions = state.legal_actions(hidden, *player);
                        let probs = self.nodes[node].exp3_probs(*player, &actions);
                        let prob = probs[actions.iter().position(|a| a == mv).unwrap()];
                        self.nodes[node]
                            .exp3_sums
                            .insert(key, total + rewards[*player] / prob);
                    } else {
                        self.nodes[node].exp3_sums.insert(key, rewards[*player]);
                    }
                }
            }
            node = chosen;
        }
    }
}

/// Runs the full search: for each determinized world, descend the
/// information-set tree, expand one node, simulate to the end and replay the
/// recorded descent for backpropagation.
pub(crate) fn search_soismcts(
    state: &GameState,
    searcher: usize,
    legal_actions: &[Action],
    role_tuples: &[Vec<SecretRole>],
    deck_knowledge: &[Party],
    president_pass: &[Party],
    iterations: usize,
    rng: &mut ChaCha8Rng,
) -> Action {
    let mut tree = Tree {
        nodes: vec![Node::default()],
    };
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
    for root_hidden in determinizer {
        if state.legal_actions(&root_hidden, searcher) != legal_actions {
            skipped += 1;
            continue;
        }

        // Selection and expansion, recording every visited world so that
        // backpropagation replays exactly the descent sequence.
        let mut node = 0;
        let mut path: Vec<JointAction> = vec![];
        let mut states: Vec<(GameState, HiddenState)> = vec![(state.clone(), root_hidden)];
        loop {
            let (cur_state, cur_hidden) = states.last().unwrap().clone();
            if cur_state.is_terminal() {
                break;
            }
            let compatible = compatible_children(&cur_state, &cur_hidden);
            let unexplored: Vec<&JointAction> = compatible
                .iter()
                .filter(|a| !tree.nodes[node].children.contains_key(*a))
                .collect();

            if let Some(action) = unexplored.choose(rng) {
                let action = (*action).clone();
                let child = tree.nodes.len();
                tree.nodes.push(Node::default());
                tree.nodes[node].children.insert(action.clone(), child);
                let (next_state, next_hidden, _) = cur_state.transition(&cur_hidden, &action, rng);
                path.push(action);
                states.push((next_state, next_hidden));
                break;
            }

            let action = tree.select_child(node, &cur_state, &cur_hidden, rng);
            let child = tree.nodes[node].children[&action];
            let (next_state, next_hidden, _) = cur_state.transition(&cur_hidden, &action, rng);
            path.push(action);
            states.push((next_state, next_hidden));
            node = child;
        }

        let (leaf_state, leaf_hidden) = states.last().unwrap();
        let rewards = if leaf_state.is_terminal() {
            leaf_state.terminal_value(leaf_hidden)
        } else {
            rollout(leaf_state, leaf_hidden, rng)
        };
        tree.backprop(&path, &states, &rewards);
    }
    if skipped > 0 {
        log::debug!("skipped {skipped} inconsistent determinizations");
    }

    let root = &tree.nodes[0];
    let best = root
        .children
        .iter()
        .max_by_key(|(_, child)| tree.nodes[**child].visit_count)
        .map(|(action, _)| action.clone());
    let Some(joint) = best else {
        log::warn!("search produced no tree; falling back to a random move");
        return *legal_actions.choose(rng).unwrap();
    };

    let searcher_idx = state
        .moving_players()
        .iter()
        .position(|p| *p == searcher)
        .expect("searcher is not moving");
    joint[searcher_idx]
}

/// Single-Observer Information Set MCTS agent: a tree over the searcher's
/// information sets, with EXP3 at simultaneous decision points and UCB1
/// elsewhere.
pub struct SoIsmctsAgent {
    name: String,
    belief: Belief,
    iterations: usize,
    rng: ChaCha8Rng,
}

impl SoIsmctsAgent {
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
            name: format!("soismcts-{iterations}"),
            belief: Belief::new(player_id, num_players, secret_role),
            iterations,
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Agent for SoIsmctsAgent {
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
        let action = search_soismcts(
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
