pub use self::action::{Action, Observation};
pub use self::deck::{PolicyDeck, DECK_SIZE, NUM_FASCIST_POLICIES, NUM_LIBERAL_POLICIES};
pub use self::hidden::HiddenState;
pub use self::party::Party;
pub use self::phase::Phase;
pub use self::power::{power_track, Power};
pub use self::role::{assign_roles, party_split, possible_role_tuples, SecretRole};
use crate::error::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

mod action;
mod deck;
mod hidden;
mod party;
mod phase;
mod power;
mod role;
mod test;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;

/// Liberal policies needed for a liberal legislative victory.
pub const LIB_POLICY_WIN: usize = 5;
/// Fascist policies needed for a fascist legislative victory.
pub const FAS_POLICY_WIN: usize = 6;
/// Failed elections before the top policy is enacted by the frustrated populace.
pub const CHAOS_LIMIT: usize = 3;
/// Fascist policies after which electing Hitler chancellor ends the game.
pub const HITLER_ZONE: usize = 3;

/// Why the game ended.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum GameEndReason {
    HitlerKilled,
    HitlerElected,
    FiveLiberalPolicies,
    SixFascistPolicies,
}

impl fmt::Display for GameEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEndReason::HitlerKilled => write!(f, "hitler_killed"),
            GameEndReason::HitlerElected => write!(f, "hitler_elected"),
            GameEndReason::FiveLiberalPolicies => write!(f, "five_liberal_policies"),
            GameEndReason::SixFascistPolicies => write!(f, "six_fascist_policies"),
        }
    }
}

/// The public game state: everything every player can see.
///
/// States are immutable; every transition produces new instances.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    pub starting_num_players: usize,
    pub current_num_players: usize,
    /// Seats still in the game, in seat order.
    pub alive_players: Vec<usize>,
    pub president: usize,
    pub chancellor: Option<usize>,
    /// The president whose term was interrupted by a special election.
    pub se_prev_pres: Option<usize>,
    pub phase: Phase,
    pub fas_policy: usize,
    pub lib_policy: usize,
    /// The failed-election counter.
    pub chaos: usize,
    pub policy_deck_size: usize,
    /// The last elected government `(president, chancellor)`; the president
    /// half is cleared while only five players remain alive.
    pub prev_gov: Option<(Option<usize>, usize)>,
    /// Whether the president may still refuse a chancellor veto this session.
    pub president_veto: bool,
    /// The executive power track, indexed by `fas_policy - 1`.
    pub powers: [Power; 6],
    pub game_end: Option<Party>,
    pub game_end_reason: Option<GameEndReason>,
}

impl GameState {
    /// Creates an initial game for `num_players` seats with uniformly random
    /// roles, a shuffled deck and a random first president.
    pub fn start_state(
        num_players: usize,
        rng: &mut impl Rng,
    ) -> Result<(GameState, HiddenState), GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(GameError::InvalidPlayerCount);
        }
        let roles = assign_roles(num_players, rng);
        Self::start_state_from_roles(roles, rng)
    }

    /// Creates an initial game with the given role assignment.
    pub fn start_state_from_roles(
        hidden_roles: Vec<SecretRole>,
        rng: &mut impl Rng,
    ) -> Result<(GameState, HiddenState), GameError> {
        let num_players = hidden_roles.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(GameError::InvalidPlayerCount);
        }

        let (num_liberals, num_fascists) = party_split(num_players);
        let liberals = hidden_roles.iter().filter(|r| **r == SecretRole::Liberal).count();
        let fascists = hidden_roles.iter().filter(|r| **r == SecretRole::Fascist).count();
        let hitlers = hidden_roles.iter().filter(|r| **r == SecretRole::Hitler).count();
        if liberals != num_liberals || fascists != num_fascists - 1 || hitlers != 1 {
            return Err(GameError::InvalidRoleList);
        }

        let state = GameState {
            starting_num_players: num_players,
            current_num_players: num_players,
            alive_players: (0..num_players).collect(),
            president: rng.gen_range(0..num_players),
            chancellor: None,
            se_prev_pres: None,
            phase: Phase::Nomination,
            fas_policy: 0,
            lib_policy: 0,
            chaos: 0,
            policy_deck_size: DECK_SIZE,
            prev_gov: None,
            president_veto: true,
            powers: power_track(num_players),
            game_end: None,
            game_end_reason: None,
        };
        let hidden = HiddenState::new(hidden_roles, PolicyDeck::shuffled(rng));
        Ok((state, hidden))
    }

    /// Returns true if the game has ended.
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::End
    }

    /// The payoff for each seat at the end of the game. Winning liberals
    /// receive `1`; the fascist payoff is scaled so the game is zero-sum.
    pub fn terminal_value(&self, hidden: &HiddenState) -> Vec<f64> {
        let (num_lib, num_fas) = party_split(self.starting_num_players);
        let liberals_won = self.game_end == Some(Party::Liberal);
        let lib_amount = if liberals_won { 1.0 } else { -1.0 };
        let fas_amount = num_lib as f64 / num_fas as f64 * if liberals_won { -1.0 } else { 1.0 };
        hidden
            .hidden_roles
            .iter()
            .map(|role| match role.party() {
                Party::Liberal => lib_amount,
                Party::Fascist => fas_amount,
            })
            .collect()
    }

    /// The executive power unlocked by the most recent fascist policy.
    fn current_power(&self) -> Power {
        self.powers[self.fas_policy - 1]
    }

    /// Whether the chancellor may currently call for a veto.
    pub fn veto_available(&self) -> bool {
        self.fas_policy == FAS_POLICY_WIN - 1 && self.president_veto
    }

    /// The seats expected to submit a move this step.
    pub fn moving_players(&self) -> Vec<usize> {
        assert!(!self.is_terminal(), "the game has ended");
        match self.phase {
            Phase::Nomination | Phase::PresidentSelectPolicy | Phase::Veto => {
                vec![self.president]
            }
            Phase::PresidentPower => match self.current_power() {
                Power::None => vec![],
                _ => vec![self.president],
            },
            Phase::Vote => self.alive_players.clone(),
            Phase::ChancellorSelectPolicy => {
                vec![self.chancellor.expect("legislative session without a chancellor")]
            }
            Phase::End => unreachable!(),
        }
    }

    /// The legal actions of one of the moving players.
    pub fn legal_actions(&self, hidden: &HiddenState, player: usize) -> Vec<Action> {
        assert!(
            self.moving_players().contains(&player),
            "asked a non-moving player for legal actions"
        );
        match self.phase {
            Phase::Nomination => self
                .alive_players
                .iter()
                .copied()
                .filter(|p| *p != player && !self.in_prev_gov(*p))
                .map(|p| Action::Nominate { chancellor: p })
                .collect(),
            Phase::Vote => vec![Action::Vote { ja: true }, Action::Vote { ja: false }],
            Phase::PresidentSelectPolicy => {
                assert_eq!(hidden.proposed_policies.len(), 3);
                policy_choices(&hidden.proposed_policies)
            }
            Phase::ChancellorSelectPolicy => {
                assert_eq!(hidden.proposed_policies.len(), 2);
                let mut actions = policy_choices(&hidden.proposed_policies);
                if self.veto_available() {
                    actions.push(Action::Veto { veto: true });
                }
                actions
            }
            Phase::Veto => vec![Action::Veto { veto: true }, Action::Veto { veto: false }],
            Phase::PresidentPower => match self.current_power() {
                Power::Deckpeek => vec![Action::DeckpeekAck],
                power @ (Power::Bullet | Power::Investigate | Power::SpecialElection) => self
                    .alive_players
                    .iter()
                    .copied()
                    .filter(|p| *p != player)
                    .map(|target| match power {
                        Power::Bullet => Action::Bullet { target },
                        Power::Investigate => Action::Investigate { target },
                        Power::SpecialElection => Action::SpecialElection { target },
                        _ => unreachable!(),
                    })
                    .collect(),
                Power::None => panic!("no action for a vacant power"),
            },
            Phase::End => panic!("no legal actions in a finished game"),
        }
    }

    /// Applies the moves of all moving players, producing the next public and
    /// hidden states along with any private observation for the movers.
    ///
    /// The transition is pure apart from the supplied RNG, which is consulted
    /// only when the draw pile must be rebuilt.
    pub fn transition(
        &self,
        hidden: &HiddenState,
        moves: &[Action],
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        assert_eq!(
            moves.len(),
            self.moving_players().len(),
            "wrong number of moves submitted"
        );
        self.assert_conservation(hidden);

        match self.phase {
            Phase::Nomination => {
                let Action::Nominate { chancellor } = moves[0] else {
                    panic!("expected a nomination, got {:?}", moves[0]);
                };
                (self.nominate_transition(chancellor), hidden.clone(), None)
            }
            Phase::Vote => self.vote_transition(hidden, moves, rng),
            Phase::PresidentSelectPolicy => self.president_select_transition(hidden, moves[0]),
            Phase::ChancellorSelectPolicy => self.chancellor_select_transition(hidden, moves[0]),
            Phase::Veto => self.veto_transition(hidden, moves[0], rng),
            Phase::PresidentPower => self.president_power_transition(hidden, moves[0], rng),
            Phase::End => panic!("cannot transition a finished game"),
        }
    }

    fn nominate_transition(&self, chancellor: usize) -> GameState {
        assert!(
            self.alive_players.contains(&chancellor) && chancellor != self.president,
            "illegal chancellor nomination"
        );
        let mut next = self.clone();
        next.chancellor = Some(chancellor);
        next.phase = Phase::Vote;
        next
    }

    fn vote_transition(
        &self,
        hidden: &HiddenState,
        votes: &[Action],
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let ja_votes = votes
            .iter()
            .filter(|vote| matches!(vote, Action::Vote { ja: true }))
            .count();
        if 2 * ja_votes > self.current_num_players {
            self.vote_pass_transition(hidden, rng)
        } else {
            self.vote_fail_transition(hidden, rng)
        }
    }

    fn vote_fail_transition(
        &self,
        hidden: &HiddenState,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let (president, se_prev_pres) = self.next_president(&self.alive_players);
        if self.chaos + 1 >= CHAOS_LIMIT {
            return self.chaos_helper(hidden, president, se_prev_pres, rng);
        }

        let mut next = self.clone();
        next.chancellor = None;
        next.phase = Phase::Nomination;
        next.chaos += 1;
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        (next, hidden.clone(), None)
    }

    fn vote_pass_transition(
        &self,
        hidden: &HiddenState,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let chancellor = self.chancellor.expect("vote without a chancellor");

        if self.fas_policy >= HITLER_ZONE
            && hidden.hidden_roles[chancellor] == SecretRole::Hitler
        {
            let mut next = self.clone();
            next.phase = Phase::End;
            next.game_end = Some(Party::Fascist);
            next.game_end_reason = Some(GameEndReason::HitlerElected);
            return (next, hidden.clone(), None);
        }

        let prev_pres = (self.current_num_players > 5).then_some(self.president);
        let (proposed, new_deck) = hidden
            .policy_deck
            .draw(self.lib_policy, self.fas_policy, 3, rng);

        let mut next = self.clone();
        let mut next_hidden = hidden.clone();
        if new_deck.len() > hidden.policy_deck.len() {
            next_hidden.discard_pile.clear();
        }
        next.phase = Phase::PresidentSelectPolicy;
        next.prev_gov = Some((prev_pres, chancellor));
        next.policy_deck_size = new_deck.len();
        next_hidden.proposed_policies = proposed;
        next_hidden.policy_deck = new_deck;
        (next, next_hidden, None)
    }

    fn president_select_transition(
        &self,
        hidden: &HiddenState,
        mv: Action,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let Action::PolicyChoice { policy } = mv else {
            panic!("expected a policy choice, got {mv:?}");
        };
        let mut next_hidden = hidden.clone();
        let discarded = next_hidden
            .proposed_policies
            .iter()
            .position(|p| *p == policy)
            .expect("discarded a policy that was not drawn");
        next_hidden.proposed_policies.remove(discarded);
        next_hidden.discard_pile.push(policy);

        let mut next = self.clone();
        next.phase = Phase::ChancellorSelectPolicy;
        let observation = Observation::PresidentPass {
            policies: [next_hidden.proposed_policies[0], next_hidden.proposed_policies[1]],
        };
        (next, next_hidden, Some(observation))
    }

    fn chancellor_select_transition(
        &self,
        hidden: &HiddenState,
        mv: Action,
    ) -> (GameState, HiddenState, Option<Observation>) {
        match mv {
            Action::Veto { veto: true } => {
                let mut next = self.clone();
                next.phase = Phase::Veto;
                (next, hidden.clone(), None)
            }
            Action::PolicyChoice { policy } => {
                let mut next_hidden = hidden.clone();
                let enacted = next_hidden
                    .proposed_policies
                    .iter()
                    .position(|p| *p == policy)
                    .expect("enacted a policy that was not passed");
                next_hidden.proposed_policies.remove(enacted);
                let mut leftover = std::mem::take(&mut next_hidden.proposed_policies);
                next_hidden.discard_pile.append(&mut leftover);

                let mut next = self.clone();
                match policy {
                    Party::Fascist => next.fas_policy += 1,
                    Party::Liberal => next.lib_policy += 1,
                }
                let (game_end, game_end_reason) =
                    game_ending_policy(next.fas_policy, next.lib_policy);

                next.phase = if game_end.is_some() {
                    Phase::End
                } else if policy == Party::Fascist
                    && self.powers[next.fas_policy - 1] != Power::None
                {
                    Phase::PresidentPower
                } else {
                    Phase::Nomination
                };
                if next.phase == Phase::Nomination {
                    let (president, se_prev_pres) = self.next_president(&self.alive_players);
                    next.president = president;
                    next.se_prev_pres = se_prev_pres;
                }
                next.game_end = game_end;
                next.game_end_reason = game_end_reason;
                next.chancellor = None;
                next.chaos = 0;
                next.president_veto = true;
                (next, next_hidden, None)
            }
            _ => panic!("expected a policy choice or veto, got {mv:?}"),
        }
    }

    fn veto_transition(
        &self,
        hidden: &HiddenState,
        mv: Action,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let Action::Veto { veto } = mv else {
            panic!("expected a veto response, got {mv:?}");
        };

        if !veto {
            let mut next = self.clone();
            next.phase = Phase::ChancellorSelectPolicy;
            next.president_veto = false;
            return (next, hidden.clone(), None);
        }

        let mut next_hidden = hidden.clone();
        next_hidden.discard_pile.append(&mut next_hidden.proposed_policies);

        let (president, se_prev_pres) = self.next_president(&self.alive_players);
        if self.chaos + 1 >= CHAOS_LIMIT {
            return self.chaos_helper(&next_hidden, president, se_prev_pres, rng);
        }

        let mut next = self.clone();
        next.phase = Phase::Nomination;
        next.chancellor = None;
        next.chaos += 1;
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        (next, next_hidden, None)
    }

    fn president_power_transition(
        &self,
        hidden: &HiddenState,
        mv: Action,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        match mv {
            Action::DeckpeekAck => self.deckpeek_transition(hidden, rng),
            Action::Bullet { target } => self.bullet_transition(hidden, target),
            Action::Investigate { target } => self.investigate_transition(hidden, target),
            Action::SpecialElection { target } => self.special_election_transition(target, hidden),
            _ => panic!("expected an executive power, got {mv:?}"),
        }
    }

    fn deckpeek_transition(
        &self,
        hidden: &HiddenState,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let (president, se_prev_pres) = self.next_president(&self.alive_players);
        let (policies, new_deck) = hidden
            .policy_deck
            .peek(self.lib_policy, self.fas_policy, 3, rng);

        let mut next = self.clone();
        let mut next_hidden = hidden.clone();
        if new_deck.len() > hidden.policy_deck.len() {
            next_hidden.discard_pile.clear();
        }
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        next.phase = Phase::Nomination;
        next.policy_deck_size = new_deck.len();
        next_hidden.policy_deck = new_deck;

        let observation = Observation::DeckpeekPeek {
            policies: [policies[0], policies[1], policies[2]],
        };
        (next, next_hidden, Some(observation))
    }

    fn bullet_transition(
        &self,
        hidden: &HiddenState,
        target: usize,
    ) -> (GameState, HiddenState, Option<Observation>) {
        assert!(self.alive_players.contains(&target), "shot a dead player");

        if hidden.hidden_roles[target] == SecretRole::Hitler {
            let mut next = self.clone();
            next.phase = Phase::End;
            next.game_end = Some(Party::Liberal);
            next.game_end_reason = Some(GameEndReason::HitlerKilled);
            return (next, hidden.clone(), None);
        }

        let alive_players: Vec<usize> = self
            .alive_players
            .iter()
            .copied()
            .filter(|p| *p != target)
            .collect();
        let mut next = self.clone();
        next.alive_players = alive_players;
        next.current_num_players -= 1;
        if next.current_num_players <= 5 {
            next.prev_gov = self.prev_gov.map(|(_, chancellor)| (None, chancellor));
        }
        let (president, se_prev_pres) = self.next_president(&next.alive_players);
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        next.phase = Phase::Nomination;
        (next, hidden.clone(), None)
    }

    fn investigate_transition(
        &self,
        hidden: &HiddenState,
        target: usize,
    ) -> (GameState, HiddenState, Option<Observation>) {
        assert!(self.alive_players.contains(&target), "investigated a dead player");
        let (president, se_prev_pres) = self.next_president(&self.alive_players);

        let mut next = self.clone();
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        next.phase = Phase::Nomination;

        let observation = Observation::InvestigateResult {
            player: target,
            party: hidden.hidden_roles[target].party(),
        };
        (next, hidden.clone(), Some(observation))
    }

    fn special_election_transition(
        &self,
        target: usize,
        hidden: &HiddenState,
    ) -> (GameState, HiddenState, Option<Observation>) {
        assert!(self.alive_players.contains(&target), "appointed a dead player");
        let mut next = self.clone();
        next.president = target;
        next.se_prev_pres = Some(self.president);
        next.phase = Phase::Nomination;
        (next, hidden.clone(), None)
    }

    /// Enacts the top policy of the deck with no power after three failed
    /// elections, resetting the chaos counter and all term limits.
    fn chaos_helper(
        &self,
        hidden: &HiddenState,
        president: usize,
        se_prev_pres: Option<usize>,
        rng: &mut impl Rng,
    ) -> (GameState, HiddenState, Option<Observation>) {
        let (drawn, new_deck) = hidden
            .policy_deck
            .draw(self.lib_policy, self.fas_policy, 1, rng);

        let mut next_hidden = hidden.clone();
        if new_deck.len() > hidden.policy_deck.len() {
            next_hidden.discard_pile.clear();
        }
        next_hidden.policy_deck = new_deck;

        let mut next = self.clone();
        match drawn[0] {
            Party::Fascist => next.fas_policy += 1,
            Party::Liberal => next.lib_policy += 1,
        }
        let (game_end, game_end_reason) = game_ending_policy(next.fas_policy, next.lib_policy);
        next.phase = if game_end.is_some() {
            Phase::End
        } else {
            Phase::Nomination
        };
        next.game_end = game_end;
        next.game_end_reason = game_end_reason;
        next.chaos = 0;
        next.prev_gov = None;
        next.chancellor = None;
        next.president = president;
        next.se_prev_pres = se_prev_pres;
        next.policy_deck_size = next_hidden.policy_deck.len();
        (next, next_hidden, None)
    }

    /// The seat that takes the presidency next: the first alive seat after
    /// the current president, or after the interrupted president when a
    /// special election term just ended.
    fn next_president(&self, alive_players: &[usize]) -> (usize, Option<usize>) {
        let from = self.se_prev_pres.unwrap_or(self.president);
        let mut next = (from + 1) % self.starting_num_players;
        while !alive_players.contains(&next) {
            next = (next + 1) % self.starting_num_players;
        }
        (next, None)
    }

    fn in_prev_gov(&self, player: usize) -> bool {
        match self.prev_gov {
            Some((president, chancellor)) => president == Some(player) || chancellor == player,
            None => false,
        }
    }

    fn assert_conservation(&self, hidden: &HiddenState) {
        assert_eq!(
            self.policy_deck_size,
            hidden.policy_deck.len(),
            "deck size out of sync with the public state"
        );
        assert!(
            HiddenState::valid_policy_count(
                hidden.policy_deck.cards(),
                &hidden.discard_pile,
                &hidden.proposed_policies,
                self.fas_policy,
                self.lib_policy,
            ),
            "policy cards are not conserved"
        );
    }
}

/// Actions available over a hand of policies, one per distinct party.
fn policy_choices(policies: &[Party]) -> Vec<Action> {
    [Party::Liberal, Party::Fascist]
        .into_iter()
        .filter(|party| policies.contains(party))
        .map(|policy| Action::PolicyChoice { policy })
        .collect()
}

fn game_ending_policy(
    fas_policy: usize,
    lib_policy: usize,
) -> (Option<Party>, Option<GameEndReason>) {
    if fas_policy == FAS_POLICY_WIN {
        (Some(Party::Fascist), Some(GameEndReason::SixFascistPolicies))
    } else if lib_policy == LIB_POLICY_WIN {
        (Some(Party::Liberal), Some(GameEndReason::FiveLiberalPolicies))
    } else {
        (None, None)
    }
}
