use crate::agent::Agent;
use crate::game::{Action, GameState, HiddenState};
use rand::Rng;

/// Drives a game to completion: collects moves from the moving players,
/// applies the transition, routes the private observation to the movers and
/// the public transition to every agent.
pub fn run_game(
    state: GameState,
    hidden: HiddenState,
    agents: &mut [Box<dyn Agent>],
    rng: &mut impl Rng,
) -> (Vec<f64>, GameState) {
    let mut state = state;
    let mut hidden = hidden;
    log::info!(
        "game started with {} players, president {}",
        state.starting_num_players,
        state.president
    );

    while !state.is_terminal() {
        log::debug!("state: {state:?}");
        log::debug!("hidden: {hidden:?}");

        let moving_players = state.moving_players();
        let moves: Vec<Action> = moving_players
            .iter()
            .map(|player| {
                let legal_actions = state.legal_actions(&hidden, *player);
                agents[*player].get_action(&state, &legal_actions)
            })
            .collect();

        let (new_state, new_hidden, observation) = state.transition(&hidden, &moves, rng);

        if let Some(observation) = &observation {
            for player in &moving_players {
                agents[*player].handle_observation(observation);
            }
        }
        for agent in agents.iter_mut() {
            agent.handle_transition(&state, &new_state, &hidden, &new_hidden, &moves);
        }

        state = new_state;
        hidden = new_hidden;
    }

    let payoffs = state.terminal_value(&hidden);
    log::info!(
        "game ended in a {} victory ({})",
        state.game_end.unwrap(),
        state.game_end_reason.unwrap()
    );
    (payoffs, state)
}
