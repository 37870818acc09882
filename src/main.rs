use crate::agent::{Agent, RandomAgent, SelfishAgent};
use crate::error::GameError;
use crate::game::{possible_role_tuples, GameState, SecretRole, MAX_PLAYERS, MIN_PLAYERS};
use crate::runner::run_game;
use crate::search::{PimcAgent, SoIsmctsAgent};
use crate::stats::{GameSummary, PlayerSummary, ResultStore};
use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::str::FromStr;

mod agent;
mod error;
mod game;
mod runner;
mod search;
mod stats;

const AGENT_NAMES: [&str; 4] = ["random", "selfish", "soismcts", "pimc"];

/// Secret Hitler bot tournament driver.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Agents, one per seat: random, selfish, soismcts or pimc
    #[arg(required_unless_present = "shuffle_agents")]
    agents: Vec<String>,

    /// Fix the secret role of each seat, e.g. "l,,f,h," (empty letters are
    /// unconstrained)
    #[arg(short, long)]
    roles: Option<String>,

    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log: String,

    /// Pick a random lineup of agents of random size each game
    #[arg(long)]
    shuffle_agents: bool,

    /// Append results to a sled store at this path
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = log::LevelFilter::from_str(&args.log)
        .ok()
        .with_context(|| format!("invalid log level: {}", args.log))?;
    env_logger::Builder::new().filter_level(level).try_init().ok();

    let store = args.store.as_deref().map(ResultStore::open).transpose()?;
    let mut rng = ChaCha8Rng::from_entropy();

    for game_idx in 0..args.games {
        log::info!("==== game {game_idx} started ====");

        let agent_names: Vec<String> = if args.shuffle_agents {
            let count = rng.gen_range(MIN_PLAYERS..=MAX_PLAYERS);
            (0..count)
                .map(|_| AGENT_NAMES.choose(&mut rng).unwrap().to_string())
                .collect()
        } else {
            args.agents.clone()
        };
        log::info!("agents: {agent_names:?}");

        let num_players = agent_names.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            bail!(GameError::InvalidPlayerCount);
        }

        let constraints = parse_role_constraints(args.roles.as_deref(), num_players)?;
        let hidden_roles = sample_roles(&constraints, num_players, &mut rng)?;

        let mut agents = agent_names
            .iter()
            .zip(&hidden_roles)
            .enumerate()
            .map(|(seat, (name, role))| build_agent(name, seat, num_players, *role))
            .collect::<Result<Vec<_>, GameError>>()?;

        let (state, hidden) = GameState::start_state_from_roles(hidden_roles.clone(), &mut rng)?;

        // The fascist team (and Hitler in small games) know each other.
        for agent in agents.iter_mut() {
            let role = agent.secret_role();
            if role == SecretRole::Fascist || (num_players < 7 && role == SecretRole::Hitler) {
                agent.communicate_hidden_state(&hidden.hidden_roles);
            }
        }

        let (payoffs, final_state) = run_game(state, hidden, &mut agents, &mut rng);
        log::info!("payoffs: {payoffs:?}");

        if let Some(store) = &store {
            let summary = GameSummary {
                num_players,
                winning_party: final_state.game_end.unwrap(),
                win_reason: final_state.game_end_reason.unwrap(),
                players: agents
                    .iter()
                    .zip(&hidden_roles)
                    .map(|(agent, role)| PlayerSummary {
                        name: agent.name().to_owned(),
                        role: *role,
                    })
                    .collect(),
                finished: Utc::now(),
            };
            store.record_game(&summary, &mut rng);
        }
    }

    Ok(())
}

/// Parses the `--roles` list into one optional constraint per seat.
fn parse_role_constraints(
    roles: Option<&str>,
    num_players: usize,
) -> anyhow::Result<Vec<Option<SecretRole>>> {
    let Some(roles) = roles else {
        return Ok(vec![None; num_players]);
    };
    let constraints = roles
        .split(',')
        .map(|letter| match letter.trim() {
            "" => Ok(None),
            letter => SecretRole::from_str(letter).map(Some),
        })
        .collect::<Result<Vec<_>, GameError>>()?;
    if constraints.len() != num_players {
        bail!(GameError::MismatchedRoleList);
    }
    Ok(constraints)
}

/// Picks a uniformly random role assignment among those satisfying the
/// constraints.
fn sample_roles(
    constraints: &[Option<SecretRole>],
    num_players: usize,
    rng: &mut impl Rng,
) -> anyhow::Result<Vec<SecretRole>> {
    let candidates: Vec<Vec<SecretRole>> = possible_role_tuples(num_players)
        .into_iter()
        .filter(|tuple| {
            tuple
                .iter()
                .zip(constraints)
                .all(|(role, constraint)| constraint.map_or(true, |c| *role == c))
        })
        .collect();
    match candidates.choose(rng) {
        Some(tuple) => Ok(tuple.clone()),
        None => bail!(GameError::InvalidRoleList),
    }
}

fn build_agent(
    name: &str,
    player_id: usize,
    num_players: usize,
    role: SecretRole,
) -> Result<Box<dyn Agent>, GameError> {
    Ok(match name {
        "random" => Box::new(RandomAgent::new(player_id, num_players, role)),
        "selfish" => Box::new(SelfishAgent::new(player_id, num_players, role)),
        "soismcts" => Box::new(SoIsmctsAgent::new(player_id, num_players, role)),
        "pimc" => Box::new(PimcAgent::new(player_id, num_players, role)),
        _ => return Err(GameError::UnknownAgent(name.to_owned())),
    })
}
