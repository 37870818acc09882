use crate::game::{GameEndReason, Party, SecretRole};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

const RETRY_LIMIT: usize = 5;

/// One finished game, appended to the results store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSummary {
    pub num_players: usize,
    pub winning_party: Party,
    pub win_reason: GameEndReason,
    pub players: Vec<PlayerSummary>,
    pub finished: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub role: SecretRole,
}

/// Aggregate win/loss counters for one agent name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentSummary {
    pub total_wins: u64,
    pub total_losses: u64,
    pub win_reasons: BTreeMap<String, u64>,
    pub loss_reasons: BTreeMap<String, u64>,
    /// The same counters split by starting player count, keyed "5p".."10p".
    pub by_player_count: BTreeMap<String, CountsByReason>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CountsByReason {
    pub wins: u64,
    pub losses: u64,
    pub win_reasons: BTreeMap<String, u64>,
    pub loss_reasons: BTreeMap<String, u64>,
}

/// Append-only tournament result store backed by sled.
pub struct ResultStore {
    db: sled::Db,
    games: sled::Tree,
    agents: sled::Tree,
}

impl ResultStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        let games = db.open_tree("game_summaries")?;
        let agents = db.open_tree("agent_summaries")?;
        Ok(Self { db, games, agents })
    }

    /// Records one finished game. Failed writes are retried with jittered
    /// backoff and eventually abandoned; the in-memory result never blocks
    /// on persistence.
    pub fn record_game(&self, summary: &GameSummary, rng: &mut impl Rng) {
        with_retries("game summary", rng, || self.append_game(summary));
        for player in &summary.players {
            let won = player.role.party() == summary.winning_party;
            with_retries("agent summary", rng, || {
                self.bump_agent(&player.name, summary, won)
            });
        }
    }

    fn append_game(&self, summary: &GameSummary) -> Result<()> {
        let key = self.db.generate_id()?;
        self.games
            .insert(key.to_be_bytes(), serde_json::to_vec(summary)?)?;
        Ok(())
    }

    fn bump_agent(&self, name: &str, summary: &GameSummary, won: bool) -> Result<()> {
        let mut agent: AgentSummary = match self.agents.get(name)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => AgentSummary::default(),
        };

        let reason = summary.win_reason.to_string();
        if won {
            agent.total_wins += 1;
            *agent.win_reasons.entry(reason.clone()).or_default() += 1;
        } else {
            agent.total_losses += 1;
            *agent.loss_reasons.entry(reason.clone()).or_default() += 1;
        }
        let by_count = agent
            .by_player_count
            .entry(format!("{}p", summary.num_players))
            .or_default();
        if won {
            by_count.wins += 1;
            *by_count.win_reasons.entry(reason).or_default() += 1;
        } else {
            by_count.losses += 1;
            *by_count.loss_reasons.entry(reason).or_default() += 1;
        }

        self.agents.insert(name, serde_json::to_vec(&agent)?)?;
        Ok(())
    }
}

fn with_retries(what: &str, rng: &mut impl Rng, mut op: impl FnMut() -> Result<()>) {
    for attempt in 1..=RETRY_LIMIT {
        match op() {
            Ok(()) => return,
            Err(err) => {
                log::warn!("could not write {what} (attempt {attempt}): {err:?}");
                thread::sleep(Duration::from_millis(attempt as u64 * rng.gen_range(10..120)));
            }
        }
    }
    log::error!("retry limit exceeded while writing {what}; moving on");
}
