use thiserror::Error;

/// The result of attempting to construct or drive a game with invalid input.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("games require between 5 and 10 players")]
    InvalidPlayerCount,
    #[error("role list does not match any legal role assignment")]
    InvalidRoleList,
    #[error("unknown role letter: {0:?}")]
    UnknownRole(String),
    #[error("unknown agent name: {0:?}")]
    UnknownAgent(String),
    #[error("agent list and role list must be the same length")]
    MismatchedRoleList,
}
