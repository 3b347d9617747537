use coliseum_battle::BattleError;
use coliseum_protocol::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Battle worker has shut down")]
    Closed,

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("Invalid command: {0}")]
    Parse(#[from] ParseError),

    #[error("Automated turn task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}
