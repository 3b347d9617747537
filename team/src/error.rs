use coliseum_battle::{BattleError, MAX_ATTACKS, MAX_ROSTER};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TeamError {
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{member} knows {count} moves; at most {} allowed", MAX_ATTACKS)]
    TooManyMoves { member: String, count: usize },

    #[error("Team has {0} members; at most {} allowed", MAX_ROSTER)]
    TooManyMembers(usize),

    #[error("Team has no members")]
    Empty,

    #[error(transparent)]
    Battle(#[from] BattleError),
}

impl TeamError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        TeamError::Parse {
            line,
            message: message.into(),
        }
    }
}
