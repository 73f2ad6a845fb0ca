use thiserror::Error as ThisError;

/// Rejections raised by the match lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum MatchError {
    #[error("User {0} is not a participant in this match")]
    NotAParticipant(String),

    #[error("User {0} has already validated this match")]
    AlreadyValidated(String),

    #[error("User {0} is already part of this match")]
    DuplicatePlayer(String),

    #[error("Invalid team '{0}', expected A or B")]
    InvalidTeam(String),

    #[error("Invalid {field} value {value}, stats cannot be negative")]
    NegativeStat { field: &'static str, value: i64 },

    #[error("Invalid {field} value {value}, at most {max} allowed")]
    StatTooLarge {
        field: &'static str,
        value: i64,
        max: u32,
    },
}
