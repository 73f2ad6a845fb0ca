use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error as ThisError;

use crate::db::RepositoryError;
use crate::matches::MatchError;
use crate::models::common::ApiResponse;

pub mod friend_service;
pub mod match_service;
pub mod user_service;

pub use friend_service::FriendService;
pub use match_service::MatchService;
pub use user_service::UserService;

/// Failures surfaced by the application services
#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Storage failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Match(MatchError::NotAParticipant(_)) => StatusCode::FORBIDDEN,
            ServiceError::Match(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Repository(e) => {
                tracing::error!("Repository failure: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let forbidden = ServiceError::from(MatchError::NotAParticipant("u".to_string()));
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let duplicate = ServiceError::from(MatchError::AlreadyValidated("u".to_string()));
        assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);

        let missing = ServiceError::NotFound("Match not found".to_string());
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let storage = ServiceError::from(RepositoryError::Corrupt("bad row".to_string()));
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_message_is_kept_verbatim() {
        let err = ServiceError::from(MatchError::DuplicatePlayer("u7".to_string()));
        assert_eq!(err.to_string(), "User u7 is already part of this match");
    }
}
