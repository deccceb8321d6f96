use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tournament::TournamentError;
use crate::engine::EngineError;
use crate::infra::driver::DriverError;
use crate::infra::persistence::StoreError;

/// Ошибки внешнего API (то, что отдаём фронту / клиенту).
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error", content = "details")]
pub enum ApiError {
    /// Неправильные входные данные (например, битый JSON).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Ход отклонён движком; сообщение показывается игроку как есть.
    #[error("{message}")]
    RejectedAction { message: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// Команда не может быть выполнена в текущем состоянии.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Состояние всё время менялось под нами.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Нарушение инварианта или иная внутренняя ошибка.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::IllegalAction(_) | EngineError::NotPlayersTurn(_) => {
                ApiError::RejectedAction {
                    message: err.to_string(),
                }
            }
            EngineError::PlayerNotFound(_) => ApiError::NotFound(err.to_string()),
            EngineError::InvariantViolation(_) => ApiError::Internal(err.to_string()),
            EngineError::InvalidSeed => ApiError::BadRequest(err.to_string()),
            EngineError::NoActiveHand
            | EngineError::HandAlreadyInProgress
            | EngineError::HandNotComplete
            | EngineError::NotEnoughPlayers => ApiError::InvalidCommand(err.to_string()),
        }
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        match err {
            TournamentError::Engine(e) => e.into(),
            TournamentError::PlayerNotRegistered { .. } | TournamentError::TableNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            TournamentError::InvalidConfig(_) => ApiError::BadRequest(err.to_string()),
            TournamentError::InvariantViolation(_) => ApiError::Internal(err.to_string()),
            TournamentError::AlreadyRegistered { .. }
            | TournamentError::NotEnoughPlayers { .. }
            | TournamentError::RebuyNotAllowed(_)
            | TournamentError::InvalidStatus { .. } => ApiError::InvalidCommand(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::StaleState { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<DriverError> for ApiError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Store(e) => e.into(),
            DriverError::Tournament(e) => e.into(),
            DriverError::RetriesExhausted { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
