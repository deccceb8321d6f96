use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PlayerId;

/// Почему действие отклонено правилами ставок.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IllegalActionReason {
    /// Сумма не число (NaN/бесконечность) или дробная.
    NonNumericAmount,
    NegativeAmount,
    /// Нельзя чекать, когда есть ставка.
    CannotCheck,
    /// Нечего уравнивать.
    NothingToCall,
    /// Бет/рейз меньше минимального и это не олл-ин.
    BelowMinimumRaise,
    PlayerFolded,
    PlayerAllIn,
}

impl std::fmt::Display for IllegalActionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            IllegalActionReason::NonNumericAmount => "сумма должна быть целым числом",
            IllegalActionReason::NegativeAmount => "сумма не может быть отрицательной",
            IllegalActionReason::CannotCheck => "нельзя чек: нужно уравнять ставку",
            IllegalActionReason::NothingToCall => "нечего уравнивать",
            IllegalActionReason::BelowMinimumRaise => "ставка меньше минимального рейза",
            IllegalActionReason::PlayerFolded => "игрок уже сбросил карты",
            IllegalActionReason::PlayerAllIn => "игрок уже в олл-ине",
        };
        f.write_str(text)
    }
}

/// Ошибки покерного движка.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Пустой seed колоды")]
    InvalidSeed,

    #[error("Недопустимое действие: {0}")]
    IllegalAction(IllegalActionReason),

    #[error("Сейчас не ход игрока {0}")]
    NotPlayersTurn(PlayerId),

    #[error("Раздача не активна")]
    NoActiveHand,

    #[error("Раздача уже идёт")]
    HandAlreadyInProgress,

    #[error("Раздача ещё не завершена")]
    HandNotComplete,

    #[error("Недостаточно активных игроков для раздачи")]
    NotEnoughPlayers,

    #[error("Игрок {0} не найден за столом")]
    PlayerNotFound(PlayerId),

    /// Состояние испорчено выше по течению: транзакцию нужно прервать.
    #[error("Нарушен инвариант: {0}")]
    InvariantViolation(String),
}

impl From<IllegalActionReason> for EngineError {
    fn from(reason: IllegalActionReason) -> Self {
        EngineError::IllegalAction(reason)
    }
}
