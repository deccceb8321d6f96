use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Street;
use crate::domain::PlayerId;

/// Тип действия игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Bet,
    Raise,
    Call,
    Check,
    Fold,
}

/// Применённое действие, как оно записано в журнал игрока.
///
/// Инвариант: `contribution = total - вклад игрока в этом раунде до действия`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub uid: PlayerId,
    pub kind: ActionKind,
    pub street: Street,
    /// Целевой уровень вклада игрока в раунде после действия.
    pub total: Chips,
    /// Сколько фишек добавлено этим действием.
    pub contribution: Chips,
    /// На сколько поднят уровень раунда (0 для call/check/fold).
    pub raise: Chips,
    pub all_in: bool,
    /// false для блайндов и принудительных действий.
    pub voluntary: bool,
    /// Вклад совпал с уровнем раунда (или игрок в олл-ине).
    pub conforming: bool,
    pub timestamp: u64,
}
