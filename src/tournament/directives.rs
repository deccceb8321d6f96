use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::tournament::PauseReason;
use crate::domain::{PlayerId, RoundId, TableId};

/// Директива: чистые данные об изменении турнира.
///
/// Директивы только описывают изменения. Применяет их `process_actions`
/// строго в порядке списка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TournamentAction {
    /// Игрок выбыл окончательно (стек 0, ребай невозможен).
    EliminatePlayer { uid: PlayerId, table_id: Option<TableId> },
    /// Посадить игрока за стол (вторая половина пересадки).
    AddPlayer { uid: PlayerId, table_id: TableId },
    /// Поднять игрока из-за стола (первая половина пересадки).
    RemovePlayer { uid: PlayerId, table_id: TableId },
    /// Закрыть пустой стол.
    EliminateTable { table_id: TableId },
    AdvanceRound { round_id: RoundId },
    /// Пауза, как только все текущие раздачи доиграны.
    RequestPause {
        reason: PauseReason,
        message: String,
        duration_ms: u64,
        /// Раунд, переход в который отложен этой паузой.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upcoming_round_id: Option<RoundId>,
    },
    Pause {
        reason: PauseReason,
        message: String,
        duration_ms: u64,
    },
    Resume,
    /// Снять паузу, даже если столы ещё не готовы.
    ForceResume,
    /// Вылетевший игрок ещё может докупиться до `expires_at`.
    RebuyOption {
        uid: PlayerId,
        table_id: TableId,
        expires_at: u64,
    },
    /// Стол готов к следующей раздаче.
    NextHand { table_id: TableId },
}

impl TournamentAction {
    /// Пересадка игрока (или закрытие стола).
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            TournamentAction::AddPlayer { .. }
                | TournamentAction::RemovePlayer { .. }
                | TournamentAction::EliminateTable { .. }
        )
    }

    /// Стол, который затрагивает директива.
    pub fn table_id(&self) -> Option<&TableId> {
        match self {
            TournamentAction::EliminatePlayer { table_id, .. } => table_id.as_ref(),
            TournamentAction::AddPlayer { table_id, .. }
            | TournamentAction::RemovePlayer { table_id, .. }
            | TournamentAction::EliminateTable { table_id }
            | TournamentAction::RebuyOption { table_id, .. }
            | TournamentAction::NextHand { table_id } => Some(table_id),
            _ => None,
        }
    }

    /// Через сколько планировщику стоит снова вызвать оркестратор.
    pub fn delay_ms(&self, config: &EngineConfig, now: u64) -> u64 {
        match self {
            TournamentAction::RequestPause { .. } | TournamentAction::Pause { .. } => {
                config.pause_settle_delay_ms
            }
            TournamentAction::NextHand { .. } => config.next_hand_delay_ms,
            TournamentAction::RebuyOption { expires_at, .. } => expires_at.saturating_sub(now),
            _ => 0,
        }
    }
}
