use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, TableId};
use crate::engine::ProposedAction;
use crate::infra::driver::TournamentDriver;
use crate::infra::persistence::TournamentStore;
use crate::infra::rng::fresh_secure_seed;
use crate::tournament::AdvanceContext;

use super::dto::CommandResponse;
use super::errors::ApiError;

/// Команда верхнего уровня над одним турниром.
///
/// Время приходит снаружи (`now`, мс): движок сам часы не читает.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TournamentCommand {
    /// Рассадка игроков и первый уровень блайндов.
    StartTournament { now: u64 },

    /// Ход игрока.
    PlayerAction {
        table_id: TableId,
        action: ProposedAction,
        now: u64,
        /// Если не задан, берётся свежий случайный.
        #[serde(default)]
        secure_seed: Option<u32>,
    },

    /// Вызов по таймеру: автоходы, таймауты, новая раздача.
    Advance {
        table_id: TableId,
        now: u64,
        #[serde(default)]
        secure_seed: Option<u32>,
    },

    Rebuy { player_id: PlayerId, now: u64 },

    DeclineRebuy { player_id: PlayerId },

    /// Игрок вернулся за стол.
    MarkArrived { player_id: PlayerId },

    RequestPause {
        message: String,
        duration_ms: u64,
        now: u64,
    },

    Resume { now: u64 },

    ForceResume { now: u64 },
}

/// Разобрать команду из JSON.
pub fn parse_command(json: &str) -> Result<TournamentCommand, ApiError> {
    Ok(serde_json::from_str(json)?)
}

/// Выполнить команду через драйвер.
///
/// `viewer` определяет, чьи карманные карты попадут в ответ.
pub fn execute_command<S: TournamentStore>(
    driver: &mut TournamentDriver<S>,
    command: TournamentCommand,
    viewer: Option<&str>,
) -> Result<CommandResponse, ApiError> {
    match command {
        TournamentCommand::StartTournament { now } => {
            let tables = driver.start(now)?;
            Ok(CommandResponse::Started { tables })
        }
        TournamentCommand::PlayerAction {
            table_id,
            action,
            now,
            secure_seed,
        } => {
            let ctx = AdvanceContext {
                now,
                secure_seed: secure_seed.unwrap_or_else(fresh_secure_seed),
            };
            let viewer = viewer.or(Some(action.uid.as_str()));
            let outcome = driver.advance(&table_id, Some(&action), &ctx).map_err(|e| {
                log::debug!("стол {table_id}: ход {action:?} отклонён: {e}");
                e
            })?;
            advanced(&outcome, viewer, now)
        }
        TournamentCommand::Advance {
            table_id,
            now,
            secure_seed,
        } => {
            let ctx = AdvanceContext {
                now,
                secure_seed: secure_seed.unwrap_or_else(fresh_secure_seed),
            };
            let outcome = driver.advance(&table_id, None, &ctx)?;
            advanced(&outcome, viewer, now)
        }
        TournamentCommand::Rebuy { player_id, now } => {
            driver.rebuy(&player_id, now)?;
            Ok(CommandResponse::Ok)
        }
        TournamentCommand::DeclineRebuy { player_id } => {
            driver.decline_rebuy(&player_id)?;
            Ok(CommandResponse::Ok)
        }
        TournamentCommand::MarkArrived { player_id } => {
            driver.mark_arrived(&player_id)?;
            Ok(CommandResponse::Ok)
        }
        TournamentCommand::RequestPause {
            message,
            duration_ms,
            now,
        } => {
            let directives = driver.request_pause(&message, duration_ms, now)?;
            Ok(CommandResponse::Directives { directives })
        }
        TournamentCommand::Resume { now } => {
            let directives = driver.resume(now)?;
            Ok(CommandResponse::Directives { directives })
        }
        TournamentCommand::ForceResume { now } => {
            let directives = driver.force_resume(now)?;
            Ok(CommandResponse::Directives { directives })
        }
    }
}

fn advanced(
    outcome: &crate::tournament::AdvanceOutcome,
    viewer: Option<&str>,
    now: u64,
) -> Result<CommandResponse, ApiError> {
    CommandResponse::advanced(outcome, viewer, now)
        .ok_or_else(|| ApiError::Internal("orchestrator returned no table".into()))
}
