//! Пауза турнира: запрос, вступление в силу, снятие.
//!
//! `PauseRequested` -> `Paused`, как только ни за одним столом не идёт
//! раздача. Пауза ребаланса снимается, когда пересаживать больше некого;
//! пауза перехода раунда и административная — по `pause_end_timestamp`.

use crate::domain::tournament::{PauseReason, TournamentDetails, TournamentError, TournamentStatus};
use crate::tournament::apply::process_actions;
use crate::tournament::directives::TournamentAction;

/// Директивы паузы для текущего состояния.
///
/// `moves_pending` — ребалансер ещё хочет кого-то пересадить.
pub fn pause_directives(t: &TournamentDetails, now: u64, moves_pending: bool) -> Vec<TournamentAction> {
    match t.status {
        TournamentStatus::PauseRequested if !t.any_active_hand() => {
            vec![TournamentAction::Pause {
                reason: t.pause_reason.unwrap_or(PauseReason::Administrative),
                message: t.pause_message.clone().unwrap_or_default(),
                duration_ms: t.pause_duration,
            }]
        }
        TournamentStatus::Paused => {
            let due = match t.pause_reason {
                Some(PauseReason::Rebalance) => !moves_pending,
                _ => t.pause_end_timestamp.map_or(true, |end| now >= end),
            };
            if due {
                vec![TournamentAction::Resume]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Пауза, выставленная администратором.
pub fn request_administrative_pause(
    t: &mut TournamentDetails,
    message: impl Into<String>,
    duration_ms: u64,
    now: u64,
) -> Result<Vec<TournamentAction>, TournamentError> {
    if t.status != TournamentStatus::Active {
        return Err(TournamentError::InvalidStatus {
            expected: TournamentStatus::Active,
            found: t.status,
        });
    }
    let directives = vec![TournamentAction::RequestPause {
        reason: PauseReason::Administrative,
        message: message.into(),
        duration_ms,
        upcoming_round_id: None,
    }];
    process_actions(t, &directives, now)?;
    Ok(directives)
}

/// Снять паузу (турнир должен быть в `Paused`).
pub fn resume(t: &mut TournamentDetails, now: u64) -> Result<Vec<TournamentAction>, TournamentError> {
    let directives = vec![TournamentAction::Resume];
    process_actions(t, &directives, now)?;
    Ok(directives)
}

/// Снять паузу или отменить запрос, даже если раздачи ещё идут.
pub fn force_resume(t: &mut TournamentDetails, now: u64) -> Result<Vec<TournamentAction>, TournamentError> {
    let directives = vec![TournamentAction::ForceResume];
    process_actions(t, &directives, now)?;
    Ok(directives)
}
