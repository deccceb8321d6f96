use crate::domain::tournament::{
    PauseReason, TournamentDetails, TournamentError, TournamentStatus,
};
use crate::domain::{PlayerId, RoundId, TableId};
use crate::tournament::directives::TournamentAction;

/// Применить директивы по порядку, как одну транзакцию.
///
/// Работает на копии: если любая директива нарушает инвариант, турнир
/// остаётся нетронутым и ошибка уходит вызывающей стороне.
pub fn process_actions(
    t: &mut TournamentDetails,
    actions: &[TournamentAction],
    now: u64,
) -> Result<(), TournamentError> {
    if actions.is_empty() {
        return Ok(());
    }
    let mut next = t.clone();
    for action in actions {
        apply_one(&mut next, action, now).map_err(|e| {
            log::warn!("турнир {}: директива {action:?} не применена: {e}", t.id);
            e
        })?;
        log::info!("турнир {}: применена {action:?}", t.id);
    }
    *t = next;
    Ok(())
}

fn apply_one(t: &mut TournamentDetails, action: &TournamentAction, now: u64) -> Result<(), TournamentError> {
    match action {
        TournamentAction::EliminatePlayer { uid, .. } => eliminate_player(t, uid),
        TournamentAction::RemovePlayer { uid, table_id } => remove_player(t, uid, table_id),
        TournamentAction::AddPlayer { uid, table_id } => add_player(t, uid, table_id),
        TournamentAction::EliminateTable { table_id } => eliminate_table(t, table_id),
        TournamentAction::AdvanceRound { round_id } => advance_round(t, *round_id, now),
        TournamentAction::RequestPause {
            reason,
            message,
            duration_ms,
            upcoming_round_id,
        } => {
            if t.status.is_pausing() {
                log::debug!("турнир {}: пауза уже запрошена", t.id);
                return Ok(());
            }
            expect_status(t, TournamentStatus::Active)?;
            t.status = TournamentStatus::PauseRequested;
            t.pause_reason = Some(*reason);
            t.pause_message = Some(message.clone());
            t.pause_duration = *duration_ms;
            t.pause_start_timestamp = None;
            t.pause_end_timestamp = Some(now.saturating_add(*duration_ms));
            if upcoming_round_id.is_some() {
                t.upcoming_round_id = *upcoming_round_id;
            }
            Ok(())
        }
        TournamentAction::Pause {
            reason,
            message,
            duration_ms,
        } => {
            if !matches!(
                t.status,
                TournamentStatus::Active | TournamentStatus::PauseRequested
            ) {
                return Err(TournamentError::InvalidStatus {
                    expected: TournamentStatus::PauseRequested,
                    found: t.status,
                });
            }
            if t.any_active_hand() {
                return Err(TournamentError::InvariantViolation(
                    "cannot pause while a hand is in progress".into(),
                ));
            }
            t.status = TournamentStatus::Paused;
            t.pause_reason = Some(*reason);
            t.pause_message = Some(message.clone());
            t.pause_duration = *duration_ms;
            t.pause_start_timestamp = Some(now);
            t.pause_end_timestamp = Some(now.saturating_add(*duration_ms));
            Ok(())
        }
        TournamentAction::Resume => {
            expect_status(t, TournamentStatus::Paused)?;
            resume(t, now)
        }
        TournamentAction::ForceResume => {
            if !t.status.is_pausing() {
                return Err(TournamentError::InvalidStatus {
                    expected: TournamentStatus::Paused,
                    found: t.status,
                });
            }
            resume(t, now)
        }
        // Информационные директивы: состояние не меняют.
        TournamentAction::RebuyOption { .. } | TournamentAction::NextHand { .. } => Ok(()),
    }
}

fn expect_status(t: &TournamentDetails, expected: TournamentStatus) -> Result<(), TournamentError> {
    if t.status != expected {
        return Err(TournamentError::InvalidStatus {
            expected,
            found: t.status,
        });
    }
    Ok(())
}

fn eliminate_player(t: &mut TournamentDetails, uid: &PlayerId) -> Result<(), TournamentError> {
    let alive_before = t.alive_count() as u32;
    let tournament_id = t.id.clone();
    let tp = t
        .players
        .get_mut(uid)
        .ok_or_else(|| TournamentError::PlayerNotRegistered {
            player_id: uid.clone(),
            tournament_id,
        })?;
    if tp.is_removed() {
        return Err(TournamentError::InvariantViolation(format!(
            "player {uid} is already eliminated"
        )));
    }
    tp.player.removed = true;
    tp.finishing_place = Some(alive_before);
    Ok(())
}

fn remove_player(t: &mut TournamentDetails, uid: &PlayerId, table_id: &TableId) -> Result<(), TournamentError> {
    if t.table_has_active_hand(table_id) {
        return Err(TournamentError::InvariantViolation(format!(
            "cannot move {uid} off table {table_id} during a hand"
        )));
    }
    let tp = t
        .players
        .get_mut(uid)
        .filter(|tp| !tp.is_removed())
        .ok_or_else(|| TournamentError::InvariantViolation(format!("player {uid} is not seated")))?;
    if tp.table_id.as_ref() != Some(table_id) {
        return Err(TournamentError::InvariantViolation(format!(
            "player {uid} is not at table {table_id}"
        )));
    }
    tp.table_id = None;
    Ok(())
}

fn add_player(t: &mut TournamentDetails, uid: &PlayerId, table_id: &TableId) -> Result<(), TournamentError> {
    let table = t
        .tables
        .get(table_id)
        .ok_or_else(|| TournamentError::TableNotFound(table_id.clone()))?;
    if table.eliminated {
        return Err(TournamentError::InvariantViolation(format!(
            "table {table_id} is already eliminated"
        )));
    }
    if table.active_hand_id.is_some() {
        return Err(TournamentError::InvariantViolation(format!(
            "cannot seat {uid} at table {table_id} during a hand"
        )));
    }

    let taken: Vec<u8> = t.players_at_table(table_id).map(|p| p.player.position).collect();
    let position = (0..t.config.max_table_size as u8)
        .find(|pos| !taken.contains(pos))
        .ok_or_else(|| TournamentError::InvariantViolation(format!("table {table_id} is full")))?;

    let tp = t
        .players
        .get_mut(uid)
        .filter(|tp| !tp.is_removed() && tp.table_id.is_none())
        .ok_or_else(|| TournamentError::InvariantViolation(format!("player {uid} cannot be seated")))?;
    tp.table_id = Some(table_id.clone());
    tp.player.position = position;
    Ok(())
}

fn eliminate_table(t: &mut TournamentDetails, table_id: &TableId) -> Result<(), TournamentError> {
    let live = t.players_at_table(table_id).count();
    if live > 0 {
        return Err(TournamentError::InvariantViolation(format!(
            "table {table_id} still has {live} live players"
        )));
    }
    let table = t
        .tables
        .get_mut(table_id)
        .ok_or_else(|| TournamentError::TableNotFound(table_id.clone()))?;
    table.eliminated = true;
    table.active_hand_id = None;
    Ok(())
}

/// Новый блайнд-раунд: отсчёт с `now`, новые блайнды на всех столах.
fn advance_round(t: &mut TournamentDetails, round_id: RoundId, now: u64) -> Result<(), TournamentError> {
    let round = t
        .round_mut(round_id)
        .ok_or_else(|| TournamentError::InvariantViolation(format!("unknown blind round {round_id}")))?;
    round.timestamp = Some(now);
    let (small_blind, big_blind) = (round.small_blind, round.big_blind);

    t.active_round_id = Some(round_id);
    t.upcoming_round_id = None;
    for table in t.tables.values_mut() {
        table.small_blind = small_blind;
        table.big_blind = big_blind;
    }
    Ok(())
}

/// Снятие с паузы.
///
/// Пауза перехода раунда фиксирует отложенный раунд; любая другая
/// сдвигает отсчёт текущего раунда на фактическую длительность паузы.
fn resume(t: &mut TournamentDetails, now: u64) -> Result<(), TournamentError> {
    let measured = t
        .pause_start_timestamp
        .map(|start| now.saturating_sub(start))
        .unwrap_or(0);

    match (t.pause_reason, t.upcoming_round_id) {
        (Some(PauseReason::RoundAdvance), Some(upcoming)) => advance_round(t, upcoming, now)?,
        _ => {
            if let Some(round_id) = t.active_round_id {
                if let Some(ts) = t.round_mut(round_id).and_then(|r| r.timestamp.as_mut()) {
                    *ts = ts.saturating_add(measured);
                }
            }
        }
    }

    log::info!("турнир {}: пауза снята после {measured} мс", t.id);
    t.status = TournamentStatus::Active;
    t.pause_reason = None;
    t.pause_message = None;
    t.pause_duration = 0;
    t.pause_start_timestamp = None;
    t.pause_end_timestamp = None;
    Ok(())
}
