use crate::domain::blinds::last_rebuy_round;
use crate::domain::tournament::{PauseReason, TournamentDetails, TournamentStatus};
use crate::tournament::directives::TournamentAction;

pub const LAST_CHANCE_MESSAGE: &str = "Last chance to rebuy before the blinds go up";

/// Проверить расписание блайндов.
///
/// Если время текущего раунда вышло (`timestamp + interval ≤ now`), просим
/// перейти к следующему. Последний раунд с ребаями сначала даёт паузу
/// «последнего шанса», переход фиксируется при снятии с паузы.
pub fn check_tournament_blinds(t: &TournamentDetails, now: u64) -> Vec<TournamentAction> {
    if t.status != TournamentStatus::Active || t.upcoming_round_id.is_some() {
        return Vec::new();
    }
    let Some(round) = t.active_round() else {
        return Vec::new();
    };
    let Some(expires_at) = round.expires_at() else {
        return Vec::new();
    };
    if now < expires_at {
        return Vec::new();
    }
    let Some(next) = t.next_round_after(round.id) else {
        return Vec::new();
    };

    let rebuy = &t.config.rebuy;
    let last_chance = rebuy.enabled
        && rebuy.last_chance_pause_ms > 0
        && last_rebuy_round(&t.rounds) == Some(round.id);

    if last_chance {
        log::info!(
            "турнир {}: раунд {} закрывает ребаи, пауза последнего шанса",
            t.id,
            round.id
        );
        return vec![TournamentAction::RequestPause {
            reason: PauseReason::RoundAdvance,
            message: LAST_CHANCE_MESSAGE.to_string(),
            duration_ms: rebuy.last_chance_pause_ms,
            upcoming_round_id: Some(next.id),
        }];
    }

    vec![TournamentAction::AdvanceRound { round_id: next.id }]
}
