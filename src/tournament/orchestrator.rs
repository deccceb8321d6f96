//! Оркестратор турнира: один шаг для одного стола.
//!
//! `advance_tournament_hand(tournament, game, action, ctx)`:
//!   1. продвигает раздачу за столом (действие игрока, автоход за
//!      отошедшего, таймаут);
//!   2. по завершении раздачи зачисляет выплаты и переносит стеки в турнир;
//!   3. собирает директивы (ребаланс, блайнды, пауза) и применяет их;
//!   4. проверяет конец турнира;
//!   5. синхронизирует состав стола и, если можно, начинает новую раздачу.
//!
//! Функция чистая: на вход снимки, на выход новые снимки + директивы.

use serde::{Deserialize, Serialize};

use crate::domain::table::Game;
use crate::domain::tournament::{TournamentDetails, TournamentError, TournamentStatus};
use crate::domain::TableId;
use crate::engine::{
    apply_action, apply_forced_action, apply_payouts, enforce_timeout, start_hand, EngineError,
    ProposedAction,
};
use crate::infra::ids::hand_id;
use crate::tournament::apply::process_actions;
use crate::tournament::blinds::check_tournament_blinds;
use crate::tournament::directives::TournamentAction;
use crate::tournament::pause::pause_directives;
use crate::tournament::rebalance::rebalance;
use crate::tournament::rebalance_fast::rebalance_performant;
use crate::tournament::registration::{check_tournament_end, sync_game_roster};

/// Внешний контекст вызова: часы и секрет для колоды.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvanceContext {
    pub now: u64,
    pub secure_seed: u32,
}

/// Результат шага.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdvanceOutcome {
    pub tournament: TournamentDetails,
    pub game: Option<Game>,
    /// Директивы, применённые на этом шаге, в порядке применения.
    pub directives: Vec<TournamentAction>,
    /// Через сколько мс вызвать оркестратор снова без действия игрока.
    pub auto_advance_duration_ms: Option<u64>,
    /// Столы, для которых нужен повторный вызов.
    pub auto_advance_games: Vec<TableId>,
}

impl AdvanceOutcome {
    fn unchanged(tournament: &TournamentDetails, game: Option<&Game>) -> Self {
        Self {
            tournament: tournament.clone(),
            game: game.cloned(),
            directives: Vec::new(),
            auto_advance_duration_ms: None,
            auto_advance_games: Vec::new(),
        }
    }
}

/// Выбрать ребалансер по флагу конфигурации.
pub fn run_rebalance(t: &TournamentDetails, now: u64) -> Result<Vec<TournamentAction>, TournamentError> {
    if t.config.enable_performant_rebalances {
        rebalance_performant(t, now)
    } else {
        rebalance(t, now)
    }
}

pub fn advance_tournament_hand(
    tournament: &TournamentDetails,
    game: Option<&Game>,
    action: Option<&ProposedAction>,
    ctx: &AdvanceContext,
) -> Result<AdvanceOutcome, TournamentError> {
    if tournament.status.is_inert() {
        log::debug!(
            "турнир {} в статусе {:?}, шаг пропущен",
            tournament.id,
            tournament.status
        );
        return Ok(AdvanceOutcome::unchanged(tournament, game));
    }

    let now = ctx.now;
    let mut t = tournament.clone();
    let mut g = game.cloned();
    let mut directives = Vec::new();
    let mut hints = Hints::default();

    if let Some(game) = g.as_mut() {
        if !t.tables.contains_key(&game.id) {
            return Err(TournamentError::TableNotFound(game.id.clone()));
        }
        let completed = step_hand(&mut t, game, action, now, &mut hints)?;
        if completed {
            directives.extend(rebuy_options(&t, &game.id, now));
        }
    } else if action.is_some() {
        return Err(EngineError::NoActiveHand.into());
    }

    let lifecycle = lifecycle_directives(&t, now)?;
    directives.extend(lifecycle);
    process_actions(&mut t, &directives, now)?;

    check_tournament_end(&mut t, now);

    if let Some(game) = g.as_mut() {
        sync_game_roster(&t, game);
        maybe_start_hand(&mut t, game, &mut directives, ctx, &mut hints)?;
    }

    for d in &directives {
        hints.delay(d.delay_ms(&t.config, now));
        match d {
            TournamentAction::NextHand { table_id } | TournamentAction::RebuyOption { table_id, .. } => {
                hints.table(table_id)
            }
            TournamentAction::Resume | TournamentAction::ForceResume | TournamentAction::AdvanceRound { .. } => {
                for table in t.live_tables() {
                    hints.table(&table.id);
                }
            }
            _ => {}
        }
    }
    if t.status == TournamentStatus::Paused {
        if let Some(end) = t.pause_end_timestamp {
            hints.delay(end.saturating_sub(now));
        }
        if let Some(game) = g.as_ref() {
            hints.table(&game.id);
        }
    }
    if t.status.is_inert() {
        hints = Hints::default();
    }

    Ok(AdvanceOutcome {
        tournament: t,
        game: g,
        directives,
        auto_advance_duration_ms: hints.duration,
        auto_advance_games: hints.games,
    })
}

#[derive(Default)]
struct Hints {
    duration: Option<u64>,
    games: Vec<TableId>,
}

impl Hints {
    fn delay(&mut self, ms: u64) {
        self.duration = Some(self.duration.map_or(ms, |cur| cur.max(ms)));
    }

    fn table(&mut self, id: &TableId) {
        if !self.games.contains(id) {
            self.games.push(id.clone());
        }
    }
}

/// Продвинуть раздачу за столом. `true`, если раздача завершилась.
fn step_hand(
    t: &mut TournamentDetails,
    game: &mut Game,
    action: Option<&ProposedAction>,
    now: u64,
    hints: &mut Hints,
) -> Result<bool, TournamentError> {
    let timeout = t.config.action_timeout_ms;
    let Some(hand) = game.active_hand_mut() else {
        if action.is_some() {
            return Err(EngineError::NoActiveHand.into());
        }
        return Ok(false);
    };

    let acting = hand.acting_player_id.clone();
    let acting_away = acting
        .as_ref()
        .and_then(|uid| game_player_away(t, uid))
        .unwrap_or(false);

    match action {
        Some(proposal) => {
            apply_action(hand, proposal, now)?;
            if let Some(p) = game.players.get_mut(&proposal.uid) {
                p.away = false;
            }
            if let Some(tp) = t.players.get_mut(&proposal.uid) {
                tp.player.away = false;
            }
        }
        None if acting_away => {
            apply_forced_action(hand, now)?;
        }
        None if hand.is_timed_out(now, timeout) => {
            enforce_timeout(game, now)?;
            if let Some(uid) = &acting {
                if let Some(tp) = t.players.get_mut(uid) {
                    tp.player.away = true;
                }
            }
        }
        None => {}
    }

    let hand_complete = game.hand.as_ref().map(|h| h.is_complete()).unwrap_or(false);
    if hand_complete && game.has_active_hand() {
        apply_payouts(game, now)?;
        mirror_stacks(t, game);
        if let Some(table) = t.tables.get_mut(&game.id) {
            table.active_hand_id = None;
        }
        return Ok(true);
    }

    if let Some(table) = t.tables.get_mut(&game.id) {
        table.active_hand_id = game.active_hand_id.clone();
    }
    schedule_turn(t, game, now, hints);
    Ok(false)
}

fn game_player_away(t: &TournamentDetails, uid: &str) -> Option<bool> {
    t.players.get(uid).map(|tp| tp.player.away)
}

/// Стеки игроков раздачи переносятся в турнир.
///
/// Только участники раздачи: ребай вылетевшего, сделанный по ходу
/// раздачи, не должен затираться нулём со стола.
fn mirror_stacks(t: &mut TournamentDetails, game: &Game) {
    let Some(hand) = game.hand.as_ref() else {
        return;
    };
    for (uid, state) in &hand.players {
        if let (Some(tp), Some(p)) = (t.players.get_mut(uid), game.players.get(uid)) {
            tp.last_hand_stack = state.starting_stack;
            tp.player.stack = p.stack;
            tp.player.busted_at = p.busted_at;
            tp.player.away = p.away;
        }
    }
}

/// Когда снова позвать оркестратор ради текущего хода.
fn schedule_turn(t: &TournamentDetails, game: &Game, now: u64, hints: &mut Hints) {
    let Some(hand) = game.active_hand() else {
        return;
    };
    let Some(uid) = hand.acting_player_id.as_ref() else {
        return;
    };
    let away = game_player_away(t, uid).unwrap_or(false);
    let delay = if away {
        t.config.away_action_delay_ms
    } else {
        hand.action_deadline(t.config.action_timeout_ms)
            .map(|deadline| deadline.saturating_sub(now))
            .unwrap_or(0)
    };
    hints.delay(delay);
    hints.table(&game.id);
}

/// Вылетевшие в этой раздаче, которые ещё могут докупиться.
fn rebuy_options(t: &TournamentDetails, table_id: &TableId, now: u64) -> Vec<TournamentAction> {
    t.players_at_table(table_id)
        .filter(|tp| tp.player.stack.is_zero() && t.can_rebuy(tp.id(), now))
        .map(|tp| TournamentAction::RebuyOption {
            uid: tp.id().clone(),
            table_id: table_id.clone(),
            expires_at: tp
                .player
                .busted_at
                .unwrap_or(now)
                .saturating_add(t.config.rebuy.window_ms),
        })
        .collect()
}

/// Ребаланс + блайнды + пауза.
fn lifecycle_directives(t: &TournamentDetails, now: u64) -> Result<Vec<TournamentAction>, TournamentError> {
    let mut directives = run_rebalance(t, now)?;
    let moves_pending = directives
        .iter()
        .any(|d| d.is_move() || matches!(d, TournamentAction::RequestPause { .. }));

    // Переход раунда ждёт, пока ребаланс не запросил паузу.
    if !directives
        .iter()
        .any(|d| matches!(d, TournamentAction::RequestPause { .. }))
    {
        directives.extend(check_tournament_blinds(t, now));
    }
    directives.extend(pause_directives(t, now, moves_pending));
    Ok(directives)
}

/// Новая раздача, если стол свободен, турнир идёт и никто не ждёт ребая.
///
/// Сразу после завершения раздачи вместо старта добавляется `NextHand`:
/// следующая раздача начнётся при вызове после `next_hand_delay_ms`.
fn maybe_start_hand(
    t: &mut TournamentDetails,
    game: &mut Game,
    directives: &mut Vec<TournamentAction>,
    ctx: &AdvanceContext,
    hints: &mut Hints,
) -> Result<(), TournamentError> {
    if game.has_active_hand() || t.status != TournamentStatus::Active {
        return Ok(());
    }
    let Some(table) = t.tables.get(&game.id) else {
        return Ok(());
    };
    if table.eliminated {
        return Ok(());
    }

    let waiting_rebuy: Vec<_> = t
        .players_at_table(&game.id)
        .filter(|tp| tp.player.stack.is_zero() && t.can_rebuy(tp.id(), ctx.now))
        .collect();
    if !waiting_rebuy.is_empty() {
        log::debug!("стол {}: ждём решения по ребаю", game.id);
        // Разбудить стол, когда закроется первое окно.
        let closes = waiting_rebuy
            .iter()
            .filter_map(|tp| tp.player.busted_at)
            .map(|busted_at| busted_at.saturating_add(t.config.rebuy.window_ms))
            .min();
        if let Some(closes) = closes {
            hints.delay(closes.saturating_sub(ctx.now));
        }
        hints.table(&game.id);
        return Ok(());
    }

    let cooling_down = game.hand.as_ref().map_or(false, |h| {
        h.payouts_applied
            && ctx.now.saturating_sub(h.last_action_at) < t.config.next_hand_delay_ms
    });
    if cooling_down {
        directives.push(TournamentAction::NextHand {
            table_id: game.id.clone(),
        });
        return Ok(());
    }

    if game.eligible_for_hand().len() < 2 {
        return Ok(());
    }

    let id = hand_id(ctx.now, &game.id);
    match start_hand(game, id, ctx.secure_seed, t.config.prng, ctx.now) {
        Ok(()) => {}
        Err(EngineError::NotEnoughPlayers) => return Ok(()),
        Err(e) => return Err(e.into()),
    }
    if let Some(table) = t.tables.get_mut(&game.id) {
        table.active_hand_id = game.active_hand_id.clone();
    }

    // Раздача могла закончиться сразу (олл-ины с блайндов).
    if game.hand.as_ref().map_or(false, |h| h.is_complete()) {
        hints.delay(0);
        hints.table(&game.id);
        return Ok(());
    }
    schedule_turn(t, game, ctx.now, hints);
    Ok(())
}
