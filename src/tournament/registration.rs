// src/tournament/registration.rs

use std::collections::BTreeMap;

use crate::domain::chips::Chips;
use crate::domain::player::Player;
use crate::domain::table::{Game, GameStage};
use crate::domain::tournament::{TournamentDetails, TournamentError, TournamentStatus};
use crate::domain::{PlayerId, TableId};

/// Запуск турнира: рассадка (если ещё не было), первый раунд блайндов.
///
/// Возвращает документы столов, которые вызывающая сторона сохраняет рядом
/// с турниром.
pub fn start_tournament(
    t: &mut TournamentDetails,
    now: u64,
) -> Result<BTreeMap<TableId, Game>, TournamentError> {
    t.start(now)?;
    let games = build_table_games(t);
    log::info!(
        "турнир {} запущен: {} игроков за {} столами",
        t.id,
        t.alive_count(),
        games.len()
    );
    Ok(games)
}

/// Собрать `Game` для каждого живого стола по текущей рассадке.
pub fn build_table_games(t: &TournamentDetails) -> BTreeMap<TableId, Game> {
    t.live_tables()
        .map(|table| {
            let mut game = Game::new(table.id.clone(), table.big_blind);
            game.tournament_id = Some(t.id.clone());
            game.max_seats = t.config.max_table_size as u8;
            sync_game_roster(t, &mut game);
            (table.id.clone(), game)
        })
        .collect()
}

/// Привести состав стола к турнирной рассадке.
///
/// Вызывается только когда за столом нет раздачи: пересаженные игроки
/// садятся со своим стеком, ушедшие помечаются `removed`, стеки и блайнды
/// берутся из турнира.
pub fn sync_game_roster(t: &TournamentDetails, game: &mut Game) {
    if game.has_active_hand() {
        return;
    }

    for tp in t.players_at_table(&game.id) {
        let seat = game
            .players
            .entry(tp.id().clone())
            .or_insert_with(|| Player::new(tp.id().clone(), tp.player.position, tp.player.stack));
        seat.position = tp.player.position;
        seat.stack = tp.player.stack;
        seat.contributed = tp.player.contributed;
        seat.busted_at = tp.player.busted_at;
        seat.away = tp.player.away;
        seat.removed = false;
    }

    let seated: Vec<PlayerId> = t.players_at_table(&game.id).map(|p| p.id().clone()).collect();
    for (uid, player) in game.players.iter_mut() {
        if !seated.contains(uid) {
            player.removed = true;
        }
    }

    if let Some(table) = t.tables.get(&game.id) {
        game.small_blind = table.small_blind;
        game.big_blind = table.big_blind;
        game.stage = if table.eliminated {
            GameStage::Ended
        } else if t.status.is_pausing() {
            GameStage::Paused
        } else if game.eligible_for_hand().len() >= 2 {
            GameStage::Active
        } else {
            GameStage::Waiting
        };
    }
}

/// Ребай: стартовый стек заново. Только для вылетевшего игрока в окне ребая.
pub fn rebuy(t: &mut TournamentDetails, uid: &str, now: u64) -> Result<(), TournamentError> {
    let stack = t
        .players
        .get(uid)
        .map(|tp| tp.player.stack)
        .ok_or_else(|| TournamentError::PlayerNotRegistered {
            player_id: uid.to_string(),
            tournament_id: t.id.clone(),
        })?;
    if !stack.is_zero() || !t.can_rebuy(uid, now) || t.status.is_inert() {
        return Err(TournamentError::RebuyNotAllowed(uid.to_string()));
    }

    let starting = t.starting_stack;
    if let Some(tp) = t.players.get_mut(uid) {
        tp.player.stack = starting;
        tp.player.contributed += starting;
        tp.player.busted_at = None;
        tp.rebuys += 1;
        log::info!("игрок {uid}: ребай #{} на {starting}", tp.rebuys);
    }
    Ok(())
}

/// Отказ от ребая: при следующем проходе игрок выбывает.
pub fn decline_rebuy(t: &mut TournamentDetails, uid: &str) -> Result<(), TournamentError> {
    let tournament_id = t.id.clone();
    let tp = t
        .players
        .get_mut(uid)
        .ok_or_else(|| TournamentError::PlayerNotRegistered {
            player_id: uid.to_string(),
            tournament_id,
        })?;
    tp.rebuy_declined = true;
    Ok(())
}

/// Игрок подтвердил присутствие: больше не играем за него автоматически.
pub fn mark_arrived(t: &mut TournamentDetails, uid: &str) -> Result<(), TournamentError> {
    let tournament_id = t.id.clone();
    let tp = t
        .players
        .get_mut(uid)
        .ok_or_else(|| TournamentError::PlayerNotRegistered {
            player_id: uid.to_string(),
            tournament_id,
        })?;
    tp.arrived = true;
    tp.player.away = false;
    Ok(())
}

/// Остался ≤1 игрок, способный играть: турнир окончен.
///
/// Победитель получает первое место; результаты фиксируются через
/// `finalize_grace_ms`.
pub fn check_tournament_end(t: &mut TournamentDetails, now: u64) -> bool {
    if t.status.is_inert() {
        return false;
    }
    let eligible = t.eligible_player_ids(now);
    if eligible.len() > 1 {
        return false;
    }

    t.status = TournamentStatus::Ended;
    t.ended_at = Some(now);
    t.finalize_at = Some(now.saturating_add(t.config.finalize_grace_ms));
    t.pause_reason = None;
    t.pause_message = None;
    t.pause_start_timestamp = None;
    t.pause_end_timestamp = None;

    if let Some(winner) = eligible.into_iter().next() {
        if let Some(tp) = t.players.get_mut(&winner) {
            tp.finishing_place = Some(1);
        }
        log::info!("турнир {} окончен, победитель {winner}", t.id);
        t.winner_id = Some(winner);
    } else {
        log::info!("турнир {} окончен без победителя", t.id);
    }
    true
}

/// Ended -> Finalized, когда окно оспаривания прошло.
pub fn finalize_if_due(t: &mut TournamentDetails, now: u64) -> bool {
    match (t.status, t.finalize_at) {
        (TournamentStatus::Ended, Some(at)) if now >= at => {
            t.status = TournamentStatus::Finalized;
            log::info!("турнир {}: результаты зафиксированы", t.id);
            true
        }
        _ => false,
    }
}

/// Сумма всех стеков турнира (для проверок сохранения фишек).
pub fn chips_in_play(t: &TournamentDetails) -> Chips {
    t.players.values().map(|p| p.player.stack).sum()
}
