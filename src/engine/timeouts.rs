use crate::domain::table::Game;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::apply_forced_action;

/// Время хода истекло: игрок помечается отошедшим, за него делается
/// минимальное легальное действие.
///
/// Вызывающая сторона сама решает, что время вышло
/// (`Hand::is_timed_out`); здесь проверяется только наличие хода.
pub fn enforce_timeout(game: &mut Game, now: u64) -> Result<(), EngineError> {
    let hand = game.active_hand_mut().ok_or(EngineError::NoActiveHand)?;
    let uid = hand
        .acting_player_id
        .clone()
        .ok_or(EngineError::NoActiveHand)?;

    apply_forced_action(hand, now)?;

    log::info!("стол {}: таймаут хода игрока {uid}", game.id);
    if let Some(player) = game.players.get_mut(&uid) {
        player.away = true;
    }
    Ok(())
}
