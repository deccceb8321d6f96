//! Раунд ставок: кто ходит следующим и когда раунд закрыт.

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::PlayerId;

/// Сколько игроку осталось доставить до уровня раунда.
pub fn to_call(hand: &Hand, uid: &str) -> Chips {
    let target = hand.active_round().map(|r| r.target).unwrap_or(Chips::ZERO);
    hand.players
        .get(uid)
        .map(|p| target.saturating_sub(p.round_contribution))
        .unwrap_or(Chips::ZERO)
}

/// Игрок ещё должен что-то сделать в этом раунде.
fn owes_action(hand: &Hand, uid: &str, target: Chips) -> bool {
    match hand.players.get(uid) {
        Some(p) => p.can_act() && (!p.acted || p.round_contribution < target),
        None => false,
    }
}

/// Раунд закрыт: все, кто может ставить, походили и дотянули до уровня.
pub fn is_round_complete(hand: &Hand) -> bool {
    let Some(round) = hand.active_round() else {
        return true;
    };
    !hand
        .order
        .iter()
        .any(|uid| owes_action(hand, uid, round.target))
}

/// Ставки на улице окончены: раунд закрыт либо ставить больше некому,
/// а единственный оставшийся игрок уже уравнял.
pub fn is_betting_closed(hand: &Hand) -> bool {
    if is_round_complete(hand) {
        return true;
    }
    let target = hand.active_round().map(|r| r.target).unwrap_or(Chips::ZERO);
    players_able_to_act(hand) <= 1
        && hand
            .players
            .values()
            .filter(|p| p.can_act())
            .all(|p| p.round_contribution >= target)
}

/// Следующий по кругу игрок, который ещё должен действовать.
pub fn next_actor(hand: &Hand, after: &str) -> Option<PlayerId> {
    let target = hand.active_round()?.target;
    let n = hand.order.len();
    let start = hand.order_index(after).map(|i| i + 1).unwrap_or(0);

    (0..n)
        .map(|k| &hand.order[(start + k) % n])
        .find(|uid| owes_action(hand, uid, target))
        .cloned()
}

/// Сколько игроков ещё могут ставить (не сфолдили и не в олл-ине).
pub fn players_able_to_act(hand: &Hand) -> usize {
    hand.players.values().filter(|p| p.can_act()).count()
}

/// После повышения все остальные снова должны ответить.
pub fn reopen_action(hand: &mut Hand, aggressor: &str) {
    for (uid, p) in hand.players.iter_mut() {
        if uid != aggressor && p.can_act() {
            p.acted = false;
        }
    }
}
