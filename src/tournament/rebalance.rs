//! Ребалансировка столов (базовый вариант).
//!
//! Чистая функция `rebalance(tournament, now) -> [TournamentAction]`:
//!   1. вылетевшие без права ребая -> `EliminatePlayer` (по времени вылета,
//!      затем по стеку на начало раздачи);
//!   2. `needed = max(ceil(active / (min + 1)), ceil(active / max_table_size))`;
//!   3. если столов больше, чем нужно, `len - needed` самых маленьких
//!      расформировываются разом, их игроки по одному уходят за оставшийся
//!      стол с наименьшим числом игроков;
//!   4. иначе, если какой-то стол меньше `min` и отстаёт от самого большого
//!      больше чем на одного, игроки по одному переходят с самого большого
//!      на самый маленький, пока разница не станет не больше 1;
//!   5. пересадка, задевающая стол с идущей раздачей, превращается в
//!      `RequestPause` (или отбрасывается, если пауза уже идёт).

use std::cmp::Reverse;

use crate::domain::tournament::{PauseReason, TournamentDetails, TournamentError, TournamentStatus};
use crate::domain::{PlayerId, TableId};
use crate::infra::ids::parse_hand_timestamp;
use crate::tournament::directives::TournamentAction;

pub const REBALANCE_MESSAGE: &str = "Rebalancing tables";

/// Стол в модели ребаланса.
#[derive(Clone, Debug)]
pub(crate) struct SimTable {
    pub id: TableId,
    /// Игроки, которые остаются в игре, по возрастанию id.
    pub players: Vec<PlayerId>,
    pub has_active_hand: bool,
    /// Метка времени из id активной раздачи.
    pub hand_started_at: u64,
}

/// Одна пересадка.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Move {
    pub uid: PlayerId,
    pub from: TableId,
    pub to: TableId,
}

/// Разбор турнира: выбывания + модель столов.
pub(crate) struct Snapshot {
    pub eliminations: Vec<TournamentAction>,
    pub tables: Vec<SimTable>,
    pub active_players: usize,
}

pub(crate) fn snapshot(t: &TournamentDetails, now: u64) -> Snapshot {
    let mut busted = Vec::new();
    let mut tables = Vec::new();
    let mut active_players = 0;

    for table in t.live_tables() {
        let mut players = Vec::new();
        for tp in t.players_at_table(&table.id) {
            if tp.player.stack.is_zero() && !t.can_rebuy(tp.id(), now) {
                busted.push((
                    tp.player.busted_at.unwrap_or(0),
                    tp.last_hand_stack,
                    tp.id().clone(),
                    table.id.clone(),
                ));
            } else {
                players.push(tp.id().clone());
            }
        }
        players.sort();
        active_players += players.len();

        let hand_started_at = table
            .active_hand_id
            .as_deref()
            .and_then(parse_hand_timestamp)
            .unwrap_or(0);
        tables.push(SimTable {
            id: table.id.clone(),
            players,
            has_active_hand: table.active_hand_id.is_some(),
            hand_started_at,
        });
    }

    // Место: кто вылетел раньше, а в одной раздаче с меньшим стеком,
    // выбывает первым и получает худшее место.
    busted.sort();
    let eliminations = busted
        .into_iter()
        .map(|(_, _, uid, table_id)| TournamentAction::EliminatePlayer {
            uid,
            table_id: Some(table_id),
        })
        .collect();

    Snapshot {
        eliminations,
        tables,
        active_players,
    }
}

/// Сколько столов нужно под `active` игроков.
pub fn needed_table_count(active: usize, min_before_rebalance: usize, max_table_size: usize) -> usize {
    let by_min = active.div_ceil(min_before_rebalance + 1);
    let by_max = active.div_ceil(max_table_size.max(1));
    by_min.max(by_max).max(1)
}

/// Куда сажать: меньше игроков, без раздачи, раньше начатая раздача, id.
pub(crate) fn receive_key(t: &SimTable) -> (usize, bool, u64, &str) {
    (t.players.len(), t.has_active_hand, t.hand_started_at, t.id.as_str())
}

/// Какой стол расформировать: меньше игроков, без раздачи,
/// позже начатая раздача, id.
pub(crate) fn dissolve_key(t: &SimTable) -> (usize, bool, Reverse<u64>, &str) {
    (t.players.len(), t.has_active_hand, Reverse(t.hand_started_at), t.id.as_str())
}

/// Откуда забирать: больше игроков, без раздачи, позже начатая раздача, id.
pub(crate) fn source_key(t: &SimTable) -> (Reverse<usize>, bool, Reverse<u64>, &str) {
    (
        Reverse(t.players.len()),
        t.has_active_hand,
        Reverse(t.hand_started_at),
        t.id.as_str(),
    )
}

/// Нужно ли выравнивать столы (шаг 4).
pub(crate) fn needs_balancing(tables: &[SimTable], min_before_rebalance: usize) -> bool {
    let largest = tables.iter().map(|t| t.players.len()).max().unwrap_or(0);
    tables
        .iter()
        .any(|t| t.players.len() < min_before_rebalance && t.players.len() + 1 < largest)
}

/// Базовый ребалансер: на каждом шаге пересортировывает все столы.
pub fn rebalance(t: &TournamentDetails, now: u64) -> Result<Vec<TournamentAction>, TournamentError> {
    let Snapshot {
        eliminations,
        mut tables,
        active_players,
    } = snapshot(t, now);
    let cfg = &t.config;
    let needed = needed_table_count(
        active_players,
        cfg.min_table_size_before_rebalance,
        cfg.max_table_size,
    );

    let mut moves = Vec::new();
    let mut dissolved = Vec::new();

    if tables.len() > needed {
        // Все закрываемые столы выбираются сразу: игрок пересаживается
        // один раз и только за оставшийся стол.
        tables.sort_by(|a, b| dissolve_key(a).cmp(&dissolve_key(b)));
        let surplus = tables.len() - needed;
        let victims: Vec<SimTable> = tables.drain(..surplus).collect();
        for victim in victims {
            for uid in &victim.players {
                tables.sort_by(|a, b| receive_key(a).cmp(&receive_key(b)));
                let Some(target) = tables.first_mut() else {
                    break;
                };
                target.players.push(uid.clone());
                target.players.sort();
                moves.push(Move {
                    uid: uid.clone(),
                    from: victim.id.clone(),
                    to: target.id.clone(),
                });
            }
            dissolved.push(victim.id);
        }
    } else if needs_balancing(&tables, cfg.min_table_size_before_rebalance) {
        loop {
            tables.sort_by(|a, b| source_key(a).cmp(&source_key(b)));
            let src = 0;
            let dst = (0..tables.len())
                .min_by(|&a, &b| receive_key(&tables[a]).cmp(&receive_key(&tables[b])))
                .unwrap_or(src);
            if tables[src].players.len() <= tables[dst].players.len() + 1 {
                break;
            }
            let Some(uid) = tables[src].players.pop() else {
                break;
            };
            tables[dst].players.push(uid.clone());
            tables[dst].players.sort();
            moves.push(Move {
                uid,
                from: tables[src].id.clone(),
                to: tables[dst].id.clone(),
            });
        }
    }

    emit_plan(t, eliminations, moves, dissolved)
}

/// План пересадок -> директивы с учётом активных раздач.
///
/// Порядок: выбывания, подъёмы из-за столов, закрытие столов, посадки.
pub(crate) fn emit_plan(
    t: &TournamentDetails,
    mut directives: Vec<TournamentAction>,
    moves: Vec<Move>,
    dissolved: Vec<TableId>,
) -> Result<Vec<TournamentAction>, TournamentError> {
    if moves.is_empty() && dissolved.is_empty() {
        return Ok(directives);
    }

    let busy = |id: &str| t.table_has_active_hand(id);

    let (moves, dissolved): (Vec<Move>, Vec<TableId>) = match t.status {
        TournamentStatus::Active => {
            let touches_hand = moves.iter().any(|m| busy(&m.from) || busy(&m.to))
                || dissolved.iter().any(|id| busy(id));
            if touches_hand {
                log::info!(
                    "турнир {}: пересадка ждёт окончания раздач ({} переходов)",
                    t.id,
                    moves.len()
                );
                directives.push(TournamentAction::RequestPause {
                    reason: PauseReason::Rebalance,
                    message: REBALANCE_MESSAGE.to_string(),
                    duration_ms: t.config.pause_settle_delay_ms,
                    upcoming_round_id: None,
                });
                return Ok(directives);
            }
            (moves, dissolved)
        }
        TournamentStatus::PauseRequested | TournamentStatus::Paused => {
            let allowed: Vec<Move> = moves
                .iter()
                .filter(|m| !busy(&m.from) && !busy(&m.to))
                .cloned()
                .collect();
            let closable: Vec<TableId> = dissolved
                .into_iter()
                .filter(|id| {
                    !busy(id)
                        && moves
                            .iter()
                            .filter(|m| &m.from == id)
                            .all(|m| allowed.contains(m))
                })
                .collect();
            (allowed, closable)
        }
        _ => return Ok(directives),
    };

    // Стол закрывается, только если за ним никого не осталось.
    let eliminated = |uid: &PlayerId| {
        directives.iter().any(
            |d| matches!(d, TournamentAction::EliminatePlayer { uid: gone, .. } if gone == uid),
        )
    };
    for id in &dissolved {
        let leaving = moves.iter().filter(|m| &m.from == id).count();
        let seated = t.players_at_table(id).filter(|p| !eliminated(p.id())).count();
        if seated != leaving {
            log::warn!("турнир {}: стол {id} закрывается с живыми игроками", t.id);
            return Err(TournamentError::InvariantViolation(format!(
                "table {id} would be eliminated with {} live players",
                seated.saturating_sub(leaving)
            )));
        }
    }

    for m in &moves {
        directives.push(TournamentAction::RemovePlayer {
            uid: m.uid.clone(),
            table_id: m.from.clone(),
        });
    }
    for id in dissolved {
        directives.push(TournamentAction::EliminateTable { table_id: id });
    }
    for m in moves {
        directives.push(TournamentAction::AddPlayer {
            uid: m.uid,
            table_id: m.to,
        });
    }
    Ok(directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needed_tables_respects_both_bounds() {
        // 8 игроков, min 4: ceil(8/5) = 2.
        assert_eq!(needed_table_count(8, 4, 8), 2);
        // 20 игроков, min 1: ceil(20/2) = 10.
        assert_eq!(needed_table_count(20, 1, 8), 10);
        // 17 игроков, min 7: ceil(17/8) = 3 по вместимости.
        assert_eq!(needed_table_count(17, 7, 8), 3);
        assert_eq!(needed_table_count(0, 4, 8), 1);
    }

    #[test]
    fn source_prefers_table_without_hand() {
        let a = SimTable {
            id: "a".into(),
            players: vec!["1".into(); 6],
            has_active_hand: true,
            hand_started_at: 10,
        };
        let b = SimTable {
            id: "b".into(),
            players: vec!["1".into(); 6],
            has_active_hand: false,
            hand_started_at: 0,
        };
        assert!(source_key(&b) < source_key(&a));
    }
}
