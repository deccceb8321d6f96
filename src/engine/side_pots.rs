use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::PlayerId;

/// Банк (основной или сайд-пот) и кто на него претендует.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    /// Не сфолдившие игроки, внёсшие не меньше уровня этого банка,
    /// в порядке обхода от дилера.
    pub eligible: Vec<PlayerId>,
}

/// Разложить вклады раздачи на банки.
///
/// Каждый различный уровень вклада образует слой. Сфолдившие платят в слои,
/// но не претендуют на них. Соседние слои с одинаковыми претендентами
/// сливаются; слой без претендентов уходит в предыдущий банк.
/// Выход идёт от основного банка к старшим сайд-потам.
pub fn compute_side_pots(hand: &Hand) -> Vec<SidePot> {
    let contributions: Vec<(&PlayerId, Chips, bool)> = hand
        .order
        .iter()
        .filter_map(|uid| hand.players.get(uid))
        .map(|p| (&p.uid, p.total_contribution, p.folded))
        .collect();

    let mut levels: Vec<Chips> = contributions
        .iter()
        .map(|(_, c, _)| *c)
        .filter(|c| !c.is_zero())
        .collect();
    levels.sort();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::new();
    let mut carried = Chips::ZERO;
    let mut prev = Chips::ZERO;

    for level in levels {
        let layer: Chips = contributions
            .iter()
            .map(|&(_, c, _)| c.min(level) - c.min(prev))
            .sum();
        let eligible: Vec<PlayerId> = contributions
            .iter()
            .filter(|(_, c, folded)| !folded && *c >= level)
            .map(|(uid, _, _)| uid.to_string())
            .collect();
        prev = level;

        if eligible.is_empty() {
            match pots.last_mut() {
                Some(last) => last.amount += layer,
                None => carried += layer,
            }
            continue;
        }

        match pots.last_mut() {
            Some(last) if last.eligible == eligible => last.amount += layer + carried,
            _ => pots.push(SidePot {
                amount: layer + carried,
                eligible,
            }),
        }
        carried = Chips::ZERO;
    }

    // Все вклады сфолдивших выше любых претендентов: отдать живым.
    if !carried.is_zero() {
        match pots.last_mut() {
            Some(last) => last.amount += carried,
            None => pots.push(SidePot {
                amount: carried,
                eligible: hand.contenders().iter().map(|p| p.uid.clone()).collect(),
            }),
        }
    }

    pots
}
