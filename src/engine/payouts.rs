use std::collections::BTreeMap;

use crate::domain::chips::Chips;
use crate::domain::hand::{Hand, HandStage, Payout};
use crate::domain::table::Game;
use crate::domain::PlayerId;
use crate::engine::errors::EngineError;
use crate::engine::side_pots::compute_side_pots;
use crate::eval::{evaluate_best_hand, EvaluatedHand};

pub const UNCONTESTED: &str = "Uncontested";

/// Распределить банки раздачи.
///
/// Каждый банк делится между лучшими руками среди претендентов; лишние
/// фишки при делении по одной раздаются начиная с ближайшего к дилеру
/// слева. Если в раздаче остался один игрок, выплата одна: весь банк.
///
/// Сумма выплат всегда равна сумме вкладов, иначе `InvariantViolation`.
pub fn calculate_hand_winners(hand: &Hand) -> Result<Vec<Payout>, EngineError> {
    let pot_total = hand.pot_total();
    let contenders = hand.contenders();

    let payouts = if contenders.len() == 1 {
        vec![Payout {
            uid: contenders[0].uid.clone(),
            amount: pot_total,
            cards: Vec::new(),
            description: UNCONTESTED.to_string(),
            pot_index: 0,
        }]
    } else {
        showdown_payouts(hand)?
    };

    let paid: Chips = payouts.iter().map(|p| p.amount).sum();
    if paid != pot_total {
        return Err(EngineError::InvariantViolation(format!(
            "выплаты {paid} не равны банку {pot_total} в раздаче {}",
            hand.id
        )));
    }
    Ok(payouts)
}

fn showdown_payouts(hand: &Hand) -> Result<Vec<Payout>, EngineError> {
    let board = hand.board();
    let mut evaluated: BTreeMap<&PlayerId, EvaluatedHand> = BTreeMap::new();
    for p in hand.contenders() {
        let best = evaluate_best_hand(&p.hole_cards, &board).ok_or_else(|| {
            EngineError::InvariantViolation(format!(
                "шоудаун без полного борда: у {} {} карт",
                p.uid,
                p.hole_cards.len() + board.len()
            ))
        })?;
        evaluated.insert(&p.uid, best);
    }

    let mut payouts = Vec::new();
    for (pot_index, pot) in compute_side_pots(hand).into_iter().enumerate() {
        let best_rank = pot
            .eligible
            .iter()
            .filter_map(|uid| evaluated.get(uid).map(|e| e.rank))
            .max()
            .ok_or_else(|| {
                EngineError::InvariantViolation(format!("банк {pot_index} без претендентов"))
            })?;

        // `eligible` уже в порядке обхода от дилера.
        let winners: Vec<&PlayerId> = pot
            .eligible
            .iter()
            .filter(|uid| evaluated.get(uid).map(|e| e.rank) == Some(best_rank))
            .collect();

        let (share, remainder) = pot.amount.split(winners.len());
        for (i, uid) in winners.into_iter().enumerate() {
            let odd_chip = if (i as u64) < remainder { Chips(1) } else { Chips::ZERO };
            let cards = hand
                .players
                .get(uid)
                .map(|p| p.hole_cards.clone())
                .unwrap_or_default();
            let description = evaluated
                .get(uid)
                .map(|e| e.description())
                .unwrap_or_default();
            payouts.push(Payout {
                uid: uid.clone(),
                amount: share + odd_chip,
                cards,
                description,
                pot_index,
            });
        }
    }
    Ok(payouts)
}

/// Зачислить выплаты завершённой раздачи на стеки стола.
///
/// Снимает `active_hand_id`: после этого стол может начать новую раздачу.
/// Повторное применение = `InvariantViolation`.
pub fn apply_payouts(game: &mut Game, now: u64) -> Result<(), EngineError> {
    let hand = game.hand.as_mut().ok_or(EngineError::NoActiveHand)?;
    if hand.payouts_applied {
        return Err(EngineError::InvariantViolation(format!(
            "выплаты по раздаче {} уже применены",
            hand.id
        )));
    }
    if hand.stage != HandStage::Complete {
        return Err(EngineError::HandNotComplete);
    }

    for (uid, state) in &hand.players {
        let won: Chips = hand
            .payouts
            .iter()
            .filter(|p| &p.uid == uid)
            .map(|p| p.amount)
            .sum();
        let player = game
            .players
            .get_mut(uid)
            .ok_or_else(|| EngineError::PlayerNotFound(uid.clone()))?;
        player.stack = state.stack + won;
        if player.stack.is_zero() {
            player.busted_at.get_or_insert(now);
        }
    }

    hand.payouts_applied = true;
    log::info!(
        "раздача {} за столом {} закрыта, выплат: {}",
        hand.id,
        game.id,
        hand.payouts.len()
    );
    game.active_hand_id = None;
    Ok(())
}
