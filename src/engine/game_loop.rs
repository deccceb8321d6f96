use std::collections::BTreeMap;

use crate::domain::action::{Action, ActionKind};
use crate::domain::chips::Chips;
use crate::domain::deck::{Deck, PrngKind};
use crate::domain::hand::{Hand, HandStage, PlayerState, Round, Street};
use crate::domain::table::{Game, GameStage};
use crate::domain::HandId;
use crate::engine::actions::{forced_action_for, ProposedAction};
use crate::engine::betting::{is_betting_closed, next_actor, players_able_to_act, reopen_action};
use crate::engine::errors::EngineError;
use crate::engine::payouts::calculate_hand_winners;
use crate::engine::positions::{next_dealer, order_from_dealer};
use crate::engine::validation::{validate_action, ValidatedAction};
use crate::infra::rng::generate_deck;

/// Старт новой раздачи за столом:
/// - двигает кнопку;
/// - тасует колоду по `hand_id` + `secure_seed`;
/// - постит блайнды стола;
/// - раздаёт по две карты, начиная слева от дилера.
///
/// Хедз-ап: дилер ставит малый блайнд и ходит первым на префлопе.
pub fn start_hand(
    game: &mut Game,
    hand_id: HandId,
    secure_seed: u32,
    prng: PrngKind,
    now: u64,
) -> Result<(), EngineError> {
    if game.has_active_hand() {
        return Err(EngineError::HandAlreadyInProgress);
    }

    let eligible = game.eligible_for_hand();
    if eligible.len() < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }

    let previous_position = game
        .dealer_id
        .as_ref()
        .and_then(|id| game.players.get(id))
        .map(|p| p.position);
    let dealer_id = next_dealer(&eligible, previous_position).ok_or(EngineError::NotEnoughPlayers)?;
    let order = order_from_dealer(&eligible, &dealer_id);

    let (small_blind_id, big_blind_id) = if order.len() == 2 {
        (dealer_id.clone(), order[0].clone())
    } else {
        (order[0].clone(), order[1].clone())
    };

    let players: BTreeMap<_, _> = eligible
        .iter()
        .map(|p| (p.id.clone(), PlayerState::new(p.id.clone(), p.position, p.stack)))
        .collect();

    let cards = generate_deck(&hand_id, secure_seed, prng)?;
    let big_blind = game.big_blind;
    let small_blind = game.small_blind.min(big_blind);

    let mut hand = Hand {
        id: hand_id.clone(),
        table_id: game.id.clone(),
        seed: hand_id.clone(),
        secure_seed,
        prng,
        deck: Deck::from_sequence(cards),
        dealer_id: dealer_id.clone(),
        small_blind_id: small_blind_id.clone(),
        big_blind_id: big_blind_id.clone(),
        small_blind,
        big_blind,
        rounds: vec![Round::new(Street::Preflop, Vec::new(), big_blind)],
        players,
        order,
        acting_player_id: None,
        stage: HandStage::Betting(Street::Preflop),
        payouts: Vec::new(),
        payouts_applied: false,
        started_at: now,
        last_action_at: now,
    };

    deal_hole_cards(&mut hand);
    post_blind(&mut hand, &small_blind_id, small_blind, now);
    post_blind(&mut hand, &big_blind_id, big_blind, now);
    if let Some(round) = hand.active_round_mut() {
        round.target = big_blind;
        round.last_aggressor = Some(big_blind_id.clone());
    }

    hand.acting_player_id = next_actor(&hand, &big_blind_id);
    progress(&mut hand, now)?;

    log::info!(
        "стол {}: раздача {} началась, дилер {}, игроков {}",
        game.id,
        hand_id,
        dealer_id,
        hand.order.len()
    );

    game.dealer_id = Some(dealer_id);
    game.active_hand_id = Some(hand_id);
    game.hand = Some(hand);
    game.stage = GameStage::Active;
    game.hands_played += 1;
    Ok(())
}

/// По одной карте за проход, два прохода, начиная слева от дилера.
fn deal_hole_cards(hand: &mut Hand) {
    for _ in 0..2 {
        for uid in hand.order.clone() {
            if let (Some(card), Some(p)) = (hand.deck.draw_one(), hand.players.get_mut(&uid)) {
                p.hole_cards.push(card);
            }
        }
    }
}

/// Блайнд: недобровольный бет; короткий стек ставит олл-ин.
fn post_blind(hand: &mut Hand, uid: &str, amount: Chips, now: u64) {
    let Some(p) = hand.players.get_mut(uid) else {
        return;
    };
    let paid = amount.min(p.stack);
    p.stack -= paid;
    p.round_contribution += paid;
    p.total_contribution += paid;
    p.all_in = p.stack.is_zero();
    p.actions.push(Action {
        uid: p.uid.clone(),
        kind: ActionKind::Bet,
        street: Street::Preflop,
        total: p.round_contribution,
        contribution: paid,
        raise: Chips::ZERO,
        all_in: p.all_in,
        voluntary: false,
        conforming: paid == amount || p.all_in,
        timestamp: now,
    });
}

/// Применить действие текущего игрока.
///
/// При ошибке раздача не меняется, клиент может прислать другое действие.
pub fn apply_action(hand: &mut Hand, proposal: &ProposedAction, now: u64) -> Result<(), EngineError> {
    apply_inner(hand, proposal, true, now)
}

/// Минимальное легальное действие за текущего игрока (таймаут, автоход).
pub fn apply_forced_action(hand: &mut Hand, now: u64) -> Result<(), EngineError> {
    let proposal = forced_action_for(hand).ok_or(EngineError::NoActiveHand)?;
    log::debug!(
        "раздача {}: принудительный {:?} за {}",
        hand.id,
        proposal.kind,
        proposal.uid
    );
    apply_inner(hand, &proposal, false, now)
}

fn apply_inner(
    hand: &mut Hand,
    proposal: &ProposedAction,
    voluntary: bool,
    now: u64,
) -> Result<(), EngineError> {
    let validated = validate_action(hand, proposal).map_err(|e| {
        log::debug!("раздача {}: отклонено действие {}: {e}", hand.id, proposal.uid);
        e
    })?;

    let mut next = hand.clone();
    commit(&mut next, &proposal.uid, &validated, voluntary, now);
    next.acting_player_id = next_actor(&next, &proposal.uid);
    progress(&mut next, now)?;
    *hand = next;
    Ok(())
}

fn commit(hand: &mut Hand, uid: &str, action: &ValidatedAction, voluntary: bool, now: u64) {
    let street = hand.street().unwrap_or(Street::Preflop);
    let raised = !action.raise.is_zero();
    let mut new_target = None;

    if let Some(p) = hand.players.get_mut(uid) {
        p.stack -= action.contribution;
        p.round_contribution += action.contribution;
        p.total_contribution += action.contribution;
        p.acted = true;
        p.all_in = p.all_in || action.all_in;
        if action.kind == ActionKind::Fold {
            p.folded = true;
        }
        if raised {
            new_target = Some(p.round_contribution);
        }
    }

    let target_after = match (new_target, hand.active_round_mut()) {
        (Some(total), Some(round)) => {
            if action.raise >= round.min_raise {
                round.min_raise = action.raise;
            }
            round.target = total;
            round.last_aggressor = Some(uid.to_string());
            total
        }
        (None, Some(round)) => round.target,
        (_, None) => Chips::ZERO,
    };
    if raised {
        reopen_action(hand, uid);
    }

    if let Some(p) = hand.players.get_mut(uid) {
        p.actions.push(Action {
            uid: uid.to_string(),
            kind: action.kind,
            street,
            total: action.total,
            contribution: action.contribution,
            raise: action.raise,
            all_in: action.all_in,
            voluntary,
            conforming: action.kind == ActionKind::Fold
                || p.round_contribution == target_after
                || p.all_in,
            timestamp: now,
        });
    }
    hand.last_action_at = now;
}

/// Двигать раздачу, пока никто не должен действовать:
/// закрывать раунды, открывать улицы, доигрывать борд и считать шоудаун.
fn progress(hand: &mut Hand, now: u64) -> Result<(), EngineError> {
    loop {
        if hand.contenders().len() <= 1 {
            return finish(hand);
        }
        if !is_betting_closed(hand) {
            if hand.acting_player_id.is_none() {
                hand.acting_player_id = next_actor(hand, &hand.dealer_id.clone());
            }
            return Ok(());
        }

        if let Some(round) = hand.active_round_mut() {
            round.active = false;
        }
        let Some((street, n)) = hand.street().and_then(Street::next) else {
            return finish(hand);
        };

        open_street(hand, street, n);
        if players_able_to_act(hand) <= 1 {
            // Ставить больше некому: раскрываем борд до ривера.
            log::debug!("раздача {}: олл-ин, доигрываем борд", hand.id);
            continue;
        }
        hand.acting_player_id = next_actor(hand, &hand.dealer_id.clone());
        hand.last_action_at = now;
        return Ok(());
    }
}

fn open_street(hand: &mut Hand, street: Street, n: usize) {
    let cards = hand.deck.draw_n(n);
    hand.rounds.push(Round::new(street, cards, hand.big_blind));
    hand.stage = HandStage::Betting(street);
    hand.acting_player_id = None;
    for p in hand.players.values_mut() {
        p.round_contribution = Chips::ZERO;
        p.acted = false;
    }
}

fn finish(hand: &mut Hand) -> Result<(), EngineError> {
    if let Some(round) = hand.active_round_mut() {
        round.active = false;
    }
    hand.acting_player_id = None;
    hand.stage = HandStage::Showdown;
    hand.payouts = calculate_hand_winners(hand)?;
    hand.stage = HandStage::Complete;
    log::info!(
        "раздача {} завершена, банк {}",
        hand.id,
        hand.pot_total()
    );
    Ok(())
}
