//! Банки и выплаты:
//! - слои по уровням вкладов (2, 3, 4 олл-ина);
//! - сфолдившие платят, но не претендуют;
//! - лишние фишки при делении идут слева от дилера;
//! - сохранение фишек на случайных раздачах (proptest).

mod common;

use common::*;
use poker_tournament_engine::domain::chips::Chips;
use poker_tournament_engine::domain::deck::PrngKind;
use poker_tournament_engine::domain::table::Game;
use poker_tournament_engine::engine::{
    apply_action, apply_forced_action, apply_payouts, calculate_hand_winners, compute_side_pots,
    start_hand, ProposedAction, SidePot,
};
use proptest::prelude::*;

/// Четыре игрока: дилер p0, обход p1, p2, p3, p0.
fn four_handed_with(contributions: &[(&str, u64, bool)]) -> Game {
    let mut game = table(&[10_000, 10_000, 10_000, 10_000], 20);
    start(&mut game, T0);
    let hand = game.hand.as_mut().expect("hand");
    for (uid, amount, folded) in contributions {
        let p = hand.players.get_mut(*uid).expect("player");
        p.total_contribution = Chips(*amount);
        p.folded = *folded;
    }
    game
}

fn pot(amount: u64, eligible: &[&str]) -> SidePot {
    SidePot {
        amount: Chips(amount),
        eligible: eligible.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn equal_contributions_make_one_pot() {
    let game = four_handed_with(&[("p1", 100, false), ("p2", 100, false), ("p3", 100, false), ("p0", 100, false)]);
    let pots = compute_side_pots(hand(&game));
    assert_eq!(pots, vec![pot(400, &["p1", "p2", "p3", "p0"])]);
}

#[test]
fn three_all_ins_make_layered_pots() {
    let game = four_handed_with(&[("p1", 25, false), ("p2", 75, false), ("p3", 150, false), ("p0", 150, false)]);
    let pots = compute_side_pots(hand(&game));
    assert_eq!(
        pots,
        vec![
            pot(100, &["p1", "p2", "p3", "p0"]),
            pot(150, &["p2", "p3", "p0"]),
            pot(150, &["p3", "p0"]),
        ]
    );
}

#[test]
fn folded_chips_stay_in_but_folder_is_not_eligible() {
    let game = four_handed_with(&[("p1", 50, true), ("p2", 100, false), ("p3", 100, false), ("p0", 0, true)]);
    let pots = compute_side_pots(hand(&game));
    // Слои 50 и 100 с одинаковыми претендентами сливаются.
    assert_eq!(pots, vec![pot(250, &["p2", "p3"])]);
}

#[test]
fn layer_without_contenders_joins_previous_pot() {
    let game = four_handed_with(&[("p1", 200, true), ("p2", 100, false), ("p3", 100, false), ("p0", 0, true)]);
    let pots = compute_side_pots(hand(&game));
    assert_eq!(pots, vec![pot(400, &["p2", "p3"])]);
}

#[test]
fn best_hand_takes_the_pot() {
    let mut game = table(&[1_000, 1_000, 1_000], 100);
    start(&mut game, T0);
    rig(&mut game, &[("p0", "Ah Ad"), ("p1", "3c 4c"), ("p2", "Kh Kd")], "2c 7d 9s Jc 5h");

    act(&mut game, ProposedAction::call("p0"), T0 + 1).expect("call");
    act(&mut game, ProposedAction::fold("p1"), T0 + 2).expect("fold");
    act(&mut game, ProposedAction::check("p2"), T0 + 3).expect("check");
    for street in 0..3 {
        let now = T0 + 10 + street * 2;
        act(&mut game, ProposedAction::check("p2"), now).expect("check");
        act(&mut game, ProposedAction::check("p0"), now + 1).expect("check");
    }

    let h = hand(&game);
    assert!(h.is_complete());
    assert_eq!(h.payouts.len(), 1);
    assert_eq!(h.payouts[0].uid, "p0");
    assert_eq!(h.payouts[0].amount, Chips(250));
    assert_eq!(h.payouts[0].description, "Pair of Aces");
}

#[test]
fn odd_chip_goes_to_first_seat_left_of_dealer() {
    // BB 30 -> SB 15; банк 75 делится пополам между p2 и p0.
    let mut game = table(&[1_000, 1_000, 1_000], 30);
    start(&mut game, T0);
    rig(&mut game, &[("p0", "2c 3d"), ("p1", "4c 5d"), ("p2", "2d 3c")], "Ts Js Qs Ks As");

    act(&mut game, ProposedAction::call("p0"), T0 + 1).expect("call");
    act(&mut game, ProposedAction::fold("p1"), T0 + 2).expect("fold");
    act(&mut game, ProposedAction::check("p2"), T0 + 3).expect("check");
    for street in 0..3 {
        let now = T0 + 10 + street * 2;
        act(&mut game, ProposedAction::check("p2"), now).expect("check");
        act(&mut game, ProposedAction::check("p0"), now + 1).expect("check");
    }

    let h = hand(&game);
    let amount = |uid: &str| {
        h.payouts
            .iter()
            .filter(|p| p.uid == uid)
            .map(|p| p.amount.0)
            .sum::<u64>()
    };
    assert_eq!(amount("p2"), 38);
    assert_eq!(amount("p0"), 37);
    assert!(h.payouts.iter().all(|p| p.description == "Royal flush"));
}

#[test]
fn short_stack_wins_only_main_pot() {
    // p1 (SB) олл-ин на 200 с лучшей рукой; p2 и p0 разыгрывают сайд-пот.
    let mut game = table(&[1_000, 200, 1_000], 100);
    start(&mut game, T0);
    rig(
        &mut game,
        &[("p0", "Kh Kd"), ("p1", "Ah Ad"), ("p2", "Qh Qd")],
        "2c 7d 9s Jc 5h",
    );

    act(&mut game, ProposedAction::raise("p0", 500), T0 + 1).expect("raise");
    act(&mut game, ProposedAction::call("p1"), T0 + 2).expect("all-in call");
    act(&mut game, ProposedAction::call("p2"), T0 + 3).expect("call");
    for street in 0..3 {
        let now = T0 + 10 + street * 2;
        act(&mut game, ProposedAction::check("p2"), now).expect("check");
        act(&mut game, ProposedAction::check("p0"), now + 1).expect("check");
    }

    let h = hand(&game);
    let winners = calculate_hand_winners(h).expect("winners");
    assert_eq!(winners, h.payouts);
    let main = winners.iter().find(|p| p.pot_index == 0).expect("main pot");
    assert_eq!((main.uid.as_str(), main.amount), ("p1", Chips(600)));
    let side = winners.iter().find(|p| p.pot_index == 1).expect("side pot");
    assert_eq!((side.uid.as_str(), side.amount), ("p0", Chips(600)));

    apply_payouts(&mut game, T0 + 20).expect("payouts");
    assert_eq!(game.players["p1"].stack, Chips(600));
    assert_eq!(game.players["p0"].stack, Chips(1_100));
    assert_eq!(game.players["p2"].stack, Chips(500));
}

#[test]
fn busted_player_gets_timestamp() {
    let mut game = table(&[1_000, 100], 20);
    start(&mut game, T0);
    rig(&mut game, &[("p0", "Ah Ad"), ("p1", "7c 2d")], "2c 8d 9s Jc 5h");

    act(&mut game, ProposedAction::raise("p0", 1_000), T0 + 1).expect("shove");
    act(&mut game, ProposedAction::call("p1"), T0 + 2).expect("call");
    apply_payouts(&mut game, T0 + 5).expect("payouts");

    assert_eq!(game.players["p1"].stack, Chips::ZERO);
    assert_eq!(game.players["p1"].busted_at, Some(T0 + 5));
    assert!(game.players["p1"].is_busted());
}

/// Простой выбор хода по номеру; нелегальный ход заменяется принудительным.
fn pick(uid: &str, choice: u8, bb: u64) -> ProposedAction {
    match choice {
        0 => ProposedAction::fold(uid),
        1 => ProposedAction::check(uid),
        2 => ProposedAction::call(uid),
        3 => ProposedAction::raise(uid, bb * 3),
        _ => ProposedAction::raise(uid, 1_000_000),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Фишки не появляются и не исчезают; отклонённый ход ничего не меняет.
    #[test]
    fn chips_are_conserved(
        stacks in prop::collection::vec(1u64..3_000, 2..=8),
        choices in prop::collection::vec(0u8..5, 1..120),
        secure_seed in any::<u32>(),
        sfc in any::<bool>(),
    ) {
        let bb = 40;
        let total: u64 = stacks.iter().sum();
        let mut game = table(&stacks, bb);
        let prng = if sfc { PrngKind::Sfc32 } else { PrngKind::Mulberry32 };
        start_hand(&mut game, "seed-1".into(), secure_seed, prng, T0).expect("start");

        let mut now = T0;
        for choice in choices {
            let Some(hand) = game.active_hand_mut() else { break };
            if hand.is_complete() {
                break;
            }
            let Some(uid) = hand.acting_player_id.clone() else { break };
            now += 1;
            let before = hand.clone();
            if apply_action(hand, &pick(&uid, choice, bb), now).is_err() {
                prop_assert_eq!(&*hand, &before);
                apply_forced_action(hand, now).expect("forced action is always legal");
            }
            prop_assert_eq!(chips_on_table(&game), total);
        }

        // Доиграть принудительными ходами.
        for _ in 0..200 {
            let Some(hand) = game.active_hand_mut() else { break };
            if hand.is_complete() {
                break;
            }
            now += 1;
            apply_forced_action(hand, now).expect("forced");
        }

        let hand = game.hand.as_ref().expect("hand");
        prop_assert!(hand.is_complete());
        let paid: u64 = hand.payouts.iter().map(|p| p.amount.0).sum();
        prop_assert_eq!(paid, hand.pot_total().0);

        apply_payouts(&mut game, now).expect("payouts");
        let after: u64 = game.players.values().map(|p| p.stack.0).sum();
        prop_assert_eq!(after, total);
    }
}
