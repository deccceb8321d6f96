// tests/tournament_balancing_tests.rs
//
// Ребаланс столов:
//  1) выравнивание 6/2 -> 4/4;
//  2) расформирование лишних столов после вылетов;
//  3) несколько столов закрываются за один проход, игрок пересаживается
//     один раз;
//  4) места вылетевших в одной раздаче по стеку;
//  5) пересадка, задевающая раздачу, превращается в запрос паузы;
//  6) базовый и быстрый ребалансеры дают одинаковые директивы (proptest).

mod common;

use std::collections::BTreeMap;

use common::*;
use poker_tournament_engine::config::EngineConfig;
use poker_tournament_engine::domain::chips::Chips;
use poker_tournament_engine::domain::tournament::{
    PauseReason, TournamentDetails, TournamentStatus, TournamentTable,
};
use poker_tournament_engine::infra::ids::hand_id;
use poker_tournament_engine::tournament::{
    advance_tournament_hand, needed_table_count, process_actions, rebalance, rebalance_performant,
    AdvanceContext, TournamentAction,
};
use proptest::prelude::*;

fn add(uid: &str, table_id: &str) -> TournamentAction {
    TournamentAction::AddPlayer {
        uid: uid.into(),
        table_id: table_id.into(),
    }
}

fn remove(uid: &str, table_id: &str) -> TournamentAction {
    TournamentAction::RemovePlayer {
        uid: uid.into(),
        table_id: table_id.into(),
    }
}

fn sizes(expected: &[(&str, usize)]) -> BTreeMap<String, usize> {
    expected.iter().map(|(id, n)| (id.to_string(), *n)).collect()
}

fn bust(t: &mut TournamentDetails, uid: &str) {
    let tp = t.players.get_mut(uid).expect("player");
    tp.player.stack = Chips::ZERO;
    tp.player.busted_at = Some(T0);
}

fn eliminate_table(table_id: &str) -> TournamentAction {
    TournamentAction::EliminateTable {
        table_id: table_id.into(),
    }
}

fn set_hand(t: &mut TournamentDetails, table_id: &str, started_at: u64) {
    let table = t.tables.get_mut(table_id).expect("table");
    table.active_hand_id = Some(hand_id(started_at, &table_id.to_string()));
}

#[test]
fn table_count_follows_both_bounds() {
    assert_eq!(needed_table_count(9, 4, 8), 2);
    assert_eq!(needed_table_count(5, 4, 8), 1);
    assert_eq!(needed_table_count(6, 4, 8), 2);
    assert_eq!(needed_table_count(64, 4, 8), 13);
    assert_eq!(needed_table_count(64, 7, 8), 8);
}

#[test]
fn balanced_tables_produce_nothing() {
    let t = seated(
        &[("t1", &["a1", "a2", "a3", "a4"]), ("t2", &["b1", "b2", "b3", "b4"])],
        EngineConfig::default(),
    );
    assert_eq!(rebalance(&t, T0), Ok(vec![]));
    assert_eq!(rebalance_performant(&t, T0), Ok(vec![]));
}

#[test]
fn short_table_is_filled_from_the_largest() {
    let mut t = seated(
        &[
            ("t1", &["a1", "a2", "a3", "a4", "a5", "a6"]),
            ("t2", &["b1", "b2"]),
        ],
        EngineConfig::default(),
    );

    let directives = rebalance(&t, T0).expect("plan");
    // С большого стола уходят игроки с наибольшими id.
    assert_eq!(
        directives,
        vec![
            remove("a6", "t1"),
            remove("a5", "t1"),
            add("a6", "t2"),
            add("a5", "t2"),
        ]
    );

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(table_sizes(&t), sizes(&[("t1", 4), ("t2", 4)]));
    // Новые игроки садятся на первые свободные места.
    assert_eq!(t.players["a6"].player.position, 2);
    assert_eq!(t.players["a5"].player.position, 3);

    assert_eq!(rebalance(&t, T0), Ok(vec![]));
}

#[test]
fn smallest_table_is_dissolved_round_robin() {
    let t = seated(
        &[
            ("t1", &["x1", "x2", "x3"]),
            ("t2", &["y1", "y2", "y3"]),
            ("t3", &["z1", "z2", "z3"]),
        ],
        EngineConfig::default(),
    );

    // 9 игроков, min 4: нужно два стола; при равенстве закрывается t1.
    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(
        directives,
        vec![
            remove("x1", "t1"),
            remove("x2", "t1"),
            remove("x3", "t1"),
            TournamentAction::EliminateTable {
                table_id: "t1".into()
            },
            add("x1", "t2"),
            add("x2", "t3"),
            add("x3", "t2"),
        ]
    );
}

#[test]
fn elimination_collapses_to_one_table() {
    let mut t = seated(
        &[("t1", &["a", "b", "c"]), ("t2", &["d", "e", "f"])],
        no_rebuy_config(),
    );
    bust(&mut t, "f");

    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(
        directives,
        vec![
            TournamentAction::EliminatePlayer {
                uid: "f".into(),
                table_id: Some("t2".into())
            },
            remove("d", "t2"),
            remove("e", "t2"),
            TournamentAction::EliminateTable {
                table_id: "t2".into()
            },
            add("d", "t1"),
            add("e", "t1"),
        ]
    );

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(t.players["f"].finishing_place, Some(6));
    assert!(t.tables["t2"].eliminated);
    assert_eq!(table_sizes(&t), sizes(&[("t1", 5)]));
    assert_eq!(t.players["d"].player.position, 3);
    assert_eq!(t.players["e"].player.position, 4);
}

#[test]
fn two_small_tables_fold_into_the_survivor() {
    let mut t = seated(
        &[("ta", &["a1"]), ("tb", &["b1"]), ("tc", &["c1", "c2", "c3"])],
        EngineConfig::default(),
    );

    // 5 игроков, min 4: нужен один стол, закрываются ta и tb разом.
    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(
        directives,
        vec![
            remove("a1", "ta"),
            remove("b1", "tb"),
            eliminate_table("ta"),
            eliminate_table("tb"),
            add("a1", "tc"),
            add("b1", "tc"),
        ]
    );
    assert_eq!(rebalance_performant(&t, T0), Ok(directives.clone()));

    // Оркестратор на том же турнире тоже не падает.
    let ctx = AdvanceContext {
        now: T0,
        secure_seed: 7,
    };
    let outcome = advance_tournament_hand(&t, None, None, &ctx).expect("advance");
    assert_eq!(table_sizes(&outcome.tournament), sizes(&[("tc", 5)]));

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(table_sizes(&t), sizes(&[("tc", 5)]));
    assert_eq!(rebalance(&t, T0), Ok(vec![]));
}

#[test]
fn dissolved_players_only_land_on_surviving_tables() {
    let mut cfg = EngineConfig::default();
    cfg.min_table_size_before_rebalance = 3;
    let mut t = seated(
        &[
            ("ta", &["a1"]),
            ("tb", &["b1"]),
            ("tc", &["c1", "c2"]),
            ("td", &["d1", "d2", "d3"]),
        ],
        cfg,
    );

    // 7 игроков, min 3: два стола. tc (2) принимает обоих, 4/3.
    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(
        directives,
        vec![
            remove("a1", "ta"),
            remove("b1", "tb"),
            eliminate_table("ta"),
            eliminate_table("tb"),
            add("a1", "tc"),
            add("b1", "tc"),
        ]
    );
    assert_eq!(rebalance_performant(&t, T0), Ok(directives.clone()));

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(table_sizes(&t), sizes(&[("tc", 4), ("td", 3)]));
    assert_eq!(rebalance(&t, T0), Ok(vec![]));
}

#[test]
fn same_hand_busts_are_placed_by_starting_stack() {
    let mut t = seated(&[("t1", &["a", "b", "c", "d"])], no_rebuy_config());
    bust(&mut t, "a");
    bust(&mut t, "b");
    bust(&mut t, "c");
    t.players.get_mut("a").expect("a").last_hand_stack = Chips(800);
    t.players.get_mut("b").expect("b").last_hand_stack = Chips(300);
    // c вылетел раньше, хоть и с большим стеком.
    let c = t.players.get_mut("c").expect("c");
    c.last_hand_stack = Chips(2_000);
    c.player.busted_at = Some(T0 - 5_000);

    let directives = rebalance(&t, T0).expect("plan");
    let order: Vec<&str> = directives
        .iter()
        .filter_map(|d| match d {
            TournamentAction::EliminatePlayer { uid, .. } => Some(uid.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["c", "b", "a"]);
    assert_eq!(rebalance_performant(&t, T0), Ok(directives.clone()));

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(t.players["c"].finishing_place, Some(4));
    assert_eq!(t.players["b"].finishing_place, Some(3));
    assert_eq!(t.players["a"].finishing_place, Some(2));
}

#[test]
fn busted_player_with_rebuy_stays_seated() {
    let mut t = seated(
        &[("t1", &["a", "b", "c"]), ("t2", &["d", "e", "f"])],
        EngineConfig::default(),
    );
    bust(&mut t, "f");

    // Окно ребая ещё открыто: игрок считается активным.
    assert_eq!(rebalance(&t, T0 + 1_000), Ok(vec![]));

    // Окно закрылось: выбывает.
    let later = T0 + t.config.rebuy.window_ms;
    let directives = rebalance(&t, later).expect("plan");
    assert!(matches!(
        directives.first(),
        Some(TournamentAction::EliminatePlayer { uid, .. }) if uid == "f"
    ));
}

#[test]
fn moves_touching_a_hand_request_pause() {
    let mut t = seated(
        &[
            ("t1", &["a1", "a2", "a3", "a4", "a5", "a6"]),
            ("t2", &["b1", "b2"]),
        ],
        EngineConfig::default(),
    );
    set_hand(&mut t, "t1", T0);

    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(directives.len(), 1);
    match &directives[0] {
        TournamentAction::RequestPause {
            reason,
            duration_ms,
            upcoming_round_id,
            ..
        } => {
            assert_eq!(*reason, PauseReason::Rebalance);
            assert_eq!(*duration_ms, t.config.pause_settle_delay_ms);
            assert_eq!(*upcoming_round_id, None);
        }
        other => panic!("expected RequestPause, got {other:?}"),
    }
    assert_eq!(rebalance_performant(&t, T0), Ok(directives));
}

#[test]
fn pausing_tournament_only_moves_between_idle_tables() {
    let mut t = seated(
        &[
            ("t1", &["a1", "a2", "a3", "a4", "a5", "a6"]),
            ("t2", &["b1", "b2"]),
        ],
        EngineConfig::default(),
    );
    set_hand(&mut t, "t1", T0);
    t.status = TournamentStatus::PauseRequested;

    // Все пересадки задевают t1 с раздачей: ждём.
    assert_eq!(rebalance(&t, T0), Ok(vec![]));

    t.tables.get_mut("t1").expect("t1").active_hand_id = None;
    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(directives.iter().filter(|d| d.is_move()).count(), 4);
}

#[test]
fn paused_dissolve_skips_seats_at_a_busy_table() {
    let mut t = seated(
        &[
            ("t1", &["x1", "x2", "x3"]),
            ("t2", &["y1", "y2", "y3"]),
            ("t3", &["z1", "z2", "z3"]),
        ],
        EngineConfig::default(),
    );
    t.status = TournamentStatus::Paused;
    set_hand(&mut t, "t1", T0);

    // Закрывается t2 (без раздачи). y2 должен сесть за t1, где идёт
    // раздача: его пересадка откладывается, стол пока не закрывается.
    let directives = rebalance(&t, T0).expect("plan");
    assert_eq!(
        directives,
        vec![
            remove("y1", "t2"),
            remove("y3", "t2"),
            add("y1", "t3"),
            add("y3", "t3"),
        ]
    );
    assert_eq!(rebalance_performant(&t, T0), Ok(directives.clone()));

    process_actions(&mut t, &directives, T0).expect("apply");
    assert_eq!(table_sizes(&t), sizes(&[("t1", 3), ("t2", 1), ("t3", 5)]));
}

/// Стол: игроки (флаг = вылетел) и, возможно, активная раздача.
type Layout = Vec<(Vec<bool>, Option<u64>)>;

fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop::collection::vec(
        (
            prop::collection::vec(prop::bool::weighted(0.2), 1..=8),
            prop::option::weighted(0.3, 0u64..5),
        ),
        2..=7,
    )
}

fn status_strategy() -> impl Strategy<Value = TournamentStatus> {
    prop_oneof![
        Just(TournamentStatus::Active),
        Just(TournamentStatus::PauseRequested),
        Just(TournamentStatus::Paused),
    ]
}

fn build(layout: &Layout, min_before: usize, rebuys: bool, status: TournamentStatus) -> TournamentDetails {
    let mut cfg = EngineConfig::default();
    cfg.min_table_size_before_rebalance = min_before;
    cfg.rebuy.enabled = rebuys;
    let mut t = TournamentDetails::new("cup", "Cup", cfg, Chips(1_000), schedule())
        .expect("valid tournament");

    for (n, (players, _)) in layout.iter().enumerate() {
        let table_id = format!("t{n}");
        t.tables
            .insert(table_id.clone(), TournamentTable::new(table_id.clone(), Chips(10), Chips(20)));
        for (pos, _) in players.iter().enumerate() {
            let uid = format!("u{n}-{pos}");
            t.register_player(uid.clone()).expect("register");
            let tp = t.players.get_mut(&uid).expect("registered");
            tp.table_id = Some(table_id.clone());
            tp.player.position = pos as u8;
        }
    }
    t.start(T0).expect("start");

    for (n, (players, hand)) in layout.iter().enumerate() {
        let table_id = format!("t{n}");
        for (pos, busted) in players.iter().enumerate() {
            if *busted {
                bust(&mut t, &format!("u{n}-{pos}"));
            }
        }
        if let Some(offset) = hand {
            set_hand(&mut t, &table_id, T0 + offset * 1_000);
        }
    }
    t.status = status;
    t
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn performant_rebalance_matches_baseline(
        layout in layout_strategy(),
        min_before in 1usize..=7,
        rebuys in any::<bool>(),
        status in status_strategy(),
    ) {
        let t = build(&layout, min_before, rebuys, status);
        let baseline = rebalance(&t, T0 + 10_000);
        let fast = rebalance_performant(&t, T0 + 10_000);
        prop_assert!(baseline.is_ok());
        prop_assert_eq!(baseline, fast);
    }

    /// Ни одна пересадка не трогает стол с раздачей.
    #[test]
    fn moves_never_touch_a_running_hand(
        layout in layout_strategy(),
        min_before in 1usize..=7,
        status in status_strategy(),
    ) {
        let t = build(&layout, min_before, false, status);
        let directives = rebalance(&t, T0).expect("plan");
        for d in directives.iter().filter(|d| d.is_move()) {
            let table_id = d.table_id().expect("moves name a table");
            prop_assert!(!t.table_has_active_hand(table_id), "{:?}", d);
        }
    }

    /// Без активных раздач ребаланс сходится за пару проходов.
    #[test]
    fn idle_rebalance_converges(
        table_sizes_in in prop::collection::vec(1usize..=8, 2..=7),
        min_before in 1usize..=7,
    ) {
        let layout: Layout = table_sizes_in.iter().map(|n| (vec![false; *n], None)).collect();
        let mut t = build(&layout, min_before, false, TournamentStatus::Active);
        let total = t.alive_count();
        let needed = needed_table_count(total, min_before, t.config.max_table_size);

        let mut passes = 0;
        loop {
            let directives = rebalance(&t, T0).expect("plan");
            if directives.is_empty() {
                break;
            }
            // Каждый игрок пересаживается не больше одного раза за проход.
            let mut moved: Vec<&String> = directives
                .iter()
                .filter_map(|d| match d {
                    TournamentAction::RemovePlayer { uid, .. } => Some(uid),
                    _ => None,
                })
                .collect();
            let removals = moved.len();
            moved.sort();
            moved.dedup();
            prop_assert_eq!(moved.len(), removals);

            let dissolving = directives
                .iter()
                .any(|d| matches!(d, TournamentAction::EliminateTable { .. }));
            process_actions(&mut t, &directives, T0).expect("apply");
            passes += 1;
            prop_assert!(passes <= 2, "no convergence: {:?}", table_sizes(&t));

            // Выравнивание доводит разницу до одного игрока.
            if !dissolving {
                let sizes = table_sizes(&t);
                let largest = sizes.values().max().copied().unwrap_or(0);
                let smallest = sizes.values().min().copied().unwrap_or(0);
                prop_assert!(largest - smallest <= 1, "{:?}", sizes);
            }
        }

        let after = table_sizes(&t);
        prop_assert_eq!(after.values().sum::<usize>(), total);
        prop_assert!(after.values().all(|n| *n <= t.config.max_table_size));
        prop_assert_eq!(after.len(), layout.len().min(needed));

        // Итог: стол меньше min допустим, только если он отстаёт от
        // самого большого не больше чем на одного.
        let largest = after.values().max().copied().unwrap_or(0);
        for (id, n) in &after {
            prop_assert!(*n >= min_before || *n + 1 >= largest, "{} {:?}", id, after);
        }
    }

    /// Два и больше закрываемых стола за проход: план применяется.
    #[test]
    fn multi_table_dissolve_applies_cleanly(
        singles in 2usize..=4,
        big in 2usize..=6,
        min_before in 2usize..=5,
    ) {
        let mut layout: Layout = vec![(vec![false], None); singles];
        layout.push((vec![false; big], None));
        let mut t = build(&layout, min_before, false, TournamentStatus::Active);

        let baseline = rebalance(&t, T0);
        prop_assert_eq!(&baseline, &rebalance_performant(&t, T0));
        let directives = baseline.expect("plan");
        process_actions(&mut t, &directives, T0).expect("apply");
        prop_assert_eq!(table_sizes(&t).values().sum::<usize>(), singles + big);
    }
}
