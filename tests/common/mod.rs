// tests/common/mod.rs
//
// Общие хелперы интеграционных тестов: столы, подтасованные раздачи,
// турниры с заданной рассадкой.

#![allow(dead_code)]

use std::collections::BTreeMap;

use poker_tournament_engine::config::EngineConfig;
use poker_tournament_engine::domain::blinds::BlindRound;
use poker_tournament_engine::domain::card::parse_cards;
use poker_tournament_engine::domain::chips::Chips;
use poker_tournament_engine::domain::deck::{Deck, PrngKind};
use poker_tournament_engine::domain::hand::Hand;
use poker_tournament_engine::domain::player::Player;
use poker_tournament_engine::domain::table::Game;
use poker_tournament_engine::domain::tournament::{TournamentDetails, TournamentTable};
use poker_tournament_engine::engine::{apply_action, start_hand, EngineError, ProposedAction};

pub const T0: u64 = 1_700_000_000_000;

/// Стол "t" с игроками p0..pN на местах 0..N.
pub fn table(stacks: &[u64], big_blind: u64) -> Game {
    let mut game = Game::new("t", Chips(big_blind));
    for (i, stack) in stacks.iter().enumerate() {
        let uid = format!("p{i}");
        game.players
            .insert(uid.clone(), Player::new(uid, i as u8, Chips(*stack)));
    }
    game
}

/// Начать раздачу с фиксированным id и seed.
pub fn start(game: &mut Game, now: u64) {
    start_hand(game, format!("{now}-t"), 42, PrngKind::Mulberry32, now).expect("hand starts");
}

pub fn hand(game: &Game) -> &Hand {
    game.hand.as_ref().expect("hand exists")
}

pub fn act(game: &mut Game, action: ProposedAction, now: u64) -> Result<(), EngineError> {
    let hand = game.active_hand_mut().ok_or(EngineError::NoActiveHand)?;
    apply_action(hand, &action, now)
}

pub fn acting(game: &Game) -> String {
    hand(game)
        .acting_player_id
        .clone()
        .expect("someone must act")
}

/// Подменить карманные карты и оставшийся борд.
pub fn rig(game: &mut Game, holes: &[(&str, &str)], board: &str) {
    let hand = game.hand.as_mut().expect("hand exists");
    for (uid, cards) in holes {
        let p = hand.players.get_mut(*uid).expect("player in hand");
        p.hole_cards = parse_cards(cards).expect("valid cards");
    }
    hand.deck = Deck {
        cards: parse_cards(board).expect("valid board"),
        next: 0,
    };
}

/// Сумма стеков стола + то, что сейчас в банке.
pub fn chips_on_table(game: &Game) -> u64 {
    match game.active_hand() {
        Some(hand) => {
            let outside: u64 = game
                .players
                .values()
                .filter(|p| !hand.players.contains_key(&p.id))
                .map(|p| p.stack.0)
                .sum();
            let inside: u64 = hand.players.values().map(|p| p.stack.0).sum();
            outside + inside + hand.pot_total().0
        }
        None => game.players.values().map(|p| p.stack.0).sum(),
    }
}

/// Расписание: два раунда с ребаями, дальше без.
pub fn schedule() -> Vec<BlindRound> {
    vec![
        BlindRound::new(1, 10, 20, 10).with_rebuys(),
        BlindRound::new(2, 20, 40, 10).with_rebuys(),
        BlindRound::new(3, 50, 100, 10),
        BlindRound::new(4, 100, 200, 10),
    ]
}

/// Турнир без ребаев, n игроков, ещё не стартовал.
pub fn registered(n: usize, config: EngineConfig) -> TournamentDetails {
    let mut t = TournamentDetails::new("cup", "Cup", config, Chips(1_000), schedule())
        .expect("valid tournament");
    for i in 0..n {
        t.register_player(format!("u{i:02}")).expect("register");
    }
    t
}

pub fn no_rebuy_config() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.rebuy.enabled = false;
    cfg
}

/// Активный турнир с явной рассадкой: `layout` = (стол, игроки).
pub fn seated(layout: &[(&str, &[&str])], config: EngineConfig) -> TournamentDetails {
    let mut t = TournamentDetails::new("cup", "Cup", config, Chips(1_000), schedule())
        .expect("valid tournament");
    for (table_id, players) in layout {
        t.tables.insert(
            table_id.to_string(),
            TournamentTable::new(table_id.to_string(), Chips(10), Chips(20)),
        );
        for (pos, uid) in players.iter().enumerate() {
            t.register_player(*uid).expect("register");
            let tp = t.players.get_mut(*uid).expect("registered");
            tp.table_id = Some(table_id.to_string());
            tp.player.position = pos as u8;
        }
    }
    t.start(T0).expect("start");
    t
}

/// Сколько живых игроков за каждым столом.
pub fn table_sizes(t: &TournamentDetails) -> BTreeMap<String, usize> {
    t.live_tables()
        .map(|table| (table.id.clone(), t.players_at_table(&table.id).count()))
        .collect()
}
