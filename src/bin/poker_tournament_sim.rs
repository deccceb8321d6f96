//! Симуляция турнира целиком: боты за всеми столами, часы виртуальные.
//!
//! Запуск: `RUST_LOG=info poker_tournament_sim [игроков] [seed]`.

use std::collections::BTreeMap;

use poker_tournament_engine::api::build_standings;
use poker_tournament_engine::config::EngineConfig;
use poker_tournament_engine::domain::blinds::demo_schedule;
use poker_tournament_engine::domain::chips::Chips;
use poker_tournament_engine::domain::hand::Hand;
use poker_tournament_engine::domain::tournament::{TournamentDetails, TournamentStatus};
use poker_tournament_engine::domain::TableId;
use poker_tournament_engine::engine::betting::to_call;
use poker_tournament_engine::engine::ProposedAction;
use poker_tournament_engine::infra::driver::{DriverError, TournamentDriver};
use poker_tournament_engine::infra::persistence::{InMemoryStore, Snapshot};
use poker_tournament_engine::infra::rng::Mulberry32;
use poker_tournament_engine::tournament::AdvanceContext;

const DEFAULT_PLAYERS: usize = 27;
const DEFAULT_SEED: u32 = 0xC0FFEE;
const START_MS: u64 = 1_700_000_000_000;
/// Сколько бот «думает» над ходом.
const BOT_THINK_MS: u64 = 700;
const MAX_STEPS: usize = 200_000;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let players = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PLAYERS);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    println!("poker_tournament_sim: {players} игроков, seed={seed}");

    if let Err(e) = run(players, seed) {
        eprintln!("[SIM] ОШИБКА: {e}");
        std::process::exit(1);
    }
}

fn run(players: usize, seed: u32) -> Result<(), DriverError> {
    let mut tournament = TournamentDetails::new(
        "sim",
        "Simulated Rebuy",
        EngineConfig::default(),
        Chips(5_000),
        demo_schedule(),
    )?;
    for n in 1..=players {
        tournament.register_player(format!("p{n:03}"))?;
    }

    let mut store = InMemoryStore::new();
    store.insert(Snapshot {
        tournament,
        games: BTreeMap::new(),
    });
    let mut driver = TournamentDriver::new(store, "sim");
    let mut rng = Mulberry32::new(seed);

    let mut now = START_MS;
    let tables = driver.start(now)?;
    println!("[SIM] столов: {}", tables.len());

    // Когда снова будить каждый стол.
    let mut due: BTreeMap<TableId, u64> = tables.into_iter().map(|id| (id, now)).collect();

    for _ in 0..MAX_STEPS {
        let snap = driver.snapshot()?;
        if snap.tournament.status.is_inert() {
            break;
        }

        let Some((table_id, at)) = due
            .iter()
            .min_by_key(|(id, at)| (**at, (*id).clone()))
            .map(|(id, at)| (id.clone(), *at))
        else {
            // Все столы молчат (например, ждут ребаев): разбудим живые.
            now += 1_000;
            for table in snap.tournament.live_tables() {
                due.insert(table.id.clone(), now);
            }
            continue;
        };
        now = now.max(at);

        settle_rebuys(&mut driver, &snap.tournament, now, &mut rng)?;

        let action = snap
            .games
            .get(&table_id)
            .and_then(|g| g.active_hand())
            .and_then(|h| bot_action(h, &mut rng));

        let ctx = AdvanceContext {
            now,
            secure_seed: rng.next(),
        };
        let outcome = match driver.advance(&table_id, action.as_ref(), &ctx) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("стол {table_id}: ход бота отклонён ({e}), шаг без хода");
                driver.advance(&table_id, None, &ctx)?
            }
        };

        due.remove(&table_id);
        let game = outcome.game.as_ref();
        let eliminated = outcome
            .tournament
            .tables
            .get(&table_id)
            .map_or(true, |t| t.eliminated);

        if game.map_or(false, |g| g.has_active_hand()) {
            due.insert(table_id.clone(), now + BOT_THINK_MS);
        } else if !eliminated {
            let wait = outcome
                .auto_advance_duration_ms
                .unwrap_or(outcome.tournament.config.next_hand_delay_ms);
            due.insert(table_id.clone(), now + wait.max(1));
        }

        let wait = outcome.auto_advance_duration_ms.unwrap_or(0);
        for other in &outcome.auto_advance_games {
            let when = now + wait;
            due.entry(other.clone())
                .and_modify(|at| *at = (*at).min(when))
                .or_insert(when);
        }
        due.retain(|id, _| {
            outcome
                .tournament
                .tables
                .get(id)
                .map_or(false, |t| !t.eliminated)
        });
    }

    let Snapshot { tournament: t, games } = driver.snapshot()?;
    let hands: u64 = games.values().map(|g| g.hands_played).sum();
    println!();
    println!("=========== TOURNAMENT SUMMARY ===========");
    println!("Статус: {:?}", t.status);
    println!("Раздач сыграно: {hands}");
    println!(
        "Время турнира: {} с",
        t.ended_at.unwrap_or(now).saturating_sub(START_MS) / 1_000
    );
    if let Some(winner) = &t.winner_id {
        println!("Победитель: {winner}");
    }
    for row in build_standings(&t).iter().take(10) {
        println!(
            "  {:>3} | {} | stack={} | rebuys={}",
            row.finishing_place
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".into()),
            row.player_id,
            row.stack,
            row.rebuys
        );
    }
    println!("==========================================");
    if t.status != TournamentStatus::Ended {
        log::warn!("турнир не закончился за {MAX_STEPS} шагов");
    }
    Ok(())
}

/// Вылетевшие боты решают, докупаться ли (примерно половина соглашается).
fn settle_rebuys(
    driver: &mut TournamentDriver<InMemoryStore>,
    t: &TournamentDetails,
    now: u64,
    rng: &mut Mulberry32,
) -> Result<(), DriverError> {
    let busted: Vec<String> = t
        .players
        .values()
        .filter(|tp| tp.player.stack.is_zero() && tp.player.busted_at.is_some())
        .filter(|tp| t.can_rebuy(tp.id(), now))
        .map(|tp| tp.id().clone())
        .collect();
    for uid in busted {
        if rng.next() % 2 == 0 {
            driver.rebuy(&uid, now)?;
        } else {
            driver.decline_rebuy(&uid)?;
        }
    }
    Ok(())
}

/// Простой бот: чаще колл/чек, иногда фолд или минимальный рейз.
fn bot_action(hand: &Hand, rng: &mut Mulberry32) -> Option<ProposedAction> {
    let uid = hand.acting_player_id.clone()?;
    let round = hand.active_round()?;
    let owed = to_call(hand, &uid);
    let raise_to = round.target.0 + round.min_raise.0.max(hand.big_blind.0);
    let roll = rng.next() % 100;

    let action = if owed.is_zero() {
        match roll {
            0..=69 => ProposedAction::check(uid),
            _ if round.target.is_zero() => ProposedAction::bet(uid, raise_to),
            _ => ProposedAction::raise(uid, raise_to),
        }
    } else {
        match roll {
            0..=14 => ProposedAction::fold(uid),
            15..=84 => ProposedAction::call(uid),
            _ => ProposedAction::raise(uid, raise_to),
        }
    };
    Some(action)
}
