use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::{Hand, HandStage, Payout, Street};
use crate::domain::table::{Game, GameStage};
use crate::domain::tournament::{PauseReason, TournamentDetails, TournamentStatus};
use crate::domain::{PlayerId, RoundId, TableId, TournamentId};
use crate::tournament::{AdvanceOutcome, TournamentAction};

/// DTO игрока за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAtTableDto {
    pub player_id: PlayerId,
    pub position: u8,
    pub stack: Chips,
    /// Ставка на текущей улице.
    pub current_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub away: bool,
    /// Карманные карты: только свои, либо вскрытые на шоудауне.
    pub hole_cards: Option<Vec<Card>>,
}

/// DTO стола с точки зрения конкретного зрителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableViewDto {
    pub table_id: TableId,
    pub stage: GameStage,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub hand_id: Option<String>,
    pub street: Option<Street>,
    pub dealer_id: Option<PlayerId>,
    pub total_pot: Chips,
    pub board: Vec<Card>,
    pub players: Vec<PlayerAtTableDto>,
    /// Есть ли активная раздача.
    pub hand_in_progress: bool,
    /// Чей ход (если раздача идёт).
    pub acting_player_id: Option<PlayerId>,
    /// Итог последней раздачи.
    pub payouts: Vec<Payout>,
}

impl TableViewDto {
    /// `viewer` видит свои карты; чужие только после шоудауна.
    pub fn build(game: &Game, viewer: Option<&str>) -> Self {
        let hand = game.hand.as_ref();
        let players = game
            .seated_by_position()
            .into_iter()
            .map(|p| {
                let state = hand.and_then(|h| h.player(&p.id));
                let revealed = hand.map_or(false, |h| is_revealed(h, &p.id));
                let is_viewer = viewer == Some(p.id.as_str());
                PlayerAtTableDto {
                    player_id: p.id.clone(),
                    position: p.position,
                    stack: if game.has_active_hand() {
                        state.map_or(p.stack, |s| s.stack)
                    } else {
                        p.stack
                    },
                    current_bet: if game.has_active_hand() {
                        state.map_or(Chips::ZERO, |s| s.round_contribution)
                    } else {
                        Chips::ZERO
                    },
                    folded: state.map_or(false, |s| s.folded),
                    all_in: state.map_or(false, |s| s.all_in),
                    away: p.away,
                    hole_cards: state
                        .filter(|_| is_viewer || revealed)
                        .map(|s| s.hole_cards.clone()),
                }
            })
            .collect();

        Self {
            table_id: game.id.clone(),
            stage: game.stage,
            small_blind: game.small_blind,
            big_blind: game.big_blind,
            hand_id: hand.map(|h| h.id.clone()),
            street: hand.and_then(|h| h.street()),
            dealer_id: game.dealer_id.clone(),
            total_pot: hand.map_or(Chips::ZERO, |h| h.pot_total()),
            board: hand.map(|h| h.board()).unwrap_or_default(),
            players,
            hand_in_progress: game.has_active_hand(),
            acting_player_id: game.active_hand().and_then(|h| h.acting_player_id.clone()),
            payouts: hand
                .filter(|h| h.is_complete())
                .map(|h| h.payouts.clone())
                .unwrap_or_default(),
        }
    }
}

/// Карты вскрываются, если раздача дошла до шоудауна и игрок не сбросил.
fn is_revealed(hand: &Hand, uid: &str) -> bool {
    let went_to_showdown = matches!(hand.stage, HandStage::Showdown | HandStage::Complete)
        && hand.contenders().len() > 1;
    went_to_showdown && hand.player(uid).map_or(false, |p| !p.folded)
}

/// Строка таблицы результатов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingDto {
    pub player_id: PlayerId,
    pub stack: Chips,
    pub table_id: Option<TableId>,
    pub rebuys: u32,
    pub finishing_place: Option<u32>,
}

/// DTO турнира для лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentViewDto {
    pub tournament_id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub round_id: Option<RoundId>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub round_time_remaining_ms: Option<u64>,
    pub pause_reason: Option<PauseReason>,
    pub pause_message: Option<String>,
    pub players_registered: usize,
    pub players_alive: usize,
    pub tables_running: usize,
    pub winner_id: Option<PlayerId>,
}

impl TournamentViewDto {
    pub fn build(t: &TournamentDetails, now: u64) -> Self {
        let round = t.active_round();
        Self {
            tournament_id: t.id.clone(),
            name: t.name.clone(),
            status: t.status,
            round_id: t.active_round_id,
            small_blind: round.map_or(Chips::ZERO, |r| r.small_blind),
            big_blind: round.map_or(Chips::ZERO, |r| r.big_blind),
            round_time_remaining_ms: t.round_time_remaining(now),
            pause_reason: t.pause_reason,
            pause_message: t.pause_message.clone(),
            players_registered: t.players.len(),
            players_alive: t.alive_count(),
            tables_running: t.live_tables().count(),
            winner_id: t.winner_id.clone(),
        }
    }
}

/// Живые игроки по стеку, затем выбывшие по месту.
pub fn build_standings(t: &TournamentDetails) -> Vec<StandingDto> {
    let mut rows: Vec<StandingDto> = t
        .players
        .values()
        .map(|tp| StandingDto {
            player_id: tp.id().clone(),
            stack: tp.player.stack,
            table_id: tp.table_id.clone(),
            rebuys: tp.rebuys,
            finishing_place: tp.finishing_place,
        })
        .collect();
    rows.sort_by(|a, b| {
        let place = |r: &StandingDto| r.finishing_place.unwrap_or(0);
        place(a)
            .cmp(&place(b))
            .then_with(|| b.stack.cmp(&a.stack))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    rows
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CommandResponse {
    /// Успешный результат без доп. данных.
    Ok,

    /// Турнир запущен, столы созданы.
    Started { tables: Vec<TableId> },

    /// Шаг оркестратора за столом.
    Advanced {
        table: TableViewDto,
        tournament: TournamentViewDto,
        directives: Vec<TournamentAction>,
        auto_advance_duration_ms: Option<u64>,
        auto_advance_games: Vec<TableId>,
    },

    /// Директивы паузы.
    Directives { directives: Vec<TournamentAction> },
}

impl CommandResponse {
    pub fn advanced(outcome: &AdvanceOutcome, viewer: Option<&str>, now: u64) -> Option<Self> {
        let game = outcome.game.as_ref()?;
        Some(CommandResponse::Advanced {
            table: TableViewDto::build(game, viewer),
            tournament: TournamentViewDto::build(&outcome.tournament, now),
            directives: outcome.directives.clone(),
            auto_advance_duration_ms: outcome.auto_advance_duration_ms,
            auto_advance_games: outcome.auto_advance_games.clone(),
        })
    }
}
