// src/domain/tournament.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::domain::blinds::{validate_schedule, BlindRound};
use crate::domain::chips::Chips;
use crate::domain::player::Player;
use crate::domain::{HandId, PlayerId, RoundId, TableId, TournamentId};
use crate::engine::errors::EngineError;

/// Статус турнира.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentStatus {
    Initialized,
    Active,
    /// Пауза запрошена: текущие раздачи доигрываются, новые не начинаются.
    PauseRequested,
    Paused,
    Ended,
    /// Результаты зафиксированы, документ больше не меняется.
    Finalized,
}

impl TournamentStatus {
    pub fn is_pausing(self) -> bool {
        matches!(self, TournamentStatus::PauseRequested | TournamentStatus::Paused)
    }

    /// В этих статусах оркестратор ничего не делает.
    pub fn is_inert(self) -> bool {
        matches!(
            self,
            TournamentStatus::Initialized | TournamentStatus::Ended | TournamentStatus::Finalized
        )
    }
}

/// Причина паузы. Определяет, что делать при снятии с паузы.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PauseReason {
    /// Пересадка игроков между столами.
    Rebalance,
    /// Переход блайнд-раунда отложен (последний шанс на ребай).
    RoundAdvance,
    /// Пауза, поставленная администратором.
    Administrative,
}

/// Игрок в турнире: табличный `Player` + турнирные поля.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentPlayer {
    #[serde(flatten)]
    pub player: Player,
    /// За каким столом сидит (слабая ссылка на `TournamentTable.id`).
    pub table_id: Option<TableId>,
    /// Подтвердил присутствие.
    pub arrived: bool,
    /// Отказался от ребая — после вылета сразу выбывает.
    pub rebuy_declined: bool,
    pub rebuys: u32,
    /// Итоговое место (1 = победитель).
    pub finishing_place: Option<u32>,
    /// Стек на начало последней сыгранной раздачи.
    #[serde(default)]
    pub last_hand_stack: Chips,
}

impl TournamentPlayer {
    pub fn new(id: impl Into<PlayerId>, stack: Chips) -> Self {
        Self {
            player: Player::new(id, 0, stack),
            table_id: None,
            arrived: false,
            rebuy_declined: false,
            rebuys: 0,
            finishing_place: None,
            last_hand_stack: stack,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.player.id
    }

    pub fn is_removed(&self) -> bool {
        self.player.removed
    }
}

/// Краткая запись о столе внутри турнира.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentTable {
    pub id: TableId,
    /// Зеркало `Game.active_hand_id`, обновляется оркестратором.
    pub active_hand_id: Option<HandId>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub eliminated: bool,
}

impl TournamentTable {
    pub fn new(id: impl Into<TableId>, small_blind: Chips, big_blind: Chips) -> Self {
        Self {
            id: id.into(),
            active_hand_id: None,
            small_blind,
            big_blind,
            eliminated: false,
        }
    }
}

/// Агрегат турнира.
///
/// Инварианты:
/// - в `Paused`/`PauseRequested` ни один стол не начинает новую раздачу;
/// - игроков не пересаживают, пока у затронутого стола есть `active_hand_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentDetails {
    pub id: TournamentId,
    pub name: String,
    pub config: EngineConfig,
    pub starting_stack: Chips,

    /// Расписание блайндов.
    pub rounds: Vec<BlindRound>,
    pub active_round_id: Option<RoundId>,
    /// Следующий раунд, переход в который отложен паузой.
    pub upcoming_round_id: Option<RoundId>,

    pub status: TournamentStatus,
    pub pause_start_timestamp: Option<u64>,
    /// Запланированная длительность паузы.
    pub pause_duration: u64,
    pub pause_end_timestamp: Option<u64>,
    pub pause_reason: Option<PauseReason>,
    /// Пояснение для клиентов, почему турнир стоит.
    pub pause_message: Option<String>,

    pub players: BTreeMap<PlayerId, TournamentPlayer>,
    pub tables: BTreeMap<TableId, TournamentTable>,

    pub started_at: Option<u64>,
    pub ended_at: Option<u64>,
    /// До этого момента результаты ещё можно оспорить.
    pub finalize_at: Option<u64>,
    pub winner_id: Option<PlayerId>,
}

impl TournamentDetails {
    pub fn new(
        id: impl Into<TournamentId>,
        name: impl Into<String>,
        config: EngineConfig,
        starting_stack: Chips,
        rounds: Vec<BlindRound>,
    ) -> Result<Self, TournamentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TournamentError::InvalidConfig("Tournament: name is empty".into()));
        }
        if starting_stack.is_zero() {
            return Err(TournamentError::InvalidConfig(
                "Tournament: starting_stack = 0".into(),
            ));
        }
        config.validate().map_err(TournamentError::InvalidConfig)?;
        validate_schedule(&rounds).map_err(TournamentError::InvalidConfig)?;

        Ok(Self {
            id: id.into(),
            name,
            config,
            starting_stack,
            rounds,
            active_round_id: None,
            upcoming_round_id: None,
            status: TournamentStatus::Initialized,
            pause_start_timestamp: None,
            pause_duration: 0,
            pause_end_timestamp: None,
            pause_reason: None,
            pause_message: None,
            players: BTreeMap::new(),
            tables: BTreeMap::new(),
            started_at: None,
            ended_at: None,
            finalize_at: None,
            winner_id: None,
        })
    }

    // ------------------------------------------------------------------
    // Блайнды
    // ------------------------------------------------------------------

    pub fn round(&self, id: RoundId) -> Option<&BlindRound> {
        self.rounds.iter().find(|r| r.id == id)
    }

    pub fn round_mut(&mut self, id: RoundId) -> Option<&mut BlindRound> {
        self.rounds.iter_mut().find(|r| r.id == id)
    }

    pub fn active_round(&self) -> Option<&BlindRound> {
        self.active_round_id.and_then(|id| self.round(id))
    }

    pub fn next_round_after(&self, id: RoundId) -> Option<&BlindRound> {
        let idx = self.rounds.iter().position(|r| r.id == id)?;
        self.rounds.get(idx + 1)
    }

    /// Блайнды текущего раунда (до старта: первого), `(малый, большой)`.
    pub fn current_blinds(&self) -> (Chips, Chips) {
        self.active_round()
            .or_else(|| self.rounds.first())
            .map(|r| (r.small_blind, r.big_blind))
            .unwrap_or((Chips::ZERO, Chips::ZERO))
    }

    /// Сколько осталось до конца текущего раунда.
    ///
    /// Во время паузы время «заморожено» на момент её начала.
    pub fn round_time_remaining(&self, now: u64) -> Option<u64> {
        let round = self.active_round()?;
        let expires = round.expires_at()?;
        let clock = match (self.status, self.pause_start_timestamp) {
            (TournamentStatus::Paused, Some(start)) => start,
            _ => now,
        };
        Some(expires.saturating_sub(clock))
    }

    // ------------------------------------------------------------------
    // Игроки и столы
    // ------------------------------------------------------------------

    /// Неудалённые игроки за конкретным столом.
    pub fn players_at_table<'a>(
        &'a self,
        table_id: &'a str,
    ) -> impl Iterator<Item = &'a TournamentPlayer> + 'a {
        self.players
            .values()
            .filter(move |p| !p.is_removed() && p.table_id.as_deref() == Some(table_id))
    }

    pub fn live_tables(&self) -> impl Iterator<Item = &TournamentTable> {
        self.tables.values().filter(|t| !t.eliminated)
    }

    pub fn any_active_hand(&self) -> bool {
        self.live_tables().any(|t| t.active_hand_id.is_some())
    }

    pub fn table_has_active_hand(&self, table_id: &str) -> bool {
        self.tables
            .get(table_id)
            .map(|t| t.active_hand_id.is_some())
            .unwrap_or(false)
    }

    /// Может ли вылетевший игрок сейчас докупиться.
    pub fn can_rebuy(&self, uid: &str, now: u64) -> bool {
        let rebuy = &self.config.rebuy;
        if !rebuy.enabled {
            return false;
        }
        let Some(tp) = self.players.get(uid) else {
            return false;
        };
        if tp.is_removed() || tp.rebuy_declined || tp.rebuys >= rebuy.max_rebuys {
            return false;
        }
        let round_allows = self
            .active_round()
            .map(|r| r.rebuys_allowed)
            .unwrap_or(false);
        if !round_allows {
            return false;
        }
        match tp.player.busted_at {
            Some(busted_at) => now < busted_at.saturating_add(rebuy.window_ms),
            // Ещё не вылетел — окно откроется после вылета.
            None => true,
        }
    }

    /// Игроки, которые ещё могут играть (жив или может докупиться).
    pub fn eligible_player_ids(&self, now: u64) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| !p.is_removed())
            .filter(|p| !p.player.stack.is_zero() || self.can_rebuy(&p.player.id, now))
            .map(|p| p.player.id.clone())
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_removed()).count()
    }

    // ------------------------------------------------------------------
    // Регистрация и рассадка
    // ------------------------------------------------------------------

    /// Регистрируем игрока (пока турнир в статусе Initialized).
    pub fn register_player(&mut self, uid: impl Into<PlayerId>) -> Result<(), TournamentError> {
        let uid = uid.into();
        if self.status != TournamentStatus::Initialized {
            return Err(TournamentError::InvalidStatus {
                expected: TournamentStatus::Initialized,
                found: self.status,
            });
        }
        if self.players.contains_key(&uid) {
            return Err(TournamentError::AlreadyRegistered {
                player_id: uid,
                tournament_id: self.id.clone(),
            });
        }
        self.players
            .insert(uid.clone(), TournamentPlayer::new(uid, self.starting_stack));
        Ok(())
    }

    /// Рассадка игроков по столам при старте.
    ///
    /// Столов ровно столько, чтобы ни за одним не было больше `max_table_size`;
    /// игроки раскладываются по кругу, так что размеры отличаются максимум на 1.
    /// Возвращает `(table_id, [player_id, ...])`.
    pub fn seat_players_evenly(&mut self) -> Vec<(TableId, Vec<PlayerId>)> {
        let mut ids: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| !p.is_removed())
            .map(|p| p.player.id.clone())
            .collect();
        ids.sort();

        if ids.is_empty() {
            return Vec::new();
        }

        let max = self.config.max_table_size.max(2);
        let table_count = ids.len().div_ceil(max);
        let (small_blind, big_blind) = self.current_blinds();

        let mut seating: Vec<(TableId, Vec<PlayerId>)> = (0..table_count)
            .map(|n| (format!("{}-t{}", self.id, n + 1), Vec::new()))
            .collect();

        for (i, uid) in ids.into_iter().enumerate() {
            seating[i % table_count].1.push(uid);
        }

        for (table_id, uids) in &seating {
            self.tables
                .insert(table_id.clone(), TournamentTable::new(table_id.clone(), small_blind, big_blind));
            for (position, uid) in uids.iter().enumerate() {
                if let Some(tp) = self.players.get_mut(uid) {
                    tp.table_id = Some(table_id.clone());
                    tp.player.position = position as u8;
                }
            }
        }

        seating
    }

    /// Старт турнира: первый блайнд-раунд начинает отсчёт.
    pub fn start(&mut self, now: u64) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Initialized {
            return Err(TournamentError::InvalidStatus {
                expected: TournamentStatus::Initialized,
                found: self.status,
            });
        }
        if self.alive_count() < 2 {
            return Err(TournamentError::NotEnoughPlayers {
                tournament_id: self.id.clone(),
            });
        }
        if self.tables.is_empty() {
            self.seat_players_evenly();
        }

        let first = self
            .rounds
            .first()
            .map(|r| r.id)
            .ok_or_else(|| TournamentError::InvalidConfig("Tournament: no blind rounds".into()))?;
        if let Some(round) = self.round_mut(first) {
            round.timestamp = Some(now);
        }
        self.active_round_id = Some(first);
        let (small_blind, big_blind) = self.current_blinds();
        for table in self.tables.values_mut() {
            table.small_blind = small_blind;
            table.big_blind = big_blind;
        }

        self.status = TournamentStatus::Active;
        self.started_at = Some(now);
        Ok(())
    }
}

/// Ошибки турнирного слоя.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TournamentError {
    #[error("Player {player_id} is already registered in tournament {tournament_id}")]
    AlreadyRegistered {
        player_id: PlayerId,
        tournament_id: TournamentId,
    },

    #[error("Player {player_id} is not registered in tournament {tournament_id}")]
    PlayerNotRegistered {
        player_id: PlayerId,
        tournament_id: TournamentId,
    },

    #[error("Not enough players to start tournament {tournament_id}")]
    NotEnoughPlayers { tournament_id: TournamentId },

    #[error("Table {0} is not part of the tournament")]
    TableNotFound(TableId),

    #[error("Player {0} cannot rebuy right now")]
    RebuyNotAllowed(PlayerId),

    #[error("Invalid tournament status, expected {expected:?}, found {found:?}")]
    InvalidStatus {
        expected: TournamentStatus,
        found: TournamentStatus,
    },

    #[error("Invalid tournament config: {0}")]
    InvalidConfig(String),

    /// Нарушен внутренний инвариант — транзакцию нужно прервать.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
