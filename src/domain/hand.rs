use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::action::Action;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::{Deck, PrngKind};
use crate::domain::{HandId, PlayerId, TableId};

/// Улица (раунд ставок) раздачи.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// Следующая улица и сколько карт борда на ней открывается.
    pub fn next(self) -> Option<(Street, usize)> {
        match self {
            Street::Preflop => Some((Street::Flop, 3)),
            Street::Flop => Some((Street::Turn, 1)),
            Street::Turn => Some((Street::River, 1)),
            Street::River => None,
        }
    }
}

/// Стадия раздачи. Dealing мгновенная и живёт только внутри `start_hand`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandStage {
    Betting(Street),
    Showdown,
    Complete,
}

/// Ранг руки: [категория:4][r0:4]..[r4:4], больше = сильнее.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(pub u32);

/// Один раунд ставок.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Round {
    pub street: Street,
    /// Общие карты, открытые в начале этого раунда.
    pub cards: Vec<Card>,
    /// Уровень, до которого должны дотянуться все игроки.
    pub target: Chips,
    /// Минимальный размер повышения.
    pub min_raise: Chips,
    pub last_aggressor: Option<PlayerId>,
    pub active: bool,
}

impl Round {
    pub fn new(street: Street, cards: Vec<Card>, min_raise: Chips) -> Self {
        Self {
            street,
            cards,
            target: Chips::ZERO,
            min_raise,
            last_aggressor: None,
            active: true,
        }
    }
}

/// Состояние игрока внутри раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerState {
    pub uid: PlayerId,
    pub position: u8,
    pub hole_cards: Vec<Card>,
    /// Журнал действий игрока за всю раздачу (включая блайнды).
    pub actions: Vec<Action>,
    pub starting_stack: Chips,
    /// Снимок стека по ходу раздачи.
    pub stack: Chips,
    /// Вклад в текущем раунде.
    pub round_contribution: Chips,
    /// Вклад за всю раздачу.
    pub total_contribution: Chips,
    pub folded: bool,
    pub all_in: bool,
    /// Уже действовал в текущем раунде после последнего повышения.
    pub acted: bool,
}

impl PlayerState {
    pub fn new(uid: PlayerId, position: u8, stack: Chips) -> Self {
        Self {
            uid,
            position,
            hole_cards: Vec::new(),
            actions: Vec::new(),
            starting_stack: stack,
            stack,
            round_contribution: Chips::ZERO,
            total_contribution: Chips::ZERO,
            folded: false,
            all_in: false,
            acted: false,
        }
    }

    /// Ещё может ставить: не сфолдил и не в олл-ине.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    pub fn in_hand(&self) -> bool {
        !self.folded
    }
}

/// Выплата одному игроку из одного банка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payout {
    pub uid: PlayerId,
    pub amount: Chips,
    /// Открытые карманные карты (пусто, если карты не вскрывались).
    pub cards: Vec<Card>,
    pub description: String,
    /// Индекс банка: 0 = основной, далее сайд-поты.
    pub pot_index: usize,
}

/// Одна раздача за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hand {
    pub id: HandId,
    pub table_id: TableId,
    /// Seed колоды (= id раздачи) и секретная соль, для реплея.
    pub seed: String,
    pub secure_seed: u32,
    pub prng: PrngKind,
    pub deck: Deck,
    pub dealer_id: PlayerId,
    pub small_blind_id: PlayerId,
    pub big_blind_id: PlayerId,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub rounds: Vec<Round>,
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// Порядок обхода по кругу, начиная с игрока слева от дилера.
    pub order: Vec<PlayerId>,
    pub acting_player_id: Option<PlayerId>,
    pub stage: HandStage,
    pub payouts: Vec<Payout>,
    pub payouts_applied: bool,
    pub started_at: u64,
    /// Время последнего действия (от него считается таймаут хода).
    pub last_action_at: u64,
}

impl Hand {
    pub fn active_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|r| r.active)
    }

    pub fn active_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.active)
    }

    pub fn street(&self) -> Option<Street> {
        match self.stage {
            HandStage::Betting(street) => Some(street),
            _ => None,
        }
    }

    /// Все открытые общие карты.
    pub fn board(&self) -> Vec<Card> {
        self.rounds.iter().flat_map(|r| r.cards.iter().copied()).collect()
    }

    pub fn pot_total(&self) -> Chips {
        self.players.values().map(|p| p.total_contribution).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.stage == HandStage::Complete
    }

    pub fn player(&self, uid: &str) -> Option<&PlayerState> {
        self.players.get(uid)
    }

    /// Игроки, ещё претендующие на банк, в порядке обхода.
    pub fn contenders(&self) -> Vec<&PlayerState> {
        self.order
            .iter()
            .filter_map(|uid| self.players.get(uid))
            .filter(|p| p.in_hand())
            .collect()
    }

    /// Порядковый номер игрока в обходе (0 = слева от дилера).
    pub fn order_index(&self, uid: &str) -> Option<usize> {
        self.order.iter().position(|id| id == uid)
    }

    /// Крайний срок хода текущего игрока.
    pub fn action_deadline(&self, timeout_ms: u64) -> Option<u64> {
        self.acting_player_id
            .as_ref()
            .map(|_| self.last_action_at.saturating_add(timeout_ms))
    }

    pub fn is_timed_out(&self, now: u64, timeout_ms: u64) -> bool {
        self.action_deadline(timeout_ms)
            .map(|deadline| now >= deadline)
            .unwrap_or(false)
    }
}
