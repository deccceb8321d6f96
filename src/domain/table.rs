use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::player::Player;
use crate::domain::{HandId, PlayerId, TableId, TournamentId};

/// Максимум мест за турнирным столом.
pub const MAX_TABLE_SIZE: usize = 8;

/// Стадия стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStage {
    Initialized,
    /// Ждём, пока наберётся ≥2 игроков со стеком.
    Waiting,
    Active,
    Paused,
    Ended,
}

/// Стол (документ игры).
///
/// Инвариант: `active_hand_id` задан только пока раздача не разрешена.
/// `hand` хранит последнюю раздачу (активную или уже завершённую), чтобы
/// клиенты могли показать итог.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: TableId,
    pub tournament_id: Option<TournamentId>,
    pub players: BTreeMap<PlayerId, Player>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub stage: GameStage,
    pub active_hand_id: Option<HandId>,
    pub hand: Option<Hand>,
    /// Дилер последней раздачи (для ротации кнопки).
    pub dealer_id: Option<PlayerId>,
    pub hands_played: u64,
    pub max_seats: u8,
}

impl Game {
    /// Стол вне турнира: малый блайнд = половина большого.
    pub fn new(id: impl Into<TableId>, big_blind: Chips) -> Self {
        Self {
            id: id.into(),
            tournament_id: None,
            players: BTreeMap::new(),
            small_blind: Chips(big_blind.0 / 2),
            big_blind,
            stage: GameStage::Initialized,
            active_hand_id: None,
            hand: None,
            dealer_id: None,
            hands_played: 0,
            max_seats: MAX_TABLE_SIZE as u8,
        }
    }

    pub fn has_active_hand(&self) -> bool {
        self.active_hand_id.is_some()
    }

    /// Активная (неразрешённая) раздача.
    pub fn active_hand(&self) -> Option<&Hand> {
        match (&self.active_hand_id, &self.hand) {
            (Some(id), Some(hand)) if &hand.id == id => Some(hand),
            _ => None,
        }
    }

    pub fn active_hand_mut(&mut self) -> Option<&mut Hand> {
        match (&self.active_hand_id, &mut self.hand) {
            (Some(id), Some(hand)) if &hand.id == id => Some(hand),
            _ => None,
        }
    }

    /// Неудалённые игроки, отсортированные по месту.
    pub fn seated_by_position(&self) -> Vec<&Player> {
        let mut seated: Vec<&Player> = self.players.values().filter(|p| !p.removed).collect();
        seated.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        seated
    }

    /// Игроки, которых можно сдать в новую раздачу.
    pub fn eligible_for_hand(&self) -> Vec<&Player> {
        self.seated_by_position()
            .into_iter()
            .filter(|p| p.can_be_dealt_in())
            .collect()
    }
}
