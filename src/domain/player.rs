use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::PlayerId;

/// Игрок за конкретным столом.
///
/// Принадлежит ровно одному столу (`Game.players`). Турнирная обёртка
/// (`TournamentPlayer`) хранит его копию вместе со ссылкой на стол.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Номер места за столом. Задаёт порядок хода по кругу.
    pub position: u8,
    /// Текущий стек (между раздачами; во время раздачи актуален стек в `PlayerState`).
    pub stack: Chips,
    /// Сколько всего внесено в турнир (бай-ин + ребаи).
    pub contributed: Chips,
    /// Участвует ли в раздачах (sit-in).
    pub active: bool,
    /// Удалён со стола / из турнира. Терминальный флаг, запись не удаляется.
    pub removed: bool,
    /// Игрок отошёл: за него движок делает принудительные действия.
    pub away: bool,
    /// Когда стек обнулился (мс). None, пока игрок жив.
    pub busted_at: Option<u64>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, position: u8, stack: Chips) -> Self {
        Self {
            id: id.into(),
            position,
            stack,
            contributed: stack,
            active: true,
            removed: false,
            away: false,
            busted_at: None,
        }
    }

    /// Может ли игрок получить карты в новой раздаче.
    pub fn can_be_dealt_in(&self) -> bool {
        self.active && !self.removed && !self.stack.is_zero()
    }

    pub fn is_busted(&self) -> bool {
        !self.removed && self.stack.is_zero()
    }
}
