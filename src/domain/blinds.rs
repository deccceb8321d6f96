// src/domain/blinds.rs

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::RoundId;

/// Один блайнд-раунд расписания.
/// Пример: id = 3, SB = 100, BB = 200, interval_minutes = 10.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlindRound {
    /// Порядковый номер раунда (1, 2, 3, ...).
    pub id: RoundId,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Длительность раунда в минутах.
    pub interval_minutes: u64,
    /// Когда раунд фактически начался (мс). None, пока раунд не активен.
    ///
    /// При снятии с административной паузы сдвигается вперёд на длительность
    /// паузы, чтобы таймер блайндов не шёл во время паузы.
    pub timestamp: Option<u64>,
    /// Разрешены ли ребаи, пока идёт этот раунд.
    pub rebuys_allowed: bool,
}

impl BlindRound {
    pub fn new(id: RoundId, small_blind: u64, big_blind: u64, interval_minutes: u64) -> Self {
        Self {
            id,
            small_blind: Chips(small_blind),
            big_blind: Chips(big_blind),
            interval_minutes,
            timestamp: None,
            rebuys_allowed: false,
        }
    }

    pub fn with_rebuys(mut self) -> Self {
        self.rebuys_allowed = true;
        self
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_minutes.saturating_mul(60_000)
    }

    /// Момент, когда раунд истекает (если он запущен).
    pub fn expires_at(&self) -> Option<u64> {
        self.timestamp.map(|ts| ts.saturating_add(self.interval_ms()))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.big_blind.is_zero() {
            return Err(format!("BlindRound {}: big_blind = 0", self.id));
        }
        if self.small_blind > self.big_blind {
            return Err(format!(
                "BlindRound {}: small_blind ({}) > big_blind ({})",
                self.id, self.small_blind, self.big_blind
            ));
        }
        if self.interval_minutes == 0 {
            return Err(format!("BlindRound {}: interval_minutes = 0", self.id));
        }
        Ok(())
    }
}

/// Проверка всего расписания: непустое, id идут подряд с 1,
/// ребаи разрешены только непрерывным префиксом раундов.
pub fn validate_schedule(rounds: &[BlindRound]) -> Result<(), String> {
    if rounds.is_empty() {
        return Err("Blind schedule: empty rounds".into());
    }

    let mut rebuy_closed = false;
    for (idx, round) in rounds.iter().enumerate() {
        round.validate()?;
        let expected = idx as RoundId + 1;
        if round.id != expected {
            return Err(format!(
                "Blind schedule: expected round {}, got {}",
                expected, round.id
            ));
        }
        if round.rebuys_allowed && rebuy_closed {
            return Err(format!(
                "Blind schedule: round {} re-opens rebuys after they closed",
                round.id
            ));
        }
        if !round.rebuys_allowed {
            rebuy_closed = true;
        }
    }

    Ok(())
}

/// Последний раунд, в котором ещё разрешены ребаи.
pub fn last_rebuy_round(rounds: &[BlindRound]) -> Option<RoundId> {
    rounds
        .iter()
        .take_while(|r| r.rebuys_allowed)
        .last()
        .map(|r| r.id)
}

/// Небольшое демо-расписание для CLI и тестов.
pub fn demo_schedule() -> Vec<BlindRound> {
    vec![
        BlindRound::new(1, 25, 50, 10).with_rebuys(),
        BlindRound::new(2, 50, 100, 10).with_rebuys(),
        BlindRound::new(3, 75, 150, 10),
        BlindRound::new(4, 100, 200, 10),
        BlindRound::new(5, 200, 400, 10),
    ]
}
