//! Настройки движка турнира.
//!
//! Хранятся внутри `TournamentDetails`, поэтому каждый турнир несёт свои
//! параметры и пересчёт всегда детерминирован относительно документа.

use serde::{Deserialize, Serialize};

use crate::domain::deck::PrngKind;
use crate::domain::table::MAX_TABLE_SIZE;

/// Параметры ребаев.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RebuyConfig {
    pub enabled: bool,
    /// Сколько раз один игрок может докупиться.
    pub max_rebuys: u32,
    /// Окно после вылета, в течение которого ребай ещё возможен.
    pub window_ms: u64,
    /// Доп. пауза перед закрытием последнего раунда с ребаями.
    pub last_chance_pause_ms: u64,
}

impl Default for RebuyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_rebuys: 1,
            window_ms: 120_000,
            last_chance_pause_ms: 60_000,
        }
    }
}

/// Конфигурация движка. Все времена в миллисекундах.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Стол меньше этого размера — кандидат на ребаланс.
    pub min_table_size_before_rebalance: usize,
    pub max_table_size: usize,
    /// Использовать «быстрый» ребалансер вместо базового.
    pub enable_performant_rebalances: bool,
    pub rebuy: RebuyConfig,
    /// Сколько даётся на ход до принудительного действия.
    pub action_timeout_ms: u64,
    /// Задержка авто-хода за отошедшего игрока.
    pub away_action_delay_ms: u64,
    /// Пауза между раздачами.
    pub next_hand_delay_ms: u64,
    /// Задержка после директив паузы, пока столы «оседают».
    pub pause_settle_delay_ms: u64,
    /// Окно между завершением турнира и фиксацией результатов.
    pub finalize_grace_ms: u64,
    pub prng: PrngKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_table_size_before_rebalance: 4,
            max_table_size: MAX_TABLE_SIZE,
            enable_performant_rebalances: false,
            rebuy: RebuyConfig::default(),
            action_timeout_ms: 30_000,
            away_action_delay_ms: 1_000,
            next_hand_delay_ms: 3_000,
            pause_settle_delay_ms: 5_000,
            finalize_grace_ms: 600_000,
            prng: PrngKind::Mulberry32,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_table_size < 2 || self.max_table_size > MAX_TABLE_SIZE {
            return Err(format!(
                "EngineConfig: max_table_size must be in [2, {MAX_TABLE_SIZE}], got {}",
                self.max_table_size
            ));
        }
        if self.min_table_size_before_rebalance == 0 {
            return Err("EngineConfig: min_table_size_before_rebalance = 0".into());
        }
        if self.min_table_size_before_rebalance >= self.max_table_size {
            return Err(format!(
                "EngineConfig: min_table_size_before_rebalance ({}) >= max_table_size ({})",
                self.min_table_size_before_rebalance, self.max_table_size
            ));
        }
        if self.action_timeout_ms == 0 {
            return Err("EngineConfig: action_timeout_ms = 0".into());
        }
        if self.rebuy.enabled && self.rebuy.max_rebuys == 0 {
            return Err("EngineConfig: rebuys enabled but max_rebuys = 0".into());
        }
        Ok(())
    }

    /// Разобрать JSON и сразу провалидировать.
    pub fn from_json_str(s: &str) -> Result<Self, String> {
        let cfg: EngineConfig =
            serde_json::from_str(s).map_err(|e| format!("EngineConfig: invalid JSON: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
