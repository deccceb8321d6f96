//! Движок многостольного покерного турнира (Texas Hold'em).
//!
//! Слои:
//! - `domain`     — данные: карты, фишки, игроки, столы, раздачи, турнир;
//! - `eval`       — сила руки из 5..7 карт;
//! - `engine`     — машина состояний раздачи (ставки, банки, выплаты);
//! - `tournament` — директивы, ребаланс, блайнды, пауза, оркестратор;
//! - `infra`      — генераторы колоды, id, хранилище с версиями, драйвер;
//! - `api`        — JSON-команды, запросы и ошибки для клиентов.
//!
//! Все операции детерминированы: время и `secure_seed` приходят снаружи.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod tournament;

pub use config::{EngineConfig, RebuyConfig};
pub use engine::{EngineError, ProposedAction};
pub use tournament::{advance_tournament_hand, AdvanceContext, AdvanceOutcome, TournamentAction, TournamentError};
