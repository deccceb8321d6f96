//! Машина состояний одной раздачи: ставки, переход улиц, сайд-поты,
//! выплаты, таймауты.
//!
//! Основные операции:
//!   - `start_hand` – запустить новую раздачу за столом
//!   - `apply_action` / `apply_forced_action` – ход игрока или автоход
//!   - `calculate_hand_winners` / `apply_payouts` – итог раздачи
//!   - `enforce_timeout` – истёк таймер хода

pub mod actions;
pub mod betting;
pub mod errors;
pub mod game_loop;
pub mod payouts;
pub mod positions;
pub mod side_pots;
pub mod timeouts;
pub mod validation;

pub use actions::{forced_action_for, ProposedAction};
pub use errors::{EngineError, IllegalActionReason};
pub use game_loop::{apply_action, apply_forced_action, start_hand};
pub use payouts::{apply_payouts, calculate_hand_winners};
pub use side_pots::{compute_side_pots, SidePot};
pub use timeouts::enforce_timeout;
