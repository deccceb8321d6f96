//! Оценка силы рук Texas Hold'em (5..7 карт).
//!
//! Основная функция:
//!   `evaluate_best_hand(hole, board) -> Option<EvaluatedHand>`

pub mod evaluator;
pub mod hand_rank;

pub use evaluator::{evaluate_best_hand, EvaluatedHand};
pub use hand_rank::{describe_hand, HandCategory};
