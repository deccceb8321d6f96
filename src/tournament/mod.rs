// src/tournament/mod.rs
//
// Турнирный слой: директивы, ребаланс, блайнды, пауза и оркестратор,
// который сводит их в один шаг для одного стола.

pub mod apply;
pub mod blinds;
pub mod directives;
pub mod orchestrator;
pub mod pause;
pub mod rebalance;
pub mod rebalance_fast;
pub mod registration;

pub use crate::domain::tournament::TournamentError;
pub use apply::process_actions;
pub use blinds::check_tournament_blinds;
pub use directives::TournamentAction;
pub use orchestrator::{advance_tournament_hand, run_rebalance, AdvanceContext, AdvanceOutcome};
pub use pause::{force_resume, pause_directives, request_administrative_pause, resume};
pub use rebalance::{needed_table_count, rebalance};
pub use rebalance_fast::rebalance_performant;
pub use registration::{
    build_table_games, check_tournament_end, chips_in_play, decline_rebuy, finalize_if_due,
    mark_arrived, rebuy, start_tournament, sync_game_roster,
};
