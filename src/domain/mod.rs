//! Доменная модель: карты, игроки, столы, раздачи, блайнды, турниры.

pub mod action;
pub mod blinds;
pub mod card;
pub mod chips;
pub mod deck;
pub mod hand;
pub mod player;
pub mod table;
pub mod tournament;

// Идентификаторы приходят извне (документная БД), поэтому строки.
pub type PlayerId = String;
pub type TableId = String;
pub type TournamentId = String;
/// `"{now_ms}-{table_id}"`, см. `infra::ids`.
pub type HandId = String;
pub type RoundId = u32;

pub use action::*;
pub use blinds::*;
pub use card::*;
pub use chips::*;
pub use deck::*;
pub use hand::*;
pub use player::*;
pub use table::*;
pub use tournament::*;
