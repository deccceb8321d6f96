//! Внешний API движка.
//!
//! - команды (commands.rs) — всё, что меняет состояние турнира;
//! - запросы (queries.rs) — только чтение;
//! - DTO (dto.rs) — представления для клиентов, без чужих карт;
//! - ошибки (errors.rs) — то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
