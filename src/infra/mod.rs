//! Инфраструктурный слой вокруг движка:
//! - генераторы колоды и хеш сида;
//! - id раздач;
//! - хранилище с версиями и драйвер поверх него.

pub mod driver;
pub mod ids;
pub mod persistence;
pub mod rng;
pub mod rng_seed;

pub use driver::{DriverError, TournamentDriver};
pub use ids::{hand_id, parse_hand_timestamp};
pub use persistence::{InMemoryStore, Snapshot, StoreError, TournamentStore, Versioned};
pub use rng::{fresh_secure_seed, generate_deck, shuffle_with, Mulberry32, Sfc32};
pub use rng_seed::{hash_seed, mix_seed};
