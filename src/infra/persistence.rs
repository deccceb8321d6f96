use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::table::Game;
use crate::domain::tournament::TournamentDetails;
use crate::domain::{TableId, TournamentId};

/// Всё, что хранится по турниру: турнирный документ и документы столов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub tournament: TournamentDetails,
    pub games: BTreeMap<TableId, Game>,
}

/// Снимок + версия, с которой его прочитали.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Кто-то успел записать раньше: перечитать и повторить весь вызов.
    #[error("stale state: expected version {expected}, found {found}")]
    StaleState { expected: u64, found: u64 },

    #[error("tournament {0} not found")]
    NotFound(TournamentId),
}

/// Хранилище турниров с оптимистичной блокировкой.
///
/// Движок ничего не знает о версиях: он детерминирован, поэтому при
/// конфликте достаточно перечитать снимок и повторить вызов целиком.
pub trait TournamentStore {
    fn load(&self, tournament_id: &str) -> Result<Versioned<Snapshot>, StoreError>;

    /// Записать снимок, если версия в хранилище всё ещё `expected_version`.
    /// Возвращает новую версию.
    fn commit(
        &mut self,
        tournament_id: &str,
        expected_version: u64,
        snapshot: Snapshot,
    ) -> Result<u64, StoreError>;
}

/// Простая in-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: HashMap<TournamentId, Versioned<Snapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Положить новый турнир (версия 1). Существующий перезаписывается.
    pub fn insert(&mut self, snapshot: Snapshot) -> u64 {
        let id = snapshot.tournament.id.clone();
        self.entries.insert(
            id,
            Versioned {
                version: 1,
                value: snapshot,
            },
        );
        1
    }

    pub fn version(&self, tournament_id: &str) -> Option<u64> {
        self.entries.get(tournament_id).map(|v| v.version)
    }

    pub fn game(&self, tournament_id: &str, table_id: &str) -> Option<&Game> {
        self.entries
            .get(tournament_id)
            .and_then(|v| v.value.games.get(table_id))
    }

    pub fn tournament(&self, tournament_id: &str) -> Option<&TournamentDetails> {
        self.entries.get(tournament_id).map(|v| &v.value.tournament)
    }
}

impl TournamentStore for InMemoryStore {
    fn load(&self, tournament_id: &str) -> Result<Versioned<Snapshot>, StoreError> {
        self.entries
            .get(tournament_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(tournament_id.to_string()))
    }

    fn commit(
        &mut self,
        tournament_id: &str,
        expected_version: u64,
        snapshot: Snapshot,
    ) -> Result<u64, StoreError> {
        let entry = self
            .entries
            .get_mut(tournament_id)
            .ok_or_else(|| StoreError::NotFound(tournament_id.to_string()))?;
        if entry.version != expected_version {
            return Err(StoreError::StaleState {
                expected: expected_version,
                found: entry.version,
            });
        }
        entry.version += 1;
        entry.value = snapshot;
        Ok(entry.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::blinds::demo_schedule;
    use crate::domain::chips::Chips;

    fn snapshot() -> Snapshot {
        let tournament = TournamentDetails::new(
            "t1",
            "Test",
            EngineConfig::default(),
            Chips(1_000),
            demo_schedule(),
        )
        .expect("valid tournament");
        Snapshot {
            tournament,
            games: BTreeMap::new(),
        }
    }

    #[test]
    fn commit_bumps_version() {
        let mut store = InMemoryStore::new();
        store.insert(snapshot());
        let loaded = store.load("t1").expect("load");
        assert_eq!(loaded.version, 1);
        let v = store.commit("t1", 1, loaded.value).expect("commit");
        assert_eq!(v, 2);
    }

    #[test]
    fn stale_commit_is_rejected() {
        let mut store = InMemoryStore::new();
        store.insert(snapshot());
        let first = store.load("t1").expect("load");
        let second = store.load("t1").expect("load");
        store.commit("t1", first.version, first.value).expect("commit");

        let err = store
            .commit("t1", second.version, second.value)
            .expect_err("stale");
        assert_eq!(err, StoreError::StaleState { expected: 1, found: 2 });
    }

    #[test]
    fn missing_tournament() {
        let store = InMemoryStore::new();
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));
    }
}
