//! Связка хранилища и оркестратора.
//!
//! Каждый вызов: прочитать снимок, посчитать новый, записать с проверкой
//! версии. При `StaleState` весь вызов повторяется с новым снимком: движок
//! детерминирован, так что повтор безопасен.

use thiserror::Error;

use crate::domain::tournament::{TournamentDetails, TournamentError};
use crate::domain::{PlayerId, TableId, TournamentId};
use crate::engine::ProposedAction;
use crate::infra::persistence::{Snapshot, StoreError, TournamentStore};
use crate::tournament::{
    advance_tournament_hand, decline_rebuy, force_resume, mark_arrived, rebuy,
    request_administrative_pause, resume, start_tournament, AdvanceContext, AdvanceOutcome,
    TournamentAction,
};

pub const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DriverError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error("gave up after {attempts} attempts: state kept changing")]
    RetriesExhausted { attempts: usize },
}

pub struct TournamentDriver<S: TournamentStore> {
    store: S,
    tournament_id: TournamentId,
    max_retries: usize,
}

impl<S: TournamentStore> TournamentDriver<S> {
    pub fn new(store: S, tournament_id: impl Into<TournamentId>) -> Self {
        Self {
            store,
            tournament_id: tournament_id.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn tournament_id(&self) -> &TournamentId {
        &self.tournament_id
    }

    /// Текущий снимок без изменений.
    pub fn snapshot(&self) -> Result<Snapshot, DriverError> {
        Ok(self.store.load(&self.tournament_id)?.value)
    }

    /// Один шаг оркестратора для стола.
    pub fn advance(
        &mut self,
        table_id: &str,
        action: Option<&ProposedAction>,
        ctx: &AdvanceContext,
    ) -> Result<AdvanceOutcome, DriverError> {
        self.transact(|snap| {
            let game = snap
                .games
                .get(table_id)
                .ok_or_else(|| TournamentError::TableNotFound(table_id.to_string()))?;
            let outcome = advance_tournament_hand(&snap.tournament, Some(game), action, ctx)?;
            snap.tournament = outcome.tournament.clone();
            if let Some(game) = outcome.game.clone() {
                snap.games.insert(table_id.to_string(), game);
            }
            Ok(outcome)
        })
    }

    /// Старт турнира: рассадка и документы столов.
    pub fn start(&mut self, now: u64) -> Result<Vec<TableId>, DriverError> {
        self.transact(|snap| {
            let games = start_tournament(&mut snap.tournament, now)?;
            let ids = games.keys().cloned().collect();
            snap.games = games;
            Ok(ids)
        })
    }

    pub fn rebuy(&mut self, uid: &str, now: u64) -> Result<(), DriverError> {
        self.transact(|snap| rebuy(&mut snap.tournament, uid, now))
    }

    pub fn decline_rebuy(&mut self, uid: &str) -> Result<(), DriverError> {
        self.transact(|snap| decline_rebuy(&mut snap.tournament, uid))
    }

    pub fn mark_arrived(&mut self, uid: &PlayerId) -> Result<(), DriverError> {
        self.transact(|snap| mark_arrived(&mut snap.tournament, uid))
    }

    pub fn request_pause(
        &mut self,
        message: &str,
        duration_ms: u64,
        now: u64,
    ) -> Result<Vec<TournamentAction>, DriverError> {
        self.transact(|snap| request_administrative_pause(&mut snap.tournament, message, duration_ms, now))
    }

    pub fn resume(&mut self, now: u64) -> Result<Vec<TournamentAction>, DriverError> {
        self.transact(|snap| resume(&mut snap.tournament, now))
    }

    pub fn force_resume(&mut self, now: u64) -> Result<Vec<TournamentAction>, DriverError> {
        self.transact(|snap| force_resume(&mut snap.tournament, now))
    }

    pub fn tournament(&self) -> Result<TournamentDetails, DriverError> {
        Ok(self.snapshot()?.tournament)
    }

    /// load -> f -> commit, с повтором при конфликте версий.
    ///
    /// `f` получает свежую копию снимка на каждой попытке; ошибка `f`
    /// прерывает вызов без записи.
    fn transact<T>(
        &mut self,
        mut f: impl FnMut(&mut Snapshot) -> Result<T, TournamentError>,
    ) -> Result<T, DriverError> {
        for attempt in 1..=self.max_retries {
            let loaded = self.store.load(&self.tournament_id)?;
            let mut snap = loaded.value;
            let result = f(&mut snap)?;
            match self.store.commit(&self.tournament_id, loaded.version, snap) {
                Ok(_) => return Ok(result),
                Err(StoreError::StaleState { expected, found }) => {
                    log::debug!(
                        "турнир {}: версия {expected} устарела ({found}), попытка {attempt}",
                        self.tournament_id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::warn!(
            "турнир {}: не удалось записать за {} попыток",
            self.tournament_id,
            self.max_retries
        );
        Err(DriverError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }
}
