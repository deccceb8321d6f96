use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, TableId};
use crate::infra::driver::TournamentDriver;
use crate::infra::persistence::TournamentStore;

use super::dto::{build_standings, StandingDto, TableViewDto, TournamentViewDto};
use super::errors::ApiError;

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Query {
    /// Состояние стола глазами `viewer`.
    GetTable {
        table_id: TableId,
        #[serde(default)]
        viewer: Option<PlayerId>,
    },

    /// Список столов (для лобби), без карманных карт.
    ListTables,

    GetTournament { now: u64 },

    Standings,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum QueryResponse {
    Table(TableViewDto),
    Tables(Vec<TableViewDto>),
    Tournament(TournamentViewDto),
    Standings(Vec<StandingDto>),
}

pub fn execute_query<S: TournamentStore>(
    driver: &TournamentDriver<S>,
    query: &Query,
) -> Result<QueryResponse, ApiError> {
    let snap = driver.snapshot()?;
    match query {
        Query::GetTable { table_id, viewer } => {
            let game = snap
                .games
                .get(table_id)
                .ok_or_else(|| ApiError::NotFound(format!("table {table_id}")))?;
            Ok(QueryResponse::Table(TableViewDto::build(game, viewer.as_deref())))
        }
        Query::ListTables => Ok(QueryResponse::Tables(
            snap.games
                .values()
                .map(|game| TableViewDto::build(game, None))
                .collect(),
        )),
        Query::GetTournament { now } => Ok(QueryResponse::Tournament(TournamentViewDto::build(
            &snap.tournament,
            *now,
        ))),
        Query::Standings => Ok(QueryResponse::Standings(build_standings(&snap.tournament))),
    }
}
