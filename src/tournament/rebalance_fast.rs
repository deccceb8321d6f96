//! Ребалансировка для турниров с большим числом столов.
//!
//! Те же правила и те же директивы, что у `rebalance::rebalance`, но порядок
//! столов поддерживается упорядоченными множествами: после каждой пересадки
//! переставляются только затронутые столы, а не весь список.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::domain::tournament::{TournamentDetails, TournamentError};
use crate::domain::{PlayerId, TableId};
use crate::tournament::directives::TournamentAction;
use crate::tournament::rebalance::{
    emit_plan, needed_table_count, needs_balancing, snapshot, Move, SimTable, Snapshot,
};

type ReceiveKey = (usize, bool, u64, TableId, usize);
type DissolveKey = (usize, bool, Reverse<u64>, TableId, usize);
type SourceKey = (Reverse<usize>, bool, Reverse<u64>, TableId, usize);

struct Table {
    id: TableId,
    players: BTreeSet<PlayerId>,
    has_active_hand: bool,
    hand_started_at: u64,
}

impl Table {
    fn receive(&self, idx: usize) -> ReceiveKey {
        (
            self.players.len(),
            self.has_active_hand,
            self.hand_started_at,
            self.id.clone(),
            idx,
        )
    }

    fn dissolve(&self, idx: usize) -> DissolveKey {
        (
            self.players.len(),
            self.has_active_hand,
            Reverse(self.hand_started_at),
            self.id.clone(),
            idx,
        )
    }

    fn source(&self, idx: usize) -> SourceKey {
        (
            Reverse(self.players.len()),
            self.has_active_hand,
            Reverse(self.hand_started_at),
            self.id.clone(),
            idx,
        )
    }
}

impl From<SimTable> for Table {
    fn from(t: SimTable) -> Self {
        Self {
            id: t.id,
            players: t.players.into_iter().collect(),
            has_active_hand: t.has_active_hand,
            hand_started_at: t.hand_started_at,
        }
    }
}

pub fn rebalance_performant(
    t: &TournamentDetails,
    now: u64,
) -> Result<Vec<TournamentAction>, TournamentError> {
    let Snapshot {
        eliminations,
        tables: sim,
        active_players,
    } = snapshot(t, now);
    let cfg = &t.config;
    let needed = needed_table_count(
        active_players,
        cfg.min_table_size_before_rebalance,
        cfg.max_table_size,
    );
    let balance = needs_balancing(&sim, cfg.min_table_size_before_rebalance);
    let mut tables: Vec<Table> = sim.into_iter().map(Table::from).collect();

    let mut moves = Vec::new();
    let mut dissolved = Vec::new();

    if tables.len() > needed {
        let mut receive: BTreeSet<ReceiveKey> =
            tables.iter().enumerate().map(|(i, t)| t.receive(i)).collect();
        let mut dissolve: BTreeSet<DissolveKey> =
            tables.iter().enumerate().map(|(i, t)| t.dissolve(i)).collect();

        let surplus = tables.len() - needed;
        let mut victims = Vec::with_capacity(surplus);
        while victims.len() < surplus {
            let Some(victim_key) = dissolve.pop_first() else {
                break;
            };
            let victim = victim_key.4;
            receive.remove(&tables[victim].receive(victim));
            victims.push(victim);
        }

        for victim in victims {
            let leaving: Vec<PlayerId> = std::mem::take(&mut tables[victim].players)
                .into_iter()
                .collect();
            for uid in leaving {
                let Some(target_key) = receive.pop_first() else {
                    break;
                };
                let target = target_key.4;
                tables[target].players.insert(uid.clone());
                receive.insert(tables[target].receive(target));
                moves.push(Move {
                    uid,
                    from: tables[victim].id.clone(),
                    to: tables[target].id.clone(),
                });
            }
            dissolved.push(tables[victim].id.clone());
        }
    } else if balance {
        let mut receive: BTreeSet<ReceiveKey> =
            tables.iter().enumerate().map(|(i, t)| t.receive(i)).collect();
        let mut source: BTreeSet<SourceKey> =
            tables.iter().enumerate().map(|(i, t)| t.source(i)).collect();

        loop {
            let (Some(src_key), Some(dst_key)) = (source.first(), receive.first()) else {
                break;
            };
            let (src, dst) = (src_key.4, dst_key.4);
            if tables[src].players.len() <= tables[dst].players.len() + 1 {
                break;
            }

            for idx in [src, dst] {
                receive.remove(&tables[idx].receive(idx));
                source.remove(&tables[idx].source(idx));
            }
            let Some(uid) = tables[src].players.pop_last() else {
                break;
            };
            tables[dst].players.insert(uid.clone());
            for idx in [src, dst] {
                receive.insert(tables[idx].receive(idx));
                source.insert(tables[idx].source(idx));
            }
            moves.push(Move {
                uid,
                from: tables[src].id.clone(),
                to: tables[dst].id.clone(),
            });
        }
    }

    emit_plan(t, eliminations, moves, dissolved)
}
