use serde::{Deserialize, Serialize};

use crate::domain::action::ActionKind;
use crate::domain::hand::Hand;
use crate::domain::PlayerId;

/// Действие, которое предлагает клиент (или автоматика).
///
/// `total` — целевой уровень вклада игрока в текущем раунде. Приходит из
/// JSON как число, поэтому f64; для fold/check/call игнорируется.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProposedAction {
    pub uid: PlayerId,
    pub kind: ActionKind,
    #[serde(default)]
    pub total: f64,
}

impl ProposedAction {
    pub fn fold(uid: impl Into<PlayerId>) -> Self {
        Self::simple(uid, ActionKind::Fold)
    }

    pub fn check(uid: impl Into<PlayerId>) -> Self {
        Self::simple(uid, ActionKind::Check)
    }

    pub fn call(uid: impl Into<PlayerId>) -> Self {
        Self::simple(uid, ActionKind::Call)
    }

    pub fn bet(uid: impl Into<PlayerId>, total: u64) -> Self {
        Self {
            uid: uid.into(),
            kind: ActionKind::Bet,
            total: total as f64,
        }
    }

    pub fn raise(uid: impl Into<PlayerId>, total: u64) -> Self {
        Self {
            uid: uid.into(),
            kind: ActionKind::Raise,
            total: total as f64,
        }
    }

    fn simple(uid: impl Into<PlayerId>, kind: ActionKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
            total: 0.0,
        }
    }
}

/// Минимальное легальное действие за текущего игрока:
/// check, если уравнивать нечего, иначе fold.
pub fn forced_action_for(hand: &Hand) -> Option<ProposedAction> {
    let uid = hand.acting_player_id.as_ref()?;
    let player = hand.players.get(uid)?;
    let target = hand.active_round()?.target;

    if player.round_contribution >= target {
        Some(ProposedAction::check(uid.clone()))
    } else {
        Some(ProposedAction::fold(uid.clone()))
    }
}
