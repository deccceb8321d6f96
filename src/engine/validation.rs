use crate::domain::action::ActionKind;
use crate::domain::chips::Chips;
use crate::domain::hand::{Hand, PlayerState};
use crate::engine::actions::ProposedAction;
use crate::engine::errors::{EngineError, IllegalActionReason};

/// Действие после проверки: все суммы уже посчитаны, применение не может
/// упасть.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedAction {
    pub kind: ActionKind,
    /// Уровень вклада в раунде после действия.
    pub total: Chips,
    pub contribution: Chips,
    /// На сколько поднят уровень раунда.
    pub raise: Chips,
    pub all_in: bool,
}

/// Проверить действие против текущего раунда.
///
/// Ничего не меняет: при ошибке раздача остаётся как была.
pub fn validate_action(hand: &Hand, proposal: &ProposedAction) -> Result<ValidatedAction, EngineError> {
    if hand.street().is_none() {
        return Err(EngineError::NoActiveHand);
    }
    if hand.acting_player_id.as_deref() != Some(proposal.uid.as_str()) {
        return Err(EngineError::NotPlayersTurn(proposal.uid.clone()));
    }

    let player = hand
        .players
        .get(&proposal.uid)
        .ok_or_else(|| EngineError::PlayerNotFound(proposal.uid.clone()))?;
    if player.folded {
        return Err(IllegalActionReason::PlayerFolded.into());
    }
    if player.all_in {
        return Err(IllegalActionReason::PlayerAllIn.into());
    }

    let round = hand
        .active_round()
        .ok_or_else(|| EngineError::InvariantViolation("нет активного раунда ставок".into()))?;
    let target = round.target;
    let to_call = target.saturating_sub(player.round_contribution);

    match proposal.kind {
        ActionKind::Fold => Ok(ValidatedAction {
            kind: ActionKind::Fold,
            total: player.round_contribution,
            contribution: Chips::ZERO,
            raise: Chips::ZERO,
            all_in: false,
        }),

        ActionKind::Check => {
            if !to_call.is_zero() {
                return Err(IllegalActionReason::CannotCheck.into());
            }
            Ok(ValidatedAction {
                kind: ActionKind::Check,
                total: player.round_contribution,
                contribution: Chips::ZERO,
                raise: Chips::ZERO,
                all_in: false,
            })
        }

        ActionKind::Call => {
            if to_call.is_zero() {
                return Err(IllegalActionReason::NothingToCall.into());
            }
            Ok(call_for(player, to_call))
        }

        ActionKind::Bet | ActionKind::Raise => {
            let requested = parse_total(proposal.total)?;
            validate_raise(player, target, round.min_raise, requested)
        }
    }
}

/// Call (возможно олл-ин на меньшую сумму).
fn call_for(player: &PlayerState, to_call: Chips) -> ValidatedAction {
    let contribution = to_call.min(player.stack);
    ValidatedAction {
        kind: ActionKind::Call,
        total: player.round_contribution + contribution,
        contribution,
        raise: Chips::ZERO,
        all_in: contribution == player.stack,
    }
}

fn validate_raise(
    player: &PlayerState,
    target: Chips,
    min_raise: Chips,
    requested: Chips,
) -> Result<ValidatedAction, EngineError> {
    let max_total = player.round_contribution + player.stack;

    // Всё, что не меньше стека, превращается в олл-ин.
    if requested >= max_total {
        if max_total <= target {
            // Олл-ин не дотягивает до уровня раунда: это call на все.
            return Ok(call_for(player, target.saturating_sub(player.round_contribution)));
        }
        return Ok(ValidatedAction {
            kind: aggressive_kind(target),
            total: max_total,
            contribution: player.stack,
            raise: max_total - target,
            all_in: true,
        });
    }

    if requested <= target || requested - target < min_raise {
        return Err(IllegalActionReason::BelowMinimumRaise.into());
    }

    Ok(ValidatedAction {
        kind: aggressive_kind(target),
        total: requested,
        contribution: requested - player.round_contribution,
        raise: requested - target,
        all_in: false,
    })
}

/// Bet, если в раунде ещё не было ставки, иначе Raise.
fn aggressive_kind(target: Chips) -> ActionKind {
    if target.is_zero() {
        ActionKind::Bet
    } else {
        ActionKind::Raise
    }
}

fn parse_total(total: f64) -> Result<Chips, EngineError> {
    if !total.is_finite() || total.fract() != 0.0 {
        return Err(IllegalActionReason::NonNumericAmount.into());
    }
    if total < 0.0 {
        return Err(IllegalActionReason::NegativeAmount.into());
    }
    if total > u64::MAX as f64 {
        return Err(IllegalActionReason::NonNumericAmount.into());
    }
    Ok(Chips(total as u64))
}
