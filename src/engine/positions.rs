use crate::domain::player::Player;
use crate::domain::PlayerId;

/// Следующий дилер: первый игрок с местом больше, чем у прошлого дилера,
/// по кругу. Если прошлого дилера нет, кнопка у первого места.
///
/// `eligible` отсортирован по `position`.
pub fn next_dealer(eligible: &[&Player], previous_position: Option<u8>) -> Option<PlayerId> {
    let first = eligible.first()?;
    let Some(prev) = previous_position else {
        return Some(first.id.clone());
    };
    let dealer = eligible.iter().find(|p| p.position > prev).unwrap_or(first);
    Some(dealer.id.clone())
}

/// Порядок обхода: начиная со следующего после дилера, дилер последний.
pub fn order_from_dealer(eligible: &[&Player], dealer_id: &str) -> Vec<PlayerId> {
    let n = eligible.len();
    let dealer_idx = eligible.iter().position(|p| p.id == dealer_id).unwrap_or(0);
    (1..=n)
        .map(|k| eligible[(dealer_idx + k) % n].id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chips::Chips;

    fn seat(id: &str, position: u8) -> Player {
        Player::new(id, position, Chips(1_000))
    }

    #[test]
    fn button_moves_clockwise_and_wraps() {
        let (a, b, c) = (seat("a", 0), seat("b", 3), seat("c", 5));
        let eligible = vec![&a, &b, &c];
        assert_eq!(next_dealer(&eligible, None).as_deref(), Some("a"));
        assert_eq!(next_dealer(&eligible, Some(0)).as_deref(), Some("b"));
        assert_eq!(next_dealer(&eligible, Some(4)).as_deref(), Some("c"));
        assert_eq!(next_dealer(&eligible, Some(5)).as_deref(), Some("a"));
    }

    #[test]
    fn order_ends_with_dealer() {
        let (a, b, c) = (seat("a", 0), seat("b", 1), seat("c", 2));
        let eligible = vec![&a, &b, &c];
        assert_eq!(order_from_dealer(&eligible, "b"), vec!["c", "a", "b"]);
    }
}
