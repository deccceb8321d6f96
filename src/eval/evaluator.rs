use crate::domain::card::{Card, Rank};
use crate::domain::hand::HandRank;

use super::hand_rank::{describe_hand, HandCategory};

/// Результат оценки: ранг и лучшая пятёрка карт.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatedHand {
    pub rank: HandRank,
    pub best_five: [Card; 5],
}

impl EvaluatedHand {
    pub fn category(&self) -> HandCategory {
        self.rank.category()
    }

    pub fn description(&self) -> String {
        describe_hand(self.rank)
    }
}

/// Лучшая 5-карточная рука из hole + board.
///
/// Работает для любых 5..=7 карт, иначе `None` (например, раздача
/// закончилась до флопа и оценивать нечего).
pub fn evaluate_best_hand(hole: &[Card], board: &[Card]) -> Option<EvaluatedHand> {
    let cards: Vec<Card> = hole.iter().chain(board.iter()).copied().collect();
    let n = cards.len();
    if !(5..=7).contains(&n) {
        return None;
    }

    let mut best: Option<EvaluatedHand> = None;
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let rank = evaluate_five(&five);
                        if best.as_ref().map_or(true, |cur| rank > cur.rank) {
                            best = Some(EvaluatedHand {
                                rank,
                                best_five: five,
                            });
                        }
                    }
                }
            }
        }
    }
    best
}

/// Старшая карта стрита, если пять рангов идут подряд. Колесо A2345 = Five.
fn straight_high(sorted_desc: &[Rank; 5]) -> Option<Rank> {
    let values: Vec<u8> = sorted_desc.iter().map(|r| r.value()).collect();
    if values == [14, 5, 4, 3, 2] {
        return Some(Rank::Five);
    }
    let consecutive = values.windows(2).all(|w| w[0] == w[1] + 1);
    consecutive.then_some(sorted_desc[0])
}

fn evaluate_five(cards: &[Card; 5]) -> HandRank {
    let mut ranks = [
        cards[0].rank,
        cards[1].rank,
        cards[2].rank,
        cards[3].rank,
        cards[4].rank,
    ];
    ranks.sort_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = straight_high(&ranks);

    // (ранг, сколько раз), сначала по количеству, потом по рангу.
    let mut groups: Vec<(Rank, u8)> = Vec::with_capacity(5);
    for rank in ranks {
        match groups.iter_mut().find(|(r, _)| *r == rank) {
            Some((_, count)) => *count += 1,
            None => groups.push((rank, 1)),
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let pattern: Vec<u8> = groups.iter().map(|(_, c)| *c).collect();
    let by_group: Vec<Rank> = groups.iter().map(|(r, _)| *r).collect();

    let category = match (is_flush, straight, pattern.as_slice()) {
        (true, Some(_), _) => HandCategory::StraightFlush,
        (_, _, [4, 1]) => HandCategory::FourOfAKind,
        (_, _, [3, 2]) => HandCategory::FullHouse,
        (true, None, _) => HandCategory::Flush,
        (false, Some(_), _) => HandCategory::Straight,
        (_, _, [3, 1, 1]) => HandCategory::ThreeOfAKind,
        (_, _, [2, 2, 1]) => HandCategory::TwoPair,
        (_, _, [2, 1, 1, 1]) => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };

    match (category, straight) {
        (HandCategory::StraightFlush | HandCategory::Straight, Some(high)) => {
            HandRank::encode(category, &[high])
        }
        (HandCategory::Flush | HandCategory::HighCard, _) => HandRank::encode(category, &ranks),
        _ => HandRank::encode(category, &by_group),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::parse_cards;

    fn eval(hole: &str, board: &str) -> EvaluatedHand {
        let hole = parse_cards(hole).expect("hole");
        let board = parse_cards(board).expect("board");
        evaluate_best_hand(&hole, &board).expect("5..7 cards")
    }

    #[test]
    fn wheel_is_five_high_straight() {
        let h = eval("Ah 2d", "3c 4s 5h Kd Kc");
        assert_eq!(h.category(), HandCategory::Straight);
        assert_eq!(h.description(), "Straight, Five high");
    }

    #[test]
    fn flush_beats_straight() {
        let flush = eval("2h 9h", "Jh Qh 4h Tc Kd");
        let straight = eval("9c 8d", "Jh Qh 4h Tc Kd");
        assert_eq!(flush.category(), HandCategory::Flush);
        assert_eq!(straight.category(), HandCategory::Straight);
        assert!(flush.rank > straight.rank);
    }

    #[test]
    fn kicker_decides_between_equal_pairs() {
        let a = eval("Ks Qd", "Kh 7c 5d 3s 2h");
        let b = eval("Kd Jc", "Kh 7c 5d 3s 2h");
        assert!(a.rank > b.rank);
    }

    #[test]
    fn fewer_than_five_cards_is_none() {
        let hole = parse_cards("Ah Kh").expect("hole");
        assert!(evaluate_best_hand(&hole, &[]).is_none());
    }
}
