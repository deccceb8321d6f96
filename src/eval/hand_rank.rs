use crate::domain::card::Rank;
use crate::domain::hand::HandRank;

/// Категория покерной руки по силе.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    fn from_id(id: u32) -> HandCategory {
        match id {
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            _ => HandCategory::HighCard,
        }
    }
}

impl HandRank {
    /// Кодирование: `[категория:4][r0:4][r1:4][r2:4][r3:4][r4:4]`.
    ///
    /// Ранги идут по значимости для сравнения (сначала каре/сет/пары, потом
    /// кикеры). Незначимые хвостовые позиции заполняются нулём.
    pub fn encode(category: HandCategory, ranks: &[Rank]) -> Self {
        let mut value = (category as u32) << 20;
        for (i, rank) in ranks.iter().take(5).enumerate() {
            value |= (rank.value() as u32) << (16 - 4 * i as u32);
        }
        HandRank(value)
    }

    pub fn category(&self) -> HandCategory {
        HandCategory::from_id((self.0 >> 20) & 0x0F)
    }

    /// Значимые ранги (без нулевого хвоста).
    pub fn ranks(&self) -> Vec<Rank> {
        (0..5)
            .map(|i| ((self.0 >> (16 - 4 * i)) & 0x0F) as u8)
            .filter_map(Rank::from_value)
            .collect()
    }
}

/// Человекочитаемое описание руки: "Pair of Kings", "Straight, Ace high".
pub fn describe_hand(rank: HandRank) -> String {
    let ranks = rank.ranks();
    let at = |i: usize| ranks.get(i).copied().unwrap_or(Rank::Two);

    match rank.category() {
        HandCategory::HighCard => format!("High card {}", at(0).name()),
        HandCategory::OnePair => format!("Pair of {}", at(0).plural()),
        HandCategory::TwoPair => format!("Two pair, {} and {}", at(0).plural(), at(1).plural()),
        HandCategory::ThreeOfAKind => format!("Three of a kind, {}", at(0).plural()),
        HandCategory::Straight => format!("Straight, {} high", at(0).name()),
        HandCategory::Flush => format!("Flush, {} high", at(0).name()),
        HandCategory::FullHouse => {
            format!("Full house, {} over {}", at(0).plural(), at(1).plural())
        }
        HandCategory::FourOfAKind => format!("Four of a kind, {}", at(0).plural()),
        HandCategory::StraightFlush if at(0) == Rank::Ace => "Royal flush".to_string(),
        HandCategory::StraightFlush => format!("Straight flush, {} high", at(0).name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_category_above_kickers() {
        let pair = HandRank::encode(
            HandCategory::OnePair,
            &[Rank::Two, Rank::Five, Rank::Four, Rank::Three],
        );
        let high = HandRank::encode(
            HandCategory::HighCard,
            &[Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Nine],
        );
        assert!(pair > high);
        assert_eq!(pair.category(), HandCategory::OnePair);
        assert_eq!(pair.ranks().len(), 4);
    }

    #[test]
    fn descriptions_name_the_ranks() {
        let fh = HandRank::encode(HandCategory::FullHouse, &[Rank::King, Rank::Nine]);
        assert_eq!(describe_hand(fh), "Full house, Kings over Nines");
        let royal = HandRank::encode(HandCategory::StraightFlush, &[Rank::Ace]);
        assert_eq!(describe_hand(royal), "Royal flush");
    }
}
