use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};

pub const DECK_SIZE: usize = 52;

/// Колода раздачи: перемешанная последовательность из 52 карт + курсор.
///
/// Перемешивание делает `infra::rng::generate_deck`, НЕ здесь. Карты
/// выдаются строго по порядку последовательности, чтобы реплей по seed
/// давал те же карманные карты и тот же борд.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
    /// Индекс следующей карты.
    pub next: usize,
}

impl Deck {
    /// Несмешанная колода: масти d, c, h, s; внутри масти A, 2..9, T, J, Q, K.
    pub fn unshuffled() -> [Card; DECK_SIZE] {
        let mut cards = [Card::new(Rank::Ace, Suit::Diamonds); DECK_SIZE];
        let mut i = 0;
        for suit in Suit::ALL {
            for rank in Rank::DECK_ORDER {
                cards[i] = Card::new(rank, suit);
                i += 1;
            }
        }
        cards
    }

    pub fn from_sequence(cards: [Card; DECK_SIZE]) -> Self {
        Self {
            cards: cards.to_vec(),
            next: 0,
        }
    }

    /// Взять следующую карту.
    pub fn draw_one(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }

    /// Взять n карт (или сколько осталось).
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        let mut taken = Vec::with_capacity(n);
        while taken.len() < n {
            match self.draw_one() {
                Some(card) => taken.push(card),
                None => break,
            }
        }
        taken
    }
}

/// Каким детерминированным PRNG перемешана колода.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrngKind {
    #[default]
    Mulberry32,
    Sfc32,
}
