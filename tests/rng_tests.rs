// tests/rng_tests.rs
//
// Колода: детерминизм по (seed, secure_seed, prng), перестановка 52 карт,
// разные секреты дают разные колоды, раздача воспроизводима.

mod common;

use std::collections::HashSet;

use common::*;
use poker_tournament_engine::domain::deck::{Deck, PrngKind};
use poker_tournament_engine::engine::EngineError;
use poker_tournament_engine::infra::rng::{generate_deck, Mulberry32, Sfc32};
use poker_tournament_engine::infra::rng_seed::{hash_seed, mix_seed};
use proptest::prelude::*;
use rand::{Rng, RngCore};

#[test]
fn empty_seed_is_rejected() {
    assert_eq!(
        generate_deck("", 7, PrngKind::Mulberry32),
        Err(EngineError::InvalidSeed)
    );
}

#[test]
fn secure_seed_changes_the_deck() {
    let a = generate_deck("1700000000000-t1", 1, PrngKind::Mulberry32).expect("deck");
    let b = generate_deck("1700000000000-t1", 2, PrngKind::Mulberry32).expect("deck");
    assert_ne!(a, b);
}

#[test]
fn prng_kinds_shuffle_differently() {
    let a = generate_deck("hand", 99, PrngKind::Mulberry32).expect("deck");
    let b = generate_deck("hand", 99, PrngKind::Sfc32).expect("deck");
    assert_ne!(a, b);
}

#[test]
fn seed_mixing_is_xor_of_hash_salt_and_secret() {
    let h = hash_seed("abc");
    assert_eq!(mix_seed("abc", 0), h ^ 0x9E37_79B9);
    assert_eq!(mix_seed("abc", 0xFFFF_FFFF), h ^ 0x9E37_79B9 ^ 0xFFFF_FFFF);
}

#[test]
fn generators_work_through_rand_traits() {
    let mut m = Mulberry32::new(5);
    let mut copy = m.clone();
    let x: u32 = m.gen_range(0..10);
    assert!(x < 10);
    let mut bytes = [0u8; 8];
    copy.fill_bytes(&mut bytes);
    assert!(bytes.iter().any(|b| *b != 0));

    let mut s = Sfc32::new(5);
    assert_ne!(s.next_u32(), s.next_u32());
}

#[test]
fn same_hand_id_and_secret_replay_the_same_cards() {
    let mut first = table(&[1_000, 1_000, 1_000], 20);
    let mut second = table(&[1_000, 1_000, 1_000], 20);
    start(&mut first, T0);
    start(&mut second, T0);

    let h1 = hand(&first);
    let h2 = hand(&second);
    assert_eq!(h1.deck, h2.deck);
    for (uid, p) in &h1.players {
        assert_eq!(p.hole_cards, h2.players[uid].hole_cards);
    }
}

proptest! {
    #[test]
    fn deck_is_deterministic_permutation(
        seed in "[a-z0-9-]{1,24}",
        secure_seed in any::<u32>(),
        sfc in any::<bool>(),
    ) {
        let prng = if sfc { PrngKind::Sfc32 } else { PrngKind::Mulberry32 };
        let a = generate_deck(&seed, secure_seed, prng).expect("deck");
        let b = generate_deck(&seed, secure_seed, prng).expect("deck");
        prop_assert_eq!(a, b);

        let unique: HashSet<_> = a.iter().collect();
        prop_assert_eq!(unique.len(), 52);
        let base: HashSet<_> = Deck::unshuffled().into_iter().collect();
        prop_assert!(a.iter().all(|c| base.contains(c)));
    }
}
