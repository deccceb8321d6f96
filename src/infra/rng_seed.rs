//! Хэширование строкового seed колоды в 32-битное состояние PRNG.

/// «Ничего в рукаве» константа (дробная часть золотого сечения).
pub const SEED_SALT: u32 = 0x9E37_79B9;

/// xmur3: строковый хэш по UTF-8 байтам, первое выходное значение.
pub fn hash_seed(seed: &str) -> u32 {
    let bytes = seed.as_bytes();
    let mut h: u32 = 1_779_033_703 ^ (bytes.len() as u32);
    for &b in bytes {
        h = (h ^ b as u32).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// Итоговое состояние PRNG: хэш seed, соль и секрет вызывающей стороны.
pub fn mix_seed(seed: &str, secure_seed: u32) -> u32 {
    hash_seed(seed) ^ SEED_SALT ^ secure_seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_depends_on_every_byte() {
        assert_ne!(hash_seed("1700000000000-t1"), hash_seed("1700000000000-t2"));
        assert_eq!(hash_seed("abc"), hash_seed("abc"));
    }

    #[test]
    fn secure_seed_changes_mixed_state() {
        assert_ne!(mix_seed("hand", 0), mix_seed("hand", 1));
        assert_eq!(mix_seed("hand", 0), hash_seed("hand") ^ SEED_SALT);
    }
}
