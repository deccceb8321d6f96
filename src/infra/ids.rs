//! Идентификаторы раздач.
//!
//! Id раздачи одновременно служит seed колоды: `"{now_ms}-{table_id}"`.
//! Ведущая метка времени нужна ребалансеру, чтобы отличать раздачи,
//! начатые раньше, от начатых позже.

use crate::domain::{HandId, TableId};

/// Собрать id раздачи для стола.
pub fn hand_id(now_ms: u64, table_id: &TableId) -> HandId {
    format!("{now_ms}-{table_id}")
}

/// Метка времени из id раздачи (ведущие цифры). Нечисловой id = `None`.
pub fn parse_hand_timestamp(hand_id: &str) -> Option<u64> {
    let digits: &str = {
        let end = hand_id
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(hand_id.len());
        &hand_id[..end]
    };
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_timestamp_prefix() {
        let id = hand_id(1_700_000_123_456, &"t-7".to_string());
        assert_eq!(id, "1700000123456-t-7");
        assert_eq!(parse_hand_timestamp(&id), Some(1_700_000_123_456));
    }

    #[test]
    fn non_numeric_prefix_is_none() {
        assert_eq!(parse_hand_timestamp("hand-1"), None);
        assert_eq!(parse_hand_timestamp(""), None);
    }
}
