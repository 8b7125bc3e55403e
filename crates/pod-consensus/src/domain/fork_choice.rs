//! Fork choice: select the new canonical tail among detached
//! tails under the `(height, hash)` total order.
//!
//! PoD fork choice is a simple total order, not a stake-weighted GHOST
//! rule; shaped as a pure traversal function, unit-tested per branch
//! topology.

use crate::domain::Block;

/// `fork_choice`: pick the maximum of `current` and `detached` under `less`.
///
/// Returns `None` when `current` is already maximal (caller does nothing),
/// `Some(new_tail)` otherwise. Idempotent: calling again with the returned
/// tail as `current` yields `None`.
pub fn choose_tail<'a>(current: &'a Block, detached: &'a [Block]) -> Option<&'a Block> {
    let best = detached.iter().max()?;
    if best <= current {
        None
    } else {
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::test_support::block;
    use crate::domain::Address;

    fn a() -> Address {
        Address::from_bytes([1; 20])
    }

    #[test]
    fn s4_fork_choice_picks_max_height_then_hash() {
        let current = block(100, 0xAA, 0x00, 1_500_000, a());
        let detached = vec![
            block(100, 0xAB, 0x00, 1_500_000, a()),
            block(101, 0x01, 0xAB, 1_515_000, a()),
            block(99, 0xFF, 0x00, 1_485_000, a()),
        ];

        let winner = choose_tail(&current, &detached).unwrap();
        assert_eq!(winner.height, 101);
        assert_eq!(winner.hash, [0x01; 32]);
    }

    #[test]
    fn returns_none_when_current_already_maximal() {
        let current = block(101, 0x01, 0xAB, 1_515_000, a());
        let detached = vec![block(100, 0xAB, 0x00, 1_500_000, a())];
        assert!(choose_tail(&current, &detached).is_none());
    }

    #[test]
    fn idempotent_when_reapplied() {
        let current = block(100, 0xAA, 0x00, 1_500_000, a());
        let detached = vec![block(101, 0x01, 0xAB, 1_515_000, a())];
        let winner = choose_tail(&current, &detached).unwrap();
        assert!(choose_tail(winner, &detached).is_none());
    }

    #[test]
    fn monotone_new_tail_is_never_smaller() {
        let current = block(100, 0xAA, 0x00, 1_500_000, a());
        let detached = vec![block(100, 0xAB, 0x00, 1_500_000, a())];
        let winner = choose_tail(&current, &detached).unwrap();
        assert!(*winner >= current);
    }
}
