//! Growth policy: when to rebuild the table and at what size.

/// Smallest index table ever allocated.
pub(crate) const MIN_SLOTS: usize = 8;

// Load factor 3/4.
const LOAD_NUM: usize = 3;
const LOAD_DEN: usize = 4;

/// `count / slots >= 3/4`.
#[inline]
pub(crate) fn at_load_limit(count: usize, slots: usize) -> bool {
    count.saturating_mul(LOAD_DEN) >= slots.saturating_mul(LOAD_NUM)
}

/// Smallest table size that accepts `n` inserts without triggering a resize.
pub(crate) fn slots_for(n: usize) -> usize {
    // Each insert checks the load of the items already present, so the
    // table must satisfy (n - 1) < 3/4 * slots, i.e. 4n <= 3 * slots.
    let min = n
        .checked_mul(LOAD_DEN)
        .map(|x| x.div_ceil(LOAD_NUM))
        .and_then(usize::checked_next_power_of_two)
        .expect("capacity overflow");
    min.max(MIN_SLOTS)
}

/// Decide whether an insert must be preceded by a rebuild.
///
/// Returns the new index table length, or `None` when the current table
/// still has room. A full table doubles. A table clogged by tombstones or
/// entry-store holes is rebuilt at a size where the live entries fill at
/// most 3/8 of it, never smaller than the current one. That leaves room
/// for a number of inserts proportional to the table before the next
/// rebuild, even when the live count sits just under the load limit.
pub(crate) fn plan(live: usize, tombstones: usize, cursor: usize, slots: usize) -> Option<usize> {
    if at_load_limit(live, slots) {
        Some(slots.checked_mul(2).expect("capacity overflow"))
    } else if at_load_limit(live + tombstones, slots) || cursor >= slots {
        let roomy = slots_for(live.checked_mul(2).expect("capacity overflow"));
        Some(roomy.max(slots))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_limit_is_three_quarters() {
        assert!(!at_load_limit(5, 8));
        assert!(at_load_limit(6, 8));
        assert!(at_load_limit(7, 8));
        assert!(!at_load_limit(11, 16));
        assert!(at_load_limit(12, 16));
        assert!(!at_load_limit(0, 8));
    }

    #[test]
    fn slots_for_small_counts_is_minimum() {
        assert_eq!(slots_for(0), MIN_SLOTS);
        assert_eq!(slots_for(1), MIN_SLOTS);
        assert_eq!(slots_for(6), MIN_SLOTS);
    }

    /// `slots_for(n)` is a power of two that holds n inserts with no resize.
    #[test]
    fn slots_for_avoids_resize() {
        for n in 0..2000 {
            let s = slots_for(n);
            assert!(s.is_power_of_two());
            assert!(s >= MIN_SLOTS);
            for live in 0..n {
                assert_eq!(plan(live, 0, live, s), None, "n={n} live={live} slots={s}");
            }
        }
        assert_eq!(slots_for(7), 16);
        assert_eq!(slots_for(12), 16);
        assert_eq!(slots_for(13), 32);
    }

    #[test]
    fn plan_doubles_when_full() {
        assert_eq!(plan(6, 0, 6, 8), Some(16));
        assert_eq!(plan(12, 3, 15, 16), Some(32));
    }

    #[test]
    fn plan_rebuilds_in_place_when_clogged() {
        // Few live entries, many tombstones.
        assert_eq!(plan(2, 4, 6, 8), Some(8));
        // Entry store cursor has reached the table length.
        assert_eq!(plan(1, 0, 8, 8), Some(8));
        assert_eq!(plan(2, 1, 5, 8), None);
    }

    /// A clogged table whose live count is near the limit must not be
    /// rebuilt at the same size, or it would clog again after one insert.
    #[test]
    fn plan_leaves_headroom_when_live_is_near_limit() {
        assert_eq!(plan(11, 1, 12, 16), Some(32));
        assert_eq!(plan(767, 1, 768, 1024), Some(2048));
        for slots in [8usize, 64, 1024, 1 << 16] {
            let limit = slots / 4 * 3;
            for live in 0..limit {
                let tombstones = limit - live;
                let new = plan(live, tombstones, live + tombstones, slots)
                    .expect("clogged table is rebuilt");
                assert!(new >= slots);
                // At least a quarter of the new table is free for inserts
                // before the cursor or the load limit is reached again.
                assert!((live * 8) <= new * 3, "live={live} slots={slots} new={new}");
            }
        }
    }
}
