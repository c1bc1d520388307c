//! Perturbation probe sequence over a power-of-two index table.
//!
//! Starting from `j = hash`, each step computes `j = 5*j + 1 + perturb`
//! after shifting `perturb` right by [`PERTURB_SHIFT`]. The high bits of
//! the hash are folded in during the first few steps; once `perturb`
//! reaches zero the recurrence is a full-period LCG modulo the table size,
//! so every cell is eventually visited.

/// Bits dropped from `perturb` on each collision.
pub(crate) const PERTURB_SHIFT: u32 = 5;

/// Infinite iterator over candidate cell positions for one hash.
#[derive(Clone, Debug)]
pub(crate) struct ProbeSeq {
    perturb: u64,
    j: u64,
    mask: u64,
}

impl ProbeSeq {
    /// `mask` must be the table length minus one, with the length a power of two.
    #[inline]
    pub(crate) fn new(hash: u64, mask: usize) -> Self {
        debug_assert!((mask as u64).wrapping_add(1).is_power_of_two());
        Self {
            perturb: hash,
            j: hash,
            mask: mask as u64,
        }
    }

    /// Current position; advances to the next one.
    #[inline]
    pub(crate) fn next_pos(&mut self) -> usize {
        let pos = (self.j & self.mask) as usize;
        // u64 shift is logical: the high bit never smears into perturb.
        self.perturb >>= PERTURB_SHIFT;
        self.j = self
            .j
            .wrapping_mul(5)
            .wrapping_add(1)
            .wrapping_add(self.perturb);
        pos
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        Some(self.next_pos())
    }
}
