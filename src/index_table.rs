//! IndexTable: the sparse half of the map.
//!
//! A power-of-two array of cells, each either never used, a tombstone left
//! by a removal, or the offset of a live entry in the entry store. The
//! table never looks at keys; callers resolve offsets to entries.

use crate::probe::ProbeSeq;

/// One cell of the index table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    /// Never occupied since the last rebuild. Terminates every probe.
    Empty,
    /// Previously occupied. Probes continue past it.
    Tombstone,
    /// Offset into the entry store.
    Occupied(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct IndexTable {
    cells: Box<[Slot]>,
    tombstones: usize,
}

impl IndexTable {
    pub(crate) fn new(len: usize) -> Self {
        assert!(len.is_power_of_two(), "index table length must be a power of two");
        Self {
            cells: vec![Slot::Empty; len].into_boxed_slice(),
            tombstones: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.cells.len() - 1
    }

    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub(crate) fn get(&self, pos: usize) -> Slot {
        self.cells[pos]
    }

    #[inline]
    pub(crate) fn probe(&self, hash: u64) -> ProbeSeq {
        ProbeSeq::new(hash, self.mask())
    }

    /// Point `pos` at `offset`. `pos` must not currently be occupied.
    pub(crate) fn occupy(&mut self, pos: usize, offset: usize) {
        match self.cells[pos] {
            Slot::Empty => {}
            Slot::Tombstone => self.tombstones -= 1,
            Slot::Occupied(prev) => {
                debug_assert!(false, "cell {pos} already points at offset {prev}");
            }
        }
        self.cells[pos] = Slot::Occupied(offset);
    }

    /// Turn an occupied cell into a tombstone. Never reverts it to `Empty`:
    /// later entries may have probed through this cell.
    pub(crate) fn bury(&mut self, pos: usize) {
        debug_assert!(matches!(self.cells[pos], Slot::Occupied(_)));
        self.cells[pos] = Slot::Tombstone;
        self.tombstones += 1;
    }

    /// First `Empty` cell along the probe sequence for `hash`. Used by
    /// rebuilds, where keys are already known to be unique and the fresh
    /// table holds no tombstones.
    pub(crate) fn find_empty(&self, hash: u64) -> usize {
        let mut seq = self.probe(hash);
        loop {
            let pos = seq.next_pos();
            if self.cells[pos] == Slot::Empty {
                return pos;
            }
        }
    }

    /// Cell holding `offset`, located by following the probe sequence of
    /// the entry's cached hash. Compares offsets only, so no user code runs.
    pub(crate) fn find_offset(&self, hash: u64, offset: usize) -> Option<usize> {
        let mut seq = self.probe(hash);
        loop {
            let pos = seq.next_pos();
            match self.cells[pos] {
                Slot::Empty => return None,
                Slot::Occupied(o) if o == offset => return Some(pos),
                _ => {}
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().filter_map(|(pos, s)| match *s {
            Slot::Occupied(o) => Some((pos, o)),
            _ => None,
        })
    }
}
