//! RawDict: the structural engine behind `Dict`.
//!
//! Composes the index table, entry store, probe sequence and growth
//! policy. Every entry point that may call user code (`K: Hash`,
//! `K: Eq`) holds the debug reentrancy guard for its whole critical
//! section. Removed entries are handed back to the caller, so their
//! `Drop` runs after the structure is consistent again.

use crate::entry_store::{Entry, EntryStore};
use crate::growth;
use crate::index_table::{IndexTable, Slot};
use crate::reentrancy::ReentrancyCheck;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;

pub(crate) struct RawDict<K, V, S> {
    hasher: S,
    table: Table<K, V>,
    reentrancy: ReentrancyCheck,
}

/// The two arrays, kept apart from the guard so a critical section can
/// mutate them while the guard is held.
struct Table<K, V> {
    index: IndexTable,
    entries: EntryStore<K, V>,
}

/// Where a key lives, or where it would be written.
enum Probe {
    Found(usize),
    Vacant(usize),
}

impl<K, V> Table<K, V> {
    fn with_slots(slots: usize) -> Self {
        Self {
            index: IndexTable::new(slots),
            entries: EntryStore::with_capacity(slots),
        }
    }

    #[inline]
    fn entry(&self, offset: usize) -> &Entry<K, V> {
        self.entries
            .get(offset)
            .expect("occupied index cell points at a live entry")
    }

    /// Append an entry whose key is known to be absent, writing it into
    /// the first empty cell of its probe sequence.
    fn append_unique(&mut self, entry: Entry<K, V>) {
        let pos = self.index.find_empty(entry.hash);
        let offset = self.entries.push(entry);
        self.index.occupy(pos, offset);
    }

    /// Reallocate both arrays at `slots` cells and re-insert every live
    /// entry in insertion order using its cached hash.
    fn rebuild(&mut self, slots: usize) {
        log::debug!(
            "rebuilding dict index: {} -> {} slots ({} live, {} tombstones, {} holes)",
            self.index.len(),
            slots,
            self.entries.live(),
            self.index.tombstones(),
            self.entries.cursor() - self.entries.live(),
        );
        let old = mem::replace(self, Table::with_slots(slots));
        for entry in old.entries.into_live() {
            self.append_unique(entry);
        }
    }

    /// Run the growth policy ahead of an insert.
    fn reserve_one(&mut self) {
        if let Some(slots) = growth::plan(
            self.entries.live(),
            self.index.tombstones(),
            self.entries.cursor(),
            self.index.len(),
        ) {
            self.rebuild(slots);
        }
    }

    /// Walk the probe sequence for `q`. Tombstones are skipped; the first
    /// empty cell proves absence. Returns `(cell, offset)`.
    fn lookup<Q>(&self, hash: u64, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut seq = self.index.probe(hash);
        loop {
            let pos = seq.next_pos();
            match self.index.get(pos) {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(offset) => {
                    let e = self.entry(offset);
                    if e.hash == hash && e.key.borrow() == q {
                        return Some((pos, offset));
                    }
                }
            }
        }
    }

    /// Probe on behalf of an insert: remember the first tombstone but keep
    /// going, since an equal key may sit further along the sequence.
    fn probe_insert(&self, hash: u64, key: &K) -> Probe
    where
        K: Eq,
    {
        let mut tombstone = None;
        let mut seq = self.index.probe(hash);
        loop {
            let pos = seq.next_pos();
            match self.index.get(pos) {
                Slot::Empty => return Probe::Vacant(tombstone.unwrap_or(pos)),
                Slot::Tombstone => {
                    tombstone.get_or_insert(pos);
                }
                Slot::Occupied(offset) => {
                    let e = self.entry(offset);
                    if e.hash == hash && e.key == *key {
                        return Probe::Found(offset);
                    }
                }
            }
        }
    }

    /// Write a new entry at a vacant cell found by `probe_insert`.
    fn insert_at(&mut self, pos: usize, entry: Entry<K, V>) -> usize {
        let offset = self.entries.push(entry);
        self.index.occupy(pos, offset);
        offset
    }

    fn remove_at(&mut self, pos: usize, offset: usize) -> Entry<K, V> {
        self.index.bury(pos);
        self.entries
            .take(offset)
            .expect("occupied index cell points at a live entry")
    }
}

impl<K, V, S> RawDict<K, V, S> {
    /// Table sized so that `n` inserts never trigger a rebuild.
    pub(crate) fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        Self::with_slots(growth::slots_for(n), hasher)
    }

    fn with_slots(slots: usize, hasher: S) -> Self {
        Self {
            hasher,
            table: Table::with_slots(slots),
            reentrancy: ReentrancyCheck::new(),
        }
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.table.entries.live()
    }

    /// Index table length.
    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.table.index.len()
    }

    #[inline]
    pub(crate) fn entries(&self) -> &EntryStore<K, V> {
        &self.table.entries
    }

    #[inline]
    pub(crate) fn entries_mut(&mut self) -> &mut EntryStore<K, V> {
        &mut self.table.entries
    }

    pub(crate) fn into_entries(self) -> EntryStore<K, V> {
        self.table.entries
    }

    /// Remove the most recently inserted live entry. Its cell is found by
    /// offset along the cached hash's probe, so no user code runs.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let _section = self.reentrancy.enter();
        let offset = self.table.entries.last_offset()?;
        let hash = self.table.entry(offset).hash;
        let pos = self
            .table
            .index
            .find_offset(hash, offset)
            .expect("live entry is reachable from its cached hash");
        let entry = self.table.remove_at(pos, offset);
        Some((entry.key, entry.value))
    }

    /// Drop every entry, keeping the current table size.
    pub(crate) fn clear(&mut self) {
        let old = {
            let _section = self.reentrancy.enter();
            let slots = self.table.index.len();
            mem::replace(&mut self.table, Table::with_slots(slots))
        };
        // Entry drops may re-enter the map; the guard is already released.
        drop(old);
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.table.index.tombstones()
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let Table { index, entries } = &self.table;
        let slots = index.len();
        assert!(slots.is_power_of_two() && slots >= growth::MIN_SLOTS);
        assert!(entries.cursor() <= slots, "entry cursor past table");
        assert!(
            (entries.live() + index.tombstones()) * 4 <= slots * 3,
            "no room left for empty cells"
        );

        let mut pointed = vec![false; entries.cursor()];
        for (_, offset) in index.occupied() {
            assert!(entries.get(offset).is_some(), "cell points at a hole");
            assert!(!pointed[offset], "offset {offset} referenced twice");
            pointed[offset] = true;
        }
        let live = entries.slots().iter().filter(|s| s.is_some()).count();
        assert_eq!(live, entries.live());
        assert_eq!(pointed.iter().filter(|p| **p).count(), live);

        for (pos, offset) in index.occupied() {
            let e = self.table.entry(offset);
            assert_eq!(index.find_offset(e.hash, offset), Some(pos));
        }
        assert!(!matches!(entries.slots().last(), Some(None)));
    }
}

impl<K, V, S> RawDict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Offset of the entry for `q`.
    pub(crate) fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _section = self.reentrancy.enter();
        if self.table.entries.live() == 0 {
            return None;
        }
        let hash = self.make_hash(q);
        self.table.lookup(hash, q).map(|(_, offset)| offset)
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let offset = self.find(q)?;
        self.table.entries.get(offset)
    }

    pub(crate) fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let offset = self.find(q)?;
        self.table.entries.get_mut(offset)
    }

    /// Insert or overwrite. Returns the entry's offset and, on overwrite,
    /// the previous value. The stored key and cached hash are kept.
    pub(crate) fn insert_full(&mut self, key: K, value: V) -> (usize, Option<V>) {
        let _section = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        self.table.reserve_one();
        match self.table.probe_insert(hash, &key) {
            Probe::Found(offset) => {
                let e = self
                    .table
                    .entries
                    .get_mut(offset)
                    .expect("occupied index cell points at a live entry");
                (offset, Some(mem::replace(&mut e.value, value)))
            }
            Probe::Vacant(pos) => {
                let offset = self.table.insert_at(pos, Entry { key, value, hash });
                (offset, None)
            }
        }
    }

    /// Offset of the entry for `key`, inserting `default()` first if absent.
    pub(crate) fn find_or_insert_with<F>(&mut self, key: K, default: F) -> usize
    where
        F: FnOnce() -> V,
    {
        let _section = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        self.table.reserve_one();
        match self.table.probe_insert(hash, &key) {
            Probe::Found(offset) => offset,
            Probe::Vacant(pos) => {
                let value = default();
                self.table.insert_at(pos, Entry { key, value, hash })
            }
        }
    }

    /// Remove the entry for `q`, leaving a tombstone in its cell and a hole
    /// in the entry store.
    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _section = self.reentrancy.enter();
        if self.table.entries.live() == 0 {
            return None;
        }
        let hash = self.make_hash(q);
        let (pos, offset) = self.table.lookup(hash, q)?;
        let entry = self.table.remove_at(pos, offset);
        Some((entry.key, entry.value))
    }
}

impl<K, V, S> Clone for RawDict<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Compacting copy: same table size, no tombstones, no holes.
    fn clone(&self) -> Self {
        let mut copy = Self::with_slots(self.slots(), self.hasher.clone());
        for entry in self.table.entries.iter() {
            copy.table.append_unique(entry.clone());
        }
        copy
    }
}
