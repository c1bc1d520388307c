//! EntryStore: the dense, insertion-ordered half of the map.
//!
//! Entries are appended at a cursor (the vector length) and addressed by
//! offset from the index table. Removing an entry leaves a `None` hole so
//! the offsets of later entries stay valid; holes are only squeezed out
//! when the whole map is rebuilt. Trailing holes are trimmed eagerly, so
//! the last slot is always live.

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct EntryStore<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    live: usize,
}

impl<K, V> EntryStore<K, V> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            live: 0,
        }
    }

    /// Number of live entries.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Next free offset; counts live entries and holes.
    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> usize {
        let offset = self.slots.len();
        self.slots.push(Some(entry));
        self.live += 1;
        offset
    }

    #[inline]
    pub(crate) fn get(&self, offset: usize) -> Option<&Entry<K, V>> {
        self.slots.get(offset).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, offset: usize) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(offset).and_then(Option::as_mut)
    }

    /// Remove the entry at `offset`, leaving a hole.
    pub(crate) fn take(&mut self, offset: usize) -> Option<Entry<K, V>> {
        let entry = self.slots.get_mut(offset)?.take()?;
        self.live -= 1;
        while let Some(None) = self.slots.last() {
            self.slots.pop();
        }
        Some(entry)
    }

    /// Offset of the most recently appended live entry.
    pub(crate) fn last_offset(&self) -> Option<usize> {
        debug_assert!(!matches!(self.slots.last(), Some(None)));
        self.slots.len().checked_sub(1)
    }

    /// Raw slots, holes included, in insertion order.
    #[inline]
    pub(crate) fn slots(&self) -> &[Option<Entry<K, V>>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Entry<K, V>>] {
        &mut self.slots
    }

    /// Consume the store, yielding live entries in insertion order.
    pub(crate) fn into_live(self) -> impl Iterator<Item = Entry<K, V>> {
        self.slots.into_iter().flatten()
    }

    pub(crate) fn into_slots(self) -> Vec<Option<Entry<K, V>>> {
        self.slots
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.slots.iter().flatten()
    }
}
