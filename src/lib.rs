//! dense-dict: an insertion-ordered hash map built from a sparse index
//! table and a dense entry store.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: dictionary semantics (insertion-order iteration, O(1) average
//!   lookup/insert/delete, overwrite-in-place, LIFO `pop_item`) on top of
//!   a small open-addressing engine whose pieces can be reasoned about
//!   independently.
//! - Layers:
//!   - `ProbeSeq`: perturbation probe over a power-of-two table
//!     (`j = 5j + 1 + perturb`, `perturb >>= 5`).
//!   - `IndexTable`: cells that are `Empty`, `Tombstone`, or the offset of
//!     an entry. Knows nothing about keys.
//!   - `EntryStore`: append-only arena of `(key, value, hash)` in insertion
//!     order; removals leave holes.
//!   - `growth`: 3/4 load limit and the resize plan.
//!   - `RawDict<K, V, S>`: composes the above into find / insert / remove /
//!     pop-last, guarded by a debug-only reentrancy check.
//!   - `Dict<K, V, S>`: public API, views, bulk operations and std traits.
//!
//! Constraints
//! - Single-threaded: no locks, no atomics. `Dict` is `Send` when its
//!   parts are, but not `Sync`; wrap it in a `Mutex` to share it.
//! - Resize happens before an insert, never after one.
//! - Index table length is always a power of two, at least 8.
//! - The map only grows; `clear` keeps the table size.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` hash computed when it was inserted, and
//!   rebuilds, `pop_item` and `Clone` only ever use that stored hash.
//!   `K: Hash` runs once per lookup or insert, never during a rebuild.
//! - Keys must hash consistently with `Eq`. A key type that breaks this
//!   gets unspecified (but memory-safe) lookups.
//!
//! Deletion
//! - A removed entry leaves a `Tombstone` cell and a hole in the entry
//!   store. Tombstones never revert to `Empty`; lookups walk past them and
//!   inserts reuse the first one they pass. Holes keep the surviving
//!   entries in insertion order; they are squeezed out, together with the
//!   tombstones, by the next rebuild. A table clogged with tombstones or
//!   holes is rebuilt at a size where live entries fill at most 3/8 of
//!   it, so a long run of inserts fits before the next rebuild.
//!
//! Reentrancy policy
//! - `RawDict` entry points hold a debug-only guard while `K: Hash` and
//!   `K: Eq` may run. Re-entering the same map from those impls panics in
//!   debug builds. Removed keys and values are returned to the caller and
//!   dropped outside the guard, so their `Drop` may touch the map.
//!
//! Notes and non-goals
//! - Not a hashing framework: the default hasher is hashbrown's, any
//!   `BuildHasher` can be supplied.
//! - No shrinking, no ordering other than insertion order.

mod dict;
mod entry_store;
mod error;
mod growth;
mod index_table;
pub mod iter;
mod probe;
mod raw_dict;
mod raw_dict_proptest;
mod reentrancy;

// Public surface
pub use dict::Dict;
pub use error::DictError;
pub use hashbrown::hash_map::DefaultHashBuilder;
