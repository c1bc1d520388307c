//! Dict: the public, insertion-ordered map.

use crate::error::DictError;
use crate::iter::{IntoIter, Iter, IterMut, ValuesMut};
use crate::raw_dict::RawDict;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// A hash map that iterates in insertion order.
///
/// Lookups, inserts and removals are O(1) on average. Overwriting a key
/// keeps its original position; removing a key and inserting it again
/// moves it to the end.
///
/// ```
/// use dense_dict::Dict;
///
/// let mut d = Dict::new();
/// d.insert("Blue", 1);
/// d.insert("Saltarina", 2);
/// assert_eq!(d.items(), vec![("Blue", 1), ("Saltarina", 2)]);
/// assert_eq!(d.get("Saltarina"), Some(&2));
/// assert_eq!(d.pop_item(), Ok(("Saltarina", 2)));
/// assert_eq!(d.keys(), vec!["Blue"]);
/// ```
pub struct Dict<K, V, S = DefaultHashBuilder> {
    raw: RawDict<K, V, S>,
}

impl<K, V> Dict<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// An empty map that holds at least `n` entries before it resizes.
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for Dict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dict<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        Self {
            raw: RawDict::with_capacity_and_hasher(n, hasher),
        }
    }

    pub fn hasher(&self) -> &S {
        self.raw.hasher()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Number of index table slots. The map resizes before an insert once
    /// three quarters of them are in use.
    pub fn capacity(&self) -> usize {
        self.raw.slots()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.raw.entries().slots(), self.raw.len())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let live = self.raw.len();
        IterMut::new(self.raw.entries_mut().slots_mut(), live)
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Snapshot of the keys in insertion order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of the values in insertion order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of the `(key, value)` pairs in insertion order.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Remove and return the most recently inserted pair.
    pub fn pop_item(&mut self) -> Result<(K, V), DictError> {
        self.raw.pop_last().ok_or(DictError::EmptyContainer)
    }

    /// Remove every entry. The table keeps its size.
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Pair up `keys` and `values` positionally. Later duplicates of a key
    /// overwrite earlier ones in place.
    ///
    /// Fails without building anything if the two batches differ in length.
    pub fn from_keys_values<IK, IV>(keys: IK, values: IV) -> Result<Self, DictError>
    where
        IK: IntoIterator<Item = K>,
        IV: IntoIterator<Item = V>,
        S: Default,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        let values: Vec<V> = values.into_iter().collect();
        if keys.len() != values.len() {
            return Err(DictError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let mut d = Self::with_capacity_and_hasher(keys.len(), S::default());
        for (k, v) in keys.into_iter().zip(values) {
            d.insert(k, v);
        }
        Ok(d)
    }

    /// Map every key in `keys` to a clone of `value`, in order.
    pub fn from_keys<I>(keys: I, value: V) -> Self
    where
        I: IntoIterator<Item = K>,
        V: Clone,
        S: Default,
    {
        let keys = keys.into_iter();
        let mut d = Self::with_capacity_and_hasher(keys.size_hint().0, S::default());
        for k in keys {
            d.insert(k, value.clone());
        }
        d
    }

    /// Map every key in `keys` to `V::default()`.
    pub fn from_keys_default<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        V: Default,
        S: Default,
    {
        let keys = keys.into_iter();
        let mut d = Self::with_capacity_and_hasher(keys.size_hint().0, S::default());
        for k in keys {
            d.insert(k, V::default());
        }
        d
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.get(q).map(|e| &e.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.get(q).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.get_mut(q).map(|e| &mut e.value)
    }

    /// Insert `value` under `key`, returning the value it replaced.
    ///
    /// A new key goes to the end of the iteration order. An existing key
    /// keeps its position and its originally stored key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert_full(key, value).1
    }

    /// Value for `key`, inserting `default` first if the key is absent.
    pub fn get_or_insert(&mut self, key: K, default: V) -> &mut V {
        self.get_or_insert_with(key, || default)
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let offset = self.raw.find_or_insert_with(key, default);
        &mut self
            .raw
            .entries_mut()
            .get_mut(offset)
            .expect("offset returned by find_or_insert_with is live")
            .value
    }

    /// Remove `q` and return its value.
    pub fn pop<Q>(&mut self, q: &Q) -> Result<V, DictError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw
            .remove(q)
            .map(|(_, v)| v)
            .ok_or(DictError::KeyNotFound)
    }

    /// Remove `q` and return its value, or `default` if it is absent.
    pub fn pop_or<Q>(&mut self, q: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.remove(q).map_or(default, |(_, v)| v)
    }

    /// Remove `q`, returning the stored key and value.
    pub fn pop_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.remove(q)
    }

    /// Insert every pair of `other`, in its order.
    pub fn update<S2>(&mut self, other: &Dict<K, V, S2>)
    where
        K: Clone,
        V: Clone,
    {
        for (k, v) in other.iter() {
            self.insert(k.clone(), v.clone());
        }
    }
}

/// Copy: an independent map with the same pairs in the same order, built
/// into fresh, compacted arrays.
impl<K, V, S> Clone for Dict<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for Dict<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equal when both hold the same pairs; order is not compared.
impl<K, V, S, S2> PartialEq<Dict<K, V, S2>> for Dict<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &Dict<K, V, S2>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for Dict<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for Dict<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if `key` is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in Dict")
    }
}

impl<K, V, S> FromIterator<(K, V)> for Dict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut d = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        d.extend(iter);
        d
    }
}

impl<K, V, S> Extend<(K, V)> for Dict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Dict<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut Dict<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for Dict<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let live = self.raw.len();
        IntoIter::new(self.raw.into_entries().into_slots(), live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn insert_get_pop_item_scenario() {
        let mut d = Dict::new();
        d.insert("Blue", 1);
        d.insert("Saltarina", 2);
        assert_eq!(d.items(), vec![("Blue", 1), ("Saltarina", 2)]);
        assert_eq!(d.get("Saltarina"), Some(&2));
        assert_eq!(d.pop_item(), Ok(("Saltarina", 2)));
        assert_eq!(d.keys(), vec!["Blue"]);
    }

    #[test]
    fn from_keys_values_then_copy() {
        let d: Dict<&str, i32> =
            Dict::from_keys_values(["D", "G", "V", "C"], [1, 2, 3, 6]).unwrap();
        assert_eq!(d.clone().values(), vec![1, 2, 3, 6]);
    }

    #[test]
    fn from_keys_values_length_mismatch() {
        let r: Result<Dict<&str, i32>, _> = Dict::from_keys_values(["a", "b"], [1]);
        assert_eq!(r.unwrap_err(), DictError::LengthMismatch { keys: 2, values: 1 });
    }

    #[test]
    fn pop_missing_with_and_without_default() {
        let mut d: Dict<&str, i32> = Dict::new();
        assert_eq!(d.pop("missing"), Err(DictError::KeyNotFound));
        assert_eq!(d.pop_or("missing", 99), 99);
        assert!(d.is_empty());
    }

    #[test]
    fn pop_item_on_empty() {
        let mut d: Dict<String, i32> = Dict::new();
        assert_eq!(d.pop_item(), Err(DictError::EmptyContainer));
    }

    /// Duplicate keys collapse to one entry, keeping the first position.
    #[test]
    fn from_keys_shares_default_and_dedups() {
        let shared = Rc::new(vec![0u8; 4]);
        let d: Dict<&str, Rc<Vec<u8>>> = Dict::from_keys(["x", "y", "x", "z"], shared.clone());
        assert_eq!(d.keys(), vec!["x", "y", "z"]);
        assert!(d.iter().all(|(_, v)| Rc::ptr_eq(v, &shared)));
        assert_eq!(Rc::strong_count(&shared), 4);
    }

    #[test]
    fn from_keys_default_values() {
        let d: Dict<u8, Vec<i32>> = Dict::from_keys_default([3, 1, 2]);
        assert_eq!(d.keys(), vec![3, 1, 2]);
        assert!(d.values().iter().all(Vec::is_empty));
    }

    #[test]
    fn update_overwrites_and_appends() {
        let mut a: Dict<&str, i32> = [("a", 1), ("b", 2)].into();
        let b: Dict<&str, i32> = [("b", 20), ("c", 30)].into();
        a.update(&b);
        assert_eq!(a.items(), vec![("a", 1), ("b", 20), ("c", 30)]);
        assert_eq!(b.len(), 2);
    }

    /// Views are snapshots: later mutation does not change them.
    #[test]
    fn views_are_snapshots() {
        let mut d: Dict<String, i32> = Dict::new();
        d.insert("a".into(), 1);
        let ks = d.keys();
        let vs = d.values();
        d.insert("b".into(), 2);
        *d.get_mut("a").unwrap() = 5;
        assert_eq!(ks, vec!["a".to_string()]);
        assert_eq!(vs, vec![1]);
    }

    #[test]
    fn clone_is_independent() {
        let mut d: Dict<u32, String> = (0..20).map(|i| (i, i.to_string())).collect();
        let c = d.clone();
        d.pop(&3).unwrap();
        d.insert(100, "x".into());
        assert_eq!(c.len(), 20);
        assert_eq!(c.get(&3).map(String::as_str), Some("3"));
        assert!(!c.contains_key(&100));
        assert_eq!(c.keys(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn get_or_insert_behaves_like_setdefault() {
        let mut d: Dict<&str, Vec<i32>> = Dict::new();
        d.get_or_insert("k", Vec::new()).push(1);
        d.get_or_insert("k", vec![99]).push(2);
        assert_eq!(d["k"], vec![1, 2]);
    }

    #[test]
    fn iteration_in_both_directions() {
        let mut d: Dict<u32, u32> = (0..10).map(|i| (i, i * i)).collect();
        for i in [2, 5, 9] {
            d.pop(&i).unwrap();
        }
        let fwd: Vec<u32> = d.iter().map(|(k, _)| *k).collect();
        assert_eq!(fwd, vec![0, 1, 3, 4, 6, 7, 8]);
        let back: Vec<u32> = d.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(back, vec![8, 7, 6, 4, 3, 1, 0]);
        assert_eq!(d.iter().len(), 7);

        for v in d.values_mut() {
            *v += 1;
        }
        assert_eq!(d[&4], 17);

        let owned: Vec<(u32, u32)> = d.into_iter().collect();
        assert_eq!(owned.len(), 7);
        assert_eq!(owned[0], (0, 1));
    }

    #[test]
    fn equality_ignores_order() {
        let a: Dict<&str, i32> = [("x", 1), ("y", 2)].into();
        let b: Dict<&str, i32> = [("y", 2), ("x", 1)].into();
        let c: Dict<&str, i32> = [("y", 2), ("x", 3)].into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn debug_formats_as_map() {
        let d: Dict<&str, i32> = [("a", 1), ("b", 2)].into();
        assert_eq!(format!("{d:?}"), r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_missing_panics() {
        let d: Dict<&str, i32> = Dict::new();
        let _v: i32 = d["nope"];
    }

    #[test]
    fn clear_then_reuse() {
        let mut d: Dict<u32, u32> = (0..50).map(|i| (i, i)).collect();
        let cap = d.capacity();
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.capacity(), cap);
        d.insert(7, 70);
        assert_eq!(d.items(), vec![(7, 70)]);
    }
}
