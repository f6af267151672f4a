//! # Simple Hash Map
//!
//! Open addressing with linear probing and lazy deletion.
//!
//! ## Probe Rules
//!
//! ```text
//! start = hash(key) % capacity
//!
//!   Empty      -> stop. key absent; insert goes to first tombstone seen, else here
//!   Tombstone  -> keep probing, remember the first one as insertion candidate
//!   Occupied   -> key matches ? found : keep probing
//!
//! every slot is visited at most once per probe
//! ```
//!
//! Erase leaves a tombstone rather than an empty slot so no live key ever
//! sits behind an empty slot on its own probe path.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use ferrite_shared::{
    HashMapConfig, DEFAULT_HASH_MAP_CAPACITY, MAX_LOAD_FACTOR_DENOMINATOR,
    MAX_LOAD_FACTOR_NUMERATOR,
};

/// One bucket of the table.
enum Slot<K, V> {
    /// Never used since the last rehash. Terminates lookups.
    Empty,
    /// Live entry.
    Occupied(K, V),
    /// Erased entry. Lookups continue past it, inserts may reuse it.
    Tombstone,
}

/// Outcome of walking a key's probe sequence.
enum Probe {
    /// Slot holding the key.
    Found(usize),
    /// Key absent. Slot where it should be inserted.
    Vacant(usize),
    /// Key absent and every slot is live.
    Full,
}

/// An open-addressing hash map.
///
/// Hashing is delegated to `S`, so any [`BuildHasher`] can be injected.
/// Colliding keys are resolved by linear probing, never by chaining.
///
/// # Load Factor
///
/// Before every insert, if `len >= 0.75 * capacity` the table doubles and
/// reinserts its live entries. The check runs before emplacement, so 0.75 is
/// a soft ceiling.
///
/// # Thread Safety
///
/// NOT thread-safe. Single writer only.
///
/// # Example
///
/// ```rust,ignore
/// let mut scores: SimpleHashMap<String, i32> = SimpleHashMap::new();
/// scores.insert("x".to_string(), 1);
/// assert_eq!(scores.find("x"), Some(&1)); // &str lookup on String keys
/// assert!(scores.erase("x"));
/// ```
pub struct SimpleHashMap<K, V, S = RandomState> {
    /// Bucket array. Its length is the capacity.
    slots: Box<[Slot<K, V>]>,
    /// Live entries.
    len: usize,
    /// Tombstoned slots.
    tombstones: usize,
    /// Hash function factory.
    hasher: S,
}

impl<K: Hash + Eq, V> SimpleHashMap<K, V, RandomState> {
    /// Creates a map with the default capacity of 16 slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HASH_MAP_CAPACITY)
    }

    /// Creates a map with `capacity` slots (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_hasher(capacity, RandomState::new())
    }

    /// Creates a map sized from configuration.
    #[must_use]
    pub fn from_config(config: &HashMapConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }
}

impl<K: Hash + Eq, V> Default for SimpleHashMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> SimpleHashMap<K, V, S> {
    /// Returns the number of live entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the slot count.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live entries divided by capacity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Removes every entry. Capacity is kept.
    pub fn clear(&mut self) {
        self.slots = empty_slots(self.capacity());
        self.len = 0;
        self.tombstones = 0;
    }

    /// Iterates over live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(key, value) => Some((key, value)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SimpleHashMap<K, V, S> {
    /// Creates a map with `capacity` slots and a custom hasher.
    #[must_use]
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            slots: empty_slots(capacity.max(1)),
            len: 0,
            tombstones: 0,
            hasher,
        }
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.slot_for_insert(&key);

        let reused_tombstone = match &mut self.slots[index] {
            Slot::Occupied(_, existing) => return Some(std::mem::replace(existing, value)),
            Slot::Tombstone => true,
            Slot::Empty => false,
        };
        self.fill(index, reused_tombstone, key, value);
        None
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found(index) => match &self.slots[index] {
                Slot::Occupied(_, value) => Some(value),
                _ => None,
            },
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns the value for `key` mutably.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found(index) => match &mut self.slots[index] {
                Slot::Occupied(_, value) => Some(value),
                _ => None,
            },
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        matches!(self.probe(key), Probe::Found(_))
    }

    /// Removes `key`, leaving a tombstone. Returns `false` if absent.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found(index) = self.probe(key) else {
            return false;
        };

        self.slots[index] = Slot::Tombstone;
        self.len -= 1;
        self.tombstones += 1;
        true
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let index = self.slot_for_insert(&key);

        let vacant = match &self.slots[index] {
            Slot::Occupied(..) => None,
            Slot::Tombstone => Some(true),
            Slot::Empty => Some(false),
        };
        if let Some(reused_tombstone) = vacant {
            self.fill(index, reused_tombstone, key, V::default());
        }

        match &mut self.slots[index] {
            Slot::Occupied(_, value) => value,
            // fill() above always leaves the slot occupied
            Slot::Empty | Slot::Tombstone => unreachable!("slot filled before access"),
        }
    }

    /// Grows if needed, then returns the slot `key` belongs in.
    fn slot_for_insert(&mut self, key: &K) -> usize {
        self.reserve_one();

        loop {
            match self.probe(key) {
                Probe::Found(index) | Probe::Vacant(index) => return index,
                // reserve_one leaves an empty slot, but never spin
                Probe::Full => self.rehash(self.capacity() * 2),
            }
        }
    }

    /// Rehash check run before every emplacement.
    fn reserve_one(&mut self) {
        let capacity = self.capacity();
        if at_load_limit(self.len, capacity) {
            self.rehash(capacity * 2);
        } else if at_load_limit(self.len + self.tombstones, capacity) {
            // live entries fit, but tombstones are eating the empty slots
            self.rehash(capacity);
        }
    }

    fn fill(&mut self, index: usize, reused_tombstone: bool, key: K, value: V) {
        if reused_tombstone {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied(key, value);
        self.len += 1;
    }

    /// Walks the probe sequence of `key`. Single source of truth for every
    /// lookup and insert.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let capacity = self.capacity();
        let start = self.home_slot(key);
        let mut first_tombstone = None;

        for step in 0..capacity {
            let index = (start + step) % capacity;
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_tombstone.unwrap_or(index)),
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(index);
                }
                Slot::Occupied(existing, _) if existing.borrow() == key => {
                    return Probe::Found(index);
                }
                Slot::Occupied(..) => {}
            }
        }

        first_tombstone.map_or(Probe::Full, Probe::Vacant)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn home_slot<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        (self.hasher.hash_one(key) % self.capacity() as u64) as usize
    }

    /// Rebuilds the table at `new_capacity`, dropping tombstones.
    fn rehash(&mut self, new_capacity: usize) {
        let old = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        let old_capacity = old.len();
        self.len = 0;
        self.tombstones = 0;

        for slot in old.into_vec() {
            if let Slot::Occupied(key, value) = slot {
                // fresh table has no tombstones, so probe never reports Full
                if let Probe::Vacant(index) = self.probe(&key) {
                    self.slots[index] = Slot::Occupied(key, value);
                    self.len += 1;
                }
            }
        }

        tracing::debug!(
            "SimpleHashMap rehash: {} -> {} slots ({} live)",
            old_capacity,
            new_capacity,
            self.len
        );
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, S> std::fmt::Debug for SimpleHashMap<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn empty_slots<K, V>(capacity: usize) -> Box<[Slot<K, V>]> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

/// `used >= capacity * 0.75`, in integers.
#[inline]
const fn at_load_limit(used: usize, capacity: usize) -> bool {
    used * MAX_LOAD_FACTOR_DENOMINATOR >= capacity * MAX_LOAD_FACTOR_NUMERATOR
}
