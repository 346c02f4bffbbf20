//! HashMap: separate chaining over tagged keys, with collision-triggered
//! doubling and all-or-nothing resize.
//!
//! Layout
//! - A table of `table_size` buckets, each a `ChainList` of owned entries.
//!   An empty bucket is an empty chain; there is exactly one chain per bucket.
//! - A key lives in bucket `hash_index(key, table_size, prime)`; this holds
//!   after every successful operation.
//!
//! Hashing
//! - Integer and char keys: `value mod table_size`. Signed keys are first
//!   sign-extended to 64 bits and reinterpreted as `u64`, so `-1` hashes
//!   like `u64::MAX`. This matches the two's-complement cast of a 64-bit
//!   platform and is pinned on every platform.
//! - String keys: `(sum of bytes + prime) mod table_size`, wrapping. `prime`
//!   is only an additive fold constant here, never the modulus.
//! - `usize`, `bool` and opaque keys are `NotSupported`.
//!
//! Growth
//! - Bucket search raises the collision flag whenever it steps past an entry
//!   whose key does not match. That is the only growth trigger: when an
//!   upsert adds a new entry while the flag is up, the table doubles. There
//!   is no load factor and no shrinking.
//! - Searches from `get`/`remove`/`contains_key` raise the flag as well.
//!
//! Resize
//! - Phase one allocates the new table and computes every entry's new
//!   bucket without moving anything. Any failure there returns the error
//!   with the map untouched.
//!   This includes node room in every target bucket, so phase two does not
//!   allocate.
//! - Phase two moves the entries and cannot fail.
//!
//! Threading
//! - Single-threaded. Mutation needs `&mut self`, and the collision flag is
//!   a `Cell`, so the map is `Send` (when its elements are) but not `Sync`.
//!   Share it across threads only behind an exclusive lock such as `Mutex`.

use crate::chain_list::{ChainList, NodeHandle};
use crate::comparator::compare_scalars;
use crate::config::HashMapBuilder;
use crate::error::{ContainerError, Result};
use crate::type_tag::{Element, Scalar, TypeTag};
use core::borrow::Borrow;
use core::cell::Cell;
use core::fmt;
use tracing::{debug, trace, warn};

pub const DEFAULT_TABLE_SIZE: usize = 10;
pub const DEFAULT_PRIME: usize = 11;

/// Trial division by every odd candidate from 3 up to `floor(sqrt(n))`.
///
/// Even numbers are never prime here. Values below 3 are rejected with
/// `InvalidArgument`.
pub fn is_prime(n: usize) -> Result<bool> {
    if n < 3 {
        return Err(ContainerError::InvalidArgument("prime candidate must be at least 3"));
    }
    if n % 2 == 0 {
        return Ok(false);
    }
    let mut d = 3usize;
    while d <= n / d {
        if n % d == 0 {
            return Ok(false);
        }
        d += 2;
    }
    Ok(true)
}

/// Bucket index of `key` in a table of `table_size` buckets.
pub fn hash_index<Q>(key: &Q, table_size: usize, prime: usize) -> Result<usize>
where
    Q: Element + ?Sized,
{
    hash_scalar(Q::TAG, key.scalar(), table_size, prime)
}

fn hash_scalar(tag: TypeTag, key: Scalar<'_>, table_size: usize, prime: usize) -> Result<usize> {
    if table_size == 0 {
        return Err(ContainerError::InvalidArgument("table size must be non-zero"));
    }
    let modulus = table_size as u64;
    let raw: u64 = match key {
        Scalar::U8(v) => u64::from(v),
        Scalar::U16(v) => u64::from(v),
        Scalar::U32(v) => u64::from(v),
        Scalar::U64(v) => v,
        Scalar::I8(v) => i64::from(v) as u64,
        Scalar::I16(v) => i64::from(v) as u64,
        Scalar::I32(v) => i64::from(v) as u64,
        Scalar::I64(v) => v as u64,
        Scalar::Char(c) => u64::from(u32::from(c)),
        Scalar::Str(s) => s
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_add(u64::from(b)))
            .wrapping_add(prime as u64),
        Scalar::Size(_) | Scalar::Unsupported => return Err(ContainerError::NotSupported(tag)),
    };
    Ok((raw % modulus) as usize)
}

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Outcome of a successful [`HashMap::upsert`].
#[derive(Debug, PartialEq, Eq)]
pub enum Upsert<K> {
    /// A new entry now owns the key and value.
    Inserted,
    /// The key was already present. The stored key is kept and the old value
    /// dropped; the caller's key was not adopted and is handed back.
    Replaced { rejected_key: K },
}

/// Separate-chaining hash map over [`Element`] keys and values.
///
/// The map owns every bucket, entry, key and value until an entry is
/// removed (ownership moves to the caller) or the map is dropped (everything
/// left is released together).
pub struct HashMap<K, V> {
    table: Vec<ChainList<Entry<K, V>>>,
    prime: usize,
    max_table_size: usize,
    len: usize,
    collision: Cell<bool>,
    #[cfg(any(test, feature = "fault_injection"))]
    migration_fault: Cell<Option<usize>>,
}

impl<K, V> HashMap<K, V>
where
    K: Element,
    V: Element,
{
    /// Empty map with `DEFAULT_TABLE_SIZE` buckets and `DEFAULT_PRIME`.
    pub fn new() -> Self {
        let mut table = Vec::with_capacity(DEFAULT_TABLE_SIZE);
        table.resize_with(DEFAULT_TABLE_SIZE, ChainList::new);
        Self::from_table(table, DEFAULT_PRIME, usize::MAX)
    }

    pub fn builder() -> HashMapBuilder<K, V> {
        HashMapBuilder::new()
    }

    pub fn with_table_size(table_size: usize) -> Result<Self> {
        HashMapBuilder::new().table_size(table_size).build()
    }

    pub fn with_config(table_size: usize, prime: usize) -> Result<Self> {
        HashMapBuilder::new().table_size(table_size).prime(prime).build()
    }

    /// Called by the builder once the parameters are validated.
    pub(crate) fn with_validated(table_size: usize, prime: usize, max_table_size: usize) -> Result<Self> {
        let table = alloc_table(table_size)?;
        Ok(Self::from_table(table, prime, max_table_size))
    }

    fn from_table(table: Vec<ChainList<Entry<K, V>>>, prime: usize, max_table_size: usize) -> Self {
        debug!(table_size = table.len(), prime, "hash map created");
        Self {
            table,
            prime,
            max_table_size,
            len: 0,
            collision: Cell::new(false),
            #[cfg(any(test, feature = "fault_injection"))]
            migration_fault: Cell::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn table_size(&self) -> usize {
        self.table.len()
    }

    pub fn prime(&self) -> usize {
        self.prime
    }

    pub fn max_table_size(&self) -> usize {
        self.max_table_size
    }

    pub fn key_type(&self) -> TypeTag {
        K::TAG
    }

    pub fn value_type(&self) -> TypeTag {
        V::TAG
    }

    /// Whether a search has stepped past a non-matching entry since the
    /// last successful resize.
    pub fn collision_detected(&self) -> bool {
        self.collision.get()
    }

    /// Bucket index of `key` under the current table size.
    pub fn hash<Q>(&self, key: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        hash_scalar(K::TAG, key.scalar(), self.table.len(), self.prime)
    }

    /// Insert `key -> value`, or overwrite the value of an existing equal key.
    ///
    /// `key` and `value` are moved in unconditionally. If the call fails
    /// before an entry is added (`NotSupported` for an unhashable key type,
    /// `NoMemory` when the bucket cannot grow) both are dropped; check
    /// [`hash`](Self::hash) first when the caller needs to keep them.
    ///
    /// If a new entry was added while the collision flag is up, the table is
    /// doubled before returning. When doubling would pass `max_table_size`
    /// the call fails with `ContainerAtCapacity`; the new entry stays in the
    /// map and the flag stays up. A resize error is likewise returned with
    /// the entry already inserted.
    pub fn upsert(&mut self, key: K, value: V) -> Result<Upsert<K>> {
        let idx = self.hash(&key)?;
        match self.search(idx, &key) {
            Ok(handle) => {
                let entry = self.table[idx]
                    .get_mut(handle)
                    .ok_or(ContainerError::Internal("matched entry missing from chain"))?;
                entry.value = value;
                return Ok(Upsert::Replaced { rejected_key: key });
            }
            Err(ContainerError::NotFound) => {}
            Err(e) => return Err(e),
        }

        self.table[idx].try_reserve(1)?;
        self.table[idx].push_back(Entry { key, value });
        self.len += 1;

        if self.collision.get() {
            self.grow()?;
        }
        Ok(Upsert::Inserted)
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        let idx = self.hash(key)?;
        let handle = self.search(idx, key)?;
        self.table[idx]
            .get(handle)
            .map(|e| (&e.key, &e.value))
            .ok_or(ContainerError::Internal("matched entry missing from chain"))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        let idx = self.hash(key)?;
        let handle = self.search(idx, key)?;
        self.table[idx]
            .get_mut(handle)
            .map(|e| &mut e.value)
            .ok_or(ContainerError::Internal("matched entry missing from chain"))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        match self.get_key_value(key) {
            Ok(_) => Ok(true),
            Err(ContainerError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Unlink the entry for `key` and transfer ownership of its key and
    /// value to the caller.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        let idx = self.hash(key)?;
        let handle = self.search(idx, key)?;
        let entry = self.table[idx].remove(handle)?;
        self.len -= 1;
        Ok((entry.key, entry.value))
    }

    /// Rehash every entry into a table of `new_size` buckets.
    ///
    /// All-or-nothing: on error the table, its size and every entry are
    /// exactly as before the call. On success the collision flag is cleared.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        if new_size == 0 {
            return Err(ContainerError::InvalidArgument("table size must be non-zero"));
        }
        let old_size = self.table.len();
        let (table, plan) = match self.prepare_migration(new_size) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(old_size, new_size, error = %e, "resize aborted, table unchanged");
                return Err(e);
            }
        };

        let old = core::mem::replace(&mut self.table, table);
        for (entry, idx) in old.into_iter().flatten().zip(plan) {
            self.table[idx].push_back(entry);
        }
        self.collision.set(false);
        debug!(old_size, new_size, entries = self.len, "hash table resized");
        Ok(())
    }

    /// Drop every entry; the table keeps its size.
    pub fn clear(&mut self) {
        for chain in &mut self.table {
            chain.clear();
        }
        self.len = 0;
        self.collision.set(false);
    }

    /// Entries in bucket order, chain order within a bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.table
            .iter()
            .flat_map(|chain| chain.iter())
            .map(|e| (&e.key, &e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.table
            .iter_mut()
            .flat_map(|chain| chain.values_mut())
            .map(|e| &mut e.value)
    }

    /// Number of entries in each bucket.
    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.table.iter().map(ChainList::len).collect()
    }

    /// Make the next resize fail with `NoMemory` once `entries` entries have
    /// been planned. One-shot; a resize of a map with at most `entries`
    /// entries disarms it without failing.
    #[cfg(any(test, feature = "fault_injection"))]
    pub fn fail_next_migration_after(&mut self, entries: usize) {
        self.migration_fault.set(Some(entries));
    }

    fn search<Q>(&self, idx: usize, key: &Q) -> Result<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Element + ?Sized,
    {
        for (handle, entry) in self.table[idx].nodes() {
            let stored: &Q = entry.key.borrow();
            if compare_scalars(K::TAG, key.scalar(), stored.scalar())? == 0 {
                return Ok(handle);
            }
            if !self.collision.replace(true) {
                trace!(bucket = idx, "collision detected");
            }
        }
        Err(ContainerError::NotFound)
    }

    fn grow(&mut self) -> Result<()> {
        let current = self.table.len();
        match current.checked_mul(2).filter(|n| *n <= self.max_table_size) {
            Some(new_size) => self.resize(new_size),
            None => {
                warn!(
                    table_size = current,
                    max_table_size = self.max_table_size,
                    "hash table cannot double"
                );
                Err(ContainerError::ContainerAtCapacity)
            }
        }
    }

    // Everything phase two needs is allocated here: the new table, the plan,
    // and node room in every target bucket for the entries planned into it.
    fn prepare_migration(&self, new_size: usize) -> Result<(Vec<ChainList<Entry<K, V>>>, Vec<usize>)> {
        let mut table = alloc_table(new_size)?;
        let mut plan = Vec::new();
        plan.try_reserve_exact(self.len)?;
        let mut per_bucket: Vec<usize> = Vec::new();
        per_bucket.try_reserve_exact(new_size)?;
        per_bucket.resize(new_size, 0);
        let fault = self.take_migration_fault();

        for entry in self.table.iter().flat_map(|chain| chain.iter()) {
            if fault == Some(plan.len()) {
                return Err(ContainerError::NoMemory);
            }
            let idx = hash_scalar(K::TAG, entry.key.scalar(), new_size, self.prime)?;
            per_bucket[idx] += 1;
            plan.push(idx);
        }
        if plan.len() != self.len {
            return Err(ContainerError::Internal("entry count out of sync with chains"));
        }
        for (chain, planned) in table.iter_mut().zip(per_bucket) {
            chain.try_reserve(planned)?;
        }
        Ok((table, plan))
    }

    /// Every entry sits in the bucket its key hashes to, and `len` matches.
    #[cfg(test)]
    pub(crate) fn check_placement(&self) -> Result<()> {
        let size = self.table.len();
        if size == 0 {
            return Err(ContainerError::Internal("empty table"));
        }
        let mut count = 0;
        for (idx, chain) in self.table.iter().enumerate() {
            for entry in chain.iter() {
                if hash_scalar(K::TAG, entry.key.scalar(), size, self.prime)? != idx {
                    return Err(ContainerError::Internal("entry in wrong bucket"));
                }
                count += 1;
            }
        }
        if count != self.len {
            return Err(ContainerError::Internal("len out of sync"));
        }
        Ok(())
    }

    #[cfg(any(test, feature = "fault_injection"))]
    fn take_migration_fault(&self) -> Option<usize> {
        self.migration_fault.take()
    }

    #[cfg(not(any(test, feature = "fault_injection")))]
    fn take_migration_fault(&self) -> Option<usize> {
        None
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Element,
    V: Element,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for HashMap<K, V>
where
    K: Element + fmt::Debug,
    V: Element + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// Buckets start without a node store, so the table is one allocation.
fn alloc_table<T>(size: usize) -> Result<Vec<ChainList<T>>> {
    let mut table = Vec::new();
    table.try_reserve_exact(size)?;
    table.resize_with(size, ChainList::new);
    Ok(table)
}
