//! Construction-time configuration for [`HashMap`].

use crate::error::{ContainerError, Result};
use crate::hash_map::{is_prime, HashMap, DEFAULT_PRIME, DEFAULT_TABLE_SIZE};
use crate::type_tag::Element;
use core::fmt;
use core::marker::PhantomData;

/// Builder for a [`HashMap<K, V>`].
///
/// ```
/// use tagged_collections::{HashMap, HashMapBuilder};
///
/// let map: HashMap<u32, String> = HashMap::builder()
///     .table_size(16)
///     .prime(13)
///     .build()
///     .unwrap();
/// assert_eq!(map.table_size(), 16);
/// assert_eq!(map.prime(), 13);
///
/// let bounded = HashMapBuilder::<i64, char>::new()
///     .max_table_size(40)
///     .build()
///     .unwrap();
/// assert_eq!(bounded.max_table_size(), 40);
/// ```
pub struct HashMapBuilder<K, V> {
    table_size: usize,
    prime: Option<usize>,
    max_table_size: usize,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Default for HashMapBuilder<K, V> {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            prime: None,
            max_table_size: usize::MAX,
            _types: PhantomData,
        }
    }
}

impl<K, V> Clone for HashMapBuilder<K, V> {
    fn clone(&self) -> Self {
        Self {
            table_size: self.table_size,
            prime: self.prime,
            max_table_size: self.max_table_size,
            _types: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for HashMapBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashMapBuilder")
            .field("table_size", &self.table_size)
            .field("prime", &self.prime)
            .field("max_table_size", &self.max_table_size)
            .finish()
    }
}

impl<K, V> HashMapBuilder<K, V>
where
    K: Element,
    V: Element,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial number of buckets. Must be non-zero.
    pub fn table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Additive constant for string hashing; must be an odd prime. Defaults
    /// to `DEFAULT_PRIME` when unset.
    pub fn prime(mut self, prime: usize) -> Self {
        self.prime = Some(prime);
        self
    }

    /// Ceiling for automatic doubling. Growth that would pass it fails with
    /// `ContainerAtCapacity`. Explicit `resize` calls are not limited.
    pub fn max_table_size(mut self, max_table_size: usize) -> Self {
        self.max_table_size = max_table_size;
        self
    }

    pub fn build(self) -> Result<HashMap<K, V>> {
        if self.table_size == 0 {
            return Err(ContainerError::InvalidArgument("table size must be non-zero"));
        }
        if self.max_table_size < self.table_size {
            return Err(ContainerError::InvalidArgument(
                "max table size is below the initial table size",
            ));
        }
        let prime = match self.prime {
            None => DEFAULT_PRIME,
            Some(p) if is_prime(p)? => p,
            Some(_) => return Err(ContainerError::InvalidArgument("prime must be an odd prime")),
        };
        HashMap::with_validated(self.table_size, prime, self.max_table_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the builder's type parameters come from the map it builds,
    /// so the entry point on `HashMap` needs no annotations of its own.
    #[test]
    fn builder_from_map_type_infers_parameters() {
        let m: HashMap<u16, String> = HashMap::builder().table_size(7).build().unwrap();
        assert_eq!(m.table_size(), 7);
        assert_eq!(m.key_type(), crate::type_tag::TypeTag::U16);

        let b = HashMapBuilder::<u8, u8>::new().prime(13);
        let copy = b.clone();
        assert_eq!(copy.build().unwrap().prime(), 13);
        assert!(format!("{:?}", b).contains("prime: Some(13)"));
    }

    #[test]
    fn defaults_match_constants() {
        let m: HashMap<u8, u8> = HashMapBuilder::new().build().unwrap();
        assert_eq!(m.table_size(), DEFAULT_TABLE_SIZE);
        assert_eq!(m.prime(), DEFAULT_PRIME);
        assert_eq!(m.max_table_size(), usize::MAX);
    }

    #[test]
    fn even_prime_is_rejected() {
        let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().prime(4).build();
        assert_eq!(r.err(), Some(ContainerError::InvalidArgument("prime must be an odd prime")));
    }

    #[test]
    fn composite_and_tiny_primes_are_rejected() {
        for p in [9usize, 15, 1, 2, 0] {
            let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().prime(p).build();
            assert!(matches!(r, Err(ContainerError::InvalidArgument(_))), "{}", p);
        }
        let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().prime(7).build();
        assert!(r.is_ok());
    }

    #[test]
    fn table_size_bounds_are_validated() {
        let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().table_size(0).build();
        assert!(matches!(r, Err(ContainerError::InvalidArgument(_))));
        let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().table_size(8).max_table_size(4).build();
        assert!(matches!(r, Err(ContainerError::InvalidArgument(_))));
        let r: Result<HashMap<u8, u8>> = HashMapBuilder::new().table_size(usize::MAX).build();
        assert_eq!(r.err(), Some(ContainerError::NoMemory));
    }
}
