//! tagged-collections: a small family of containers over a closed set of
//! primitive element types, centred on a separate-chaining hash map.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: generic containers without per-type hash or equality traits.
//!   Every element reports a runtime `TypeTag` and a primitive `Scalar`
//!   view; hashing and comparison are fixed dispatches over those.
//! - Layers:
//!   - `type_tag` + `comparator`: the closed element set and the three-way
//!     comparison used for ordering and key equality.
//!   - `ChainList<T>`: singly linked list with stable, generational node
//!     handles; one per hash bucket. Its node store is created lazily so
//!     empty buckets own no heap memory.
//!   - `DList<T>`: doubly linked sibling with O(1) removal at both ends
//!     and by handle.
//!   - `Vector<T>`: amortized-growth sequence with an optional capacity lock.
//!   - `HashMap<K, V>`: table of chain lists, modulus hashing, growth by
//!     doubling when a collision was observed, all-or-nothing resize.
//!
//! Constraints
//! - Single-threaded: no internal locking. The map is `Send` but not
//!   `Sync`; callers that share it across threads serialize access.
//! - Fallible operations return `Result<_, ContainerError>`; allocation
//!   failures surface as `NoMemory` instead of aborting where the standard
//!   library allows it (`try_reserve_exact`).
//! - Unsupported element types (bools, `Opaque<T>`, `usize` keys for
//!   hashing) are storable where no hashing or comparison is needed and fail
//!   with `NotSupported` otherwise.
//!
//! Ownership
//! - The map owns buckets, entries, keys and values. `remove` moves the key
//!   and value out to the caller. Overwriting an existing key keeps the
//!   stored key, drops the old value and hands the caller's key back.
//!
//! Non-goals
//! - No user-supplied hashers or comparators, no persistence, no
//!   shrink-on-delete, no concurrent access.

pub mod chain_list;
pub mod comparator;
pub mod config;
pub mod dlist;
pub mod error;
pub mod hash_map;
mod hash_map_proptest;
pub mod type_tag;
pub mod vector;

// Public surface
pub use chain_list::{ChainList, NodeHandle};
pub use comparator::{compare, compare_scalars};
pub use config::HashMapBuilder;
pub use dlist::DList;
pub use error::{ContainerError, Result};
pub use hash_map::{hash_index, is_prime, HashMap, Upsert, DEFAULT_PRIME, DEFAULT_TABLE_SIZE};
pub use type_tag::{Element, Opaque, Scalar, TypeTag};
pub use vector::{Vector, VECTOR_DEFAULT_CAPACITY};
