#![cfg(test)]

// Property tests for HashMap kept inside the crate so they can check bucket
// placement and drive the resize fault hook without feature gates.

use crate::error::ContainerError;
use crate::hash_map::{HashMap, Upsert};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Upsert(u16, u32),
    Get(u16),
    Remove(u16),
    Resize(usize),
    FailedResize(usize, usize),
    Clear,
}

// Keys drawn from a small range so chains regularly hold several entries.
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u16..64, any::<u32>()).prop_map(|(k, v)| Op::Upsert(k, v)),
        3 => (0u16..64).prop_map(Op::Get),
        3 => (0u16..64).prop_map(Op::Remove),
        1 => (1usize..48).prop_map(Op::Resize),
        1 => (1usize..48, 0usize..8).prop_map(|(n, at)| Op::FailedResize(n, at)),
        1 => Just(Op::Clear),
    ]
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - `get(k)` returns the last upserted value until `k` is removed.
// - Upserting a present key reports `Replaced` and hands back the caller's key.
// - `remove` returns the owned pair once; a second remove is `NotFound`.
// - Explicit resize keeps every entry and sets `table_size` exactly.
// - A failed resize leaves size and contents unchanged.
// - After every step each entry sits in the bucket its key hashes to.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(initial in 1usize..16, ops in proptest::collection::vec(arb_op(), 1..120)) {
        let mut sut: HashMap<u16, u32> = HashMap::with_table_size(initial).unwrap();
        let mut model: hashbrown::HashMap<u16, u32> = hashbrown::HashMap::new();

        for op in ops {
            match op {
                Op::Upsert(k, v) => {
                    let res = sut.upsert(k, v).unwrap();
                    match model.insert(k, v) {
                        Some(_) => prop_assert_eq!(res, Upsert::Replaced { rejected_key: k }),
                        None => prop_assert_eq!(res, Upsert::Inserted),
                    }
                }
                Op::Get(k) => match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.get(&k), Ok(v)),
                    None => prop_assert_eq!(sut.get(&k), Err(ContainerError::NotFound)),
                },
                Op::Remove(k) => match model.remove(&k) {
                    Some(v) => {
                        prop_assert_eq!(sut.remove(&k), Ok((k, v)));
                        prop_assert_eq!(sut.remove(&k), Err(ContainerError::NotFound));
                    }
                    None => prop_assert_eq!(sut.remove(&k), Err(ContainerError::NotFound)),
                },
                Op::Resize(n) => {
                    sut.resize(n).unwrap();
                    prop_assert_eq!(sut.table_size(), n);
                    prop_assert!(!sut.collision_detected());
                }
                Op::FailedResize(n, at) => {
                    let size = sut.table_size();
                    let lengths = sut.bucket_lengths();
                    sut.fail_next_migration_after(at);
                    let res = sut.resize(n);
                    if at < sut.len() {
                        prop_assert_eq!(res, Err(ContainerError::NoMemory));
                        prop_assert_eq!(sut.table_size(), size);
                        prop_assert_eq!(sut.bucket_lengths(), lengths);
                    } else {
                        prop_assert!(res.is_ok());
                        prop_assert_eq!(sut.table_size(), n);
                    }
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.check_placement().is_ok());
        }

        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Ok(v));
        }
    }
}

// Property: string keys survive automatic growth. Whatever the collision
// pattern, every inserted key is retrievable and placement holds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_string_keys_survive_growth(keys in proptest::collection::hash_set("[a-z]{0,6}", 1..40)) {
        let mut sut: HashMap<String, u32> = HashMap::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.upsert(k.clone(), i as u32), Ok(Upsert::Inserted));
        }
        prop_assert!(sut.check_placement().is_ok());
        prop_assert!(sut.table_size() >= 10);
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.get(k.as_str()), Ok(&(i as u32)));
        }
    }
}
