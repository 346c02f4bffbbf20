use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;

use tagged_collections::{ContainerError, HashMap, Opaque, TypeTag, Upsert};

#[test]
fn upsert_get_remove_round_trip() {
    let mut m: HashMap<u32, String> = HashMap::with_table_size(10).unwrap();
    for (k, v) in [(1u32, "abc"), (2, "def"), (3, "ghi")] {
        m.upsert(k, v.to_string()).expect("insert ok");
    }
    assert_eq!(m.get(&1).map(String::as_str), Ok("abc"));
    assert_eq!(m.get(&2).map(String::as_str), Ok("def"));
    assert_eq!(m.get(&3).map(String::as_str), Ok("ghi"));

    let (k, v) = m.remove(&2).expect("present");
    assert_eq!((k, v.as_str()), (2, "def"));
    assert_eq!(m.get(&2), Err(ContainerError::NotFound));
    assert_eq!(m.remove(&2), Err(ContainerError::NotFound));
}

#[test]
fn even_prime_rejected_at_construction() {
    let r = HashMap::<u32, u32>::with_config(10, 4);
    assert!(matches!(r, Err(ContainerError::InvalidArgument(_))));
    assert!(HashMap::<u32, u32>::with_config(10, 13).is_ok());
}

#[test]
fn upsert_then_get_yields_latest_value() {
    let mut m: HashMap<String, i64> = HashMap::new();
    m.upsert("k".to_string(), 1).unwrap();
    let res = m.upsert("k".to_string(), 2).unwrap();
    assert_eq!(res, Upsert::Replaced { rejected_key: "k".to_string() });
    assert_eq!(m.get("k"), Ok(&2));
    assert_eq!(m.len(), 1);
}

#[test]
fn signed_and_char_keys() {
    let mut m: HashMap<i32, char> = HashMap::new();
    for k in -5..5 {
        m.upsert(k, char::from(b'a' + (k + 5) as u8)).unwrap();
    }
    assert_eq!(m.get(&-5), Ok(&'a'));
    assert_eq!(m.get(&4), Ok(&'j'));
    // -1 sign-extends to u64::MAX, which lands in bucket 5 of a 10-bucket table.
    let probe: HashMap<i32, char> = HashMap::new();
    assert_eq!(probe.hash(&-1), Ok(5));

    let mut c: HashMap<char, u8> = HashMap::new();
    c.upsert('x', 1).unwrap();
    assert_eq!(c.get(&'x'), Ok(&1));
    assert_eq!(c.key_type(), TypeTag::Char);
    assert_eq!(c.value_type(), TypeTag::U8);
}

#[test]
fn usize_keys_are_not_hashable() {
    let mut m: HashMap<usize, u8> = HashMap::new();
    assert_eq!(m.upsert(1, 1), Err(ContainerError::NotSupported(TypeTag::Size)));
    assert_eq!(m.get(&1), Err(ContainerError::NotSupported(TypeTag::Size)));
}

#[test]
fn collisions_grow_the_table_automatically() {
    let mut m: HashMap<u64, u64> = HashMap::new();
    assert_eq!(m.table_size(), 10);
    m.upsert(2, 2).unwrap();
    m.upsert(12, 12).unwrap();
    m.upsert(7, 7).unwrap();
    assert!(m.table_size() >= 20);
    for k in [2u64, 12, 7] {
        assert_eq!(m.get(&k), Ok(&k));
    }
}

#[test]
fn resize_preserves_entries_and_sets_size() {
    let mut m: HashMap<u16, u16> = HashMap::new();
    for k in 0..50u16 {
        m.upsert(k, k * 2).unwrap();
    }
    for n in [7usize, 1, 97, 13] {
        m.resize(n).unwrap();
        assert_eq!(m.table_size(), n);
        for k in 0..50u16 {
            assert_eq!(m.get(&k), Ok(&(k * 2)));
        }
    }
}

#[test]
fn resize_to_impossible_size_leaves_map_unchanged() {
    let mut m: HashMap<u8, u8> = HashMap::new();
    m.upsert(1, 1).unwrap();
    assert_eq!(m.resize(usize::MAX), Err(ContainerError::NoMemory));
    assert_eq!(m.table_size(), 10);
    assert_eq!(m.get(&1), Ok(&1));
}

struct DropCounter(Rc<Cell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Overwrite releases the old value; remove hands ownership out; dropping
/// the map releases everything still inside.
#[test]
fn ownership_of_values() {
    let drops = Rc::new(Cell::new(0));
    let mut m: HashMap<u32, Opaque<DropCounter>> = HashMap::new();
    for k in 0..4 {
        m.upsert(k, Opaque(DropCounter(drops.clone()))).unwrap();
    }
    m.upsert(0, Opaque(DropCounter(drops.clone()))).unwrap();
    assert_eq!(drops.get(), 1, "old value dropped on overwrite");

    let (_k, removed) = m.remove(&1).unwrap();
    assert_eq!(drops.get(), 1, "removed value now owned by caller");
    drop(removed);
    assert_eq!(drops.get(), 2);

    drop(m);
    assert_eq!(drops.get(), 5, "remaining three values released with the map");
}

#[test]
fn overwrite_keeps_first_key_allocation() {
    let mut m: HashMap<Box<String>, u8> = HashMap::new();
    let first = Box::new("key".to_string());
    let first_addr: *const String = &*first;
    m.upsert(first, 1).unwrap();

    let second = Box::new("key".to_string());
    match m.upsert(second, 2).unwrap() {
        Upsert::Replaced { rejected_key } => assert_eq!(*rejected_key, "key"),
        Upsert::Inserted => panic!("expected overwrite"),
    }
    let (k, v) = m.get_key_value(&"key".to_string()).unwrap();
    assert_eq!(&**k as *const String, first_addr);
    assert_eq!(*v, 2);
}

/// The map has no internal locking; shared use goes through a Mutex.
#[test]
fn externally_serialized_access_from_threads() {
    let shared = Arc::new(Mutex::new(HashMap::<u32, u32>::new()));
    let workers: Vec<_> = (0..4u32)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..50u32 {
                    let key = t * 1000 + i;
                    shared.lock().unwrap().upsert(key, key + 1).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let m = shared.lock().unwrap();
    assert_eq!(m.len(), 200);
    for t in 0..4u32 {
        for i in 0..50u32 {
            let key = t * 1000 + i;
            assert_eq!(m.get(&key), Ok(&(key + 1)));
        }
    }
}
