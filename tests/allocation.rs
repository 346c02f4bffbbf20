// Counts heap allocations made by the calling thread.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use tagged_collections::HashMap;

struct Counting;

thread_local! {
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCS.try_with(|c| c.set(c.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _ = ALLOCS.try_with(|c| c.set(c.get() + 1));
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn allocations_during<R>(f: impl FnOnce() -> R) -> (usize, R) {
    let before = ALLOCS.with(Cell::get);
    let out = f();
    (ALLOCS.with(Cell::get) - before, out)
}

/// A large table is a single allocation; buckets allocate only once used.
#[test]
fn table_construction_and_resize_allocation_counts() {
    // First use registers logging callsites; keep that out of the counts.
    drop(HashMap::<u32, u32>::with_table_size(1).unwrap());

    let (allocs, m) = allocations_during(|| HashMap::<u32, u32>::with_table_size(100_000).unwrap());
    assert!(allocs <= 2, "table construction made {} allocations", allocs);
    assert_eq!(m.table_size(), 100_000);
    drop(m);

    let mut m: HashMap<u32, u32> = HashMap::with_table_size(8).unwrap();
    for k in 0..64u32 {
        m.upsert(k, k).unwrap();
    }
    let (allocs, res) = allocations_during(|| m.resize(100_000));
    res.unwrap();
    // New table, plan, per-bucket counts, then node room for the 64 buckets
    // that receive an entry. The 99_936 empty buckets cost nothing.
    assert!(allocs <= 3 + 2 * 64, "resize made {} allocations", allocs);
    for k in 0..64u32 {
        assert_eq!(m.get(&k), Ok(&k));
    }
}
