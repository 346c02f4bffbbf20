//! ChainList: singly linked list with stable node handles.
//!
//! Nodes live in a `SlotMap`, linked head to tail through generational keys.
//! A `NodeHandle` keeps addressing the same node until it is removed and
//! never resolves to a different node afterwards, even if the slot is
//! reused. Each list carries its own id and handles minted by another list
//! are rejected as `NotFound`.
//!
//! The node store is created on first insert or reservation, so an empty
//! list owns no heap memory. The hash map uses one `ChainList` per bucket as
//! its collision chain; insertion order is append-only there.

use crate::error::{ContainerError, Result};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::{DefaultKey, SlotMap};

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one list instance; stamped into every handle it mints.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct ListId(u64);

impl ListId {
    pub(crate) fn fresh() -> Self {
        ListId(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable reference to a node of a [`ChainList`] or [`DList`](crate::DList).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeHandle {
    pub(crate) list: ListId,
    pub(crate) key: DefaultKey,
}

struct Node<T> {
    value: T,
    next: Option<DefaultKey>,
}

pub struct ChainList<T> {
    id: ListId,
    slots: Option<SlotMap<DefaultKey, Node<T>>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> Default for ChainList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChainList<T> {
    /// Empty list. Does not allocate.
    pub fn new() -> Self {
        Self {
            id: ListId::fresh(),
            slots: None,
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, SlotMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of nodes the list can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.as_ref().map_or(0, SlotMap::capacity)
    }

    /// Reserve room for `additional` more nodes, reporting allocation
    /// failure as `NoMemory`. Pushes within the reservation do not allocate.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }
        self.store().try_reserve(additional)?;
        Ok(())
    }

    /// Append to the tail. O(1).
    pub fn push_back(&mut self, value: T) -> NodeHandle {
        let tail = self.tail;
        let slots = self.store();
        let k = slots.insert(Node { value, next: None });
        match tail {
            Some(t) => slots[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        self.handle(k)
    }

    /// Prepend at the head. O(1).
    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let next = self.head;
        let k = self.store().insert(Node { value, next });
        self.head = Some(k);
        if self.tail.is_none() {
            self.tail = Some(k);
        }
        self.handle(k)
    }

    pub fn pop_front(&mut self) -> Result<T> {
        let k = self.head.ok_or(ContainerError::ContainerEmpty)?;
        self.unlink(None, k)
    }

    /// Remove the tail. O(n): the predecessor has to be found from the head.
    pub fn pop_back(&mut self) -> Result<T> {
        let k = self.tail.ok_or(ContainerError::ContainerEmpty)?;
        let prev = self.predecessor(k)?;
        self.unlink(prev, k)
    }

    /// Insert so that the new node ends up at position `idx`; an index past
    /// the end appends.
    pub fn insert_at(&mut self, idx: usize, value: T) -> NodeHandle {
        if idx == 0 {
            return self.push_front(value);
        }
        if idx >= self.len() {
            return self.push_back(value);
        }
        let mut prev = match self.head {
            Some(h) => h,
            None => return self.push_back(value),
        };
        for _ in 1..idx {
            match self.node(prev).and_then(|n| n.next) {
                Some(n) => prev = n,
                None => break,
            }
        }
        let slots = self.store();
        let next = slots[prev].next;
        let k = slots.insert(Node { value, next });
        slots[prev].next = Some(k);
        if next.is_none() {
            self.tail = Some(k);
        }
        self.handle(k)
    }

    /// Unlink the node behind `handle` and hand its value back to the
    /// caller. Neighbors are rewired; other handles stay valid.
    pub fn remove(&mut self, handle: NodeHandle) -> Result<T> {
        let k = self.key(handle).ok_or(ContainerError::NotFound)?;
        let prev = self.predecessor(k)?;
        self.unlink(prev, k)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let k = self.key(handle)?;
        self.node(k).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let k = self.key(handle)?;
        self.slots.as_mut()?.get_mut(k).map(|n| &mut n.value)
    }

    pub fn get_at(&self, idx: usize) -> Result<&T> {
        self.iter().nth(idx).ok_or(ContainerError::NotFound)
    }

    /// First node, in list order, whose value satisfies `pred`.
    pub fn find<F>(&self, mut pred: F) -> Option<NodeHandle>
    where
        F: FnMut(&T) -> bool,
    {
        self.nodes().find(|(_, v)| pred(v)).map(|(h, _)| h)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|k| self.node(k)).map(|n| &n.value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|k| self.node(k)).map(|n| &n.value)
    }

    /// Values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: self.nodes(),
        }
    }

    /// Handles and values from head to tail.
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes {
            list: self.id,
            slots: self.slots.as_ref(),
            next: self.head,
        }
    }

    /// Mutable access to every value, in storage order rather than list order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots
            .iter_mut()
            .flat_map(|slots| slots.values_mut())
            .map(|n| &mut n.value)
    }

    /// Drop every node. Handles minted before the call stay invalid; the
    /// node store keeps its capacity.
    pub fn clear(&mut self) {
        if let Some(slots) = self.slots.as_mut() {
            slots.clear();
        }
        self.head = None;
        self.tail = None;
    }

    fn store(&mut self) -> &mut SlotMap<DefaultKey, Node<T>> {
        self.slots.get_or_insert_with(SlotMap::with_key)
    }

    fn node(&self, k: DefaultKey) -> Option<&Node<T>> {
        self.slots.as_ref()?.get(k)
    }

    fn handle(&self, key: DefaultKey) -> NodeHandle {
        NodeHandle { list: self.id, key }
    }

    fn key(&self, handle: NodeHandle) -> Option<DefaultKey> {
        let live = handle.list == self.id && self.node(handle.key).is_some();
        live.then_some(handle.key)
    }

    fn predecessor(&self, k: DefaultKey) -> Result<Option<DefaultKey>> {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(c) = cur {
            if c == k {
                return Ok(prev);
            }
            prev = Some(c);
            cur = self.node(c).and_then(|n| n.next);
        }
        Err(ContainerError::Internal("live node unreachable from head"))
    }

    fn unlink(&mut self, prev: Option<DefaultKey>, k: DefaultKey) -> Result<T> {
        let slots = self
            .slots
            .as_mut()
            .ok_or(ContainerError::Internal("linked node missing from storage"))?;
        let node = slots
            .remove(k)
            .ok_or(ContainerError::Internal("linked node missing from storage"))?;
        match prev {
            Some(p) => slots[p].next = node.next,
            None => self.head = node.next,
        }
        if self.tail == Some(k) {
            self.tail = prev;
        }
        Ok(node.value)
    }
}

/// Iterator over `(NodeHandle, &T)` in list order.
pub struct Nodes<'a, T> {
    list: ListId,
    slots: Option<&'a SlotMap<DefaultKey, Node<T>>>,
    next: Option<DefaultKey>,
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = (NodeHandle, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let node = self.slots?.get(k)?;
        self.next = node.next;
        Some((NodeHandle { list: self.list, key: k }, &node.value))
    }
}

/// Iterator over `&T` in list order.
pub struct Iter<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|(_, v)| v)
    }
}

impl<'a, T> IntoIterator for &'a ChainList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator; drains from the head.
pub struct IntoIter<T> {
    list: ChainList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> IntoIterator for ChainList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<T> FromIterator<T> for ChainList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = ChainList::new();
        for v in iter {
            list.push_back(v);
        }
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for ChainList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
