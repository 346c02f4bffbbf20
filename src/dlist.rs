//! DList: doubly linked list with stable node handles.
//!
//! Same storage scheme as `ChainList` (a `SlotMap` of nodes addressed by
//! generational keys), with a back link per node so that `pop_back` and
//! removal by handle are O(1).

use crate::chain_list::{ListId, NodeHandle};
use crate::error::{ContainerError, Result};
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

struct Node<T> {
    value: T,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub struct DList<T> {
    id: ListId,
    slots: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> Default for DList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DList<T> {
    pub fn new() -> Self {
        Self {
            id: ListId::fresh(),
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push_back(&mut self, value: T) -> NodeHandle {
        let k = self.slots.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(t) => self.slots[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        self.handle(k)
    }

    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let k = self.slots.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(h) => self.slots[h].prev = Some(k),
            None => self.tail = Some(k),
        }
        self.head = Some(k);
        self.handle(k)
    }

    pub fn pop_front(&mut self) -> Result<T> {
        let k = self.head.ok_or(ContainerError::ContainerEmpty)?;
        self.unlink(k)
    }

    pub fn pop_back(&mut self) -> Result<T> {
        let k = self.tail.ok_or(ContainerError::ContainerEmpty)?;
        self.unlink(k)
    }

    /// Insert so that the new node ends up at position `idx`; an index past
    /// the end appends.
    pub fn insert_at(&mut self, idx: usize, value: T) -> NodeHandle {
        let mut cur = self.head;
        for _ in 0..idx {
            match cur {
                Some(c) => cur = self.slots[c].next,
                None => break,
            }
        }
        match cur {
            None => self.push_back(value),
            Some(c) if Some(c) == self.head => self.push_front(value),
            Some(c) => self.insert_before(c, value),
        }
    }

    /// Insert directly before the node behind `handle`.
    pub fn insert_before_handle(&mut self, handle: NodeHandle, value: T) -> Result<NodeHandle> {
        let k = self.key(handle).ok_or(ContainerError::NotFound)?;
        if self.head == Some(k) {
            return Ok(self.push_front(value));
        }
        Ok(self.insert_before(k, value))
    }

    /// Unlink the node behind `handle` in O(1) and hand its value back.
    pub fn remove(&mut self, handle: NodeHandle) -> Result<T> {
        let k = self.key(handle).ok_or(ContainerError::NotFound)?;
        self.unlink(k)
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.key(handle).is_some()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let k = self.key(handle)?;
        self.slots.get(k).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let k = self.key(handle)?;
        self.slots.get_mut(k).map(|n| &mut n.value)
    }

    pub fn get_at(&self, idx: usize) -> Result<&T> {
        self.iter().nth(idx).ok_or(ContainerError::NotFound)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|k| &self.slots[k].value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.map(|k| &self.slots[k].value)
    }

    /// Values from head to tail; `.rev()` walks tail to head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: &self.slots,
            front: self.head,
            back: self.tail,
            remaining: self.slots.len(),
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    fn handle(&self, key: DefaultKey) -> NodeHandle {
        NodeHandle { list: self.id, key }
    }

    fn key(&self, handle: NodeHandle) -> Option<DefaultKey> {
        let live = handle.list == self.id && self.slots.contains_key(handle.key);
        live.then_some(handle.key)
    }

    // `at` is never the head here.
    fn insert_before(&mut self, at: DefaultKey, value: T) -> NodeHandle {
        let prev = self.slots[at].prev;
        let k = self.slots.insert(Node {
            value,
            prev,
            next: Some(at),
        });
        self.slots[at].prev = Some(k);
        if let Some(p) = prev {
            self.slots[p].next = Some(k);
        }
        self.handle(k)
    }

    fn unlink(&mut self, k: DefaultKey) -> Result<T> {
        let node = self
            .slots
            .remove(k)
            .ok_or(ContainerError::Internal("linked node missing from storage"))?;
        match node.prev {
            Some(p) => self.slots[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.slots[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Ok(node.value)
    }
}

/// Double-ended iterator over `&T`.
pub struct Iter<'a, T> {
    slots: &'a SlotMap<DefaultKey, Node<T>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.get(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.slots.get(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a DList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator; drains from either end.
pub struct IntoIter<T> {
    list: DList<T>,
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

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back().ok()
    }
}

impl<T> IntoIterator for DList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<T> FromIterator<T> for DList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = DList::new();
        for v in iter {
            list.push_back(v);
        }
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for DList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
