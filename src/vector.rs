//! Vector: amortized-growth sequence with an optional capacity lock.
//!
//! Capacity is tracked logically: an unlocked vector starts at
//! `VECTOR_DEFAULT_CAPACITY`, doubles when a push finds it full and halves
//! when a removal leaves it at most half full (never below the start
//! capacity). A locked vector never resizes; pushing into a full locked
//! vector fails with `ContainerAtCapacity`.

use crate::comparator::compare;
use crate::error::{ContainerError, Result};
use crate::type_tag::Element;
use tracing::trace;

pub const VECTOR_DEFAULT_CAPACITY: usize = 4;

#[derive(Debug, Clone)]
pub struct Vector<T> {
    data: Vec<T>,
    capacity: usize,
    locked: bool,
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Vector<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            capacity: VECTOR_DEFAULT_CAPACITY,
            locked: false,
        }
    }

    /// A vector that never grows or shrinks on its own.
    pub fn with_locked_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ContainerError::InvalidArgument("locked capacity must be non-zero"));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self {
            data,
            capacity,
            locked: true,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_capacity_locked(&self) -> bool {
        self.locked
    }

    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.make_room()?;
        self.data.push(value);
        Ok(())
    }

    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.make_room()?;
        self.data.insert(0, value);
        Ok(())
    }

    pub fn pop_back(&mut self) -> Result<T> {
        let v = self.data.pop().ok_or(ContainerError::ContainerEmpty)?;
        self.maybe_shrink();
        Ok(v)
    }

    pub fn pop_front(&mut self) -> Result<T> {
        if self.data.is_empty() {
            return Err(ContainerError::ContainerEmpty);
        }
        let v = self.data.remove(0);
        self.maybe_shrink();
        Ok(v)
    }

    /// Insert at `idx`, shifting later elements right. An index past the end
    /// appends.
    pub fn insert(&mut self, idx: usize, value: T) -> Result<()> {
        self.make_room()?;
        let idx = idx.min(self.data.len());
        self.data.insert(idx, value);
        Ok(())
    }

    pub fn remove_at(&mut self, idx: usize) -> Result<T> {
        if idx >= self.data.len() {
            return Err(ContainerError::NotFound);
        }
        let v = self.data.remove(idx);
        self.maybe_shrink();
        Ok(v)
    }

    pub fn get(&self, idx: usize) -> Result<&T> {
        self.data.get(idx).ok_or(ContainerError::NotFound)
    }

    pub fn get_mut(&mut self, idx: usize) -> Result<&mut T> {
        self.data.get_mut(idx).ok_or(ContainerError::NotFound)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
        if !self.locked && self.capacity > VECTOR_DEFAULT_CAPACITY {
            self.capacity = VECTOR_DEFAULT_CAPACITY;
            self.data.shrink_to(VECTOR_DEFAULT_CAPACITY);
        }
    }

    fn make_room(&mut self) -> Result<()> {
        let len = self.data.len();
        if len == self.capacity {
            if self.locked {
                return Err(ContainerError::ContainerAtCapacity);
            }
            let new_cap = self
                .capacity
                .checked_mul(2)
                .ok_or(ContainerError::ContainerAtCapacity)?;
            self.data.try_reserve_exact(new_cap - len)?;
            trace!(old = self.capacity, new = new_cap, "vector grow");
            self.capacity = new_cap;
        } else if self.data.capacity() == len {
            self.data.try_reserve_exact(self.capacity - len)?;
        }
        Ok(())
    }

    fn maybe_shrink(&mut self) {
        if self.locked {
            return;
        }
        let new_cap = self.capacity / 2;
        if new_cap >= VECTOR_DEFAULT_CAPACITY && self.data.len() <= new_cap {
            trace!(old = self.capacity, new = new_cap, "vector shrink");
            self.data.shrink_to(new_cap);
            self.capacity = new_cap;
        }
    }
}

impl<T: Element> Vector<T> {
    /// Index of the first element comparing equal to `value`.
    pub fn find(&self, value: &T) -> Result<usize> {
        for (i, v) in self.data.iter().enumerate() {
            if compare(v, value)? == 0 {
                return Ok(i);
            }
        }
        Err(ContainerError::NotFound)
    }

    /// Remove the first element comparing equal to `value`.
    pub fn remove_value(&mut self, value: &T) -> Result<T> {
        let idx = self.find(value)?;
        self.remove_at(idx)
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
