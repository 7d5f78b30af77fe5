//! handles.rs
//! Generational handle table backing the opaque-handle API.
//!
//! Notes:
//! - A `Handle` packs `(generation << 32) | (index + 1)`, so the all-zero value is never
//!   issued and doubles as the null handle.
//! - Freeing bumps the slot generation; stale copies of a freed handle then miss the
//!   lookup and report `UseAfterFree` without touching the recycled slot's contents.
//! - Sessions are owned by the table between insert and remove (exactly-once free).

use std::fmt;

use crate::types::{PrimitiveError, Result};

/// Opaque session identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Handle(u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    /// Wrap a raw value received from a binding layer.
    pub const fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    fn new(index: u32, generation: u32) -> Self {
        Handle(((generation as u64) << 32) | (index as u64 + 1))
    }

    fn index(self) -> Option<usize> {
        let low = (self.0 & 0xffff_ffff) as usize;
        low.checked_sub(1)
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(0x{:016x})", self.0)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot map owning sessions of one kind.
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new(), len: 0 }
    }

    /// Take ownership of `value` and issue a fresh handle for it.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(value) });
        Handle::new(index, 0)
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.slot(handle)
            .and_then(|slot| slot.value.as_ref())
            .ok_or(PrimitiveError::UseAfterFree { handle: handle.as_raw() })
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
        let index = Self::live_index(&self.slots, handle);
        index
            .and_then(|i| self.slots[i].value.as_mut())
            .ok_or(PrimitiveError::UseAfterFree { handle: handle.as_raw() })
    }

    /// Release the session behind `handle`. Null and stale handles return `None`.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let index = Self::live_index(&self.slots, handle)?;
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        let index = Self::live_index(&self.slots, handle)?;
        self.slots.get(index)
    }

    fn live_index(slots: &[Slot<T>], handle: Handle) -> Option<usize> {
        let index = handle.index()?;
        let slot = slots.get(index)?;
        (slot.generation == handle.generation()).then_some(index)
    }
}
