//! Fixed-capacity slot arena
//!
//! One zeroed allocation of `capacity * entry_size` bytes whose first slot
//! is aligned to [`CACHE_LINE_SIZE`]. The arena never grows or frees
//! individual slots; it only hands out raw slot pointers; synchronizing
//! access to them is the owner's job.

use super::error::{LoggerError, Result};
use super::record::CACHE_LINE_SIZE;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

pub struct SlotArena {
    base: NonNull<u8>,
    layout: Layout,
    entry_size: usize,
    capacity: usize,
}

impl SlotArena {
    pub fn new(entry_size: usize, capacity: usize) -> Result<Self> {
        let bytes = entry_size
            .checked_mul(capacity)
            .filter(|&bytes| bytes > 0)
            .ok_or_else(|| LoggerError::arena_allocation(usize::MAX, CACHE_LINE_SIZE))?;

        let layout = Layout::from_size_align(bytes, CACHE_LINE_SIZE)
            .map_err(|_| LoggerError::arena_allocation(bytes, CACHE_LINE_SIZE))?;

        // SAFETY: layout has a non-zero size (checked above).
        let raw = unsafe { alloc_zeroed(layout) };
        let base =
            NonNull::new(raw).ok_or_else(|| LoggerError::arena_allocation(bytes, CACHE_LINE_SIZE))?;

        if base.as_ptr() as usize % CACHE_LINE_SIZE != 0 {
            // SAFETY: allocated above with this exact layout.
            unsafe { dealloc(base.as_ptr(), layout) };
            return Err(LoggerError::arena_allocation(bytes, CACHE_LINE_SIZE));
        }

        Ok(Self {
            base,
            layout,
            entry_size,
            capacity,
        })
    }

    #[inline]
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the first byte of slot `index`.
    ///
    /// # Panics
    /// Panics in debug builds if `index >= capacity`.
    #[inline]
    pub fn slot_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.capacity);
        // SAFETY: index < capacity keeps the offset inside the allocation.
        unsafe { self.base.as_ptr().add(index * self.entry_size) }
    }
}

impl Drop for SlotArena {
    fn drop(&mut self) {
        // SAFETY: base was allocated in `new` with `self.layout`.
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
    }
}

impl std::fmt::Debug for SlotArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotArena")
            .field("entry_size", &self.entry_size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_slot_is_cache_aligned() {
        let arena = SlotArena::new(256, 16).unwrap();
        assert_eq!(arena.slot_ptr(0) as usize % CACHE_LINE_SIZE, 0);
        assert_eq!(arena.slot_ptr(1) as usize - arena.slot_ptr(0) as usize, 256);
    }

    #[test]
    fn test_arena_starts_zeroed() {
        let arena = SlotArena::new(32, 4).unwrap();
        let last = arena.slot_ptr(3);
        let bytes = unsafe { std::slice::from_raw_parts(last, 32) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_sized_arena_is_rejected() {
        assert!(matches!(
            SlotArena::new(256, 0),
            Err(LoggerError::ArenaAllocation { .. })
        ));
    }

    #[test]
    fn test_overflowing_size_is_rejected() {
        assert!(SlotArena::new(usize::MAX, 2).is_err());
    }
}
