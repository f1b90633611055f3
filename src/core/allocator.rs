use crate::error::PhysicsError;
use crate::Result;
use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Source of transient per-step memory.
///
/// The world reserves byte budgets through this trait before it builds any
/// scratch buffer and gives them back when the buffer is dropped.
pub trait StepAllocator {
    /// Reserves `bytes`, failing with [`PhysicsError::AllocationFailed`] when exhausted
    fn acquire(&self, bytes: usize) -> Result<()>;

    /// Returns bytes previously acquired
    fn release(&self, bytes: usize);

    /// Bytes currently reserved
    fn bytes_in_use(&self) -> usize;

    /// Highest value `bytes_in_use` has reached
    fn peak_bytes(&self) -> usize;
}

/// Unbounded allocator backed by the global heap
#[derive(Debug, Default)]
pub struct HeapAllocator {
    in_use: Cell<usize>,
    peak: Cell<usize>,
}

impl HeapAllocator {
    /// Creates a new heap allocator
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepAllocator for HeapAllocator {
    fn acquire(&self, bytes: usize) -> Result<()> {
        let in_use = self.in_use.get() + bytes;
        self.in_use.set(in_use);
        self.peak.set(self.peak.get().max(in_use));
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.in_use.set(self.in_use.get().saturating_sub(bytes));
    }

    fn bytes_in_use(&self) -> usize {
        self.in_use.get()
    }

    fn peak_bytes(&self) -> usize {
        self.peak.get()
    }
}

/// Allocator with a fixed byte budget
#[derive(Debug)]
pub struct BoundedAllocator {
    capacity: usize,
    in_use: Cell<usize>,
    peak: Cell<usize>,
}

impl BoundedAllocator {
    /// Creates an allocator that refuses to hand out more than `capacity` bytes at once
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: Cell::new(0),
            peak: Cell::new(0),
        }
    }

    /// Returns the byte budget
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl StepAllocator for BoundedAllocator {
    fn acquire(&self, bytes: usize) -> Result<()> {
        let available = self.capacity - self.in_use.get();
        if bytes > available {
            return Err(PhysicsError::AllocationFailed {
                requested: bytes,
                available,
            });
        }
        let in_use = self.in_use.get() + bytes;
        self.in_use.set(in_use);
        self.peak.set(self.peak.get().max(in_use));
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.in_use.set(self.in_use.get().saturating_sub(bytes));
    }

    fn bytes_in_use(&self) -> usize {
        self.in_use.get()
    }

    fn peak_bytes(&self) -> usize {
        self.peak.get()
    }
}

#[inline]
fn bytes_for<T>(count: usize) -> usize {
    count.saturating_mul(std::mem::size_of::<T>())
}

/// A vector whose reservation is accounted against a [`StepAllocator`] and
/// released when the buffer is dropped
pub struct ScopedBuffer<'a, T> {
    data: Vec<T>,
    reserved: usize,
    allocator: &'a dyn StepAllocator,
}

impl<'a, T> ScopedBuffer<'a, T> {
    /// Reserves room for `capacity` elements
    pub fn with_capacity(allocator: &'a dyn StepAllocator, capacity: usize) -> Result<Self> {
        allocator.acquire(bytes_for::<T>(capacity))?;
        Ok(Self {
            data: Vec::with_capacity(capacity),
            reserved: capacity,
            allocator,
        })
    }

    /// Appends an element, reserving more room from the allocator if needed
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.data.len() == self.reserved {
            let grow = self.reserved.max(4);
            self.allocator.acquire(bytes_for::<T>(grow))?;
            self.reserved += grow;
            self.data.reserve_exact(self.reserved - self.data.len());
        }
        self.data.push(value);
        Ok(())
    }

    /// Number of elements the buffer can hold without another acquire
    pub fn capacity(&self) -> usize {
        self.reserved
    }
}

impl<'a, T: Clone> ScopedBuffer<'a, T> {
    /// Reserves `len` elements and fills them with `value`
    pub fn filled(allocator: &'a dyn StepAllocator, len: usize, value: T) -> Result<Self> {
        let mut buffer = Self::with_capacity(allocator, len)?;
        buffer.data.resize(len, value);
        Ok(buffer)
    }
}

impl<T> Deref for ScopedBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for ScopedBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for ScopedBuffer<'_, T> {
    fn drop(&mut self) {
        self.allocator.release(bytes_for::<T>(self.reserved));
    }
}

impl<T: fmt::Debug> fmt::Debug for ScopedBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBuffer")
            .field("data", &self.data)
            .field("reserved", &self.reserved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_buffer_releases_on_drop() {
        let allocator = HeapAllocator::new();
        {
            let mut buffer: ScopedBuffer<'_, u64> = ScopedBuffer::with_capacity(&allocator, 8).unwrap();
            buffer.push(1).unwrap();
            assert_eq!(allocator.bytes_in_use(), 64);
        }
        assert_eq!(allocator.bytes_in_use(), 0);
        assert_eq!(allocator.peak_bytes(), 64);
    }

    #[test]
    fn test_scoped_buffer_grows_through_allocator() {
        let allocator = HeapAllocator::new();
        let mut buffer: ScopedBuffer<'_, u32> = ScopedBuffer::with_capacity(&allocator, 0).unwrap();
        for i in 0..10 {
            buffer.push(i).unwrap();
        }
        assert_eq!(buffer.len(), 10);
        assert_eq!(allocator.bytes_in_use(), buffer.capacity() * 4);
        drop(buffer);
        assert_eq!(allocator.bytes_in_use(), 0);
    }

    #[test]
    fn test_bounded_allocator_fails_when_exhausted() {
        let allocator = BoundedAllocator::new(32);
        let first: ScopedBuffer<'_, u64> = ScopedBuffer::with_capacity(&allocator, 3).unwrap();
        let second: Result<ScopedBuffer<'_, u64>> = ScopedBuffer::with_capacity(&allocator, 2);
        assert_eq!(
            second.err(),
            Some(PhysicsError::AllocationFailed { requested: 16, available: 8 })
        );
        drop(first);
        assert_eq!(allocator.bytes_in_use(), 0);
    }

    #[test]
    fn test_bounded_push_failure_keeps_contents() {
        let allocator = BoundedAllocator::new(16);
        let mut buffer: ScopedBuffer<'_, u32> = ScopedBuffer::with_capacity(&allocator, 4).unwrap();
        for i in 0..4 {
            buffer.push(i).unwrap();
        }
        assert!(buffer.push(4).is_err());
        assert_eq!(&buffer[..], &[0, 1, 2, 3]);
    }
}
