use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use alloc::sync::Arc;
use alloc::{boxed::Box, vec::Vec};

use crate::pad::CachePadded;

// # Memory ordering
//
// Three atomic indexes describe the buffer state:
//
// - `write`: next slot the producer writes. Stored only by the producer.
// - `read`: next slot the consumer reads. Stored only by the consumer.
// - `invalidate`: exclusive end of the valid tail once the producer has
//   wrapped to the head of the storage. Stored only by the producer.
//
// Each side loads its own index with Relaxed (nobody else stores it) and
// the other side's with Acquire; every store is Release.
//
// Data visibility follows the usual SPSC chain: the producer fills a
// region, Release-stores `write`, the consumer Acquire-loads `write` and
// reads the region. Reclamation is the mirror image through `read`.
//
// On a wrap the producer stores `invalidate` before `write`. A consumer
// that observes the new `write` therefore also observes the matching
// `invalidate`; pairing a fresh `write` with a stale `invalidate` would
// let the consumer compute a tail region covering uncommitted slots.

#[cfg(feature = "trace")]
macro_rules! trace {
    ($($arg:tt)+) => { log::trace!($($arg)+) };
}

#[cfg(not(feature = "trace"))]
macro_rules! trace {
    ($($arg:tt)+) => {};
}

struct Inner<T> {
    storage: Box<[UnsafeCell<T>]>,
    capacity: usize,
    read: CachePadded<AtomicUsize>,
    write: CachePadded<AtomicUsize>,
    invalidate: CachePadded<AtomicUsize>,
}

// The handles partition all storage access: at any instant a slot belongs
// to the producer's acquired region, the consumer's acquired region, or
// neither, never both.
unsafe impl<T: Send> Send for Inner<T> {}
unsafe impl<T: Send> Sync for Inner<T> {}

impl<T> Inner<T> {
    #[inline]
    fn data_ptr(&self) -> *mut T {
        self.storage.as_ptr() as *mut UnsafeCell<T> as *mut T
    }
}

/// Total free slots for a `(write, read)` snapshot, excluding the sentinel
/// slot that keeps a full buffer distinguishable from an empty one.
#[inline]
fn free_slots(write: usize, read: usize, capacity: usize) -> usize {
    if read > write {
        (read - write) - 1
    } else {
        (capacity - (write - read)) - 1
    }
}

/// Creates a bipartite buffer with `capacity` slots and splits it into its
/// producer and consumer halves.
///
/// One slot is reserved as a sentinel, so at most `capacity - 1` elements
/// are ever buffered at once. Each half is `Send` but not `Sync`: exactly
/// one thread can drive each side, which is what makes the buffer safe
/// without locks.
///
/// # Panics
///
/// Panics if `capacity < 2`.
pub fn bip_buffer<T: Copy + Default>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(capacity >= 2, "capacity must leave room for the sentinel slot");

    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || UnsafeCell::new(T::default()));

    let inner = Arc::new(Inner {
        storage: slots.into_boxed_slice(),
        capacity,
        read: CachePadded::new(AtomicUsize::new(0)),
        write: CachePadded::new(AtomicUsize::new(0)),
        invalidate: CachePadded::new(AtomicUsize::new(0)),
    });

    (
        Producer {
            inner: inner.clone(),
            wrapped: false,
            _not_sync: PhantomData,
        },
        Consumer {
            inner,
            wrapped: false,
            _not_sync: PhantomData,
        },
    )
}

/// Write half of a bipartite buffer.
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
    /// The pending write starts at slot 0 instead of at `write`. Set by
    /// `write_acquire`, consumed by the matching `write_release`. Plain
    /// bool: only the producer thread touches it.
    wrapped: bool,
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<T: Copy> Producer<T> {
    /// Total capacity in slots, including the sentinel slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Free slots right now, across both regions. Advisory: the consumer
    /// can only grow this between the call and the next acquire.
    #[inline]
    pub fn space(&self) -> usize {
        let write = self.inner.write.load(Ordering::Relaxed);
        let read = self.inner.read.load(Ordering::Acquire);
        free_slots(write, read, self.inner.capacity)
    }

    /// Acquires a linear region of exactly `free_required` slots for
    /// writing.
    ///
    /// Returns `None` when no linear region of that size is free right now,
    /// or when `free_required` is zero. The region is exclusively the
    /// producer's until [`write_release`](Self::write_release); fewer slots
    /// than acquired may be written, more may not.
    pub fn write_acquire(&mut self, free_required: usize) -> Option<&mut [T]> {
        if free_required == 0 {
            return None;
        }

        let write = self.inner.write.load(Ordering::Relaxed);
        let read = self.inner.read.load(Ordering::Acquire);

        let free = free_slots(write, read, self.inner.capacity);
        let linear_free = free.min(self.inner.capacity - write);

        trace!(
            "write_acquire: required={} write={} read={} free={} linear_free={}",
            free_required,
            write,
            read,
            free,
            linear_free
        );

        if free_required <= linear_free {
            // Room before the end of the storage.
            // Safety: [write, write + free_required) lies inside the
            // storage and, by the free-space check, outside every slot the
            // consumer can read.
            let ptr = self.inner.data_ptr();
            return Some(unsafe { slice::from_raw_parts_mut(ptr.add(write), free_required) });
        }

        if free_required <= free - linear_free {
            // Not enough room at the end, but the head has it. The slots
            // from `write` to the end become invalidated tail on release.
            self.wrapped = true;
            // Safety: [0, free_required) stays below the read index, which
            // cannot move backwards.
            let ptr = self.inner.data_ptr();
            return Some(unsafe { slice::from_raw_parts_mut(ptr, free_required) });
        }

        None
    }

    /// Publishes `written` slots from the last
    /// [`write_acquire`](Self::write_acquire).
    ///
    /// `written` may be anything from zero up to the acquired length; the
    /// unwritten remainder of the region is handed back untouched.
    pub fn write_release(&mut self, written: usize) {
        let mut write = self.inner.write.load(Ordering::Relaxed);
        let mut invalidate = self.inner.invalidate.load(Ordering::Relaxed);

        trace!(
            "write_release: written={} wrapped={} write={} invalidate={}",
            written,
            self.wrapped,
            write,
            invalidate
        );

        if self.wrapped {
            // The region actually began at slot 0; the old write index
            // freezes as the end of the still-valid tail.
            self.wrapped = false;
            invalidate = write;
            write = 0;
        }

        write += written;

        // A contiguous write moves the valid-data boundary with it.
        if write > invalidate {
            invalidate = write;
        }

        // Exact-end wrap: the write index restarts at 0 while `invalidate`
        // keeps marking the end of the tail for a consumer mid-read.
        if write == self.inner.capacity {
            write = 0;
        }

        debug_assert!(write < self.inner.capacity);

        // `invalidate` first: a consumer that sees the new `write` must
        // also see the matching `invalidate`.
        self.inner.invalidate.store(invalidate, Ordering::Release);
        self.inner.write.store(write, Ordering::Release);
    }

    /// Copies all of `data` into the buffer as one linear region.
    ///
    /// Returns `false` without writing anything when no linear region of
    /// `data.len()` slots is free.
    pub fn write(&mut self, data: &[T]) -> bool {
        if data.is_empty() {
            return true;
        }
        match self.write_acquire(data.len()) {
            Some(region) => {
                region.copy_from_slice(data);
                self.write_release(data.len());
                true
            }
            None => false,
        }
    }
}

/// Read half of a bipartite buffer.
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
    /// The pending read starts at slot 0 instead of at `read`. Set by
    /// `read_acquire`, consumed by the matching `read_release`.
    wrapped: bool,
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<T: Copy> Consumer<T> {
    /// Total capacity in slots, including the sentinel slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Readable slots right now, across both regions. Advisory: the
    /// producer can only grow this between the call and the next acquire.
    #[inline]
    pub fn available(&self) -> usize {
        let write = self.inner.write.load(Ordering::Acquire);
        let invalidate = self.inner.invalidate.load(Ordering::Acquire);
        let read = self.inner.read.load(Ordering::Relaxed);
        if read <= write {
            write - read
        } else {
            (invalidate - read) + write
        }
    }

    /// Whether the buffer currently holds no readable data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let write = self.inner.write.load(Ordering::Acquire);
        let read = self.inner.read.load(Ordering::Relaxed);
        read == write
    }

    /// Acquires the current readable linear region.
    ///
    /// An empty slice means the buffer is empty. Data wrapped across the
    /// end of the storage surfaces as two successive regions: first the
    /// tail up to the invalidate boundary, then the head from slot 0.
    pub fn read_acquire(&mut self) -> &[T] {
        let write = self.inner.write.load(Ordering::Acquire);
        let invalidate = self.inner.invalidate.load(Ordering::Acquire);
        let read = self.inner.read.load(Ordering::Relaxed);

        trace!(
            "read_acquire: read={} write={} invalidate={}",
            read,
            write,
            invalidate
        );

        if read == write {
            return &[];
        }

        let ptr = self.inner.data_ptr();

        if read < write {
            // Contiguous committed data in the middle of the storage.
            // Safety: the Acquire load of `write` makes every slot in
            // [read, write) visible, and the producer will not touch them
            // again before `read` moves past.
            return unsafe { slice::from_raw_parts(ptr.add(read), write - read) };
        }

        if read == invalidate {
            // Tail fully consumed; the next region starts at the head.
            self.wrapped = true;
            // Safety: [0, write) is committed head data.
            return unsafe { slice::from_raw_parts(ptr, write) };
        }

        // Committed tail data below the invalidate boundary.
        // Safety: [read, invalidate) was committed before the producer
        // wrapped; the Acquire load of `write` orders it.
        unsafe { slice::from_raw_parts(ptr.add(read), invalidate - read) }
    }

    /// Retires `read` slots from the last
    /// [`read_acquire`](Self::read_acquire), handing them back to the
    /// producer.
    ///
    /// `read` may be anything from zero up to the acquired length.
    pub fn read_release(&mut self, read: usize) {
        let mut index = self.inner.read.load(Ordering::Relaxed);

        trace!(
            "read_release: read={} wrapped={} index={}",
            read,
            self.wrapped,
            index
        );

        if self.wrapped {
            // The read actually proceeded from slot 0.
            self.wrapped = false;
            index = 0;
        }

        index += read;

        if index == self.inner.capacity {
            index = 0;
        }

        debug_assert!(index < self.inner.capacity);

        self.inner.read.store(index, Ordering::Release);
    }

    /// Copies up to `dst.len()` elements out of the current linear region
    /// and retires them.
    ///
    /// Returns the number of elements copied. Data wrapped across the end
    /// of the storage needs a second call to drain the head region.
    pub fn read_into(&mut self, dst: &mut [T]) -> usize {
        let region = self.read_acquire();
        let count = region.len().min(dst.len());
        dst[..count].copy_from_slice(&region[..count]);
        self.read_release(count);
        count
    }
}
