//! Cache-line padding for the atomic indexes.
//!
//! With the `multicore` feature each index lives on its own cache line via
//! `crossbeam_utils::CachePadded`, which knows the line size of the target
//! architecture. Without the feature the wrapper is transparent, so the
//! indexes pack tightly the way uniprocessor targets want them to.

#[cfg(feature = "multicore")]
pub(crate) use crossbeam_utils::CachePadded;

#[cfg(not(feature = "multicore"))]
#[derive(Debug, Default)]
#[repr(transparent)]
pub(crate) struct CachePadded<T> {
    value: T,
}

#[cfg(not(feature = "multicore"))]
impl<T> CachePadded<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self { value }
    }
}

#[cfg(not(feature = "multicore"))]
impl<T> core::ops::Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
