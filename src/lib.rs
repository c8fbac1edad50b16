//! A lock-free bipartite buffer for single-producer single-consumer use.
//!
//! A bipartite buffer is a ring buffer that hands out *linear* regions of
//! its storage instead of element-at-a-time access: the producer acquires
//! a contiguous mutable slice, fills it and releases it; the consumer
//! acquires a contiguous shared slice, drains it and releases it. Bulk
//! operations (`memcpy`, DMA transfers, I/O syscalls, SIMD kernels) can
//! therefore run directly against the buffer's storage.
//!
//! ```
//! let (mut producer, mut consumer) = bipbuf::bip_buffer::<u8>(64);
//!
//! let region = producer.write_acquire(4).unwrap();
//! region.copy_from_slice(b"ping");
//! producer.write_release(4);
//!
//! let data = consumer.read_acquire();
//! assert_eq!(data, &b"ping"[..]);
//! let len = data.len();
//! consumer.read_release(len);
//! ```
//!
//! The two halves may live on different threads; the only synchronization
//! is three atomic indexes. Operations never block and are wait-free: a
//! full buffer returns `None` from [`Producer::write_acquire`], an empty
//! one returns an empty slice from [`Consumer::read_acquire`], and the
//! caller decides how to retry or back off.
//!
//! # Features
//!
//! - `multicore`: pad each atomic index to its own cache line
//!   (`crossbeam_utils::CachePadded`) to avoid false sharing between the
//!   producer and consumer cores. Layout only, no effect on semantics.
//! - `trace`: emit a `log::trace!` record for every acquire and release.
//!   Disabled, the hooks compile to nothing.

#![no_std]

extern crate alloc;

mod bip_buffer;
mod pad;

pub use bip_buffer::{bip_buffer, Consumer, Producer};
