//! Accelerator resources injected into the caches
//!
//! The accelerator is reached only through two handles: a [`DeviceAllocator`]
//! that hands out device memory reservations, and an [`ExecutionStream`] that
//! orders the work issued against that memory. Both are passed explicitly to
//! every operation that needs them so callers control pooling and scheduling.
//!
//! The implementations here emulate device memory in host RAM. Work enqueued
//! on an emulated stream runs at enqueue time under the stream's lock, so
//! work issued from several threads still takes effect in issue order.

pub mod allocator;
pub mod stream;

pub use allocator::{DeviceAllocation, DeviceAllocator, PoolAllocator};
pub use stream::ExecutionStream;
