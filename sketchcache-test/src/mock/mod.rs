//! Mock implementations for testing
//!
//! Instrumented stand-ins for the collaborators a cache is constructed with.

mod allocator;
mod builder;

pub use allocator::TrackingAllocator;
pub use builder::CountingBuilder;
