//! Scratch memory for the normalizer
//!
//! - Pool: per-thread reusable buffers, returned on drop
//! - Scratch: stack buffer for small requests, pooled buffer above the threshold
//! - Tracking: counting global allocator (feature `memory_tracking`)

pub mod pool;
pub mod scratch;
#[cfg(feature = "memory_tracking")]
pub mod tracking;
