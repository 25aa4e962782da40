//! Counting allocator for profiling.
//!
//! The library never installs it; a binary or benchmark opts in with
//! `#[global_allocator] static A: TrackingAllocator = TrackingAllocator;`.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::atomic::{AtomicUsize, Ordering};

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

pub struct TrackingAllocator;

#[cfg(feature = "mimalloc")]
static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(not(feature = "mimalloc"))]
static UNDERLYING: std::alloc::System = std::alloc::System;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = UNDERLYING.alloc(layout);
        if !ptr.is_null() {
            let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
            PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
        UNDERLYING.dealloc(ptr, layout)
    }
}

/// Bytes currently allocated through the tracking allocator
pub fn allocated() -> usize {
    ALLOCATED.load(Ordering::SeqCst)
}

pub fn peak_allocated() -> usize {
    PEAK_ALLOCATED.load(Ordering::SeqCst)
}

/// Reset the peak to the current level, returning (current, previous peak)
pub fn reset_stats() -> (usize, usize) {
    let current = ALLOCATED.load(Ordering::SeqCst);
    let peak = PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}
