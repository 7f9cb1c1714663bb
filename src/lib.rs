//! Segregated-fits memory allocator for embedded systems
//!
//! This crate provides a single type called [`Allocator`]. This type
//! implements the [`core::alloc::GlobalAlloc`]-trait, which is required to
//! use the [`alloc`-crate][alloc] on `#![no_std]`-targets.
//!
//! Unlike a simple linear-scan allocator, the engine behind [`Allocator`]
//! keeps `NUM_FREE_LISTS` segregated, size-class-indexed free lists plus a
//! bank of per-exact-size quick lists for recently-freed small blocks, and
//! coalesces adjacent free blocks via boundary tags. This keeps allocation
//! and release close to O(1) for the hot path (an exact quick-list hit) and
//! O(free lists) in the worst case, instead of O(all blocks).
//!
//! # Usage
//! The usage is simple: just copy and paste the following code snipped into
//! your binary crate and adjust the number of bytes of the heap (here 64K):
//! ```no_run
//! #[global_allocator]
//! static ALLOCATOR: segfit::Allocator<65536> = segfit::Allocator::new();
//!
//! extern crate alloc;
//! ```
//! Afterwards you don't need to interact with the crate or the variable
//! `ALLOCATOR` anymore. Now you can just `use alloc::vec::Vec` or even
//! `use alloc::collections::BTreeMap`, i.e. every collection normally
//! provided by `std`.
//!
//! The heap grows in fixed-size pages as needed, up to `N` bytes; `N` must be
//! a multiple of the page size (4096) and at least one page. This plays the
//! role of "the maximum heap size fixed by the underlying grow primitive":
//! exhausting it is this crate's `ENOMEM` condition, surfaced through
//! [`Allocator::status`] rather than as a panic.
//!
//! [alloc]: https://doc.rust-lang.org/alloc/index.html
#![no_std]

mod block;
mod buffer;
mod engine;
mod free_list;

#[cfg(feature = "harness")]
pub mod harness;

mod pages;
mod quick_list;
mod status;

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};

use spin::Mutex;

use engine::Engine;
pub use status::Status;

/// The memory allocator: a segregated-fits engine with quick-list caching,
/// behind a `spin::Mutex` so that the `static` required by
/// `#[global_allocator]` can be `Sync`.
///
/// The mutex is a structural requirement of [`GlobalAlloc::alloc`] and
/// [`GlobalAlloc::dealloc`] taking `&self`, not a concurrency feature: the
/// engine itself assumes a single logical owner operating in strict program
/// order (see the crate-level docs), and nothing in it is designed to scale
/// across threads. It merely does not corrupt itself if called from more
/// than one.
///
/// Its usage is simple: just copy and paste the following in the binary
/// crate you're developing. The memory size of the heap is `65536` or 64K in
/// this example, and must be a multiple of the page size (4096).
/// ```no_run
/// #[global_allocator]
/// static ALLOCATOR: segfit::Allocator<65536> = segfit::Allocator::new();
/// ```
pub struct Allocator<const N: usize> {
    pub(crate) engine: Mutex<Engine<N>>,
}

impl<const N: usize> Allocator<N> {
    /// Create a new [`Allocator`].
    ///
    /// This function is a `const fn`, therefore you can call it directly
    /// when creating the allocator as a `static`.
    ///
    /// # Panics
    /// This function will panic if `N` is not a multiple of the page size
    /// (4096), or is smaller than one page.
    #[must_use = "assign the allocator to a static variable and apply the `#[global_allocator]`-attribute to make it the global allocator"]
    pub const fn new() -> Self {
        Self {
            engine: Mutex::new(Engine::new()),
        }
    }

    /// Read the process-wide errno-style status variable.
    ///
    /// Set to [`Status::NoMem`] on allocation exhaustion and
    /// [`Status::InvalidArgument`] on an invalid `resize`/`aligned_allocate`
    /// argument. Never cleared back to [`Status::Ok`] automatically.
    pub fn status(&self) -> Status {
        self.engine.lock().status()
    }
}

impl<const N: usize> Default for Allocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: `alloc`/`dealloc`/`realloc` only touch the engine behind the
// mutex; nothing here is re-entrant or relies on thread-local state.
unsafe impl<const N: usize> GlobalAlloc for Allocator<N> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let mut engine = self.engine.lock();
        let result = if layout.align() <= block::WORD {
            engine.allocate(layout.size())
        } else {
            engine.aligned_allocate(layout.size(), layout.align())
        };
        result.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };
        self.engine.lock().release(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let Some(nn) = NonNull::new(ptr) else {
            return ptr::null_mut();
        };

        if layout.align() <= block::WORD {
            return self
                .engine
                .lock()
                .resize(nn, new_size)
                .map_or(ptr::null_mut(), NonNull::as_ptr);
        }

        // `resize` only preserves 8-byte alignment, so an over-aligned
        // layout falls back to the default alloc + copy + dealloc sequence.
        let Ok(new_layout) = Layout::from_size_align(new_size, layout.align()) else {
            return ptr::null_mut();
        };
        let new_ptr = self.alloc(new_layout);
        if !new_ptr.is_null() {
            let copy_size = layout.size().min(new_size);
            ptr::copy_nonoverlapping(ptr, new_ptr, copy_size);
            self.dealloc(ptr, layout);
        }
        new_ptr
    }
}
