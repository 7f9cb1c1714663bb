//! Inspection surface for an external test harness, gated behind the
//! `harness` feature so that ordinary downstream consumers never see it.
//!
//! The specification requires a harness to be able to walk free-list heads,
//! quick-list heads, and block headers directly. Rather than exposing the
//! engine's internal types (which are tied to the lifetime of a locked
//! mutex guard), this module exposes plain data: per-class lengths and a
//! visitor over every block from the first in-heap block to the epilogue.

use crate::block::{NUM_FREE_LISTS, NUM_QUICK_LISTS};
use crate::Allocator;

/// One block's header, as seen by the harness: its offset and size, and the
/// three flag bits from the specification's header encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of this block's header from the start of the heap.
    pub offset: usize,
    /// This block's total size, header included.
    pub size: usize,
    /// `THIS_ALLOCATED`: this block is allocated (or quick-listed).
    pub this_allocated: bool,
    /// `PREV_ALLOCATED`: the physically preceding block is allocated.
    pub prev_allocated: bool,
    /// `IN_QUICK_LIST`: this block sits in a quick list.
    pub in_quick_list: bool,
}

impl<const N: usize> Allocator<N> {
    /// Visit every block between the prologue and the epilogue, in physical
    /// order. Calls `f` with nothing if the heap has never been grown.
    pub fn visit_blocks(&self, mut f: impl FnMut(BlockInfo)) {
        let engine = self.engine.lock();
        for info in engine.iter_blocks() {
            f(BlockInfo {
                offset: info.offset,
                size: info.size,
                this_allocated: info.this_allocated,
                prev_allocated: info.prev_allocated,
                in_quick_list: info.in_quick_list,
            });
        }
    }

    /// The number of blocks currently held in each segregated free list,
    /// indexed the same way as [the specification's `free_list_heads`].
    pub fn free_list_lengths(&self) -> [usize; NUM_FREE_LISTS] {
        let engine = self.engine.lock();
        core::array::from_fn(|i| engine.free_list_length(i))
    }

    /// The number of blocks currently cached in each quick list.
    pub fn quick_list_lengths(&self) -> [usize; NUM_QUICK_LISTS] {
        let engine = self.engine.lock();
        core::array::from_fn(|i| engine.quick_list_length(i))
    }
}
