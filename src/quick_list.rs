//! Quick-list cache: `NUM_QUICK_LISTS` singly-linked LIFO caches for
//! recently-released blocks of a single exact size, each capped at
//! [`QUICK_LIST_MAX`] entries.

use crate::block::{self, BlockOffset, MIN_BLOCK_SIZE, NUM_QUICK_LISTS, QUICK_LIST_MAX, WORD};
use crate::buffer::Buffer;

/// Sentinel "no next block" value for the quick-list's singly-linked next
/// pointer. No valid block offset can ever equal it.
const NIL: u64 = u64::MAX;

#[derive(Clone, Copy)]
struct QuickListHead {
    first: Option<BlockOffset>,
    length: usize,
}

/// The fixed array of quick lists. List `i` holds blocks of exactly
/// `MIN_BLOCK_SIZE + i * WORD` bytes.
pub(crate) struct QuickLists {
    heads: [QuickListHead; NUM_QUICK_LISTS],
}

impl QuickLists {
    pub(crate) const fn new() -> Self {
        Self {
            heads: [QuickListHead {
                first: None,
                length: 0,
            }; NUM_QUICK_LISTS],
        }
    }

    pub(crate) const fn size_for_index(index: usize) -> usize {
        MIN_BLOCK_SIZE + index * WORD
    }

    /// The quick-list index for an exact block size, if any.
    pub(crate) fn index_for_size(size: usize) -> Option<usize> {
        if size < MIN_BLOCK_SIZE {
            return None;
        }
        let delta = size - MIN_BLOCK_SIZE;
        if delta % WORD != 0 {
            return None;
        }
        let index = delta / WORD;
        if index < NUM_QUICK_LISTS {
            Some(index)
        } else {
            None
        }
    }

    pub(crate) fn len(&self, index: usize) -> usize {
        self.heads[index].length
    }

    pub(crate) fn is_full(&self, index: usize) -> bool {
        self.heads[index].length >= QUICK_LIST_MAX
    }

    pub(crate) fn first(&self, index: usize) -> Option<BlockOffset> {
        self.heads[index].first
    }

    /// Push `off` to the front of quick-list `index`. The caller is
    /// responsible for having already flushed the list if it was full.
    pub(crate) fn push_front<const N: usize>(
        &mut self,
        buffer: &mut Buffer<N>,
        index: usize,
        off: BlockOffset,
    ) {
        let header = buffer.header(off);
        let size = block::size_of_header(header);
        let prev_allocated = block::is_prev_allocated(header);
        buffer.set_header(off, block::make_header(size, true, prev_allocated, true));

        let next_raw = match self.heads[index].first {
            Some(existing) => existing.get() as u64,
            None => NIL,
        };
        buffer.set_quick_link_next(off, next_raw);

        self.heads[index].first = Some(off);
        self.heads[index].length += 1;
    }

    /// Pop the head of quick-list `index`, marking it allocated. `None` if
    /// the list is empty.
    pub(crate) fn pop_front<const N: usize>(
        &mut self,
        buffer: &mut Buffer<N>,
        index: usize,
    ) -> Option<BlockOffset> {
        let off = self.heads[index].first?;
        let next_raw = buffer.quick_link_next(off);
        self.heads[index].first = if next_raw == NIL {
            None
        } else {
            Some(BlockOffset::new(next_raw as usize))
        };
        self.heads[index].length -= 1;

        let header = buffer.header(off);
        let size = block::size_of_header(header);
        let prev_allocated = block::is_prev_allocated(header);
        buffer.set_header(off, block::make_header(size, true, prev_allocated, false));
        Some(off)
    }

    /// Empty quick-list `index`, returning the offsets it held in
    /// most-to-least-recently-freed order so the caller can fold them back
    /// into the main free list.
    pub(crate) fn flush<const N: usize>(
        &mut self,
        buffer: &Buffer<N>,
        index: usize,
    ) -> ([Option<BlockOffset>; QUICK_LIST_MAX], usize) {
        let mut out = [None; QUICK_LIST_MAX];
        let mut count = 0;
        let mut cur = self.heads[index].first;
        while let Some(off) = cur {
            out[count] = Some(off);
            count += 1;
            let next_raw = buffer.quick_link_next(off);
            cur = if next_raw == NIL {
                None
            } else {
                Some(BlockOffset::new(next_raw as usize))
            };
        }
        self.heads[index].first = None;
        self.heads[index].length = 0;
        (out, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_for_index_is_the_inverse_of_index_for_size() {
        for index in 0..NUM_QUICK_LISTS {
            let size = QuickLists::size_for_index(index);
            assert_eq!(QuickLists::index_for_size(size), Some(index));
        }
    }

    #[test]
    fn index_for_size_matches_spacing() {
        assert_eq!(QuickLists::index_for_size(32), Some(0));
        assert_eq!(QuickLists::index_for_size(40), Some(1));
        assert_eq!(QuickLists::index_for_size(36), None);
        assert_eq!(QuickLists::index_for_size(16), None);
        assert_eq!(
            QuickLists::index_for_size(MIN_BLOCK_SIZE + (NUM_QUICK_LISTS - 1) * WORD),
            Some(NUM_QUICK_LISTS - 1)
        );
        assert_eq!(
            QuickLists::index_for_size(MIN_BLOCK_SIZE + NUM_QUICK_LISTS * WORD),
            None
        );
    }

    #[test]
    fn push_then_pop_is_lifo() {
        let mut buffer = Buffer::<256>::new();
        let mut lists = QuickLists::new();
        let index = QuickLists::index_for_size(40).unwrap();

        let a = BlockOffset::new(0);
        let b = BlockOffset::new(40);
        buffer.set_header(a, block::make_header(40, false, true, false));
        buffer.set_header(b, block::make_header(40, false, true, false));

        lists.push_front(&mut buffer, index, a);
        lists.push_front(&mut buffer, index, b);
        assert_eq!(lists.len(index), 2);

        assert_eq!(lists.pop_front(&mut buffer, index), Some(b));
        assert_eq!(lists.pop_front(&mut buffer, index), Some(a));
        assert_eq!(lists.pop_front(&mut buffer, index), None);
    }

    #[test]
    fn flush_drains_in_lifo_order_and_resets_length() {
        let mut buffer = Buffer::<256>::new();
        let mut lists = QuickLists::new();
        let index = QuickLists::index_for_size(32).unwrap();

        let offsets: [BlockOffset; QUICK_LIST_MAX] = core::array::from_fn(|i| BlockOffset::new(i * 32));
        for off in offsets {
            buffer.set_header(off, block::make_header(32, false, true, false));
            lists.push_front(&mut buffer, index, off);
        }
        assert!(lists.is_full(index));

        let (flushed, count) = lists.flush(&buffer, index);
        assert_eq!(count, QUICK_LIST_MAX);
        assert_eq!(flushed[0], offsets.last().copied());
        assert_eq!(lists.len(index), 0);
        assert_eq!(lists.first(index), None);
    }
}
