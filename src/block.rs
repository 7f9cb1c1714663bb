//! Block layout: header/footer bit encoding and the sizes used throughout the
//! engine.
//!
//! A block is a contiguous, 8-byte-aligned span of the heap buffer. Its first
//! word is the header; when the block is free and not cached in a quick list,
//! its last word is a footer that is a verbatim copy of the header (the
//! boundary tag used for O(1) backward coalescing).

/// Width of a header, footer or link word.
pub(crate) const WORD: usize = 8;

/// Smallest legal block size, in bytes (header included).
pub(crate) const MIN_BLOCK_SIZE: usize = 32;

/// Bytes requested from the page-grow primitive per call to `grow_page`.
pub(crate) const PAGE_SZ: usize = 4096;

/// Number of segregated size-class free lists.
pub(crate) const NUM_FREE_LISTS: usize = 10;

/// Number of exact-size quick lists.
pub(crate) const NUM_QUICK_LISTS: usize = 20;

/// Blocks held in a single quick list before it is flushed.
pub(crate) const QUICK_LIST_MAX: usize = 5;

/// This block is allocated (or cached in a quick list, which poses as
/// allocated for coalescing purposes).
pub(crate) const THIS_ALLOCATED: u64 = 0b001;
/// The physically preceding block is allocated.
pub(crate) const PREV_ALLOCATED: u64 = 0b010;
/// This block sits in a quick list.
pub(crate) const IN_QUICK_LIST: u64 = 0b100;

const SIZE_MASK: u64 = !0b111;

/// A validated byte offset of a block header inside the heap buffer.
///
/// This plays the role a raw pointer would play in a pointer-based
/// implementation, but stays a plain integer so that it never aliases a
/// `&mut` reference into the buffer and can be freely copied into link words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockOffset(usize);
impl BlockOffset {
    pub(crate) const fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// Extract the size field (low 3 bits masked out) from a raw header word.
pub(crate) const fn size_of_header(header: u64) -> usize {
    (header & SIZE_MASK) as usize
}

pub(crate) const fn is_this_allocated(header: u64) -> bool {
    header & THIS_ALLOCATED != 0
}

pub(crate) const fn is_prev_allocated(header: u64) -> bool {
    header & PREV_ALLOCATED != 0
}

pub(crate) const fn is_in_quick_list(header: u64) -> bool {
    header & IN_QUICK_LIST != 0
}

/// Build a header (or footer) word from a size and the three flag bits.
pub(crate) const fn make_header(
    size: usize,
    this_allocated: bool,
    prev_allocated: bool,
    in_quick_list: bool,
) -> u64 {
    let mut header = (size as u64) & SIZE_MASK;
    if this_allocated {
        header |= THIS_ALLOCATED;
    }
    if prev_allocated {
        header |= PREV_ALLOCATED;
    }
    if in_quick_list {
        header |= IN_QUICK_LIST;
    }
    header
}

/// Round `n` up to the next multiple of `multiple` (`multiple` a power of two).
pub(crate) const fn round_up(n: usize, multiple: usize) -> usize {
    (n + multiple - 1) / multiple * multiple
}

/// The adjusted block size for a client request of `requested` bytes: a
/// header plus the payload, rounded up to a multiple of 8, floored at
/// [`MIN_BLOCK_SIZE`].
pub(crate) const fn adjusted_size(requested: usize) -> usize {
    let with_header = round_up(requested + WORD, WORD);
    if with_header < MIN_BLOCK_SIZE {
        MIN_BLOCK_SIZE
    } else {
        with_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_size_and_flags() {
        let header = make_header(64, true, false, true);
        assert_eq!(size_of_header(header), 64);
        assert!(is_this_allocated(header));
        assert!(!is_prev_allocated(header));
        assert!(is_in_quick_list(header));
    }

    #[test]
    fn adjusted_size_floors_at_minimum() {
        assert_eq!(adjusted_size(1), 32);
        assert_eq!(adjusted_size(24), 32);
        assert_eq!(adjusted_size(25), 40);
    }

    #[test]
    fn adjusted_size_matches_allocate_1_scenario() {
        // allocate(1) must carve a 32-byte block (header + 8-byte payload,
        // rounded up and floored at MIN_BLOCK_SIZE).
        assert_eq!(adjusted_size(1), 32);
    }

    #[test]
    fn adjusted_size_matches_allocate_4048_scenario() {
        assert_eq!(adjusted_size(4048), 4056);
    }

    #[test]
    fn round_up_is_idempotent_on_multiples() {
        assert_eq!(round_up(4056, 8), 4056);
        assert_eq!(round_up(4057, 8), 4064);
    }
}
