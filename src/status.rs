//! The process-wide errno-style status variable from the specification,
//! represented as a small `Copy` enum instead of a bare integer.

/// Mirrors the allocator's status variable: set on `ENOMEM`/`EINVAL`
/// conditions, never cleared back to `Ok` on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No error has been recorded since the heap was created (or since the
    /// last time a validation path happened to overwrite it — this variant
    /// is never restored automatically).
    Ok,
    /// The page-grow primitive could not satisfy a request to extend the
    /// heap.
    NoMem,
    /// `resize` or `aligned_allocate` received a malformed pointer or
    /// alignment argument.
    InvalidArgument,
}
