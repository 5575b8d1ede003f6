//! Error types for pagetree.

use thiserror::Error;

use super::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the page pool and the tree.
///
/// A key that is absent from the tree is *not* an error; `search` reports it
/// as `Ok(None)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The page pool has handed out all of its slots.
    ///
    /// Surfaced to the insert caller. The tree is left exactly as it was
    /// before the failed insert.
    #[error("page pool exhausted (capacity {capacity} pages)")]
    OutOfSpace { capacity: u32 },

    /// A page identifier was dereferenced that the allocator never issued.
    ///
    /// This indicates a broken reference in the page graph, not a condition
    /// callers are expected to recover from.
    #[error("unknown page {0}")]
    UnknownPage(PageId),

    /// A construction-time configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The structural verifier found a broken tree invariant.
    #[error("corrupted tree at {page}: {reason}")]
    Corrupted { page: PageId, reason: String },

    /// A page does not fit into a fixed-size page image.
    #[error("{page} needs {needed} bytes, image holds {limit}")]
    PageOverflow {
        page: PageId,
        needed: usize,
        limit: usize,
    },

    /// A page image failed its CRC32 check.
    #[error("checksum mismatch on {page}: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        page: PageId,
        expected: u32,
        actual: u32,
    },

    /// A page image is truncated or malformed.
    #[error("malformed page image: {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn corrupted(page: PageId, reason: impl Into<String>) -> Self {
        Error::Corrupted {
            page,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPage(PageId::new(42));
        assert_eq!(format!("{}", err), "unknown page Page(42)");

        let err = Error::OutOfSpace { capacity: 10 };
        assert_eq!(format!("{}", err), "page pool exhausted (capacity 10 pages)");
    }

    #[test]
    fn test_corrupted_helper() {
        let err = Error::corrupted(PageId::new(3), "keys out of order");
        assert_eq!(
            err,
            Error::Corrupted {
                page: PageId::new(3),
                reason: "keys out of order".to_string(),
            }
        );
        assert_eq!(
            format!("{}", err),
            "corrupted tree at Page(3): keys out of order"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
