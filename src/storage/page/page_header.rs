//! Page header and type definitions.
//!
//! Every page image starts with a [`PageHeader`] containing metadata:
//! - [`PageType`] discriminator
//! - CRC32 checksum for integrity
//! - Page identity, capacity and entry count
//! - Child and sibling links

use crate::common::{Error, PageId, Result};

/// Type of page stored in an image.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// Internal (non-leaf) node.
    Internal = 1,
    /// Leaf node.
    Leaf = 2,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Internal,
            2 => PageType::Leaf,
            _ => PageType::Invalid,
        }
    }
}

/// On-image encoding of "no page".
const NO_PAGE: u32 = u32::MAX;

fn encode_link(link: Option<PageId>) -> u32 {
    link.map_or(NO_PAGE, |pid| pid.0)
}

fn decode_link(raw: u32) -> Option<PageId> {
    (raw != NO_PAGE).then_some(PageId(raw))
}

/// Metadata stored at the beginning of every page image.
///
/// # Layout (21 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       4     page_id
/// 9       2     capacity
/// 11      2     entry_count
/// 13      4     left_child (u32::MAX = none)
/// 17      4     right_link (u32::MAX = none)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire image with the checksum field
/// itself set to zero. This allows verification without special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
    pub page_id: PageId,
    pub capacity: u16,
    pub entry_count: u16,
    pub left_child: Option<PageId>,
    pub right_link: Option<PageId>,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 21;

    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_PAGE_ID: usize = 5;
    pub const OFFSET_CAPACITY: usize = 9;
    pub const OFFSET_ENTRY_COUNT: usize = 11;
    pub const OFFSET_LEFT_CHILD: usize = 13;
    pub const OFFSET_RIGHT_LINK: usize = 17;

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Errors
    /// Returns `Error::Decode` if the slice is shorter than the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::Decode(format!(
                "{} bytes is too small for a page header",
                data.len()
            )));
        }

        let u16_at = |off: usize| u16::from_le_bytes([data[off], data[off + 1]]);
        let u32_at = |off: usize| {
            u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
        };

        Ok(Self {
            page_type: PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]),
            checksum: u32_at(Self::OFFSET_CHECKSUM),
            page_id: PageId(u32_at(Self::OFFSET_PAGE_ID)),
            capacity: u16_at(Self::OFFSET_CAPACITY),
            entry_count: u16_at(Self::OFFSET_ENTRY_COUNT),
            left_child: decode_link(u32_at(Self::OFFSET_LEFT_CHILD)),
            right_link: decode_link(u32_at(Self::OFFSET_RIGHT_LINK)),
        })
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
        data[Self::OFFSET_PAGE_ID..Self::OFFSET_PAGE_ID + 4]
            .copy_from_slice(&self.page_id.0.to_le_bytes());
        data[Self::OFFSET_CAPACITY..Self::OFFSET_CAPACITY + 2]
            .copy_from_slice(&self.capacity.to_le_bytes());
        data[Self::OFFSET_ENTRY_COUNT..Self::OFFSET_ENTRY_COUNT + 2]
            .copy_from_slice(&self.entry_count.to_le_bytes());
        data[Self::OFFSET_LEFT_CHILD..Self::OFFSET_LEFT_CHILD + 4]
            .copy_from_slice(&encode_link(self.left_child).to_le_bytes());
        data[Self::OFFSET_RIGHT_LINK..Self::OFFSET_RIGHT_LINK + 4]
            .copy_from_slice(&encode_link(self.right_link).to_le_bytes());
    }

    /// Compute CRC32 checksum of a page image.
    ///
    /// The checksum field (bytes 1-4) is hashed as zeros, so the checksum
    /// doesn't include itself.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Verify that the stored checksum matches the computed checksum.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;

    fn sample_header() -> PageHeader {
        PageHeader {
            page_type: PageType::Internal,
            checksum: 0xDEADBEEF,
            page_id: PageId::new(7),
            capacity: 3,
            entry_count: 2,
            left_child: Some(PageId::new(1)),
            right_link: None,
        }
    }

    #[test]
    fn test_page_type_from_u8() {
        assert_eq!(PageType::from_u8(0), PageType::Invalid);
        assert_eq!(PageType::from_u8(1), PageType::Internal);
        assert_eq!(PageType::from_u8(2), PageType::Leaf);
        assert_eq!(PageType::from_u8(255), PageType::Invalid);
    }

    #[test]
    fn test_page_header_roundtrip() {
        let original = sample_header();
        let mut buffer = [0u8; PageHeader::SIZE];
        original.write_to(&mut buffer);

        assert_eq!(PageHeader::from_bytes(&buffer).unwrap(), original);
    }

    #[test]
    fn test_page_header_byte_layout() {
        let mut buffer = [0u8; PageHeader::SIZE];
        sample_header().write_to(&mut buffer);

        assert_eq!(buffer[0], 1); // PageType::Internal
        assert_eq!(buffer[1], 0xEF); // checksum LSB
        assert_eq!(buffer[5], 7); // page id LSB
        assert_eq!(buffer[9], 3); // capacity
        assert_eq!(buffer[11], 2); // entry count
        assert_eq!(buffer[13], 1); // left child
        assert_eq!(&buffer[17..21], &[0xFF; 4]); // no right link
    }

    #[test]
    fn test_short_buffer_is_decode_error() {
        let buffer = [0u8; PageHeader::SIZE - 1];
        assert!(matches!(
            PageHeader::from_bytes(&buffer),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let checksum1 = PageHeader::compute_checksum(&page_data);
        page_data[1..5].copy_from_slice(&[0xFF; 4]);
        let checksum2 = PageHeader::compute_checksum(&page_data);

        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut page_data = [0u8; PAGE_SIZE];
        page_data[100] = 0xAB;

        let mut header = sample_header();
        header.checksum = PageHeader::compute_checksum(&page_data);
        assert!(header.verify_checksum(&page_data));

        page_data[100] = 0xFF;
        assert!(!header.verify_checksum(&page_data));
    }
}
