//! Page images - fixed-size byte encodings of pages.
//!
//! The tree keeps pages as typed nodes in memory. A persistence layer that
//! wants to put them on a storage medium converts each one into a
//! `PAGE_SIZE` image with [`encode_page`] and back with [`decode_page`].
//!
//! # Image Layout
//! ```text
//! ┌──────────────┬─────────────────────────────────────┬──────────┐
//! │ PageHeader   │ entries: key ‖ (value | child u32)  │ zero pad │
//! │ (21 bytes)   │                                     │          │
//! └──────────────┴─────────────────────────────────────┴──────────┘
//! ```

use crate::common::config::{MIN_PAGE_CAPACITY, PAGE_SIZE};
use crate::common::{Error, PageId, Result};

use super::page::{Entry, Page, Payload};
use super::page_header::{PageHeader, PageType};

/// A key or payload type that can be written into a page image.
///
/// Integers are little-endian and fixed width; byte strings carry a `u32`
/// length prefix.
pub trait Encode: Sized {
    /// Append the encoding of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Read one value from the front of `input`, advancing it.
    fn decode(input: &mut &[u8]) -> Result<Self>;
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(Error::Decode(format!(
            "needed {} bytes, {} left",
            n,
            input.len()
        )));
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

macro_rules! impl_encode_int {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn decode(input: &mut &[u8]) -> Result<Self> {
                    let bytes = take(input, std::mem::size_of::<$ty>())?;
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    Ok(<$ty>::from_le_bytes(raw))
                }
            }
        )*
    };
}

impl_encode_int!(u32, u64, i64);

impl Encode for Vec<u8> {
    fn encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).encode(out);
        out.extend_from_slice(self);
    }

    fn decode(input: &mut &[u8]) -> Result<Self> {
        let len = u32::decode(input)? as usize;
        Ok(take(input, len)?.to_vec())
    }
}

impl Encode for String {
    fn encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).encode(out);
        out.extend_from_slice(self.as_bytes());
    }

    fn decode(input: &mut &[u8]) -> Result<Self> {
        let bytes = Vec::<u8>::decode(input)?;
        String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// Encode a page into a `PAGE_SIZE` image with a checksummed header.
///
/// # Errors
/// - `Error::PageOverflow` if the entries do not fit in one image
/// - `Error::InvalidConfig` if the page capacity does not fit the header field
pub fn encode_page<K, V>(page: &Page<K, V>) -> Result<Vec<u8>>
where
    K: Ord + Encode,
    V: Encode,
{
    let capacity = u16::try_from(page.capacity()).map_err(|_| {
        Error::InvalidConfig(format!(
            "page capacity {} exceeds image limit {}",
            page.capacity(),
            u16::MAX
        ))
    })?;

    let mut image = vec![0u8; PageHeader::SIZE];
    for entry in page.entries() {
        entry.key.encode(&mut image);
        match &entry.payload {
            Payload::Value(v) => v.encode(&mut image),
            Payload::Child(pid) => pid.0.encode(&mut image),
        }
    }

    if image.len() > PAGE_SIZE {
        return Err(Error::PageOverflow {
            page: page.id(),
            needed: image.len(),
            limit: PAGE_SIZE,
        });
    }
    image.resize(PAGE_SIZE, 0);

    let mut header = PageHeader {
        page_type: page.page_type(),
        checksum: 0,
        page_id: page.id(),
        capacity,
        entry_count: page.len() as u16,
        left_child: page.left_child(),
        right_link: page.right_link(),
    };
    header.write_to(&mut image);
    header.checksum = PageHeader::compute_checksum(&image);
    header.write_to(&mut image);

    Ok(image)
}

/// Decode a page image produced by [`encode_page`].
///
/// # Errors
/// - `Error::Decode` if the image has the wrong size, is malformed, or
///   describes a page that breaks the page invariants (capacity below 2,
///   `entry_count >= capacity`, keys not strictly ascending)
/// - `Error::ChecksumMismatch` if the stored checksum does not match
pub fn decode_page<K, V>(image: &[u8]) -> Result<Page<K, V>>
where
    K: Ord + Encode,
    V: Encode,
{
    if image.len() != PAGE_SIZE {
        return Err(Error::Decode(format!(
            "image is {} bytes, expected {}",
            image.len(),
            PAGE_SIZE
        )));
    }

    let header = PageHeader::from_bytes(image)?;
    let actual = PageHeader::compute_checksum(image);
    if header.checksum != actual {
        return Err(Error::ChecksumMismatch {
            page: header.page_id,
            expected: header.checksum,
            actual,
        });
    }

    let leaf = match (header.page_type, header.left_child) {
        (PageType::Leaf, None) => true,
        (PageType::Internal, Some(_)) => false,
        (page_type, left) => {
            return Err(Error::Decode(format!(
                "{} has type {:?} with left child {:?}",
                header.page_id, page_type, left
            )))
        }
    };

    let capacity = header.capacity as usize;
    if capacity < MIN_PAGE_CAPACITY {
        return Err(Error::Decode(format!(
            "{} has capacity {}, minimum is {}",
            header.page_id, capacity, MIN_PAGE_CAPACITY
        )));
    }
    if header.entry_count as usize >= capacity {
        return Err(Error::Decode(format!(
            "{} holds {} entries with capacity {}",
            header.page_id, header.entry_count, capacity
        )));
    }

    let mut body = &image[PageHeader::SIZE..];
    let mut entries = Vec::with_capacity(header.entry_count as usize);
    for _ in 0..header.entry_count {
        let key = K::decode(&mut body)?;
        let payload = if leaf {
            Payload::Value(V::decode(&mut body)?)
        } else {
            Payload::Child(PageId(u32::decode(&mut body)?))
        };
        entries.push(Entry { key, payload });
    }

    if entries.windows(2).any(|pair| pair[0].key >= pair[1].key) {
        return Err(Error::Decode(format!(
            "{} keys are not strictly ascending",
            header.page_id
        )));
    }

    Ok(Page::from_parts(
        header.page_id,
        capacity,
        entries,
        header.left_child,
        header.right_link,
    ))
}
