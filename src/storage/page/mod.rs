//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - A tree node: sorted entries plus child and sibling links
//! - [`PageHeader`] - Metadata at the start of every page image
//! - [`PageType`] - Discriminator for leaf and internal images
//! - [`encode_page`] / [`decode_page`] - Fixed-size page images

mod codec;
#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use codec::{decode_page, encode_page, Encode};
pub use page::{Entry, Page, Payload};
pub use page_header::{PageHeader, PageType};
