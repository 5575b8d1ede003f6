//! Property tests: random insertion sequences against a `BTreeMap` model.

use std::collections::BTreeMap;

use pagetree::{decode_page, encode_page, BTree, BTreeConfig, Error, Page};
use proptest::prelude::*;

fn create_tree(page_capacity: usize, pool_capacity: u32) -> BTree<u16, u32> {
    BTree::new(
        BTreeConfig::new()
            .with_page_capacity(page_capacity)
            .with_pool_capacity(pool_capacity),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every inserted key is found with its latest payload, absent keys are
    /// not, and the structure verifies after each insert.
    #[test]
    fn prop_matches_model(
        page_capacity in 2usize..8,
        ops in prop::collection::vec((0u16..500, any::<u32>()), 1..300),
    ) {
        let mut tree = create_tree(page_capacity, 4096);
        let mut model = BTreeMap::new();

        for (k, v) in ops {
            tree.insert(k, v).unwrap();
            model.insert(k, v);
            prop_assert!(tree.verify().is_ok());
        }

        prop_assert_eq!(tree.len(), model.len());
        for k in 0u16..500 {
            prop_assert_eq!(tree.search(&k).unwrap(), model.get(&k));
        }

        let scanned: Vec<(u16, u32)> = tree
            .iter()
            .unwrap()
            .map(|item| item.map(|(k, v)| (*k, *v)).unwrap())
            .collect();
        let expected: Vec<(u16, u32)> = model.into_iter().collect();
        prop_assert_eq!(scanned, expected);
    }

    /// With a small pool, a failed insert changes nothing and every earlier
    /// insert stays visible.
    #[test]
    fn prop_out_of_space_is_atomic(
        pool_capacity in 1u32..12,
        keys in prop::collection::vec(0u16..1000, 1..200),
    ) {
        let mut tree = create_tree(3, pool_capacity);
        let mut model = BTreeMap::new();

        for k in keys {
            let len_before = tree.len();
            let pages_before = tree.allocator().page_count();
            match tree.insert(k, u32::from(k)) {
                Ok(()) => {
                    model.insert(k, u32::from(k));
                }
                Err(e) => {
                    prop_assert_eq!(e, Error::OutOfSpace { capacity: pool_capacity });
                    prop_assert_eq!(tree.len(), len_before);
                    prop_assert_eq!(tree.allocator().page_count(), pages_before);
                    prop_assert_eq!(tree.search(&k).unwrap(), None);
                }
            }
            prop_assert!(tree.allocator().page_count() <= pool_capacity);
        }

        prop_assert!(tree.verify().is_ok());
        for (k, v) in &model {
            prop_assert_eq!(tree.search(k).unwrap(), Some(v));
        }
    }

    /// Every page of a built tree survives a trip through its byte image.
    #[test]
    fn prop_page_images_roundtrip(keys in prop::collection::vec(any::<u64>(), 1..100)) {
        let mut tree: BTree<u64, String> = BTree::new(
            BTreeConfig::new().with_page_capacity(6).with_pool_capacity(1024),
        )
        .unwrap();
        for k in keys {
            tree.insert(k, format!("payload-{}", k)).unwrap();
        }

        for page in tree.allocator().pages() {
            let image = encode_page(page).unwrap();
            let decoded: Page<u64, String> = decode_page(&image).unwrap();
            prop_assert_eq!(&decoded, page);
        }
    }
}
