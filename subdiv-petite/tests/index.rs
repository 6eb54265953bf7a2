//! Tests for the Index newtype wrapper.

use subdiv_petite::{Index, INVALID_INDEX};

#[test]
fn test_index_conversions() {
    let idx = Index::from(42u32);
    assert_eq!(idx.0, 42);

    let value: u32 = idx.into();
    assert_eq!(value, 42);

    let idx = Index::from(100usize);
    let value: usize = idx.into();
    assert_eq!(value, 100);
}

#[test]
fn test_index_debug_and_display() {
    let idx = Index(42);
    assert_eq!(format!("{:?}", idx), "Index(42)");
    assert_eq!(idx.to_string(), "42");
}

#[test]
fn test_index_ordering() {
    let idx1 = Index(1);
    let idx2 = Index(2);

    assert!(idx1 < idx2);
    assert_eq!(Index::default(), Index(0));
}

#[test]
fn test_index_hash() {
    use std::collections::HashMap;

    let mut map = HashMap::new();
    map.insert(Index(1), "one");
    map.insert(Index(2), "two");

    assert_eq!(map.get(&Index(1)), Some(&"one"));
    assert_eq!(map.get(&Index(3)), None);
}

#[test]
fn test_invalid_index() {
    assert!(!INVALID_INDEX.is_valid());
    assert!(Index(0).is_valid());
}

#[test]
fn test_index_slices_cast_to_u32() {
    let indices = [Index(0), Index(7), Index(3)];
    let raw: &[u32] = bytemuck::cast_slice(&indices);
    assert_eq!(raw, &[0, 7, 3]);
}
