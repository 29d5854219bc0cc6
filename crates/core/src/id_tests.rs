// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Identifier used only by these tests.
    pub struct SampleId;
}

#[test]
fn new_and_display_round_trip_the_inner_string() {
    let id = SampleId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id, "abc");
}

#[test]
fn generate_produces_distinct_uuids() {
    let a = SampleId::generate();
    let b = SampleId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

#[test]
fn short_truncates_on_char_boundaries() {
    let id = SampleId::new("abcdef");
    assert_eq!(id.short(3), "abc");
    assert_eq!(id.short(10), "abcdef");

    let wide = SampleId::new("äöü");
    assert_eq!(wide.short(2), "äö");
}

#[test]
fn matches_prefix_rejects_empty_prefix() {
    let id = SampleId::new("7f3a-1");
    assert!(id.matches_prefix("7f"));
    assert!(!id.matches_prefix("8"));
    assert!(!id.matches_prefix(""));
}

#[test]
fn serializes_as_bare_string() {
    let id = SampleId::new("p-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");
    let back: SampleId = serde_json::from_str("\"p-1\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn borrow_allows_str_lookup() {
    let mut map = HashMap::new();
    map.insert(SampleId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));

    let id = SampleId::new("x");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "x");
}
