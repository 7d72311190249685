//! Property-based tests for the merge engine and the SIGSTRUCT parser.

use crate::merge::{NamedDocument, Resolution, merge_in_order};
use crate::policy::MergePolicy;
use crate::sigstruct::{SIGSTRUCT_MIN_LEN, parse_sigstruct};
use proptest::prelude::*;
use toml::{Table, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,7}").unwrap()
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        any::<bool>().prop_map(Value::Boolean),
        "[a-zA-Z0-9/:._-]{0,12}".prop_map(Value::String),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_scalar(),
        1 => prop::collection::vec(arb_scalar(), 0..4).prop_map(Value::Array),
    ]
}

fn arb_table() -> impl Strategy<Value = Table> {
    let leaf_table = prop::collection::btree_map(arb_key(), arb_leaf(), 0..5);
    prop::collection::btree_map(
        arb_key(),
        prop_oneof![
            2 => arb_leaf(),
            1 => leaf_table.prop_map(|m| Value::Table(m.into_iter().collect())),
        ],
        0..6,
    )
    .prop_map(|m| m.into_iter().collect())
}

// ============================================================================
// Helpers
// ============================================================================

fn merge_two(a: Table, b: Table) -> crate::merge::MergeOutcome {
    merge_in_order(
        [NamedDocument::new("a", a), NamedDocument::new("b", b)],
        &MergePolicy::default(),
    )
    .expect("override policy never fails")
}

/// Expected result of merging a document with itself: every array doubles.
fn doubled(v: &Value) -> Value {
    match v {
        Value::Array(items) => Value::Array(items.iter().chain(items.iter()).cloned().collect()),
        Value::Table(t) => Value::Table(t.iter().map(|(k, v)| (k.clone(), doubled(v))).collect()),
        other => other.clone(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn self_merge_keeps_scalars_and_doubles_lists(doc in arb_table()) {
        let out = merge_two(doc.clone(), doc.clone());
        let expected = match doubled(&Value::Table(doc)) {
            Value::Table(t) => t,
            _ => unreachable!(),
        };
        prop_assert_eq!(out.document, expected);
        prop_assert!(out.notes.is_empty());
    }

    #[test]
    fn merging_empty_secondary_is_identity(doc in arb_table()) {
        let out = merge_two(doc.clone(), Table::new());
        prop_assert_eq!(out.document, doc);
    }

    #[test]
    fn merging_into_empty_primary_copies_secondary(doc in arb_table()) {
        let out = merge_two(Table::new(), doc.clone());
        prop_assert_eq!(out.document, doc);
    }

    #[test]
    fn primary_scalar_wins_under_override(key in arb_key(), a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let mut first = Table::new();
        first.insert(key.clone(), Value::Integer(a));
        let mut second = Table::new();
        second.insert(key.clone(), Value::Integer(b));

        let out = merge_two(first.clone(), second);
        prop_assert_eq!(out.document, first);
        prop_assert_eq!(out.notes.len(), 1);
        prop_assert_eq!(out.notes[0].resolution, Resolution::Overridden);
        prop_assert_eq!(&out.notes[0].key, &key);
    }

    #[test]
    fn every_primary_key_survives(a in arb_table(), b in arb_table()) {
        let out = merge_two(a.clone(), b.clone());
        for key in a.keys().chain(b.keys()) {
            prop_assert!(out.document.contains_key(key));
        }
    }

    #[test]
    fn sigstruct_parser_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..1100)) {
        let result = parse_sigstruct(&bytes);
        if bytes.len() < SIGSTRUCT_MIN_LEN {
            prop_assert!(result.is_err());
        }
    }
}
