//! Edge case tests for fragsync-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use fragsync_engine::{
    codec, Defaults, Error, HostEvent, Kind, MemoryNavigator, NavWrite, Navigator, Outcome, ScalarKind,
    SyncOptions, Synchronizer, Value,
};

fn create_test_options() -> SyncOptions {
    let defaults = Defaults::new()
        .with("sortBy", "popularity")
        .with("text", "")
        .with("page", 1)
        .with("showAll", false)
        .with("tags", Vec::<&str>::new())
        .with_kind("cost", Kind::Array(ScalarKind::Number), Vec::<Value>::new())
        .unwrap();
    SyncOptions::new(defaults).debounce("text")
}

fn create_sync(fragment: &str) -> Synchronizer<MemoryNavigator> {
    Synchronizer::manual(
        create_test_options(),
        MemoryNavigator::new().with_fragment(fragment),
    )
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[test]
fn empty_string_is_a_real_value() {
    let mut sync = create_sync("");
    sync.set("sortBy", "");

    assert_eq!(sync.live().get("sortBy"), Some(""));
    assert_eq!(sync.navigator().fragment(), "#sortBy=");

    let reloaded = create_sync("#sortBy=");
    assert_eq!(reloaded.value("sortBy"), Some(Value::from("")));
}

#[test]
fn unicode_strings() {
    let values = vec![
        "日本語テスト",
        "Привет мир",
        "🎉🚀💯",
        "a & b = c",
        "100% #1",
        "Hello\nWorld\tTab",
    ];

    for text in values {
        let mut sync = create_sync("");
        sync.set_with("text", text, Some(false));

        let fragment = sync.navigator().fragment();
        assert!(fragment.is_ascii(), "fragment not encoded: {}", fragment);

        let reloaded = create_sync(&fragment);
        assert_eq!(reloaded.value("text"), Some(Value::from(text)));
    }
}

#[test]
fn very_long_strings() {
    let long = "x".repeat(10_000);
    let mut sync = create_sync("");
    sync.set("sortBy", long.as_str());

    assert_eq!(sync.navigator().fragment().len(), "#sortBy=".len() + 10_000);
    assert_eq!(sync.custom("sortBy"), Some(Value::from(long)));
}

// ============================================================================
// Fragment Edge Cases
// ============================================================================

#[test]
fn malformed_segments_are_skipped() {
    let sync = create_sync("#=orphan&broken&sortBy=winrate&&showAll=yes&page");
    let keys: Vec<_> = sync.live().keys().collect();
    assert_eq!(keys, vec!["sortBy", "showAll"]);
}

#[test]
fn value_with_extra_equals() {
    let sync = create_sync("#sortBy=a=b");
    assert_eq!(sync.value("sortBy"), Some(Value::from("a=b")));
}

#[test]
fn undecodable_segment_is_skipped() {
    let sync = create_sync("#sortBy=%FF&showAll=yes");
    assert_eq!(sync.value("sortBy"), Some(Value::from("popularity")));
    assert_eq!(sync.value("showAll"), Some(Value::Bool(true)));
}

#[test]
fn duplicate_keys_last_wins() {
    let sync = create_sync("#sortBy=first&sortBy=last");
    assert_eq!(sync.value("sortBy"), Some(Value::from("last")));
}

#[test]
fn plain_anchor_is_not_state() {
    let mut sync = create_sync("#section-2");
    assert!(sync.live().is_empty());

    sync.set("sortBy", "winrate");
    assert_eq!(sync.navigator().fragment(), "#sortBy=winrate");
}

#[test]
fn no_op_requests_keep_plain_anchor() {
    let mut sync = Synchronizer::manual(
        create_test_options(),
        MemoryNavigator::new()
            .with_location("/docs")
            .with_fragment("#section-2"),
    );

    assert_eq!(sync.reset(None), Outcome::Committed);
    assert_eq!(sync.set("sortBy", "popularity"), Outcome::Committed);
    assert_eq!(sync.reset(Some("page")), Outcome::Committed);

    assert_eq!(sync.navigator().href(), "/docs#section-2");
    assert!(sync.navigator().writes().is_empty());
}

#[test]
fn cleared_state_after_anchor_is_dropped() {
    let mut sync = Synchronizer::manual(
        create_test_options(),
        MemoryNavigator::new()
            .with_location("/docs")
            .with_fragment("#section-2"),
    );
    sync.set("sortBy", "winrate");
    sync.reset(None);

    assert_eq!(sync.navigator().href(), "/docs");
    assert_eq!(
        sync.navigator().writes(),
        &[
            NavWrite::Fragment("#sortBy=winrate".into()),
            NavWrite::Fragment("#_".into()),
            NavWrite::Url("/docs".into()),
        ]
    );
}

#[test]
fn sentinel_parses_to_nothing() {
    assert!(codec::parse("#_").is_empty());
    let sync = create_sync("#_");
    assert!(!sync.can_be_reset());
}

#[test]
fn foreign_keys_survive_reset() {
    let mut sync = create_sync("#utm_source=mail&sortBy=winrate");
    sync.reset(None);

    assert_eq!(sync.navigator().fragment(), "#utm_source=mail");
    assert_eq!(
        sync.navigator().writes(),
        &[NavWrite::Fragment("#utm_source=mail".into())]
    );
}

// ============================================================================
// Numeric and Boolean Edge Cases
// ============================================================================

#[test]
fn numeric_spellings_of_default_are_dropped() {
    for fragment in ["#page=1", "#page=1.0", "#page=01", "#page=%201%20"] {
        let sync = create_sync(fragment);
        assert!(sync.live().is_empty(), "{} kept in live state", fragment);
    }
}

#[test]
fn numeric_prefixes() {
    let sync = create_sync("#page=0x10");
    assert_eq!(sync.value("page"), Some(Value::Number(16.0)));
}

#[test]
fn empty_number_is_zero() {
    let sync = create_sync("#page=");
    assert_eq!(sync.value("page"), Some(Value::Number(0.0)));
}

#[test]
fn boolean_spellings() {
    assert_eq!(create_sync("#showAll=yes").value("showAll"), Some(Value::Bool(true)));
    assert_eq!(create_sync("#showAll=1").value("showAll"), Some(Value::Bool(true)));
    assert_eq!(create_sync("#showAll=true").value("showAll"), Some(Value::Bool(false)));
    assert!(create_sync("#showAll=no").live().is_empty());
}

#[test]
fn set_coerces_foreign_value_kinds() {
    let mut sync = create_sync("");
    sync.set("page", "7");
    sync.set("showAll", 1);
    assert_eq!(sync.value("page"), Some(Value::Number(7.0)));
    assert_eq!(sync.value("showAll"), Some(Value::Bool(true)));
    assert_eq!(sync.navigator().fragment(), "#page=7&showAll=yes");
}

// ============================================================================
// Array Edge Cases
// ============================================================================

#[test]
fn empty_array_value_in_fragment() {
    let sync = create_sync("#tags=");
    assert!(sync.live().is_empty());
    assert_eq!(sync.value("tags"), Some(Value::Array(vec![])));
}

#[test]
fn string_member_toggles_numeric_entry() {
    let mut sync = create_sync("#cost=3,5");
    sync.toggle("cost", "3");
    assert_eq!(sync.live().get("cost"), Some("5"));
}

#[test]
fn toggle_on_scalar_key_is_rejected() {
    let mut sync = create_sync("#sortBy=winrate");
    assert_eq!(
        sync.toggle("sortBy", "x"),
        Outcome::Rejected(Error::NotAnArray("sortBy".into()))
    );
    assert_eq!(sync.live().get("sortBy"), Some("winrate"));
}

#[test]
fn toggle_unknown_key_is_rejected() {
    let mut sync = create_sync("");
    assert_eq!(
        sync.toggle("nope", 1),
        Outcome::Rejected(Error::UnknownKey("nope".into()))
    );
}

#[test]
fn string_array_members_with_separator() {
    let mut sync = create_sync("");
    sync.toggle("tags", "a");
    sync.toggle("tags", "b");
    assert_eq!(sync.navigator().fragment(), "#tags=a%2Cb");
    assert_eq!(sync.value("tags"), Some(Value::from(vec!["a", "b"])));
}

// ============================================================================
// Request Storms
// ============================================================================

#[test]
fn many_speculative_requests() {
    let mut sync = create_sync("");
    for i in 0..1000 {
        sync.dispatch(HostEvent::Set {
            key: format!("key{}", i % 10),
            value: Value::from(i),
            force_debounce: None,
        });
        sync.dispatch(HostEvent::Toggle {
            key: "cost".into(),
            member: Value::from(i % 7),
        });
    }

    assert!(sync.live().contains_key("cost"));
    assert!(sync.live().keys().all(|key| key == "cost"));
}
