use proptest::prelude::*;
use syncscript_types::Namespace;

#[test]
fn root_and_child() {
    let root = Namespace::new("syncscript").unwrap();
    let child = root.child("collaboration").unwrap();
    assert_eq!(child.as_str(), "syncscript.collaboration");
}

#[test]
fn dotted_root_is_validated_per_segment() {
    assert!(Namespace::new("tenant-1.syncscript").is_ok());
    assert!(Namespace::new("tenant-1..syncscript").is_err());
}

#[test]
fn rejects_unsafe_segments() {
    assert!(Namespace::new("").is_err());
    assert!(Namespace::new("Upper").is_err());
    assert!(Namespace::new("../etc").is_err());
    let root = Namespace::new("app").unwrap();
    assert!(root.child("a/b").is_err());
    assert!(root.key("video calls").is_err());
}

#[test]
fn key_joins_collection() {
    let ns = Namespace::new("app").unwrap().child("threat_detection").unwrap();
    let key = ns.key("access_logs").unwrap();
    assert_eq!(key.as_str(), "app.threat_detection.access_logs");
}

#[test]
fn sibling_namespaces_never_share_keys() {
    let root = Namespace::new("app").unwrap();
    let a = root.child("search_hub").unwrap().key("items").unwrap();
    let b = root.child("integrations").unwrap().key("items").unwrap();
    assert_ne!(a, b);
}

#[test]
fn deserialization_validates() {
    let ok: Result<Namespace, _> = serde_json::from_str("\"app.core\"");
    assert!(ok.is_ok());
    let bad: Result<Namespace, _> = serde_json::from_str("\"App Core\"");
    assert!(bad.is_err());
}

proptest! {
    #[test]
    fn keys_are_namespace_dot_collection(
        root in "[a-z0-9_-]{1,12}",
        child in "[a-z0-9_-]{1,12}",
        collection in "[a-z0-9_-]{1,12}",
    ) {
        let ns = Namespace::new(&root).unwrap().child(&child).unwrap();
        let key = ns.key(&collection).unwrap();
        prop_assert_eq!(key.as_str(), format!("{root}.{child}.{collection}"));
    }

    #[test]
    fn segments_with_other_characters_are_rejected(bad in "[a-z]{0,4}[A-Z .:/][a-z]{0,4}") {
        prop_assert!(Namespace::new("app").unwrap().child(&bad).is_err());
    }
}
