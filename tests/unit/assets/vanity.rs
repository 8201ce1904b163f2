use super::*;

const TABLE: &str = r##"{
    "key_full": {
        "badge": "donor",
        "body_color": "#2A2A2A",
        "hair_color": {"r": 255, "g": 200, "b": 0},
        "face_id": 3,
        "hair_id": 7
    },
    "key_hash": {"hash": "abcdef0123456789abcdef0123456789abcdef0123"},
    "key_badge_only": {"badge": "node"},
    "key_no_face": {"body_color": "#FFFFFF", "hair_color": "#000000", "face_id": 0}
}"##;

#[test]
fn full_override_selects_explicit_assets() {
    let table = VanityTable::from_json_str(TABLE).unwrap();
    assert_eq!(table.len(), 4);
    let v = table.get("key_full").unwrap();
    assert_eq!(v.badge(), BadgeKind::Donor);

    let VanityPlan::Selection(sel) = v.plan() else {
        panic!("expected explicit selection");
    };
    assert_eq!(sel.face_id, 3);
    assert_eq!(sel.hair_id, Some(7));
    assert_eq!(sel.mouth_id, None);
    assert_eq!(sel.body_color.to_html(true), "#2A2A2A");
    assert_eq!(sel.hair_color.to_html(true), "#FFC800");
}

#[test]
fn hash_override_replaces_account_hash() {
    let table = VanityTable::from_json_str(TABLE).unwrap();
    let v = table.get("key_hash").unwrap();
    assert_eq!(v.badge(), BadgeKind::None);
    assert_eq!(
        v.plan(),
        VanityPlan::Hash("abcdef0123456789abcdef0123456789abcdef0123")
    );
}

#[test]
fn partial_overrides_fall_back_to_account_hash() {
    let table = VanityTable::from_json_str(TABLE).unwrap();
    let badge_only = table.get("key_badge_only").unwrap();
    assert_eq!(badge_only.badge(), BadgeKind::Node);
    assert_eq!(badge_only.plan(), VanityPlan::AccountHash);

    // face id zero means no face was chosen
    let no_face = table.get("key_no_face").unwrap();
    assert!(no_face.selection().is_none());
    assert_eq!(no_face.plan(), VanityPlan::AccountHash);
}

#[test]
fn unknown_keys_and_fields() {
    let table = VanityTable::from_json_str(TABLE).unwrap();
    assert!(table.get("nobody").is_none());

    let err = VanityTable::from_json_str(r#"{"k": {"sparkle": true}}"#).unwrap_err();
    assert!(matches!(err, NatriconError::Serde(_)));
}

#[test]
fn insert_builds_table_in_memory() {
    let mut table = VanityTable::new();
    assert!(table.is_empty());
    table.insert(
        "k",
        VanityOverride {
            badge: Some(BadgeKind::Service),
            ..VanityOverride::default()
        },
    );
    assert_eq!(table.get("k").unwrap().badge(), BadgeKind::Service);
}
