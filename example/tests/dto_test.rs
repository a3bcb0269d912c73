use dtogen_example::client::{self, EntityImpl, MarkerImpl, PointImpl, ReadingImpl, Role, ShapeImpl, UserImpl};
use dtogen_example::legacy::LegacyNote;
use dtogen_example::server;
use dtogen_runtime::{DecodeError, DtoHash, JsonSerializable, Value};
use proptest::prelude::*;
use serde_json::json;

fn sample_user() -> UserImpl {
    let mut user = UserImpl::new()
        .with_id("u-1")
        .with_version(3)
        .with_display_name("Ada")
        .with_role(Role::Admin)
        .with_age(36)
        .with_active(true)
        .with_score(2.5)
        .with_manager(UserImpl::new().with_id("u-0").with_display_name("Grace"))
        .with_note(LegacyNote::new("first"));
    user.add_tags("math".to_string());
    user.add_tags("engines".to_string());
    user.put_attributes("lang", json!({ "primary": "en" }));
    user
}

#[test]
fn field_named_round_trip() {
    let user = sample_user();
    let text = user.to_json();
    let back = UserImpl::from_json_str(&text).unwrap().unwrap();
    assert_eq!(back, user);
    assert_eq!(back.dto_hash(), user.dto_hash());

    let wire = user.to_json_value();
    assert_eq!(wire["display_name"], json!("Ada"));
    assert_eq!(wire["role"], json!("ADMIN"));
    assert_eq!(wire["manager"]["id"], json!("u-0"));
    assert_eq!(wire["note"], json!({ "text": "first", "pinned": false }));
    assert_eq!(wire["verified"], Value::Null);
    assert!(wire.get("displayName").is_none());
}

#[test]
fn null_decodes_to_none() {
    assert!(UserImpl::from_json_str("null").unwrap().is_none());
    assert!(PointImpl::from_json_value(Value::Null).unwrap().is_none());
}

#[test]
fn compact_index_gap_is_written_as_null() {
    let point = PointImpl::new().with_x(1).with_y(2);
    assert_eq!(point.to_json_value(), json!([1, null, 2, null]));

    let back = PointImpl::from_json_value(json!([1, null, 2, null])).unwrap().unwrap();
    assert_eq!(back.get_x(), 1);
    assert_eq!(back.get_y(), 2);
}

#[test]
fn trailing_list_is_omitted_when_empty() {
    let mut point = PointImpl::new().with_x(4).with_y(5).with_visible(true).with_labels(Vec::new());
    assert_eq!(point.to_json_value(), json!([4, null, 5, true]));

    point.add_labels("a".to_string());
    assert_eq!(point.to_json_value(), json!([4, null, 5, true, ["a"]]));

    let mut short = PointImpl::from_json_str("[4, null, 5, true]").unwrap().unwrap();
    assert!(short.get_labels().is_empty());
}

#[test]
fn trailing_map_is_omitted_when_empty() {
    let mut reading = ReadingImpl::new().with_value(1.5);
    assert_eq!(reading.to_json_value(), json!([1.5]));
    reading.ensure_extras();
    assert_eq!(reading.to_json_value(), json!([1.5]));

    reading.put_extras("min", 2);
    reading.put_extras("max", 9);
    assert_eq!(reading.to_json_value(), json!([1.5, { "min": 2, "max": 9 }]));
    let back = ReadingImpl::from_json_value(reading.to_json_value()).unwrap().unwrap();
    assert_eq!(back, reading);

    let server_reading = server::ReadingImpl::from_json_value(reading.to_json_value()).unwrap().unwrap();
    assert_eq!(server_reading.to_json_value(), reading.to_json_value());

    let mut short = ReadingImpl::from_json_str("[3]").unwrap().unwrap();
    assert_eq!(short.get_value(), 3.0);
    assert!(short.get_extras().is_empty());
    assert_eq!(short, ReadingImpl::new().with_value(3.0));
}

#[test]
fn absent_nullable_boolean_decodes_as_false() {
    let user = UserImpl::from_json_str("{}").unwrap().unwrap();
    assert_eq!(user.get_verified(), Some(false));
    assert_eq!(user.get_age(), None);
    assert!(!user.get_active());

    let user = UserImpl::from_json_str(r#"{ "verified": null }"#).unwrap().unwrap();
    assert_eq!(user.get_verified(), None);

    let point = PointImpl::from_json_str("[1]").unwrap().unwrap();
    assert_eq!(point.get_visible(), Some(false));
}

#[test]
fn numbers_narrow_to_the_declared_kind() {
    let shape = ShapeImpl::from_json_str(r#"{ "small": 7, "weights": [1.5, 2] }"#).unwrap().unwrap();
    assert_eq!(shape.get_small(), 7);
    let wire = shape.to_json_value();
    assert_eq!(wire["small"].to_string(), "7");
    assert_eq!(wire["weights"].to_string(), "[1.5,2]");

    let user = UserImpl::from_json_str(r#"{ "version": 7.9, "age": 12 }"#).unwrap().unwrap();
    assert_eq!(user.get_version(), 7);
    assert_eq!(user.get_age(), Some(12));
}

#[test]
fn unknown_enum_constant_fails_the_decode() {
    let err = UserImpl::from_json_str(r#"{ "role": "admin" }"#).unwrap_err();
    match err {
        DecodeError::UnknownEnumConstant { enum_name, value, .. } => {
            assert_eq!(enum_name, "Role");
            assert_eq!(value, "admin");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn mismatched_shapes_are_rejected() {
    assert!(matches!(
        PointImpl::from_json_str(r#"{ "x": 1 }"#),
        Err(DecodeError::TypeMismatch { expected: "array", .. })
    ));
    assert!(matches!(
        UserImpl::from_json_str(r#"{ "tags": "math" }"#),
        Err(DecodeError::TypeMismatch { expected: "array", .. })
    ));
    assert!(matches!(
        ShapeImpl::from_json_str(r#"{ "outline": [null] }"#),
        Err(DecodeError::NullElement(_))
    ));
    assert!(matches!(UserImpl::from_json_str("{ nope"), Err(DecodeError::Json(_))));
}

#[test]
fn deep_copy_is_independent() {
    let original = sample_user();
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.add_tags("poetry".to_string());
    copy.put_attributes("lang", json!("fr"));
    copy.set_manager(None);

    let mut original = original;
    assert_eq!(original.get_tags().len(), 2);
    assert_eq!(original.get_attributes()["lang"], json!({ "primary": "en" }));
    assert_eq!(original.get_manager().and_then(|m| m.get_display_name()), Some("Grace"));
}

#[test]
fn ensure_is_idempotent_and_invisible_to_equality() {
    let mut ensured = UserImpl::new();
    assert!(ensured.get_tags().is_empty());
    ensured.ensure_tags();
    ensured.clear_attributes();

    let fresh = UserImpl::new();
    assert_eq!(ensured, fresh);
    assert_eq!(ensured.dto_hash(), fresh.dto_hash());
    assert_eq!(ensured.to_json_value()["tags"], json!([]));
    assert_eq!(fresh.to_json_value()["tags"], json!([]));
}

#[test]
fn nested_containers_round_trip() {
    let mut shape = ShapeImpl::new().with_name("poly").with_payload(json!({ "k": [1, 2] }));
    shape.add_outline(PointImpl::new().with_x(1).with_y(1));
    shape.put_layers("base", vec![PointImpl::new().with_x(0), PointImpl::new().with_y(9)]);
    shape.put_layers("empty", Vec::new());

    let back = ShapeImpl::from_json_str(&shape.to_json()).unwrap().unwrap();
    assert_eq!(back, shape);
    assert_eq!(back.get_payload(), Some(&json!({ "k": [1, 2] })));
}

#[test]
fn json_null_payload_reads_as_absent() {
    let shape = ShapeImpl::new().with_name("blank").with_payload(Value::Null);
    assert_eq!(shape.get_payload(), None);
    assert_eq!(shape, ShapeImpl::new().with_name("blank"));
    assert_eq!(shape.to_json_value()["payload"], Value::Null);
    assert_eq!(ShapeImpl::from_json_str(&shape.to_json()).unwrap().unwrap(), shape);

    let mut shape = shape.with_payload(json!([null]));
    assert_eq!(shape.get_payload(), Some(&json!([null])));
    shape.set_payload(Some(Value::Null));
    assert_eq!(shape.get_payload(), None);
}

#[test]
fn upcast_keeps_inherited_properties() {
    let user = sample_user();
    let entity = EntityImpl::from(&user);
    assert_eq!(entity.get_id(), Some("u-1"));
    assert_eq!(entity.get_version(), 3);
}

#[test]
fn delegation_forwards_to_the_target() {
    assert_eq!(sample_user().label(" / "), "Ada / ADMIN");
    assert_eq!(UserImpl::new().label(":"), "anonymous:GUEST");
}

#[test]
fn registry_dispatches_by_interface_name() {
    let registry = client::registry();
    assert_eq!(registry.len(), 7);
    assert!(registry.contains("Reading"));
    assert!(registry.contains("Marker"));

    let provider = registry.get("User").unwrap();
    assert_eq!(provider.impl_name(), "UserImpl");

    let decoded = provider
        .from_wire_str(r#"{ "display_name": "Ada" }"#)
        .unwrap()
        .unwrap();
    let user = decoded.downcast_ref::<UserImpl>().unwrap();
    assert_eq!(user.get_display_name(), Some("Ada"));

    let copy = provider.clone_dto(decoded.as_ref()).unwrap();
    assert_eq!(copy.downcast_ref::<UserImpl>(), Some(user));
    assert!(registry.get("Point").unwrap().clone_dto(decoded.as_ref()).is_none());

    let legacy = registry.get("LegacyNote").unwrap();
    assert_eq!(legacy.impl_name(), "crate::legacy::LegacyNote");
    assert!(legacy.new_instance().downcast_ref::<LegacyNote>().is_some());

    let marker = registry.get("Marker").unwrap().new_instance();
    assert!(marker.downcast_ref::<MarkerImpl>().is_some());
    assert_eq!(marker.wire_value(), json!({}));
}

#[test]
fn client_and_server_agree_on_the_wire() {
    let text = sample_user().to_json();
    let server_user = server::UserImpl::from_json_str(&text).unwrap().unwrap();
    assert_eq!(server_user.to_json_value(), sample_user().to_json_value());
    assert_eq!(server_user.get_role(), Some(server::Role::Admin));

    let mut shape = ShapeImpl::new();
    shape.put_layers("a", vec![PointImpl::new().with_x(2)]);
    let server_shape = server::ShapeImpl::from_json_value(shape.to_json_value()).unwrap().unwrap();
    assert_eq!(server_shape.to_json_value(), shape.to_json_value());
    assert_eq!(server_shape.dto_hash(), shape.dto_hash());
}

proptest! {
    #[test]
    fn compact_round_trip(
        x in any::<i32>(),
        y in any::<i32>(),
        visible in proptest::option::of(any::<bool>()),
        labels in proptest::collection::vec("[a-z]{0,6}", 0..4),
    ) {
        let mut point = PointImpl::new().with_x(x).with_y(y).with_labels(labels);
        point.set_visible(visible);
        let back = PointImpl::from_json_str(&point.to_json()).unwrap().unwrap();
        prop_assert_eq!(&back, &point);
        prop_assert_eq!(back.dto_hash(), point.dto_hash());
    }

    #[test]
    fn field_named_round_trip_in_both_variants(
        name in "[A-Za-z ]{0,12}",
        version in -1_000_000_000i64..1_000_000_000i64,
        score in (-4_000_000i32..4_000_000).prop_map(|n| n as f64 / 4.0),
        tags in proptest::collection::vec(".{0,8}", 0..4),
        weights in proptest::collection::vec((-4_000i32..4_000).prop_map(|n| n as f32 / 4.0), 0..4),
    ) {
        let mut user = UserImpl::new().with_display_name(name).with_version(version).with_score(score);
        user.set_tags(tags);
        let text = user.to_json();
        prop_assert_eq!(UserImpl::from_json_str(&text).unwrap().unwrap(), user.clone());

        let server_user = server::UserImpl::from_json_str(&text).unwrap().unwrap();
        prop_assert_eq!(server_user.to_json_value(), user.to_json_value());

        let shape = ShapeImpl::new().with_weights(weights);
        let back = ShapeImpl::from_json_value(shape.to_json_value()).unwrap().unwrap();
        prop_assert_eq!(back, shape);
    }
}
