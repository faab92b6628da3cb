use super::*;
use serde_json::json;

fn element(value: Value) -> DrawingElement {
    DrawingElement::try_from(value).expect("element should parse")
}

fn ids(store: &DrawingStore) -> Vec<String> {
    store.snapshot().iter().map(|e| e.id().to_string()).collect()
}

// =============================================================================
// ELEMENT PARSING
// =============================================================================

#[test]
fn string_and_numeric_ids_parse() {
    assert_eq!(element(json!({"id": "e1"})).id(), &ElementId::Text("e1".into()));
    assert_eq!(element(json!({"id": 1_700_000_000_123_u64})).id(), &ElementId::Number("1700000000123".into()));
}

#[test]
fn string_and_number_ids_are_distinct() {
    assert_ne!(element(json!({"id": "1"})).id(), element(json!({"id": 1})).id());
}

#[test]
fn numeric_ids_compare_by_value() {
    let one = element(json!({"id": 1})).id().clone();
    assert_eq!(element(json!({"id": 1.0})).id(), &one);
    assert_eq!(element(json!({"id": -0.0})).id(), element(json!({"id": 0})).id());
    assert_ne!(element(json!({"id": 1.5})).id(), &one);
    assert_eq!(element(json!({"id": 1.5})).id(), &ElementId::Number("1.5".into()));
}

#[test]
fn missing_or_null_id_is_rejected() {
    assert_eq!(DrawingElement::try_from(json!({"type": "line"})), Err(ElementError::MissingId));
    assert_eq!(DrawingElement::try_from(json!({"id": null})), Err(ElementError::MissingId));
}

#[test]
fn unusable_id_types_are_rejected() {
    assert_eq!(DrawingElement::try_from(json!({"id": true})), Err(ElementError::InvalidId("bool")));
    assert_eq!(DrawingElement::try_from(json!({"id": [1]})), Err(ElementError::InvalidId("array")));
    assert_eq!(DrawingElement::try_from(json!({"id": {"a": 1}})), Err(ElementError::InvalidId("object")));
}

#[test]
fn non_object_payload_is_rejected() {
    assert_eq!(DrawingElement::try_from(json!("e1")), Err(ElementError::NotAnObject));
    assert_eq!(DrawingElement::try_from(Value::Null), Err(ElementError::NotAnObject));
}

#[test]
fn element_serializes_as_received_body() {
    let body = json!({"id": "e1", "type": "rect", "x": 1.5, "style": {"stroke": "#000"}});
    let el = element(body.clone());
    assert_eq!(serde_json::to_value(&el).unwrap(), body);
}

// =============================================================================
// UPSERT
// =============================================================================

#[test]
fn upsert_appends_unseen_ids_in_order() {
    let mut store = DrawingStore::default();
    assert_eq!(store.upsert(element(json!({"id": "a"}))), Upsert::Inserted);
    assert_eq!(store.upsert(element(json!({"id": "b"}))), Upsert::Inserted);
    assert_eq!(store.upsert(element(json!({"id": "c"}))), Upsert::Inserted);
    assert_eq!(ids(&store), ["a", "b", "c"]);
}

#[test]
fn repeated_upserts_keep_one_element_with_last_payload_at_first_slot() {
    let mut store = DrawingStore::default();
    store.upsert(element(json!({"id": "a", "points": []})));
    store.upsert(element(json!({"id": "e1", "points": [[0, 0]]})));
    store.upsert(element(json!({"id": "b"})));

    for n in 1..=5 {
        let outcome = store.upsert(element(json!({"id": "e1", "points": vec![[0, 0]; n + 1]})));
        assert_eq!(outcome, Upsert::Updated);
    }

    assert_eq!(store.len(), 3);
    assert_eq!(ids(&store), ["a", "e1", "b"]);
    let e1 = store.get(&ElementId::Text("e1".into())).unwrap();
    assert_eq!(e1.body()["points"], json!(vec![[0, 0]; 6]));
}

#[test]
fn update_replaces_whole_payload() {
    let mut store = DrawingStore::default();
    store.upsert(element(json!({"id": "e1", "color": "red", "width": 3})));
    store.upsert(element(json!({"id": "e1", "color": "blue"})));

    let snapshot = store.snapshot();
    assert_eq!(serde_json::to_value(&snapshot[0]).unwrap(), json!({"id": "e1", "color": "blue"}));
}

#[test]
fn snapshot_has_no_duplicate_ids() {
    let mut store = DrawingStore::default();
    for round in 0..4 {
        for id in ["x", "y", "z"] {
            store.upsert(element(json!({"id": id, "round": round})));
        }
    }
    let snapshot = store.snapshot();
    let unique: std::collections::HashSet<_> = snapshot.iter().map(DrawingElement::id).collect();
    assert_eq!(unique.len(), snapshot.len());
    assert_eq!(snapshot.len(), 3);
}

#[test]
fn snapshot_is_detached_from_later_writes() {
    let mut store = DrawingStore::default();
    store.upsert(element(json!({"id": "a"})));
    let before = store.snapshot();
    store.upsert(element(json!({"id": "b"})));
    assert_eq!(before.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn integral_float_id_updates_integer_id() {
    let mut store = DrawingStore::default();
    store.upsert(element(json!({"id": 1, "v": "a"})));
    let outcome = store.upsert(element(json!({"id": 1.0, "v": "b"})));

    assert_eq!(outcome, Upsert::Updated);
    assert_eq!(store.len(), 1);
    assert_eq!(store.snapshot()[0].body()["v"], json!("b"));
}

// =============================================================================
// CLEAR
// =============================================================================

#[test]
fn clear_empties_store_and_index() {
    let mut store = DrawingStore::default();
    store.upsert(element(json!({"id": "a"})));
    store.upsert(element(json!({"id": "b"})));

    assert_eq!(store.clear(), 2);
    assert!(store.is_empty());
    assert!(store.snapshot().is_empty());
    assert!(store.get(&ElementId::Text("a".into())).is_none());

    // A previously seen id is new again after a clear.
    assert_eq!(store.upsert(element(json!({"id": "b"}))), Upsert::Inserted);
    assert_eq!(ids(&store), ["b"]);
}

#[test]
fn clear_on_empty_store_is_harmless() {
    let mut store = DrawingStore::default();
    assert_eq!(store.clear(), 0);
    assert!(store.is_empty());
}
