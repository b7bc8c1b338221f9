use storyline_core::{extract_property_value, Entry, Property, PropertyValue};

fn decode_entry(raw: serde_json::Value) -> Entry {
    serde_json::from_value(raw).expect("entry fixture should decode")
}

#[test]
fn wire_shapes_decode_and_extract_per_contract() {
    let entry = decode_entry(serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "properties": {
            "Name": {"type": "title", "title": [
                {"plain_text": "The Gate Opens"},
                {"plain_text": "ignored second run"}
            ]},
            "Summary": {"type": "rich_text", "rich_text": [
                {"plain_text": "the"}, {"plain_text": "gate"}, {"plain_text": "opens"}
            ]},
            "URL": {"type": "url", "url": "https://example.test/gate"},
            "Chapter Heading": {"type": "checkbox", "checkbox": true},
            "Chapter": {"type": "select", "select": {"name": "Chapter 1"}},
            "Next Event": {"type": "relation", "relation": [
                {"id": "rec-b"}, {"id": "rec-a"}
            ]}
        }
    }));

    assert_eq!(entry.property("Name").as_text(), "The Gate Opens");
    assert_eq!(entry.property("Summary").as_text(), "the gate opens");
    assert_eq!(entry.property("URL").as_text(), "https://example.test/gate");
    assert_eq!(entry.property("Chapter Heading"), PropertyValue::Flag(true));
    assert_eq!(entry.property("Chapter").as_text(), "Chapter 1");
    assert_eq!(
        entry.property("Next Event").into_ids(),
        vec!["rec-b".to_string(), "rec-a".to_string()]
    );
}

#[test]
fn null_and_absent_payloads_extract_to_empty_text() {
    let entry = decode_entry(serde_json::json!({
        "id": "rec-1",
        "properties": {
            "URL": {"type": "url", "url": null},
            "Chapter": {"type": "select", "select": null},
            "Name": {"type": "title", "title": []}
        }
    }));

    assert_eq!(entry.property("URL"), PropertyValue::empty());
    assert_eq!(entry.property("Chapter"), PropertyValue::empty());
    assert_eq!(entry.property("Name"), PropertyValue::empty());
    assert_eq!(entry.property("No Such Property"), PropertyValue::empty());
}

#[test]
fn unrecognized_discriminators_extract_to_empty_text() {
    let entry = decode_entry(serde_json::json!({
        "id": "rec-2",
        "properties": {
            "Stamp": {"type": "created_time", "created_time": "2026-01-01T00:00:00Z"},
            "People": {"type": "people", "people": [{"id": "someone"}]}
        }
    }));

    assert_eq!(entry.properties["Stamp"], Property::Unknown);
    assert_eq!(entry.properties["People"], Property::Unknown);
    assert_eq!(entry.property("Stamp"), PropertyValue::empty());
    assert_eq!(entry.property("People"), PropertyValue::empty());
}

#[test]
fn entry_without_properties_key_decodes_to_empty_bag() {
    let entry = decode_entry(serde_json::json!({"id": "rec-3"}));
    assert!(entry.properties.is_empty());
    assert_eq!(
        extract_property_value(&entry.properties, "Name"),
        PropertyValue::empty()
    );
}

#[test]
fn entries_round_trip_through_json() {
    let entry = decode_entry(serde_json::json!({
        "id": "rec-4",
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": "Round Trip"}]},
            "Chapter Heading": {"type": "checkbox", "checkbox": false}
        }
    }));

    let encoded = serde_json::to_string(&entry).expect("entry should encode");
    let decoded: Entry = serde_json::from_str(&encoded).expect("entry should decode back");
    assert_eq!(decoded, entry);
}
