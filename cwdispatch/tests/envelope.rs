//! Envelope parsing and detail decoding.

mod common;

use common::{Fictitious, InstanceOnly, StateChange, fixture};
use cwdispatch::{EventEnvelope, RawValue, Shape, payload};
use serde_json::json;

#[test]
fn parses_fixture_envelope() {
    let envelope = EventEnvelope::from_slice(&fixture("fictitious-event.json")).unwrap();
    assert_eq!(envelope.version(), "0");
    assert_eq!(envelope.source(), "aws.fiction");
    assert_eq!(envelope.detail_type(), "Fictitious Event");
    assert_eq!(envelope.region(), "us-west-7");
    assert_eq!(
        envelope.time().unwrap().to_rfc3339(),
        "2019-06-16T22:20:01+00:00"
    );

    let detail: Fictitious = payload::decode(envelope.detail()).unwrap();
    assert_eq!(detail.biscuit, "flaky");
    assert_eq!(detail.tags.len(), 3);
}

#[test]
fn unknown_detail_fields_are_ignored() {
    let detail = json!({
        "instanceId": "i-1",
        "state": "running",
        "availabilityZone": "us-east-1a",
        "tags": {"team": "ops"}
    });
    let decoded: StateChange = payload::decode(&detail).unwrap();
    assert_eq!(decoded.instance_id, "i-1");
}

#[test]
fn reencoding_keeps_every_known_field() {
    let detail = json!({"instanceId": "i-1", "state": "stopped", "extra": [1, 2, 3]});

    let full: StateChange = payload::decode(&detail).unwrap();
    let partial: InstanceOnly = payload::decode(&detail).unwrap();

    for encoded in [payload::encode(&full).unwrap(), payload::encode(&partial).unwrap()] {
        let RawValue::Object(fields) = &encoded else {
            panic!("expected object, got {encoded}");
        };
        for (key, value) in fields {
            assert_eq!(Some(value), detail.get(key), "field {key}");
        }
    }
    assert_eq!(payload::encode(&full).unwrap().as_object().unwrap().len(), 2);
}

#[test]
fn wrong_shape_is_a_decode_error() {
    let err = payload::decode::<StateChange>(&json!("i-1")).unwrap_err();
    assert_eq!(err.actual_shape, Shape::String);
    assert!(err.expected_type.ends_with("StateChange"));

    let err = payload::decode::<StateChange>(&json!({"instanceId": 7, "state": "x"})).unwrap_err();
    assert_eq!(err.actual_shape, Shape::Object);
}

#[test]
fn object_keys_keep_their_order() {
    let raw = payload::parse(br#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn null_detail_is_still_an_event() {
    let envelope =
        EventEnvelope::from_slice(br#"{"source": "custom.app", "detail-type": "Ping", "detail": null}"#)
            .unwrap();
    assert!(envelope.detail().is_null());
    let unit: Option<StateChange> = payload::decode(envelope.detail()).unwrap();
    assert_eq!(unit, None);
}
