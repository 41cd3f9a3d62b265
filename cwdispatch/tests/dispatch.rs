//! End-to-end dispatch of raw messages.

mod common;

use common::{Fictitious, InstanceOnly, STATE_CHANGE, StateChange, fixture, init_tracing};
use cwdispatch::{
    BoxError, Context, DispatchError, DispatchMode, DispatchResult, Dispatcher, DispatcherConfig,
    EnvelopeError, FailureKind, Json, RawValue, Registry,
    testing::{FailingHandler, PanickingHandler, RecordingHandler, SlowHandler, envelope_json},
};
use serde_json::json;
use std::time::{Duration, Instant};

fn dispatcher(registry: Registry) -> Dispatcher {
    init_tracing();
    Dispatcher::new(registry)
}

#[tokio::test]
async fn exact_match_succeeds_with_one_outcome() {
    let recorder = RecordingHandler::<StateChange>::new();
    let mut registry = Registry::new();
    registry
        .register::<StateChange, _>("aws.ec2", STATE_CHANGE, recorder.clone())
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req-1"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.outcomes().len(), 1);
    assert_eq!(
        recorder.payloads(),
        [StateChange {
            instance_id: "i-1".into(),
            state: "running".into(),
        }]
    );
    assert_eq!(recorder.request_ids(), ["req-1"]);
}

#[tokio::test]
async fn unmatched_source_is_no_match() {
    let recorder = RecordingHandler::<RawValue>::new();
    let mut registry = Registry::new();
    registry
        .register::<RawValue, _>("aws.s3", "*", recorder.clone())
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
        .await
        .unwrap();

    assert!(matches!(result, DispatchResult::NoMatch));
    assert!(!result.is_failure());
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn unknown_detail_type_is_no_match() {
    let mut registry = Registry::new();
    registry
        .register::<Fictitious, _>("aws.fiction", "Fictitious Event", |_: Fictitious, _: Context| async {})
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("unknown-event.json"), Context::new("req"))
        .await
        .unwrap();
    assert!(result.is_no_match());
}

#[tokio::test]
async fn exact_detail_type_excludes_wildcard() {
    let exact = RecordingHandler::<StateChange>::new();
    let wildcard = RecordingHandler::<StateChange>::new();
    let mut registry = Registry::new();
    registry
        .register::<StateChange, _>("aws.ec2", "EC2*", wildcard.clone())
        .unwrap()
        .register::<StateChange, _>("aws.ec2", STATE_CHANGE, exact.clone())
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.outcomes().len(), 1);
    assert_eq!(result.outcomes()[0].registration.detail_type, STATE_CHANGE);
    assert_eq!(exact.count(), 1);
    assert_eq!(wildcard.count(), 0);
}

#[tokio::test]
async fn missing_required_field_is_decode_failure() {
    let mut registry = Registry::new();
    registry
        .register::<StateChange, _>("aws.ec2", STATE_CHANGE, |_: StateChange, _: Context| async {})
        .unwrap();

    let message = envelope_json("aws.ec2", STATE_CHANGE, json!({"state": "running"}));
    let result = dispatcher(registry)
        .dispatch(message.as_bytes(), Context::new("req"))
        .await
        .unwrap();

    assert!(result.is_failure());
    assert_eq!(result.successes().count(), 0);
    let failure = result.outcomes()[0].status.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::DecodeFailed);
    assert!(failure.message.contains("instanceId"), "{}", failure.message);
}

#[tokio::test]
async fn envelope_errors_are_fatal() {
    let recorder = RecordingHandler::<Fictitious>::new();
    let mut registry = Registry::new();
    registry
        .register::<Fictitious, _>("*", "*", recorder.clone())
        .unwrap();
    let dispatcher = dispatcher(registry);

    let err = dispatcher
        .dispatch(&fixture("missing-detail-type.json"), Context::new("req"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Envelope(EnvelopeError::MissingField("detail-type"))
    ));

    let err = dispatcher
        .dispatch(&fixture("missing-detail.json"), Context::new("req"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "received message is not an event (missing \"detail\" property)"
    );

    let err = dispatcher
        .dispatch(b"xyz", Context::new("req"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to parse message as JSON");

    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn reads_header_and_detail() {
    let mut registry = Registry::new();
    registry
        .register::<Fictitious, _>(
            "aws.fiction",
            "Fictitious Event",
            |event: Fictitious, ctx: Context| async move {
                assert_eq!(ctx.function_name(), Some("bakery"));
                let header = ctx.header().expect("dispatcher attaches the header");
                assert_eq!(header.version(), "0");
                assert_eq!(header.id(), "85085726-4d64-918b-c9bb-62b172316c7c");
                assert_eq!(header.detail_type(), "Fictitious Event");
                assert_eq!(header.source(), "aws.fiction");
                assert_eq!(header.account(), "261421242815");
                assert_eq!(
                    header.time().map(|t| t.to_rfc3339()),
                    Some("2019-06-16T22:20:01+00:00".to_string())
                );
                assert_eq!(header.region(), "us-west-7");
                assert_eq!(
                    header.resources(),
                    ["arn:aws:fiction:us-west-7:261421242815:item/path"]
                );
                assert_eq!(event.tags.get("Bakery"), Some("north"));
                assert_eq!(event.tags.get("Batch"), Some("42"));
                assert!(event.tags.contains_key("Glazed"));
                event.biscuit
            },
        )
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(
            &fixture("fictitious-event.json"),
            Context::new("req").with_function_name("bakery"),
        )
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.outcomes()[0].status.value(), Some(&json!("flaky")));
}

#[tokio::test]
async fn reads_long_message() {
    let original = fixture("fictitious-event.json");
    let mut message = vec![original[0]];
    message.extend(std::iter::repeat_n(b' ', 100_000));
    message.extend_from_slice(&original[1..]);

    let mut registry = Registry::new();
    registry
        .register::<Fictitious, _>("aws.fiction", "Fictitious Event", |e: Fictitious, _: Context| async move {
            assert_eq!(e.biscuit, "flaky");
        })
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&message, Context::new("req"))
        .await
        .unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn failing_handler_does_not_stop_siblings() {
    for mode in [DispatchMode::Concurrent, DispatchMode::Sequential] {
        let recorder = RecordingHandler::<StateChange>::new();
        let failing = FailingHandler::new("throttled");
        let mut registry = Registry::new();
        registry
            .register::<RawValue, _>("aws.ec2", "*", failing.clone())
            .unwrap()
            .register::<StateChange, _>("*", STATE_CHANGE, recorder.clone())
            .unwrap()
            .register::<RawValue, _>("aws.*", "EC2 Instance*", PanickingHandler::new("bug"))
            .unwrap();

        init_tracing();
        let result = Dispatcher::with_config(registry, DispatcherConfig::new().with_mode(mode))
            .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
            .await
            .unwrap();

        assert!(result.is_failure(), "{mode:?}");
        let statuses: Vec<_> = result
            .outcomes()
            .iter()
            .map(|o| (o.registration.index, o.status.failure().map(|f| f.message.clone())))
            .collect();
        assert_eq!(
            statuses,
            [
                (0, Some("throttled".to_string())),
                (1, None),
                (2, Some("handler panicked: bug".to_string())),
            ]
        );
        assert_eq!(failing.count(), 1);
        assert_eq!(recorder.count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn outcome_order_follows_registration_not_completion() {
    let mut registry = Registry::new();
    registry
        .register::<RawValue, _>("aws.ec2", "*", |_: RawValue, _: Context| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "slow".to_string()
        })
        .unwrap()
        .register::<RawValue, _>("*", STATE_CHANGE, |_: RawValue, _: Context| async {
            "fast".to_string()
        })
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
        .await
        .unwrap();

    let values: Vec<_> = result
        .outcomes()
        .iter()
        .map(|o| o.status.value().cloned())
        .collect();
    assert_eq!(values, [Some(json!("slow")), Some(json!("fast"))]);
}

#[tokio::test]
async fn concurrent_handlers_overlap() {
    let slow = SlowHandler::new(Duration::from_millis(200));
    let mut registry = Registry::new();
    registry
        .register::<RawValue, _>("aws.ec2", "*", slow.clone())
        .unwrap()
        .register::<RawValue, _>("*", STATE_CHANGE, slow.clone())
        .unwrap();

    let started = Instant::now();
    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(slow.completed(), 2);
    assert!(started.elapsed() < Duration::from_millis(390));
}

#[tokio::test]
async fn sequential_mode_stops_starting_handlers_after_deadline() {
    let slow = SlowHandler::new(Duration::from_millis(100));
    let recorder = RecordingHandler::<RawValue>::new();
    let mut registry = Registry::new();
    registry
        .register::<RawValue, _>("aws.ec2", "*", slow.clone())
        .unwrap()
        .register::<RawValue, _>("*", STATE_CHANGE, recorder.clone())
        .unwrap();

    init_tracing();
    let dispatcher = Dispatcher::with_config(
        registry,
        DispatcherConfig::new().with_mode(DispatchMode::Sequential),
    );
    let ctx = Context::new("req").with_timeout(Duration::from_millis(20));
    let result = dispatcher
        .dispatch(&fixture("ec2-state-change.json"), ctx)
        .await
        .unwrap();

    // The first handler was already running and is allowed to finish.
    assert!(result.outcomes()[0].is_success());
    assert_eq!(slow.completed(), 1);
    assert_eq!(
        result.outcomes()[1].status.failure().unwrap().kind,
        FailureKind::DeadlineExceeded
    );
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn handlers_return_json_results() {
    #[derive(serde::Serialize)]
    struct Ack {
        instance: String,
        seen: bool,
    }

    let mut registry = Registry::new();
    registry
        .register::<InstanceOnly, _>("aws.ec2", STATE_CHANGE, |d: InstanceOnly, _: Context| async move {
            Ok::<_, BoxError>(Json(Ack {
                instance: d.instance_id,
                seen: true,
            }))
        })
        .unwrap();

    let result = dispatcher(registry)
        .dispatch(&fixture("ec2-state-change.json"), Context::new("req"))
        .await
        .unwrap();

    assert_eq!(
        result.outcomes()[0].status.value(),
        Some(&json!({"instance": "i-1", "seen": true}))
    );
    let report = serde_json::to_value(&result).unwrap();
    assert_eq!(report["result"], "all_succeeded");
    assert_eq!(report["outcomes"][0]["registration"]["name"], "InstanceOnly");
}

#[tokio::test]
async fn raw_message_is_logged_when_enabled() {
    let logs = common::CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(logs.subscriber());

    let mut registry = Registry::new();
    registry
        .register::<Fictitious, _>("aws.fiction", "*", |_: Fictitious, _: Context| async {})
        .unwrap();
    let dispatcher = Dispatcher::with_config(
        registry,
        DispatcherConfig::new().with_log_raw_message(true),
    );

    let message = fixture("single-line-event.json.txt");
    let text = String::from_utf8(message.clone()).unwrap();
    dispatcher
        .dispatch(&message, Context::new("req"))
        .await
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("raw message"), "{output}");
    assert!(output.contains(text.trim()), "{output}");
}
