//! Action-message tool integration tests — dispatch and interpretation
//! against the recording gateway.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use ao_deploy::dispatch::{DispatchMode, Dispatcher};
use ao_deploy::gateway::mock::{FakeSigner, GatewayCall, RecordingGateway};
use ao_deploy::gateway::ActionResult;
use ao_deploy::interpret::{classify, Disposition};
use ao_deploy::tags::Tag;
use ao_deploy::types::ProcessId;

fn target() -> ProcessId {
    ProcessId::from_string("existing-process".to_string()).unwrap()
}

#[tokio::test]
async fn repeated_dry_runs_leave_no_persisted_effects() {
    let result: ActionResult =
        serde_json::from_str(r#"{"Messages": [{"Data": "name: wuzzy"}]}"#).unwrap();
    let gateway = Arc::new(RecordingGateway::new().with_dry_run_result(result));
    let dispatcher = Dispatcher::new(gateway.clone());

    for _ in 0..2 {
        let outcome = dispatcher
            .dispatch(&target(), "Info", &[], None, DispatchMode::Simulate)
            .await
            .unwrap();
        assert!(outcome.message_id().is_none());

        let Disposition::Success(data) = classify(Ok(outcome)) else {
            panic!("expected success");
        };
        assert_eq!(data, "name: wuzzy");
    }

    // Both calls were read-only projections.
    assert_eq!(gateway.message_count(), 0);
    assert_eq!(gateway.calls().len(), 2);
}

#[tokio::test]
async fn committed_write_yields_a_message_id() {
    let gateway = Arc::new(RecordingGateway::new());
    let dispatcher = Dispatcher::new(gateway.clone());
    let signer = FakeSigner::new();

    let outcome = dispatcher
        .dispatch(
            &target(),
            "Transfer",
            &[Tag::new("Recipient", "abc"), Tag::new("Quantity", "100")],
            None,
            DispatchMode::Commit(&signer),
        )
        .await
        .unwrap();

    assert_eq!(outcome.message_id().unwrap().as_str(), "message-1");
    assert_eq!(gateway.message_count(), 1);
}

#[tokio::test]
async fn caller_tags_follow_the_action_tag_unmodified() {
    let gateway = Arc::new(RecordingGateway::new());
    let dispatcher = Dispatcher::new(gateway.clone());

    let extra = vec![
        Tag::new("Recipient", "abc"),
        Tag::new("Recipient", "abc-again"),
        Tag::new("Quantity", "100"),
    ];
    dispatcher
        .dispatch(&target(), "Transfer", &extra, None, DispatchMode::Simulate)
        .await
        .unwrap();

    let calls = gateway.calls();
    let GatewayCall::DryRun { tags, .. } = &calls[0] else {
        panic!("expected a dry-run call");
    };
    let mut expected = vec![Tag::new("Action", "Transfer")];
    expected.extend(extra);
    assert_eq!(tags, &expected);
}

#[tokio::test]
async fn handler_errors_classify_as_logical() {
    let result: ActionResult =
        serde_json::from_str(r#"{"Error": "unknown action"}"#).unwrap();
    let gateway = Arc::new(RecordingGateway::new().with_dry_run_result(result));
    let dispatcher = Dispatcher::new(gateway);

    let dispatched = dispatcher
        .dispatch(&target(), "Bogus", &[], None, DispatchMode::Simulate)
        .await;

    let Disposition::LogicalError(message) = classify(dispatched) else {
        panic!("expected a logical error");
    };
    assert_eq!(message, "unknown action");
}

#[tokio::test]
async fn empty_outbox_surfaces_the_raw_result() {
    let result: ActionResult =
        serde_json::from_str(r#"{"Output": {"data": "printed to console"}}"#).unwrap();
    let gateway = Arc::new(RecordingGateway::new().with_dry_run_result(result));
    let dispatcher = Dispatcher::new(gateway);

    let dispatched = dispatcher
        .dispatch(&target(), "Info", &[], None, DispatchMode::Simulate)
        .await;

    let Disposition::Success(data) = classify(dispatched) else {
        panic!("expected success");
    };
    assert!(data.contains("printed to console"));
}

#[tokio::test]
async fn transport_failures_classify_as_transport() {
    let gateway = Arc::new(RecordingGateway::new().with_message_error("connection reset"));
    let dispatcher = Dispatcher::new(gateway);
    let signer = FakeSigner::new();

    let dispatched = dispatcher
        .dispatch(
            &target(),
            "Transfer",
            &[],
            None,
            DispatchMode::Commit(&signer),
        )
        .await;

    let Disposition::TransportFailure(err) = classify(dispatched) else {
        panic!("expected a transport failure");
    };
    assert!(err.to_string().contains("connection reset"));
}
