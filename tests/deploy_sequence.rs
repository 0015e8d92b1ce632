//! Deployment workflow integration tests — full spawn → Eval → Init
//! sequences against the recording gateway.

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ao_deploy::deploy::{Deployment, DeploymentState};
use ao_deploy::gateway::mock::{FakeSigner, GatewayCall, RecordingGateway};
use ao_deploy::gateway::ActionResult;
use ao_deploy::tags::Tag;
use ao_deploy::types::{DeployConfig, InitSettings, ModuleId};

fn test_config(init: Option<InitSettings>) -> DeployConfig {
    DeployConfig {
        process_name: "collection".to_string(),
        app_name: "Cheese-Mint".to_string(),
        key_path: PathBuf::from("wallet.json"),
        scheduler: "scheduler-address".to_string(),
        authority: "authority-address".to_string(),
        module: ModuleId::from_string("module-1".to_string()).unwrap(),
        source_path: PathBuf::from("process.lua"),
        init,
        mu_url: "http://127.0.0.1:1".to_string(),
        cu_url: "http://127.0.0.1:1".to_string(),
    }
}

fn init_settings(delay_ms: u64) -> InitSettings {
    InitSettings {
        data: "0123456789".to_string(),
        delay: Duration::from_millis(delay_ms),
    }
}

fn deployment(
    gateway: &Arc<RecordingGateway>,
    init: Option<InitSettings>,
) -> Deployment {
    Deployment::new(
        gateway.clone(),
        test_config(init),
        Arc::new(FakeSigner::new()),
    )
}

#[tokio::test]
async fn deploy_without_init_stops_after_eval() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, None);

    let process_id = deployment.run("Handlers.add('info')").await.unwrap();
    assert_eq!(deployment.state(), DeploymentState::Evaluated);
    assert_eq!(deployment.process_id().unwrap(), &process_id);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], GatewayCall::Spawn { .. }));
    let GatewayCall::Message { target, data, .. } = &calls[1] else {
        panic!("expected the Eval message");
    };
    assert_eq!(target, &process_id);
    assert_eq!(data.as_deref(), Some("Handlers.add('info')"));
}

#[tokio::test]
async fn spawn_carries_identity_tags_in_order() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, None);
    deployment.run("source").await.unwrap();

    let calls = gateway.calls();
    let GatewayCall::Spawn {
        module,
        scheduler,
        tags,
        data,
        ..
    } = &calls[0]
    else {
        panic!("expected the spawn call");
    };

    assert_eq!(module, "module-1");
    assert_eq!(scheduler, "scheduler-address");
    assert_eq!(data, "Search the Permaweb at wuzzy.arweave.net!");

    assert_eq!(tags[0], Tag::new("App-Name", "Cheese-Mint"));
    assert_eq!(tags[1], Tag::new("Contract-Name", "collection"));
    assert_eq!(tags[2], Tag::new("Authority", "authority-address"));
    assert_eq!(tags[3].name, "Spawn-Timestamp");
    assert!(tags[3].value.parse::<i64>().is_ok());
}

#[tokio::test]
async fn eval_tags_lead_with_action() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, None);
    deployment.run("source").await.unwrap();

    let calls = gateway.calls();
    let GatewayCall::Message { tags, .. } = &calls[1] else {
        panic!("expected the Eval message");
    };
    assert_eq!(
        tags,
        &vec![
            Tag::new("Action", "Eval"),
            Tag::new("App-Name", "Cheese-Mint"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn init_waits_at_least_the_settling_delay() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, Some(init_settings(5_000)));

    deployment.run("source").await.unwrap();
    assert_eq!(deployment.state(), DeploymentState::Initialized);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    let GatewayCall::Message { at: eval_at, .. } = &calls[1] else {
        panic!("expected the Eval message");
    };
    let GatewayCall::Message { at: init_at, tags, data, .. } = &calls[2] else {
        panic!("expected the Init message");
    };

    assert!(init_at.duration_since(*eval_at) >= Duration::from_millis(5_000));
    assert_eq!(tags, &vec![Tag::new("Action", "Init")]);
    assert_eq!(data.as_deref(), Some("0123456789"));
}

#[tokio::test(start_paused = true)]
async fn init_logical_error_is_not_fatal() {
    let result: ActionResult =
        serde_json::from_str(r#"{"Error": "Init handler rejected the payload"}"#).unwrap();
    let gateway = Arc::new(RecordingGateway::new().with_message_result(result));
    let mut deployment = deployment(&gateway, Some(init_settings(1_000)));

    // The deployment still reports complete: the dispatch succeeded at the
    // transport level, only the handler complained.
    deployment.run("source").await.unwrap();
    assert_eq!(deployment.state(), DeploymentState::Initialized);
    assert_eq!(gateway.message_count(), 2);
}

#[tokio::test]
async fn spawn_failure_attempts_no_eval() {
    let gateway = Arc::new(RecordingGateway::new().with_spawn_error("mu unreachable"));
    let mut deployment = deployment(&gateway, None);

    let err = deployment.run("source").await.unwrap_err();
    assert!(err.to_string().contains("mu unreachable"));
    assert_eq!(deployment.state(), DeploymentState::Failed);
    assert_eq!(gateway.message_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn eval_failure_attempts_no_init() {
    let gateway = Arc::new(RecordingGateway::new().with_message_error("mu rejected the item"));
    let mut deployment = deployment(&gateway, Some(init_settings(1_000)));

    let err = deployment.run("source").await.unwrap_err();
    assert!(err.to_string().contains("mu rejected the item"));
    // The process exists but is non-functional; reported, not retried.
    assert_eq!(deployment.state(), DeploymentState::Failed);
    assert_eq!(gateway.message_count(), 1);
}

#[tokio::test]
async fn phases_cannot_run_out_of_order() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, Some(init_settings(1_000)));

    // Eval before spawn.
    assert!(deployment.evaluate("source").await.is_err());
    assert!(gateway.calls().is_empty());

    // Init before Eval.
    deployment.spawn().await.unwrap();
    assert!(deployment.initialize().await.is_err());
    assert_eq!(gateway.message_count(), 0);
}

#[tokio::test]
async fn initialize_requires_init_settings() {
    let gateway = Arc::new(RecordingGateway::new());
    let mut deployment = deployment(&gateway, None);
    deployment.spawn().await.unwrap();
    deployment.evaluate("source").await.unwrap();

    let err = deployment.initialize().await.unwrap_err();
    assert!(err.to_string().contains("init settings"));
}
