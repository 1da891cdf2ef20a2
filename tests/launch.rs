mod common;
use crate::common::{at, init_tracing, launcher, ContainerBuilder, TestResult};

use std::sync::Arc;

use tugbot::client::{MockCall, MockClient, RegistryAuth};
use tugbot::container::labels::LABEL_CREATED_FROM;
use tugbot::container::ContainerState;
use tugbot::errors::TugbotError;
use tugbot::launch::{clone_name, clone_request, rewrite_link, LaunchSettings, Launcher};

#[test]
fn clone_name_uses_prefix_source_and_second_timestamp() {
    let name = clone_name("tugbot_", "api-tests", at(2024, 3, 9, 7, 5, 1));
    assert_eq!(name, "tugbot_api-tests_20240309070501");
}

#[test]
fn clone_names_differ_across_seconds_but_collide_within_one() {
    let a = clone_name("tugbot_", "suite", at(2024, 1, 1, 0, 0, 0));
    let b = clone_name("tugbot_", "suite", at(2024, 1, 1, 0, 0, 1));
    let c = clone_name("tugbot_", "suite", at(2024, 1, 1, 0, 0, 1));
    assert_ne!(a, b);
    assert_eq!(b, c);
}

#[test]
fn rewrite_link_keeps_last_alias_segment() {
    assert_eq!(rewrite_link("/db:/suite/db"), "/db:db");
    assert_eq!(rewrite_link("cache:redis"), "cache:redis");
    assert_eq!(rewrite_link("name:alias/suffix"), "name:suffix");
}

#[test]
fn rewrite_link_never_produces_an_empty_alias() {
    assert_eq!(rewrite_link("name:alias/"), "name:alias");
    assert_eq!(rewrite_link("/db:/suite/db/"), "/db:db");
    assert_eq!(rewrite_link("name:/"), "name:/");
}

#[test]
fn rewrite_link_without_colon_is_unchanged() {
    assert_eq!(rewrite_link("standalone"), "standalone");
}

#[test]
fn clone_request_copies_config_and_stamps_provenance() {
    let source = ContainerBuilder::test("suite")
        .image("registry.local/tests:2")
        .cmd(&["pytest", "-q"])
        .env("TARGET=staging")
        .label("team", "qa")
        .link("/db:/suite/db")
        .bind("/data:/data:ro")
        .build();

    let request = clone_request(&source, "tugbot_suite_1".to_string());

    assert_eq!(request.name, "tugbot_suite_1");
    assert_eq!(request.config.image, "registry.local/tests:2");
    assert_eq!(
        request.config.cmd,
        Some(vec!["pytest".to_string(), "-q".to_string()])
    );
    assert_eq!(request.config.env, Some(vec!["TARGET=staging".to_string()]));
    assert_eq!(request.config.labels.get("team").map(String::as_str), Some("qa"));
    assert_eq!(
        request.config.labels.get(LABEL_CREATED_FROM).map(String::as_str),
        Some("suite")
    );
    assert_eq!(request.host_config.links, vec!["/db:db".to_string()]);
    assert_eq!(
        request.host_config.binds,
        Some(vec!["/data:/data:ro".to_string()])
    );

    // The source snapshot itself is untouched.
    assert!(!source.labels().contains_key(LABEL_CREATED_FROM));
}

#[tokio::test]
async fn launch_creates_then_starts_clone() -> TestResult {
    init_tracing();
    let mock = MockClient::new();
    let source = ContainerBuilder::test("suite").build();

    let id = launcher(&mock)
        .launch_at(&source, at(2024, 5, 1, 12, 0, 0))
        .await?;

    assert_eq!(
        mock.calls(),
        vec![
            MockCall::Create("tugbot_suite_20240501120000".to_string()),
            MockCall::Start(id.clone()),
        ]
    );

    let clone = mock.container(&id).ok_or("clone missing")?;
    assert_eq!(clone.state(), ContainerState::Running);
    assert!(clone.is_created_by_tugbot());
    assert_eq!(clone.name(), "tugbot_suite_20240501120000");
    Ok(())
}

#[tokio::test]
async fn create_failure_is_returned_verbatim_without_start() {
    init_tracing();
    let mock = MockClient::new();
    mock.fail_create("suite");
    let source = ContainerBuilder::test("suite").build();

    let err = launcher(&mock)
        .launch(&source)
        .await
        .expect_err("create should fail");

    match err {
        TugbotError::EngineError(msg) => assert!(msg.contains("create failed")),
        other => panic!("Expected EngineError, got: {other:?}"),
    }
    assert_eq!(mock.count(|c| matches!(c, MockCall::Create(_))), 1);
    assert!(mock.started().is_empty());
}

#[tokio::test]
async fn start_failure_is_returned_without_retry() {
    let mock = MockClient::new();
    mock.fail_start();
    let source = ContainerBuilder::test("suite").build();

    let err = launcher(&mock).launch(&source).await;

    assert!(matches!(err, Err(TugbotError::EngineError(_))));
    assert_eq!(mock.count(|c| matches!(c, MockCall::Create(_))), 1);
    assert!(mock.started().is_empty());
}

#[tokio::test]
async fn complete_credentials_are_sent_with_create() -> TestResult {
    let mock = MockClient::new();
    let auth = RegistryAuth {
        username: "bot".to_string(),
        password: "hunter2".to_string(),
        email: "bot@example.com".to_string(),
    };
    let launcher = Launcher::new(
        Arc::new(mock.clone()),
        LaunchSettings {
            registry: auth.clone(),
            ..Default::default()
        },
    );

    launcher
        .launch(&ContainerBuilder::test("suite").build())
        .await?;

    assert_eq!(mock.auths(), vec![Some(auth)]);
    Ok(())
}

#[tokio::test]
async fn partial_credentials_are_not_sent() -> TestResult {
    let mock = MockClient::new();
    let launcher = Launcher::new(
        Arc::new(mock.clone()),
        LaunchSettings {
            registry: RegistryAuth {
                username: "bot".to_string(),
                password: "hunter2".to_string(),
                email: String::new(),
            },
            ..Default::default()
        },
    );
    assert!(launcher.auth().is_none());

    launcher
        .launch(&ContainerBuilder::test("suite").build())
        .await?;

    assert_eq!(mock.auths(), vec![None]);
    Ok(())
}

#[tokio::test]
async fn custom_prefix_is_used() -> TestResult {
    let mock = MockClient::new();
    let launcher = Launcher::new(
        Arc::new(mock.clone()),
        LaunchSettings {
            name_prefix: "ci-".to_string(),
            ..Default::default()
        },
    );

    launcher
        .launch_at(&ContainerBuilder::test("suite").build(), at(2025, 12, 31, 23, 59, 59))
        .await?;

    let created = mock.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "ci-suite_20251231235959");
    Ok(())
}

#[test]
fn registry_auth_debug_redacts_password() {
    let auth = RegistryAuth {
        username: "bot".to_string(),
        password: "hunter2".to_string(),
        email: "bot@example.com".to_string(),
    };
    let printed = format!("{auth:?}");
    assert!(!printed.contains("hunter2"));
    assert!(printed.contains("bot@example.com"));
}
