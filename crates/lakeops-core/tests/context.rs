use std::sync::Arc;

use lake_state::fakes::MemoryLake;
use lake_state::{LakeConfig, LakeError};
use lakeops_core::{
    ContextApi, DocumentsApi, Guarded, InitialContextGate, OpsError, ReleaseState,
    INITIAL_CONTEXT_OPERATION,
};
use serde_json::json;

fn config() -> LakeConfig {
    LakeConfig::new("proj123")
        .with_dataset("production")
        .with_api_version("2024-05-23")
}

#[tokio::test]
async fn lists_only_active_releases() {
    let lake = Arc::new(MemoryLake::new());
    lake.stub_query(
        "releases::all()",
        json!({}),
        vec![
            json!({"_id": "_.releases.spring", "name": "spring", "state": "active",
                   "metadata": {"title": "Spring"}}),
            json!({"_id": "_.releases.summer", "name": "summer", "state": "scheduled"}),
            json!({"_id": "_.releases.someday", "name": "someday", "state": "active",
                   "metadata": {"releaseType": "undecided"}}),
            json!({"_id": "_.releases.old", "name": "old", "state": "archived"}),
            json!({"_id": "_.releases.done", "name": "done", "state": "published"}),
        ],
    );
    let gate = Arc::new(InitialContextGate::new());
    let api = ContextApi::new(lake.clone(), &config(), gate.clone());

    let context = api.initial_context().await;
    assert_eq!(context.project_id, "proj123");
    assert_eq!(context.dataset, "production");
    assert!(context.warning.is_none());

    let ids: Vec<&str> = context
        .active_releases
        .iter()
        .map(|release| release.id.as_str())
        .collect();
    assert_eq!(ids, vec!["spring", "summer", "someday"]);
    assert_eq!(context.active_releases[0].title.as_deref(), Some("Spring"));
    assert_eq!(context.active_releases[1].state, ReleaseState::Scheduled);
    assert!(gate.is_loaded());

    let wire = serde_json::to_value(&context).unwrap();
    assert_eq!(wire["projectId"], "proj123");
    assert!(wire.get("warning").is_none());
}

#[tokio::test]
async fn backend_failure_becomes_warning() {
    let lake = Arc::new(MemoryLake::new());
    lake.stub_query_error(
        "releases::all()",
        json!({}),
        LakeError::Http {
            status: 401,
            message: "Unauthorized".to_string(),
        },
    );
    let gate = Arc::new(InitialContextGate::new());
    let api = ContextApi::new(lake.clone(), &config(), gate.clone());

    let context = api.initial_context().await;
    assert_eq!(
        context.warning.as_deref(),
        Some("Could not fetch complete initial context.")
    );
    assert!(context.note.contains("SANITY_TOKEN"));
    assert!(context.active_releases.is_empty());
    assert!(gate.is_loaded());
}

#[tokio::test]
async fn missing_project_warns_without_calls() {
    let lake = Arc::new(MemoryLake::new());
    let gate = Arc::new(InitialContextGate::new());
    let api = ContextApi::new(lake.clone(), &LakeConfig::new(""), gate);

    let context = api.initial_context().await;
    assert!(context
        .warning
        .as_deref()
        .is_some_and(|w| w.contains("SANITY_PROJECT_ID")));
    assert!(lake.calls().is_empty());
}

#[tokio::test]
async fn operations_wait_for_initial_context() {
    let lake = Arc::new(MemoryLake::new());
    let gate = Arc::new(InitialContextGate::new());
    let context = ContextApi::new(lake.clone(), &config(), gate.clone());
    let documents = DocumentsApi::new(lake.clone());
    let guarded = Guarded::new(gate);

    let err = guarded
        .call("publish", || documents.publish("post-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::PreconditionFailed { .. }));
    assert!(lake.calls().is_empty());

    guarded
        .call(INITIAL_CONTEXT_OPERATION, || async {
            Ok(context.initial_context().await)
        })
        .await
        .expect("context is always allowed");

    let response = guarded
        .call("publish", || documents.publish("post-1"))
        .await
        .expect("publish after context");
    assert_eq!(response.message, "Document post-1 published successfully");
    assert_eq!(lake.dispatched_actions().len(), 1);
}
