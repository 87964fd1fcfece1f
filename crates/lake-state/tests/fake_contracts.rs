//! Contract tests for the `ContentLake` trait using the in-memory fake.

use std::sync::Arc;

use lake_state::fakes::{LakeCall, MemoryLake};
use lake_state::*;
use serde_json::json;

#[tokio::test]
async fn fetch_without_stub_returns_no_rows() {
    let lake = MemoryLake::new();
    let rows = lake.fetch(&Query::new("*[_type == 'post']")).await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(lake.fetches().len(), 1);
}

#[tokio::test]
async fn stub_matches_on_param_subset() {
    let lake = MemoryLake::new();
    lake.stub_query("*[_id == $id]", json!({"id": "a"}), vec![json!({"_id": "a"})]);

    let hit = Query::new("*[_id == $id]")
        .param("id", "a")
        .param("extra", true);
    assert_eq!(lake.fetch(&hit).await.unwrap().len(), 1);

    let miss = Query::new("*[_id == $id]").param("id", "b");
    assert!(lake.fetch(&miss).await.unwrap().is_empty());
}

#[tokio::test]
async fn stubbed_query_error_surfaces() {
    let lake = MemoryLake::new();
    lake.stub_query_error(
        "*[_id == $id]",
        json!({"id": "broken"}),
        LakeError::Transport("connection reset".to_string()),
    );

    let err = lake
        .fetch(&Query::new("*[_id == $id]").param("id", "broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, LakeError::Transport(_)));
}

#[tokio::test]
async fn mutate_reports_one_outcome_per_mutation() {
    let lake = MemoryLake::new();
    let result = lake
        .mutate(
            vec![
                Mutation::Delete { id: "a".to_string() },
                Mutation::Delete {
                    id: "drafts.a".to_string(),
                },
            ],
            Visibility::Async,
        )
        .await
        .unwrap();

    assert_eq!(result.ids(), vec!["a", "drafts.a"]);
    assert!(!result.transaction_id.is_empty());
    let commits = lake.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].1, Visibility::Async);
}

#[tokio::test]
async fn convenience_calls_commit_single_mutation() {
    let lake = MemoryLake::new();
    lake.create_or_replace(Document::new("post").with_id("drafts.x"))
        .await
        .unwrap();
    lake.delete("versions.r.x", Visibility::Sync).await.unwrap();

    let commits = lake.commits();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].0[0].kind(), "createOrReplace");
    assert_eq!(
        commits[1].0,
        vec![Mutation::Delete {
            id: "versions.r.x".to_string()
        }]
    );
}

#[tokio::test]
async fn injected_failures_still_record_the_call() {
    let lake = MemoryLake::new();
    lake.fail_actions(LakeError::Http {
        status: 409,
        message: "Conflict".to_string(),
    });

    let err = lake
        .perform_actions(vec![Action::ReleasePublish {
            release_id: "r".to_string(),
        }])
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(lake.dispatched_actions().len(), 1);
}

#[tokio::test]
async fn arc_wrapped_lake_forwards_calls() {
    let lake = Arc::new(MemoryLake::new());
    let shared: Arc<MemoryLake> = Arc::clone(&lake);

    shared
        .perform_actions(vec![Action::ReleaseArchive {
            release_id: "r".to_string(),
        }])
        .await
        .unwrap();

    assert!(matches!(lake.calls()[0], LakeCall::Actions(_)));
}
