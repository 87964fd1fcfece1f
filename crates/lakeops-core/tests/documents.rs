//! Document operations against the in-memory lake.

use std::sync::Arc;

use lake_state::fakes::MemoryLake;
use lake_state::{Action, Content, LakeError, Mutation, Visibility};
use lakeops_core::documents::DOCUMENT_CONTENT_QUERY;
use lakeops_core::{
    CreateOptions, DeleteOptions, DocumentsApi, EditOutcome, IfExists, OneOrMany, OpsError,
    PatchOperations, Targets, ValidationError,
};
use serde_json::{json, Value};

fn setup() -> (Arc<MemoryLake>, DocumentsApi<Arc<MemoryLake>>) {
    let lake = Arc::new(MemoryLake::new());
    let api = DocumentsApi::new(lake.clone());
    (lake, api)
}

fn content(value: Value) -> Content {
    value.as_object().cloned().expect("object literal")
}

fn delete_ids(mutations: &[Mutation]) -> Vec<&str> {
    mutations
        .iter()
        .map(|m| match m {
            Mutation::Delete { id } => id.as_str(),
            other => panic!("expected delete, got {}", other.kind()),
        })
        .collect()
}

// ---- publish / unpublish ----

#[tokio::test]
async fn publish_single_dispatches_one_action() {
    let (lake, api) = setup();

    let response = api.publish("drafts.post-1").await.expect("publish");
    assert!(response.success);
    assert_eq!(response.message, "Document post-1 published successfully");
    assert_eq!(response.targets, Targets::Document("post-1".to_string()));

    let dispatched = lake.dispatched_actions();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(
        dispatched[0],
        vec![Action::Publish {
            draft_id: "drafts.post-1".to_string(),
            published_id: "post-1".to_string(),
        }]
    );
}

#[tokio::test]
async fn publish_many_uses_one_dispatch() {
    let (lake, api) = setup();

    let response = api.publish(vec!["a", "drafts.b"]).await.expect("publish");
    assert_eq!(response.message, "Published 2 documents successfully");
    assert_eq!(
        response.targets,
        Targets::Documents(vec!["a".to_string(), "b".to_string()])
    );

    let dispatched = lake.dispatched_actions();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].len(), 2);
}

#[tokio::test]
async fn publish_without_ids_fails_before_io() {
    let (lake, api) = setup();

    let err = api.publish(vec!["", "  "]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to publish document: No valid document IDs provided"
    );
    assert!(lake.calls().is_empty());
}

#[tokio::test]
async fn publish_backend_failure_is_annotated() {
    let (lake, api) = setup();
    lake.fail_actions(LakeError::Http {
        status: 409,
        message: "Draft not found".to_string(),
    });

    let err = api.publish("post-1").await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Failed to publish document: "));
    assert!(msg.contains("Draft not found"));
    assert_eq!(err.lake_error().and_then(LakeError::status), Some(409));
}

#[tokio::test]
async fn unpublish_reports_draft_ids() {
    let (lake, api) = setup();

    let single = api.unpublish("post-1").await.expect("unpublish");
    assert_eq!(single.message, "Document post-1 unpublished successfully");
    assert_eq!(single.targets, Targets::Draft("drafts.post-1".to_string()));

    let many = api.unpublish(vec!["a", "b"]).await.expect("unpublish");
    assert_eq!(many.message, "Unpublished 2 documents successfully");
    assert_eq!(
        many.targets,
        Targets::Drafts(vec!["drafts.a".to_string(), "drafts.b".to_string()])
    );

    assert_eq!(
        lake.dispatched_actions()[1],
        vec![
            Action::Unpublish {
                document_id: "a".to_string()
            },
            Action::Unpublish {
                document_id: "b".to_string()
            },
        ]
    );
}

// ---- create / replace ----

#[tokio::test]
async fn create_single_forces_draft_id() {
    let (lake, api) = setup();

    let response = api
        .create(
            OneOrMany::One(content(json!({"_type": "post", "_id": "p1", "title": "Hello"}))),
            CreateOptions::default(),
        )
        .await
        .expect("create");
    assert_eq!(
        response.message,
        "Document created successfully with ID: drafts.p1"
    );

    let commits = lake.commits();
    assert_eq!(commits.len(), 1);
    match &commits[0].0[..] {
        [Mutation::Create(doc)] => {
            assert_eq!(doc.id.as_deref(), Some("drafts.p1"));
            assert_eq!(doc.title(), Some("Hello"));
        }
        other => panic!("unexpected mutations: {:?}", other),
    }
}

#[tokio::test]
async fn create_ignore_uses_create_if_not_exists() {
    let (lake, api) = setup();

    api.create(
        OneOrMany::One(content(json!({"_type": "post", "_id": "p1"}))),
        CreateOptions {
            if_exists: IfExists::Ignore,
        },
    )
    .await
    .expect("create");

    let commits = lake.commits();
    assert_eq!(commits[0].0[0].kind(), "createIfNotExists");
}

#[tokio::test]
async fn create_many_is_one_transaction_and_all_or_nothing() {
    let (lake, api) = setup();

    let response = api
        .create(
            OneOrMany::Many(vec![
                content(json!({"_type": "post", "_id": "a"})),
                content(json!({"_type": "post", "_id": "drafts.b"})),
            ]),
            CreateOptions::default(),
        )
        .await
        .expect("create");
    assert_eq!(response.message, "2 documents created successfully");
    assert_eq!(
        response.targets,
        Targets::Documents(vec!["drafts.a".to_string(), "drafts.b".to_string()])
    );
    assert_eq!(lake.commits().len(), 1);

    let err = api
        .create(
            OneOrMany::Many(vec![
                content(json!({"_type": "post"})),
                content(json!({"title": "untyped"})),
            ]),
            CreateOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to create document: Document must have a _type field"
    );
    assert_eq!(lake.commits().len(), 1, "nothing committed for invalid batch");
}

#[tokio::test]
async fn create_empty_list_is_rejected() {
    let (lake, api) = setup();
    let err = api
        .create(OneOrMany::Many(vec![]), CreateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.root(),
        OpsError::Validation(ValidationError::NoDocuments)
    ));
    assert!(lake.calls().is_empty());
}

#[tokio::test]
async fn replace_draft_requires_id_and_targets_draft() {
    let (lake, api) = setup();

    let err = api
        .replace_draft(OneOrMany::One(content(json!({"_type": "post"}))))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to replace draft document: Document must have an _id field to replace"
    );
    assert!(lake.calls().is_empty());

    let response = api
        .replace_draft(OneOrMany::One(content(json!({"_type": "post", "_id": "p1"}))))
        .await
        .expect("replace");
    assert_eq!(
        response.message,
        "Draft document drafts.p1 replaced successfully"
    );

    let many = api
        .replace_draft(OneOrMany::Many(vec![
            content(json!({"_type": "post", "_id": "a"})),
            content(json!({"_type": "post", "_id": "b"})),
        ]))
        .await
        .expect("replace many");
    assert_eq!(many.message, "2 draft documents replaced successfully");

    let commits = lake.commits();
    assert_eq!(commits.len(), 2);
    let kinds: Vec<&str> = commits[1].0.iter().map(Mutation::kind).collect();
    assert_eq!(kinds, vec!["createOrReplace", "createOrReplace"]);
}

// ---- edit ----

#[tokio::test]
async fn edit_patches_every_draft_in_one_commit() {
    let (lake, api) = setup();
    let ops: PatchOperations =
        serde_json::from_value(json!({"set": {"title": "New"}})).expect("ops");

    let outcome = api.edit(vec!["a", "drafts.b"], &ops).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.message(), "Successfully edited 2 document(s)");

    let commits = lake.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].1, Visibility::Sync);
    let targets: Vec<&str> = commits[0]
        .0
        .iter()
        .filter_map(Mutation::target_id)
        .collect();
    assert_eq!(targets, vec!["drafts.a", "drafts.b"]);

    let wire = serde_json::to_value(&commits[0].0[0]).expect("serialize");
    assert_eq!(
        wire,
        json!({"patch": {"id": "drafts.a", "set": {"title": "New"}}})
    );
}

#[tokio::test]
async fn edit_reports_failure_instead_of_raising() {
    let (lake, api) = setup();
    let ops = PatchOperations::default();

    let outcome = api.edit(Vec::<String>::new(), &ops).await;
    assert_eq!(
        outcome,
        EditOutcome::failed("No valid document IDs provided")
    );
    assert!(lake.calls().is_empty());

    lake.fail_mutations(LakeError::Http {
        status: 409,
        message: "Revision mismatch".to_string(),
    });
    let outcome = api.edit("a", &ops).await;
    assert!(!outcome.is_success());
    assert!(outcome.message().contains("Revision mismatch"));
}

// ---- delete ----

#[tokio::test]
async fn delete_stages_base_and_draft_with_sync_visibility() {
    let (lake, api) = setup();

    let response = api
        .delete("foo", DeleteOptions::default())
        .await
        .expect("delete");
    assert_eq!(response.message, "Document foo deleted successfully");

    let commits = lake.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(delete_ids(&commits[0].0), vec!["foo", "drafts.foo"]);
    assert_eq!(commits[0].1, Visibility::Sync);
}

#[tokio::test]
async fn delete_purge_commits_async_with_extra_drafts() {
    let (lake, api) = setup();

    let response = api
        .delete(
            vec!["a", "b"],
            DeleteOptions {
                include_drafts: vec!["drafts.legacy".to_string()],
                purge: true,
            },
        )
        .await
        .expect("delete");
    assert_eq!(response.message, "2 documents deleted successfully");

    let commits = lake.commits();
    assert_eq!(
        delete_ids(&commits[0].0),
        vec!["a", "drafts.a", "b", "drafts.b", "drafts.legacy"]
    );
    assert_eq!(commits[0].1, Visibility::Async);
}

// ---- versions ----

#[tokio::test]
async fn create_version_prefers_draft_content() {
    let (lake, api) = setup();
    lake.stub_query(
        DOCUMENT_CONTENT_QUERY,
        json!({"publishedId": "post-1"}),
        vec![
            json!({"_id": "post-1", "_type": "post", "title": "Published"}),
            json!({"_id": "drafts.post-1", "_type": "post", "title": "Draft", "_rev": "r1"}),
        ],
    );

    let response = api
        .create_version("spring", "post-1", None)
        .await
        .expect("create version");
    assert_eq!(
        response.message,
        "Document version created for post-1 in release spring"
    );
    assert_eq!(
        response.targets,
        Targets::Version("versions.spring.post-1".to_string())
    );

    let dispatched = lake.dispatched_actions();
    match &dispatched[0][..] {
        [Action::VersionCreate {
            published_id,
            attributes,
        }] => {
            assert_eq!(published_id, "post-1");
            assert_eq!(attributes.id.as_deref(), Some("versions.spring.post-1"));
            assert_eq!(attributes.title(), Some("Draft"));
            assert!(!attributes.fields.contains_key("_rev"));
        }
        other => panic!("unexpected actions: {:?}", other),
    }
}

#[tokio::test]
async fn create_version_with_missing_document_dispatches_nothing() {
    let (lake, api) = setup();
    lake.stub_query(
        DOCUMENT_CONTENT_QUERY,
        json!({"publishedId": "a"}),
        vec![json!({"_id": "a", "_type": "post"})],
    );

    let err = api
        .create_version("spring", vec!["a", "missing"], None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to create document version: Document missing not found"
    );
    assert!(lake.dispatched_actions().is_empty());
}

#[tokio::test]
async fn create_version_with_supplied_content_skips_fetch() {
    let (lake, api) = setup();

    let response = api
        .create_version(
            "spring",
            vec!["a", "b"],
            Some(content(json!({"_type": "post", "title": "Shared"}))),
        )
        .await
        .expect("create versions");
    assert_eq!(
        response.message,
        "Created 2 document versions for release spring"
    );
    assert!(lake.fetches().is_empty());
    assert_eq!(lake.dispatched_actions()[0].len(), 2);
}

#[tokio::test]
async fn discard_version_single_and_many() {
    let (lake, api) = setup();

    let single = api
        .discard_version("versions.spring.a", true)
        .await
        .expect("discard");
    assert_eq!(
        single.message,
        "Document version versions.spring.a discarded successfully"
    );

    let many = api
        .discard_version(vec!["versions.spring.a", "versions.spring.b"], false)
        .await
        .expect("discard many");
    assert_eq!(many.message, "Discarded 2 document versions");

    let commits = lake.commits();
    assert_eq!(delete_ids(&commits[0].0), vec!["versions.spring.a"]);
    assert_eq!(commits[0].1, Visibility::Async);
    assert_eq!(
        delete_ids(&commits[1].0),
        vec!["versions.spring.a", "versions.spring.b"]
    );
    assert_eq!(commits[1].1, Visibility::Sync);

    let err = api.discard_version(vec![""], false).await.unwrap_err();
    assert!(matches!(
        err.root(),
        OpsError::Validation(ValidationError::NoVersionIds)
    ));
}

#[tokio::test]
async fn unpublish_with_release_dispatches_version_unpublish() {
    let (lake, api) = setup();

    let response = api
        .unpublish_with_release("spring", "drafts.post-1")
        .await
        .expect("unpublish with release");
    assert_eq!(
        response.message,
        "Document post-1 marked for unpublishing with release spring"
    );
    assert_eq!(
        lake.dispatched_actions()[0],
        vec![Action::VersionUnpublish {
            version_id: "versions.spring.post-1".to_string(),
            published_id: "post-1".to_string(),
        }]
    );
}
