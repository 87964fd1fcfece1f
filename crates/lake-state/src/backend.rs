//! Backend capability trait
//!
//! `ContentLake` is the only seam between the orchestration layer and the
//! remote content store. It exposes exactly the primitives the store offers:
//! - `fetch`: read-only query
//! - `perform_actions`: one dispatch carrying an ordered list of actions
//! - `mutate`: one atomic transaction of mutations
//!
//! Single-document convenience calls are provided on top of `mutate`.
//! `HttpLake` talks to the real service; `fakes::MemoryLake` backs tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LakeError;
use crate::schema::{Action, ActionResult, Document, Mutation, MutationResult, Query, Visibility};

/// Result type for backend calls
pub type LakeResult<T> = std::result::Result<T, LakeError>;

/// Remote structured-content backend.
///
/// Guarantees expected from implementations:
/// - `mutate` applies every mutation or none of them.
/// - `perform_actions` submits the actions in one call, in order.
/// - No call is retried; failures surface to the caller as `LakeError`.
#[async_trait]
pub trait ContentLake: Send + Sync {
    /// Run a read-only query and return its rows.
    async fn fetch(&self, query: &Query) -> LakeResult<Vec<Value>>;

    /// Dispatch an ordered list of declarative actions.
    async fn perform_actions(&self, actions: Vec<Action>) -> LakeResult<ActionResult>;

    /// Commit a list of mutations as one transaction.
    async fn mutate(
        &self,
        mutations: Vec<Mutation>,
        visibility: Visibility,
    ) -> LakeResult<MutationResult>;

    /// Create a single document.
    async fn create(&self, document: Document) -> LakeResult<MutationResult> {
        self.mutate(vec![Mutation::Create(document)], Visibility::Sync)
            .await
    }

    /// Create a single document unless its ID already exists.
    async fn create_if_not_exists(&self, document: Document) -> LakeResult<MutationResult> {
        self.mutate(vec![Mutation::CreateIfNotExists(document)], Visibility::Sync)
            .await
    }

    /// Create or fully replace a single document.
    async fn create_or_replace(&self, document: Document) -> LakeResult<MutationResult> {
        self.mutate(vec![Mutation::CreateOrReplace(document)], Visibility::Sync)
            .await
    }

    /// Delete a single document by ID.
    async fn delete(&self, id: &str, visibility: Visibility) -> LakeResult<MutationResult> {
        self.mutate(
            vec![Mutation::Delete { id: id.to_string() }],
            visibility,
        )
        .await
    }
}

#[async_trait]
impl<T> ContentLake for Arc<T>
where
    T: ContentLake + ?Sized,
{
    async fn fetch(&self, query: &Query) -> LakeResult<Vec<Value>> {
        (**self).fetch(query).await
    }

    async fn perform_actions(&self, actions: Vec<Action>) -> LakeResult<ActionResult> {
        (**self).perform_actions(actions).await
    }

    async fn mutate(
        &self,
        mutations: Vec<Mutation>,
        visibility: Visibility,
    ) -> LakeResult<MutationResult> {
        (**self).mutate(mutations, visibility).await
    }
}
