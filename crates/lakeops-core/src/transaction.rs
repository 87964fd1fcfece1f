//! Transaction builder
//!
//! Stages create/replace/delete/patch mutations into one atomic unit and
//! commits them through a single `ContentLake::mutate` call. A builder is a
//! per-call value: staging takes `&mut self`, commit consumes it.

use lake_state::{ContentLake, Document, Mutation, MutationResult, PatchMutation, Visibility};
use tracing::debug;

use crate::error::{OpsError, Result, ValidationError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionBuilder {
    mutations: Vec<Mutation>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, document: Document) -> &mut Self {
        self.mutations.push(Mutation::Create(document));
        self
    }

    /// Upsert: replaces the whole document when the ID exists.
    pub fn create_or_replace(&mut self, document: Document) -> &mut Self {
        self.mutations.push(Mutation::CreateOrReplace(document));
        self
    }

    /// Idempotent seed: a no-op when the ID exists.
    pub fn create_if_not_exists(&mut self, document: Document) -> &mut Self {
        self.mutations.push(Mutation::CreateIfNotExists(document));
        self
    }

    pub fn delete(&mut self, id: impl Into<String>) -> &mut Self {
        self.mutations.push(Mutation::Delete { id: id.into() });
        self
    }

    pub fn patch(&mut self, patch: PatchMutation) -> &mut Self {
        self.mutations.push(Mutation::Patch(patch));
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Commit every staged mutation atomically.
    ///
    /// Either every mutation is applied and reported in the result, or the
    /// backend error is returned and nothing was applied.
    pub async fn commit<L>(self, lake: &L, visibility: Visibility) -> Result<MutationResult>
    where
        L: ContentLake + ?Sized,
    {
        if self.mutations.is_empty() {
            return Err(ValidationError::EmptyTransaction.into());
        }
        debug!(
            count = self.mutations.len(),
            visibility = visibility.as_str(),
            "committing transaction"
        );
        lake.mutate(self.mutations, visibility)
            .await
            .map_err(|e| OpsError::backend("commit transaction", e))
    }
}
