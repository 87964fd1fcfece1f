//! Identifier normalization
//!
//! Pure mappings between a document's logical ID and its draft, published,
//! version and release forms. Every mapping is idempotent.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Prefix marking the draft form of a document.
pub const DRAFTS_PREFIX: &str = "drafts.";

/// Prefix of release-scoped version documents.
pub const VERSIONS_PREFIX: &str = "versions.";

/// Prefix of release system documents.
pub const RELEASE_DOCUMENT_PREFIX: &str = "_.releases.";

/// Published (base) form of `id`. Strips every leading `drafts.` prefix.
pub fn base_id(id: &str) -> &str {
    let mut current = id;
    while let Some(rest) = current.strip_prefix(DRAFTS_PREFIX) {
        current = rest;
    }
    current
}

/// Draft form of `id`.
pub fn draft_id(id: &str) -> String {
    format!("{}{}", DRAFTS_PREFIX, base_id(id))
}

pub fn is_draft_id(id: &str) -> bool {
    id.starts_with(DRAFTS_PREFIX)
}

/// Version ID of `id` inside `release_id`: `versions.<release>.<base>`.
pub fn version_id(release_id: &str, id: &str) -> String {
    format!("{}{}.{}", VERSIONS_PREFIX, release_id, base_id(id))
}

/// Base document ID carried by a version ID of `release_id`.
///
/// IDs that are not versions of this release are returned unchanged.
pub fn base_id_from_version<'a>(release_id: &str, version_id: &'a str) -> &'a str {
    let prefix = format!("{}{}.", VERSIONS_PREFIX, release_id);
    version_id.strip_prefix(prefix.as_str()).unwrap_or(version_id)
}

/// System document ID backing a release: `_.releases.<release>`.
pub fn release_document_id(release_id: &str) -> String {
    format!("{}{}", RELEASE_DOCUMENT_PREFIX, release_id)
}

/// A scalar or list input.
///
/// Multi-target operations accept either form; `is_many` lets responses
/// mirror the caller's shape (`documentId` vs `documentIds`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(id: &str) -> Self {
        OneOrMany::One(id.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(id: String) -> Self {
        OneOrMany::One(id)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(ids: Vec<String>) -> Self {
        OneOrMany::Many(ids)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(ids: Vec<&str>) -> Self {
        OneOrMany::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(ids: &[&str]) -> Self {
        OneOrMany::Many(ids.iter().map(|s| s.to_string()).collect())
    }
}

/// Trimmed, non-empty IDs in input order, unchanged otherwise.
pub fn clean_ids(ids: OneOrMany<String>) -> Vec<String> {
    ids.into_vec()
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Base IDs for every valid input ID, in input order.
///
/// Fails with `ValidationError::NoDocumentIds` when nothing valid remains.
pub fn process_document_ids(ids: impl Into<OneOrMany<String>>) -> Result<Vec<String>> {
    let processed: Vec<String> = clean_ids(ids.into())
        .iter()
        .map(|id| base_id(id).to_string())
        .filter(|id| !id.is_empty())
        .collect();

    if processed.is_empty() {
        return Err(ValidationError::NoDocumentIds.into());
    }
    Ok(processed)
}
