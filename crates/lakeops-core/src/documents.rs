//! Document operations
//!
//! Publish, unpublish, create, edit, delete and draft replacement over a
//! `ContentLake`, plus release-scoped version handling (create, discard,
//! unpublish-with-release). Every multi-target operation is all-or-nothing:
//! inputs are validated and staged before any I/O, then carried by exactly one
//! transaction or one actions dispatch.

use lake_state::{
    Action, ActionResult, Content, ContentLake, Document, LakeError, MutationResult, Query,
    Visibility,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::batch::{prepare_all, try_all};
use crate::error::{OpsError, Result, ValidationError};
use crate::ids::{self, OneOrMany};
use crate::obs;
use crate::patch::{PatchBuilder, PatchOperations};
use crate::responses::{EditOutcome, OpResponse, Targets};
use crate::transaction::TransactionBuilder;

/// Query resolving both forms of a document in one round trip.
pub const DOCUMENT_CONTENT_QUERY: &str = "*[_id in [$draftId, $publishedId]]";

/// System fields stripped from fetched content before it is re-submitted.
const SYSTEM_FIELDS: [&str; 3] = ["_rev", "_createdAt", "_updatedAt"];

/// What `create` does when a document with the same ID already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Let the backend reject the duplicate
    #[default]
    Fail,
    /// Skip documents whose ID is already taken
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub if_exists: IfExists,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Extra draft IDs deleted in the same transaction
    pub include_drafts: Vec<String>,
    /// Remove from history as well; commits with `async` visibility
    pub purge: bool,
}

/// Document operations over a content lake.
pub struct DocumentsApi<L> {
    lake: L,
}

impl<L: ContentLake> DocumentsApi<L> {
    pub fn new(lake: L) -> Self {
        Self { lake }
    }

    pub fn lake(&self) -> &L {
        &self.lake
    }

    /// Publish the drafts of one or more documents.
    pub async fn publish(
        &self,
        document_ids: impl Into<OneOrMany<String>>,
    ) -> Result<OpResponse<ActionResult>> {
        let input = document_ids.into();
        let many = input.is_many();
        let ids = ids::process_document_ids(input).map_err(|e| e.during("Failed to publish document"))?;

        obs::traced("publish", &obs::target_label(&ids), async {
            let actions = ids
                .iter()
                .map(|id| Action::Publish {
                    draft_id: ids::draft_id(id),
                    published_id: id.clone(),
                })
                .collect();
            let result = self.dispatch("publish documents", actions).await?;

            let message = if many {
                format!("Published {} documents successfully", ids.len())
            } else {
                format!("Document {} published successfully", ids[0])
            };
            Ok(OpResponse::new(message, Targets::documents(ids.clone(), many), result))
        })
        .await
        .map_err(|e| e.during("Failed to publish document"))
    }

    /// Withdraw the published form, keeping each document as a draft.
    pub async fn unpublish(
        &self,
        document_ids: impl Into<OneOrMany<String>>,
    ) -> Result<OpResponse<ActionResult>> {
        let input = document_ids.into();
        let many = input.is_many();
        let ids =
            ids::process_document_ids(input).map_err(|e| e.during("Failed to unpublish document"))?;

        obs::traced("unpublish", &obs::target_label(&ids), async {
            let actions = ids
                .iter()
                .map(|id| Action::Unpublish {
                    document_id: id.clone(),
                })
                .collect();
            let result = self.dispatch("unpublish documents", actions).await?;

            let message = if many {
                format!("Unpublished {} documents successfully", ids.len())
            } else {
                format!("Document {} unpublished successfully", ids[0])
            };
            let drafts = ids.iter().map(|id| ids::draft_id(id)).collect();
            Ok(OpResponse::new(message, Targets::drafts(drafts, many), result))
        })
        .await
        .map_err(|e| e.during("Failed to unpublish document"))
    }

    /// Create one or more documents as drafts.
    ///
    /// A single document goes through a direct create; a list is committed as
    /// one transaction.
    pub async fn create(
        &self,
        documents: OneOrMany<Content>,
        options: CreateOptions,
    ) -> Result<OpResponse<MutationResult>> {
        obs::traced("create", "documents", async {
            match documents {
                OneOrMany::One(content) => {
                    let document = prepare_for_creation(content)?;
                    let prepared_id = document.id.clone();
                    let ignore = options.if_exists == IfExists::Ignore && prepared_id.is_some();
                    let outcome = if ignore {
                        self.lake.create_if_not_exists(document).await
                    } else {
                        self.lake.create(document).await
                    };
                    let result = outcome.map_err(|e| OpsError::backend("create document", e))?;
                    let id = created_id(&result, prepared_id);

                    Ok(OpResponse::new(
                        format!("Document created successfully with ID: {}", id),
                        Targets::Document(id),
                        result,
                    ))
                }
                OneOrMany::Many(contents) => {
                    if contents.is_empty() {
                        return Err(ValidationError::NoDocuments.into());
                    }
                    let documents = prepare_all(contents, prepare_for_creation)?;
                    let count = documents.len();

                    let mut tx = TransactionBuilder::new();
                    for document in documents {
                        if options.if_exists == IfExists::Ignore && document.id.is_some() {
                            tx.create_if_not_exists(document);
                        } else {
                            tx.create(document);
                        }
                    }
                    let result = tx.commit(&self.lake, Visibility::Sync).await?;

                    Ok(OpResponse::new(
                        format!("{} documents created successfully", count),
                        Targets::Documents(result.ids()),
                        result,
                    ))
                }
            }
        })
        .await
        .map_err(|e| e.during("Failed to create document"))
    }

    /// Apply the same patch to the draft of every document, atomically.
    ///
    /// Never raises: failures come back as `EditOutcome::Failed`.
    pub async fn edit(
        &self,
        document_ids: impl Into<OneOrMany<String>>,
        patch: &PatchOperations,
    ) -> EditOutcome {
        let outcome: Result<OpResponse<MutationResult>> = async {
            let ids = ids::process_document_ids(document_ids)?;
            let drafts: Vec<String> = ids.iter().map(|id| ids::draft_id(id)).collect();

            obs::traced("edit", &obs::target_label(&drafts), async {
                let mut tx = TransactionBuilder::new();
                for id in &ids {
                    tx.patch(PatchBuilder::from_operations(patch).for_document(id));
                }
                let mut result = tx.commit(&self.lake, Visibility::Sync).await?;
                result.document_id = drafts.first().cloned();

                Ok(OpResponse::new(
                    format!("Successfully edited {} document(s)", drafts.len()),
                    Targets::Documents(drafts.clone()),
                    result,
                ))
            })
            .await
        }
        .await;

        match outcome {
            Ok(response) => EditOutcome::Applied(response),
            Err(err) => EditOutcome::failed(err.to_string()),
        }
    }

    /// Delete the published and draft forms of every document.
    pub async fn delete(
        &self,
        document_ids: impl Into<OneOrMany<String>>,
        options: DeleteOptions,
    ) -> Result<OpResponse<MutationResult>> {
        let input = document_ids.into();
        let many = input.is_many();
        let ids = ids::process_document_ids(input).map_err(|e| e.during("Failed to delete document"))?;

        obs::traced("delete", &obs::target_label(&ids), async {
            let mut tx = TransactionBuilder::new();
            for id in &ids {
                tx.delete(id.as_str()).delete(ids::draft_id(id));
            }
            for draft in ids::clean_ids(options.include_drafts.clone().into()) {
                tx.delete(draft);
            }
            let visibility = if options.purge {
                Visibility::Async
            } else {
                Visibility::Sync
            };
            let result = tx.commit(&self.lake, visibility).await?;

            let message = if many {
                format!("{} documents deleted successfully", ids.len())
            } else {
                format!("Document {} deleted successfully", ids[0])
            };
            Ok(OpResponse::new(message, Targets::documents(ids.clone(), many), result))
        })
        .await
        .map_err(|e| e.during("Failed to delete document"))
    }

    /// Replace whole draft documents.
    pub async fn replace_draft(
        &self,
        documents: OneOrMany<Content>,
    ) -> Result<OpResponse<MutationResult>> {
        obs::traced("replace_draft", "documents", async {
            match documents {
                OneOrMany::One(content) => {
                    let document = prepare_for_replacement(content)?;
                    let id = document.id.clone().unwrap_or_default();
                    let result = self
                        .lake
                        .create_or_replace(document)
                        .await
                        .map_err(|e| OpsError::backend("replace draft", e))?;

                    Ok(OpResponse::new(
                        format!("Draft document {} replaced successfully", id),
                        Targets::Document(id),
                        result,
                    ))
                }
                OneOrMany::Many(contents) => {
                    if contents.is_empty() {
                        return Err(ValidationError::NoDocuments.into());
                    }
                    let documents = prepare_all(contents, prepare_for_replacement)?;
                    let replaced: Vec<String> =
                        documents.iter().filter_map(|d| d.id.clone()).collect();

                    let mut tx = TransactionBuilder::new();
                    for document in documents {
                        tx.create_or_replace(document);
                    }
                    let result = tx.commit(&self.lake, Visibility::Sync).await?;

                    Ok(OpResponse::new(
                        format!("{} draft documents replaced successfully", replaced.len()),
                        Targets::Documents(replaced),
                        result,
                    ))
                }
            }
        })
        .await
        .map_err(|e| e.during("Failed to replace draft document"))
    }

    /// Snapshot documents into a release as `versions.<release>.<id>`.
    ///
    /// Content is the supplied map when given, otherwise the document's
    /// current draft (or published form when no draft exists). Every version
    /// is resolved before the single dispatch; one missing document fails the
    /// whole call.
    pub async fn create_version(
        &self,
        release_id: &str,
        document_ids: impl Into<OneOrMany<String>>,
        content: Option<Content>,
    ) -> Result<OpResponse<ActionResult>> {
        let input = document_ids.into();
        let many = input.is_many();

        let release_id = release_id.trim();
        obs::traced("create_version", release_id, async {
            if release_id.is_empty() {
                return Err(ValidationError::EmptyReleaseId.into());
            }
            let ids = ids::process_document_ids(input)?;

            let prepared = try_all(&ids, |id| {
                let content = content.clone();
                async move { version_create_action(&self.lake, release_id, &id, content).await }
            })
            .await?;
            let (version_ids, actions): (Vec<String>, Vec<Action>) = prepared.into_iter().unzip();
            let result = self.dispatch("create document versions", actions).await?;

            let message = if many {
                format!(
                    "Created {} document versions for release {}",
                    version_ids.len(),
                    release_id
                )
            } else {
                format!(
                    "Document version created for {} in release {}",
                    ids[0], release_id
                )
            };
            Ok(OpResponse::new(message, Targets::versions(version_ids, many), result))
        })
        .await
        .map_err(|e| e.during("Failed to create document version"))
    }

    /// Delete version documents by their full version IDs.
    pub async fn discard_version(
        &self,
        version_ids: impl Into<OneOrMany<String>>,
        purge: bool,
    ) -> Result<OpResponse<MutationResult>> {
        let input = version_ids.into();
        let many = input.is_many();
        let version_ids = ids::clean_ids(input);

        let visibility = if purge {
            Visibility::Async
        } else {
            Visibility::Sync
        };
        obs::traced("discard_version", &obs::target_label(&version_ids), async {
            if version_ids.is_empty() {
                return Err(ValidationError::NoVersionIds.into());
            }

            let (message, result) = if many {
                let mut tx = TransactionBuilder::new();
                for id in &version_ids {
                    tx.delete(id.as_str());
                }
                let result = tx.commit(&self.lake, visibility).await?;
                (format!("Discarded {} document versions", version_ids.len()), result)
            } else {
                let result = self
                    .lake
                    .delete(&version_ids[0], visibility)
                    .await
                    .map_err(|e| OpsError::backend("discard version", e))?;
                (
                    format!("Document version {} discarded successfully", version_ids[0]),
                    result,
                )
            };
            Ok(OpResponse::new(
                message,
                Targets::versions(version_ids.clone(), many),
                result,
            ))
        })
        .await
        .map_err(|e| e.during("Failed to discard document version"))
    }

    /// Mark documents to be unpublished when `release_id` is published.
    pub async fn unpublish_with_release(
        &self,
        release_id: &str,
        document_ids: impl Into<OneOrMany<String>>,
    ) -> Result<OpResponse<ActionResult>> {
        let input = document_ids.into();
        let many = input.is_many();

        let release_id = release_id.trim();
        obs::traced("unpublish_with_release", release_id, async {
            if release_id.is_empty() {
                return Err(ValidationError::EmptyReleaseId.into());
            }
            let ids = ids::process_document_ids(input)?;

            let actions = ids
                .iter()
                .map(|id| Action::VersionUnpublish {
                    version_id: ids::version_id(release_id, id),
                    published_id: id.clone(),
                })
                .collect();
            let result = self.dispatch("unpublish with release", actions).await?;

            let message = if many {
                format!(
                    "Marked {} documents for unpublishing with release {}",
                    ids.len(),
                    release_id
                )
            } else {
                format!(
                    "Document {} marked for unpublishing with release {}",
                    ids[0], release_id
                )
            };
            Ok(OpResponse::new(message, Targets::documents(ids, many), result))
        })
        .await
        .map_err(|e| e.during("Failed to mark document for unpublishing"))
    }

    async fn dispatch(&self, operation: &str, actions: Vec<Action>) -> Result<ActionResult> {
        debug!(operation, count = actions.len(), "dispatching actions");
        self.lake
            .perform_actions(actions)
            .await
            .map_err(|e| OpsError::backend(operation, e))
    }
}

/// Validate a caller document and force its ID into draft form.
fn prepare_for_creation(content: Content) -> Result<Document> {
    let mut document = into_document(content)?;
    document.id = document.id.as_deref().map(ids::draft_id);
    Ok(document)
}

/// ID reported for a single create: the backend's, else the one we sent.
fn created_id(result: &MutationResult, prepared_id: Option<String>) -> String {
    result
        .document_id
        .clone()
        .or_else(|| result.ids().into_iter().next())
        .or(prepared_id)
        .unwrap_or_default()
}

/// Like `prepare_for_creation`, but the ID is mandatory.
fn prepare_for_replacement(content: Content) -> Result<Document> {
    let document = prepare_for_creation(content)?;
    if document.id.is_none() {
        return Err(ValidationError::MissingId.into());
    }
    Ok(document)
}

/// Split `_id` and `_type` out of a content map.
pub(crate) fn into_document(mut content: Content) -> Result<Document> {
    let doc_type = match content.remove("_type") {
        Some(Value::String(t)) if !t.trim().is_empty() => t,
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(ValidationError::MissingType.into())
        }
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "_type".to_string(),
            }
            .into())
        }
    };
    let id = match content.remove("_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => None,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "_id".to_string(),
            }
            .into())
        }
    };
    Ok(Document {
        id,
        doc_type,
        fields: content,
    })
}

/// Current content of a document, draft preferred over published.
pub(crate) async fn fetch_document_content<L>(lake: &L, document_id: &str) -> Result<Document>
where
    L: ContentLake + ?Sized,
{
    let base = ids::base_id(document_id).to_string();
    let draft = ids::draft_id(&base);
    let query = Query::new(DOCUMENT_CONTENT_QUERY)
        .param("draftId", Value::String(draft.clone()))
        .param("publishedId", Value::String(base.clone()));

    let rows = lake
        .fetch(&query)
        .await
        .map_err(|e| OpsError::backend("fetch document content", e))?;

    let chosen = rows
        .iter()
        .find(|row| row_id(row) == Some(draft.as_str()))
        .or_else(|| rows.iter().find(|row| row_id(row) == Some(base.as_str())))
        .cloned();

    let mut content = match chosen {
        Some(Value::Object(map)) => map,
        _ => return Err(OpsError::DocumentNotFound(base)),
    };
    for field in SYSTEM_FIELDS {
        content.remove(field);
    }
    into_document(content).map_err(|e| match e {
        OpsError::Validation(_) => OpsError::backend(
            "decode document content",
            LakeError::Deserialization(format!("document {} has no usable _type", base)),
        ),
        other => other,
    })
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("_id").and_then(Value::as_str)
}

/// Version ID and `version.create` action for one document.
pub(crate) async fn version_create_action<L>(
    lake: &L,
    release_id: &str,
    document_id: &str,
    content: Option<Content>,
) -> Result<(String, Action)>
where
    L: ContentLake + ?Sized,
{
    let base = ids::base_id(document_id).to_string();
    let mut attributes = match content {
        Some(content) => into_document(content)?,
        None => fetch_document_content(lake, &base).await?,
    };
    let version_id = ids::version_id(release_id, &base);
    attributes.id = Some(version_id.clone());

    Ok((
        version_id,
        Action::VersionCreate {
            published_id: base,
            attributes,
        },
    ))
}
