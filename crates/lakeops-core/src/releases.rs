//! Release lifecycle
//!
//! A release groups document versions that publish together. Lifecycle:
//!
//! ```text
//! create -> active -> schedule -> scheduled -> publish -> published
//!              ^          |
//!              +- unschedule
//! active/scheduled -> archive -> archived -> unarchive -> active
//! archived -> delete -> deleted
//! ```
//!
//! Every operation first checks that the configured API version supports
//! Content Releases, before any network call.

use chrono::DateTime;
use lake_state::{
    Action, ActionResult, Content, ContentLake, LakeConfig, LakeError, Query, ReleaseMetadata,
    ReleasePatch, ReleaseSet, ReleaseType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::batch::best_effort;
use crate::documents::version_create_action;
use crate::error::{OpsError, Result, ValidationError};
use crate::ids::{self, OneOrMany};
use crate::obs;
use crate::version::{ensure_release_support, REQUIRED_RELEASES_API_VERSION};

/// Most versions a single release may publish.
pub const RELEASE_DOCUMENT_LIMIT: usize = 50;

/// Membership query; requires the `raw` perspective.
pub const RELEASE_DOCUMENTS_QUERY: &str = "*[sanity::partOfRelease($releaseId)]{ _id, _type, title }";

pub const ALL_RELEASES_QUERY: &str = "releases::all()";

pub const RELEASE_BY_ID_QUERY: &str = "*[_id == $releaseDocumentId]";

/// Lifecycle state reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseState {
    Active,
    Scheduling,
    Scheduled,
    Unscheduling,
    Publishing,
    Published,
    Archiving,
    Archived,
    Unarchiving,
    Deleted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ReleaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseState::Active => "active",
            ReleaseState::Scheduling => "scheduling",
            ReleaseState::Scheduled => "scheduled",
            ReleaseState::Unscheduling => "unscheduling",
            ReleaseState::Publishing => "publishing",
            ReleaseState::Published => "published",
            ReleaseState::Archiving => "archiving",
            ReleaseState::Archived => "archived",
            ReleaseState::Unarchiving => "unarchiving",
            ReleaseState::Deleted => "deleted",
            ReleaseState::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseState::Deleted)
    }

    /// Whether the backend would accept `transition` from this state.
    ///
    /// Only scheduling is checked locally; the other transitions are left to
    /// the backend.
    pub fn permits(&self, transition: ReleaseTransition) -> bool {
        match transition {
            ReleaseTransition::Schedule => {
                !self.is_terminal() && *self != ReleaseState::Published
            }
            ReleaseTransition::Unschedule => *self == ReleaseState::Scheduled,
            ReleaseTransition::Publish
            | ReleaseTransition::Archive
            | ReleaseTransition::Unarchive
            | ReleaseTransition::Delete => true,
        }
    }
}

impl std::fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseTransition {
    Schedule,
    Unschedule,
    Publish,
    Archive,
    Unarchive,
    Delete,
}

impl ReleaseTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseTransition::Schedule => "schedule",
            ReleaseTransition::Unschedule => "unschedule",
            ReleaseTransition::Publish => "publish",
            ReleaseTransition::Archive => "archive",
            ReleaseTransition::Unarchive => "unarchive",
            ReleaseTransition::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ReleaseTransition::Schedule => "scheduled",
            ReleaseTransition::Unschedule => "unscheduled",
            ReleaseTransition::Publish => "published",
            ReleaseTransition::Archive => "archived",
            ReleaseTransition::Unarchive => "unarchived",
            ReleaseTransition::Delete => "deleted",
        }
    }
}

/// A release system document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(rename = "_id")]
    pub document_id: String,
    /// Release ID; the backend stores it as `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub state: ReleaseState,
    #[serde(default)]
    pub metadata: ReleaseInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarded_at: Option<String>,
    #[serde(flatten)]
    pub extra: Content,
}

impl Release {
    /// The caller-facing release ID.
    pub fn release_id(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self
                .document_id
                .strip_prefix(ids::RELEASE_DOCUMENT_PREFIX)
                .unwrap_or(&self.document_id),
        }
    }

    /// Not archived, discarded, deleted or already published.
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
            && self.discarded_at.is_none()
            && !matches!(
                self.state,
                ReleaseState::Archived | ReleaseState::Deleted | ReleaseState::Published
            )
    }
}

/// Release metadata as stored by the backend.
///
/// Other clients write release types this crate never sends (`undecided`),
/// so the type stays a string here; `ReleaseType` is only used for writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intended_publish_at: Option<String>,
    #[serde(flatten)]
    pub extra: Content,
}

impl ReleaseInfo {
    /// The release type, when it is one this crate can write back.
    pub fn writable_type(&self) -> Option<ReleaseType> {
        self.release_type.as_deref()?.parse().ok()
    }
}

/// Optional metadata for `create_release`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateReleaseOptions {
    pub description: Option<String>,
    pub release_type: Option<ReleaseType>,
    pub intended_publish_at: Option<String>,
}

/// Fields changed by `update_release`; `None` and empty values are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_type: Option<ReleaseType>,
    #[serde(default)]
    pub intended_publish_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResponse {
    pub success: bool,
    pub message: String,
    pub release_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<usize>,
    pub result: ActionResult,
}

impl ReleaseResponse {
    fn new(message: String, release_id: &str, result: ActionResult) -> Self {
        Self {
            success: true,
            message,
            release_id: release_id.to_string(),
            scheduled_time: None,
            document_count: None,
            result,
        }
    }
}

/// Result of adding or removing release members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub success: bool,
    pub message: String,
    pub release_id: String,
    pub document_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_ids: Option<Vec<String>>,
    pub result: ActionResult,
}

/// One version inside a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDocument {
    pub version_id: String,
    pub document_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDocuments {
    pub release_id: String,
    pub document_count: usize,
    pub documents: Vec<ReleaseDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseList {
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseLookup {
    pub release: Release,
}

/// Release operations over a content lake.
pub struct ReleasesApi<L> {
    lake: L,
    api_version: String,
}

impl<L: ContentLake> ReleasesApi<L> {
    pub fn new(lake: L, config: &LakeConfig) -> Self {
        Self::with_api_version(lake, config.api_version.clone())
    }

    pub fn with_api_version(lake: L, api_version: impl Into<String>) -> Self {
        Self {
            lake,
            api_version: api_version.into(),
        }
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Create a release. Title defaults to `Release: <id>`.
    pub async fn create_release(
        &self,
        release_id: &str,
        title: Option<String>,
        options: CreateReleaseOptions,
    ) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        obs::traced("create_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            validate_schedule(options.release_type, options.intended_publish_at.as_deref())?;

            let metadata = ReleaseMetadata {
                title: Some(
                    non_empty(title).unwrap_or_else(|| format!("Release: {}", release_id)),
                ),
                description: non_empty(options.description),
                release_type: options.release_type,
                intended_publish_at: non_empty(options.intended_publish_at),
            };
            let action = Action::ReleaseCreate {
                release_id: release_id.to_string(),
                metadata,
            };
            let result = self
                .lake
                .perform_actions(vec![action])
                .await
                .map_err(creation_error)?;

            Ok(ReleaseResponse::new(
                format!("Release {} created successfully", release_id),
                release_id,
                result,
            ))
        })
        .await
        .map_err(|e| e.during("Failed to create release"))
    }

    /// Add documents to a release by creating a version of each.
    ///
    /// Best-effort: documents whose content cannot be resolved are skipped
    /// and reported; the rest are added in one dispatch. Fails only when no
    /// document could be added.
    pub async fn add_document_to_release(
        &self,
        release_id: &str,
        document_ids: impl Into<OneOrMany<String>>,
        content: Option<Content>,
    ) -> Result<MembershipResponse> {
        let release_id = release_id.trim();
        let document_ids = document_ids.into();
        obs::traced("add_document_to_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            let ids = ids::process_document_ids(document_ids)?;

            let lake = &self.lake;
            let report = best_effort("add_document_to_release", &ids, |id| {
                let content = content.clone();
                async move {
                    let (version_id, action) =
                        version_create_action(lake, release_id, &id, content).await?;
                    Ok((id, version_id, action))
                }
            })
            .await;
            let report = report.require_any("Failed to add any documents to release")?;

            let mut document_ids = Vec::with_capacity(report.succeeded());
            let mut version_ids = Vec::with_capacity(report.succeeded());
            let mut actions = Vec::with_capacity(report.succeeded());
            for (id, version_id, action) in report.processed.iter().cloned() {
                document_ids.push(id);
                version_ids.push(version_id);
                actions.push(action);
            }

            let result = self.dispatch("add documents to release", actions).await?;
            let message = report.annotate(
                format!(
                    "{} document(s) added to release {} successfully",
                    document_ids.len(),
                    release_id
                ),
                "added",
            );
            Ok(MembershipResponse {
                success: true,
                message,
                release_id: release_id.to_string(),
                document_ids,
                version_ids: Some(version_ids),
                result,
            })
        })
        .await
        .map_err(|e| e.during("Failed to add document to release"))
    }

    /// Remove documents from a release by deleting their versions.
    ///
    /// Building a removal cannot fail per document, so every ID goes out in
    /// one dispatch.
    pub async fn remove_document_from_release(
        &self,
        release_id: &str,
        document_ids: impl Into<OneOrMany<String>>,
    ) -> Result<MembershipResponse> {
        let release_id = release_id.trim();
        let document_ids = document_ids.into();
        obs::traced("remove_document_from_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            let ids = ids::process_document_ids(document_ids)?;

            let actions: Vec<Action> = ids
                .iter()
                .map(|id| Action::DocumentDelete {
                    document_id: ids::version_id(release_id, id),
                })
                .collect();
            let result = self.dispatch("remove documents from release", actions).await?;

            let message = format!(
                "{} document(s) removed from release {} successfully",
                ids.len(),
                release_id
            );
            Ok(MembershipResponse {
                success: true,
                message,
                release_id: release_id.to_string(),
                document_ids: ids,
                version_ids: None,
                result,
            })
        })
        .await
        .map_err(|e| e.during(format!("Failed to remove document(s) from release {}", release_id)))
    }

    /// Every version that is part of the release.
    pub async fn list_release_documents(&self, release_id: &str) -> Result<ReleaseDocuments> {
        let release_id = release_id.trim();
        obs::traced("list_release_documents", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            self.release_documents(release_id).await
        })
        .await
        .map_err(|e| e.during("Failed to retrieve documents for release"))
    }

    /// Publish every version in the release.
    ///
    /// Refused before dispatch when the release holds more than
    /// `RELEASE_DOCUMENT_LIMIT` versions.
    pub async fn publish_release(&self, release_id: &str) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        obs::traced("publish_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;

            let members = self
                .release_documents(release_id)
                .await
                .map_err(|e| e.during("Failed to retrieve documents for release"))?;
            if members.document_count > RELEASE_DOCUMENT_LIMIT {
                obs::emit_release_limit_exceeded(
                    release_id,
                    members.document_count,
                    RELEASE_DOCUMENT_LIMIT,
                );
                return Err(OpsError::ReleaseLimitExceeded {
                    count: members.document_count,
                    limit: RELEASE_DOCUMENT_LIMIT,
                });
            }

            let action = Action::ReleasePublish {
                release_id: release_id.to_string(),
            };
            let result = self.dispatch("publish release", vec![action]).await?;

            let mut response = ReleaseResponse::new(
                format!("Release {} published successfully", release_id),
                release_id,
                result,
            );
            response.document_count = Some(members.document_count);
            Ok(response)
        })
        .await
        .map_err(|e| e.during("Failed to publish release"))
    }

    pub async fn list_releases(&self) -> Result<ReleaseList> {
        obs::traced("list_releases", "all", async {
            ensure_release_support(&self.api_version)?;
            let rows = self
                .lake
                .fetch(&Query::new(ALL_RELEASES_QUERY))
                .await
                .map_err(|e| OpsError::backend("fetch releases", e))?;
            let releases = rows
                .into_iter()
                .map(decode_release)
                .collect::<Result<Vec<_>>>()?;
            Ok(ReleaseList { releases })
        })
        .await
        .map_err(|e| e.during("Failed to retrieve releases"))
    }

    pub async fn get_release(&self, release_id: &str) -> Result<ReleaseLookup> {
        let release_id = release_id.trim();
        obs::traced("get_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            let release = self.find_release(release_id).await?;
            Ok(ReleaseLookup { release })
        })
        .await
        .map_err(|e| e.during("Failed to get release"))
    }

    /// Edit release metadata with only the provided fields.
    pub async fn update_release(
        &self,
        release_id: &str,
        update: ReleaseUpdate,
    ) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        obs::traced("update_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            validate_schedule(update.release_type, update.intended_publish_at.as_deref())?;

            let metadata = ReleaseMetadata {
                title: non_empty(update.title),
                description: non_empty(update.description),
                release_type: update.release_type,
                intended_publish_at: non_empty(update.intended_publish_at),
            };
            let action = Action::ReleaseEdit {
                release_id: release_id.to_string(),
                patch: ReleasePatch {
                    id: release_id.to_string(),
                    set: ReleaseSet { metadata },
                },
            };
            let result = self.dispatch("update release", vec![action]).await?;

            Ok(ReleaseResponse::new(
                format!("Release {} updated successfully", release_id),
                release_id,
                result,
            ))
        })
        .await
        .map_err(|e| e.during("Failed to update release"))
    }

    /// Schedule the release to publish at `publish_at` (RFC 3339).
    pub async fn schedule_release(
        &self,
        release_id: &str,
        publish_at: &str,
    ) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        let publish_at = publish_at.trim();
        obs::traced("schedule_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            if publish_at.is_empty() {
                return Err(ValidationError::MissingPublishAt.into());
            }
            require_timestamp(publish_at)?;
            self.ensure_transition(release_id, ReleaseTransition::Schedule)
                .await?;

            let action = Action::ReleaseSchedule {
                release_id: release_id.to_string(),
                publish_at: publish_at.to_string(),
            };
            let result = self.dispatch("schedule release", vec![action]).await?;

            let mut response = ReleaseResponse::new(
                format!("Release {} scheduled for {}", release_id, publish_at),
                release_id,
                result,
            );
            response.scheduled_time = Some(publish_at.to_string());
            Ok(response)
        })
        .await
        .map_err(|e| e.during("Failed to schedule release"))
    }

    /// Return a scheduled release to the active state.
    pub async fn unschedule_release(&self, release_id: &str) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        obs::traced("unschedule_release", release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;
            self.ensure_transition(release_id, ReleaseTransition::Unschedule)
                .await?;

            let action = Action::ReleaseUnschedule {
                release_id: release_id.to_string(),
            };
            let result = self.dispatch("unschedule release", vec![action]).await?;
            Ok(ReleaseResponse::new(
                format!("Release {} unscheduled successfully", release_id),
                release_id,
                result,
            ))
        })
        .await
        .map_err(|e| e.during("Failed to unschedule release"))
    }

    pub async fn archive_release(&self, release_id: &str) -> Result<ReleaseResponse> {
        self.plain_transition(release_id, ReleaseTransition::Archive, |release_id| {
            Action::ReleaseArchive { release_id }
        })
        .await
        .map_err(|e| e.during("Failed to archive release"))
    }

    pub async fn unarchive_release(&self, release_id: &str) -> Result<ReleaseResponse> {
        self.plain_transition(release_id, ReleaseTransition::Unarchive, |release_id| {
            Action::ReleaseUnarchive { release_id }
        })
        .await
        .map_err(|e| e.during("Failed to unarchive release"))
    }

    /// Delete an archived release.
    pub async fn delete_release(&self, release_id: &str) -> Result<ReleaseResponse> {
        self.plain_transition(release_id, ReleaseTransition::Delete, |release_id| {
            Action::ReleaseDelete { release_id }
        })
        .await
        .map_err(|e| e.during("Failed to delete release"))
    }

    async fn plain_transition(
        &self,
        release_id: &str,
        transition: ReleaseTransition,
        action: fn(String) -> Action,
    ) -> Result<ReleaseResponse> {
        let release_id = release_id.trim();
        let operation = format!("{}_release", transition.as_str());
        obs::traced(&operation, release_id, async {
            ensure_release_support(&self.api_version)?;
            require_release_id(release_id)?;

            let result = self
                .dispatch(&operation, vec![action(release_id.to_string())])
                .await?;
            Ok(ReleaseResponse::new(
                format!("Release {} {} successfully", release_id, transition.past_tense()),
                release_id,
                result,
            ))
        })
        .await
    }

    async fn ensure_transition(&self, release_id: &str, transition: ReleaseTransition) -> Result<()> {
        let release = self.find_release(release_id).await?;
        debug!(release_id, state = %release.state, transition = transition.as_str(), "checking release transition");
        if release.state.permits(transition) {
            return Ok(());
        }
        Err(OpsError::InvalidTransition {
            release_id: release_id.to_string(),
            state: release.state.to_string(),
            transition: transition.as_str().to_string(),
        })
    }

    async fn find_release(&self, release_id: &str) -> Result<Release> {
        let query = Query::new(RELEASE_BY_ID_QUERY)
            .param("releaseDocumentId", ids::release_document_id(release_id));
        let rows = self
            .lake
            .fetch(&query)
            .await
            .map_err(|e| OpsError::backend("fetch release", e))?;
        match rows.into_iter().next() {
            Some(row) => decode_release(row),
            None => Err(OpsError::ReleaseNotFound(release_id.to_string())),
        }
    }

    async fn release_documents(&self, release_id: &str) -> Result<ReleaseDocuments> {
        let query = Query::new(RELEASE_DOCUMENTS_QUERY)
            .param("releaseId", release_id)
            .perspective("raw");
        let rows = self
            .lake
            .fetch(&query)
            .await
            .map_err(|e| OpsError::backend("fetch release documents", e))?;

        let documents: Vec<ReleaseDocument> = rows
            .iter()
            .filter_map(|row| release_document(release_id, row))
            .collect();
        Ok(ReleaseDocuments {
            release_id: release_id.to_string(),
            document_count: documents.len(),
            documents,
        })
    }

    async fn dispatch(&self, operation: &str, actions: Vec<Action>) -> Result<ActionResult> {
        debug!(operation, count = actions.len(), "dispatching release actions");
        self.lake
            .perform_actions(actions)
            .await
            .map_err(|e| OpsError::backend(operation, e))
    }
}

fn require_release_id(release_id: &str) -> Result<()> {
    if release_id.is_empty() {
        return Err(ValidationError::EmptyReleaseId.into());
    }
    Ok(())
}

fn require_timestamp(value: &str) -> Result<()> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::InvalidTimestamp {
                value: value.to_string(),
            }
            .into()
        })
}

/// `scheduled` needs a publish time; any supplied time must be RFC 3339.
fn validate_schedule(release_type: Option<ReleaseType>, publish_at: Option<&str>) -> Result<()> {
    let publish_at = publish_at.map(str::trim).filter(|t| !t.is_empty());
    match (release_type, publish_at) {
        (Some(ReleaseType::Scheduled), None) => Err(ValidationError::MissingPublishAt.into()),
        (_, Some(timestamp)) => require_timestamp(timestamp),
        _ => Ok(()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn decode_release(row: Value) -> Result<Release> {
    serde_json::from_value(row).map_err(|e| {
        OpsError::backend(
            "decode release",
            LakeError::Deserialization(e.to_string()),
        )
    })
}

fn release_document(release_id: &str, row: &Value) -> Option<ReleaseDocument> {
    let version_id = row.get("_id").and_then(Value::as_str)?;
    let doc_type = row
        .get("_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let title = row
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Untitled {}", doc_type));

    Some(ReleaseDocument {
        version_id: version_id.to_string(),
        document_id: ids::base_id_from_version(release_id, version_id).to_string(),
        doc_type,
        title,
    })
}

/// Translate a release-creation refusal into caller guidance.
fn creation_error(err: LakeError) -> OpsError {
    let guidance = if err.to_string().contains("API version") {
        format!(
            "Make sure you're using API version {} or later.",
            REQUIRED_RELEASES_API_VERSION
        )
    } else if err.is_not_found() {
        "The Content Releases feature might not be enabled for this project or the API token \
         lacks permissions."
            .to_string()
    } else if err.is_unauthorized() {
        "Authentication failed. Check that your Sanity token has permission to create releases."
            .to_string()
    } else {
        return OpsError::backend("create release", err);
    };
    OpsError::Rejected {
        guidance,
        source: err,
    }
}
