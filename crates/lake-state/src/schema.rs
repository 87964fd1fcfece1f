//! Wire types exchanged with the content lake
//!
//! - `Document`: a typed content record (`_id`, `_type`, open field map)
//! - `PatchSpec`: sparse field-level patch groups
//! - `Mutation`: one staged transaction step
//! - `Action`: one declarative intent for the actions endpoint
//! - `Query`: a read request with params and perspective
//! - `MutationResult` / `ActionResult`: commit outcomes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open-ended content map as supplied by callers.
pub type Content = Map<String, Value>;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A content record with its identity and type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID; omitted on create when the backend should assign one
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Document type tag
    #[serde(rename = "_type")]
    pub doc_type: String,
    /// Every other field
    #[serde(flatten)]
    pub fields: Content,
}

impl Document {
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            id: None,
            doc_type: doc_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The `title` field when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Where an `insert` patch places its items relative to a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertLocation {
    Before(String),
    After(String),
    Replace(String),
}

/// An array insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertSpec {
    #[serde(flatten)]
    pub location: InsertLocation,
    pub items: Vec<Value>,
}

/// Sparse patch specification for a single document.
///
/// Only groups that carry a value are serialized; an unpopulated group never
/// appears as an empty or null key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_if_missing: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unset: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inc: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dec: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<InsertSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_match_patch: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_revision_id: Option<String>,
}

impl PatchSpec {
    /// Names of the populated groups, in wire order.
    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::new();
        if self.set.is_some() {
            groups.push("set");
        }
        if self.set_if_missing.is_some() {
            groups.push("setIfMissing");
        }
        if self.unset.is_some() {
            groups.push("unset");
        }
        if self.inc.is_some() {
            groups.push("inc");
        }
        if self.dec.is_some() {
            groups.push("dec");
        }
        if self.insert.is_some() {
            groups.push("insert");
        }
        if self.diff_match_patch.is_some() {
            groups.push("diffMatchPatch");
        }
        if self.if_revision_id.is_some() {
            groups.push("ifRevisionId");
        }
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// A patch addressed to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchMutation {
    pub id: String,
    #[serde(flatten)]
    pub spec: PatchSpec,
}

/// One step of an atomic transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Document),
    CreateOrReplace(Document),
    CreateIfNotExists(Document),
    Delete { id: String },
    Patch(PatchMutation),
}

impl Mutation {
    /// Wire name of the mutation.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::CreateOrReplace(_) => "createOrReplace",
            Mutation::CreateIfNotExists(_) => "createIfNotExists",
            Mutation::Delete { .. } => "delete",
            Mutation::Patch(_) => "patch",
        }
    }

    /// ID of the targeted document, if known before commit.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Mutation::Create(doc)
            | Mutation::CreateOrReplace(doc)
            | Mutation::CreateIfNotExists(doc) => doc.id.as_deref(),
            Mutation::Delete { id } => Some(id),
            Mutation::Patch(patch) => Some(&patch.id),
        }
    }
}

/// Commit visibility requested for a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Wait until the change is queryable
    #[default]
    Sync,
    /// Return as soon as the change is accepted
    Async,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Sync => "sync",
            Visibility::Async => "async",
        }
    }
}

/// Outcome for one mutation in a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Result of committing a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub results: Vec<MutationOutcome>,
}

impl MutationResult {
    /// IDs reported by the backend, in mutation order.
    pub fn ids(&self) -> Vec<String> {
        self.results.iter().map(|r| r.id.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Release publishing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Asap,
    Scheduled,
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseType::Asap => write!(f, "asap"),
            ReleaseType::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl std::str::FromStr for ReleaseType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asap" => Ok(ReleaseType::Asap),
            "scheduled" => Ok(ReleaseType::Scheduled),
            other => Err(format!("unknown release type: {}", other)),
        }
    }
}

/// Release metadata; unset fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intended_publish_at: Option<String>,
}

/// Fields replaced by a release edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSet {
    pub metadata: ReleaseMetadata,
}

/// Patch carried by a release edit action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePatch {
    pub id: String,
    pub set: ReleaseSet,
}

/// A declarative intent for the actions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actionType")]
pub enum Action {
    #[serde(rename = "sanity.action.document.publish", rename_all = "camelCase")]
    Publish {
        draft_id: String,
        published_id: String,
    },
    #[serde(rename = "sanity.action.document.unpublish", rename_all = "camelCase")]
    Unpublish { document_id: String },
    #[serde(rename = "sanity.action.document.delete", rename_all = "camelCase")]
    DocumentDelete { document_id: String },
    #[serde(
        rename = "sanity.action.document.version.create",
        rename_all = "camelCase"
    )]
    VersionCreate {
        published_id: String,
        attributes: Document,
    },
    #[serde(
        rename = "sanity.action.document.version.unpublish",
        rename_all = "camelCase"
    )]
    VersionUnpublish {
        version_id: String,
        published_id: String,
    },
    #[serde(rename = "sanity.action.release.create", rename_all = "camelCase")]
    ReleaseCreate {
        release_id: String,
        metadata: ReleaseMetadata,
    },
    #[serde(rename = "sanity.action.release.edit", rename_all = "camelCase")]
    ReleaseEdit {
        release_id: String,
        patch: ReleasePatch,
    },
    #[serde(rename = "sanity.action.release.schedule", rename_all = "camelCase")]
    ReleaseSchedule {
        release_id: String,
        publish_at: String,
    },
    #[serde(rename = "sanity.action.release.unschedule", rename_all = "camelCase")]
    ReleaseUnschedule { release_id: String },
    #[serde(rename = "sanity.action.release.publish", rename_all = "camelCase")]
    ReleasePublish { release_id: String },
    #[serde(rename = "sanity.action.release.archive", rename_all = "camelCase")]
    ReleaseArchive { release_id: String },
    #[serde(rename = "sanity.action.release.unarchive", rename_all = "camelCase")]
    ReleaseUnarchive { release_id: String },
    #[serde(rename = "sanity.action.release.delete", rename_all = "camelCase")]
    ReleaseDelete { release_id: String },
}

impl Action {
    /// The `actionType` discriminant.
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::Publish { .. } => "sanity.action.document.publish",
            Action::Unpublish { .. } => "sanity.action.document.unpublish",
            Action::DocumentDelete { .. } => "sanity.action.document.delete",
            Action::VersionCreate { .. } => "sanity.action.document.version.create",
            Action::VersionUnpublish { .. } => "sanity.action.document.version.unpublish",
            Action::ReleaseCreate { .. } => "sanity.action.release.create",
            Action::ReleaseEdit { .. } => "sanity.action.release.edit",
            Action::ReleaseSchedule { .. } => "sanity.action.release.schedule",
            Action::ReleaseUnschedule { .. } => "sanity.action.release.unschedule",
            Action::ReleasePublish { .. } => "sanity.action.release.publish",
            Action::ReleaseArchive { .. } => "sanity.action.release.archive",
            Action::ReleaseUnarchive { .. } => "sanity.action.release.unarchive",
            Action::ReleaseDelete { .. } => "sanity.action.release.delete",
        }
    }
}

/// Result of one actions dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    #[serde(default)]
    pub transaction_id: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A read request: query text, named params and an optional perspective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub query: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<String>,
}

impl Query {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Map::new(),
            perspective: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn perspective(mut self, perspective: impl Into<String>) -> Self {
        self.perspective = Some(perspective.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_patch_serializes_only_populated_groups() {
        let spec = PatchSpec {
            set: Some(json!({"title": "Hello"}).as_object().cloned().unwrap()),
            ..Default::default()
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value, json!({"set": {"title": "Hello"}}));
        assert_eq!(spec.groups(), vec!["set"]);
    }

    #[test]
    fn mutation_wire_shape() {
        let delete = Mutation::Delete {
            id: "drafts.foo".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({"delete": {"id": "drafts.foo"}})
        );

        let patch = Mutation::Patch(PatchMutation {
            id: "drafts.foo".to_string(),
            spec: PatchSpec {
                unset: Some(vec!["legacy".to_string()]),
                if_revision_id: Some("rev-1".to_string()),
                ..Default::default()
            },
        });
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"patch": {"id": "drafts.foo", "unset": ["legacy"], "ifRevisionId": "rev-1"}})
        );

        let create = Mutation::CreateIfNotExists(Document::new("post").with_id("drafts.a"));
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({"createIfNotExists": {"_id": "drafts.a", "_type": "post"}})
        );
    }

    #[test]
    fn action_wire_shape() {
        let publish = Action::Publish {
            draft_id: "drafts.a".to_string(),
            published_id: "a".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&publish).unwrap(),
            json!({
                "actionType": "sanity.action.document.publish",
                "draftId": "drafts.a",
                "publishedId": "a"
            })
        );

        let schedule = Action::ReleaseSchedule {
            release_id: "spring".to_string(),
            publish_at: "2025-03-01T09:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["actionType"], "sanity.action.release.schedule");
        assert_eq!(value["releaseId"], "spring");
        assert_eq!(value["publishAt"], "2025-03-01T09:00:00Z");
        assert_eq!(schedule.action_type(), "sanity.action.release.schedule");
    }

    #[test]
    fn insert_spec_flattens_location() {
        let insert = InsertSpec {
            location: InsertLocation::After("tags[-1]".to_string()),
            items: vec![json!("new")],
        };
        assert_eq!(
            serde_json::to_value(&insert).unwrap(),
            json!({"after": "tags[-1]", "items": ["new"]})
        );
    }

    #[test]
    fn document_round_trips_extra_fields() {
        let doc: Document =
            serde_json::from_value(json!({"_id": "a", "_type": "post", "title": "T"})).unwrap();
        assert_eq!(doc.id.as_deref(), Some("a"));
        assert_eq!(doc.title(), Some("T"));
    }

    #[test]
    fn visibility_is_sync_or_async() {
        assert_eq!(Visibility::default(), Visibility::Sync);
        assert_eq!(Visibility::Async.as_str(), "async");
        assert_eq!(serde_json::to_value(Visibility::Sync).unwrap(), json!("sync"));
        assert!(serde_json::from_value::<Visibility>(json!("deferred")).is_err());
    }
}
