//! Patch builder
//!
//! `PatchOperations` is the caller-facing operation set; `PatchBuilder` turns
//! it (or chained calls) into a sparse `PatchSpec` aimed at one draft ID.
//! Building is pure: no I/O, no validation of revision guards.

use lake_state::{Content, InsertLocation, InsertSpec, PatchMutation, PatchSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids;

/// Field paths for `unset`, accepted as a single path or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paths {
    One(String),
    Many(Vec<String>),
}

impl Paths {
    fn into_vec(self) -> Vec<String> {
        match self {
            Paths::One(path) => vec![path],
            Paths::Many(paths) => paths,
        }
    }
}

/// Caller-supplied patch operations, in the camelCase JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOperations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_if_missing: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unset: Option<Paths>,
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

/// Accumulates patch groups; empty inputs never create a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchBuilder {
    spec: PatchSpec,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated from a caller operation set.
    pub fn from_operations(ops: &PatchOperations) -> Self {
        let mut builder = Self::new();
        if let Some(set) = &ops.set {
            builder = builder.set(set.clone());
        }
        if let Some(set) = &ops.set_if_missing {
            builder = builder.set_if_missing(set.clone());
        }
        if let Some(paths) = &ops.unset {
            builder = builder.unset(paths.clone().into_vec());
        }
        if let Some(inc) = &ops.inc {
            builder = builder.inc(inc.clone());
        }
        if let Some(dec) = &ops.dec {
            builder = builder.dec(dec.clone());
        }
        if let Some(insert) = &ops.insert {
            builder = builder.insert(insert.location.clone(), insert.items.clone());
        }
        if let Some(dmp) = &ops.diff_match_patch {
            builder = builder.diff_match_patch(dmp.clone());
        }
        if let Some(rev) = &ops.if_revision_id {
            builder = builder.if_revision_id(rev.clone());
        }
        builder
    }

    pub fn set(mut self, fields: Content) -> Self {
        merge_group(&mut self.spec.set, fields);
        self
    }

    pub fn set_field(self, path: impl Into<String>, value: Value) -> Self {
        let mut fields = Content::new();
        fields.insert(path.into(), value);
        self.set(fields)
    }

    pub fn set_if_missing(mut self, fields: Content) -> Self {
        merge_group(&mut self.spec.set_if_missing, fields);
        self
    }

    pub fn unset<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.is_empty())
            .collect();
        if !paths.is_empty() {
            self.spec.unset.get_or_insert_with(Vec::new).extend(paths);
        }
        self
    }

    pub fn inc(mut self, amounts: Content) -> Self {
        merge_group(&mut self.spec.inc, amounts);
        self
    }

    pub fn dec(mut self, amounts: Content) -> Self {
        merge_group(&mut self.spec.dec, amounts);
        self
    }

    /// Insert `items` relative to a path. Replaces any earlier insert.
    pub fn insert(mut self, location: InsertLocation, items: Vec<Value>) -> Self {
        if !items.is_empty() {
            self.spec.insert = Some(InsertSpec { location, items });
        }
        self
    }

    pub fn diff_match_patch(mut self, patches: Content) -> Self {
        merge_group(&mut self.spec.diff_match_patch, patches);
        self
    }

    /// Revision guard, passed through verbatim for the backend to enforce.
    pub fn if_revision_id(mut self, revision: impl Into<String>) -> Self {
        let revision = revision.into();
        if !revision.is_empty() {
            self.spec.if_revision_id = Some(revision);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }

    pub fn build(self) -> PatchSpec {
        self.spec
    }

    /// Patch mutation addressed to the draft form of `document_id`.
    pub fn for_document(self, document_id: &str) -> PatchMutation {
        PatchMutation {
            id: ids::draft_id(document_id),
            spec: self.spec,
        }
    }
}

fn merge_group(group: &mut Option<Content>, fields: Content) {
    if fields.is_empty() {
        return;
    }
    group.get_or_insert_with(Content::new).extend(fields);
}
