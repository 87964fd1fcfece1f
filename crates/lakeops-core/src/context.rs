//! Initial context: project, dataset, usage notes and active releases.
//!
//! Loading it opens the `InitialContextGate` for every other operation.

use std::sync::Arc;

use lake_state::{ContentLake, LakeConfig};
use serde::Serialize;
use tracing::warn;

use crate::middleware::{InitialContextGate, INITIAL_CONTEXT_OPERATION};
use crate::obs;
use crate::releases::{ReleaseState, ReleasesApi};

const WELCOME: &str = "Welcome to LakeOps!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRelease {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub state: ReleaseState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialContext {
    pub message: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub project_id: String,
    pub dataset: String,
    pub active_releases: Vec<ActiveRelease>,
    pub note: String,
}

pub struct ContextApi<L> {
    releases: ReleasesApi<L>,
    project_id: String,
    dataset: String,
    gate: Arc<InitialContextGate>,
}

impl<L: ContentLake> ContextApi<L> {
    pub fn new(lake: L, config: &LakeConfig, gate: Arc<InitialContextGate>) -> Self {
        Self {
            releases: ReleasesApi::new(lake, config),
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
            gate,
        }
    }

    pub fn gate(&self) -> &Arc<InitialContextGate> {
        &self.gate
    }

    /// Load the initial context. Never fails: missing pieces become a warning.
    pub async fn initial_context(&self) -> InitialContext {
        obs::emit_op_started(INITIAL_CONTEXT_OPERATION, &self.project_id);
        let mut context = InitialContext {
            message: WELCOME.to_string(),
            instructions: "Use this tool to manage content: create, edit and publish documents, \
                           and group document versions into releases that publish together."
                .to_string(),
            warning: None,
            project_id: self.project_id.clone(),
            dataset: self.dataset.clone(),
            active_releases: Vec::new(),
            note: "Document IDs may be given with or without the drafts. prefix; edits always \
                   apply to the draft."
                .to_string(),
        };

        if self.project_id.trim().is_empty() {
            context.warning = Some(
                "SANITY_PROJECT_ID is not configured. Please set it in your environment variables."
                    .to_string(),
            );
        } else {
            match self.releases.list_releases().await {
                Ok(list) => {
                    context.active_releases = list
                        .releases
                        .iter()
                        .filter(|release| release.is_active())
                        .map(|release| ActiveRelease {
                            id: release.release_id().to_string(),
                            title: release.metadata.title.clone(),
                            state: release.state,
                        })
                        .collect();
                }
                Err(err) => {
                    warn!(error = %err, "could not load active releases for initial context");
                    context.warning = Some("Could not fetch complete initial context.".to_string());
                    context.note =
                        "Make sure your SANITY_TOKEN has the necessary permissions.".to_string();
                }
            }
        }

        self.gate.mark_loaded();
        obs::emit_op_succeeded(INITIAL_CONTEXT_OPERATION, &self.project_id);
        context
    }
}
