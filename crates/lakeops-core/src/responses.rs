//! Result shapes returned by orchestration operations.
//!
//! Every successful operation answers `{success, message, <ids>, result}` in
//! camelCase. `edit` is the one operation whose failures come back as a value
//! (`EditOutcome::Failed`) instead of an error.

use lake_state::MutationResult;
use serde::Serialize;

/// Identifiers an operation reports, mirroring the caller's scalar/list input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Targets {
    #[serde(rename = "documentId")]
    Document(String),
    #[serde(rename = "documentIds")]
    Documents(Vec<String>),
    #[serde(rename = "draftId")]
    Draft(String),
    #[serde(rename = "draftIds")]
    Drafts(Vec<String>),
    #[serde(rename = "versionId")]
    Version(String),
    #[serde(rename = "versionIds")]
    Versions(Vec<String>),
}

impl Targets {
    pub fn documents(mut ids: Vec<String>, many: bool) -> Self {
        if many || ids.len() != 1 {
            Targets::Documents(ids)
        } else {
            Targets::Document(ids.remove(0))
        }
    }

    pub fn drafts(mut ids: Vec<String>, many: bool) -> Self {
        if many || ids.len() != 1 {
            Targets::Drafts(ids)
        } else {
            Targets::Draft(ids.remove(0))
        }
    }

    pub fn versions(mut ids: Vec<String>, many: bool) -> Self {
        if many || ids.len() != 1 {
            Targets::Versions(ids)
        } else {
            Targets::Version(ids.remove(0))
        }
    }

    /// Every reported ID, in order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Targets::Document(id) | Targets::Draft(id) | Targets::Version(id) => vec![id.as_str()],
            Targets::Documents(ids) | Targets::Drafts(ids) | Targets::Versions(ids) => {
                ids.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn count(&self) -> usize {
        self.ids().len()
    }
}

/// Successful document-level operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpResponse<R> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub targets: Targets,
    pub result: R,
}

impl<R> OpResponse<R> {
    pub fn new(message: impl Into<String>, targets: Targets, result: R) -> Self {
        Self {
            success: true,
            message: message.into(),
            targets,
            result,
        }
    }
}

/// Failure reported by `edit` in place of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFailure {
    pub success: bool,
    pub message: String,
}

/// Outcome of an edit: applied, or failed with a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EditOutcome {
    Applied(OpResponse<MutationResult>),
    Failed(EditFailure),
}

impl EditOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        EditOutcome::Failed(EditFailure {
            success: false,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EditOutcome::Applied(_))
    }

    pub fn message(&self) -> &str {
        match self {
            EditOutcome::Applied(response) => &response.message,
            EditOutcome::Failed(failure) => &failure.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn targets_follow_input_shape() {
        assert_eq!(
            Targets::documents(vec!["a".to_string()], false),
            Targets::Document("a".to_string())
        );
        assert_eq!(
            Targets::documents(vec!["a".to_string()], true),
            Targets::Documents(vec!["a".to_string()])
        );
    }

    #[test]
    fn response_flattens_targets() {
        let response = OpResponse::new(
            "Document a published successfully",
            Targets::documents(vec!["a".to_string()], false),
            json!({"transactionId": "t1"}),
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "Document a published successfully",
                "documentId": "a",
                "result": {"transactionId": "t1"}
            })
        );
    }

    #[test]
    fn failed_edit_serializes_as_failure_object() {
        let outcome = EditOutcome::failed("No valid document IDs provided");
        assert!(!outcome.is_success());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "message": "No valid document IDs provided"})
        );
    }
}
