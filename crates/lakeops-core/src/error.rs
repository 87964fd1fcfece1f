//! Error taxonomy for LakeOps orchestration.

use lake_state::LakeError;

/// Malformed or empty input, always raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No valid document IDs provided")]
    NoDocumentIds,

    #[error("No valid version IDs provided")]
    NoVersionIds,

    #[error("Empty array of documents provided")]
    NoDocuments,

    #[error("Document must have a _type field")]
    MissingType,

    #[error("Document must have an _id field to replace")]
    MissingId,

    #[error("Document field {field} must be a string")]
    InvalidField { field: String },

    #[error("intendedPublishAt is required for scheduled releases")]
    MissingPublishAt,

    #[error("Invalid timestamp {value}: expected an RFC 3339 date-time")]
    InvalidTimestamp { value: String },

    #[error("Release ID must not be empty")]
    EmptyReleaseId,

    #[error("Transaction has no staged operations")]
    EmptyTransaction,
}

/// Orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "API version {current} is outdated. Please update to version {required} or later to use \
         Content Releases. You can do this by updating your SANITY_API_VERSION in .env or config."
    )]
    VersionIncompatible { current: String, required: String },

    #[error("{operation}: {source}")]
    Backend {
        operation: String,
        #[source]
        source: LakeError,
    },

    #[error("Release contains {count} documents, which exceeds the {limit} document limit")]
    ReleaseLimitExceeded { count: usize, limit: usize },

    #[error("Release with ID {0} not found")]
    ReleaseNotFound(String),

    #[error("Document {0} not found")]
    DocumentNotFound(String),

    /// Backend refusal translated into caller guidance.
    #[error("{guidance}")]
    Rejected {
        guidance: String,
        #[source]
        source: LakeError,
    },

    #[error("Release {release_id} cannot {transition} while {state}")]
    InvalidTransition {
        release_id: String,
        state: String,
        transition: String,
    },

    #[error("{summary}: {}", .reasons.join("; "))]
    BatchFailed {
        summary: String,
        reasons: Vec<String>,
    },

    #[error("Cannot run {operation}: {reason}")]
    PreconditionFailed { operation: String, reason: String },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<OpsError>,
    },
}

impl OpsError {
    /// Wrap a backend failure with the step that produced it.
    pub fn backend(operation: impl Into<String>, source: LakeError) -> Self {
        OpsError::Backend {
            operation: operation.into(),
            source,
        }
    }

    /// Annotate with operation-level context.
    pub fn during(self, context: impl Into<String>) -> Self {
        OpsError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, below every context annotation.
    pub fn root(&self) -> &OpsError {
        match self {
            OpsError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The backend error at the root, if any.
    pub fn lake_error(&self) -> Option<&LakeError> {
        match self.root() {
            OpsError::Backend { source, .. } | OpsError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for LakeOps operations.
pub type Result<T> = std::result::Result<T, OpsError>;
