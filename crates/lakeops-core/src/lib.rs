//! LakeOps Core Library
//!
//! Orchestration over a content lake: identifier bookkeeping, patch and
//! transaction assembly, batch failure policies, document operations and the
//! release lifecycle.

pub mod batch;
pub mod context;
pub mod documents;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod obs;
pub mod patch;
pub mod releases;
pub mod responses;
pub mod telemetry;
pub mod transaction;
pub mod version;

pub use batch::{best_effort, prepare_all, try_all, BatchReport, ItemFailure};
pub use context::{ActiveRelease, ContextApi, InitialContext};
pub use documents::{CreateOptions, DeleteOptions, DocumentsApi, IfExists};
pub use error::{OpsError, Result, ValidationError};
pub use ids::{
    base_id, base_id_from_version, draft_id, process_document_ids, release_document_id,
    version_id, OneOrMany,
};
pub use middleware::{Guarded, InitialContextGate, Precondition, INITIAL_CONTEXT_OPERATION};
pub use patch::{PatchBuilder, PatchOperations, Paths};
pub use releases::{
    CreateReleaseOptions, MembershipResponse, Release, ReleaseDocument, ReleaseDocuments,
    ReleaseInfo, ReleaseList, ReleaseLookup, ReleaseResponse, ReleaseState, ReleaseTransition,
    ReleaseUpdate, ReleasesApi, RELEASE_DOCUMENT_LIMIT,
};
pub use responses::{EditFailure, EditOutcome, OpResponse, Targets};
pub use transaction::TransactionBuilder;
pub use version::{ensure_release_support, is_sufficient, REQUIRED_RELEASES_API_VERSION};

pub use obs::{op_span, traced};
pub use telemetry::init_tracing;

/// LakeOps version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
