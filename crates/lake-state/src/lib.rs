//! Lake-State: Content Lake Backend for LakeOps
//!
//! This crate is the only place that talks to the remote structured-content
//! backend. It exposes the backend's two primitives, queries and atomic
//! commits (transactions and action dispatches), behind one async trait.
//!
//! ## Layer 0 - Backend
//!
//! Focus: wire fidelity, atomic commit boundaries, and error surfacing.
//!
//! ## Key Components
//!
//! - `ContentLake`: the backend capability trait
//! - `HttpLake`: implementation over the hosted HTTP data API
//! - `LakeConfig`: immutable project/dataset/version/token configuration
//! - `fakes::MemoryLake`: call-recording fake for tests

pub mod backend;
mod config;
mod error;
pub mod fakes;
mod http;
pub mod schema;

pub use backend::{ContentLake, LakeResult};
pub use config::{LakeConfig, DEFAULT_API_VERSION, DEFAULT_DATASET};
pub use error::LakeError;
pub use http::HttpLake;
pub use schema::{
    Action, ActionResult, Content, Document, InsertLocation, InsertSpec, Mutation,
    MutationOutcome, MutationResult, PatchMutation, PatchSpec, Query, ReleaseMetadata,
    ReleasePatch, ReleaseSet, ReleaseType, Visibility,
};
