//! API version guard for Content Releases.
//!
//! Dated API versions are compared as calendar dates, never as strings.

use chrono::NaiveDate;

use crate::error::{OpsError, Result};

/// Oldest API version that supports Content Releases.
pub const REQUIRED_RELEASES_API_VERSION: &str = "2024-05-23";

/// A backend API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApiVersion {
    Dated(NaiveDate),
    /// `X`: the experimental channel, newer than any dated version
    Experimental,
}

impl ApiVersion {
    /// Parse `2024-05-23`, `v2024-05-23` or `X`/`vX`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if bare.eq_ignore_ascii_case("x") {
            return Some(ApiVersion::Experimental);
        }
        NaiveDate::parse_from_str(bare, "%Y-%m-%d")
            .ok()
            .map(ApiVersion::Dated)
    }
}

/// Whether `current` is at least `required`. Unparseable versions never are.
pub fn is_sufficient(current: &str, required: &str) -> bool {
    match (ApiVersion::parse(current), ApiVersion::parse(required)) {
        (Some(current), Some(required)) => current >= required,
        _ => false,
    }
}

/// Fail fast when `current` predates Content Releases support.
pub fn ensure_release_support(current: &str) -> Result<()> {
    if is_sufficient(current, REQUIRED_RELEASES_API_VERSION) {
        return Ok(());
    }
    Err(OpsError::VersionIncompatible {
        current: current.to_string(),
        required: REQUIRED_RELEASES_API_VERSION.to_string(),
    })
}
