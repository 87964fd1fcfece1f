//! Backend connection configuration.

use crate::error::LakeError;

/// Dataset used when none is configured.
pub const DEFAULT_DATASET: &str = "production";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-05-23";

/// Immutable configuration for one project/dataset pair.
///
/// Built once at startup and handed to every API value explicitly; nothing in
/// the workspace reads process state after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LakeConfig {
    /// Project identifier (e.g. "abc123xy")
    pub project_id: String,
    /// Dataset name (default: "production")
    pub dataset: String,
    /// Dated API version without the leading `v` (e.g. "2024-05-23")
    pub api_version: String,
    /// Bearer token for authenticated requests
    pub token: Option<String>,
    /// Override for the API host (default: `https://<project_id>.api.sanity.io`)
    pub api_host: Option<String>,
}

impl LakeConfig {
    /// Create a configuration for a project with default dataset and API version
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            api_host: None,
        }
    }

    /// Set custom dataset
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    /// Set the API version; a leading `v` is accepted and dropped
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = normalize_api_version(&version.into());
        self
    }

    /// Set authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set custom API host
    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into().trim_end_matches('/').to_string());
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SANITY_PROJECT_ID (required)
    /// - SANITY_DATASET (optional, default: "production")
    /// - SANITY_API_VERSION (optional, default: "2024-05-23")
    /// - SANITY_TOKEN (optional)
    /// - SANITY_API_HOST (optional)
    pub fn from_env() -> Result<Self, LakeError> {
        let project_id = std::env::var("SANITY_PROJECT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| LakeError::Config("SANITY_PROJECT_ID not set".to_string()))?;

        let mut config = Self::new(project_id);
        if let Ok(dataset) = std::env::var("SANITY_DATASET") {
            if !dataset.trim().is_empty() {
                config = config.with_dataset(dataset);
            }
        }
        if let Ok(version) = std::env::var("SANITY_API_VERSION") {
            if !version.trim().is_empty() {
                config = config.with_api_version(version);
            }
        }
        if let Ok(token) = std::env::var("SANITY_TOKEN") {
            if !token.trim().is_empty() {
                config = config.with_token(token);
            }
        }
        if let Ok(host) = std::env::var("SANITY_API_HOST") {
            if !host.trim().is_empty() {
                config = config.with_api_host(host);
            }
        }
        Ok(config)
    }

    /// Versioned base URL for data API requests.
    pub fn base_url(&self) -> String {
        let host = self
            .api_host
            .clone()
            .unwrap_or_else(|| format!("https://{}.api.sanity.io", self.project_id));
        format!("{}/v{}", host, self.api_version)
    }
}

fn normalize_api_version(version: &str) -> String {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = LakeConfig::new("proj");
        assert_eq!(config.dataset, "production");
        assert_eq!(config.api_version, "2024-05-23");
        assert!(config.token.is_none());
    }

    #[test]
    fn api_version_prefix_is_dropped() {
        let config = LakeConfig::new("proj").with_api_version("v2025-02-19");
        assert_eq!(config.api_version, "2025-02-19");
    }

    #[test]
    fn base_url_uses_project_host() {
        let config = LakeConfig::new("proj").with_api_version("2024-05-23");
        assert_eq!(config.base_url(), "https://proj.api.sanity.io/v2024-05-23");

        let config = config.with_api_host("http://localhost:3333/");
        assert_eq!(config.base_url(), "http://localhost:3333/v2024-05-23");
    }
}
