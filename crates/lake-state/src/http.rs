//! HTTP data API client
//!
//! Implements `ContentLake` against the hosted data API:
//! - `GET  /v<version>/data/query/<dataset>`
//! - `POST /v<version>/data/mutate/<dataset>?returnIds=true&visibility=<v>`
//! - `POST /v<version>/data/actions/<dataset>`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::backend::{ContentLake, LakeResult};
use crate::config::LakeConfig;
use crate::error::LakeError;
use crate::schema::{Action, ActionResult, Mutation, MutationResult, Query, Visibility};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn describe(self) -> Option<String> {
        match self.error {
            Some(Value::String(s)) => Some(s),
            Some(Value::Object(obj)) => obj
                .get("description")
                .or_else(|| obj.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => self.message,
        }
    }
}

/// Content lake client over HTTP
#[derive(Clone)]
pub struct HttpLake {
    config: LakeConfig,
    http_client: reqwest::Client,
}

impl HttpLake {
    /// Create a new client for the configured project and dataset
    pub fn new(config: LakeConfig) -> LakeResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("lakeops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LakeError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> LakeResult<Self> {
        Self::new(LakeConfig::from_env()?)
    }

    pub fn config(&self) -> &LakeConfig {
        &self.config
    }

    fn endpoint(&self, kind: &str) -> String {
        format!(
            "{}/data/{}/{}",
            self.config.base_url(),
            kind,
            self.config.dataset
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> LakeResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::describe)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(LakeError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| LakeError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl ContentLake for HttpLake {
    #[instrument(skip(self, query), fields(dataset = %self.config.dataset))]
    async fn fetch(&self, query: &Query) -> LakeResult<Vec<Value>> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.query.clone())];
        for (name, value) in &query.params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }
        if let Some(perspective) = &query.perspective {
            pairs.push(("perspective".to_string(), perspective.clone()));
        }

        debug!(query = %query.query, "fetching");
        let request = self.http_client.get(self.endpoint("query")).query(&pairs);
        let response = self.authorize(request).send().await?;
        let body: QueryResponse = Self::read_json(response).await?;

        Ok(match body.result {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }

    #[instrument(skip(self, actions), fields(count = actions.len()))]
    async fn perform_actions(&self, actions: Vec<Action>) -> LakeResult<ActionResult> {
        debug!(
            kinds = ?actions.iter().map(Action::action_type).collect::<Vec<_>>(),
            "dispatching actions"
        );
        let request = self
            .http_client
            .post(self.endpoint("actions"))
            .json(&json!({ "actions": actions }));
        let response = self.authorize(request).send().await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, mutations), fields(count = mutations.len(), visibility = visibility.as_str()))]
    async fn mutate(
        &self,
        mutations: Vec<Mutation>,
        visibility: Visibility,
    ) -> LakeResult<MutationResult> {
        debug!("committing transaction");
        let request = self
            .http_client
            .post(self.endpoint("mutate"))
            .query(&[("returnIds", "true"), ("visibility", visibility.as_str())])
            .json(&json!({ "mutations": mutations }));
        let response = self.authorize(request).send().await?;
        let mut result: MutationResult = Self::read_json(response).await?;
        if result.document_id.is_none() {
            result.document_id = result.results.first().map(|r| r.id.clone());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_include_dataset() {
        let lake = HttpLake::new(LakeConfig::new("proj").with_dataset("staging")).unwrap();
        assert_eq!(
            lake.endpoint("mutate"),
            "https://proj.api.sanity.io/v2024-05-23/data/mutate/staging"
        );
    }

    #[test]
    fn error_body_prefers_description() {
        let body: ErrorBody = serde_json::from_value(json!({
            "error": {"description": "Document not found", "type": "mutationError"}
        }))
        .unwrap();
        assert_eq!(body.describe().as_deref(), Some("Document not found"));

        let body: ErrorBody =
            serde_json::from_value(json!({"message": "Not authorized"})).unwrap();
        assert_eq!(body.describe().as_deref(), Some("Not authorized"));
    }
}
