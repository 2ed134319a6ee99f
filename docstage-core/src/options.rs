//! Construction-time options for connecting to the remote service.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Connection target, credentials, and dataset selection for a remote
/// document database.
///
/// The core treats these as opaque beyond validation; the HTTP client
/// derives its endpoint and auth header from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    /// Project identifier, the tenant half of the default endpoint.
    pub project_id: String,
    /// Dataset within the project to read and mutate.
    pub dataset: String,
    /// Bearer token; anonymous access when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Remote API version segment. Empty means `v1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// Route reads through the CDN edge instead of the live API.
    #[serde(default)]
    pub use_cdn: bool,
    /// Full base URL override, for self-hosted services and tests. When
    /// set, `project_id` no longer participates in the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ConnectionOptions {
    /// Creates options for the given project and dataset.
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            ..Self::default()
        }
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The API version segment, defaulted.
    pub fn api_version(&self) -> &str {
        if self.api_version.is_empty() {
            "v1"
        } else {
            &self.api_version
        }
    }

    /// Checks that every required option is present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] when `project_id` (without a
    /// base-URL override) or `dataset` is empty. This is the synchronous,
    /// pre-network failure path for misconfigured contexts.
    pub fn validate(&self) -> StoreResult<()> {
        if self.base_url.is_none() && self.project_id.is_empty() {
            return Err(StoreError::Configuration(
                "project_id is required".to_string(),
            ));
        }
        if self.dataset.is_empty() {
            return Err(StoreError::Configuration("dataset is required".to_string()));
        }

        Ok(())
    }

    /// The data-API endpoint derived from these options, without a
    /// trailing slash.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}/data", base.trim_end_matches('/'), self.api_version()),
            None => {
                let host = if self.use_cdn { "apicdn" } else { "api" };
                format!(
                    "https://{}.{}.docstage.dev/{}/data",
                    self.project_id,
                    host,
                    self.api_version(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_id_is_a_configuration_error() {
        let options = ConnectionOptions::new("", "production");
        assert!(matches!(
            options.validate(),
            Err(StoreError::Configuration(_)),
        ));
    }

    #[test]
    fn missing_dataset_is_a_configuration_error() {
        let options = ConnectionOptions::new("my-project", "");
        assert!(matches!(
            options.validate(),
            Err(StoreError::Configuration(_)),
        ));
    }

    #[test]
    fn base_url_override_stands_in_for_project_id() {
        let options =
            ConnectionOptions::new("", "production").with_base_url("http://localhost:3333/");
        assert!(options.validate().is_ok());
        assert_eq!(options.endpoint(), "http://localhost:3333/v1/data");
    }

    #[test]
    fn default_endpoint_uses_project_and_cdn_flag() {
        let mut options = ConnectionOptions::new("my-project", "production");
        assert_eq!(
            options.endpoint(),
            "https://my-project.api.docstage.dev/v1/data",
        );

        options.use_cdn = true;
        assert_eq!(
            options.endpoint(),
            "https://my-project.apicdn.docstage.dev/v1/data",
        );
    }
}
