//! Remote container registry metadata lookup.

use crate::{Error, Result};

/// Default metadata endpoint template.
///
/// Placeholders: `{registry}`, `{organization}`, `{repository}`, `{tag}`.
pub const DEFAULT_METADATA_URL_TEMPLATE: &str =
    "https://{registry}/v2/{organization}/{repository}/manifests/{tag}";

/// Thin client for fetching image metadata from a container registry.
#[derive(Debug)]
pub struct RegistryClient {
    url_template: String,
    client: reqwest::blocking::Client,
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_URL_TEMPLATE)
    }
}

impl RegistryClient {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Fetch the metadata document for a fully-qualified image reference.
    ///
    /// A `404` from the registry is reported as [`Error::ImageNotFound`];
    /// other HTTP failures propagate as-is.
    pub fn image_metadata(
        &self,
        registry: &str,
        organization: &str,
        repository: &str,
        tag: &str,
    ) -> Result<serde_json::Value> {
        let url = self
            .url_template
            .replace("{registry}", registry)
            .replace("{organization}", organization)
            .replace("{repository}", repository)
            .replace("{tag}", tag);
        tracing::debug!(%url, "fetching image metadata");

        let response = self.client.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ImageNotFound {
                image: format!("{registry}/{organization}/{repository}:{tag}"),
            });
        }
        let response = response.error_for_status()?;
        Ok(response.json()?)
    }
}
