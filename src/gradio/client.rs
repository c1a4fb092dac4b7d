/// Gradio HTTP client implementation.
///
/// This module provides `GradioClient` for calling a Gradio application (typically a
/// Hugging Face Space) synchronously, along with error types and a builder for
/// configuration.
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{DEFAULT_SPACE, Thresholds};

use super::events::{completion_data, first_string};

/// Hugging Face endpoint that maps a Space id to its serving host.
const SPACE_HOST_API: &str = "https://huggingface.co/api/spaces";

/// Name of the tagging endpoint exposed by the Space.
const PREDICT_ENDPOINT: &str = "predict";

/// Upper bound for waiting on a queued prediction's event stream.
const RESULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors that can occur when interacting with a Gradio application.
#[derive(Debug, Error)]
pub enum GradioError {
    /// Network-related errors (connection failures, DNS resolution, timeouts, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Errors reported by the application itself
    #[error("Gradio API error: {message}")]
    Api { message: String },

    /// Responses that do not follow the expected shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Local file errors while preparing a request
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow interface to the remote tagging model.
///
/// This trait enables substituting the real service with a test double.
pub trait TaggingService {
    /// Tags one image.
    ///
    /// # Arguments
    ///
    /// * `image` - Path of the image file to send
    /// * `model` - Model repository the service should use
    /// * `thresholds` - Confidence cutoffs and MCut switches
    ///
    /// # Returns
    ///
    /// The tag string returned by the service, or an error if the call fails.
    fn predict(
        &self,
        image: &Path,
        model: &str,
        thresholds: &Thresholds,
    ) -> Result<String, GradioError>;
}

impl<T: TaggingService + ?Sized> TaggingService for &T {
    fn predict(
        &self,
        image: &Path,
        model: &str,
        thresholds: &Thresholds,
    ) -> Result<String, GradioError> {
        (**self).predict(image, model, thresholds)
    }
}

/// Builder for constructing `GradioClient` instances.
///
/// # Examples
///
/// ```no_run
/// use wdtag::gradio::GradioClientBuilder;
///
/// let client = GradioClientBuilder::new()
///     .space("SmilingWolf/wd-tagger")
///     .build()
///     .expect("Failed to create client")
///     .connect()
///     .expect("Failed to connect");
/// ```
#[derive(Debug, Default)]
pub struct GradioClientBuilder {
    space: Option<String>,
    base_url: Option<String>,
}

impl GradioClientBuilder {
    /// Creates a new `GradioClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Hugging Face Space id (e.g., "SmilingWolf/wd-tagger").
    pub fn space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    /// Sets the application URL directly, skipping Space host resolution.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds an unconnected client.
    ///
    /// Returns `Err(GradioError::InvalidUrl)` if the base URL override does not parse.
    pub fn build(self) -> Result<GradioClient, GradioError> {
        let base_url = match self.base_url {
            Some(url) => {
                reqwest::Url::parse(&url)
                    .map_err(|e| GradioError::InvalidUrl(format!("{}: {}", url, e)))?;
                Some(url.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(GradioError::Network)?;

        Ok(GradioClient {
            client,
            space: self.space.unwrap_or_else(|| DEFAULT_SPACE.to_string()),
            base_url,
        })
    }
}

/// A configured but not yet connected Gradio client.
pub struct GradioClient {
    client: reqwest::blocking::Client,
    space: String,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpaceHost {
    host: String,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    #[serde(default)]
    api_prefix: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct EventId {
    event_id: String,
}

impl GradioClient {
    /// Returns the Space id this client targets.
    pub fn space(&self) -> &str {
        &self.space
    }

    /// Returns the base URL override, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Resolves the application host and fetches its config.
    ///
    /// Fails if the host cannot be reached, the config cannot be read, or the
    /// application does not expose a `predict` endpoint.
    pub fn connect(self) -> Result<GradioSession, GradioError> {
        let host = match &self.base_url {
            Some(url) => url.clone(),
            None => self.resolve_space_host()?,
        };

        let config: AppConfig = self.get_json(&format!("{host}/config"))?;
        debug!(host = %host, version = ?config.version, "fetched application config");

        if let Some(dependencies) = &config.dependencies
            && !has_endpoint(dependencies, PREDICT_ENDPOINT)
        {
            return Err(GradioError::Protocol(format!(
                "application at {host} has no /{PREDICT_ENDPOINT} endpoint"
            )));
        }

        let api_root = format!("{host}{}", normalize_prefix(config.api_prefix.as_deref()));

        Ok(GradioSession {
            client: self.client,
            api_root,
        })
    }

    fn resolve_space_host(&self) -> Result<String, GradioError> {
        let info: SpaceHost = self.get_json(&format!("{SPACE_HOST_API}/{}/host", self.space))?;
        debug!(space = %self.space, host = %info.host, "resolved space host");
        Ok(info.host.trim_end_matches('/').to_string())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GradioError> {
        let response = self.client.get(url).send().map_err(GradioError::Network)?;
        check_status(&response)?;
        let body = response.text().map_err(GradioError::Network)?;
        serde_json::from_str(&body).map_err(GradioError::Serialization)
    }
}

/// A connected Gradio application ready to serve predictions.
pub struct GradioSession {
    client: reqwest::blocking::Client,
    api_root: String,
}

impl GradioSession {
    /// Root URL that endpoint paths are appended to.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Uploads a file and returns the server-side path Gradio assigned to it.
    fn upload(&self, image: &Path) -> Result<String, GradioError> {
        let form = reqwest::blocking::multipart::Form::new().file("files", image)?;
        let response = self
            .client
            .post(format!("{}/upload", self.api_root))
            .multipart(form)
            .send()
            .map_err(GradioError::Network)?;
        check_status(&response)?;

        let paths: Vec<String> = response.json().map_err(GradioError::Network)?;
        paths
            .into_iter()
            .next()
            .ok_or_else(|| GradioError::Protocol("upload returned no file path".to_string()))
    }

    fn submit(&self, payload: &serde_json::Value) -> Result<String, GradioError> {
        let response = self
            .client
            .post(format!("{}/call/{PREDICT_ENDPOINT}", self.api_root))
            .json(payload)
            .send()
            .map_err(GradioError::Network)?;
        check_status(&response)?;

        let body = response.text().map_err(GradioError::Network)?;
        let id: EventId = serde_json::from_str(&body).map_err(GradioError::Serialization)?;
        Ok(id.event_id)
    }

    fn await_result(&self, event_id: &str) -> Result<serde_json::Value, GradioError> {
        let response = self
            .client
            .get(format!("{}/call/{PREDICT_ENDPOINT}/{event_id}", self.api_root))
            .timeout(RESULT_TIMEOUT)
            .send()
            .map_err(GradioError::Network)?;
        check_status(&response)?;

        let body = response.text().map_err(GradioError::Network)?;
        completion_data(&body)
    }
}

impl TaggingService for GradioSession {
    fn predict(
        &self,
        image: &Path,
        model: &str,
        thresholds: &Thresholds,
    ) -> Result<String, GradioError> {
        let remote_path = self.upload(image)?;
        let orig_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let payload = predict_payload(&remote_path, &orig_name, model, thresholds);

        let event_id = self.submit(&payload)?;
        debug!(image = %image.display(), event_id = %event_id, "prediction queued");

        let result = self.await_result(&event_id)?;
        first_string(&result)
    }
}

/// Builds the `/call/predict` request body.
///
/// Argument order follows the endpoint signature: image, model repository,
/// general threshold, general MCut, character threshold, character MCut.
pub fn predict_payload(
    remote_path: &str,
    orig_name: &str,
    model: &str,
    thresholds: &Thresholds,
) -> serde_json::Value {
    serde_json::json!({
        "data": [
            {
                "path": remote_path,
                "orig_name": orig_name,
                "meta": { "_type": "gradio.FileData" }
            },
            model,
            thresholds.general,
            thresholds.general_mcut,
            thresholds.character,
            thresholds.character_mcut,
        ]
    })
}

/// Normalizes the config's `api_prefix` into `""` or `/segment`.
fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("/{p}"),
        _ => String::new(),
    }
}

fn has_endpoint(dependencies: &[serde_json::Value], name: &str) -> bool {
    dependencies.iter().any(|dep| {
        dep.get("api_name")
            .and_then(|n| n.as_str())
            .is_some_and(|n| n.trim_start_matches('/') == name)
    })
}

fn check_status(response: &reqwest::blocking::Response) -> Result<(), GradioError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(GradioError::Http {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn http_error_variant_with_status_code() {
        let error = GradioError::Http { status: 503 };
        let msg = format!("{}", error);
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn serialization_error_variant_wraps_serde_errors() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = GradioError::Serialization(json_error);
        assert!(format!("{}", error).contains("Serialization error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let error: GradioError = io.into();
        assert!(matches!(error, GradioError::Io(_)));
        assert!(error.to_string().contains("missing.png"));
    }

    #[test]
    fn builder_defaults_to_wd_tagger_space() {
        let client = GradioClientBuilder::new().build().unwrap();
        assert_eq!(client.space(), "SmilingWolf/wd-tagger");
        assert_eq!(client.base_url(), None);
    }

    #[test]
    fn builder_trims_trailing_slash_from_base_url() {
        let client = GradioClientBuilder::new()
            .base_url("http://localhost:7860/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), Some("http://localhost:7860"));
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = GradioClientBuilder::new()
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(GradioError::InvalidUrl(_))));
    }

    #[test]
    fn connect_to_unreachable_host_fails() {
        let client = GradioClientBuilder::new()
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        assert!(matches!(client.connect(), Err(GradioError::Network(_))));
    }

    #[test]
    fn predict_payload_orders_arguments_like_the_endpoint() {
        let thresholds = Thresholds::default();
        let payload = predict_payload("/tmp/gradio/cat.png", "cat.png", "model/repo", &thresholds);
        let data = payload["data"].as_array().unwrap();

        assert_eq!(data.len(), 6);
        assert_eq!(data[0]["path"], "/tmp/gradio/cat.png");
        assert_eq!(data[0]["orig_name"], "cat.png");
        assert_eq!(data[0]["meta"]["_type"], "gradio.FileData");
        assert_eq!(data[1], "model/repo");
        assert_eq!(data[2], 0.45);
        assert_eq!(data[3], false);
        assert_eq!(data[4], 0.85);
        assert_eq!(data[5], false);
    }

    #[test]
    fn normalize_prefix_handles_missing_and_slashed_values() {
        assert_eq!(normalize_prefix(None), "");
        assert_eq!(normalize_prefix(Some("")), "");
        assert_eq!(normalize_prefix(Some("/gradio_api")), "/gradio_api");
        assert_eq!(normalize_prefix(Some("gradio_api/")), "/gradio_api");
    }

    #[test]
    fn has_endpoint_matches_with_or_without_slash() {
        let deps = vec![
            serde_json::json!({"api_name": "other"}),
            serde_json::json!({"api_name": "/predict"}),
        ];
        assert!(has_endpoint(&deps, "predict"));
        assert!(!has_endpoint(&deps[..1], "predict"));
        assert!(!has_endpoint(&[serde_json::json!({"api_name": null})], "predict"));
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockService {
            response: String,
        }

        impl TaggingService for MockService {
            fn predict(
                &self,
                _image: &Path,
                _model: &str,
                _thresholds: &Thresholds,
            ) -> Result<String, GradioError> {
                Ok(self.response.clone())
            }
        }

        let mock = MockService {
            response: "1girl, solo".to_string(),
        };
        let result = mock.predict(Path::new("a.png"), "m", &Thresholds::default());
        assert_eq!(result.unwrap(), "1girl, solo");
    }
}
