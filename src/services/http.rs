//! reqwest-backed implementations of the pipeline services.
//!
//! All three talk plain JSON over HTTPS to endpoints taken from
//! [`PlantifyConfig`]. Authentication is an `api_key` header when a key is
//! configured.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use super::{AnalysisService, PlantStore, UploadService, UploadedFile};
use crate::config::{lookup_api_key, PlantifyConfig};
use crate::garden::{ListOrder, PlantRecord, SavedPlant};

/// Source of the `api_key` header.
#[derive(Debug, Clone)]
pub enum ApiKey {
    Anonymous,
    Fixed(String),
    /// Looked up on every request, so a newly stored key applies at once.
    Lookup { env_var: String },
}

impl ApiKey {
    fn from_config(config: &PlantifyConfig) -> Self {
        ApiKey::Lookup {
            env_var: config.services.api_key_env.clone(),
        }
    }

    fn current(&self) -> Option<String> {
        match self {
            ApiKey::Anonymous => None,
            ApiKey::Fixed(key) => Some(key.clone()),
            ApiKey::Lookup { env_var } => lookup_api_key(env_var),
        }
    }
}

/// Build a reqwest client with the given request timeout.
fn build_api_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}

fn send_error(e: reqwest::Error, service: &str, timeout: Duration) -> String {
    let msg = if e.is_timeout() {
        format!("{} request timed out after {}s", service, timeout.as_secs())
    } else {
        format!("{} request failed: {}", service, e)
    };
    error!("{}", msg);
    msg
}

/// Check status and extract body text.
async fn handle_api_response(response: reqwest::Response, service: &str) -> Result<String, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated = if body.len() > 1024 {
            let mut end = 1024;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &body[..end])
        } else {
            body
        };
        let msg = format!("{} error: {} - {}", service, status, truncated);
        error!("{}", msg);
        return Err(msg);
    }
    response
        .text()
        .await
        .map_err(|e| format!("Failed to read {} response body: {}", service, e))
}

fn with_api_key(request: reqwest::RequestBuilder, api_key: &ApiKey) -> reqwest::RequestBuilder {
    match api_key.current() {
        Some(key) => request.header("api_key", key),
        None => request,
    }
}

/// Multipart file upload returning `{ "file_url": ... }`.
pub struct HttpUploadService {
    client: reqwest::Client,
    url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl HttpUploadService {
    pub fn new(url: impl Into<String>, api_key: ApiKey, timeout: Duration) -> Result<Self, String> {
        Ok(Self {
            client: build_api_client(timeout)?,
            url: url.into(),
            api_key,
            timeout,
        })
    }

    pub fn from_config(config: &PlantifyConfig) -> Result<Self, String> {
        Self::new(
            config.services.upload_url.clone(),
            ApiKey::from_config(config),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl UploadService for HttpUploadService {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        media_type: &str,
    ) -> Result<UploadedFile, String> {
        info!("Uploading '{}' ({}, {} bytes)", file_name, media_type, bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(media_type)
            .map_err(|e| format!("Invalid media type '{}': {}", media_type, e))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = with_api_key(self.client.post(&self.url), &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(e, "Upload", self.timeout))?;

        let body = handle_api_response(response, "Upload").await?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse upload response: {}", e))?;

        let file_url = json["file_url"]
            .as_str()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| "Upload response has no file_url".to_string())?;

        Url::parse(file_url).map_err(|e| format!("Upload returned invalid URL '{}': {}", file_url, e))?;

        info!("Uploaded '{}' to {}", file_name, file_url);
        Ok(UploadedFile {
            file_url: file_url.to_string(),
        })
    }
}

/// LLM invocation endpoint taking `{prompt, file_urls, response_json_schema}`.
pub struct HttpAnalysisService {
    client: reqwest::Client,
    url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl HttpAnalysisService {
    pub fn new(url: impl Into<String>, api_key: ApiKey, timeout: Duration) -> Result<Self, String> {
        Ok(Self {
            client: build_api_client(timeout)?,
            url: url.into(),
            api_key,
            timeout,
        })
    }

    pub fn from_config(config: &PlantifyConfig) -> Result<Self, String> {
        Self::new(
            config.services.analysis_url.clone(),
            ApiKey::from_config(config),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn invoke(
        &self,
        prompt: &str,
        file_urls: &[String],
        response_schema: Option<&Value>,
    ) -> Result<Value, String> {
        let mut body = serde_json::json!({
            "prompt": prompt,
            "file_urls": file_urls,
        });
        if let Some(schema) = response_schema {
            body["response_json_schema"] = schema.clone();
        }

        info!("Invoking analysis with {} file(s)", file_urls.len());

        let response = with_api_key(self.client.post(&self.url), &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, "Analysis", self.timeout))?;

        let text = handle_api_response(response, "Analysis").await?;
        Ok(decode_analysis_body(&text))
    }
}

/// Decode the analysis endpoint's body.
///
/// JSON bodies are returned as-is, except a lone `{"response": ...}`
/// envelope which is unwrapped. Non-JSON bodies come back as a string for
/// the caller to interpret.
fn decode_analysis_body(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(mut map)) if map.len() == 1 && map.contains_key("response") => {
            map.remove("response").unwrap_or(Value::Null)
        }
        Ok(value) => value,
        Err(_) => Value::String(text.to_string()),
    }
}

/// Remote entity API for saved plants.
pub struct HttpPlantStore {
    client: reqwest::Client,
    url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl HttpPlantStore {
    pub fn new(url: impl Into<String>, api_key: ApiKey, timeout: Duration) -> Result<Self, String> {
        Ok(Self {
            client: build_api_client(timeout)?,
            url: url.into(),
            api_key,
            timeout,
        })
    }

    pub fn from_config(config: &PlantifyConfig) -> Result<Self, String> {
        Self::new(
            config.services.entity_url.clone(),
            ApiKey::from_config(config),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl PlantStore for HttpPlantStore {
    async fn create(&self, record: &PlantRecord) -> Result<String, String> {
        let response = with_api_key(self.client.post(&self.url), &self.api_key)
            .json(record)
            .send()
            .await
            .map_err(|e| send_error(e, "Plant create", self.timeout))?;

        let body = handle_api_response(response, "Plant create").await?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse plant create response: {}", e))?;

        let id = match &json["id"] {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err("Plant create response has no id".to_string()),
        };
        info!("Created remote plant {} ({})", id, record.common_name);
        Ok(id)
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<SavedPlant>, String> {
        let response = with_api_key(self.client.get(&self.url), &self.api_key)
            .query(&[("sort", order.sort_key())])
            .send()
            .await
            .map_err(|e| send_error(e, "Plant list", self.timeout))?;

        let body = handle_api_response(response, "Plant list").await?;
        serde_json::from_str(&body).map_err(|e| format!("Failed to parse plant list: {}", e))
    }
}
