use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{AssetReference, RemoteStore, StoreError, StoredObject, UploadOptions};
use crate::session::SessionToken;

/// Header carrying the overwrite flag on uploads.
const UPSERT_HEADER: &str = "x-upsert";
const API_KEY_HEADER: &str = "apikey";
const DEFAULT_USER_AGENT: &str = concat!("avatar-sync/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Objects live at `{base_url}/{bucket}/{path}`.
    pub base_url: Url,
    /// Project key sent as `apikey` alongside the bearer token, if the store wants one.
    pub api_key: Option<String>,
    /// No timeout when unset; a stalled call resolves only when the transport fails it.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Upload,
    Download,
}

/// JSON error body some hosted stores return instead of a bare status,
/// e.g. `{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: Option<serde_json::Value>,
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<u16> {
        match self.status_code.as_ref()? {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }
}

/// Map a non-2xx response to a typed error.
///
/// Conflicts are only recognised on uploads and missing objects only on
/// downloads; anything else means the store could not serve the request.
fn classify_failure(
    op: Operation,
    status: u16,
    body: &str,
    bucket: &str,
    path: &AssetReference,
) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code().unwrap_or(status);
    let error = parsed.error.as_deref().unwrap_or("");

    match op {
        Operation::Upload
            if status == 409 || code == 409 || error.eq_ignore_ascii_case("duplicate") =>
        {
            return StoreError::Conflict {
                bucket: bucket.to_string(),
                path: path.to_string(),
            };
        }
        Operation::Download
            if status == 404 || code == 404 || error.eq_ignore_ascii_case("not_found") =>
        {
            return StoreError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            };
        }
        _ => {}
    }

    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());
    StoreError::Unavailable {
        status,
        path: format!("{}/{}", bucket, path),
        message,
    }
}

/// Object store client over HTTP.
///
/// The session token is baked into the client's default headers at
/// construction, so every request carries it.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(config: StoreConfig, token: SessionToken) -> anyhow::Result<Self> {
        if config.base_url.cannot_be_a_base() {
            anyhow::bail!("Store URL {} cannot hold object paths", config.base_url);
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            AUTHORIZATION,
            token
                .bearer_header()
                .context("Session token contains characters not allowed in a header")?,
        );
        if let Some(key) = &config.api_key {
            let mut value =
                HeaderValue::from_str(key).context("API key contains invalid characters")?;
            value.set_sensitive(true);
            default_headers.insert(API_KEY_HEADER, value);
        }
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url,
        })
    }

    /// `{base_url}/{bucket}/{path}` with each segment percent-encoded.
    fn object_url(&self, bucket: &str, path: &AssetReference) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(bucket)
            .extend(path.segments());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl RemoteStore for HttpStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &AssetReference,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        let url = self.object_url(bucket, path)?;
        let size = bytes.len();
        let mut builder = self
            .client
            .put(url.clone())
            .header(UPSERT_HEADER, if options.overwrite { "true" } else { "false" })
            .body(bytes);
        if let Some(content_type) = &options.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        tracing::debug!(%url, size, overwrite = options.overwrite, "PUT object");
        let response = builder.send().await.map_err(|e| StoreError::Transport {
            source: e,
            path: format!("{}/{}", bucket, path),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "PUT rejected");
        Err(classify_failure(
            Operation::Upload,
            status.as_u16(),
            &body,
            bucket,
            path,
        ))
    }

    async fn download(&self, bucket: &str, path: &AssetReference) -> Result<StoredObject, StoreError> {
        let url = self.object_url(bucket, path)?;
        let transport = |e: reqwest::Error| StoreError::Transport {
            source: e,
            path: format!("{}/{}", bucket, path),
        };

        tracing::debug!(%url, "GET object");
        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %body, "GET rejected");
            return Err(classify_failure(
                Operation::Download,
                status.as_u16(),
                &body,
                bucket,
                path,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(StoredObject {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
