// src/api_client.rs

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::{ErrorPayload, Result, StaffdeskError};
use crate::session::Session;

/// A request to the back-office API, relative to the configured base URL
/// (e.g. `Permission/MyPermissions`). Record ids are appended with
/// [`ApiRequest::segment`] so each stays a single encoded path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        Self {
            method,
            segments: path
                .as_ref()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    /// Appends one path segment verbatim; `/`, `?` and `%` inside it are
    /// percent-encoded when the URL is built.
    pub fn segment(mut self, value: impl ToString) -> Self {
        self.segments.push(value.to_string());
        self
    }

    /// Unencoded path, for logging and route matching.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// The network seam. `HttpTransport` talks to the real backend; tests plug
/// in scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

pub struct HttpTransport {
    http_client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Trailing slash so the base reads as a directory
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)?;
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_base_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL plus the request's segments, each percent-encoded on its own.
    /// Dot segments are refused rather than resolved.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        if let Some(bad) = request
            .segments
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(StaffdeskError::Validation(format!(
                "Invalid record id '{}'",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StaffdeskError::ConfigError(format!("Base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request)?;

        let mut builder = self
            .http_client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

/// Typed access to the back-office API. The bearer token is read from the
/// session at dispatch time, so login and logout take effect on the next
/// request.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    pub fn from_settings(settings: &Settings, session: Session) -> Result<Self> {
        let transport = HttpTransport::from_settings(settings)?;
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn dispatch(&self, mut request: ApiRequest, context_msg: &str) -> Result<ApiResponse> {
        request.bearer = self.session.get_token()?;
        debug!(
            "Sending {} request for '{}' to '{}' (authorized: {})",
            request.method,
            context_msg,
            request.path(),
            request.bearer.is_some()
        );

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                // Network, DNS, timeout etc.
                error!("Request for '{}' failed before a response: {}", context_msg, e);
                return Err(e);
            }
        };

        info!(
            "Received response for '{}': Status={}",
            context_msg, response.status
        );

        if response.status.is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(&response, context_msg))
        }
    }

    fn error_from_response(response: &ApiResponse, context_msg: &str) -> StaffdeskError {
        let error_body = String::from_utf8_lossy(&response.body);
        error!(
            "API Error Response: Status={}, Body='{}' for '{}'",
            response.status, error_body, context_msg
        );

        if response.status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session token for '{}'", context_msg);
            return StaffdeskError::SessionExpired;
        }

        // Only a JSON `message` field is surfaced; anything else gets the caller's fallback
        let message = serde_json::from_slice::<ErrorPayload>(&response.body)
            .ok()
            .and_then(|parsed| parsed.message);
        StaffdeskError::ApiError {
            status: response.status,
            message,
        }
    }

    pub async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        context_msg: &str,
    ) -> Result<T> {
        let response = self.dispatch(request, context_msg).await?;
        match serde_json::from_slice::<T>(&response.body) {
            Ok(data) => {
                debug!("Successfully deserialized response for '{}'", context_msg);
                Ok(data)
            }
            Err(e) => {
                error!(
                    "JSON deserialization failed for '{}': {} (body: {})",
                    context_msg,
                    e,
                    String::from_utf8_lossy(&response.body)
                );
                Err(StaffdeskError::MalformedPayload {
                    context: context_msg.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Sends a request whose success body is not needed.
    pub async fn send_expecting_success(&self, request: ApiRequest, context_msg: &str) -> Result<()> {
        self.dispatch(request, context_msg).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, context_msg: &str) -> Result<T> {
        self.send_and_deserialize(ApiRequest::new(Method::GET, path), context_msg)
            .await
    }
}
