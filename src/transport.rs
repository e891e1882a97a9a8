//! Single-shot HTTP transport.
//!
//! A [`Transport`] issues exactly one request and reports either the raw response (any status) or
//! a connection-level [`TransportError`]. It never retries and never enforces a deadline; both
//! belong to the layers above it.

use crate::request::{Body, Method, RawResponse, RequestDescriptor};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Connection-level failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause}")]
pub struct TransportError {
    pub cause: String,
}

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self { cause: cause.into() }
    }
}

/// Issues one HTTP request.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (its own timeouts should be unset or generous).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: &RequestDescriptor) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, request.url());
        for (name, value) in request.effective_headers() {
            builder = builder.header(name, value);
        }
        builder = match request.body() {
            Body::Empty => builder,
            Body::Json(value) => builder.body(
                serde_json::to_vec(value).map_err(|e| TransportError::new(e.to_string()))?,
            ),
            Body::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let mut p = reqwest::multipart::Part::bytes(part.bytes.clone());
                    if let Some(file_name) = &part.file_name {
                        p = p.file_name(file_name.clone());
                    }
                    if let Some(mime) = &part.mime {
                        p = p.mime_str(mime).map_err(|e| TransportError::new(e.to_string()))?;
                    }
                    form = form.part(part.name.clone(), p);
                }
                builder.multipart(form)
            }
        };
        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let response = self.build(request)?.send().await.map_err(describe)?;

        let status = response.status();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
            }
        }
        let body = response.bytes().await.map_err(describe)?.to_vec();

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn describe(err: reqwest::Error) -> TransportError {
    let kind = if err.is_connect() {
        "connect error"
    } else if err.is_body() || err.is_decode() {
        "body error"
    } else if err.is_request() {
        "request error"
    } else {
        "transport error"
    };
    let mut cause = format!("{kind}: {err}");
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        cause.push_str(&format!(": {inner}"));
        source = inner.source();
    }
    TransportError::new(cause)
}
