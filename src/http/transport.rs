use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};
use crate::metrics::{FailureKind, RequestFailure};
use crate::target::RequestSpec;

/// What the engine keeps from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub bytes_in: u64,
}

/// Sends one request and reports the status and body size.
///
/// Failures are values, not errors: the engine records them as results.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, spec: RequestSpec) -> Result<TransportResponse, RequestFailure>;
}

#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// `reqwest`-backed transport sharing one connection pool across workers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed.
    pub fn new(settings: ClientSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, spec: RequestSpec) -> Result<TransportResponse, RequestFailure> {
        let headers = build_header_map(&spec)?;
        let response = self
            .client
            .request(reqwest::Method::from(spec.method), spec.url.as_str())
            .headers(headers)
            .body(spec.body)
            .send()
            .await
            .map_err(|err| classify_error(&err))?;

        let status = response.status().as_u16();
        let bytes_in = drain_response_body(response)
            .await
            .map_err(|err| classify_error(&err))?;
        Ok(TransportResponse { status, bytes_in })
    }
}

fn build_header_map(spec: &RequestSpec) -> Result<HeaderMap, RequestFailure> {
    let mut headers = HeaderMap::new();
    for (name, values) in &spec.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            RequestFailure::new(
                FailureKind::Protocol,
                format!("invalid header name '{}': {}", name, err),
            )
        })?;
        for value in values {
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                RequestFailure::new(
                    FailureKind::Protocol,
                    format!("invalid value for header '{}': {}", name, err),
                )
            })?;
            headers.append(header_name.clone(), header_value);
        }
    }
    Ok(headers)
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

pub(crate) fn classify_error(err: &reqwest::Error) -> RequestFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Connect
    } else if err.is_builder() || err.is_body() || err.is_decode() || err.is_redirect() {
        FailureKind::Protocol
    } else {
        FailureKind::Transport
    };
    RequestFailure::new(kind, error_chain(err))
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
