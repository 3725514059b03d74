//! `reqwest`-based transport for the Store's `RunQuery`/`Commit`/`SplitQuery`
//! RPCs, mapping the Store's JSON error envelope onto [`StoreError`].

use async_trait::async_trait;
use serde::Deserialize;
use storeio_error::{StatusCode, StoreError};
use tracing::{debug, warn};

use crate::protocol::{
    CommitRequest, CommitResponse, RunQueryRequest, RunQueryResponse, SplitQueryRequest,
    SplitQueryResponse,
};

use super::StoreClient;

const PRODUCTION_HOST: &str = "batch-datastore.googleapis.com";

/// Opaque credential handle. Authentication beyond accepting this object
/// is out of scope (spec §1 Non-goals) — no token refresh or signing is
/// implemented here.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// No `Authorization` header is sent; used against the local emulator.
    None,
    /// A bearer token, attached verbatim on every request.
    BearerToken(String),
}

/// HTTP/JSON transport for the Store's RPC surface.
///
/// Talks to the production endpoint over HTTPS unless a `localhost`
/// override (`host:port`) is supplied, in which case it talks plain HTTP
/// to the emulator (spec §6 configuration surface).
pub struct HttpStoreClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpStoreClient {
    #[must_use]
    pub fn new(credentials: Credentials, localhost: Option<&str>) -> Self {
        let base_url = match localhost {
            Some(host_port) => format!("http://{host_port}/v1"),
            None => format!("https://{PRODUCTION_HOST}/v1"),
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            credentials,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);
        match &self.credentials {
            Credentials::None => builder,
            Credentials::BearerToken(token) => builder.bearer_auth(token),
        }
    }

    async fn send<Req: serde::Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Req,
    ) -> Result<(Resp, u64), StoreError> {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let http_status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        if !http_status.is_success() {
            return Err(decode_error_envelope(http_status, &bytes));
        }

        let decoded: Resp = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::new(StatusCode::Internal, format!("malformed response body: {e}"))
        })?;
        Ok((decoded, bytes.len() as u64))
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn run_query(&self, request: RunQueryRequest) -> Result<RunQueryResponse, StoreError> {
        let path = format!("/projects/{}:runQuery", request.project_id);
        debug!(project_id = %request.project_id, "RunQuery");
        let (response, _) = self.send(reqwest::Method::POST, &path, &request).await?;
        Ok(response)
    }

    async fn commit(&self, request: CommitRequest) -> Result<CommitResponse, StoreError> {
        let path = format!("/projects/{}:commit", request.project_id);
        debug!(
            project_id = %request.project_id,
            mutations = request.mutations.len(),
            "Commit"
        );
        let (mut response, bytes): (CommitResponse, u64) =
            self.send(reqwest::Method::POST, &path, &request).await?;
        response.serialized_size_bytes = bytes;
        Ok(response)
    }

    async fn split_query(
        &self,
        request: SplitQueryRequest,
    ) -> Result<SplitQueryResponse, StoreError> {
        let path = format!("/projects/{}:splitQuery", request.project_id);
        let (response, _) = self.send(reqwest::Method::POST, &path, &request).await?;
        Ok(response)
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    let code = if err.is_timeout() {
        StatusCode::DeadlineExceeded
    } else if err.is_connect() {
        StatusCode::Unavailable
    } else {
        StatusCode::Unknown
    };
    warn!(error = %err, "store transport error");
    StoreError::new(code, err.to_string())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    status: Option<String>,
    message: String,
}

fn decode_error_envelope(http_status: reqwest::StatusCode, body: &[u8]) -> StoreError {
    let parsed: Option<ErrorEnvelope> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .map_or_else(|| format!("HTTP {http_status}"), |e| e.error.message.clone());
    let code = parsed
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .and_then(status_from_name)
        .unwrap_or_else(|| status_from_http(http_status));
    StoreError::new(code, message)
}

fn status_from_name(name: &str) -> Option<StatusCode> {
    Some(match name {
        "CANCELLED" => StatusCode::Cancelled,
        "INVALID_ARGUMENT" => StatusCode::InvalidArgument,
        "DEADLINE_EXCEEDED" => StatusCode::DeadlineExceeded,
        "NOT_FOUND" => StatusCode::NotFound,
        "ALREADY_EXISTS" => StatusCode::AlreadyExists,
        "PERMISSION_DENIED" => StatusCode::PermissionDenied,
        "RESOURCE_EXHAUSTED" => StatusCode::ResourceExhausted,
        "FAILED_PRECONDITION" => StatusCode::FailedPrecondition,
        "ABORTED" => StatusCode::Aborted,
        "UNAVAILABLE" => StatusCode::Unavailable,
        "UNAUTHENTICATED" => StatusCode::Unauthenticated,
        "INTERNAL" => StatusCode::Internal,
        _ => return None,
    })
}

fn status_from_http(status: reqwest::StatusCode) -> StatusCode {
    match status.as_u16() {
        400 => StatusCode::InvalidArgument,
        401 => StatusCode::Unauthenticated,
        403 => StatusCode::PermissionDenied,
        404 => StatusCode::NotFound,
        409 => StatusCode::Aborted,
        412 => StatusCode::FailedPrecondition,
        429 => StatusCode::ResourceExhausted,
        499 => StatusCode::Cancelled,
        504 => StatusCode::DeadlineExceeded,
        503 => StatusCode::Unavailable,
        500..=599 => StatusCode::Internal,
        _ => StatusCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_host_is_used_without_an_emulator_override() {
        let client = HttpStoreClient::new(Credentials::None, None);
        assert_eq!(client.base_url, "https://batch-datastore.googleapis.com/v1");
    }

    #[test]
    fn localhost_override_uses_plain_http() {
        let client = HttpStoreClient::new(Credentials::None, Some("localhost:8081"));
        assert_eq!(client.base_url, "http://localhost:8081/v1");
    }

    #[test]
    fn http_status_maps_to_the_non_retryable_set_correctly() {
        assert_eq!(status_from_http(reqwest::StatusCode::FORBIDDEN), StatusCode::PermissionDenied);
        assert_eq!(
            status_from_http(reqwest::StatusCode::SERVICE_UNAVAILABLE),
            StatusCode::Unavailable
        );
    }
}
