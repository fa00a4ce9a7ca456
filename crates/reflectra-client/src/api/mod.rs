//! REST transport.
//!
//! Every request goes through [`ApiClient::execute`], which resolves the URL
//! against the session origin, attaches the bearer credential on protected
//! endpoints and classifies failures into [`ReflectraError`]. A 401 on a
//! protected endpoint clears the stored credential and fires the session's
//! auth-failure hook; a 401 on login or registration is reported back to the
//! form instead.

pub mod auth;
pub mod endpoints;

use std::sync::Arc;
use std::time::Duration;

use reflectra_shared::protocol::ErrorBody;
use reflectra_shared::{ReflectraError, Result, ValidationError};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub use endpoints::Endpoint;

use crate::session::{AuthFailure, Session};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(session: Arc<Session>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReflectraError::Unreachable(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, endpoint: &Endpoint) -> Result<Url> {
        let mut url = Url::parse(self.session.current_origin()).map_err(|e| {
            ReflectraError::Unreachable(format!(
                "invalid origin {}: {e}",
                self.session.current_origin()
            ))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ReflectraError::Unreachable("origin cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            segments.extend(endpoint.segments());
            // Trailing slash.
            segments.push("");
        }
        Ok(url)
    }

    /// Send one request and return the successful response.
    async fn execute(
        &self,
        method: Method,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let url = self.url(&endpoint)?;
        let mut request = self.http.request(method.clone(), url);

        if endpoint.is_protected() {
            // Read at send time; a login or logout elsewhere must be visible here.
            let token = self.session.require_credential()?;
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(%method, path = %endpoint, "request");
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::text);
        let err = self.classify(&endpoint, status, message);
        warn!(%method, path = %endpoint, status = status.as_u16(), error = %err, "request failed");
        Err(err)
    }

    fn classify(&self, endpoint: &Endpoint, status: StatusCode, message: Option<String>) -> ReflectraError {
        match status {
            StatusCode::UNAUTHORIZED if endpoint.is_credential_check() => {
                ReflectraError::CredentialRejected(
                    message.unwrap_or_else(|| "Invalid credentials".to_string()),
                )
            }
            StatusCode::UNAUTHORIZED if endpoint.is_protected() => {
                self.session.expire(AuthFailure {
                    path: endpoint.path(),
                    status: status.as_u16(),
                });
                ReflectraError::Unauthenticated
            }
            StatusCode::BAD_REQUEST => ReflectraError::ValidationFailed(ValidationError::Server(
                message.unwrap_or_else(|| "Invalid request".to_string()),
            )),
            StatusCode::NOT_FOUND => {
                ReflectraError::NotFound(message.unwrap_or_else(|| "Not found".to_string()))
            }
            StatusCode::CONFLICT => {
                ReflectraError::Conflict(message.unwrap_or_else(|| "Conflict".to_string()))
            }
            s if s.is_server_error() => ReflectraError::Transient(format!(
                "{} {}",
                s.as_u16(),
                message.unwrap_or_default()
            )),
            s => ReflectraError::Rejected {
                status: s.as_u16(),
                message: message.unwrap_or_else(|| {
                    s.canonical_reason().unwrap_or("Request rejected").to_string()
                }),
            },
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let response = self.execute(Method::GET, endpoint, &[], None).await?;
        decode(response).await
    }

    pub(crate) async fn get_json_query<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.execute(Method::GET, endpoint, query, None).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<T> {
        let response = self
            .execute(method, endpoint, &[], Some(encode(body)?))
            .await?;
        decode(response).await
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_unit(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        self.execute(method, endpoint, &[], body).await?;
        Ok(())
    }
}

pub(crate) fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ReflectraError::Decode(format!("request body: {e}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ReflectraError::Decode(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> ReflectraError {
    if err.is_connect() || err.is_timeout() {
        ReflectraError::Unreachable(err.to_string())
    } else if err.is_decode() {
        ReflectraError::Decode(err.to_string())
    } else {
        ReflectraError::Transient(err.to_string())
    }
}

#[cfg(test)]
mod tests;
