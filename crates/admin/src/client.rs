use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

use common::metrics::{UPSTREAM_ERRORS_TOTAL, UPSTREAM_REQUESTS_TOTAL};

use crate::constants::RequestMethod;
use crate::errors::AdminError;

/// Status and decoded body of an upstream reply. Non-JSON bodies are kept as a string.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamResponse {
    /// `id` of the returned object, when the body carries one.
    pub fn object_id(&self) -> Option<String> {
        match self.body.get("id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Shared HTTP client used by every proxied view of a site.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> Result<Self, AdminError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Internal(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    fn request(&self, method: RequestMethod, url: &str, token: Option<&str>, params: &[(String, String)]) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method.into(), url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// GET a JSON document. Transport failures, error statuses and undecodable bodies
    /// are logged and yield `None`.
    pub async fn get_data(&self, url: &str, token: Option<&str>, params: &[(String, String)]) -> Option<Value> {
        UPSTREAM_REQUESTS_TOTAL.inc();
        debug!(event = "upstream_request", method = "GET", %url);
        let res = match self.request(RequestMethod::Get, url, token, params).send().await {
            Ok(r) => r,
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                error!(event = "upstream_request_failed", method = "GET", %url, error = %e);
                return None;
            }
        };
        let res = match res.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                error!(event = "upstream_status_error", method = "GET", %url, error = %e);
                return None;
            }
        };
        match res.json::<Value>().await {
            Ok(v) => Some(v),
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                error!(event = "upstream_decode_failed", method = "GET", %url, error = %e);
                None
            }
        }
    }

    /// Send a request and hand back the reply whatever its status. Only transport
    /// failures yield `None`; error statuses are logged and returned.
    pub async fn send_request(
        &self,
        method: RequestMethod,
        url: &str,
        token: Option<&str>,
        params: &[(String, String)],
        json: Option<&Value>,
    ) -> Option<UpstreamResponse> {
        UPSTREAM_REQUESTS_TOTAL.inc();
        debug!(event = "upstream_request", %method, %url);
        let mut req = self.request(method, url, token, params);
        if let Some(body) = json {
            req = req.json(body);
        }
        let res = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                error!(event = "upstream_request_failed", %method, %url, error = %e);
                return None;
            }
        };
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        if status.is_client_error() || status.is_server_error() {
            UPSTREAM_ERRORS_TOTAL.inc();
            error!(event = "upstream_status_error", %method, %url, status = status.as_u16(), body = %body);
        }
        Some(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_id_reads_numbers_and_strings() {
        let r = UpstreamResponse { status: StatusCode::CREATED, body: json!({"id": 5}) };
        assert_eq!(r.object_id().as_deref(), Some("5"));
        let r = UpstreamResponse { status: StatusCode::OK, body: json!({"id": "a1"}) };
        assert_eq!(r.object_id().as_deref(), Some("a1"));
        let r = UpstreamResponse { status: StatusCode::OK, body: json!({"detail": "x"}) };
        assert_eq!(r.object_id(), None);
    }
}
