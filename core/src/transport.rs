//! Blocking `Transport` backed by a `ureq` agent.
//!
//! The agent is configured with `http_status_as_error(false)` so 4xx/5xx
//! responses come back as data and status interpretation stays with
//! `ItemsClient`. Only failures with no response at all (connection refused,
//! DNS, body read errors) become `ApiError::Network`.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let headers = req.headers;
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(&req.path);
                for (k, v) in &headers {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                builder.call()
            }
            (HttpMethod::Delete, _) => {
                let mut builder = self.agent.delete(&req.path);
                for (k, v) in &headers {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                builder.call()
            }
            (method, body) => {
                let mut builder = match method {
                    HttpMethod::Post => self.agent.post(&req.path),
                    _ => self.agent.put(&req.path),
                };
                for (k, v) in &headers {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
