//! Blocking HTTP transport for store round trips.
//!
//! # Design
//! ureq's automatic status-code-as-error behavior is disabled so 4xx/5xx
//! responses come back as data and the core decides what they mean. Only
//! failures that produce no response at all become `StoreError::Transport`.

use todo_core::{HttpMethod, HttpRequest, HttpResponse, StoreError, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
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

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, StoreError> {
        let headers = &req.headers;
        let result = match (req.method, &req.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&req.path), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&req.path), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(&req.path), headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(self.agent.post(&req.path), headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                with_headers(self.agent.patch(&req.path), headers).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => with_headers(self.agent.patch(&req.path), headers).send_empty(),
        };
        let mut response = result.map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}
