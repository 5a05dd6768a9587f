//! A recording `HttpClient` for testing code built on `ApiTester`.
//!
//! `StubClient` answers from a list of routes (`on`), then from a queue of
//! one-shot responses (`push`), and otherwise with a fallback response
//! (status 500, body `{"foo":"bar"}` unless replaced). Every request is
//! recorded.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Mutex;

use serde_json::Value;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::HttpClient;

/// Builders for canned responses.
pub struct StubResponse;

impl StubResponse {
    pub fn json(status: u16, value: &Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/ld+json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn empty(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    routes: Vec<(HttpMethod, String, HttpResponse)>,
    queue: VecDeque<HttpResponse>,
    fallback: Option<HttpResponse>,
    requests: Vec<HttpRequest>,
}

#[derive(Debug, Default)]
pub struct StubClient {
    state: Mutex<State>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with `response`, every time.
    pub fn on(self, method: HttpMethod, url: &str, response: HttpResponse) -> Self {
        self.lock().routes.push((method, url.to_string(), response));
        self
    }

    /// Queue a one-shot response for the next unmatched request.
    pub fn push(&self, response: HttpResponse) {
        self.lock().queue.push_back(response);
    }

    pub fn with_fallback(self, response: HttpResponse) -> Self {
        self.lock().fallback = Some(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HttpClient for StubClient {
    type Error = Infallible;

    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, Infallible> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let routed = state
            .routes
            .iter()
            .find(|(method, url, _)| *method == request.method && *url == request.url)
            .map(|(_, _, response)| response.clone());
        let response = routed
            .or_else(|| state.queue.pop_front())
            .or_else(|| state.fallback.clone())
            .unwrap_or_else(|| StubResponse::json(500, &serde_json::json!({"foo": "bar"})));
        Ok(response)
    }
}
