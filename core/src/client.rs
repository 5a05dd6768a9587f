//! Request builders and request helpers of `ApiTester`.
//!
//! # Design
//! Every request helper is split in two: a `build_*` method producing an
//! `HttpRequest` without any I/O, and the helper itself which hands that
//! descriptor to the injected `HttpClient`. Headers follow one rule set:
//! `Content-Type` is present iff a body or file is attached, `Authorization`
//! iff a token is given.

use std::path::Path;

use serde_json::Value;

use crate::config::TesterConfig;
use crate::error::{Result, TesterError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody, UploadedFile};
use crate::reporter::{Reporter, TracingReporter};
use crate::transport::HttpClient;
use crate::upload::SourceFileGuard;

/// Test helper wrapping an injected HTTP client.
pub struct ApiTester<C> {
    client: C,
    config: TesterConfig,
    reporter: Box<dyn Reporter>,
}

impl<C: HttpClient> ApiTester<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, TesterConfig::default())
    }

    pub fn with_config(client: C, config: TesterConfig) -> Self {
        Self {
            client,
            config,
            reporter: Box::new(TracingReporter),
        }
    }

    /// Replace the default `TracingReporter`.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub(crate) fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<HttpRequest> {
        let mut headers = vec![("Accept".to_string(), self.config.json_accept.clone())];
        let body = match body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                let json = serde_json::to_string(value)
                    .map_err(|e| TesterError::json("request body", e))?;
                RequestBody::Json(json)
            }
            None => RequestBody::Empty,
        };
        push_authorization(&mut headers, token);
        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    pub fn build_html_request(&self, method: HttpMethod, url: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = vec![("Accept".to_string(), self.config.html_accept.clone())];
        push_authorization(&mut headers, token);
        HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: RequestBody::Empty,
        }
    }

    pub fn build_download_request(&self, url: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = Vec::new();
        push_authorization(&mut headers, token);
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers,
            body: RequestBody::Empty,
        }
    }

    /// The attachment points at `file` itself and announces its basename.
    pub fn build_upload_request(
        &self,
        url: &str,
        file: &Path,
        attributes: Option<&Value>,
        token: Option<&str>,
    ) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), self.config.json_accept.clone()),
            ("Content-Type".to_string(), "multipart/form-data".to_string()),
        ];
        push_authorization(&mut headers, token);
        HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers,
            body: RequestBody::Multipart(MultipartForm {
                files: vec![(self.config.upload_field.clone(), UploadedFile::new(file))],
                parameters: attributes.cloned(),
            }),
        }
    }

    /// JSON request: `Accept` per config, JSON body and bearer token if given.
    pub fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<HttpResponse> {
        let request = self.build_request(method, url, body, token)?;
        self.send(&request)
    }

    pub fn request_html(&self, method: HttpMethod, url: &str, token: Option<&str>) -> Result<HttpResponse> {
        let request = self.build_html_request(method, url, token);
        self.send(&request)
    }

    /// GET a file. Log output is silenced for the duration of the call so
    /// that nothing is interleaved with the downloaded content.
    pub fn request_download(&self, url: &str, token: Option<&str>) -> Result<HttpResponse> {
        let request = self.build_download_request(url, token);
        tracing::subscriber::with_default(tracing::subscriber::NoSubscriber::default(), || {
            self.send(&request)
        })
    }

    /// Multipart POST of `file`. The source file is restored after the
    /// request whatever its outcome.
    pub fn request_upload(
        &self,
        url: &str,
        file: &Path,
        attributes: Option<&Value>,
        token: Option<&str>,
    ) -> Result<HttpResponse> {
        let guard = SourceFileGuard::protect(file)?;
        let request = self.build_upload_request(url, file, attributes, token);
        let result = self.send(&request);
        if let Err(restore_err) = guard.restore() {
            if let Err(err) = &result {
                tracing::error!(error = %err, "upload request failed and its source could not be restored");
            }
            return Err(restore_err);
        }
        result
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "HTTP request initiated");
        self.client
            .request(request)
            .map_err(|e| TesterError::Transport(Box::new(e)))
    }
}

fn push_authorization(headers: &mut Vec<(String, String)>, token: Option<&str>) {
    if let Some(token) = token {
        headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    }
}
