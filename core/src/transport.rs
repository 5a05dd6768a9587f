//! The injected HTTP client capability and a `ureq`-backed implementation.
//!
//! # Design
//! `ApiTester` never talks to the network itself; it hands each
//! `HttpRequest` to an `HttpClient`. Any application or test double that can
//! execute a descriptor and hand back an `HttpResponse` plugs in here.
//! Non-2xx statuses are data, not errors: only a failure to obtain a response
//! at all is reported through `Self::Error`.

use crate::http::{HttpRequest, HttpResponse};

/// Executes one request and returns the response unchanged.
pub trait HttpClient {
    type Error: std::error::Error + Send + Sync + 'static;

    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, Self::Error>;
}

#[cfg(feature = "ureq")]
pub use self::ureq_client::{UreqClient, UreqError};

#[cfg(feature = "ureq")]
mod ureq_client {
    use crate::error::TesterError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
    use crate::multipart;
    use ureq::unversioned::multipart::{Form, Part};

    use super::HttpClient;

    #[derive(Debug, thiserror::Error)]
    pub enum UreqError {
        #[error(transparent)]
        Http(#[from] ureq::Error),
        #[error(transparent)]
        Encoding(#[from] TesterError),
    }

    /// Blocking client executing requests against a running server.
    ///
    /// Relative URLs are joined to `base_url`; absolute URLs are used as is.
    #[derive(Debug, Clone)]
    pub struct UreqClient {
        base_url: String,
        agent: ureq::Agent,
    }

    impl UreqClient {
        pub fn new(base_url: &str) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                agent,
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn resolve(&self, url: &str) -> String {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else if url.starts_with('/') {
                format!("{}{url}", self.base_url)
            } else {
                format!("{}/{url}", self.base_url)
            }
        }
    }

    enum Payload<'a> {
        Empty,
        Bytes(&'a [u8]),
        Form(Form<'a>),
    }

    /// Text fields first, then one file part per upload, named after the
    /// original file.
    fn upload_form<'a>(
        form: &'a MultipartForm,
        fields: &'a [(String, String)],
    ) -> Result<Form<'a>, TesterError> {
        let mut out = Form::new();
        for (name, value) in fields {
            out = out.text(name, value);
        }
        for (field, file) in &form.files {
            let part = Part::file(&file.path)
                .map_err(|e| TesterError::io(&file.path, e))?
                .file_name(&file.original_name);
            out = out.part(field, part);
        }
        Ok(out)
    }

    impl HttpClient for UreqClient {
        type Error = UreqError;

        fn request(&self, request: &HttpRequest) -> Result<HttpResponse, UreqError> {
            let url = self.resolve(&request.url);

            let fields = match &request.body {
                RequestBody::Multipart(form) => multipart::form_fields(form.parameters.as_ref())?,
                _ => Vec::new(),
            };
            let payload = match &request.body {
                RequestBody::Empty => Payload::Empty,
                RequestBody::Json(json) => Payload::Bytes(json.as_bytes()),
                RequestBody::Multipart(form) => Payload::Form(upload_form(form, &fields)?),
            };

            // ureq sets the multipart content type itself, boundary included.
            let is_form = matches!(payload, Payload::Form(_));
            let headers = request
                .headers
                .iter()
                .filter(|(name, _)| !(is_form && name.eq_ignore_ascii_case("content-type")));

            let mut response = match (request.method, payload) {
                (HttpMethod::Get, Payload::Empty) => {
                    let mut builder = self.agent.get(&url);
                    for (name, value) in headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()?
                }
                (HttpMethod::Head, Payload::Empty) => {
                    let mut builder = self.agent.head(&url);
                    for (name, value) in headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()?
                }
                (HttpMethod::Delete, Payload::Empty) => {
                    let mut builder = self.agent.delete(&url);
                    for (name, value) in headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    builder.call()?
                }
                (method, payload) => {
                    let mut builder = match method {
                        HttpMethod::Post => self.agent.post(&url),
                        HttpMethod::Put => self.agent.put(&url),
                        HttpMethod::Patch => self.agent.patch(&url),
                        HttpMethod::Get => self.agent.get(&url).force_send_body(),
                        HttpMethod::Head => self.agent.head(&url).force_send_body(),
                        HttpMethod::Delete => self.agent.delete(&url).force_send_body(),
                    };
                    for (name, value) in headers {
                        builder = builder.header(name.as_str(), value.as_str());
                    }
                    match payload {
                        Payload::Empty => builder.send_empty()?,
                        Payload::Bytes(bytes) => builder.send(bytes)?,
                        Payload::Form(form) => builder.send(form)?,
                    }
                }
            };

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = if request.method == HttpMethod::Head {
                Vec::new()
            } else {
                response.body_mut().read_to_vec()?
            };

            tracing::debug!(method = %request.method, url = %url, status, "HTTP response received");

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

}
