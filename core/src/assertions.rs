//! One-shot assertion helpers and their fixture-overwrite counterparts.
//!
//! Each assertion issues a request through `ApiTester`, decodes the response
//! and compares it against an expectation. A mismatch is returned as
//! `TesterError::Assertion`; any other error means the check could not run.
//!
//! Overwrite helpers write the response into the fixture instead and always
//! report a warning plus a risky marker. With
//! `TesterConfig::overwrite_fixtures` set, the fixture-file assertions behave
//! the same way.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::compare;
use crate::error::{AssertionFailure, Result, TesterError};
use crate::fixture::{self, JsonBody};
use crate::http::{HttpMethod, HttpResponse};
use crate::transport::HttpClient;
use crate::ApiTester;

pub const OVERWRITE_WARNING: &str =
    "Overwriting test data ... , you are doing the inverse of an assertion, are you sure ?";
pub const NOT_FOUND: &str = "Not Found";
pub const ACCESS_DENIED: &str = "Access Denied.";
pub const UPLOAD_NOT_AVAILABLE: &str = "Can not upload a new version of the document";

/// `Content-Disposition` type expected from a download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last path segment of `url`, query and fragment removed.
pub fn default_download_name(url: &str) -> &str {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// `<disposition>; filename="<name>"`
pub fn content_disposition(disposition: Disposition, name: &str) -> String {
    format!("{disposition}; filename=\"{name}\"")
}

impl<C: HttpClient> ApiTester<C> {
    // ---------------------------------------------------------------------
    // Body assertions
    // ---------------------------------------------------------------------

    /// Compare the JSON response with the fixture at `expected`, or require
    /// an empty body when `expected` is `None`.
    pub fn assert_request_response_file(
        &self,
        expected: Option<&Path>,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        match expected {
            Some(path) => self.assert_json_content_file(path, &response.body),
            None => assert_empty_body(&response),
        }
    }

    /// Compare the JSON response with an inline document, or require an
    /// empty body when `expected` is `None`.
    pub fn assert_request_response_value(
        &self,
        expected: Option<&Value>,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        match expected {
            Some(value) => self.assert_json_content_value(value, &response.body),
            None => assert_empty_body(&response),
        }
    }

    /// Compare the HTML response byte for byte with the fixture file.
    pub fn assert_html_request_response(
        &self,
        expected: Option<&Path>,
        method: HttpMethod,
        url: &str,
        token: Option<&str>,
    ) -> Result<()> {
        let response = self.request_html(method, url, token)?;
        let Some(path) = expected else {
            return assert_empty_body(&response);
        };
        if self.config().overwrite_fixtures {
            fixture::write_raw(path, &response.body)?;
            self.signal_overwrite(path);
            return Ok(());
        }
        let expected = fixture::read_bytes(path)?;
        if expected != response.body {
            return Err(AssertionFailure::mismatch(
                format!("Failed asserting that the HTML response equals {}", path.display()),
                String::from_utf8_lossy(&expected),
                response.text(),
            )
            .into());
        }
        Ok(())
    }

    pub fn assert_upload_request_response_file(
        &self,
        expected: Option<&Path>,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        match expected {
            Some(path) => self.assert_json_content_file(path, &response.body),
            None => assert_empty_body(&response),
        }
    }

    pub fn assert_upload_request_response_value(
        &self,
        expected: Option<&Value>,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        match expected {
            Some(value) => self.assert_json_content_value(value, &response.body),
            None => assert_empty_body(&response),
        }
    }

    /// `GET <url>?count=1` must answer a number equal to `expected`.
    pub fn assert_count_response(&self, expected: i64, url: &str, token: Option<&str>) -> Result<()> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{url}{separator}{}", self.config().count_query);
        let response = self.request(HttpMethod::Get, &url, None, token)?;
        let content = response.text();
        let actual: i64 = content.trim().parse().map_err(|_| {
            AssertionFailure::new(format!("Failed asserting that response content {content:?} is numeric"))
        })?;
        if actual != expected {
            return Err(AssertionFailure::mismatch(
                format!("Failed asserting that the count of {url} is {expected}"),
                expected.to_string(),
                actual.to_string(),
            )
            .into());
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Status assertions
    // ---------------------------------------------------------------------

    pub fn assert_deleted_success_response(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 204)
    }

    pub fn assert_not_found(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 404)?;
        self.assert_error_description(&response, NOT_FOUND)
    }

    pub fn assert_upload_not_found(
        &self,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        assert_status(&response, 404)?;
        self.assert_error_description(&response, NOT_FOUND)
    }

    /// 404 whose HTML page title is `expected_message` (default `Not Found`).
    pub fn assert_html_not_found(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
        expected_message: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 404)?;
        let title = format!("<title>{}</title>", expected_message.unwrap_or(NOT_FOUND));
        let content = response.text();
        if !content.contains(&title) {
            return Err(AssertionFailure::mismatch(
                format!("Failed asserting that the HTML response contains {title:?}"),
                title,
                content,
            )
            .into());
        }
        Ok(())
    }

    pub fn assert_bad_request(
        &self,
        message: &str,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 400)?;
        self.assert_error_description(&response, message)
    }

    pub fn assert_access_denied(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 403)?;
        self.assert_error_description(&response, ACCESS_DENIED)
    }

    /// 422; the error description is only checked when `message` is given.
    pub fn assert_invalid(
        &self,
        message: Option<&str>,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        assert_status(&response, 422)?;
        match message {
            Some(message) => self.assert_error_description(&response, message),
            None => Ok(()),
        }
    }

    pub fn assert_upload_invalid(
        &self,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
        expected_message: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        assert_status(&response, 422)?;
        match expected_message {
            Some(message) => self.assert_error_description(&response, message),
            None => Ok(()),
        }
    }

    pub fn assert_upload_not_available(
        &self,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        assert_status(&response, 422)?;
        self.assert_error_description(&response, UPLOAD_NOT_AVAILABLE)
    }

    // ---------------------------------------------------------------------
    // Downloads
    // ---------------------------------------------------------------------

    /// The response must be 2xx and carry
    /// `content-disposition: <disposition>; filename="<name>"`, `name`
    /// defaulting to the last segment of `url`.
    pub fn assert_request_download(
        &self,
        url: &str,
        token: Option<&str>,
        expected_name: Option<&str>,
        disposition: Disposition,
    ) -> Result<()> {
        let response = self.request_download(url, token)?;
        let name = expected_name.unwrap_or_else(|| default_download_name(url));
        let expected = content_disposition(disposition, name);
        match response.header("content-disposition") {
            Some(actual) if actual == expected => {}
            actual => {
                return Err(AssertionFailure::mismatch(
                    "Failed asserting that the response has header \"content-disposition\" with the expected value",
                    expected,
                    actual.unwrap_or("<missing>"),
                )
                .into())
            }
        }
        if !response.is_success() {
            return Err(AssertionFailure::mismatch(
                "Failed asserting that the response is successful",
                "2xx",
                response.status.to_string(),
            )
            .into());
        }
        Ok(())
    }

    pub fn assert_request_download_attachment(
        &self,
        url: &str,
        token: Option<&str>,
        expected_name: Option<&str>,
    ) -> Result<()> {
        self.assert_request_download(url, token, expected_name, Disposition::Attachment)
    }

    pub fn assert_request_download_inline(
        &self,
        url: &str,
        token: Option<&str>,
        expected_name: Option<&str>,
    ) -> Result<()> {
        self.assert_request_download(url, token, expected_name, Disposition::Inline)
    }

    // ---------------------------------------------------------------------
    // Content assertions
    // ---------------------------------------------------------------------

    /// Compare JSON `content` with a JSON or YAML fixture (by extension).
    pub fn assert_json_content_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        if self.config().overwrite_fixtures {
            return self.overwrite_json_content(path, &decode_json(content)?);
        }
        let actual = decode_json(content)?;
        let expected = fixture::load(path)?;
        compare::assert_json_eq(&expected, &actual)?;
        Ok(())
    }

    pub fn assert_json_content_value(&self, expected: &Value, content: &[u8]) -> Result<()> {
        let actual = decode_json(content)?;
        compare::assert_json_eq(expected, &actual)?;
        Ok(())
    }

    /// Compare YAML `content` with the YAML fixture at `path`.
    pub fn assert_yaml_content(&self, path: &Path, content: &str) -> Result<()> {
        let actual = fixture::parse_yaml(content, "response content")?;
        if self.config().overwrite_fixtures {
            return self.overwrite_yaml_content(path, &actual);
        }
        let expected = fixture::load_yaml(path)?;
        compare::assert_json_eq(&expected, &actual)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Overwrite helpers
    // ---------------------------------------------------------------------

    pub fn overwrite_request_response(
        &self,
        path: &Path,
        method: HttpMethod,
        url: &str,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let body = resolve_body(body)?;
        let response = self.request(method, url, body.as_ref(), token)?;
        fixture::write_body(path, &response.body)?;
        self.signal_overwrite(path);
        Ok(())
    }

    pub fn overwrite_html_request_response(
        &self,
        path: &Path,
        method: HttpMethod,
        url: &str,
        token: Option<&str>,
    ) -> Result<()> {
        let response = self.request_html(method, url, token)?;
        fixture::write_raw(path, &response.body)?;
        self.signal_overwrite(path);
        Ok(())
    }

    /// With no fixture path this only warns; no request is made.
    pub fn overwrite_upload_request_response(
        &self,
        path: Option<&Path>,
        url: &str,
        file: &Path,
        body: Option<JsonBody>,
        token: Option<&str>,
    ) -> Result<()> {
        let Some(path) = path else {
            self.reporter().warning("Cannot overwrite fixture (expected file is not set)");
            return Ok(());
        };
        let body = resolve_body(body)?;
        let response = self.request_upload(url, file, body.as_ref(), token)?;
        fixture::write_body(path, &response.body)?;
        self.signal_overwrite(path);
        Ok(())
    }

    pub fn overwrite_json_content(&self, path: &Path, actual: &Value) -> Result<()> {
        match fixture::FixtureFormat::from_path(path) {
            fixture::FixtureFormat::Json => fixture::write_json(path, actual)?,
            fixture::FixtureFormat::Yaml => fixture::write_yaml(path, actual)?,
        }
        self.signal_overwrite(path);
        Ok(())
    }

    pub fn overwrite_yaml_content(&self, path: &Path, actual: &Value) -> Result<()> {
        fixture::write_yaml(path, actual)?;
        self.signal_overwrite(path);
        Ok(())
    }

    fn signal_overwrite(&self, path: &Path) {
        tracing::warn!(fixture = %path.display(), "fixture overwritten from response");
        self.reporter().warning(OVERWRITE_WARNING);
        self.reporter()
            .risky(&format!("fixture {} was regenerated instead of asserted", path.display()));
    }

    fn assert_error_description(&self, response: &HttpResponse, expected: &str) -> Result<()> {
        let field = &self.config().error_description_field;
        let document = decode_json(&response.body)?;
        let actual = document.get(field.as_str()).and_then(Value::as_str).ok_or_else(|| {
            AssertionFailure::new(format!(
                "Failed asserting that the response has a string \"{field}\" field: {document}"
            ))
        })?;
        if actual != expected {
            return Err(AssertionFailure::mismatch(
                format!("Failed asserting that \"{field}\" is {expected:?}"),
                expected,
                actual,
            )
            .at_path(field.as_str())
            .into());
        }
        Ok(())
    }
}

fn resolve_body(body: Option<JsonBody>) -> Result<Option<Value>> {
    body.map(|body| body.resolve()).transpose()
}

fn decode_json(content: &[u8]) -> Result<Value> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(TesterError::MissingContent);
    }
    serde_json::from_slice(content).map_err(|_| {
        AssertionFailure::new(format!(
            "Failed asserting that the response content is JSON: {}",
            String::from_utf8_lossy(content)
        ))
        .into()
    })
}

fn assert_empty_body(response: &HttpResponse) -> Result<()> {
    if !response.body.is_empty() {
        return Err(AssertionFailure::mismatch(
            "Failed asserting that the response content is empty",
            "",
            response.text(),
        )
        .into());
    }
    Ok(())
}

fn assert_status(response: &HttpResponse, expected: u16) -> Result<()> {
    if response.status != expected {
        return Err(AssertionFailure::mismatch(
            format!(
                "Failed asserting that the response status code is {expected} (body: {})",
                truncate(&response.text(), 500)
            ),
            expected.to_string(),
            response.status.to_string(),
        )
        .into());
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TesterConfig;
    use crate::reporter::{RecordingReporter, ReportEvent};
    use crate::stub::{StubClient, StubResponse};
    use serde_json::json;
    use std::fs;

    fn tester(stub: StubClient) -> ApiTester<StubClient> {
        ApiTester::new(stub)
    }

    #[test]
    fn request_response_value_matches_and_mismatches() {
        let stub = StubClient::new().on(HttpMethod::Get, "/foo", StubResponse::json(200, &json!({"foo": "bar"})));
        let tester = tester(stub);

        tester
            .assert_request_response_value(Some(&json!({"foo": "bar"})), HttpMethod::Get, "/foo", None, Some("azerty"))
            .unwrap();

        let err = tester
            .assert_request_response_value(Some(&json!({"foo": "tok"})), HttpMethod::Get, "/foo", None, Some("azerty"))
            .unwrap_err();
        let failure = err.assertion().unwrap();
        assert_eq!(failure.path.as_deref(), Some("foo"));
    }

    #[test]
    fn request_response_file_ignores_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(&path, r#"{"title":"Dune","@id":"/books/1"}"#).unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::text(200, r#"{"@id":"/books/1","title":"Dune"}"#));
        tester(stub)
            .assert_request_response_file(Some(&path), HttpMethod::Get, "/books/1", None, None)
            .unwrap();
    }

    #[test]
    fn null_fixture_requires_empty_body() {
        let stub = StubClient::new().with_fallback(StubResponse::empty(204));
        tester(stub)
            .assert_request_response_file(None, HttpMethod::Delete, "/books/1", None, None)
            .unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::text(200, "{}"));
        let err = tester(stub)
            .assert_request_response_value(None, HttpMethod::Get, "/books/1", None, None)
            .unwrap_err();
        assert!(err.is_assertion());
    }

    #[test]
    fn empty_body_is_missing_content_not_mismatch() {
        let stub = StubClient::new().with_fallback(StubResponse::empty(200));
        let err = tester(stub)
            .assert_request_response_value(Some(&json!({})), HttpMethod::Get, "/books", None, None)
            .unwrap_err();
        assert!(matches!(err, TesterError::MissingContent));
    }

    #[test]
    fn body_from_file_is_sent_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("body.json");
        fs::write(&body, r#"{"title":"Dune"}"#).unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::empty(204));
        let tester = tester(stub);
        tester
            .assert_deleted_success_response(HttpMethod::Post, "/books", Some(JsonBody::file(&body)), None)
            .unwrap();

        let req = tester.client().last_request().unwrap();
        assert_eq!(req.body, crate::http::RequestBody::Json(r#"{"title":"Dune"}"#.to_string()));
    }

    #[test]
    fn not_found_checks_status_and_description() {
        let stub = StubClient::new().with_fallback(StubResponse::json(404, &json!({"hydra:description": "Not Found"})));
        tester(stub).assert_not_found(HttpMethod::Get, "/books/9", None, None).unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::json(404, &json!({"hydra:description": "Gone"})));
        let err = tester(stub).assert_not_found(HttpMethod::Get, "/books/9", None, None).unwrap_err();
        assert_eq!(err.assertion().unwrap().actual.as_deref(), Some("Gone"));

        let stub = StubClient::new().with_fallback(StubResponse::json(200, &json!({"hydra:description": "Not Found"})));
        let err = tester(stub).assert_not_found(HttpMethod::Get, "/books/9", None, None).unwrap_err();
        assert_eq!(err.assertion().unwrap().expected.as_deref(), Some("404"));
    }

    #[test]
    fn error_helpers_use_their_fixed_messages() {
        let stub = StubClient::new()
            .on(HttpMethod::Get, "/admin", StubResponse::json(403, &json!({"hydra:description": "Access Denied."})))
            .on(HttpMethod::Post, "/books", StubResponse::json(400, &json!({"hydra:description": "Syntax error"})))
            .on(HttpMethod::Put, "/books/1", StubResponse::json(422, &json!({"hydra:description": "title: blank"})));
        let tester = tester(stub);

        tester.assert_access_denied(HttpMethod::Get, "/admin", None, None).unwrap();
        tester
            .assert_bad_request("Syntax error", HttpMethod::Post, "/books", None, None)
            .unwrap();
        tester
            .assert_invalid(Some("title: blank"), HttpMethod::Put, "/books/1", None, None)
            .unwrap();
        tester.assert_invalid(None, HttpMethod::Put, "/books/1", None, None).unwrap();
        assert!(tester
            .assert_invalid(Some("other"), HttpMethod::Put, "/books/1", None, None)
            .is_err());
    }

    #[test]
    fn description_field_is_configurable() {
        let stub = StubClient::new().with_fallback(StubResponse::json(404, &json!({"detail": "Not Found"})));
        let config = TesterConfig::default().with_error_field("detail");
        ApiTester::with_config(stub, config)
            .assert_not_found(HttpMethod::Get, "/x", None, None)
            .unwrap();
    }

    #[test]
    fn missing_description_field_fails() {
        let stub = StubClient::new().with_fallback(StubResponse::json(404, &json!({"message": "Not Found"})));
        let err = tester(stub).assert_not_found(HttpMethod::Get, "/x", None, None).unwrap_err();
        assert!(err.assertion().unwrap().message.contains("hydra:description"));
    }

    #[test]
    fn html_not_found_looks_for_title() {
        let page = "<html><head><title>Not Found</title></head></html>";
        let stub = StubClient::new().with_fallback(StubResponse::text(404, page));
        let tester = tester(stub);
        tester.assert_html_not_found(HttpMethod::Get, "/page", None, None, None).unwrap();
        assert!(tester
            .assert_html_not_found(HttpMethod::Get, "/page", None, None, Some("Gone"))
            .is_err());
        let req = tester.client().last_request().unwrap();
        assert_eq!(req.header("accept"), Some("application/ld+json"));
        assert!(req.body.is_empty());

        tester
            .assert_html_not_found(HttpMethod::Post, "/page", Some(json!({"slug": "x"}).into()), Some("t"), None)
            .unwrap();
        let req = tester.client().last_request().unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn count_response_appends_query() {
        let stub = StubClient::new()
            .on(HttpMethod::Get, "/books?count=1", StubResponse::text(200, "3"))
            .on(HttpMethod::Get, "/books?author=x&count=1", StubResponse::text(200, "abc"));
        let tester = tester(stub);

        tester.assert_count_response(3, "/books", None).unwrap();
        assert!(tester.assert_count_response(4, "/books", None).unwrap_err().is_assertion());
        let err = tester.assert_count_response(1, "/books?author=x", None).unwrap_err();
        assert!(err.assertion().unwrap().message.contains("numeric"));
    }

    #[test]
    fn download_name_defaults_to_last_segment() {
        assert_eq!(default_download_name("/documents/42/report.pdf"), "report.pdf");
        assert_eq!(default_download_name("/documents/report.pdf?v=2#top"), "report.pdf");
        assert_eq!(
            content_disposition(Disposition::Inline, "a.png"),
            "inline; filename=\"a.png\""
        );
    }

    #[test]
    fn download_attachment_and_inline() {
        let mut attachment = StubResponse::text(200, "bytes");
        attachment
            .headers
            .push(("Content-Disposition".to_string(), "attachment; filename=\"report.pdf\"".to_string()));
        let stub = StubClient::new().on(HttpMethod::Get, "/files/report.pdf", attachment);
        let tester = tester(stub);

        tester
            .assert_request_download_attachment("/files/report.pdf", Some("t"), None)
            .unwrap();
        tester
            .assert_request_download_attachment("/files/report.pdf", None, Some("report.pdf"))
            .unwrap();
        let err = tester
            .assert_request_download_inline("/files/report.pdf", None, None)
            .unwrap_err();
        assert_eq!(
            err.assertion().unwrap().expected.as_deref(),
            Some("inline; filename=\"report.pdf\"")
        );
    }

    #[test]
    fn download_requires_success() {
        let mut response = StubResponse::text(500, "");
        response
            .headers
            .push(("content-disposition".to_string(), "inline; filename=\"a.png\"".to_string()));
        let stub = StubClient::new().with_fallback(response);
        let err = tester(stub)
            .assert_request_download_inline("/img/a.png", None, None)
            .unwrap_err();
        assert_eq!(err.assertion().unwrap().expected.as_deref(), Some("2xx"));
    }

    #[test]
    fn upload_helpers_check_status_and_restore_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("v2.pdf");
        fs::write(&file, "v2").unwrap();

        let stub = StubClient::new()
            .on(
                HttpMethod::Post,
                "/documents/1/versions",
                StubResponse::json(422, &json!({"hydra:description": UPLOAD_NOT_AVAILABLE})),
            )
            .on(
                HttpMethod::Post,
                "/documents/9/versions",
                StubResponse::json(404, &json!({"hydra:description": "Not Found"})),
            )
            .on(HttpMethod::Post, "/documents", StubResponse::json(201, &json!({"name": "v2.pdf"})));
        let tester = tester(stub);

        tester
            .assert_upload_not_available("/documents/1/versions", &file, None, None)
            .unwrap();
        tester
            .assert_upload_invalid("/documents/1/versions", &file, None, None, None)
            .unwrap();
        tester
            .assert_upload_not_found("/documents/9/versions", &file, None, None)
            .unwrap();
        tester
            .assert_upload_request_response_value(Some(&json!({"name": "v2.pdf"})), "/documents", &file, None, None)
            .unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "v2");
    }

    #[test]
    fn html_response_is_compared_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<p>hello</p>").unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::text(200, "<p>hello</p>"));
        tester(stub)
            .assert_html_request_response(Some(&path), HttpMethod::Get, "/", None)
            .unwrap();

        let stub = StubClient::new().with_fallback(StubResponse::text(200, "<p>hello</p>\n"));
        assert!(tester(stub)
            .assert_html_request_response(Some(&path), HttpMethod::Get, "/", None)
            .is_err());
    }

    #[test]
    fn html_fixture_comparison_is_byte_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.html");
        // "café" in Latin-1 is not valid UTF-8.
        let page = b"<p>caf\xe9</p>".to_vec();
        fs::write(&path, &page).unwrap();

        let stub = StubClient::new().with_fallback(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: page,
        });
        tester(stub)
            .assert_html_request_response(Some(&path), HttpMethod::Get, "/", None)
            .unwrap();

        // Both sides would decode to U+FFFD, but the bytes differ.
        let stub = StubClient::new().with_fallback(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: b"<p>caf\xff</p>".to_vec(),
        });
        let err = tester(stub)
            .assert_html_request_response(Some(&path), HttpMethod::Get, "/", None)
            .unwrap_err();
        assert!(err.is_assertion());
    }

    #[test]
    fn yaml_content_is_compared_structurally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yaml");
        fs::write(&path, "openapi: 3.1.0\npaths: {}\n").unwrap();

        let tester = tester(StubClient::new());
        tester
            .assert_yaml_content(&path, "paths: {}\nopenapi: 3.1.0\n")
            .unwrap();
        let err = tester.assert_yaml_content(&path, "openapi: 3.0.0\npaths: {}\n").unwrap_err();
        assert_eq!(err.assertion().unwrap().path.as_deref(), Some("openapi"));
    }

    #[test]
    fn overwrite_writes_fixture_and_marks_risky() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        let reporter = RecordingReporter::new();

        let stub = StubClient::new().with_fallback(StubResponse::json(200, &json!({"title": "Dune"})));
        let tester = tester(stub).with_reporter(reporter.clone());
        tester
            .overwrite_request_response(&path, HttpMethod::Get, "/books/1", None, None)
            .unwrap();

        assert_eq!(fixture::load_json(&path).unwrap(), json!({"title": "Dune"}));
        assert!(reporter.is_risky());
        assert_eq!(reporter.warnings(), vec![OVERWRITE_WARNING.to_string()]);
    }

    #[test]
    fn overwrite_upload_without_path_only_warns() {
        let reporter = RecordingReporter::new();
        let tester = tester(StubClient::new()).with_reporter(reporter.clone());
        tester
            .overwrite_upload_request_response(None, "/documents", Path::new("missing.pdf"), None, None)
            .unwrap();

        assert!(tester.client().requests().is_empty());
        assert!(!reporter.is_risky());
        assert!(matches!(reporter.events().as_slice(), [ReportEvent::Warning(_)]));
    }

    #[test]
    fn overwrite_mode_turns_assertions_into_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.yaml");
        fs::write(&path, "title: Old\n").unwrap();
        let reporter = RecordingReporter::new();

        let stub = StubClient::new().with_fallback(StubResponse::json(200, &json!({"title": "New"})));
        let config = TesterConfig::default().with_overwrite(true);
        let tester = ApiTester::with_config(stub, config).with_reporter(reporter.clone());
        tester
            .assert_request_response_file(Some(&path), HttpMethod::Get, "/books/1", None, None)
            .unwrap();

        assert_eq!(fixture::load_yaml(&path).unwrap(), json!({"title": "New"}));
        assert!(reporter.is_risky());
    }
}
