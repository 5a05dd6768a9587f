//! Request and assertion helpers for testing a JSON-LD/hydra HTTP API.
//!
//! # Overview
//! `ApiTester` wraps an injected `HttpClient` and offers:
//! - request builders for JSON, HTML, download and multipart upload calls;
//! - one-shot assertions comparing status, headers and bodies against
//!   expectations, including JSON/YAML fixture files;
//! - overwrite helpers regenerating those fixtures from live responses.
//!
//! # Design
//! - The helper layer never touches the network. `build_*` methods produce
//!   plain `HttpRequest` values and the client executes them.
//! - Assertions return `Result`; a mismatch is `TesterError::Assertion`, so
//!   tests can propagate it with `?` or inspect it.
//! - Fixture overwrites are reported through an explicit `Reporter`, which
//!   always receives a warning and a risky marker.
//!
//! ```no_run
//! use api_tester::{ApiTester, HttpMethod, UreqClient};
//! use std::path::Path;
//!
//! let tester = ApiTester::new(UreqClient::new("http://localhost:3000"));
//! tester.assert_request_response_file(
//!     Some(Path::new("tests/fixtures/book.json")),
//!     HttpMethod::Get,
//!     "/books/1",
//!     None,
//!     None,
//! )?;
//! tester.assert_not_found(HttpMethod::Get, "/books/999", None, None)?;
//! # Ok::<(), api_tester::TesterError>(())
//! ```

pub mod assertions;
pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod fixture;
pub mod http;
pub mod multipart;
pub mod reporter;
pub mod stub;
pub mod transport;
pub mod upload;

pub use assertions::Disposition;
pub use client::ApiTester;
pub use config::TesterConfig;
pub use error::{AssertionFailure, TesterError};
pub use fixture::JsonBody;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use reporter::{RecordingReporter, ReportEvent, Reporter, TracingReporter};
pub use stub::{StubClient, StubResponse};
pub use transport::HttpClient;
#[cfg(feature = "ureq")]
pub use transport::{UreqClient, UreqError};
