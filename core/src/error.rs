//! Error types for the API test helpers.
//!
//! # Design
//! Assertion mismatches get their own variant carrying an `AssertionFailure`,
//! so callers can tell "the API answered something unexpected" apart from
//! "the helper could not even run" (transport, fixture I/O, malformed
//! documents). Transport errors are boxed unchanged from the injected client.

use std::fmt;
use std::path::PathBuf;

/// Errors returned by `ApiTester` requests and assertions.
#[derive(Debug, thiserror::Error)]
pub enum TesterError {
    /// The injected HTTP client failed to execute the request.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading, writing or protecting a file on disk failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document that should be JSON could not be parsed or produced.
    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document that should be YAML could not be parsed or produced.
    #[error("invalid YAML in {context}: {source}")]
    Yaml {
        context: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The response carried no content where a document was required.
    #[error("json content is missing")]
    MissingContent,

    /// Upload form parameters could not be turned into form fields.
    #[error("multipart encoding failed: {0}")]
    Multipart(String),

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// The response did not match what the test expected.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
}

impl TesterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TesterError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        TesterError::Json {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn yaml(context: impl Into<String>, source: serde_yaml::Error) -> Self {
        TesterError::Yaml {
            context: context.into(),
            source,
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, TesterError::Assertion(_))
    }

    pub fn assertion(&self) -> Option<&AssertionFailure> {
        match self {
            TesterError::Assertion(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A failed expectation, rendered like a test-framework comparison failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub message: String,
    /// Path of the first differing field, when the comparison was structural.
    pub path: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            expected: None,
            actual: None,
        }
    }

    /// Failure comparing two displayable values.
    pub fn mismatch(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            path: None,
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, "\n--- Expected\n{expected}\n+++ Actual\n{actual}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AssertionFailure {}

/// Shorthand for `Result<T, TesterError>`.
pub type Result<T, E = TesterError> = std::result::Result<T, E>;
