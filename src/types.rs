use std::fmt;
use std::time::Duration;

use crate::Strategy;

/// Classification of a request that did not produce a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A whole-request bound (client timeout or scope deadline) elapsed.
    DeadlineExceeded,
    /// The cancel scope was cancelled explicitly before the response arrived.
    Cancelled,
    /// The connection could not be established within the dial bound.
    ConnectTimeout,
    /// Connection refused, DNS failure, TLS handshake failure.
    Connect,
    /// Error while sending the request.
    Request,
    /// Error while reading the response body.
    Body,
    Other,
}

impl FailureKind {
    /// Classifies a `reqwest` execution error.
    ///
    /// A connect error caused by a timeout is reported as
    /// [`FailureKind::ConnectTimeout`], not as a deadline.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            if err.is_timeout() {
                Self::ConnectTimeout
            } else {
                Self::Connect
            }
        } else if err.is_timeout() {
            Self::DeadlineExceeded
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else if err.is_request() {
            Self::Request
        } else {
            Self::Other
        }
    }

    /// Stable short code written to the log's `code` field.
    pub fn code(self) -> &'static str {
        match self {
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Cancelled => "cancelled",
            Self::ConnectTimeout => "connect_timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A request that was sent (or attempted) but did not complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds the failure from `err`, appending its source chain so that
    /// refused, timed out and reset connections read differently.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::new(FailureKind::classify(err), message)
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result record of one strategy run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub strategy: Strategy,
    /// Response status code, or why no response was received.
    ///
    /// Non-2xx statuses are completed requests, not failures.
    pub response: Result<u16, RequestFailure>,
    /// Wall-clock time from sending the request until it completed or failed.
    pub elapsed: Duration,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.response.is_ok()
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().ok().copied()
    }

    pub fn failure(&self) -> Option<&RequestFailure> {
        self.response.as_ref().err()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure().map(|failure| failure.kind)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{FailureKind, Outcome, RequestFailure};
    use crate::Strategy;

    #[test]
    fn codes_are_unique() {
        let kinds = [
            FailureKind::DeadlineExceeded,
            FailureKind::Cancelled,
            FailureKind::ConnectTimeout,
            FailureKind::Connect,
            FailureKind::Request,
            FailureKind::Body,
            FailureKind::Other,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn reqwest_failure_message_includes_source_chain() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("relative url must not build");

        let failure = RequestFailure::from_reqwest(&err);

        assert!(failure.message.starts_with(&err.to_string()));
        assert!(failure.message.contains("relative URL without a base"));
    }

    #[test]
    fn outcome_accessors_follow_response() {
        let ok = Outcome {
            strategy: Strategy::Unbounded,
            response: Ok(504),
            elapsed: Duration::from_millis(10),
        };
        assert!(ok.is_success());
        assert_eq!(ok.status(), Some(504));
        assert_eq!(ok.failure_kind(), None);

        let failed = Outcome {
            strategy: Strategy::ClientTimeoutFail,
            response: Err(RequestFailure::new(FailureKind::DeadlineExceeded, "too slow")),
            elapsed: Duration::from_millis(10),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.status(), None);
        assert_eq!(failed.failure_kind(), Some(FailureKind::DeadlineExceeded));
        assert_eq!(
            failed.failure().map(ToString::to_string),
            Some("deadline_exceeded: too slow".to_owned())
        );
    }
}
