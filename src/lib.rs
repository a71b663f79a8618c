//! `http-timeout-demo` contrasts the ways an outbound HTTP request can be
//! bounded in time:
//! - no bound at all
//! - a client-wide timeout ([`Strategy::ClientTimeoutSuccess`] and
//!   [`Strategy::ClientTimeoutFail`])
//! - a deadline carried by a [`CancelScope`]
//! - a connect-only timeout, which does not bound the response wait
//!
//! [`demo::run`] launches all of them at once and logs each outcome.

mod cancel;
pub mod demo;
mod error;
mod options;
mod strategy;
mod types;

pub use cancel::{CancelHandle, CancelScope};
pub use error::TimeoutDemoError;
pub use options::{target_url, DemoConfig, StrategyConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use strategy::{cancel_scope, client_timeout, dial_timeout, unbounded, Strategy};
pub use types::{FailureKind, Outcome, RequestFailure};

pub type Result<T> = std::result::Result<T, TimeoutDemoError>;
