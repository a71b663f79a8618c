/// Error type returned by this crate.
///
/// These errors stop a single strategy before (or instead of) its request.
/// Failures of the request itself are recorded in
/// [`Outcome`](crate::Outcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutDemoError {
    /// The HTTP client could not be constructed.
    #[error("client build error: {0}")]
    ClientBuild(reqwest::Error),
    /// The request could not be formed (bad URL or method); nothing was sent.
    #[error("invalid request for {url}: {source}")]
    InvalidRequest {
        /// Target URL as configured.
        url: String,
        /// Builder error from `reqwest`.
        source: reqwest::Error,
    },
    /// The task running a strategy panicked or was aborted.
    #[error("strategy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// An environment override could not be used.
    #[error("config error: {0}")]
    Config(String),
}
