use std::time::Duration;

use crate::{Strategy, TimeoutDemoError};

/// Base URL of the public httpstat-style endpoint used by default.
pub const DEFAULT_BASE_URL: &str = "https://httpstat.us";

/// Bound used by every timeout mechanism unless overridden.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

const SUCCESS_STATUS: u16 = 200;
const SUCCESS_SLEEP_MS: u64 = 1_000;
const FAIL_STATUS: u16 = 504;
const FAIL_SLEEP_MS: u64 = 6_000;
// The public endpoint caps its delay at five minutes.
const UNBOUNDED_SLEEP_MS: u64 = 300_000;

const ENV_BASE_URL: &str = "HTTP_TIMEOUT_DEMO_BASE_URL";
const ENV_TIMEOUT_MS: &str = "HTTP_TIMEOUT_DEMO_TIMEOUT_MS";

/// Formats an httpstat-style target that answers `status` after `sleep_ms`.
///
/// Example: `("https://httpstat.us", 504, 6000)` → `"https://httpstat.us/504?sleep=6000"`
pub fn target_url(base_url: &str, status: u16, sleep_ms: u64) -> String {
    format!(
        "{}/{status}?sleep={sleep_ms}",
        base_url.trim().trim_end_matches('/')
    )
}

/// Target and time bounds for a single strategy run.
///
/// Each bound is independent; a strategy only sets the one it demonstrates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StrategyConfig {
    pub url: String,
    /// Whole-request bound enforced by the HTTP client.
    pub client_timeout: Option<Duration>,
    /// Deadline of the cancel scope wrapping the request.
    pub context_timeout: Option<Duration>,
    /// Bound on connection establishment only.
    pub connect_timeout: Option<Duration>,
}

impl StrategyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Targets and bounds for the whole demonstration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DemoConfig {
    /// Target of the unbounded strategy; slow, but within the server's cap.
    pub unbounded_url: String,
    /// Target answering faster than `client_timeout`.
    pub success_url: String,
    /// Target answering slower than every configured bound.
    pub fail_url: String,
    pub client_timeout: Duration,
    pub context_timeout: Duration,
    pub dial_timeout: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl DemoConfig {
    /// Builds the default targets against another httpstat-compatible host.
    pub fn with_base_url(base_url: &str) -> Self {
        let timeout = Duration::from_millis(DEFAULT_TIMEOUT_MS);
        Self {
            unbounded_url: target_url(base_url, SUCCESS_STATUS, UNBOUNDED_SLEEP_MS),
            success_url: target_url(base_url, SUCCESS_STATUS, SUCCESS_SLEEP_MS),
            fail_url: target_url(base_url, FAIL_STATUS, FAIL_SLEEP_MS),
            client_timeout: timeout,
            context_timeout: timeout,
            dial_timeout: timeout,
        }
    }

    /// Creates the configuration from defaults plus environment overrides.
    ///
    /// Reads (both optional):
    /// - `HTTP_TIMEOUT_DEMO_BASE_URL` — httpstat-compatible host for all targets
    /// - `HTTP_TIMEOUT_DEMO_TIMEOUT_MS` — value for all three bounds
    ///
    /// Returns an error if a variable is set but empty or not a number.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut config = match lookup(ENV_BASE_URL) {
            Some(base) if base.trim().is_empty() => {
                return Err(TimeoutDemoError::Config(format!(
                    "{ENV_BASE_URL} is set but empty"
                )));
            }
            Some(base) => Self::with_base_url(&base),
            None => Self::default(),
        };

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|err| {
                TimeoutDemoError::Config(format!("{ENV_TIMEOUT_MS}={raw:?} is not a number: {err}"))
            })?;
            config = config.with_all_timeouts(Duration::from_millis(ms));
        }

        Ok(config)
    }

    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    pub fn with_context_timeout(mut self, timeout: Duration) -> Self {
        self.context_timeout = timeout;
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_all_timeouts(self, timeout: Duration) -> Self {
        self.with_client_timeout(timeout)
            .with_context_timeout(timeout)
            .with_dial_timeout(timeout)
    }

    /// Returns the target and the single bound `strategy` runs with.
    pub fn strategy(&self, strategy: Strategy) -> StrategyConfig {
        match strategy {
            Strategy::Unbounded => StrategyConfig::new(&self.unbounded_url),
            Strategy::ClientTimeoutSuccess => StrategyConfig {
                client_timeout: Some(self.client_timeout),
                ..StrategyConfig::new(&self.success_url)
            },
            Strategy::ClientTimeoutFail => StrategyConfig {
                client_timeout: Some(self.client_timeout),
                ..StrategyConfig::new(&self.fail_url)
            },
            Strategy::CancelScope => StrategyConfig {
                context_timeout: Some(self.context_timeout),
                ..StrategyConfig::new(&self.fail_url)
            },
            Strategy::DialTimeout => StrategyConfig {
                connect_timeout: Some(self.dial_timeout),
                ..StrategyConfig::new(&self.fail_url)
            },
        }
    }
}
