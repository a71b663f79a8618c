use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, Request};

use crate::{
    cancel::CancelScope,
    types::{Outcome, RequestFailure},
    Result, StrategyConfig, TimeoutDemoError,
};

/// The five ways of bounding a request that the demo contrasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// No bound at all; waits as long as the server does.
    Unbounded,
    /// Client-wide timeout, server answers within it.
    ClientTimeoutSuccess,
    /// Client-wide timeout, server answers after it.
    ClientTimeoutFail,
    /// Deadline carried by a [`CancelScope`] instead of the client.
    CancelScope,
    /// Bound on connection establishment only.
    DialTimeout,
}

impl Strategy {
    /// All strategies in the order the demo launches them.
    pub const ALL: [Strategy; 5] = [
        Strategy::Unbounded,
        Strategy::ClientTimeoutSuccess,
        Strategy::ClientTimeoutFail,
        Strategy::CancelScope,
        Strategy::DialTimeout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Unbounded => "unbounded",
            Self::ClientTimeoutSuccess => "client_timeout_success",
            Self::ClientTimeoutFail => "client_timeout_fail",
            Self::CancelScope => "cancel_scope",
            Self::DialTimeout => "dial_timeout",
        }
    }

    /// Runs one GET with this strategy's mechanism.
    ///
    /// Request failures are recorded in the returned [`Outcome`]; only errors
    /// that prevent sending the request are returned as `Err`.
    pub async fn run(self, config: &StrategyConfig) -> Result<Outcome> {
        tracing::debug!(
            strategy = %self,
            url = %config.url,
            client_timeout = ?config.client_timeout,
            context_timeout = ?config.context_timeout,
            connect_timeout = ?config.connect_timeout,
            "preparing request"
        );
        match self {
            Self::Unbounded => unbounded(self, &config.url).await,
            Self::ClientTimeoutSuccess | Self::ClientTimeoutFail => {
                client_timeout(self, &config.url, config.client_timeout).await
            }
            Self::CancelScope => {
                let scope = match config.context_timeout {
                    Some(timeout) => CancelScope::with_timeout(timeout),
                    None => CancelScope::new(),
                };
                cancel_scope(self, &config.url, scope).await
            }
            Self::DialTimeout => dial_timeout(self, &config.url, config.connect_timeout).await,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// GET with a client that has no timeout configured.
pub async fn unbounded(strategy: Strategy, url: &str) -> Result<Outcome> {
    let http = build_client(Client::builder())?;
    let request = build_get(&http, url)?;
    Ok(send(strategy, &http, request).await)
}

/// GET with a client-wide timeout covering the whole request.
pub async fn client_timeout(
    strategy: Strategy,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Outcome> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let http = build_client(builder)?;
    let request = build_get(&http, url)?;
    Ok(send(strategy, &http, request).await)
}

/// GET raced against `scope`, with no timeout on the client itself.
///
/// The scope is consumed and released before this returns, whichever way the
/// request ends.
pub async fn cancel_scope(strategy: Strategy, url: &str, scope: CancelScope) -> Result<Outcome> {
    let http = build_client(Client::builder())?;
    let request = build_get(&http, url)?;

    let start = Instant::now();
    let response = match scope.run(http.execute(request)).await {
        Ok(Ok(response)) => Ok(response.status().as_u16()),
        Ok(Err(err)) => Err(RequestFailure::from_reqwest(&err)),
        Err(kind) => Err(RequestFailure::new(
            kind,
            format!("GET {url}: cancel scope ended before the response ({kind})"),
        )),
    };
    let elapsed = start.elapsed();
    drop(scope);

    Ok(Outcome {
        strategy,
        response,
        elapsed,
    })
}

/// GET with a bound on connection establishment only.
///
/// Once connected, the response is awaited for as long as the server takes.
pub async fn dial_timeout(
    strategy: Strategy,
    url: &str,
    connect_timeout: Option<Duration>,
) -> Result<Outcome> {
    let mut builder = Client::builder();
    if let Some(timeout) = connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    let http = build_client(builder)?;
    let request = build_get(&http, url)?;
    Ok(send(strategy, &http, request).await)
}

fn build_client(builder: reqwest::ClientBuilder) -> Result<Client> {
    builder.build().map_err(TimeoutDemoError::ClientBuild)
}

fn build_get(http: &Client, url: &str) -> Result<Request> {
    http.request(Method::GET, url)
        .build()
        .map_err(|source| TimeoutDemoError::InvalidRequest {
            url: url.to_owned(),
            source,
        })
}

async fn send(strategy: Strategy, http: &Client, request: Request) -> Outcome {
    let start = Instant::now();
    let response = http.execute(request).await;
    let elapsed = start.elapsed();

    Outcome {
        strategy,
        response: response
            .map(|response| response.status().as_u16())
            .map_err(|err| RequestFailure::from_reqwest(&err)),
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::{Strategy, TimeoutDemoError};
    use crate::StrategyConfig;

    #[test]
    fn names_are_distinct_and_displayed() {
        let names: std::collections::HashSet<_> =
            Strategy::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Strategy::ALL.len());
        assert_eq!(Strategy::DialTimeout.to_string(), "dial_timeout");
    }

    #[tokio::test]
    async fn malformed_url_aborts_before_sending() {
        for strategy in Strategy::ALL {
            let err = strategy
                .run(&StrategyConfig::new("not a url"))
                .await
                .expect_err("malformed url must not produce an outcome");
            match err {
                TimeoutDemoError::InvalidRequest { url, source } => {
                    assert_eq!(url, "not a url");
                    assert!(source.is_builder());
                }
                other => panic!("expected invalid request for {strategy}, got {other:?}"),
            }
        }
    }
}
