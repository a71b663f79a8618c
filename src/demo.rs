use std::time::Instant;

use tokio::task::JoinHandle;

use crate::{DemoConfig, Outcome, Result, Strategy};

/// Runs every [`Strategy`] concurrently and waits for all of them.
///
/// Each strategy gets its own task and its own HTTP client. Outcomes are
/// logged as each task finishes; a failure in one task never stops the
/// others. The returned results are in [`Strategy::ALL`] order.
pub async fn run(config: &DemoConfig) -> Vec<Result<Outcome>> {
    let start = Instant::now();

    let handles: Vec<(Strategy, JoinHandle<Result<Outcome>>)> = Strategy::ALL
        .into_iter()
        .map(|strategy| {
            let strategy_config = config.strategy(strategy);
            let handle = tokio::spawn(async move {
                tracing::info!(strategy = %strategy, url = %strategy_config.url, "beginning request");
                let result = strategy.run(&strategy_config).await;
                match &result {
                    Ok(outcome) => report(outcome),
                    Err(err) => {
                        tracing::error!(strategy = %strategy, error = %err, "request not sent")
                    }
                }
                result
            });
            (strategy, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (strategy, handle) in handles {
        let result = handle.await.unwrap_or_else(|err| {
            tracing::error!(strategy = %strategy, error = %err, "strategy task failed");
            Err(err.into())
        });
        results.push(result);
    }

    let succeeded = results
        .iter()
        .filter(|result| matches!(result, Ok(outcome) if outcome.is_success()))
        .count();
    tracing::info!(
        succeeded,
        failed = results.len() - succeeded,
        total_secs = start.elapsed().as_secs_f64(),
        "all strategies finished"
    );

    results
}

/// Writes one log line describing `outcome`.
pub fn report(outcome: &Outcome) {
    let elapsed_secs = outcome.elapsed.as_secs_f64();
    match &outcome.response {
        Ok(status) => tracing::info!(
            strategy = %outcome.strategy,
            status,
            elapsed_secs,
            "request succeeded"
        ),
        Err(failure) => tracing::warn!(
            strategy = %outcome.strategy,
            code = failure.kind.code(),
            error = %failure.message,
            elapsed_secs,
            "request failed"
        ),
    }
}
