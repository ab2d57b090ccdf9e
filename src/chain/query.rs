//! Cancellable query scopes and height-bound query contexts

use super::types::Height;
use crate::error::{RelayerError, RelayerResult};

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation scope shared by every query issued on behalf of one caller.
///
/// Clones observe the same signal. Cancelling any clone cancels all of them.
#[derive(Debug, Clone)]
pub struct QueryScope {
    trigger: Arc<watch::Sender<bool>>,
    signal: watch::Receiver<bool>,
}

impl QueryScope {
    pub fn new() -> Self {
        let (trigger, signal) = watch::channel(false);
        Self {
            trigger: Arc::new(trigger),
            signal,
        }
    }

    pub fn cancel(&self) {
        self.trigger.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once the scope is cancelled
    pub async fn cancelled(&self) {
        let mut signal = self.signal.clone();
        // The scope owns a sender, so the channel cannot close under us.
        while !*signal.borrow_and_update() {
            if signal.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless the scope is cancelled first
    pub async fn run<T, F>(&self, chain_id: &str, fut: F) -> RelayerResult<T>
    where
        F: Future<Output = RelayerResult<T>>,
    {
        if self.is_cancelled() {
            return Err(RelayerError::query(chain_id, "query scope cancelled"));
        }
        tokio::select! {
            res = fut => res,
            _ = self.cancelled() => Err(RelayerError::query(chain_id, "query scope cancelled")),
        }
    }
}

impl Default for QueryScope {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed height bound to a cancellable scope
#[derive(Debug, Clone)]
pub struct QueryContext {
    scope: QueryScope,
    height: Height,
}

impl QueryContext {
    pub fn new(scope: QueryScope, height: Height) -> Self {
        Self { scope, height }
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn scope(&self) -> &QueryScope {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_is_shared_between_clones() {
        let scope = QueryScope::new();
        let clone = scope.clone();
        assert!(!clone.is_cancelled());

        scope.cancel();
        assert!(clone.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), clone.cancelled())
            .await
            .expect("cancelled() should resolve");
    }

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let scope = QueryScope::new();
        let res = scope.run("ibc-0", async { Ok::<_, RelayerError>(5u64) }).await;
        assert_eq!(res.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_run_aborts_pending_query_on_cancel() {
        let scope = QueryScope::new();
        let canceller = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let res = scope
            .run("ibc-0", std::future::pending::<RelayerResult<()>>())
            .await;
        assert!(matches!(res, Err(RelayerError::Query { .. })));
    }

    #[test]
    fn test_context_keeps_height() {
        let ctx = QueryContext::new(QueryScope::new(), Height::new(1, 42));
        assert_eq!(ctx.height(), Height::new(1, 42));
        assert!(!ctx.scope().is_cancelled());
    }
}
