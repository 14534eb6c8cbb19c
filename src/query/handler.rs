//! Query handler trait and per-request context.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{BoxError, QueryError};
use super::types::{DataQuery, DataResponse, DataSource};

/// Executes queries against one kind of data source.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn data_query(
        &self,
        ctx: &QueryContext,
        data_source: &DataSource,
        query: &DataQuery,
    ) -> Result<DataResponse, QueryError>;
}

/// Builds a handler for a data source.
pub type HandlerFactory =
    Arc<dyn Fn(&DataSource) -> Result<Arc<dyn QueryHandler>, BoxError> + Send + Sync>;

/// Cancellation and deadline carried from the caller into a handler.
///
/// Cloning shares the same token; cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// A context cancelled with this one but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns the error a handler should report if it stops now.
    pub fn check(&self) -> Result<(), QueryError> {
        if self.is_cancelled() {
            Err(QueryError::Cancelled)
        } else if self.is_expired() {
            Err(QueryError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }

    /// Runs `fut` until it completes, the context is cancelled, or the
    /// deadline passes, whichever happens first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        self.check()?;
        let sleep = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(QueryError::Cancelled),
            _ = sleep => Err(QueryError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = QueryContext::new();
        let value = ctx.run(async { Ok::<_, QueryError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_run_observes_cancellation() {
        let ctx = QueryContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, QueryError>(())
            })
            .await;
        assert!(matches!(result, Err(QueryError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_observes_deadline() {
        let ctx = QueryContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, QueryError>(())
            })
            .await;
        assert!(matches!(result, Err(QueryError::DeadlineExceeded)));
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = QueryContext::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());

        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
        assert!(matches!(child.check(), Err(QueryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_shorter_timeout_wins() {
        let ctx = QueryContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        let remaining = ctx.deadline().unwrap() - Instant::now();
        assert!(remaining <= Duration::from_secs(1));
    }
}
