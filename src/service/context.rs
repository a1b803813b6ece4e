use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

/// Per-call context: a request id for log correlation, an optional
/// deadline, and an optional cancellation signal (`true` means cancel).
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
            cancel: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves once the deadline passes or cancellation is signalled.
    /// Never resolves for a context with neither.
    pub async fn done(&self) {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped sender can no longer cancel anything.
                    let sender_gone = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if sender_gone {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = deadline => {}
            _ = cancelled => {}
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation channel that flips to `true` once `signal` resolves and
/// `grace` has elapsed. Requests already running get the grace window to
/// finish before their store operations are cancelled.
pub fn cancel_after_grace<F>(signal: F, grace: Duration) -> watch::Receiver<bool>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        signal.await;
        tracing::info!(grace_secs = grace.as_secs(), "Shutdown requested, draining in-flight requests");
        tokio::time::sleep(grace).await;
        tracing::warn!("Grace period over, cancelling in-flight store operations");
        let _ = tx.send(true);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_resolves_done() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(20));
        tokio::time::timeout(Duration::from_secs(1), ctx.done())
            .await
            .expect("deadline should fire");
    }

    #[tokio::test]
    async fn test_cancel_signal_resolves_done() {
        let (tx, rx) = watch::channel(false);
        let ctx = RequestContext::new().with_cancellation(rx);

        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), ctx.done())
            .await
            .expect("cancellation should fire");
    }

    #[tokio::test]
    async fn test_plain_context_never_resolves() {
        let ctx = RequestContext::new();
        let result = tokio::time::timeout(Duration::from_millis(50), ctx.done()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dropped_sender_does_not_cancel() {
        let (tx, rx) = watch::channel(false);
        let ctx = RequestContext::new().with_cancellation(rx);
        drop(tx);

        let result = tokio::time::timeout(Duration::from_millis(50), ctx.done()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_only_after_grace() {
        let rx = cancel_after_grace(async {}, Duration::from_millis(100));
        let ctx = RequestContext::new().with_cancellation(rx.clone());

        let early = tokio::time::timeout(Duration::from_millis(30), ctx.done()).await;
        assert!(early.is_err());
        assert!(!*rx.borrow());

        tokio::time::timeout(Duration::from_secs(1), ctx.done())
            .await
            .expect("cancellation should fire after the grace period");
    }

    #[tokio::test]
    async fn test_no_shutdown_signal_never_cancels() {
        let rx = cancel_after_grace(std::future::pending(), Duration::ZERO);
        let ctx = RequestContext::new().with_cancellation(rx);

        let result = tokio::time::timeout(Duration::from_millis(50), ctx.done()).await;
        assert!(result.is_err());
    }
}
