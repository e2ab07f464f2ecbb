//! Deferred completion signals
//!
//! Operations that finish later (awaited scrolls, batch transitions) hand out a
//! `Completion`. It is a future, but the engine is frame-driven, so hosts that
//! do not run an executor can poll it with `check()`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::{Error, Result};

/// Create a linked resolver/completion pair
pub fn pair() -> (Resolver, Completion) {
    let (tx, rx) = oneshot::channel();
    (
        Resolver { tx },
        Completion {
            state: State::Pending(rx),
        },
    )
}

/// Completes the paired `Completion`. Dropping it unresolved cancels.
#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<()>,
}

impl Resolver {
    pub fn resolve(self) {
        // The waiter may have given up; that is not an error.
        let _ = self.tx.send(());
    }

    /// Whether the `Completion` side was dropped
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
enum State {
    Pending(oneshot::Receiver<()>),
    Resolved,
    Cancelled,
}

#[derive(Debug)]
pub struct Completion {
    state: State,
}

impl Completion {
    /// A completion that is already resolved
    pub fn ready() -> Self {
        Self {
            state: State::Resolved,
        }
    }

    /// Poll without blocking: `None` while pending
    pub fn check(&mut self) -> Option<Result<()>> {
        if let State::Pending(rx) = &mut self.state {
            match rx.try_recv() {
                Ok(()) => self.state = State::Resolved,
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => self.state = State::Cancelled,
            }
        }
        Some(self.outcome())
    }

    pub fn is_resolved(&mut self) -> bool {
        matches!(self.check(), Some(Ok(())))
    }

    pub fn is_pending(&mut self) -> bool {
        self.check().is_none()
    }

    fn outcome(&self) -> Result<()> {
        match self.state {
            State::Cancelled => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

impl Future for Completion {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let State::Pending(rx) = &mut this.state {
            match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(())) => this.state = State::Resolved,
                Poll::Ready(Err(_)) => this.state = State::Cancelled,
            }
        }
        Poll::Ready(this.outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_is_resolved() {
        let mut done = Completion::ready();
        assert!(done.is_resolved());
    }

    #[test]
    fn test_resolve_then_check() {
        let (resolver, mut completion) = pair();
        assert!(completion.is_pending());
        resolver.resolve();
        assert!(completion.is_resolved());
        // Stays resolved on repeated checks
        assert!(completion.is_resolved());
    }

    #[test]
    fn test_dropped_resolver_cancels() {
        let (resolver, mut completion) = pair();
        drop(resolver);
        assert!(matches!(completion.check(), Some(Err(Error::Cancelled))));
    }

    #[test]
    fn test_abandoned_completion_is_visible_to_resolver() {
        let (resolver, completion) = pair();
        assert!(!resolver.is_abandoned());
        drop(completion);
        assert!(resolver.is_abandoned());
    }

    #[tokio::test]
    async fn test_await_resolution() {
        let (resolver, completion) = pair();
        resolver.resolve();
        assert!(completion.await.is_ok());
    }

    #[tokio::test]
    async fn test_await_cancellation() {
        let (resolver, completion) = pair();
        drop(resolver);
        assert!(matches!(completion.await, Err(Error::Cancelled)));
    }
}
