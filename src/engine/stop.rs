// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Shared stop signal of one run, backed by a [`CancellationToken`].
///
/// The engine checks it between actor invocations, never inside a leaf.
/// Clones observe and cancel the same token; [`StopHandle::reset`] swaps in a
/// fresh one for the next run.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    token: Arc<Mutex<CancellationToken>>,
    message: Arc<Mutex<Option<String>>>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the current run, for code that wants to await the stop.
    pub fn token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stop(&self) {
        self.token().cancel();
    }

    /// Request a stop and record why. The first message wins.
    pub fn stop_with(&self, message: impl Into<String>) {
        let mut current = self.message.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_none() {
            *current = Some(message.into());
        }
        drop(current);
        self.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.token().is_cancelled()
    }

    /// Resolves once the current run is stopped.
    pub async fn cancelled(&self) {
        let token = self.token();
        token.cancelled().await;
    }

    pub fn message(&self) -> Option<String> {
        self.message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fresh token and no message before a new run.
    pub fn reset(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
        *self.message.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_signal() {
        let handle = StopHandle::new();
        let other = handle.clone();
        assert!(!other.is_stopped());
        handle.stop_with("limit reached");
        handle.stop_with("ignored");
        assert!(other.is_stopped());
        assert_eq!(other.message().as_deref(), Some("limit reached"));

        other.reset();
        assert!(!handle.is_stopped());
        assert!(handle.message().is_none());
    }

    #[test]
    fn reset_leaves_old_tokens_cancelled() {
        let handle = StopHandle::new();
        let previous = handle.token();
        handle.stop();
        handle.reset();
        assert!(previous.is_cancelled());
        assert!(!handle.token().is_cancelled());
    }

    #[tokio::test]
    async fn waiters_wake_on_stop() {
        let handle = StopHandle::new();
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.cancelled().await })
        };
        handle.stop();
        waiter.await.unwrap();
        assert!(handle.is_stopped());
    }
}
