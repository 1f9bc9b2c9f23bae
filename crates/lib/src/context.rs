//! Cancellable execution context shared by concurrent build tasks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;

use crate::gateway::GatewayError;

/// A cloneable cancellation handle.
///
/// Contexts form a tree: cancelling a context cancels every context derived
/// from it with [`BuildContext::child`], while cancelling a child leaves its
/// parent untouched.
#[derive(Debug, Clone)]
pub struct BuildContext {
  inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
  cancelled: watch::Sender<bool>,
  parent: Option<BuildContext>,
}

impl Default for BuildContext {
  fn default() -> Self {
    Self::new()
  }
}

impl BuildContext {
  /// A root context that is only cancelled explicitly.
  pub fn new() -> Self {
    Self::with_parent(None)
  }

  fn with_parent(parent: Option<BuildContext>) -> Self {
    let (cancelled, _) = watch::channel(false);
    Self {
      inner: Arc::new(Inner { cancelled, parent }),
    }
  }

  /// Derive a context that is cancelled together with this one.
  pub fn child(&self) -> Self {
    Self::with_parent(Some(self.clone()))
  }

  pub fn cancel(&self) {
    self.inner.cancelled.send_replace(true);
  }

  pub fn is_cancelled(&self) -> bool {
    *self.inner.cancelled.borrow() || self.inner.parent.as_ref().is_some_and(BuildContext::is_cancelled)
  }

  /// Resolves once this context or any ancestor is cancelled.
  pub fn cancelled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
    Box::pin(async move {
      let mut rx = self.inner.cancelled.subscribe();
      match &self.inner.parent {
        Some(parent) => {
          tokio::select! {
            _ = rx.wait_for(|cancelled| *cancelled) => {}
            _ = parent.cancelled() => {}
          }
        }
        None => {
          let _ = rx.wait_for(|cancelled| *cancelled).await;
        }
      }
    })
  }

  /// Drive a collaborator call, abandoning it as soon as the context is
  /// cancelled.
  pub async fn run<F, T>(&self, call: F) -> Result<T, GatewayError>
  where
    F: Future<Output = Result<T, GatewayError>>,
  {
    if self.is_cancelled() {
      return Err(GatewayError::Cancelled);
    }
    tokio::select! {
      biased;
      _ = self.cancelled() => Err(GatewayError::Cancelled),
      result = call => result,
    }
  }
}
