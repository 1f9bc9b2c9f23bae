//! Concurrent per-platform execution.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error};

use crate::context::BuildContext;
use crate::error::FrontendError;
use crate::platform::Platform;

/// Run `pipeline` once per platform, concurrently, and collect the results in
/// the order of `platforms`.
///
/// Each pipeline receives a context derived from `ctx`. The first failure
/// cancels that context, aborts and drains every other pipeline, and is the
/// error returned; failures observed afterwards are dropped. No partial
/// results are returned.
pub async fn run_platforms<T, F, Fut>(
  ctx: &BuildContext,
  platforms: &[Platform],
  pipeline: F,
) -> Result<Vec<T>, FrontendError>
where
  T: Send + 'static,
  F: Fn(BuildContext, Platform) -> Fut,
  Fut: Future<Output = Result<T, FrontendError>> + Send + 'static,
{
  let ctx = ctx.child();
  let mut join_set = JoinSet::new();
  let mut tasks = HashMap::with_capacity(platforms.len());

  for (index, platform) in platforms.iter().enumerate() {
    let handle = join_set.spawn(pipeline(ctx.clone(), platform.clone()));
    tasks.insert(handle.id(), (index, platform.key()));
  }
  debug!(tasks = platforms.len(), "started platform builds");

  let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(platforms.len()).collect();

  while let Some(joined) = join_set.join_next_with_id().await {
    let failure = match joined {
      Ok((id, Ok(value))) => {
        if let Some(&(index, ref key)) = tasks.get(&id) {
          debug!(platform = %key, "platform build finished");
          slots[index] = Some(value);
        }
        continue;
      }
      Ok((_, Err(e))) => e,
      Err(e) => {
        let platform = tasks.get(&e.id()).map(|(_, key)| key.clone()).unwrap_or_default();
        FrontendError::TaskFailed {
          platform,
          message: join_error_message(e),
        }
      }
    };

    error!(error = %failure, "platform build failed, cancelling remaining builds");
    ctx.cancel();
    join_set.shutdown().await;
    return Err(failure);
  }

  slots
    .into_iter()
    .zip(platforms)
    .map(|(slot, platform)| slot.ok_or_else(|| FrontendError::Internal(format!("no result recorded for {}", platform))))
    .collect()
}

fn join_error_message(e: JoinError) -> String {
  if e.is_cancelled() {
    return "task was aborted".to_string();
  }
  match e.try_into_panic() {
    Ok(payload) => panic_message(payload.as_ref()),
    Err(e) => e.to_string(),
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    format!("panicked: {}", s)
  } else if let Some(s) = payload.downcast_ref::<String>() {
    format!("panicked: {}", s)
  } else {
    "panicked".to_string()
  }
}
