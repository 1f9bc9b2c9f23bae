//! Reading the build definition from the client.

use tracing::debug;

use crate::consts::{LOCAL_NAME_DOCKERFILE, SYNTAX_DIRECTIVE_PREFIX};
use crate::context::BuildContext;
use crate::error::FrontendError;
use crate::gateway::{Gateway, SourceRequest};

/// Fetch `filename` from the client's build-definition context and return its
/// payload with any leading syntax directive removed.
///
/// The read is scoped to the client session from the build options, if any.
pub async fn read_build_source<G: Gateway>(
  ctx: &BuildContext,
  gateway: &G,
  filename: &str,
) -> Result<Vec<u8>, FrontendError> {
  let request =
    SourceRequest::new(LOCAL_NAME_DOCKERFILE, filename).with_session_id(gateway.build_opts().session_id.as_deref());
  let raw = ctx
    .run(gateway.read_source(request))
    .await
    .map_err(|e| {
      FrontendError::from_gateway(e, |source| FrontendError::SourceRead {
        filename: filename.to_string(),
        source,
      })
    })?;

  let payload = strip_directive(&raw);
  debug!(filename, raw = raw.len(), payload = payload.len(), "read build source");
  Ok(payload.to_vec())
}

/// Drop a first line starting with `#syntax=`, then trim surrounding ASCII
/// whitespace.
pub fn strip_directive(raw: &[u8]) -> &[u8] {
  let body = if raw.starts_with(SYNTAX_DIRECTIVE_PREFIX) {
    match raw.iter().position(|&b| b == b'\n') {
      Some(newline) => &raw[newline + 1..],
      None => &[],
    }
  } else {
    raw
  };
  body.trim_ascii()
}
