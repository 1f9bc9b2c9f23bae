//! clocker-lib: a multi-platform image build frontend.
//!
//! Given build options from the daemon, the frontend:
//! - resolves the target platforms (`platform`)
//! - resolves the base image config per platform (`image`)
//! - builds a small graph around the build source (`convert`, `graph`)
//! - solves every platform concurrently with first-error cancellation
//!   (`coordinator`)
//! - aggregates refs, image configs and the platform manifest (`result`)
//!
//! All daemon interaction goes through the [`gateway::Gateway`] trait.

pub mod consts;
pub mod context;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod frontend;
pub mod gateway;
pub mod graph;
pub mod image;
pub mod options;
pub mod platform;
pub mod result;
pub mod source;
pub mod util;

pub use context::BuildContext;
pub use error::{ErrorKind, FrontendError};
pub use frontend::build;
pub use gateway::{BuildOpts, Gateway, GatewayError, LocalGateway};
pub use platform::Platform;
pub use result::BuildResult;
