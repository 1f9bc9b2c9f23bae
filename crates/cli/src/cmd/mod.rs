mod build;
mod platforms;

pub use build::{BuildArgs, cmd_build};
pub use platforms::cmd_platforms;
