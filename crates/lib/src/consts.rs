//! Option keys, defaults and exporter metadata keys shared with the daemon.

/// Local context name the daemon exposes the build definition under.
pub const LOCAL_NAME_DOCKERFILE: &str = "dockerfile";

/// Build definition filename used when the `filename` option is unset.
pub const DEFAULT_BUILD_FILENAME: &str = "clockerfile";

pub const KEY_FILENAME: &str = "filename";
pub const KEY_TARGET_PLATFORM: &str = "platform";
pub const KEY_CACHE_FROM: &str = "cache-from";
pub const KEY_CACHE_IMPORTS: &str = "cache-imports";

/// Prefix namespacing build arguments in the options map.
pub const BUILD_ARG_PREFIX: &str = "build-arg:";

/// Build argument selecting the base image.
pub const BUILD_ARG_BASE: &str = "base";
pub const DEFAULT_BASE_IMAGE: &str = "ubuntu";

/// Base name denoting an empty filesystem.
pub const SCRATCH: &str = "scratch";

/// Directive prefix stripped from the first line of the build source.
pub const SYNTAX_DIRECTIVE_PREFIX: &[u8] = b"#syntax=";

/// Metadata key prefix for per-platform image configs (`<prefix>/<platform>`).
pub const EXPORTER_IMAGE_CONFIG_KEY: &str = "containerimage.config";

/// Metadata key holding the serialized platform manifest.
pub const EXPORTER_PLATFORMS_KEY: &str = "refs.platforms";

/// Default `PATH` for images built from an empty filesystem.
pub const DEFAULT_PATH_ENV_UNIX: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Where the build source lands inside the image.
pub const SOURCE_DIR: &str = "/source";
pub const SOURCE_DATA_PATH: &str = "/source/data";

/// Shell invocation executed after the source is written.
pub const BUILD_COMMAND: &[&str] = &["sh", "-c", "date > /source/date"];

/// Environment variables the daemon uses to hand options to a frontend.
pub const ENV_FRONTEND_OPT_PREFIX: &str = "BUILDKIT_FRONTEND_OPT_";
pub const ENV_SESSION_ID: &str = "BUILDKIT_SESSION_ID";
