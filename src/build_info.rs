//! Build metadata baked in at compile time.
//!
//! `BUILD_COMMIT` and `BUILD_TIME` are read from the build environment when present,
//! e.g. `BUILD_COMMIT=$(git rev-parse --short HEAD) cargo build --release`.

use serde::Serialize;

const UNKNOWN: &str = "unknown";

/// Version, commit and build time of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
}

impl BuildInfo {
    /// Build info of the current binary.
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: match option_env!("BUILD_COMMIT") {
                Some(commit) => commit,
                None => UNKNOWN,
            },
            build_time: match option_env!("BUILD_TIME") {
                Some(time) => time,
                None => UNKNOWN,
            },
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}
