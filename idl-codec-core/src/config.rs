//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Default bound on type nesting during encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables for [`TypeCoder`](crate::coder::TypeCoder).
///
/// Deserializable so a host application can embed it in its own
/// configuration file; missing keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderConfig {
    /// Maximum nesting of containers and defined types. Guards against
    /// self-referential definitions that consume no input.
    pub max_depth: usize,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
