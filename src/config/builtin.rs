//! The RO-prefix patch set shipped with the binary.

use crate::config::loader::{load, ConfigError, PatchSetOrigin};
use crate::config::schema::PatchConfig;

/// Raw TOML of the built-in patch set.
pub const RO_PREFIX_PATCHES: &str = include_str!("../../patches/ro-prefix.toml");

/// File the built-in patch set rewrites, relative to the project root.
pub const DEFAULT_TARGET: &str = "src/components/pos/ClientCard.tsx";

/// Parse and validate the built-in patch set.
pub fn ro_prefix_patches() -> Result<PatchConfig, ConfigError> {
    load(RO_PREFIX_PATCHES, PatchSetOrigin::Builtin)
}
