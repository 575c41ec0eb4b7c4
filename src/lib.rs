//! RO prefix patcher: literal text patching for the POS client card
//!
//! Rewrites `src/components/pos/ClientCard.tsx` so the CUI field gets an "RO"
//! checkbox toggle and strips an "RO" prefix typed into the numeric input.
//!
//! # Architecture
//!
//! A patch set ([`PatchConfig`]) is an ordered list of literal substitutions,
//! loaded from TOML. Every step compiles down to a single primitive,
//! [`TextEdit`], applied to the file content in memory. Best-effort steps
//! that find nothing are skipped; a required step that finds nothing aborts
//! the run before anything is written.
//!
//! # Safety
//!
//! - Nothing is written unless every required step matched
//! - Atomic file writes (tempfile + fsync + rename)
//! - Writes are refused if the file changed since it was read
//! - Workspace boundary enforcement
//!
//! # Example
//!
//! ```no_run
//! use ro_prefix_patcher::{apply_patches, ro_prefix_patches, ApplyOptions};
//! use std::path::Path;
//!
//! let config = ro_prefix_patches().expect("built-in patch set is valid");
//! match apply_patches(&config, Path::new("."), ApplyOptions::default()) {
//!     Ok(report) => println!("Patched {}", report.file.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod config;
pub mod edit;
pub mod near_miss;
pub mod safety;

// Re-exports
pub use config::{
    apply_patches, load_from_path, load_from_str, plan_patches, ro_prefix_patches,
    ApplicationError, ApplyOptions, ConfigError, PatchConfig, PatchPlan, PatchReport,
    PatchSetOrigin, StepResult, DEFAULT_TARGET,
};
pub use edit::{EditError, EditOutcome, Fingerprint, TextEdit};
pub use near_miss::{find_near_miss, NearMiss};
pub use safety::{SafetyError, WorkspaceGuard};
