pub mod applicator;
pub mod builtin;
pub mod loader;
pub mod schema;

pub use applicator::{
    apply_patches, plan_patches, ApplicationError, ApplyOptions, PatchPlan, PatchReport,
    StepResult,
};
pub use builtin::{ro_prefix_patches, DEFAULT_TARGET, RO_PREFIX_PATCHES};
pub use loader::{load, load_from_path, load_from_str, ConfigError, PatchSetOrigin};
pub use schema::{
    Metadata, Operation, PatchConfig, PatchDefinition, Query, ValidationError, ValidationIssue,
};
