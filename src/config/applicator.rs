//! Patch applicator - runs a patch set against its target file
//!
//! This module provides high-level patch application that:
//! - Reads the target once and runs every step in order, in memory
//! - Tells "already applied" apart from "not found" for each step
//! - Aborts without writing when a required step cannot be applied
//! - Writes the result back atomically, and only if the file did not change meanwhile

use crate::config::schema::PatchConfig;
use crate::edit::{atomic_write, read_text, EditError, EditOutcome};
use crate::near_miss::{find_near_miss, NearMiss};
use crate::safety::{SafetyError, WorkspaceGuard};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of a single step of the patch set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Search text was found and substituted
    Applied { occurrences: usize },
    /// Search text is gone and the step's replacement is already in place
    AlreadyApplied,
    /// Best-effort step whose search text is absent
    Skipped { reason: String },
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Applied { occurrences: 1 } => write!(f, "applied"),
            StepResult::Applied { occurrences } => {
                write!(f, "applied ({} occurrences)", occurrences)
            }
            StepResult::AlreadyApplied => write!(f, "already applied"),
            StepResult::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// Errors that abort a run. None of them leave a partially written target.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: EditError },

    #[error("{label} not found; aborting")]
    MissingRequired {
        id: String,
        label: String,
        near_miss: Option<NearMiss>,
    },

    #[error("{label} already patched; aborting")]
    AlreadyApplied { id: String, label: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: EditError },

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

/// In-memory outcome of running a patch set over some content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    pub original: String,
    pub patched: String,
    /// One entry per patch, in declaration order
    pub steps: Vec<(String, StepResult)>,
}

impl PatchPlan {
    pub fn changed(&self) -> bool {
        self.original != self.patched
    }

    /// Signed difference in bytes between the patched and original content.
    pub fn byte_delta(&self) -> isize {
        self.patched.len() as isize - self.original.len() as isize
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Run every step but leave the file alone
    pub dry_run: bool,
}

/// What happened to the target file.
#[derive(Debug, Clone)]
#[must_use = "PatchReport should be checked for what was written"]
pub struct PatchReport {
    /// Canonical path of the target
    pub file: PathBuf,
    pub plan: PatchPlan,
    pub written: bool,
}

/// Run every step of `config` over `content` without touching the filesystem.
///
/// Steps see the output of the steps before them. A required step that is
/// neither applicable nor already applied fails the whole plan.
pub fn plan_patches(config: &PatchConfig, content: &str) -> Result<PatchPlan, ApplicationError> {
    let mut patched = content.to_string();
    let mut steps = Vec::with_capacity(config.patches.len());

    for patch in &config.patches {
        let result = match patch.to_edit().apply(&patched) {
            EditOutcome::Applied {
                content,
                occurrences,
            } => {
                patched = content;
                StepResult::Applied { occurrences }
            }
            EditOutcome::AlreadyApplied if patch.required => {
                return Err(ApplicationError::AlreadyApplied {
                    id: patch.id.clone(),
                    label: patch.label().to_string(),
                });
            }
            EditOutcome::AlreadyApplied => StepResult::AlreadyApplied,
            EditOutcome::NotFound if patch.required => {
                return Err(ApplicationError::MissingRequired {
                    id: patch.id.clone(),
                    label: patch.label().to_string(),
                    near_miss: find_near_miss(&patched, patch.query.search()),
                });
            }
            EditOutcome::NotFound => StepResult::Skipped {
                reason: "search text not found".to_string(),
            },
        };
        steps.push((patch.id.clone(), result));
    }

    Ok(PatchPlan {
        original: content.to_string(),
        patched,
        steps,
    })
}

/// Apply a patch set to its target under `workspace_root`.
///
/// The target is read once, every step runs in memory, and the result is
/// written back in one atomic replace. Nothing is written when a required step
/// fails or when `options.dry_run` is set.
pub fn apply_patches(
    config: &PatchConfig,
    workspace_root: &Path,
    options: ApplyOptions,
) -> Result<PatchReport, ApplicationError> {
    let path = workspace_root.join(&config.meta.target);
    let (original, fingerprint) = read_text(&path).map_err(|source| ApplicationError::Read {
        path: path.clone(),
        source,
    })?;

    let guard = WorkspaceGuard::new(workspace_root)?;
    let file = guard.validate_path(&path)?;

    let plan = plan_patches(config, &original)?;

    let written = if options.dry_run || !plan.changed() {
        false
    } else {
        atomic_write(&file, plan.patched.as_bytes(), fingerprint).map_err(|source| {
            ApplicationError::Write {
                path: file.clone(),
                source,
            }
        })?;
        true
    };

    Ok(PatchReport {
        file,
        plan,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use std::fs;

    const CONFIG: &str = r#"
[meta]
name = "test"
target = "app.tsx"

[[patches]]
id = "rename-state"

[patches.query]
type = "text"
search = "const [a, setA]"

[patches.operation]
type = "replace"
text = "const [b, setB]"

[[patches]]
id = "wrap-input"
label = "input block"
required = true

[patches.query]
type = "text"
search = "<input />"

[patches.operation]
type = "replace"
text = "<div><input /></div>"
"#;

    fn config() -> PatchConfig {
        load_from_str(CONFIG).unwrap()
    }

    #[test]
    fn test_plan_applies_in_order() {
        let plan = plan_patches(&config(), "const [a, setA]\n<input />\n").unwrap();
        assert_eq!(plan.patched, "const [b, setB]\n<div><input /></div>\n");
        assert_eq!(
            plan.steps,
            vec![
                (
                    "rename-state".to_string(),
                    StepResult::Applied { occurrences: 1 }
                ),
                (
                    "wrap-input".to_string(),
                    StepResult::Applied { occurrences: 1 }
                ),
            ]
        );
        assert!(plan.changed());
        assert_eq!(plan.byte_delta(), 11);
    }

    #[test]
    fn test_best_effort_miss_is_skipped() {
        let plan = plan_patches(&config(), "<input />").unwrap();
        assert!(matches!(plan.steps[0].1, StepResult::Skipped { .. }));
        assert_eq!(plan.patched, "<div><input /></div>");
    }

    #[test]
    fn test_required_miss_aborts_with_label() {
        let err = plan_patches(&config(), "const [a, setA]\n<select />\n").unwrap_err();
        assert!(matches!(err, ApplicationError::MissingRequired { .. }));
        assert_eq!(err.to_string(), "input block not found; aborting");
    }

    #[test]
    fn test_required_already_applied_aborts_distinctly() {
        let err = plan_patches(&config(), "<div><input /></div>").unwrap_err();
        assert!(matches!(err, ApplicationError::AlreadyApplied { .. }));
        assert_eq!(err.to_string(), "input block already patched; aborting");
    }

    #[test]
    fn test_apply_writes_target() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.tsx"), "<input />\n").unwrap();

        let report = apply_patches(&config(), dir.path(), ApplyOptions::default()).unwrap();
        assert!(report.written);
        assert_eq!(
            fs::read_to_string(dir.path().join("app.tsx")).unwrap(),
            "<div><input /></div>\n"
        );
    }

    #[test]
    fn test_dry_run_leaves_target() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.tsx"), "<input />\n").unwrap();

        let report =
            apply_patches(&config(), dir.path(), ApplyOptions { dry_run: true }).unwrap();
        assert!(!report.written);
        assert!(report.plan.changed());
        assert_eq!(
            fs::read_to_string(dir.path().join("app.tsx")).unwrap(),
            "<input />\n"
        );
    }

    #[test]
    fn test_missing_target_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = apply_patches(&config(), dir.path(), ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, ApplicationError::Read { .. }));
    }

    #[test]
    fn test_step_result_display() {
        assert_eq!(StepResult::Applied { occurrences: 1 }.to_string(), "applied");
        assert_eq!(
            StepResult::Applied { occurrences: 2 }.to_string(),
            "applied (2 occurrences)"
        );
        assert_eq!(StepResult::AlreadyApplied.to_string(), "already applied");
    }
}
