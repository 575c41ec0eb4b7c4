use crate::edit::TextEdit;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Clone)]
pub struct PatchConfig {
    pub meta: Metadata,
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
}

impl PatchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.meta.target.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                patch_id: None,
                field: "meta.target",
            });
        }

        if self.patches.is_empty() {
            issues.push(ValidationIssue::EmptyPatchList);
        } else if !self.patches.iter().any(|p| p.required) {
            issues.push(ValidationIssue::NoRequiredPatch);
        }

        let mut seen = HashSet::new();
        for patch in &self.patches {
            if patch.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    patch_id: None,
                    field: "id",
                });
            } else if !seen.insert(patch.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId(patch.id.clone()));
            }

            match &patch.query {
                Query::Text { search } => {
                    if search.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            patch_id: Some(patch.id.clone()),
                            field: "query.search",
                        });
                    }
                }
            }

            match &patch.operation {
                Operation::InsertAfter { text } | Operation::InsertBefore { text } => {
                    if text.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            patch_id: Some(patch.id.clone()),
                            field: "operation.text",
                        });
                    }
                }
                // An empty replacement deletes the match
                Operation::Replace { text } => {
                    if *text == patch.query.search() {
                        issues.push(ValidationIssue::InvalidCombo {
                            patch_id: Some(patch.id.clone()),
                            message: "replacement text is identical to the search text"
                                .to_string(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File to patch, relative to the project root
    pub target: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PatchDefinition {
    pub id: String,
    /// Human name used in diagnostics ("CUI block"); falls back to `id`
    #[serde(default)]
    pub label: Option<String>,
    /// A required patch that does not match aborts the whole run
    #[serde(default)]
    pub required: bool,
    pub query: Query,
    pub operation: Operation,
}

impl PatchDefinition {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Lower the definition to the edit primitive.
    pub fn to_edit(&self) -> TextEdit {
        let search = self.query.search();
        match &self.operation {
            Operation::Replace { text } => TextEdit::new(search, text.as_str()),
            Operation::InsertAfter { text } => TextEdit::insert_after(search, text),
            Operation::InsertBefore { text } => TextEdit::insert_before(search, text),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Query {
    /// Simple text search - finds exact string match
    Text {
        /// The exact text to search for
        search: String,
    },
}

impl Query {
    pub fn search(&self) -> &str {
        match self {
            Query::Text { search } => search,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    Replace { text: String },
    InsertAfter { text: String },
    InsertBefore { text: String },
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyPatchList,
    NoRequiredPatch,
    DuplicateId(String),
    MissingField {
        patch_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        patch_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPatchList => write!(f, "patch set contains no patches"),
            ValidationIssue::NoRequiredPatch => {
                write!(f, "patch set needs at least one patch with required = true")
            }
            ValidationIssue::DuplicateId(id) => write!(f, "duplicate patch id '{id}'"),
            ValidationIssue::MissingField { patch_id, field } => match patch_id {
                Some(id) => write!(f, "patch '{id}' missing required field '{field}'"),
                None => write!(f, "patch missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { patch_id, message } => match patch_id {
                Some(id) => write!(f, "patch '{id}' is invalid: {message}"),
                None => write!(f, "invalid patch set: {message}"),
            },
        }
    }
}
