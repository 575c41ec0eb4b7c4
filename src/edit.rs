use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: literal search-and-substitute on in-memory text.
///
/// All patch operations (replace, insert before, insert after) compile down to
/// this single primitive. The search text is matched byte for byte; there is no
/// whitespace normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until apply() is called"]
pub struct TextEdit {
    /// Exact text to look for
    pub search: String,
    /// Text that takes the place of every occurrence of `search`
    pub replacement: String,
}

/// Outcome of running a [`TextEdit`] against some content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditOutcome should be checked for applied/already-applied/not-found"]
pub enum EditOutcome {
    /// Search text was found and substituted
    Applied {
        content: String,
        occurrences: usize,
    },
    /// Search text is absent but the replacement is already there
    AlreadyApplied,
    /// Neither the search text nor the replacement is present
    NotFound,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not valid UTF-8: {path}")]
    NotUtf8 { path: PathBuf },

    #[error("File changed on disk while patching: {path}")]
    ConcurrentModification { path: PathBuf },

    #[error("Path has no parent directory: {0}")]
    NoParent(PathBuf),
}

impl TextEdit {
    pub fn new(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replacement: replacement.into(),
        }
    }

    /// Insert `text` right after every occurrence of `anchor`.
    pub fn insert_after(anchor: &str, text: &str) -> Self {
        Self::new(anchor, format!("{anchor}{text}"))
    }

    /// Insert `text` right before every occurrence of `anchor`.
    pub fn insert_before(anchor: &str, text: &str) -> Self {
        Self::new(anchor, format!("{text}{anchor}"))
    }

    /// Apply the substitution to `content`.
    ///
    /// When the replacement itself contains the search text (insertions), the
    /// replacement is checked first so a second run does not insert twice.
    pub fn apply(&self, content: &str) -> EditOutcome {
        if self.search.is_empty() {
            return EditOutcome::NotFound;
        }

        let reapplies = self.replacement.contains(&self.search);
        if reapplies && content.contains(&self.replacement) {
            return EditOutcome::AlreadyApplied;
        }

        let occurrences = content.matches(&self.search).count();
        if occurrences > 0 {
            return EditOutcome::Applied {
                content: content.replace(&self.search, &self.replacement),
                occurrences,
            };
        }

        if !self.replacement.is_empty() && content.contains(&self.replacement) {
            EditOutcome::AlreadyApplied
        } else {
            EditOutcome::NotFound
        }
    }
}

/// xxh3 fingerprint of file content, used to detect writes by someone else
/// between our read and our rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(content: &[u8]) -> Self {
        Fingerprint(xxh3_64(content))
    }
}

/// Read a UTF-8 text file along with the fingerprint of its bytes.
pub fn read_text(path: &Path) -> Result<(String, Fingerprint), EditError> {
    let bytes = fs::read(path)?;
    let fingerprint = Fingerprint::of(&bytes);
    let text = String::from_utf8(bytes).map_err(|_| EditError::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok((text, fingerprint))
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The file at `path` must still hash to `expected` right before the rename,
/// otherwise nothing is replaced. Permissions of the original are kept.
pub fn atomic_write(path: &Path, content: &[u8], expected: Fingerprint) -> Result<(), EditError> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(EditError::NoParent(path.to_path_buf())),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    let permissions = fs::metadata(path)?.permissions();
    temp.as_file().set_permissions(permissions)?;

    if Fingerprint::of(&fs::read(path)?) != expected {
        return Err(EditError::ConcurrentModification {
            path: path.to_path_buf(),
        });
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
