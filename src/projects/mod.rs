use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::version::{Version, VersionError, VersionPart};

pub mod msbuild_project;
pub mod project_json;

use msbuild_project::MsBuildProject;
use project_json::ProjectJson;

/// Trailing marker for floating versions, kept outside the version grammar.
pub const FLOATING_MARKER: &str = "-*";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Invalid version in field '{tag}'")]
    InvalidField {
        tag: String,
        #[source]
        source: VersionError,
    },
    #[error("Unsupported project file: {0}")]
    UnsupportedProject(String),
    #[error("No version field at index {0}")]
    UnknownField(usize),
}

/// A version-bearing slot located in a loaded project document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionField {
    pub tag: String,
    pub text: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub tag: String,
    pub old: String,
    pub new: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} updated from \"{}\" to \"{}\"", self.tag, self.old, self.new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub path: PathBuf,
    pub changes: Vec<FieldChange>,
}

impl UpdateReport {
    /// True when no version field was found and the file was left as it was
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Bumps raw field text, keeping a trailing floating marker in place.
pub fn bump_text(raw: &str, part: VersionPart, suffix: Option<&str>) -> Result<String, VersionError> {
    let (text, floating) = match raw.strip_suffix(FLOATING_MARKER) {
        Some(text) => (text, true),
        None => (raw, false),
    };

    let next = Version::parse(text)?.increment(part, suffix)?;
    if floating {
        Ok(format!("{next}{FLOATING_MARKER}"))
    } else {
        Ok(next.to_string())
    }
}

/// Computes the change for a single field without touching its document
pub fn bump_field(field: &VersionField, part: VersionPart, suffix: Option<&str>) -> Result<FieldChange> {
    let new = bump_text(&field.text, part, suffix).map_err(|source| ProjectError::InvalidField {
        tag: field.tag.clone(),
        source,
    })?;
    Ok(FieldChange {
        tag: field.tag.clone(),
        old: field.text.clone(),
        new,
    })
}

pub trait ProjectFormat: Sized {
    fn parse(contents: &str) -> Result<Self>;
    fn version_fields(&self) -> Vec<VersionField>;
    fn set_field(&mut self, field: &VersionField, value: &str) -> Result<()>;
    fn render(&self) -> Result<String>;
    fn filename_match_regex() -> Result<Regex>;

    fn matches(path: impl AsRef<Path>) -> Result<bool> {
        let regex = Self::filename_match_regex()?;
        Ok(regex.is_match(path.as_ref().to_string_lossy().as_ref()))
    }

    /// Bumps every located field. All new values are computed before any field
    /// is written, so one malformed field leaves the document untouched.
    fn apply_bump(&mut self, part: VersionPart, suffix: Option<&str>) -> Result<Vec<FieldChange>> {
        let fields = self.version_fields();
        let changes = fields
            .iter()
            .map(|field| bump_field(field, part, suffix))
            .collect::<Result<Vec<_>>>()?;

        for (field, change) in fields.iter().zip(&changes) {
            self.set_field(field, &change.new)?;
        }
        Ok(changes)
    }

    fn update_file(path: impl AsRef<Path>, part: VersionPart, suffix: Option<&str>) -> Result<UpdateReport> {
        let path = path.as_ref();
        debug!("Loading project from '{}'", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {:?}", path))?;
        let mut document = Self::parse(&contents)
            .with_context(|| format!("Failed to parse project file {:?}", path))?;

        let changes = document
            .apply_bump(part, suffix)
            .with_context(|| format!("Failed to bump version in {:?}", path))?;
        if changes.is_empty() {
            debug!("No version fields found in '{}'", path.display());
            return Ok(UpdateReport {
                path: path.to_path_buf(),
                changes,
            });
        }

        std::fs::write(path, document.render()?)
            .with_context(|| format!("Failed to write project file {:?}", path))?;
        debug!("Saved project '{}'", path.display());

        Ok(UpdateReport {
            path: path.to_path_buf(),
            changes,
        })
    }
}

pub fn is_project_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    Ok(MsBuildProject::matches(path)? || ProjectJson::matches(path)?)
}

/// Updates a single project file, picking the format from its file name.
pub fn update_project(path: impl AsRef<Path>, part: VersionPart, suffix: Option<&str>) -> Result<UpdateReport> {
    let path = path.as_ref();
    if MsBuildProject::matches(path)? {
        MsBuildProject::update_file(path, part, suffix)
    } else if ProjectJson::matches(path)? {
        ProjectJson::update_file(path, part, suffix)
    } else {
        Err(ProjectError::UnsupportedProject(path.display().to_string()).into())
    }
}
