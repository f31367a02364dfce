use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::projects::is_project_file;

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

#[derive(Debug, Error)]
pub enum SolutionError {
    #[error("Not a solution file: {0}")]
    Malformed(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolutionEntryKind {
    /// A buildable project file handled by the updater
    Project,
    /// A virtual folder grouping other entries, never descended into
    SolutionFolder,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: SolutionEntryKind,
}

fn project_line_regex() -> Result<Regex> {
    Ok(Regex::new(
        r#"(?m)^\s*Project\("\{(?P<kind>[0-9A-Fa-f-]+)\}"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{[^}]*\}""#,
    )?)
}

fn solution_match_regex() -> Result<Regex> {
    Ok(Regex::new(r"(?i)\.sln$")?)
}

pub fn is_solution_file(path: impl AsRef<Path>) -> Result<bool> {
    Ok(solution_match_regex()?.is_match(path.as_ref().to_string_lossy().as_ref()))
}

/// Joins a solution-relative path (backslash separated) onto `base`.
fn resolve_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

/// Parses solution contents into entries in file order, resolving paths against `base`.
pub fn parse_solution(contents: &str, base: impl AsRef<Path>) -> Result<Vec<SolutionEntry>> {
    let base = base.as_ref();
    if !contents.contains(SOLUTION_HEADER) {
        return Err(SolutionError::Malformed(base.display().to_string()).into());
    }

    let mut entries = vec![];
    for captures in project_line_regex()?.captures_iter(contents) {
        let (Some(kind), Some(name), Some(relative)) =
            (captures.name("kind"), captures.name("name"), captures.name("path"))
        else {
            continue;
        };
        let relative = relative.as_str();

        let (kind, path) = if kind.as_str().eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE) {
            (SolutionEntryKind::SolutionFolder, PathBuf::from(relative))
        } else if relative.to_ascii_lowercase().ends_with(".xproj") {
            // DNX projects keep their version in the sibling project.json
            let path = resolve_relative(base, relative);
            let project_json = path.with_file_name("project.json");
            (SolutionEntryKind::Project, project_json)
        } else if is_project_file(relative)? {
            (SolutionEntryKind::Project, resolve_relative(base, relative))
        } else {
            (SolutionEntryKind::Other, resolve_relative(base, relative))
        };

        entries.push(SolutionEntry {
            name: name.as_str().to_string(),
            path,
            kind,
        });
    }

    debug!("Found {} solution entries", entries.len());
    Ok(entries)
}

pub fn read_solution(path: impl AsRef<Path>) -> Result<Vec<SolutionEntry>> {
    let path = path.as_ref();
    debug!("Loading solution from '{}'", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read solution file {:?}", path))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_solution(&contents, base).with_context(|| format!("Failed to parse solution file {:?}", path))
}

/// Expands a solution into the buildable project paths it lists, in solution order.
///
/// Solution folders and entries of unknown type are skipped with a warning.
pub fn project_paths(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in read_solution(path)? {
        match entry.kind {
            SolutionEntryKind::Project => paths.push(entry.path),
            SolutionEntryKind::SolutionFolder => {
                warn!("Skipping solution folder '{}'", entry.name);
            }
            SolutionEntryKind::Other => {
                warn!("Skipping unsupported solution entry '{}' ({})", entry.name, entry.path.display());
            }
        }
    }
    Ok(paths)
}
