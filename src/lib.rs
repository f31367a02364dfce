use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod arguments;
pub mod projects;
pub mod solution;
pub mod version;

use projects::{UpdateReport, is_project_file, update_project};
use version::VersionPart;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("No project or solution file found in directory: {0}")]
    NoProjectFound(String),
    #[error("Multiple solution files found in directory, pass one explicitly: {0}")]
    AmbiguousSolution(String),
}

/// Expands `path` into the ordered list of project files to bump.
///
/// A solution file expands to its projects, any other file is taken as is. A
/// directory is searched (not recursively) for a single solution, falling back
/// to every project file it contains.
pub fn resolve_targets(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if path.is_dir() {
        return discover_targets(path);
    }
    if solution::is_solution_file(path)? {
        return solution::project_paths(path);
    }
    Ok(vec![path.to_path_buf()])
}

fn discover_targets(dir: &Path) -> Result<Vec<PathBuf>> {
    debug!("Searching '{}' for solutions and projects", dir.display());
    let mut solutions: Vec<PathBuf> = vec![];
    let mut projects: Vec<PathBuf> = vec![];

    for item in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let item = item?;
        if !item.file_type().is_file() {
            continue;
        }
        let path = item.path();
        if solution::is_solution_file(path)? {
            solutions.push(path.to_path_buf());
        } else if is_project_file(path)? {
            projects.push(path.to_path_buf());
        }
    }

    debug!("Found solutions: {:?}, projects: {:?}", solutions, projects);
    match solutions.as_slice() {
        [only] => solution::project_paths(only),
        [_, _, ..] => Err(TargetError::AmbiguousSolution(dir.display().to_string()).into()),
        [] if projects.is_empty() => Err(TargetError::NoProjectFound(dir.display().to_string()).into()),
        [] => Ok(projects),
    }
}

/// A failed multi-project bump, carrying the reports of the files already rewritten.
#[derive(Debug, Error)]
#[error("Failed to update {path:?} after {} project file(s) were processed", .completed.len())]
pub struct BumpError {
    pub completed: Vec<UpdateReport>,
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}

/// Bumps each project in order, stopping at the first failure.
pub fn bump_all(
    paths: &[PathBuf],
    part: VersionPart,
    suffix: Option<&str>,
) -> std::result::Result<Vec<UpdateReport>, BumpError> {
    let mut completed = Vec::with_capacity(paths.len());
    for path in paths {
        match update_project(path, part, suffix) {
            Ok(report) => completed.push(report),
            Err(source) => {
                return Err(BumpError {
                    completed,
                    path: path.clone(),
                    source,
                });
            }
        }
    }
    Ok(completed)
}
