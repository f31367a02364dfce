use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

const VERSION_PATTERN: &str = r"(?i)^(?P<major>[0-9]+)(?:\.(?P<minor>[0-9]+))?(?:\.(?P<build>[0-9]+))?(?:\.(?P<fix>[0-9]+))?(?:-(?P<suffix>[^+]*))?(?:\+(?P<metadata>.*))?$";

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Unparsable version string: {0}")]
    Unparsable(String),
    #[error("Unknown version part: {0}")]
    UnknownPart(String),
    #[error("Cannot increment a wildcard version")]
    Wildcard,
    #[error("Version component overflow while incrementing {0}")]
    Overflow(VersionPart),
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// The numeric component selected for a bump.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VersionPart {
    Major,
    Minor,
    Build,
    Fix,
}

impl FromStr for VersionPart {
    type Err = VersionError;

    /// Accepts the component names as well as the `patch`/`revision` aliases used on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(VersionPart::Major),
            "minor" => Ok(VersionPart::Minor),
            "build" | "patch" => Ok(VersionPart::Build),
            "fix" | "revision" => Ok(VersionPart::Fix),
            _ => Err(VersionError::UnknownPart(s.to_string())),
        }
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionPart::Major => "major",
            VersionPart::Minor => "minor",
            VersionPart::Build => "build",
            VersionPart::Fix => "fix",
        };
        f.write_str(name)
    }
}

/// A relaxed four component version: `major[.minor[.build[.fix]]][-suffix][+metadata]`.
///
/// Components are hierarchical, `fix` is only ever present together with `build`
/// and `minor`. Build metadata is carried along but takes no part in ordering or
/// equality. The wildcard (`*` or an empty string) has no numeric components and
/// sorts after every concrete version.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: Option<u64>,
    build: Option<u64>,
    fix: Option<u64>,
    suffix: Option<String>,
    build_metadata: Option<String>,
    wildcard: bool,
}

impl Version {
    pub fn new(major: u64) -> Self {
        Version {
            major,
            minor: None,
            build: None,
            fix: None,
            suffix: None,
            build_metadata: None,
            wildcard: false,
        }
    }

    pub fn wildcard() -> Self {
        Version {
            wildcard: true,
            ..Version::new(0)
        }
    }

    pub fn with_minor(mut self, minor: u64) -> Self {
        self.minor = Some(minor);
        self
    }

    /// Sets the build component, promoting a missing minor to 0
    pub fn with_build(mut self, build: u64) -> Self {
        self.minor = Some(self.minor.unwrap_or(0));
        self.build = Some(build);
        self
    }

    /// Sets the fix component, promoting missing minor and build to 0
    pub fn with_fix(mut self, fix: u64) -> Self {
        self.minor = Some(self.minor.unwrap_or(0));
        self.build = Some(self.build.unwrap_or(0));
        self.fix = Some(fix);
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = non_empty(suffix.into());
        self
    }

    pub fn with_build_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.build_metadata = non_empty(metadata.into());
        self
    }

    pub fn parse(text: &str) -> Result<Self, VersionError> {
        if text.is_empty() || text == "*" {
            return Ok(Version::wildcard());
        }

        let regex = Regex::new(VERSION_PATTERN)?;
        let unparsable = || VersionError::Unparsable(text.to_string());
        let captures = regex.captures(text).ok_or_else(unparsable)?;

        let number = |name: &str| -> Result<Option<u64>, VersionError> {
            captures
                .name(name)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| unparsable()))
                .transpose()
        };
        let text_group = |name: &str| {
            captures
                .name(name)
                .and_then(|m| non_empty(m.as_str().to_string()))
        };

        Ok(Version {
            major: number("major")?.ok_or_else(unparsable)?,
            minor: number("minor")?,
            build: number("build")?,
            fix: number("fix")?,
            suffix: text_group("suffix"),
            build_metadata: text_group("metadata"),
            wildcard: false,
        })
    }

    /// Returns a new version with `part` raised by one.
    ///
    /// Only the selected component changes, lower components are not reset. An
    /// absent component counts as 0 and becomes present along with any absent
    /// ancestors, so `1.9` bumped at [`VersionPart::Build`] gives `1.9.1`.
    ///
    /// `suffix` replaces the pre-release label when given (an empty string clears
    /// it), otherwise the current label is kept. Build metadata is always kept.
    pub fn increment(&self, part: VersionPart, suffix: Option<&str>) -> Result<Self, VersionError> {
        if self.wildcard {
            return Err(VersionError::Wildcard);
        }

        let bump = |value: Option<u64>| {
            value
                .unwrap_or(0)
                .checked_add(1)
                .ok_or(VersionError::Overflow(part))
        };

        let mut next = self.clone();
        match part {
            VersionPart::Major => next.major = bump(Some(self.major))?,
            VersionPart::Minor => next.minor = Some(bump(self.minor)?),
            VersionPart::Build => {
                next.minor = Some(self.minor.unwrap_or(0));
                next.build = Some(bump(self.build)?);
            }
            VersionPart::Fix => {
                next.minor = Some(self.minor.unwrap_or(0));
                next.build = Some(self.build.unwrap_or(0));
                next.fix = Some(bump(self.fix)?);
            }
        }

        if let Some(suffix) = suffix {
            next.suffix = non_empty(suffix.to_string());
        }

        Ok(next)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    pub fn build(&self) -> Option<u64> {
        self.build
    }

    pub fn fix(&self) -> Option<u64> {
        self.fix
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn build_metadata(&self) -> Option<&str> {
        self.build_metadata.as_deref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return f.write_str("*");
        }

        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
            if let Some(build) = self.build {
                write!(f, ".{build}")?;
                if let Some(fix) = self.fix {
                    write!(f, ".{fix}")?;
                }
            }
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "-{suffix}")?;
        }
        if let Some(metadata) = &self.build_metadata {
            write!(f, "+{metadata}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.wildcard, other.wildcard) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        // Option orders None below Some, so a missing component sorts first.
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.build.cmp(&other.build))
            .then(self.fix.cmp(&other.fix))
            .then_with(|| compare_suffix(self.suffix.as_deref(), other.suffix.as_deref()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.wildcard.hash(state);
        if self.wildcard {
            return;
        }
        self.major.hash(state);
        self.minor.hash(state);
        self.build.hash(state);
        self.fix.hash(state);
        self.suffix.is_some().hash(state);
        // Segments are hashed the way they compare, so `rc.01` and `rc.1` collide.
        for segment in self.suffix.iter().flat_map(|suffix| suffix.split('.')) {
            match numeric_segment(segment) {
                Some(digits) => (0u8, digits).hash(state),
                None => (1u8, segment).hash(state),
            }
        }
    }
}

/// A release sorts after any of its pre-releases; labels compare dot segment by segment.
fn compare_suffix(left: Option<&str>, right: Option<&str>) -> Ordering {
    let (left, right) = match (left, right) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(left), Some(right)) => (left, right),
    };

    let mut left = left.split('.');
    let mut right = right.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = compare_segment(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_segment(left: &str, right: &str) -> Ordering {
    match (numeric_segment(left), numeric_segment(right)) {
        (Some(l), Some(r)) => l.len().cmp(&r.len()).then_with(|| l.cmp(r)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.cmp(right),
    }
}

/// The digits of a numeric segment without leading zeros, of any length.
fn numeric_segment(segment: &str) -> Option<&str> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.trim_start_matches('0'))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
