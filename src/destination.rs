//! Destination directory normalization.

use std::{
    convert::Infallible,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Normalizes a caller supplied destination into an absolute, slash-delimited path.
///
/// Backslashes count as separators, empty and `.` segments are dropped and `..`
/// removes the previous segment (it never climbs above the root). The result
/// always starts with `/` and never ends with `/` unless it is exactly `/`.
///
/// ```
/// use uploadgear::normalize_destination;
///
/// assert_eq!(normalize_destination("uploads/"), "/uploads");
/// assert_eq!(normalize_destination("a/./b/../c"), "/a/c");
/// assert_eq!(normalize_destination(""), "/");
/// ```
pub fn normalize_destination(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(raw.len() + 1);
    out.push('/');
    out.push_str(&segments.join("/"));
    out
}

/// Normalized destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination(String);

impl Destination {
    /// Normalizes `raw` into a destination.
    pub fn new(raw: &str) -> Self {
        Self(normalize_destination(raw))
    }

    /// The root destination `/`.
    pub fn root() -> Self {
        Self("/".to_owned())
    }

    /// Returns the normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the destination is `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Joins this destination under `base`.
    pub fn resolve(&self, base: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(base.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Destination {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Destination {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Formats a filesystem path the way it is recorded on stored files.
///
/// Backslashes become `/` and a leading `/` is enforced.
pub fn record_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        text
    } else {
        format!("/{text}")
    }
}
