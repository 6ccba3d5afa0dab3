//! Include / exclude glob filtering.
//!
//! Globs are matched against individual path components *and* against the
//! whole forward-slash relative path, so both `"*.cpp"` and `"src/gen/*"`
//! work. An exclude that matches any component prunes everything below it
//! (`".git"` hides the whole repository metadata tree). Includes only apply
//! to files: an empty include list admits everything.

use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::FilterError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, FilterError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// A filter that admits every path.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether a file at `relative` (relative to the source root) is synced.
    pub fn matches(&self, relative: &Path) -> bool {
        if self.is_excluded(relative) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let joined = slash_joined(relative);
        self.include
            .iter()
            .any(|p| p.matches_with(&name, MATCH_OPTIONS) || p.matches_with(&joined, MATCH_OPTIONS))
    }

    /// Whether `relative` or any of its ancestors is excluded. Used to prune
    /// directories during the walk.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let joined = slash_joined(relative);
        if self
            .exclude
            .iter()
            .any(|p| p.matches_with(&joined, MATCH_OPTIONS))
        {
            return true;
        }
        relative.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.exclude
                .iter()
                .any(|p| p.matches_with(&name, MATCH_OPTIONS))
        })
    }
}

fn compile<S: AsRef<str>>(globs: &[S]) -> Result<Vec<Pattern>, FilterError> {
    globs
        .iter()
        .map(|g| {
            Pattern::new(g.as_ref()).map_err(|source| FilterError {
                pattern: g.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

fn slash_joined(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_admits_everything() {
        let filter = PathFilter::allow_all();
        assert!(filter.matches(Path::new("a/b/c.txt")));
        assert!(!filter.is_excluded(Path::new(".git/config")));
    }

    #[test]
    fn include_matches_file_name_at_any_depth() {
        let filter = PathFilter::new(&["*.cpp"], &[]).expect("filter");
        assert!(filter.matches(Path::new("main.cpp")));
        assert!(filter.matches(Path::new("src/deep/util.cpp")));
        assert!(!filter.matches(Path::new("src/util.h")));
    }

    #[test]
    fn exclude_prunes_directory_components() {
        let filter = PathFilter::new(&[] as &[&str], &[".git", "moc_*"]).expect("filter");
        assert!(!filter.matches(Path::new(".git/HEAD")));
        assert!(!filter.matches(Path::new("build/moc_window.cpp")));
        assert!(filter.matches(Path::new("src/window.cpp")));
        assert!(filter.is_excluded(Path::new(".git")));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = PathFilter::new(&["*.cpp"], &["moc_*"]).expect("filter");
        assert!(!filter.matches(Path::new("moc_main.cpp")));
    }

    #[test]
    fn whole_path_globs_are_supported() {
        let filter = PathFilter::new(&[] as &[&str], &["gen/*.rs"]).expect("filter");
        assert!(!filter.matches(Path::new("gen/out.rs")));
        assert!(filter.matches(Path::new("src/out.rs")));
    }

    #[test]
    fn invalid_glob_reports_pattern() {
        let err = PathFilter::new(&["[unclosed"], &[]).unwrap_err();
        assert_eq!(err.pattern, "[unclosed");
        assert!(err.to_string().contains("[unclosed"));
    }
}
