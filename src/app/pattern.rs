use globset::{GlobBuilder, GlobMatcher};
use pathdiff::diff_paths;
use std::path::{Component, Path};

/// Separator every path and pattern is normalized to before comparison.
pub const SEPARATOR: char = '/';

pub fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

/// Path of `path` relative to `root`, using `/` separators.
///
/// Returns `None` when the path cannot be expressed beneath `root`.
pub fn relative_to_root(path: &Path, root: &Path) -> Option<String> {
    let relative = diff_paths(path, root)?;
    let escapes = relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return None;
    }
    Some(normalize_separators(&relative.to_string_lossy()))
}

/// Case-sensitive, shell-style glob where `*` may cross `/`.
/// Unparsable patterns yield `None` and never match.
fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    let built = GlobBuilder::new(pattern)
        .case_insensitive(false)
        .literal_separator(false)
        .backslash_escape(false)
        .build();
    match built {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(err) => {
            log::warn!("Ignoring unparsable pattern '{}': {}", pattern, err);
            None
        }
    }
}

fn glob_matches(matcher: &Option<GlobMatcher>, candidate: &str) -> bool {
    matcher.as_ref().is_some_and(|m| m.is_match(candidate))
}

/// `*.<ext>` with only alphanumerics or dots after the `*.` and no separator.
pub fn is_include_extension(line: &str) -> bool {
    if line.contains('/') || line.contains('\\') {
        return false;
    }
    match line.strip_prefix("*.") {
        Some(ext) => !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '.'),
        None => false,
    }
}

/// A suffix wildcard that selects files by base name.
#[derive(Debug, Clone)]
pub struct IncludePattern {
    source: String,
    matcher: Option<GlobMatcher>,
}

impl IncludePattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            matcher: compile_glob(pattern),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, file_name: &str) -> bool {
        glob_matches(&self.matcher, file_name)
    }
}

/// An exclude rule, classified once when the rule file is parsed.
#[derive(Debug, Clone)]
pub enum ExcludeRule {
    /// `dir/`: the directory itself or anything beneath it.
    DirectoryPrefix { source: String, dir: String },
    /// Pattern containing `/`: matched against the whole root-relative path.
    PathGlob {
        source: String,
        matcher: Option<GlobMatcher>,
    },
    /// Pattern without `/`: matched against the last path segment at any depth.
    BasenameGlob {
        source: String,
        matcher: Option<GlobMatcher>,
    },
}

impl ExcludeRule {
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = normalize_separators(trimmed);

        let rule = if normalized.ends_with(SEPARATOR) {
            ExcludeRule::DirectoryPrefix {
                source: trimmed.to_string(),
                dir: normalized.trim_end_matches(SEPARATOR).to_string(),
            }
        } else if normalized.contains(SEPARATOR) {
            ExcludeRule::PathGlob {
                source: trimmed.to_string(),
                matcher: compile_glob(&normalized),
            }
        } else {
            ExcludeRule::BasenameGlob {
                source: trimmed.to_string(),
                matcher: compile_glob(trimmed),
            }
        };
        Some(rule)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExcludeRule::DirectoryPrefix { source, .. }
            | ExcludeRule::PathGlob { source, .. }
            | ExcludeRule::BasenameGlob { source, .. } => source,
        }
    }

    pub fn is_directory_prefix(&self) -> bool {
        matches!(self, ExcludeRule::DirectoryPrefix { .. })
    }

    /// Match against an already computed root-relative path (`/` separated).
    pub fn matches_relative(&self, relative: &str) -> bool {
        match self {
            ExcludeRule::DirectoryPrefix { dir, .. } => {
                relative == dir
                    || relative
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with(SEPARATOR))
            }
            ExcludeRule::PathGlob { matcher, .. } => glob_matches(matcher, relative),
            ExcludeRule::BasenameGlob { matcher, .. } => {
                let name = relative.rsplit(SEPARATOR).next().unwrap_or(relative);
                glob_matches(matcher, name)
            }
        }
    }

    pub fn matches(&self, path: &Path, root: &Path) -> bool {
        match relative_to_root(path, root) {
            Some(relative) => self.matches_relative(&relative),
            None => false,
        }
    }
}
