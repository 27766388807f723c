use crate::app::models::EffectiveSettings;
use crate::app::pattern::{relative_to_root, ExcludeRule};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Selections larger than this need confirmation from the caller.
pub const LARGE_SELECTION_THRESHOLD: usize = 300;

/// Outcome of evaluating one filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    OutputFile,
    SessionPromptFile,
    OutsideRoot,
    Excluded { rule: String },
    NotAFile,
    NotIncluded,
    Selected,
}

pub struct Scanner<'a> {
    settings: &'a EffectiveSettings,
}

impl<'a> Scanner<'a> {
    pub fn new(settings: &'a EffectiveSettings) -> Self {
        Self { settings }
    }

    /// Walk the root and return selected files in traversal order.
    pub fn scan(&self) -> Vec<PathBuf> {
        let root = &self.settings.root;
        let mut selected = Vec::new();

        for result in self.walker() {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path == root.as_path() {
                        continue;
                    }
                    let decision = self.classify(path, path.is_file());
                    match &decision {
                        Decision::Selected => {
                            log::debug!("  ➕ Will include: {}", display_relative(path, root));
                            selected.push(path.to_path_buf());
                        }
                        Decision::Excluded { rule } => log::debug!(
                            "Excluding '{}' (rule '{}')",
                            display_relative(path, root),
                            rule
                        ),
                        Decision::OutputFile
                        | Decision::SessionPromptFile
                        | Decision::OutsideRoot => {
                            log::debug!("Excluding '{}' ({:?})", path.display(), decision)
                        }
                        Decision::NotAFile | Decision::NotIncluded => {}
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        selected
    }

    /// Directories matched by a `dir/` rule are pruned; all their descendants
    /// would be excluded by the same rule.
    fn walker(&self) -> ignore::Walk {
        let root = self.settings.root.clone();
        let prune_rules: Vec<ExcludeRule> = self
            .settings
            .exclude
            .iter()
            .filter(|r| r.is_directory_prefix())
            .cloned()
            .collect();

        WalkBuilder::new(&self.settings.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                !prune_rules.iter().any(|r| r.matches(entry.path(), &root))
            })
            .build()
    }

    /// Steps run in order; the first terminal outcome wins.
    pub fn classify(&self, path: &Path, is_file: bool) -> Decision {
        let settings = self.settings;

        if path == settings.output_path() {
            return Decision::OutputFile;
        }
        if settings.session_prompt_path() == Some(path) {
            return Decision::SessionPromptFile;
        }
        let Some(relative) = relative_to_root(path, &settings.root) else {
            return Decision::OutsideRoot;
        };
        if let Some(rule) = settings.exclude.iter().find(|r| r.matches_relative(&relative)) {
            return Decision::Excluded {
                rule: rule.as_str().to_string(),
            };
        }
        if !is_file {
            return Decision::NotAFile;
        }

        let name = relative.rsplit('/').next().unwrap_or(&relative);
        if settings.include.iter().any(|p| p.matches(name)) {
            Decision::Selected
        } else {
            Decision::NotIncluded
        }
    }
}

pub fn display_relative(path: &Path, root: &Path) -> String {
    relative_to_root(path, root).unwrap_or_else(|| path.display().to_string())
}
