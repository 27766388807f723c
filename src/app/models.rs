use crate::app::pattern::{ExcludeRule, IncludePattern};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an effective setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cli,
    RuleFile,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::Cli => "cli",
            Source::RuleFile => "config_file",
            Source::Default => "default",
        };
        f.write_str(label)
    }
}

/// A setting value together with the source that won precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

/// Overrides supplied on the command line. `None` means the user did not pass the flag.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub no_header: Option<bool>,
    pub session_prompt: Option<PathBuf>,
    pub no_session_prompt: bool,
}

/// Values used when neither the command line nor the rule file sets a field.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub output_file: PathBuf,
    pub no_header: bool,
    pub session_prompt_file: Option<PathBuf>,
}

pub const DEFAULT_OUTPUT_FILE: &str = "combined_code.txt";

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            no_header: false,
            session_prompt_file: None,
        }
    }
}

/// The final configuration for one run, after merging CLI, rule file and defaults.
#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub root: PathBuf,
    pub output_path: Resolved<PathBuf>,
    pub no_header: Resolved<bool>,
    pub session_prompt: Option<Resolved<PathBuf>>,
    pub session_prompt_enabled: bool,
    pub include: Vec<IncludePattern>,
    pub exclude: Vec<ExcludeRule>,
}

impl EffectiveSettings {
    pub fn output_path(&self) -> &Path {
        &self.output_path.value
    }

    pub fn emit_headers(&self) -> bool {
        !self.no_header.value
    }

    /// Resolved prompt path, whether or not prepending is enabled.
    pub fn session_prompt_path(&self) -> Option<&Path> {
        self.session_prompt.as_ref().map(|p| p.value.as_path())
    }

    /// Prompt path to prepend, or `None` when disabled or unset.
    pub fn prompt_to_prepend(&self) -> Option<&Path> {
        if self.session_prompt_enabled {
            self.session_prompt_path()
        } else {
            None
        }
    }

    pub fn include_strs(&self) -> Vec<&str> {
        self.include.iter().map(|p| p.as_str()).collect()
    }

    pub fn exclude_strs(&self) -> Vec<&str> {
        self.exclude.iter().map(|r| r.as_str()).collect()
    }
}
