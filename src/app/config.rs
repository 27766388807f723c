use crate::app::pattern::{is_include_extension, ExcludeRule, IncludePattern};
use std::fs;
use std::path::Path;

pub const RULE_FILE_NAME: &str = ".codegatherignore";

/// Used when the rule file lists no `*.ext` lines and no `default_extensions`.
pub const BUILTIN_INCLUDE_EXTENSIONS: &[&str] = &["*.js", "*.jsx"];

/// Key-value settings found in a rule file. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSettings {
    pub output_file: Option<String>,
    pub no_header: Option<bool>,
    pub default_extensions: Option<String>,
    pub session_prompt_file: Option<String>,
}

/// Where the include list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeSource {
    ExplicitPatterns,
    DefaultExtensions,
    Builtin,
}

/// The immutable result of reading one rule file.
#[derive(Debug, Clone)]
pub struct ParsedRules {
    pub settings: RuleSettings,
    pub include: Vec<IncludePattern>,
    pub include_source: IncludeSource,
    pub exclude: Vec<ExcludeRule>,
}

impl Default for ParsedRules {
    fn default() -> Self {
        parse_rules("")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `py, .ts, *.md` -> `*.py`, `*.ts`, `*.md`
pub fn expand_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token.starts_with("*.") {
                token.to_string()
            } else if token.starts_with('.') {
                format!("*{}", token)
            } else {
                format!("*.{}", token)
            }
        })
        .collect()
}

fn apply_setting(settings: &mut RuleSettings, key: &str, value: &str) {
    match key {
        "output_file" => settings.output_file = non_empty(value),
        "no_header" => settings.no_header = Some(parse_flag(value)),
        "default_extensions" => settings.default_extensions = non_empty(value),
        "session_prompt_file" => settings.session_prompt_file = non_empty(value),
        _ => {
            log::debug!("Config: ignoring unknown key '{}'", key);
            return;
        }
    }
    log::debug!("Config: {} = {}", key, value);
}

pub fn parse_rules(contents: &str) -> ParsedRules {
    let mut settings = RuleSettings::default();
    let mut explicit_include = Vec::new();
    let mut exclude = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((raw_key, raw_value)) = line.split_once(':') {
            let key = raw_key.trim().to_lowercase().replace('-', "_");
            let value = match raw_value.split_once('#') {
                Some((before_comment, _)) => before_comment,
                None => raw_value,
            }
            .trim();
            apply_setting(&mut settings, &key, value);
            continue;
        }

        if is_include_extension(line) {
            log::debug!("Config: include pattern {}", line);
            explicit_include.push(line.to_string());
        } else if let Some(rule) = ExcludeRule::parse(line) {
            log::debug!("Config: exclude pattern {}", line);
            exclude.push(rule);
        }
    }

    let (include, include_source) = if !explicit_include.is_empty() {
        (explicit_include, IncludeSource::ExplicitPatterns)
    } else if let Some(list) = settings.default_extensions.as_deref() {
        (expand_extensions(list), IncludeSource::DefaultExtensions)
    } else {
        (
            BUILTIN_INCLUDE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            IncludeSource::Builtin,
        )
    };
    log::debug!("Config: include patterns from {:?}: {:?}", include_source, include);

    ParsedRules {
        settings,
        include: include.iter().map(|p| IncludePattern::new(p)).collect(),
        include_source,
        exclude,
    }
}

/// Missing or unreadable rule files fall back to built-in defaults.
pub fn load_rules(path: &Path) -> ParsedRules {
    if !path.is_file() {
        log::debug!("Rule file '{}' not found, using defaults", path.display());
        return ParsedRules::default();
    }
    match fs::read_to_string(path) {
        Ok(contents) => {
            log::debug!("Reading rule file: {}", path.display());
            parse_rules(&contents)
        }
        Err(err) => {
            log::warn!(
                "Could not read rule file '{}': {}. Using defaults.",
                path.display(),
                err
            );
            ParsedRules::default()
        }
    }
}
