use crate::app::config::ParsedRules;
use crate::app::models::{CliOverrides, Defaults, EffectiveSettings, Resolved, Source};
use std::path::{Component, Path, PathBuf};

/// First present value in the fixed order CLI > rule file > default.
pub fn resolve<T>(
    cli: Option<T>,
    rule_file: Option<T>,
    default: Option<T>,
) -> Option<Resolved<T>> {
    [
        (Source::Cli, cli),
        (Source::RuleFile, rule_file),
        (Source::Default, default),
    ]
    .into_iter()
    .find_map(|(source, value)| value.map(|value| Resolved { value, source }))
}

/// Same precedence for settings that always have a default.
pub fn resolve_or<T>(cli: Option<T>, rule_file: Option<T>, default: T) -> Resolved<T> {
    match resolve(cli, rule_file, None) {
        Some(resolved) => resolved,
        None => Resolved {
            value: default,
            source: Source::Default,
        },
    }
}

/// Lexically normalize `path` against `base` without touching the filesystem.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Relative rule-file paths live under the project root; everything else under cwd.
fn resolve_path(resolved: Resolved<PathBuf>, root: &Path, cwd: &Path) -> Resolved<PathBuf> {
    let base = match resolved.source {
        Source::RuleFile => root,
        Source::Cli | Source::Default => cwd,
    };
    Resolved {
        value: absolutize(base, &resolved.value),
        source: resolved.source,
    }
}

pub fn merge(
    cli: CliOverrides,
    rules: ParsedRules,
    defaults: &Defaults,
    root: &Path,
    cwd: &Path,
) -> EffectiveSettings {
    let settings = rules.settings;

    let output_path = resolve_path(
        resolve_or(
            cli.output,
            settings.output_file.map(PathBuf::from),
            defaults.output_file.clone(),
        ),
        root,
        cwd,
    );

    let no_header = resolve_or(cli.no_header, settings.no_header, defaults.no_header);

    let session_prompt = resolve(
        cli.session_prompt,
        settings.session_prompt_file.map(PathBuf::from),
        defaults.session_prompt_file.clone(),
    )
    .map(|r| resolve_path(r, root, cwd));

    EffectiveSettings {
        root: root.to_path_buf(),
        output_path,
        no_header,
        session_prompt,
        session_prompt_enabled: !cli.no_session_prompt,
        include: rules.include,
        exclude: rules.exclude,
    }
}
