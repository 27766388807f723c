use crate::app::config::RULE_FILE_NAME;
use crate::app::prompt::Confirm;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_PROMPT_FILE_NAME: &str = ".codegather_session_prompt.txt";

const RULE_FILE_TEMPLATE: &str = include_str!("../../templates/codegatherignore");
const SESSION_PROMPT_TEMPLATE: &str = include_str!("../../templates/session_prompt.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Overwritten,
    ForceOverwritten,
    Skipped,
    Failed(String),
}

#[derive(Debug)]
pub struct TemplateResult {
    pub path: PathBuf,
    pub label: &'static str,
    pub outcome: InitOutcome,
}

/// Create `dir` if needed and resolve it to an absolute path.
pub fn prepare_directory(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not access or create root directory '{}'", dir.display()))?;
    fs::canonicalize(dir)
        .with_context(|| format!("Could not resolve root directory '{}'", dir.display()))
}

fn write_template(
    path: &Path,
    content: &str,
    label: &str,
    force: bool,
    confirm: &mut dyn Confirm,
) -> InitOutcome {
    let existed = path.exists();
    if existed && !force {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let question = format!(
            "❓ File '{}' already exists in '{}'. Override?",
            name,
            path.parent().unwrap_or(path).display()
        );
        match confirm.confirm(&question) {
            Ok(true) => {}
            Ok(false) => return InitOutcome::Skipped,
            Err(err) => {
                log::warn!("Error during override prompt for {} file: {}", label, err);
                return InitOutcome::Skipped;
            }
        }
    }

    match fs::write(path, content) {
        Ok(()) if !existed => InitOutcome::Created,
        Ok(()) if force => InitOutcome::ForceOverwritten,
        Ok(()) => InitOutcome::Overwritten,
        Err(err) => InitOutcome::Failed(err.to_string()),
    }
}

/// Write the rule-file and session-prompt templates into `dir`.
pub fn initialize(dir: &Path, force: bool, confirm: &mut dyn Confirm) -> Vec<TemplateResult> {
    let templates = [
        (dir.join(RULE_FILE_NAME), RULE_FILE_TEMPLATE, "config"),
        (
            dir.join(SESSION_PROMPT_FILE_NAME),
            SESSION_PROMPT_TEMPLATE,
            "session prompt",
        ),
    ];

    templates
        .into_iter()
        .map(|(path, content, label)| {
            let outcome = write_template(&path, content, label, force, &mut *confirm);
            TemplateResult {
                path,
                label,
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::load_rules;
    use tempfile::TempDir;

    struct Answer {
        accept: bool,
        asked: usize,
    }

    impl Confirm for Answer {
        fn confirm(&mut self, _question: &str) -> Result<bool> {
            self.asked += 1;
            Ok(self.accept)
        }
    }

    fn outcomes(results: &[TemplateResult]) -> Vec<InitOutcome> {
        results.iter().map(|r| r.outcome.clone()).collect()
    }

    #[test]
    fn creates_both_templates_without_asking() {
        let temp = TempDir::new().unwrap();
        let mut answer = Answer { accept: false, asked: 0 };

        let results = initialize(temp.path(), false, &mut answer);

        assert_eq!(outcomes(&results), vec![InitOutcome::Created, InitOutcome::Created]);
        assert_eq!(answer.asked, 0);
        assert!(temp.path().join(RULE_FILE_NAME).is_file());
        assert!(temp.path().join(SESSION_PROMPT_FILE_NAME).is_file());
    }

    #[test]
    fn declining_leaves_existing_files_untouched() {
        let temp = TempDir::new().unwrap();
        let rule_path = temp.path().join(RULE_FILE_NAME);
        fs::write(&rule_path, "*.py\n").unwrap();
        let mut answer = Answer { accept: false, asked: 0 };

        let results = initialize(temp.path(), false, &mut answer);

        assert_eq!(outcomes(&results), vec![InitOutcome::Skipped, InitOutcome::Created]);
        assert_eq!(answer.asked, 1);
        assert_eq!(fs::read_to_string(&rule_path).unwrap(), "*.py\n");
    }

    #[test]
    fn accepting_or_forcing_overwrites() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(RULE_FILE_NAME), "old").unwrap();
        fs::write(temp.path().join(SESSION_PROMPT_FILE_NAME), "old").unwrap();

        let mut answer = Answer { accept: true, asked: 0 };
        let results = initialize(temp.path(), false, &mut answer);
        assert_eq!(
            outcomes(&results),
            vec![InitOutcome::Overwritten, InitOutcome::Overwritten]
        );

        let mut answer = Answer { accept: false, asked: 0 };
        let results = initialize(temp.path(), true, &mut answer);
        assert_eq!(
            outcomes(&results),
            vec![InitOutcome::ForceOverwritten, InitOutcome::ForceOverwritten]
        );
        assert_eq!(answer.asked, 0);
    }

    #[test]
    fn rule_template_parses_into_expected_rules() {
        let temp = TempDir::new().unwrap();
        let mut answer = Answer { accept: false, asked: 0 };
        initialize(temp.path(), false, &mut answer);

        let rules = load_rules(&temp.path().join(RULE_FILE_NAME));
        let include: Vec<&str> = rules.include.iter().map(|p| p.as_str()).collect();
        assert_eq!(include, vec!["*.js", "*.jsx"]);
        assert_eq!(
            rules.settings.session_prompt_file.as_deref(),
            Some(SESSION_PROMPT_FILE_NAME)
        );
        assert!(rules.exclude.iter().any(|r| r.as_str() == "node_modules/"));
    }

    #[test]
    fn prepare_directory_creates_missing_dirs() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        let resolved = prepare_directory(&nested).unwrap();
        assert!(resolved.is_absolute());
        assert!(nested.is_dir());
    }
}
