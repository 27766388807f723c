// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod init;
pub mod models;
pub mod pattern;
pub mod prompt;
pub mod scanner;
pub mod settings;

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use self::cli::{Cli, Commands, InitArgs, RunArgs};
use self::config::{load_rules, RULE_FILE_NAME};
use self::formatter::{render_session_prompt, OutputGenerator};
use self::init::{initialize, prepare_directory, InitOutcome, TemplateResult};
use self::models::{Defaults, EffectiveSettings};
use self::prompt::{Confirm, StdinConfirm};
use self::scanner::{Scanner, LARGE_SELECTION_THRESHOLD};
use self::settings::{absolutize, merge};

/// How a `run` invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Written { output: PathBuf, files: Vec<PathBuf> },
    Aborted,
}

/// Dispatches the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let mut confirm = StdinConfirm;

    match cli.command {
        Commands::Init(args) => run_init(&args, &cwd, &mut confirm).map(|_| ()),
        Commands::Run(args) => run_gather(&args, &cwd, &mut confirm).map(|_| ()),
    }
}

pub fn run_init(
    args: &InitArgs,
    cwd: &Path,
    confirm: &mut dyn Confirm,
) -> Result<Vec<TemplateResult>> {
    println!("🚀 Initializing codegather project...");
    let dir = prepare_directory(&cwd.join(&args.root_dir))?;

    let results = initialize(&dir, args.force, confirm);
    for result in &results {
        let path = result.path.display();
        match &result.outcome {
            InitOutcome::Created => println!("✅ Created {} file: '{}'", result.label, path),
            InitOutcome::Overwritten => {
                println!("✅ Overwritten {} file: '{}'", result.label, path)
            }
            InitOutcome::ForceOverwritten => {
                println!("✅ Forced overwrite of {} file: '{}'", result.label, path)
            }
            InitOutcome::Skipped => println!("⏭️  Skipped '{}'.", path),
            InitOutcome::Failed(err) => {
                log::error!("❌ Error creating {} file '{}': {}", result.label, path, err)
            }
        }
    }
    println!("🎉 Initialization complete. Customize the files and run 'codegather run'.");
    Ok(results)
}

fn resolve_root(dir: &Path) -> Result<PathBuf> {
    let root = fs::canonicalize(dir)
        .with_context(|| format!("Root directory '{}' not found", dir.display()))?;
    if !root.is_dir() {
        bail!("Root path '{}' is not a directory", root.display());
    }
    Ok(root)
}

fn load_session_prompt(settings: &EffectiveSettings) -> Option<String> {
    let path = settings.prompt_to_prepend()?;
    if !path.is_file() {
        log::warn!(
            "⚠️ Session prompt file '{}' was specified but not found. \
             No session prompt will be prepended.",
            path.display()
        );
        return None;
    }
    match fs::read_to_string(path) {
        Ok(raw) => {
            log::debug!("Session prompt loaded from '{}'", path.display());
            Some(render_session_prompt(&raw, &settings.root))
        }
        Err(err) => {
            log::warn!(
                "⚠️ Could not read session prompt file '{}': {}",
                path.display(),
                err
            );
            None
        }
    }
}

/// Follow symlinks in the output and prompt paths so they compare equal to
/// entries of the canonical root walk. The output's parent must already exist.
fn resolve_links(mut settings: EffectiveSettings) -> Result<EffectiveSettings> {
    let output = settings.output_path().to_path_buf();
    let resolved = match fs::canonicalize(&output) {
        Ok(existing) => existing,
        Err(_) => match (output.parent(), output.file_name()) {
            (Some(parent), Some(name)) => fs::canonicalize(parent)
                .with_context(|| {
                    format!("Could not resolve output directory '{}'", parent.display())
                })?
                .join(name),
            _ => output.clone(),
        },
    };
    settings.output_path.value = resolved;

    if let Some(prompt) = settings.session_prompt.as_mut() {
        if let Ok(resolved) = fs::canonicalize(&prompt.value) {
            prompt.value = resolved;
        }
    }
    Ok(settings)
}

fn print_summary(
    settings: &EffectiveSettings,
    config_path: &Path,
    config_found: bool,
    args: &RunArgs,
) {
    println!("\ncodegather: Running");
    println!("---------------------------------");
    println!("🌳 Project Root: {}", settings.root.display());
    if config_found {
        println!("⚙️ Config File: {}", config_path.display());
    } else if args.config.is_some() {
        println!(
            "⚙️ Config File: {} (Specified but not found, using defaults)",
            config_path.display()
        );
    } else {
        println!("⚙️ Config File: Not found (Using defaults for patterns)");
    }

    match (args.no_session_prompt, settings.session_prompt_path()) {
        (true, _) => println!("🎙️ Session Prompt: Disabled (via --no-session-prompt)"),
        (false, Some(path)) if path.is_file() => {
            println!("🎙️ Session Prompt: {}", path.display())
        }
        (false, Some(path)) => {
            println!("🎙️ Session Prompt: {} (File not found!)", path.display())
        }
        (false, None) => println!("🎙️ Session Prompt: Not configured"),
    }

    println!("📄 Output File: {}", settings.output_path().display());
    println!(
        "📝 File Headers: {}",
        if settings.emit_headers() { "Enabled" } else { "Disabled" }
    );
    println!("---------------------------------");

    log::debug!("Output source: {}", settings.output_path.source);
    if let Some(prompt) = &settings.session_prompt {
        log::debug!("Session prompt source: {}", prompt.source);
    }
    log::debug!("Effective include patterns: {:?}", settings.include_strs());
    log::debug!("Effective exclude patterns: {:?}", settings.exclude_strs());
}

/// Resolves settings, scans the root and writes the combined output.
pub fn run_gather(args: &RunArgs, cwd: &Path, confirm: &mut dyn Confirm) -> Result<RunOutcome> {
    let root = resolve_root(&cwd.join(&args.root_dir))?;

    let config_path = match &args.config {
        Some(path) => absolutize(cwd, path),
        None => root.join(RULE_FILE_NAME),
    };
    let config_found = config_path.is_file();
    if !config_found {
        if args.config.is_some() {
            log::warn!(
                "⚠️ Custom config file '{}' specified but not found. Using defaults.",
                config_path.display()
            );
        } else {
            log::debug!(
                "Default config file '{}' not found in '{}'. Using defaults.",
                RULE_FILE_NAME,
                root.display()
            );
        }
    }

    let rules = load_rules(&config_path);
    let settings = merge(args.overrides(), rules, &Defaults::default(), &root, cwd);

    if let Some(parent) = settings.output_path().parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "Could not create directory for output file '{}'",
                settings.output_path().display()
            )
        })?;
    }
    let settings = resolve_links(settings)?;
    let output = settings.output_path().to_path_buf();
    print_summary(&settings, &config_path, config_found, args);

    let session_prompt = load_session_prompt(&settings);

    println!("🔎 Scanning for files to include...");
    let files = Scanner::new(&settings).scan();

    if files.is_empty() {
        println!("🤷 No files found matching the criteria.");
    } else {
        println!("Found {} file(s) to combine.", files.len());
        if files.len() > LARGE_SELECTION_THRESHOLD {
            let rule_name = config_path
                .file_name()
                .filter(|_| config_found)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| RULE_FILE_NAME.to_string());
            log::warn!(
                "⚠️ Processing {} files, which is a large number. Make sure large directories \
                 (like 'node_modules/', 'build/', '.git/') are excluded in '{}'.",
                files.len(),
                rule_name
            );
            let proceed = confirm
                .confirm("   Continue with this many files?")
                .unwrap_or_else(|err| {
                    log::warn!("Confirmation failed: {}", err);
                    false
                });
            if !proceed {
                println!("🛑 Aborted by user.");
                return Ok(RunOutcome::Aborted);
            }
        }
    }

    log::debug!("✍️ Writing {} files to {}", files.len(), output.display());
    OutputGenerator::new(&settings).write_file(&files, session_prompt.as_deref())?;

    if files.is_empty() {
        println!(
            "Output file '{}' created (contains session prompt and/or info header).",
            output.display()
        );
    } else {
        let prompt_msg = if session_prompt.as_deref().is_some_and(|s| !s.is_empty()) {
            "session prompt and "
        } else {
            ""
        };
        println!(
            "\n✅ Successfully combined {}{} file{} into '{}'.",
            prompt_msg,
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            output.display()
        );
    }

    Ok(RunOutcome::Written { output, files })
}
