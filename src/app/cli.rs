use crate::app::models::CliOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Combine project files into a single context file for AI prompting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a rule file and a session prompt template
    Init(InitArgs),
    /// Gather and combine files according to the rule file
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub root_dir: PathBuf,

    /// Overwrite existing files without asking
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Root directory of the project to scan
    #[arg(default_value = ".")]
    pub root_dir: PathBuf,

    /// Output file path, overrides the rule file (default: combined_code.txt)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Rule file path (default: <root_dir>/.codegatherignore)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable START/END FILE markers (overrides the rule file)
    #[arg(long)]
    pub no_header: bool,

    /// Session prompt file to prepend (overrides the rule file)
    #[arg(long = "session-prompt", value_name = "PATH")]
    pub session_prompt: Option<PathBuf>,

    /// Do not prepend a session prompt, even if the rule file sets one
    #[arg(long)]
    pub no_session_prompt: bool,

    /// Log every selection decision
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Flags the user did not pass stay `None` so they never shadow the rule file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone().filter(|p| !p.as_os_str().is_empty()),
            no_header: self.no_header.then_some(true),
            session_prompt: self
                .session_prompt
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            no_session_prompt: self.no_session_prompt,
        }
    }
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Run(args) => args.verbose,
            Commands::Init(_) => false,
        }
    }
}
