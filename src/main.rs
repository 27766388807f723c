use clap::Parser;
use codegather::app::{self, cli::Cli};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(err) = app::run(cli) {
        eprintln!("❌ Error: {:#}", err);
        std::process::exit(1);
    }
}
