use anyhow::Context;
use clap::Parser;
use repo_sync::command::SystemRunner;
use repo_sync::condition::SystemEnvironment;
use repo_sync::config::{Config, Verbosity};
use repo_sync::error::{self, EXIT_SUCCESS, EXIT_USAGE, Error};
use repo_sync::output::{self, ConsoleCallbacks};
use repo_sync::{constants, manifest, repo};

/// Fetch and update every repository listed in ~/.repos.toml
#[derive(Parser, Debug)]
#[command(name = "repo-sync", version, about, long_about = None)]
struct Cli {
    /// Announce what would run without executing any command
    #[arg(long)]
    dry_run: bool,

    /// Fetch remote changes but skip updating working copies
    #[arg(long)]
    fetch_only: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the configuration path and debug logs
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            dry_run: self.dry_run,
            fetch_only: self.fetch_only,
            verbosity: Verbosity::from_flags(self.quiet, self.verbose),
        }
    }
}

fn main() {
    let config = match Cli::try_parse() {
        Ok(cli) => cli.config(),
        Err(err) => {
            // --help and --version also arrive here, on stdout.
            let code = if err.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();
    output::init_colors();

    let code = match run(&config) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            output::print_error(&err);
            error::exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(config: &Config) -> anyhow::Result<()> {
    let home = dirs::home_dir().ok_or(Error::HomeDirUnknown)?;
    let config_path = constants::config_path(&home);
    output::print_config_path(&config_path, config);

    let manifest = manifest::load(&config_path, &home, &SystemEnvironment)
        .context("cannot load repository list")?;
    output::print_skipped(&manifest.skipped);

    let report = repo::sync_all(&manifest.repositories, config, &SystemRunner, &ConsoleCallbacks);
    output::print_summary(&report, config);

    Ok(())
}
