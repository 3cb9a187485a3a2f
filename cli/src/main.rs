//! rdapct-fe — RDAP conformance front-end.
//!
//! # Usage
//!
//! ```text
//! rdapct-fe serve --bind 0.0.0.0:8080
//! rdapct-fe check https://rdap.example/domain/example.com --gtld-registry
//! rdapct-fe --config /etc/rdapct/settings.yaml serve
//! ```
//!
//! The engine base directory comes from `RDPT` unless the settings file
//! sets `base_dir`.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use rdapct_core::settings;
use rdapct_core::{Checker, RunRequest};


#[derive(Parser)]
#[command(name = "rdapct-fe")]
#[command(about = "Run the RDAP conformance engine on request", long_about = None)]
struct Cli {
    /// Settings file (YAML). Defaults apply when omitted.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging for this service and engine output (default: info).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Debug-level logging for everything, HTTP stack included.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}


#[derive(Subcommand)]
enum Commands {
    /// Serve `POST /check` over HTTP.
    Serve {
        /// Listen address; overrides the settings file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run a single check locally and print the outcome as JSON.
    Check {
        /// RDAP URL to test.
        url: String,

        #[arg(long)]
        gtld_registrar: bool,

        #[arg(long)]
        gtld_registry: bool,

        #[arg(long)]
        thin: bool,
    },
}


fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("rdapct-fe: {:#}", e);
        process::exit(1);
    }
}


fn run(cli: Cli) -> Result<()> {
    let settings = settings::load(cli.config.as_deref()).context("load settings")?;
    let checker = Checker::from_settings(&settings).context("set up engine")?;

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| settings.bind.clone());
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("start tokio runtime")?;
            runtime
                .block_on(rdapct_core::service::serve(&addr, Arc::new(checker)))
                .context("serve")?;
        }
        Commands::Check {
            url,
            gtld_registrar,
            gtld_registry,
            thin,
        } => {
            let request = RunRequest {
                url,
                gtld_registrar,
                gtld_registry,
                thin,
            };
            let outcome = checker.check(&request);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}


fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = log_filter(verbose, debug);
    // RUST_LOG wins over the command-line switches when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("logging initialized with filter {}", level);
}


/// Default filter directives. Per-check events are logged at info, so info
/// is the floor even without flags.
fn log_filter(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info,rdapct_core=debug,rdapct::engine=debug"
    } else {
        "info"
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_filter_keeps_check_events() {
        assert_eq!(log_filter(false, false), "info");
    }

    #[test]
    fn verbose_adds_engine_output() {
        let filter = log_filter(true, false);
        assert!(filter.starts_with("info,"));
        assert!(filter.contains("rdapct::engine=debug"));
        assert_eq!(log_filter(true, true), "debug");
    }

    #[test]
    fn check_flags_parse() {
        let cli = Cli::parse_from([
            "rdapct-fe",
            "check",
            "https://rdap.example",
            "--gtld-registrar",
            "--thin",
        ]);
        match cli.command {
            Commands::Check {
                url,
                gtld_registrar,
                gtld_registry,
                thin,
            } => {
                assert_eq!(url, "https://rdap.example");
                assert!(gtld_registrar);
                assert!(!gtld_registry);
                assert!(thin);
            }
            Commands::Serve { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::parse_from(["rdapct-fe", "serve", "--config", "/etc/rdapct.yaml", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/rdapct.yaml")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { bind: None }));
    }
}
