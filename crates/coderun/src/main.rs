//! `crun`: run a code snippet through the matching toolchain.

mod config;
mod output;

use std::num::NonZeroU64;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use coderun_exec::Engine;
use coderun_languages::Registry;
use eyre::{Result, eyre};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use tokio::io::AsyncReadExt;

use crate::config::LoadedConfig;

/// Run a snippet
#[derive(Facet, Debug)]
struct RunArgs {
    /// Language identifier (python, js, c++, ...)
    #[facet(args::positional)]
    language: String,

    /// Source file; stdin when omitted
    #[facet(args::positional, default)]
    file: Option<String>,

    /// Arguments passed to the snippet, space separated
    #[facet(args::named, args::short = 'a', default)]
    args: Option<String>,

    /// Timeout in seconds, overriding the config file
    #[facet(args::named, args::short = 't', default)]
    timeout: Option<u64>,

    /// Print the result as JSON
    #[facet(args::named)]
    json: bool,

    /// Config file; `.config/coderun.yaml` is searched for otherwise
    #[facet(args::named, args::short = 'c', default)]
    config: Option<String>,
}

/// List supported languages
#[derive(Facet, Debug)]
struct LanguagesArgs {}

/// Show every language setting and its effective value
#[derive(Facet, Debug)]
struct SettingsArgs {
    /// Config file; `.config/coderun.yaml` is searched for otherwise
    #[facet(args::named, args::short = 'c', default)]
    config: Option<String>,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Run a snippet
    Run(RunArgs),
    /// List supported languages
    Languages(LanguagesArgs),
    /// Show language settings
    Settings(SettingsArgs),
}

#[derive(Facet, Debug)]
struct Args {
    #[facet(args::subcommand)]
    command: Command,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let parsed: Args = facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        eyre!("Failed to parse arguments")
    })?;

    Ok(parsed.command)
}

fn load_config(path: Option<&str>) -> Result<LoadedConfig> {
    let path = path.map(Utf8PathBuf::from);
    Ok(LoadedConfig::discover(path.as_deref())?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let registry = Registry::builtin();
    if let Err(e) = registry.validate() {
        tracing::warn!(error = %e, "language registry has conflicts");
    }

    match command {
        Command::Run(args) => run(Arc::new(registry), args).await,
        Command::Languages(_) => {
            output::print_languages(&registry);
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings(args) => {
            let loaded = load_config(args.config.as_deref())?;
            if let Some(path) = &loaded.path {
                println!("{} {}\n", "config:".dimmed(), path);
            }
            output::print_settings(&registry, &loaded.values());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(registry: Arc<Registry>, args: RunArgs) -> Result<ExitCode> {
    let loaded = load_config(args.config.as_deref())?;
    let mut config = loaded.to_execution_config(&registry)?;
    if let Some(secs) = args.timeout {
        let secs = NonZeroU64::new(secs).ok_or_else(|| eyre!("--timeout must be greater than zero"))?;
        config = config.with_timeout_secs(secs);
    }

    let source = match &args.file {
        Some(path) => fs_err::read_to_string(path)?,
        None => {
            let mut source = String::new();
            tokio::io::stdin().read_to_string(&mut source).await?;
            source
        }
    };

    let engine = Engine::new(registry, config);
    let result = engine
        .run(&args.language, &source, args.args.as_deref())
        .await;

    if args.json {
        output::print_json(&result)?;
    } else {
        output::print_result(&result)?;
    }

    Ok(output::exit_status(&result))
}
