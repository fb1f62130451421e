use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use upstream_releases::config::ResolverConfig;
use upstream_releases::logging;
use upstream_releases::release::{Outcome, ProviderRegistry, Release, Resolution, Resolver};

/// The invocation ran to completion, whether or not anything was found
const GOOD: u8 = 0;
/// Wrong arguments
const USAGE: u8 = 1;
/// The runtime or HTTP client could not be set up
const FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "upstream-releases")]
#[command(version, about = "Find the releases a package publishes upstream")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Timeout for each provider in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    provider_timeout: Option<u64>,

    /// Timeout for the whole lookup in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    timeout: Option<u64>,

    /// Skip a provider; may be repeated
    #[arg(
        long,
        value_name = "PROVIDER",
        value_parser = ["pypi", "sourceforge", "github"],
        ignore_case = true,
        global = true
    )]
    disable: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get all stable releases
    Releases(QueryArgs),

    /// Get the newest release from each matching provider
    Latest(QueryArgs),
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Artifact or project URL to resolve
    #[arg(value_name = "URL")]
    query: String,
}

impl Cli {
    fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if let Some(ms) = self.provider_timeout {
            config.provider_timeout_ms = ms;
        }
        config.timeout_ms = self.timeout;
        for name in &self.disable {
            config.providers.disable(name);
        }
        config
    }

    fn query(&self) -> (&str, bool) {
        match &self.command {
            Command::Releases(args) => (&args.query, false),
            Command::Latest(args) => (&args.query, true),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::from(GOOD),
                _ => ExitCode::from(USAGE),
            };
        }
    };

    if let Err(e) = logging::init(cli.verbose, cli.json) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::from(GOOD),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(FAILED)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolver_config();
    let registry =
        ProviderRegistry::from_config(&config).context("Failed to create HTTP client")?;
    if registry.is_empty() {
        warn!("Every provider is disabled");
    }
    let resolver = Resolver::new(registry, &config);
    let (query, latest_only) = cli.query();

    let resolution = tokio::select! {
        result = resolver.resolve(query) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Cancelled");
            return Ok(());
        }
    };

    let resolution = match resolution {
        Ok(resolution) => resolution,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&json_view(&resolution, latest_only))?);
    } else {
        print!("{}", render_text(&resolution, latest_only));
    }

    if resolution.is_found() {
        info!("Done");
    } else {
        error!("No releases found.");
    }
    Ok(())
}

/// One block per successful provider, headed by the name it resolved
fn render_text(resolution: &Resolution, latest_only: bool) -> String {
    let mut out = String::new();
    for (provider, set) in resolution.found() {
        out.push_str(&format!("{} ({}):\n", provider, set.query()));
        let take = if latest_only { 1 } else { set.len() };
        for release in set.iter().take(take) {
            out.push_str(&format!("  {}\n", release));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct ProviderView<'a> {
    provider: &'a str,
    status: &'static str,
    timed_out: bool,
    releases: Vec<&'a Release>,
}

/// Matched providers only, each with its status and releases
fn json_view(resolution: &Resolution, latest_only: bool) -> Vec<ProviderView<'_>> {
    resolution
        .reports
        .iter()
        .filter_map(|report| {
            let status = report.status()?;
            let (releases, timed_out) = match &report.outcome {
                Outcome::Found(set) if latest_only => (set.first().into_iter().collect(), false),
                Outcome::Found(set) => (set.iter().collect(), false),
                Outcome::Failed { timed_out, .. } => (Vec::new(), *timed_out),
                Outcome::NoMatch => return None,
            };
            Some(ProviderView {
                provider: report.provider,
                status: status.as_str(),
                timed_out,
                releases,
            })
        })
        .collect()
}
