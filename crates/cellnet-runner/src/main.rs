//! cellnet - backhaul topology and radio resource planning.
//!
//! Usage:
//!   cellnet links --scenario net.yaml --owner acme --sites a,b,c
//!   cellnet radio --scenario net.yaml --owner acme --sites a,b,c --domain bsic --seed 7
//!   cellnet plan  --scenario net.yaml --owner acme --sites a,b,c --output planned.yaml
//!
//! Without `--output` the result is printed to stdout as YAML.

use cellnet_model::{OwnerId, SiteId};
use cellnet_radio::ValueDomain;
use cellnet_runner::{execute, OutputFormat, Pipeline, RunRequest};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cellnet")]
#[command(version, about = "Backhaul topology and radio resource planning", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize links for the selection and adjust heights for clearance
    Links(RunArgs),
    /// Assign channels and cell identities to the selection
    Radio(RadioArgs),
    /// Run links, then radio
    Plan(RadioArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario file (YAML, or JSON by extension)
    #[arg(long)]
    scenario: PathBuf,

    /// Owner whose sites are planned
    #[arg(long)]
    owner: String,

    /// Comma-separated site ids
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    sites: Vec<String>,

    /// Output file (YAML, or JSON by extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RadioArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Domains to assign: 2g_channel (arfcn), 2g_cell_id (bsic), 4g_cell_id (pci).
    /// Defaults to all.
    #[arg(long = "domain", value_delimiter = ',')]
    domains: Vec<ValueDomain>,

    /// Random seed, overriding the owner's settings
    #[arg(long)]
    seed: Option<u64>,
}

impl Command {
    fn into_request(self) -> RunRequest {
        let (pipeline, run, domains, seed) = match self {
            Command::Links(run) => (Pipeline::Links, run, Vec::new(), None),
            Command::Radio(args) => (Pipeline::Radio, args.run, args.domains, args.seed),
            Command::Plan(args) => (Pipeline::Plan, args.run, args.domains, args.seed),
        };
        RunRequest {
            scenario: run.scenario,
            owner: OwnerId::from(run.owner),
            sites: run.sites.into_iter().map(SiteId::from).collect(),
            pipeline,
            domains,
            seed,
            output: run.output,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cellnet_metrics::describe_metrics();

    let request = cli.command.into_request();
    let to_stdout = request.output.is_none();

    let result = execute(&request).and_then(|output| {
        if to_stdout {
            print!("{}", OutputFormat::Yaml.render(&output)?);
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Planning run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
