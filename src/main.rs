use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use adcli_rs::{
    plan::{computer_plan, ComputerEnsure, Guard},
    AdcliError, Collector, CollectorSettings, ComputerArguments, ComputerParams,
    DomainArguments, DomainParams, HostFacts, SystemExecutor,
};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[clap(
    name = "adcli-facts",
    version,
    about = "Report Active Directory membership of this host through adcli",
    long_about = None
)]
struct Args {
    /// JSON file with adcli, kinit and keytab locations
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// DNS domain to use instead of the discovered one
    #[arg(short = 'd', long)]
    domain: Option<String>,

    /// Short host name to use instead of the discovered one
    #[arg(long)]
    hostname: Option<String>,

    /// Fully qualified host name to use instead of the discovered one
    #[arg(long)]
    fqdn: Option<String>,

    /// Pretty print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect the domain report (default)
    Facts,
    /// Compose domain arguments from a JSON parameter file
    DomainArgs {
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Compose computer arguments from a JSON parameter file
    ComputerArgs {
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Print the adcli command that brings the computer account into a state
    Plan {
        /// preset, joined, updated, reset or deleted
        #[arg(long)]
        ensure: ComputerEnsure,
        #[arg(long)]
        domain_params: Option<PathBuf>,
        #[arg(long)]
        computer_params: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AdcliError> {
    let settings = match &args.config {
        Some(path) => CollectorSettings::from_file(path)?,
        None => CollectorSettings::default(),
    };
    let facts = host_facts(args)?;

    match args.command.as_ref().unwrap_or(&Command::Facts) {
        Command::Facts => {
            let collector = Collector::new(SystemExecutor, settings);
            print(&collector.collect(&facts), args.pretty)
        }
        Command::DomainArgs { params } => {
            let params: DomainParams = read_params(params.as_deref())?;
            print(&DomainArguments::compose(&params, &facts), args.pretty)
        }
        Command::ComputerArgs { params } => {
            let params: ComputerParams = read_params(params.as_deref())?;
            print(&ComputerArguments::compose(&params, &facts), args.pretty)
        }
        Command::Plan {
            ensure,
            domain_params,
            computer_params,
        } => {
            let domain = DomainArguments::compose(&read_params(domain_params.as_deref())?, &facts);
            let computer =
                ComputerArguments::compose(&read_params(computer_params.as_deref())?, &facts);
            let plan = computer_plan(&settings.adcli, *ensure, &domain, &computer)?;
            match &plan.guard {
                Guard::Unless(guard) => println!("unless: {guard}"),
                Guard::OnlyIf(guard) => println!("onlyif: {guard}"),
            }
            println!("{}", plan.command);
            Ok(())
        }
    }
}

fn host_facts(args: &Args) -> Result<HostFacts, AdcliError> {
    let mut facts = HostFacts::from_system()?;
    if let Some(domain) = &args.domain {
        facts.networking.domain = domain.clone();
    }
    if let Some(hostname) = &args.hostname {
        facts.networking.hostname = hostname.clone();
    }
    match &args.fqdn {
        Some(fqdn) => facts.networking.fqdn = fqdn.clone(),
        None if args.domain.is_some() || args.hostname.is_some() => {
            let overridden = HostFacts::new(&facts.networking.domain, &facts.networking.hostname);
            facts.networking.fqdn = overridden.networking.fqdn;
        }
        None => {}
    }
    debug!("using host facts {facts:?}");
    Ok(facts)
}

/// Missing file means all parameters absent
fn read_params<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, AdcliError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path).map_err(|source| AdcliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn print(value: &impl Serialize, pretty: bool) -> Result<(), AdcliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
