use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use contract_renewal::config::{AppConfig, InputPaths};
use contract_renewal::error::AppError;
use contract_renewal::telemetry;
use contract_renewal::workflows::renewal::{
    parse_reference_date, run_session, LedgerStore, RenewalCoordinator,
};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Contract Renewal Notifier",
    about = "Flag software contracts that are due for renewal and remember what was already notified",
    version
)]
struct Cli {
    #[command(flatten)]
    inputs: InputArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive start/quit/clear menu (default command)
    Interactive,
    /// Run a single check cycle and print new notifications
    Check(CheckArgs),
    /// Reset the notification ledger to an empty mapping
    Clear,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Override the rules and priority document
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the contracts list
    #[arg(long, global = true)]
    contracts: Option<PathBuf>,
    /// Override the notification ledger file
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,
}

impl InputArgs {
    fn apply(self, paths: &mut InputPaths) {
        if let Some(config) = self.config {
            paths.rules = config;
        }
        if let Some(contracts) = self.contracts {
            paths.contracts = contracts;
        }
        if let Some(ledger) = self.ledger {
            paths.ledger = ledger;
        }
    }
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Reference date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.inputs.apply(&mut config.inputs);

    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        ledger = %config.inputs.ledger.display(),
        "contract renewal notifier starting"
    );

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let coordinator = RenewalCoordinator::from_paths(&config.inputs)?;
            run_session(&coordinator, io::stdin().lock(), io::stdout(), today)
        }
        Command::Check(args) => run_check(&config.inputs, args),
        Command::Clear => {
            println!(
                "Clearing notification log: {}",
                config.inputs.ledger.display()
            );
            LedgerStore::new(&config.inputs.ledger).clear()?;
            Ok(())
        }
    }
}

fn run_check(inputs: &InputPaths, args: CheckArgs) -> Result<(), AppError> {
    let reference_date = parse_reference_date(args.date.as_deref(), today())?;
    let coordinator = RenewalCoordinator::from_paths(inputs)?;

    let report = coordinator.check(reference_date)?;
    if report.evaluated == 0 {
        println!("No contracts found");
    }
    for notification in &report.notifications {
        println!("{notification}");
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive_without_subcommand() {
        let cli = Cli::try_parse_from(["contract-renewal"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn path_overrides_replace_configured_inputs() {
        let cli = Cli::try_parse_from([
            "contract-renewal",
            "check",
            "--date",
            "2025-08-04",
            "--ledger",
            "/tmp/ledger.json",
        ])
        .expect("parses");

        let mut paths = InputPaths {
            rules: PathBuf::from("inputs/config.json"),
            contracts: PathBuf::from("inputs/contracts.json"),
            ledger: PathBuf::from("inputs/notification_log.json"),
        };
        cli.inputs.apply(&mut paths);

        assert_eq!(paths.ledger, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(paths.rules, PathBuf::from("inputs/config.json"));
        match cli.command {
            Some(Command::Check(args)) => assert_eq!(args.date.as_deref(), Some("2025-08-04")),
            other => panic!("expected check command, got {other:?}"),
        }
    }
}
