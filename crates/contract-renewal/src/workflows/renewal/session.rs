//! Interactive menu loop around the coordinator.

use super::coordinator::RenewalCoordinator;
use super::domain::{parse_reference_date, DATE_FORMAT};
use crate::error::AppError;
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use tracing::warn;

const COMMAND_PROMPT: &str =
    "Enter your command (\"s\" - start, \"q\" - quit or \"c\" - clean notification log): ";
const DATE_PROMPT: &str = "Enter the current date in format YYYY-MM-DD (press Enter for today): ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Quit,
    Clear,
    Invalid(String),
}

impl SessionCommand {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "s" => Self::Start,
            "q" => Self::Quit,
            "c" => Self::Clear,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Runs the menu until the user quits or input ends. Invalid dates are
/// reported and the loop continues; ledger failures end the session.
pub fn run_session<R, W, F>(
    coordinator: &RenewalCoordinator,
    mut input: R,
    mut output: W,
    today: F,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    F: Fn() -> NaiveDate,
{
    writeln!(output, "Tool for expiring contracts renewal.")?;

    loop {
        write!(output, "{COMMAND_PROMPT}")?;
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            writeln!(output)?;
            return Ok(());
        };

        match SessionCommand::parse(&line) {
            SessionCommand::Start => start_cycle(coordinator, &mut input, &mut output, &today)?,
            SessionCommand::Quit => {
                writeln!(output, "Exiting the tool")?;
                return Ok(());
            }
            SessionCommand::Clear => {
                writeln!(
                    output,
                    "Clearing notification log: {}",
                    coordinator.ledger_path().display()
                )?;
                coordinator.clear_ledger()?;
            }
            SessionCommand::Invalid(_) => writeln!(output, "Invalid command")?,
        }
    }
}

fn start_cycle<R, W, F>(
    coordinator: &RenewalCoordinator,
    input: &mut R,
    output: &mut W,
    today: &F,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    F: Fn() -> NaiveDate,
{
    write!(output, "{DATE_PROMPT}")?;
    output.flush()?;

    let raw = read_line(input)?.unwrap_or_default();
    let today = today();
    let entered = match raw.trim() {
        "" => today.format(DATE_FORMAT).to_string(),
        value => value.to_string(),
    };
    writeln!(output, "Date entered: {entered}")?;

    let reference_date = match parse_reference_date(Some(&entered), today) {
        Ok(date) => date,
        Err(err) => {
            warn!(error = %err, "rejected reference date");
            writeln!(
                output,
                "Invalid date format. Please use YYYY-MM-DD format (e.g., 2025-08-04)"
            )?;
            return Ok(());
        }
    };

    let report = coordinator.check(reference_date)?;
    if report.evaluated == 0 {
        writeln!(output, "No contracts found")?;
    }
    for notification in &report.notifications {
        writeln!(output, "{notification}")?;
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
