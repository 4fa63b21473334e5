//! RDS commands

use std::io::Write;

use pcimaxfm_core::card::CardFile;
use pcimaxfm_core::command::Command;
use pcimaxfm_core::rds::{self, RdsParam, RdsValue, CATALOG};

use super::Notices;

/// One validated `PARAM=VALUE` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Target parameter
    pub param: RdsParam,
    /// Normalized value
    pub value: RdsValue,
}

/// Parse and validate `PARAM=VALUE` pairs
///
/// Every pair is checked before anything is sent, so a typo in the last
/// pair leaves the card untouched.
pub fn parse_assignments(args: &[String]) -> Result<Vec<Assignment>, String> {
    args.iter()
        .map(|arg| {
            let (name, value) = match arg.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (arg.as_str(), None),
            };
            let param: RdsParam = name
                .trim()
                .parse()
                .map_err(|e| format!("{}: {}", name, e))?;
            let value = rds::validate_param(param, value).map_err(|e| e.to_string())?;
            Ok(Assignment { param, value })
        })
        .collect()
}

/// Send validated assignments to the card
pub fn cmd_rds(
    file: &CardFile,
    assignments: &[Assignment],
    out: &mut Notices<impl Write>,
) -> Result<(), Box<dyn std::error::Error>> {
    for assignment in assignments {
        file.ioctl(Command::SetRdsParameter {
            index: assignment.param.index(),
            value: Some(assignment.value.as_str()),
        })?;
        out.line(format_args!(
            "RDS: {:<4} = \"{}\"",
            assignment.param.to_string(),
            assignment.value
        ))?;
    }
    Ok(())
}

/// Print the parameter table
pub fn list_params() {
    println!("{:<10} {:<10} {}", "Parameter", "Type", "Description");
    println!("{}", "-".repeat(50));
    for info in CATALOG.iter() {
        let description = match info.param {
            RdsParam::ProgramService(bank) => format!("{} {:02}", info.description, bank),
            RdsParam::Duration(bank) => format!("Program service bank {:02} duration", bank),
            RdsParam::RadioText => info.description.to_string(),
        };
        println!(
            "{:<10} {:<10} {}",
            info.param.to_string(),
            info.kind.type_name(),
            description
        );
    }
}
