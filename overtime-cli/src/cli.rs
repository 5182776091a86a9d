use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Tax on Norwegian overtime pay, as withheld on the pay slip and as
/// actually owed for the year.
#[derive(Debug, Parser)]
#[command(name = "overtime", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory with brackets.csv and years.csv, replacing the built-in
    /// rate tables.
    #[arg(long, global = true)]
    pub rates_dir: Option<PathBuf>,

    /// Settings store backend.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Settings store connection string.
    /// For SQLite this is a file path (e.g. `overtime.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log filter, e.g. `debug` or `overtime_core=trace`. `RUST_LOG` wins.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log lines to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate the tax on one month's overtime.
    Calc(CalcArgs),
    /// Calculate every row of a scenario CSV file.
    Batch(BatchArgs),
    /// Check a scenario without calculating it.
    Validate(ScenarioArgs),
    /// Show the registered rate tables.
    Rates(RatesArgs),
    /// Show, change or clear the stored defaults.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// Scenario values. Anything left out is taken from the stored settings.
#[derive(Debug, Clone, Default, Args)]
pub struct ScenarioArgs {
    /// Annual salary in NOK.
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Overtime hours worked in the month.
    #[arg(long)]
    pub hours: Option<Decimal>,

    /// Withholding table number (8000-8400 or 9010-9400).
    #[arg(long)]
    pub table: Option<i32>,

    /// Income year.
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Args)]
pub struct CalcArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV with annual_salary,overtime_hours,table_code,tax_year columns.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RatesArgs {
    /// Only this year.
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the stored settings.
    Show,
    /// Store new defaults. Fields left out keep their stored value.
    Set(SetArgs),
    /// Remove the stored settings.
    Clear,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub salary: Option<Decimal>,

    #[arg(long)]
    pub table: Option<i32>,

    #[arg(long)]
    pub year: Option<i32>,

    /// Lead with the pay-slip withholding figures in reports.
    #[arg(long)]
    pub withholding_display: Option<bool>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_calc_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "overtime", "calc", "--salary", "900000", "--hours", "7.5", "--table", "8115",
            "--year", "2026", "--json", "--db", ":memory:",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.scenario.salary, Some(dec!(900000)));
        assert_eq!(args.scenario.hours, Some(dec!(7.5)));
        assert_eq!(args.scenario.table, Some(8115));
        assert!(args.json);
    }

    #[test]
    fn parses_settings_set() {
        let cli = Cli::try_parse_from([
            "overtime", "settings", "set", "--table", "9050", "--withholding-display", "true",
        ])
        .unwrap();

        let Command::Settings(SettingsCommand::Set(args)) = cli.command else {
            panic!("expected settings set");
        };
        assert_eq!(args.table, Some(9050));
        assert_eq!(args.withholding_display, Some(true));
        assert_eq!(args.salary, None);
    }

    #[test]
    fn rejects_malformed_salary() {
        assert!(Cli::try_parse_from(["overtime", "calc", "--salary", "lots"]).is_err());
    }
}
