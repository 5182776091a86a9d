//! Command implementations.
//!
//! Each command writes its output to a caller-supplied writer so the binary
//! can print to stdout and tests can capture a buffer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use overtime_core::db::{DbConfig, RepositoryRegistry};
use overtime_core::{
    OvertimeCalculator, OvertimeResult, OvertimeSettings, RateRegistry, RepositoryError,
    ScenarioInput, SettingsRepository, TableCode, ValidationReport, validate_scenario,
};
use overtime_data::{RateTableLoader, ScenarioLoader};
use overtime_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{
    BatchArgs, CalcArgs, Cli, Command, RatesArgs, ScenarioArgs, SetArgs, SettingsCommand,
};
use crate::config::AppConfig;
use crate::report::{render_rates, render_result, render_validation};

/// Registry with every compiled-in settings backend.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Built-in tables, or the CSV tables in `dir`.
pub fn load_rates(dir: Option<&Path>) -> Result<RateRegistry> {
    match dir {
        Some(dir) => RateTableLoader::load_dir(dir)
            .with_context(|| format!("Failed to load rate tables from {}", dir.display())),
        None => Ok(RateRegistry::builtin()),
    }
}

/// Fills gaps in `args` from `stored`.
///
/// Overtime hours are never stored and must always be given.
pub fn resolve_input(
    args: &ScenarioArgs,
    stored: Option<&OvertimeSettings>,
) -> Result<ScenarioInput> {
    let missing = |name: &str| anyhow!("--{name} not given and no stored setting to fall back on");

    Ok(ScenarioInput {
        annual_salary: args
            .salary
            .or(stored.map(|s| s.annual_salary))
            .ok_or_else(|| missing("salary"))?,
        overtime_hours: args.hours.ok_or_else(|| anyhow!("--hours is required"))?,
        table_code: args
            .table
            .or(stored.map(|s| s.table_code))
            .ok_or_else(|| missing("table"))?,
        tax_year: args
            .year
            .or(stored.map(|s| s.tax_year))
            .ok_or_else(|| missing("year"))?,
    })
}

/// Applies `args` over `current`, requiring every field when nothing is stored.
pub fn merge_settings(
    args: &SetArgs,
    current: Option<&OvertimeSettings>,
) -> Result<OvertimeSettings> {
    let missing = |name: &str| anyhow!("--{name} is required when no settings are stored");

    let settings = OvertimeSettings {
        annual_salary: args
            .salary
            .or(current.map(|s| s.annual_salary))
            .ok_or_else(|| missing("salary"))?,
        table_code: args
            .table
            .or(current.map(|s| s.table_code))
            .ok_or_else(|| missing("table"))?,
        tax_year: args
            .year
            .or(current.map(|s| s.tax_year))
            .ok_or_else(|| missing("year"))?,
        use_withholding_display: args
            .withholding_display
            .or(current.map(|s| s.use_withholding_display))
            .unwrap_or(false),
    };

    if TableCode::parse(settings.table_code).is_none() {
        bail!(
            "table {} is outside the deduction (8000-8400) and addition (9010-9400) bands",
            settings.table_code
        );
    }
    if settings.annual_salary < Decimal::ZERO {
        bail!("salary must not be negative");
    }
    Ok(settings)
}

/// Everything a command needs, resolved from config and flags.
pub struct App {
    pub config: AppConfig,
    pub rates: RateRegistry,
    pub db: DbConfig,
    repositories: RepositoryRegistry,
}

impl App {
    /// Layers defaults, the config file and command-line flags.
    pub fn from_cli(
        cli: &Cli,
        config: AppConfig,
    ) -> Result<Self> {
        let rates_dir = cli.rates_dir.as_deref().or(config.rates.dir.as_deref());
        let rates = load_rates(rates_dir)?;

        let mut db = DbConfig::from(config.database.clone());
        if let Some(backend) = &cli.backend {
            db.backend = backend.clone();
        }
        if let Some(connection_string) = &cli.db {
            db.connection_string = connection_string.clone();
        }

        Self::new(config, rates, db)
    }

    pub fn new(
        config: AppConfig,
        rates: RateRegistry,
        db: DbConfig,
    ) -> Result<Self> {
        config
            .policy
            .validate()
            .context("Invalid [policy] section in config")?;
        Ok(Self {
            config,
            rates,
            db,
            repositories: build_registry(),
        })
    }

    fn calculator(&self) -> Result<OvertimeCalculator<'_>> {
        OvertimeCalculator::new(&self.rates, self.config.policy.clone())
            .context("Invalid [policy] section in config")
    }

    async fn open_store(&self) -> Result<Box<dyn SettingsRepository>> {
        self.repositories
            .create(&self.db)
            .await
            .with_context(|| format!("Failed to open {} settings store", self.db.backend))
    }

    async fn stored_settings(&self) -> Result<Option<OvertimeSettings>> {
        let repo = self.open_store().await?;
        match repo.load_settings().await {
            Ok(stored) => Ok(Some(stored.settings)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e).context("Failed to load stored settings"),
        }
    }

    /// Resolves a scenario, touching the store only when a value is missing.
    async fn scenario_input(
        &self,
        args: &ScenarioArgs,
    ) -> Result<(ScenarioInput, bool)> {
        let complete = args.salary.is_some() && args.table.is_some() && args.year.is_some();
        let stored = if complete {
            None
        } else {
            self.stored_settings().await?
        };
        let withholding_first = stored
            .as_ref()
            .is_some_and(|settings| settings.use_withholding_display);
        Ok((resolve_input(args, stored.as_ref())?, withholding_first))
    }

    fn validate(
        &self,
        input: &ScenarioInput,
    ) -> ValidationReport {
        validate_scenario(&self.rates, input, &self.config.validation)
    }

    pub async fn run(
        &self,
        command: &Command,
        out: &mut dyn Write,
    ) -> Result<()> {
        match command {
            Command::Calc(args) => self.calc(args, out).await,
            Command::Batch(args) => self.batch(args, out),
            Command::Validate(args) => self.validate_command(args, out).await,
            Command::Rates(args) => self.rates_command(args, out),
            Command::Settings(command) => self.settings_command(command, out).await,
        }
    }

    async fn calc(
        &self,
        args: &CalcArgs,
        out: &mut dyn Write,
    ) -> Result<()> {
        let (input, withholding_first) = self.scenario_input(&args.scenario).await?;
        let report = self.validate(&input);
        if !report.valid {
            bail!("invalid scenario: {}", report.errors.join("; "));
        }

        let result = self.calculator()?.calculate_input(&input)?;
        info!(
            tax_year = result.tax_year,
            table = result.table_code.code(),
            refund = %result.estimated_refund,
            "calculated overtime"
        );

        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        } else {
            write!(out, "{}", render_result(&result, withholding_first))?;
        }
        Ok(())
    }

    fn batch(
        &self,
        args: &BatchArgs,
        out: &mut dyn Write,
    ) -> Result<()> {
        let file = File::open(&args.file)
            .with_context(|| format!("Failed to open: {}", args.file.display()))?;
        let inputs = ScenarioLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
        debug!(rows = inputs.len(), "parsed scenario batch");

        let calculator = self.calculator()?;
        let entries: Vec<BatchEntry> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                let report = self.validate(&input);
                let outcome = if report.valid {
                    calculator
                        .calculate_input(&input)
                        .map_err(|e| vec![e.to_string()])
                } else {
                    Err(report.errors)
                };
                BatchEntry::new(index + 1, input, report.warnings, outcome)
            })
            .collect();

        let failed = entries.iter().filter(|entry| entry.result.is_none()).count();
        if failed > 0 {
            warn!(failed, total = entries.len(), "some batch rows could not be calculated");
        }

        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        } else {
            for entry in &entries {
                write!(out, "{}", entry.render())?;
            }
        }
        Ok(())
    }

    async fn validate_command(
        &self,
        args: &ScenarioArgs,
        out: &mut dyn Write,
    ) -> Result<()> {
        let (input, _) = self.scenario_input(args).await?;
        let report = self.validate(&input);
        write!(out, "{}", render_validation(&report))?;
        Ok(())
    }

    fn rates_command(
        &self,
        args: &RatesArgs,
        out: &mut dyn Write,
    ) -> Result<()> {
        match args.year {
            Some(year) => {
                let rates = self.rates.rates_for(year)?;
                write!(out, "{}", render_rates(rates))?;
            }
            None => {
                for rates in self.rates.iter() {
                    write!(out, "{}", render_rates(rates))?;
                }
            }
        }
        Ok(())
    }

    async fn settings_command(
        &self,
        command: &SettingsCommand,
        out: &mut dyn Write,
    ) -> Result<()> {
        let repo = self.open_store().await?;
        match command {
            SettingsCommand::Show => match repo.load_settings().await {
                Ok(stored) => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&stored)?)?;
                }
                Err(RepositoryError::NotFound) => writeln!(out, "no settings stored")?,
                Err(e) => return Err(e).context("Failed to load stored settings"),
            },
            SettingsCommand::Set(args) => {
                let current = match repo.load_settings().await {
                    Ok(stored) => Some(stored.settings),
                    Err(RepositoryError::NotFound) => None,
                    Err(e) => return Err(e).context("Failed to load stored settings"),
                };
                let settings = merge_settings(args, current.as_ref())?;
                if !self.rates.contains(settings.tax_year) {
                    warn!(tax_year = settings.tax_year, "stored year has no rate table");
                }
                let stored = repo
                    .save_settings(&settings)
                    .await
                    .context("Failed to save settings")?;
                writeln!(out, "{}", serde_json::to_string_pretty(&stored)?)?;
            }
            SettingsCommand::Clear => {
                repo.clear_settings()
                    .await
                    .context("Failed to clear settings")?;
                writeln!(out, "settings cleared")?;
            }
        }
        Ok(())
    }
}

/// One row of batch output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub row: usize,
    pub input: ScenarioInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OvertimeResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BatchEntry {
    fn new(
        row: usize,
        input: ScenarioInput,
        warnings: Vec<String>,
        outcome: std::result::Result<OvertimeResult, Vec<String>>,
    ) -> Self {
        let (result, errors) = match outcome {
            Ok(result) => (Some(result), Vec::new()),
            Err(errors) => (None, errors),
        };
        Self {
            row,
            input,
            result,
            errors,
            warnings,
        }
    }

    fn render(&self) -> String {
        match &self.result {
            Some(result) => format!(
                "row {}: {} h at {} kr, table {}: take-home {} kr (withheld {} kr), refund {} kr\n",
                self.row,
                self.input.overtime_hours,
                self.input.annual_salary,
                result.table_code,
                result.take_home_actual,
                result.take_home_withholding,
                result.estimated_refund,
            ),
            None => format!("row {}: failed: {}\n", self.row, self.errors.join("; ")),
        }
    }
}
