//! Loads the shipped CSV fixtures and runs them through the calculator.

use std::path::Path;

use overtime_core::calculations::OvertimeCalculator;
use overtime_core::{
    CalculationError, RateRegistry, ValidationLimits, validate_scenario,
};
use overtime_data::{RateTableLoader, ScenarioLoader};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const SCENARIOS_CSV: &str = include_str!("../test-data/scenarios.csv");

fn test_data_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/test-data"))
}

#[test]
fn test_fixture_tables_match_builtin_registry() {
    let loaded = RateTableLoader::load_dir(test_data_dir()).expect("Failed to load rate tables");

    assert_eq!(loaded, RateRegistry::builtin());
}

#[test]
fn test_fixture_scenarios_parse() {
    let inputs = ScenarioLoader::parse(SCENARIOS_CSV.as_bytes()).expect("Failed to parse CSV");

    assert_eq!(inputs.len(), 6);
    assert_eq!(inputs[2].overtime_hours, dec!(7.5));
}

#[test]
fn test_batch_against_loaded_tables() {
    let registry = RateTableLoader::load_dir(test_data_dir()).unwrap();
    let calculator = OvertimeCalculator::with_default_policy(&registry);
    let inputs = ScenarioLoader::parse(SCENARIOS_CSV.as_bytes()).unwrap();

    let results: Vec<_> = inputs
        .iter()
        .map(|input| calculator.calculate_input(input))
        .collect();

    assert!(results[..5].iter().all(Result::is_ok));
    assert_eq!(results[5], Err(CalculationError::InvalidTableCode(7150)));

    // salary just under the national insurance threshold
    let boundary = results[4].as_ref().unwrap();
    assert!(boundary.estimated_refund < dec!(0));
}

#[test]
fn test_validation_flags_fixture_rows() {
    let registry = RateTableLoader::load_dir(test_data_dir()).unwrap();
    let inputs = ScenarioLoader::parse(SCENARIOS_CSV.as_bytes()).unwrap();
    let limits = ValidationLimits::default();

    let valid: Vec<bool> = inputs
        .iter()
        .map(|input| validate_scenario(&registry, input, &limits).valid)
        .collect();

    // 99 000 is below the salary floor, 7150 is outside both bands
    assert_eq!(valid, vec![true, true, true, true, false, false]);
}
