use std::io::Read;

use overtime_core::ScenarioInput;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when reading a scenario batch.
#[derive(Debug, Error)]
pub enum ScenarioLoaderError {
    #[error("CSV parse error on line {line}: {message}")]
    CsvParse { line: u64, message: String },
}

/// One row of a scenario batch file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ScenarioRecord {
    annual_salary: Decimal,
    overtime_hours: Decimal,
    table_code: i32,
    tax_year: i32,
}

impl From<ScenarioRecord> for ScenarioInput {
    fn from(record: ScenarioRecord) -> Self {
        ScenarioInput {
            annual_salary: record.annual_salary,
            overtime_hours: record.overtime_hours,
            table_code: record.table_code,
            tax_year: record.tax_year,
        }
    }
}

/// Reads `annual_salary,overtime_hours,table_code,tax_year` rows.
///
/// Table codes and years are not checked here; batch runs validate each row
/// separately so one bad row does not hide the others.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScenarioInput>, ScenarioLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut inputs = Vec::new();

        for result in csv_reader.deserialize::<ScenarioRecord>() {
            let record = result.map_err(|err| ScenarioLoaderError::CsvParse {
                line: err.position().map_or(0, |pos| pos.line()),
                message: err.to_string(),
            })?;
            inputs.push(ScenarioInput::from(record));
        }

        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_scenarios() {
        let csv = "annual_salary,overtime_hours,table_code,tax_year\n900000,10,8115,2026\n640000, 7.5 ,8050,2026\n";

        let inputs = ScenarioLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(inputs, vec![
            ScenarioInput {
                annual_salary: dec!(900000),
                overtime_hours: dec!(10),
                table_code: 8115,
                tax_year: 2026,
            },
            ScenarioInput {
                annual_salary: dec!(640000),
                overtime_hours: dec!(7.5),
                table_code: 8050,
                tax_year: 2026,
            },
        ]);
    }

    #[test]
    fn test_unsupported_table_code_is_kept() {
        let csv = "annual_salary,overtime_hours,table_code,tax_year\n900000,10,7150,2026\n";

        let inputs = ScenarioLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(inputs[0].table_code, 7150);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let csv = "annual_salary,overtime_hours,table_code,tax_year\n900000,10,8115,2026\nlots,10,8115,2026\n";

        let err = ScenarioLoader::parse(csv.as_bytes()).unwrap_err();

        let ScenarioLoaderError::CsvParse { line, .. } = err;
        assert_eq!(line, 3);
    }
}
