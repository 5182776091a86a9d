//! Plain-text rendering for terminal output.

use std::fmt::Write;

use overtime_core::{OvertimeResult, TaxYearRates, ValidationReport};
use rust_decimal::Decimal;

fn percent(rate: Decimal) -> String {
    format!("{:.1} %", rate * Decimal::ONE_HUNDRED)
}

fn kr(amount: Decimal) -> String {
    format!("{:.2} kr", amount)
}

/// Overtime result as a labelled table. The preferred view is listed first.
pub fn render_result(
    result: &OvertimeResult,
    withholding_first: bool,
) -> String {
    let actual = [
        ("Tax on overtime (actual)", kr(result.tax_on_overtime_actual)),
        ("Take-home (actual)", kr(result.take_home_actual)),
        ("Effective rate (actual)", percent(result.effective_rate_actual)),
    ];
    let withholding = [
        (
            "Tax on overtime (withheld)",
            kr(result.tax_on_overtime_withholding),
        ),
        ("Take-home (withheld)", kr(result.take_home_withholding)),
        (
            "Effective rate (withheld)",
            percent(result.effective_rate_withholding),
        ),
    ];
    let (first, second) = if withholding_first {
        (withholding, actual)
    } else {
        (actual, withholding)
    };

    let mut rows = vec![
        ("Tax year", result.tax_year.to_string()),
        (
            "Table",
            format!(
                "{} ({})",
                result.table_code,
                result.table_code.kind().as_str()
            ),
        ),
        ("Base hourly rate", kr(result.base_hourly_rate)),
        ("Overtime hourly rate", kr(result.overtime_hourly_rate)),
        ("Gross overtime pay", kr(result.gross_overtime_pay)),
    ];
    rows.extend(first);
    rows.extend(second);
    rows.push(("Estimated refund", kr(result.estimated_refund)));

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<width$}  {value:>16}");
    }
    out
}

pub fn render_rates(rates: &TaxYearRates) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tax year {}", rates.tax_year);
    let _ = writeln!(out, "  Bracket tax");
    let mut floor = Decimal::ZERO;
    for bracket in &rates.brackets {
        let ceiling = bracket
            .ceiling
            .amount()
            .map_or_else(String::new, |ceiling| ceiling.to_string());
        let _ = writeln!(
            out,
            "    {:>10} - {:>10}  {:>7}",
            floor,
            ceiling,
            percent(bracket.rate)
        );
        if let Some(ceiling) = bracket.ceiling.amount() {
            floor = ceiling;
        }
    }
    let _ = writeln!(
        out,
        "  National insurance  {} above {}",
        percent(rates.national_insurance.rate),
        rates.national_insurance.exemption_threshold
    );
    let _ = writeln!(
        out,
        "  General income tax  {}",
        percent(rates.general_income_tax.rate)
    );
    let _ = writeln!(
        out,
        "  Standard deduction  {} ({} - {})",
        percent(rates.standard_deduction.rate),
        rates.standard_deduction.floor,
        rates.standard_deduction.ceiling
    );
    let _ = writeln!(out, "  Personal allowance  {}", rates.personal_allowance);
    let _ = writeln!(out, "  Withholding periods {}", rates.withholding_periods);
    out
}

pub fn render_validation(report: &ValidationReport) -> String {
    let mut out = String::new();
    if report.valid {
        let _ = writeln!(out, "valid");
    } else {
        let _ = writeln!(out, "invalid");
    }
    for error in &report.errors {
        let _ = writeln!(out, "  error: {error}");
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "  warning: {warning}");
    }
    out
}
