//! Report formatting.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{EpiConfig, Forecast, RunSpec, StageEstimate};

/// Format the run summary: dataset facts plus the per-stage coefficient table.
pub fn format_run_summary(
    spec: &RunSpec,
    config: &EpiConfig,
    stages: &[StageEstimate],
) -> String {
    let mut out = String::new();

    out.push_str("=== epi - SIR stage estimation ===\n");
    out.push_str(&format!("Population: {}\n", config.population));
    out.push_str(&format!("Recovery lag: {} day(s)\n", config.recovery_lag));
    out.push_str(&format!(
        "Observed: {} day(s) starting {}\n",
        spec.n_days, spec.start_date
    ));

    out.push_str("\nHistorical stages:\n");
    out.push_str(&stage_table_header());
    let mut prev_r0: Option<f64> = None;
    for (idx, stage) in stages.iter().enumerate() {
        out.push_str(&stage_row(
            idx + 1,
            spec,
            stage.days.start,
            stage.days.end,
            stage.coefficients.beta,
            stage.coefficients.gamma,
            stage.coefficients.r0,
            prev_r0,
        ));
        prev_r0 = Some(stage.coefficients.r0);
    }

    out
}

/// Format the forecast: per-future-stage coefficients plus headline numbers.
pub fn format_forecast(spec: &RunSpec, forecast: &Forecast) -> String {
    let mut out = String::new();

    out.push_str("\n=== Prediction ===\n");
    out.push_str(&stage_table_header());

    let mut prev_r0: Option<f64> = None;
    for (idx, stage) in forecast.stages.iter().enumerate() {
        out.push_str(&stage_row(
            idx + 1,
            spec,
            stage.days.start,
            stage.days.end,
            stage.coefficients.beta,
            stage.coefficients.gamma,
            stage.coefficients.r0,
            prev_r0,
        ));
        prev_r0 = Some(stage.coefficients.r0);
    }

    if let Some(peak) = forecast
        .infected
        .iter()
        .copied()
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))))
    {
        out.push_str(&format!("\nProjected peak infected: {peak:.0}\n"));
    }
    if let Some(last) = forecast.infected.last() {
        out.push_str(&format!("Projected infected at horizon: {last:.0}\n"));
    }

    out
}

fn stage_table_header() -> String {
    format!(
        "{:<6} {:<10} {:<24} {:>9} {:>9} {:>8} {:>8}\n{:-<6} {:-<10} {:-<24} {:-<9} {:-<9} {:-<8} {:-<8}\n",
        "stage", "days", "dates", "beta", "gamma", "R", "prev R", "", "", "", "", "", "", ""
    )
}

#[allow(clippy::too_many_arguments)]
fn stage_row(
    idx: usize,
    spec: &RunSpec,
    start: u32,
    end: u32,
    beta: f64,
    gamma: f64,
    r0: f64,
    prev_r0: Option<f64>,
) -> String {
    let dates = format!("{} .. {}", spec.date_of(start), spec.date_of(end));
    let prev = prev_r0.map(|r| format!("{r:.3}")).unwrap_or_else(|| "-".to_string());
    format!(
        "{:<6} {:<10} {:<24} {:>9.4} {:>9.4} {:>8.3} {:>8}\n",
        idx,
        format!("{start}-{end}"),
        dates,
        beta,
        gamma,
        r0,
        prev
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, DayRange, RatioPolicy, SirState, StageEstimate};
    use crate::models::ExpTrend;
    use chrono::NaiveDate;

    fn spec() -> RunSpec {
        RunSpec {
            start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            n_days: 20,
        }
    }

    fn config() -> EpiConfig {
        EpiConfig {
            population: 1_000_000,
            recovery_lag: 14,
            stage_bounds: vec![0, 10, 20],
            future_bounds: vec![20, 30],
            ratio_policy: RatioPolicy::Fixed(1.0),
        }
    }

    fn stages() -> Vec<StageEstimate> {
        vec![
            StageEstimate {
                days: DayRange::new(1, 10),
                trend: ExpTrend { a: 4.0, b: 0.1 },
                sir: vec![SirState::new(999.0, 1.0, 0.0)],
                coefficients: Coefficients { beta: 0.4, gamma: 0.1, r0: 4.0 },
            },
            StageEstimate {
                days: DayRange::new(11, 20),
                trend: ExpTrend { a: 4.0, b: 0.05 },
                sir: vec![SirState::new(990.0, 8.0, 2.0)],
                coefficients: Coefficients { beta: 0.2, gamma: 0.1, r0: 2.0 },
            },
        ]
    }

    #[test]
    fn run_summary_lists_every_stage_with_dates() {
        let out = format_run_summary(&spec(), &config(), &stages());
        assert!(out.contains("Population: 1000000"));
        assert!(out.contains("1-10"));
        assert!(out.contains("11-20"));
        assert!(out.contains("2020-03-01"));
        assert!(out.contains("2020-03-20"));
        // Second row shows the first stage's R as "prev R".
        assert!(out.contains("4.000"));
    }

    #[test]
    fn forecast_report_includes_headline_numbers() {
        let forecast = Forecast {
            stages: vec![crate::domain::ForecastStage {
                days: DayRange::new(21, 30),
                coefficients: Coefficients { beta: 0.2, gamma: 0.1, r0: 2.0 },
                infected: vec![10.0, 25.0, 18.0],
                final_state: SirState::new(900.0, 18.0, 82.0),
            }],
            infected: vec![10.0, 25.0, 18.0],
        };
        let out = format_forecast(&spec(), &forecast);
        assert!(out.contains("Projected peak infected: 25"));
        assert!(out.contains("Projected infected at horizon: 18"));
    }
}
