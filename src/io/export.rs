//! Result exports: per-day trajectory CSV and forecast JSON.
//!
//! The JSON forecast file round-trips through `epi plot`, so reading lives
//! here next to writing.

use std::fs::File;
use std::path::Path;

use crate::domain::{Forecast, ForecastFile, ForecastFileStage, ForecastGrid, RunSpec, StageEstimate};
use crate::error::AppError;

/// Write the combined historical + projected infected trajectory as CSV.
///
/// Columns: `day,date,observed_infected,smoothed_infected,projected_infected`.
/// Cells outside a series' day range are left empty.
pub fn write_trajectory_csv(
    path: &Path,
    spec: &RunSpec,
    observed: &[f64],
    stages: &[StageEstimate],
    forecast: &Forecast,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(3, format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record([
            "day",
            "date",
            "observed_infected",
            "smoothed_infected",
            "projected_infected",
        ])
        .map_err(|e| AppError::new(3, format!("CSV write error: {e}")))?;

    let smoothed: Vec<f64> = stages
        .iter()
        .flat_map(|s| s.sir.iter().map(|st| st.i))
        .collect();

    for (d, &obs) in observed.iter().enumerate() {
        let day = (d + 1) as u32;
        let smooth = smoothed
            .get(d)
            .map(|v| format!("{v}"))
            .unwrap_or_default();
        writer
            .write_record([
                day.to_string(),
                spec.date_of(day).to_string(),
                format!("{obs}"),
                smooth,
                String::new(),
            ])
            .map_err(|e| AppError::new(3, format!("CSV write error: {e}")))?;
    }

    let mut day = spec.n_days as u32;
    for value in &forecast.infected {
        day += 1;
        writer
            .write_record([
                day.to_string(),
                spec.date_of(day).to_string(),
                String::new(),
                String::new(),
                format!("{value}"),
            ])
            .map_err(|e| AppError::new(3, format!("CSV write error: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(3, format!("CSV write error: {e}")))?;
    Ok(())
}

/// Assemble the serializable forecast file.
pub fn forecast_file(spec: &RunSpec, population: u64, forecast: &Forecast) -> ForecastFile {
    let mut day_axis = Vec::with_capacity(forecast.infected.len());
    let mut day = spec.n_days as u32;
    for _ in &forecast.infected {
        day += 1;
        day_axis.push(day);
    }

    ForecastFile {
        tool: format!("epi-curves {}", env!("CARGO_PKG_VERSION")),
        start_date: spec.start_date,
        population,
        stages: forecast
            .stages
            .iter()
            .map(|s| ForecastFileStage {
                days: s.days,
                coefficients: s.coefficients,
            })
            .collect(),
        grid: ForecastGrid {
            day: day_axis,
            infected: forecast.infected.clone(),
        },
    }
}

/// Write the forecast JSON.
pub fn write_forecast_json(path: &Path, file: &ForecastFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(3, format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(3, format!("JSON write error: {e}")))
}

/// Read a forecast JSON previously written by `write_forecast_json`.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(3, format!("Failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(3, format!("Invalid forecast JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, DayRange, ForecastStage, SirState};
    use chrono::NaiveDate;

    fn tiny_forecast() -> Forecast {
        let c = Coefficients { beta: 0.2, gamma: 0.1, r0: 2.0 };
        Forecast {
            stages: vec![ForecastStage {
                days: DayRange::new(4, 6),
                coefficients: c,
                infected: vec![10.0, 11.0, 12.0],
                final_state: SirState::new(980.0, 12.0, 8.0),
            }],
            infected: vec![10.0, 11.0, 12.0],
        }
    }

    #[test]
    fn forecast_file_extends_the_day_axis() {
        let spec = RunSpec {
            start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            n_days: 3,
        };
        let file = forecast_file(&spec, 1000, &tiny_forecast());

        assert_eq!(file.grid.day, vec![4, 5, 6]);
        assert_eq!(file.grid.infected.len(), 3);
        assert_eq!(file.stages.len(), 1);
        assert_eq!(file.population, 1000);
    }

    #[test]
    fn forecast_file_round_trips_through_json() {
        let spec = RunSpec {
            start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            n_days: 3,
        };
        let file = forecast_file(&spec, 1000, &tiny_forecast());

        let json = serde_json::to_string(&file).unwrap();
        let back: ForecastFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grid.day, file.grid.day);
        assert_eq!(back.stages[0].days, file.stages[0].days);
        assert_eq!(back.start_date, file.start_date);
    }
}
