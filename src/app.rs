//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - ingests or synthesizes observations
//! - runs stage estimation + forecasting
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DemoArgs, FitArgs, ModelArgs, PlotArgs};
use crate::data::{Scenario, generate_observations};
use crate::domain::{EpiConfig, RatioPolicy, RunSpec};
use crate::error::AppError;
use crate::plot::Series;

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let ingest = crate::io::load_observations_path(&args.csv)?;
    for note in &ingest.notes {
        eprintln!("warning: line {}: {}", note.line, note.message);
    }
    println!(
        "Loaded {} day(s); peak daily new cases {}, final total {}",
        ingest.stats.n_days, ingest.stats.max_new_cases, ingest.stats.final_total_cases
    );

    let config = epi_config_from_args(&args.model, ingest.spec.n_days)?;
    let run = pipeline::run(&config, ingest.spec, &ingest.observations)?;
    present(&run, &config, &args.model)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let scenario = Scenario {
        population: args.model.population,
        seed: args.seed,
        noise: args.noise,
        ..Scenario::default()
    };
    let observations = generate_observations(&scenario)?;
    let spec = RunSpec {
        start_date: scenario.start_date,
        n_days: observations.len(),
    };

    // Default the stage boundaries to the scenario's true regimes so the
    // estimates are directly comparable with the ground truth.
    let mut model = args.model.clone();
    if model.stages.is_empty() {
        let bounds = scenario.stage_bounds();
        model.stages = bounds[1..bounds.len() - 1].to_vec();
    }

    let config = epi_config_from_args(&model, spec.n_days)?;
    println!("(synthetic outbreak: seed={}, noise={})", scenario.seed, scenario.noise);
    for (idx, stage) in scenario.stages.iter().enumerate() {
        println!(
            "(true stage {}: {} day(s), beta={}, gamma={})",
            idx + 1,
            stage.days,
            stage.beta,
            scenario.gamma
        );
    }
    println!();

    let run = pipeline::run(&config, spec, &observations)?;
    present(&run, &config, &model)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_forecast_json(&args.forecast)?;

    let points: Vec<(u32, f64)> = file
        .grid
        .day
        .iter()
        .zip(file.grid.infected.iter())
        .map(|(&d, &v)| (d, v))
        .collect();
    let stage_starts: Vec<u32> = file.stages.iter().map(|s| s.days.start).collect();

    println!("Forecast from {} (population {})", file.tool, file.population);
    let series = [Series { marker: '+', points: &points }];
    print!(
        "{}",
        crate::plot::render_ascii_plot(&series, &stage_starts, args.width, args.height)
    );
    Ok(())
}

/// Print the report/plot and write exports for a completed run.
fn present(run: &pipeline::RunOutput, config: &EpiConfig, model: &ModelArgs) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(&run.spec, config, &run.stages)
    );
    println!("{}", crate::report::format_forecast(&run.spec, &run.forecast));

    if model.plot && !model.no_plot {
        let observed: Vec<(u32, f64)> = run
            .observed_infected
            .iter()
            .enumerate()
            .map(|(d, &v)| ((d + 1) as u32, v))
            .collect();
        let fitted: Vec<(u32, f64)> = run
            .stages
            .iter()
            .zip(run.fitted.iter())
            .flat_map(|(stage, curve)| {
                (stage.days.start..=stage.days.end).zip(curve.iter().copied())
            })
            .collect();
        let projected: Vec<(u32, f64)> = run
            .forecast
            .infected
            .iter()
            .enumerate()
            .map(|(k, &v)| (run.spec.n_days as u32 + 1 + k as u32, v))
            .collect();

        let mut stage_starts: Vec<u32> = run.stages.iter().map(|s| s.days.start).collect();
        stage_starts.extend(run.forecast.stages.iter().map(|s| s.days.start));

        let series = [
            Series { marker: '-', points: &fitted },
            Series { marker: '+', points: &projected },
            Series { marker: 'o', points: &observed },
        ];
        print!(
            "{}",
            crate::plot::render_ascii_plot(&series, &stage_starts, model.width, model.height)
        );
    }

    if let Some(path) = &model.export {
        crate::io::write_trajectory_csv(
            path,
            &run.spec,
            &run.observed_infected,
            &run.stages,
            &run.forecast,
        )?;
    }
    if let Some(path) = &model.export_forecast {
        let file = crate::io::forecast_file(&run.spec, config.population, &run.forecast);
        crate::io::write_forecast_json(path, &file)?;
    }

    Ok(())
}

/// Build the run configuration from CLI flags plus the observed day count.
pub fn epi_config_from_args(model: &ModelArgs, n_days: usize) -> Result<EpiConfig, AppError> {
    if model.horizon <= n_days {
        return Err(AppError::new(
            2,
            format!(
                "forecast horizon {} must exceed the observed day count {n_days}",
                model.horizon
            ),
        ));
    }

    let mut stage_bounds = Vec::with_capacity(model.stages.len() + 2);
    stage_bounds.push(0);
    stage_bounds.extend_from_slice(&model.stages);
    stage_bounds.push(n_days);

    let mut future_bounds = Vec::with_capacity(model.future_stages.len() + 2);
    future_bounds.push(n_days);
    future_bounds.extend_from_slice(&model.future_stages);
    future_bounds.push(model.horizon);

    let ratio_policy = match model.beta_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => RatioPolicy::Fixed(ratio),
        Some(ratio) => {
            return Err(AppError::new(2, format!("beta ratio must be finite and > 0, got {ratio}")));
        }
        None => RatioPolicy::FromHistory {
            event_index: model.event_index,
        },
    };

    Ok(EpiConfig {
        population: model.population,
        recovery_lag: model.duration,
        stage_bounds,
        future_bounds,
        ratio_policy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_args() -> ModelArgs {
        ModelArgs {
            population: 1_000_000,
            duration: 14,
            stages: vec![94, 109],
            horizon: 365,
            future_stages: vec![289],
            beta_ratio: None,
            event_index: 2,
            plot: true,
            no_plot: false,
            width: 100,
            height: 25,
            export: None,
            export_forecast: None,
        }
    }

    #[test]
    fn config_wraps_interior_boundaries() {
        let config = epi_config_from_args(&model_args(), 250).unwrap();
        assert_eq!(config.stage_bounds, vec![0, 94, 109, 250]);
        assert_eq!(config.future_bounds, vec![250, 289, 365]);
        assert!(matches!(
            config.ratio_policy,
            RatioPolicy::FromHistory { event_index: 2 }
        ));
    }

    #[test]
    fn explicit_beta_ratio_selects_fixed_policy() {
        let mut args = model_args();
        args.beta_ratio = Some(0.8);
        let config = epi_config_from_args(&args, 250).unwrap();
        assert!(matches!(config.ratio_policy, RatioPolicy::Fixed(r) if r == 0.8));
    }

    #[test]
    fn horizon_must_exceed_observed_days() {
        let mut args = model_args();
        args.horizon = 100;
        let err = epi_config_from_args(&args, 250).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn non_positive_beta_ratio_is_rejected() {
        let mut args = model_args();
        args.beta_ratio = Some(0.0);
        assert!(epi_config_from_args(&args, 250).is_err());
    }
}
