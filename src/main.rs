use std::process::ExitCode;

use adaptive_testing_engine::bank;
use adaptive_testing_engine::config::{EngineConfig, SimulationSettings};
use adaptive_testing_engine::engine::Engine;
use adaptive_testing_engine::error::EngineError;
use adaptive_testing_engine::logging::{init_tracing, LogSettings};
use adaptive_testing_engine::simulation::{draw_abilities, simulate_batch, SimulationSummary};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let settings = SimulationSettings::from_env();
    let _log_guard = init_tracing(&LogSettings::from_env(&settings.log_level));

    match run(&settings) {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "failed to encode summary"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &SimulationSettings) -> Result<SimulationSummary, EngineError> {
    let config = EngineConfig::from_env();
    let items = match &settings.item_bank {
        Some(path) => bank::load_items(path)?,
        None => {
            tracing::info!(
                size = settings.synthetic_bank_size,
                seed = settings.seed,
                "CAT_ITEM_BANK not set, using synthetic item bank"
            );
            bank::synthetic_bank(settings.synthetic_bank_size, settings.seed)
        }
    };

    let engine = Engine::new(config, items)?;
    let bounds = engine.config().estimation.theta_bounds;
    let abilities = draw_abilities(settings.simulees, settings.seed, bounds.min, bounds.max);

    tracing::info!(
        simulees = settings.simulees,
        items = engine.items().len(),
        "starting simulation"
    );
    let outcomes = simulate_batch(&engine, &abilities, settings.seed)?;
    let summary = SimulationSummary::from_outcomes(&outcomes);

    tracing::info!(
        simulees = summary.simulees,
        bias = summary.bias,
        rmse = summary.rmse,
        mean_length = summary.mean_length,
        "simulation finished"
    );
    Ok(summary)
}
