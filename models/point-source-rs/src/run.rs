use pointsource_run::Environment;
use tracing::info;

use crate::{
    error::{Result, invalid},
    output::{COLUMNS, SimulationResult},
    parameters::SimulationConfig,
    point_source::OutbreakSimulator,
};

pub const OUTPUT_FILENAME: &str = "point_source.csv";

/// Simulates the environment's input with its seed and writes the weekly
/// table to the environment's output.
pub fn run(env: &Environment<SimulationConfig>) -> Result<SimulationResult> {
    let config = env
        .input
        .as_ref()
        .ok_or_else(|| invalid("run environment has no simulation input"))?;
    let result = OutbreakSimulator::simulate_seeded(config, env.seed)?;
    info!(
        seed = env.seed,
        replicate = env.replicate,
        weeks = result.len(),
        "simulation run complete"
    );
    env.write_csv(OUTPUT_FILENAME, &COLUMNS, &result.to_rows())?;
    Ok(result)
}

/// Types the environment's input as a `SimulationConfig`. Input that does
/// not fit the parameter types (a negative `length`, a state value outside
/// 0..=255) is an invalid parameter like any other.
pub fn load_config(env: Environment) -> Result<Environment<SimulationConfig>> {
    env.with_input_type::<SimulationConfig>()
        .map_err(|err| match err {
            pointsource_run::Error::Input(err) => invalid(format!("simulation input: {err}")),
            other => other.into(),
        })
}

/// Reads the run description from stdin, then `run`s it.
pub fn run_from_stdin() -> Result<SimulationResult> {
    let env = load_config(Environment::from_stdin()?)?;
    run(&env)
}
