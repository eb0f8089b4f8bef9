//! Point-source outbreak simulation.
//!
//! Weekly case counts are Poisson draws around a seasonal log-linear
//! baseline. A hidden two-state chain marks outbreak weeks, whose log-mean
//! is shifted by `state_weight`.

pub mod error;
pub mod latent;
pub mod output;
pub mod parameters;
pub mod point_source;
pub mod run;
pub mod seasonal;
mod source;

pub use error::{Error, Result};
pub use latent::{LatentState, MarkovChain};
pub use output::{COLUMNS, SimulationResult, WeekRecord};
pub use parameters::{DEFAULT_START_DATE, SimulationConfig, WEEKS_PER_YEAR};
pub use point_source::OutbreakSimulator;
pub use seasonal::SeasonalBaseline;
