use chrono::{Days, NaiveDate};
use rand_distr::Poisson;
use serde::Deserialize;

use crate::{
    error::{Result, invalid},
    seasonal::SeasonalBaseline,
};

/// Weeks in one seasonal cycle of weekly surveillance data.
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// First Sunday of 2020; weekly series are stamped on Sundays from here.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 1, 5) {
    Some(date) => date,
    None => panic!("invalid default start date"),
};

/// Parameters of a point-source outbreak simulation.
///
/// Every field has a default, so a run description only needs to name the
/// parameters it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Probability of staying in an outbreak from one week to the next.
    pub p: f64,
    /// Probability of staying out of an outbreak from one week to the next.
    pub r: f64,
    /// Number of weeks to simulate. Ignored when `state` is given.
    pub length: usize,
    pub amplitude: f64,
    /// Baseline log-mean; must be at least `amplitude`.
    pub alpha: f64,
    /// Linear trend per week on the log scale.
    pub beta: f64,
    /// Phase shift in weeks.
    pub phi: f64,
    pub frequency: f64,
    /// Weeks per seasonal cycle.
    pub period: f64,
    /// Shift of the log-mean during outbreak weeks.
    pub state_weight: f64,
    /// Outbreak indicators (0/1) used instead of a generated chain.
    pub state: Option<Vec<u8>>,
    /// Whether the generated chain starts inside an outbreak.
    pub initial_outbreak: bool,
    pub start_date: NaiveDate,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            p: 0.99,
            r: 0.01,
            length: 100,
            amplitude: 1.0,
            alpha: 1.0,
            beta: 0.0,
            phi: 0.0,
            frequency: 1.0,
            period: WEEKS_PER_YEAR,
            state_weight: 0.0,
            state: None,
            initial_outbreak: false,
            start_date: DEFAULT_START_DATE,
        }
    }
}

impl SimulationConfig {
    /// Number of simulated weeks: the supplied state's length, else `length`.
    pub fn n_weeks(&self) -> usize {
        match &self.state {
            Some(state) => state.len(),
            None => self.length,
        }
    }

    /// Calendar stamp of `week`, seven days per week after `start_date`.
    pub fn week_date(&self, week: usize) -> Result<NaiveDate> {
        (week as u64)
            .checked_mul(7)
            .and_then(|days| self.start_date.checked_add_days(Days::new(days)))
            .ok_or_else(|| invalid(format!("week {week} is beyond the calendar range")))
    }

    /// Checks every constraint on the parameters. Nothing is sampled before
    /// this passes.
    pub fn validate(&self) -> Result<()> {
        let n_weeks = self.check_parameters()?;
        self.validate_rates(n_weeks, true)
    }

    /// Like `validate`, for a series in which no week is an outbreak week.
    pub fn validate_seasonal_noise(&self) -> Result<()> {
        let n_weeks = self.check_parameters()?;
        self.validate_rates(n_weeks, false)
    }

    /// Returns the number of simulated weeks once every parameter is in range.
    fn check_parameters(&self) -> Result<usize> {
        for (name, value) in [
            ("p", self.p),
            ("r", self.r),
            ("amplitude", self.amplitude),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("phi", self.phi),
            ("frequency", self.frequency),
            ("period", self.period),
            ("state_weight", self.state_weight),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        for (name, value) in [("p", self.p), ("r", self.r)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if self.amplitude < 0.0 {
            return Err(invalid(format!(
                "amplitude must be non-negative, got {}",
                self.amplitude
            )));
        }
        if self.alpha < self.amplitude {
            return Err(invalid(format!(
                "alpha ({}) must be at least amplitude ({})",
                self.alpha, self.amplitude
            )));
        }
        if self.period <= 0.0 {
            return Err(invalid(format!("period must be positive, got {}", self.period)));
        }
        match &self.state {
            Some(state) if state.is_empty() => {
                return Err(invalid("state must contain at least one week"));
            }
            Some(state) => {
                if let Some((week, value)) = state.iter().enumerate().find(|(_, v)| **v > 1) {
                    return Err(invalid(format!(
                        "state must contain only 0 or 1, got {value} at week {week}"
                    )));
                }
            }
            None if self.length == 0 => {
                return Err(invalid("length must be positive when no state is given"));
            }
            None => {}
        }

        let n_weeks = self.n_weeks();
        self.week_date(n_weeks - 1)?;
        Ok(n_weeks)
    }

    /// Every mean the run could sample from must be accepted by the Poisson
    /// sampler. Outbreak means are only checked when `with_outbreaks`.
    fn validate_rates(&self, n_weeks: usize, with_outbreaks: bool) -> Result<()> {
        let baseline = SeasonalBaseline::from_config(self);
        let reachable = self.reachable_states();
        for week in 0..n_weeks {
            let candidates = match &self.state {
                _ if !with_outbreaks => [true, false],
                Some(state) => [state[week] == 0, state[week] == 1],
                None => reachable,
            };
            for (is_outbreak, checked) in [false, true].into_iter().zip(candidates) {
                if !checked {
                    continue;
                }
                let rate = baseline.rate(week, is_outbreak);
                if rate > 0.0 {
                    Poisson::new(rate).map_err(|err| {
                        invalid(format!("mean {rate} at week {week} cannot be sampled: {err}"))
                    })?;
                } else if rate.is_nan() {
                    return Err(invalid(format!("mean at week {week} is undefined")));
                }
            }
        }
        Ok(())
    }

    /// Which latent states (no outbreak, outbreak) a generated chain can visit.
    fn reachable_states(&self) -> [bool; 2] {
        let moves = self.length > 1;
        if self.initial_outbreak {
            [moves && self.p < 1.0, true]
        } else {
            [true, moves && self.r < 1.0]
        }
    }
}
