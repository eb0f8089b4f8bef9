use std::f64::consts::TAU;

use crate::parameters::SimulationConfig;

/// Sinusoidal log-linear baseline of expected weekly case counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalBaseline {
    pub amplitude: f64,
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
    pub frequency: f64,
    pub period: f64,
    pub state_weight: f64,
}

impl SeasonalBaseline {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            amplitude: config.amplitude,
            alpha: config.alpha,
            beta: config.beta,
            phi: config.phi,
            frequency: config.frequency,
            period: config.period,
            state_weight: config.state_weight,
        }
    }

    pub fn log_mean(&self, week: usize) -> f64 {
        let t = week as f64;
        let season = (self.frequency * TAU * (t + self.phi) / self.period).sin();
        self.alpha + self.beta * t + self.amplitude * season
    }

    /// Expected count at `week` without any outbreak.
    pub fn mean(&self, week: usize) -> f64 {
        self.log_mean(week).exp()
    }

    /// Mean the week's count is drawn from. Outbreak weeks shift the
    /// log-mean by `state_weight`.
    pub fn rate(&self, week: usize, outbreak: bool) -> f64 {
        if outbreak {
            (self.log_mean(week) + self.state_weight).exp()
        } else {
            self.mean(week)
        }
    }
}
