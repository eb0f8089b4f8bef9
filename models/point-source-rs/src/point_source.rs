use rand::{RngCore, SeedableRng, TryRngCore, distr::Distribution, rngs::StdRng};
use rand_distr::Poisson;
use tracing::debug;

use crate::{
    error::{Result, invalid},
    latent::{LatentState, MarkovChain},
    output::{SimulationResult, WeekRecord},
    parameters::SimulationConfig,
    seasonal::SeasonalBaseline,
    source::CheckedSource,
};

pub struct OutbreakSimulator {}

impl OutbreakSimulator {
    /// Simulates one point-source outbreak series with a caller-owned
    /// random source.
    pub fn simulate<R: TryRngCore + ?Sized>(
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        config.validate()?;
        let mut source = CheckedSource::new(rng);

        let state = match &config.state {
            Some(values) => {
                if values.len() != config.length {
                    debug!(
                        length = config.length,
                        weeks = values.len(),
                        "supplied state overrides length"
                    );
                }
                LatentState::from_indicators(values)?
            }
            None => {
                let chain = MarkovChain::new(config.p, config.r)?;
                let state =
                    LatentState::generate(&chain, config.length, config.initial_outbreak, &mut source);
                source.check()?;
                state
            }
        };

        let result = Self::draw_cases(config, &state, &mut source)?;
        debug!(
            weeks = result.len(),
            outbreak_weeks = result.outbreak_weeks(),
            episodes = result.outbreak_episodes().len(),
            total_cases = result.total_cases(),
            "simulated point-source outbreaks"
        );
        Ok(result)
    }

    /// Simulates with a generator dedicated to this run.
    pub fn simulate_seeded(config: &SimulationConfig, seed: u64) -> Result<SimulationResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::simulate(config, &mut rng)
    }

    /// Simulates the seasonal baseline alone: every week is outside an
    /// outbreak and no chain is drawn.
    pub fn simulate_seasonal_noise<R: TryRngCore + ?Sized>(
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        config.validate_seasonal_noise()?;
        let mut source = CheckedSource::new(rng);
        let state = LatentState::quiet(config.n_weeks());
        let result = Self::draw_cases(config, &state, &mut source)?;
        debug!(
            weeks = result.len(),
            total_cases = result.total_cases(),
            "simulated seasonal noise"
        );
        Ok(result)
    }

    fn draw_cases<R: TryRngCore + ?Sized>(
        config: &SimulationConfig,
        state: &LatentState,
        source: &mut CheckedSource<'_, R>,
    ) -> Result<SimulationResult> {
        let baseline = SeasonalBaseline::from_config(config);
        let mut records = Vec::with_capacity(state.len());
        for (week, is_outbreak) in state.iter().enumerate() {
            let mean = baseline.rate(week, is_outbreak);
            let raw_cases = if mean > 0.0 {
                let poisson = Poisson::new(mean).map_err(|err| {
                    invalid(format!("mean {mean} at week {week} cannot be sampled: {err}"))
                })?;
                sample_count(&poisson, source)
            } else {
                // Poisson requires non-zero rate
                0
            };
            source.check()?;
            records.push(WeekRecord::new(
                week,
                config.week_date(week)?,
                mean,
                raw_cases,
                is_outbreak,
            ));
        }
        Ok(SimulationResult::new(records))
    }
}

fn sample_count<R: RngCore + ?Sized>(poisson: &Poisson<f64>, rng: &mut R) -> u64 {
    poisson.sample(rng) as u64
}

#[cfg(test)]
mod test {
    use rand::{SeedableRng, rngs::StdRng};

    use crate::{
        error::Error,
        parameters::SimulationConfig,
        point_source::OutbreakSimulator,
        source::test::FiniteSource,
    };

    fn flat_config() -> SimulationConfig {
        SimulationConfig {
            p: 0.99,
            r: 0.01,
            length: 10,
            amplitude: 0.0,
            alpha: 2.0,
            beta: 0.0,
            phi: 0.0,
            frequency: 1.0,
            state_weight: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_flat_mean_scenario() {
        let result = OutbreakSimulator::simulate_seeded(&flat_config(), 8675309).unwrap();
        assert_eq!(result.len(), 10);
        for mean in result.means() {
            assert!(f64::abs(mean - 7.389056) < 1e-6);
        }
    }

    #[test]
    fn test_poisson_mean() {
        let config = SimulationConfig {
            length: 20_000,
            ..flat_config()
        };
        let result = OutbreakSimulator::simulate_seeded(&config, 8675308).unwrap();
        let average = result.total_cases() as f64 / result.len() as f64;
        assert!(f64::abs(average - 2f64.exp()) < 0.1);
    }

    #[test]
    fn test_supplied_state_passes_through() {
        let config = SimulationConfig {
            length: 100,
            state: Some(vec![0, 0, 1, 1, 0]),
            state_weight: 1.0,
            ..Default::default()
        };
        let result = OutbreakSimulator::simulate_seeded(&config, 1).unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(result.is_outbreak(), vec![0, 0, 1, 1, 0]);
        assert_eq!(result.outbreak_episodes(), vec![2..4]);
    }

    #[test]
    fn test_length_matches_config() {
        for length in [1, 7, 52, 300] {
            let config = SimulationConfig {
                length,
                ..Default::default()
            };
            let result = OutbreakSimulator::simulate_seeded(&config, length as u64).unwrap();
            assert_eq!(result.len(), length);
        }
    }

    #[test]
    fn test_outbreak_cases_invariant() {
        let config = SimulationConfig {
            p: 0.8,
            r: 0.7,
            length: 500,
            state_weight: 2.0,
            ..Default::default()
        };
        let result = OutbreakSimulator::simulate_seeded(&config, 42).unwrap();
        assert!(result.outbreak_weeks() > 0);
        assert!(result.outbreak_weeks() < result.len());
        for record in result.records() {
            if record.is_outbreak {
                assert_eq!(record.n_outbreak_cases, record.raw_cases);
            } else {
                assert_eq!(record.n_outbreak_cases, 0);
            }
            assert!(record.mean > 0.0);
        }
    }

    #[test]
    fn test_absorbing_outbreak() {
        let config = SimulationConfig {
            p: 1.0,
            r: 1.0,
            length: 200,
            initial_outbreak: true,
            ..Default::default()
        };
        let result = OutbreakSimulator::simulate_seeded(&config, 3).unwrap();
        assert!(result.is_outbreak().iter().all(|s| *s == 1));
        assert_eq!(result.outbreak_episodes(), vec![0..200]);
    }

    #[test]
    fn test_starts_outside_outbreak() {
        let config = SimulationConfig {
            r: 0.0,
            ..Default::default()
        };
        for seed in 0..20 {
            let result = OutbreakSimulator::simulate_seeded(&config, seed).unwrap();
            assert_eq!(result.is_outbreak()[0], 0);
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let config = SimulationConfig {
            p: 0.9,
            r: 0.9,
            length: 150,
            state_weight: 1.0,
            ..Default::default()
        };
        let first = OutbreakSimulator::simulate_seeded(&config, 1234).unwrap();
        let second = OutbreakSimulator::simulate_seeded(&config, 1234).unwrap();
        assert_eq!(first.raw_cases(), second.raw_cases());
        assert_eq!(first, second);

        let mut rng = StdRng::seed_from_u64(1234);
        let owned = OutbreakSimulator::simulate(&config, &mut rng).unwrap();
        assert_eq!(owned, first);
    }

    #[test]
    fn test_weekly_dates() {
        let result = OutbreakSimulator::simulate_seeded(&flat_config(), 0).unwrap();
        let dates = result.dates();
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 7);
        }
        assert_eq!(dates[0], flat_config().start_date);
    }

    #[test]
    fn test_seasonal_noise_has_no_outbreaks() {
        let config = SimulationConfig {
            length: 104,
            state_weight: 3.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(99);
        let result = OutbreakSimulator::simulate_seasonal_noise(&config, &mut rng).unwrap();
        assert_eq!(result.len(), 104);
        assert_eq!(result.outbreak_weeks(), 0);
        assert!(result.n_outbreak_cases().iter().all(|n| *n == 0));
    }

    #[test]
    fn test_seasonal_noise_with_unsampleable_outbreak_weight() {
        let config = SimulationConfig {
            amplitude: 0.0,
            state_weight: 800.0,
            length: 10,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let result = OutbreakSimulator::simulate_seasonal_noise(&config, &mut rng).unwrap();
        assert_eq!(result.len(), 10);
        assert!(result.means().iter().all(|m| f64::abs(m - 1f64.exp()) < 1e-12));
        assert!(OutbreakSimulator::simulate_seeded(&config, 5).is_err());
    }

    #[test]
    fn test_invalid_config_draws_nothing() {
        let config = SimulationConfig {
            amplitude: 2.0,
            alpha: 1.0,
            ..Default::default()
        };
        let mut source = FiniteSource { remaining: 5 };
        let result = OutbreakSimulator::simulate(&config, &mut source);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
        assert_eq!(source.remaining, 5);
    }

    #[test]
    fn test_failing_source_during_chain() {
        let mut source = FiniteSource { remaining: 3 };
        let result = OutbreakSimulator::simulate(&flat_config(), &mut source);
        assert!(matches!(result, Err(Error::RandomSource(_))));
    }

    #[test]
    fn test_failing_source_during_draw() {
        let config = SimulationConfig {
            state: Some(vec![0, 1, 0]),
            ..flat_config()
        };
        let mut source = FiniteSource { remaining: 0 };
        let result = OutbreakSimulator::simulate(&config, &mut source);
        assert!(matches!(result, Err(Error::RandomSource(_))));
    }
}
