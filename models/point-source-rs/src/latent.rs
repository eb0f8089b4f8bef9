use rand::Rng;

use crate::error::{Result, invalid};

/// Two-state weekly chain: outbreak (`true`) or no outbreak (`false`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkovChain {
    pub stay_in_outbreak: f64,
    pub stay_out_of_outbreak: f64,
}

impl MarkovChain {
    pub fn new(stay_in_outbreak: f64, stay_out_of_outbreak: f64) -> Result<Self> {
        for (name, value) in [("p", stay_in_outbreak), ("r", stay_out_of_outbreak)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        Ok(Self {
            stay_in_outbreak,
            stay_out_of_outbreak,
        })
    }

    /// Draws next week's state with one uniform draw.
    pub fn next_state<R: Rng + ?Sized>(&self, current: bool, rng: &mut R) -> bool {
        let u: f64 = rng.random();
        if current {
            u < self.stay_in_outbreak
        } else {
            u >= self.stay_out_of_outbreak
        }
    }

    /// Long-run fraction of weeks spent in an outbreak, if the chain mixes.
    pub fn stationary_outbreak_fraction(&self) -> Option<f64> {
        let leave_outbreak = 1.0 - self.stay_in_outbreak;
        let enter_outbreak = 1.0 - self.stay_out_of_outbreak;
        let total = leave_outbreak + enter_outbreak;
        (total > 0.0).then(|| enter_outbreak / total)
    }
}

/// Week-by-week outbreak indicators of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatentState(Vec<bool>);

impl LatentState {
    pub fn generate<R: Rng + ?Sized>(
        chain: &MarkovChain,
        length: usize,
        initial_outbreak: bool,
        rng: &mut R,
    ) -> Self {
        let mut states = Vec::with_capacity(length);
        let mut current = initial_outbreak;
        for week in 0..length {
            if week > 0 {
                current = chain.next_state(current, rng);
            }
            states.push(current);
        }
        Self(states)
    }

    pub fn from_indicators(values: &[u8]) -> Result<Self> {
        values
            .iter()
            .enumerate()
            .map(|(week, value)| match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(invalid(format!(
                    "state must contain only 0 or 1, got {other} at week {week}"
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// All weeks outside an outbreak.
    pub fn quiet(length: usize) -> Self {
        Self(vec![false; length])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, week: usize) -> Option<bool> {
        self.0.get(week).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn outbreak_weeks(&self) -> usize {
        self.0.iter().filter(|s| **s).count()
    }
}
