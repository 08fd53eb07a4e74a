//! Per-tick probabilistic admission of catalog queries.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::core::SimError;

/// Admission probabilities indexed in parallel with the query catalog.
///
/// Probabilities are drawn from `Exp(n)` so the expected admission mass per
/// tick across all `n` queries is about one.
#[derive(Debug, Clone, Default)]
pub struct AdmissionSampler {
    probabilities: Vec<f64>,
}

impl AdmissionSampler {
    /// Draw `n` probabilities from an exponential distribution with rate `n`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` when `n` is zero.
    pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self, SimError> {
        if n == 0 {
            return Err(SimError::InvalidConfig(
                "admission table must not be empty".into(),
            ));
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = n as f64;
        let exp = Exp::new(rate)
            .map_err(|e| SimError::InvalidConfig(format!("admission rate {rate}: {e}")))?;
        let probabilities = (0..n).map(|_| exp.sample(rng)).collect();
        Ok(Self { probabilities })
    }

    /// Use a fixed probability table.
    #[must_use]
    pub const fn from_probabilities(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    /// Table length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True when no probabilities are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Per-query probabilities.
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Run one independent Bernoulli trial per index with `p = prob * scalar`
    /// and return the admitted indices in table order.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R, scalar: f64) -> Vec<usize> {
        self.probabilities
            .iter()
            .enumerate()
            .filter(|&(_, &p)| rng.random::<f64>() < p * scalar)
            .map(|(i, _)| i)
            .collect()
    }
}
