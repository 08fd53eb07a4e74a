//! Skewed resource cost generation.
//!
//! Each query gets three costs sampled from skew-normal distributions. The
//! dimension matching the query's profile is drawn from a high, left-skewed
//! distribution; the other two from a low, right-skewed one.

use rand::distr::Distribution;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::core::Profile;

/// Parameters of the dominant dimension.
pub const DOMINANT: SkewNormal = SkewNormal::new(70.0, 15.0, -10.0);
/// Parameters of the non-dominant dimensions.
pub const BACKGROUND: SkewNormal = SkewNormal::new(30.0, 15.0, 10.0);

/// Skew-normal distribution parameterised by location, scale and shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewNormal {
    location: f64,
    scale: f64,
    skew: f64,
}

impl SkewNormal {
    /// Create a distribution. Negative `skew` leans left, positive leans right.
    #[must_use]
    pub const fn new(location: f64, scale: f64, skew: f64) -> Self {
        Self {
            location,
            scale,
            skew,
        }
    }

    /// Location (close to the mode for large `|skew|`).
    #[must_use]
    pub const fn location(&self) -> f64 {
        self.location
    }

    /// Scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Shape parameter.
    #[must_use]
    pub const fn skew(&self) -> f64 {
        self.skew
    }
}

impl Distribution<f64> for SkewNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let delta = self.skew / self.skew.mul_add(self.skew, 1.0).sqrt();
        let u: f64 = rng.sample(StandardNormal);
        let v: f64 = rng.sample(StandardNormal);
        let x = u.mul_add((1.0 - delta * delta).sqrt(), delta * v.abs());
        self.scale.mul_add(x, self.location)
    }
}

/// Simulated resource consumption of one query execution.
///
/// Values are not clamped: a rare sample can be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    /// CPU units.
    pub cpu: i64,
    /// Memory units.
    pub memory: i64,
    /// IO units.
    pub io: i64,
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value as i64
}

/// Draw a cost triple for the given profile.
pub fn generate_cost<R: Rng + ?Sized>(rng: &mut R, profile: Profile) -> ResourceCost {
    let mut draw = |dominant: bool| {
        let dist = if dominant { DOMINANT } else { BACKGROUND };
        truncate(dist.sample(rng))
    };
    ResourceCost {
        cpu: draw(profile == Profile::Cpu),
        memory: draw(profile == Profile::Memory),
        io: draw(profile == Profile::Io),
    }
}
