//! A single scale step.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::line::DegreeToken;

/// One pitch step of a scale: a frequency ratio relative to 1/1 plus the
/// text it was written as.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleDegree {
    ratio: f64,
    description: String,
}

impl ScaleDegree {
    /// The implicit 1/1 that starts every scale.
    pub fn unison() -> Self {
        Self {
            ratio: 1.0,
            description: "1".to_string(),
        }
    }

    /// Build a degree from an integer ratio. A zero denominator keeps the
    /// float division result (`inf` or `NaN`).
    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            warn!("scale degree {}/0 has a zero denominator", numerator);
        }

        let description = if denominator == 1 {
            numerator.to_string()
        } else {
            format!("{}/{}", numerator, denominator)
        };

        Self {
            ratio: numerator as f64 / denominator as f64,
            description,
        }
    }

    /// Build a degree from a cents value (1200 cents per octave).
    pub fn from_cents(cents: f64) -> Self {
        if cents.abs() < f64::EPSILON {
            return Self::unison();
        }

        let ratio = 2.0_f64.powf(cents / 1200.0);
        Self {
            ratio,
            description: ratio.to_string(),
        }
    }

    /// Frequency ratio relative to 1/1.
    pub fn get_ratio(&self) -> f64 {
        self.ratio
    }

    /// Display text for this degree.
    pub fn get_desc(&self) -> &str {
        &self.description
    }

    /// Replace the display text. The ratio is unaffected.
    pub fn set_desc(&mut self, desc: impl Into<String>) {
        self.description = desc.into();
    }

    /// Size of this degree in cents.
    pub fn cents(&self) -> f64 {
        1200.0 * self.ratio.log2()
    }
}

impl From<DegreeToken> for ScaleDegree {
    fn from(token: DegreeToken) -> Self {
        match token {
            DegreeToken::Cents(cents) => Self::from_cents(cents),
            DegreeToken::Ratio(num, den) => Self::from_ratio(num, den),
            DegreeToken::IntegerRatio(n) => Self::from_ratio(n, 1),
        }
    }
}
