//! Mass → radius normalization policies
//!
//! Each policy is a pure function of a particle's mass and the mass range of
//! the whole snapshot. Uniform-mass input is not the policy's concern: the
//! mapper routes it through [`UniformMass`] before a policy ever divides.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::data::MassRange;
use super::error::{MapError, MapResult};

pub const DEFAULT_SCALE: f64 = 2.0;
pub const DEFAULT_DIVISOR: f64 = 1000.0;
pub const DEFAULT_MIN_RADIUS: f64 = 100.0;
pub const DEFAULT_K: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    /// `mass / max * scale`
    LinearToMax { scale: f64 },
    /// `mass / max * divisor`
    LinearToGlobalMaxScaled { divisor: f64 },
    /// `min_radius + (mass - min) / (max - min) * min_radius * k`
    MinRadiusOffset { min_radius: f64, k: f64 },
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        PolicyKind::LinearToMax.with_defaults()
    }
}

impl NormalizationPolicy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            NormalizationPolicy::LinearToMax { .. } => PolicyKind::LinearToMax,
            NormalizationPolicy::LinearToGlobalMaxScaled { .. } => {
                PolicyKind::LinearToGlobalMaxScaled
            }
            NormalizationPolicy::MinRadiusOffset { .. } => PolicyKind::MinRadiusOffset,
        }
    }

    /// Reject parameters that would make every radius zero, negative or non-finite
    pub fn validate(&self) -> MapResult<()> {
        let params: Vec<(&str, f64)> = match *self {
            NormalizationPolicy::LinearToMax { scale } => vec![("scale", scale)],
            NormalizationPolicy::LinearToGlobalMaxScaled { divisor } => vec![("divisor", divisor)],
            NormalizationPolicy::MinRadiusOffset { min_radius, k } => {
                vec![("min_radius", min_radius), ("k", k)]
            }
        };

        for (name, value) in params {
            if !value.is_finite() || value <= 0.0 {
                return Err(MapError::InvalidParameter(format!(
                    "{} {} must be a positive finite number, got {}",
                    self.kind(),
                    name,
                    value
                )));
            }
        }

        // Largest radius the policy can produce
        if let NormalizationPolicy::MinRadiusOffset { min_radius, k } = *self {
            let spread = min_radius * k;
            if !spread.is_finite() || !(min_radius + spread).is_finite() {
                return Err(MapError::InvalidParameter(format!(
                    "{} min_radius {} with k {} overflows",
                    self.kind(),
                    min_radius,
                    k
                )));
            }
        }
        Ok(())
    }

    /// Radius for one mass. `range` must not be degenerate.
    ///
    /// Mass is divided by the range before scaling, so the ratio stays in
    /// [0, 1] even when the range is subnormal.
    pub fn radius(&self, mass: f64, range: MassRange) -> f64 {
        debug_assert!(!range.is_degenerate());
        match *self {
            NormalizationPolicy::LinearToMax { scale } => mass / range.max * scale,
            NormalizationPolicy::LinearToGlobalMaxScaled { divisor } => {
                mass / range.max * divisor
            }
            NormalizationPolicy::MinRadiusOffset { min_radius, k } => {
                min_radius + (mass - range.min) / range.width() * (min_radius * k)
            }
        }
    }
}

/// Policy name without parameters, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    LinearToMax,
    LinearToGlobalMaxScaled,
    MinRadiusOffset,
}

impl PolicyKind {
    pub const ALL: &'static [PolicyKind] = &[
        PolicyKind::LinearToMax,
        PolicyKind::LinearToGlobalMaxScaled,
        PolicyKind::MinRadiusOffset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::LinearToMax => "linear-to-max",
            PolicyKind::LinearToGlobalMaxScaled => "linear-to-global-max-scaled",
            PolicyKind::MinRadiusOffset => "min-radius-offset",
        }
    }

    pub fn with_defaults(self) -> NormalizationPolicy {
        match self {
            PolicyKind::LinearToMax => NormalizationPolicy::LinearToMax {
                scale: DEFAULT_SCALE,
            },
            PolicyKind::LinearToGlobalMaxScaled => NormalizationPolicy::LinearToGlobalMaxScaled {
                divisor: DEFAULT_DIVISOR,
            },
            PolicyKind::MinRadiusOffset => NormalizationPolicy::MinRadiusOffset {
                min_radius: DEFAULT_MIN_RADIUS,
                k: DEFAULT_K,
            },
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = PolicyKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown policy {:?}, expected one of: {}", s, names.join(", "))
            })
    }
}

/// What to do when every particle has the same mass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum UniformMass {
    /// Fail with `DegenerateRange`
    #[default]
    Reject,
    /// Give every particle the same radius
    Constant { radius: f64 },
}

impl UniformMass {
    pub fn validate(&self) -> MapResult<()> {
        match *self {
            UniformMass::Constant { radius } if !radius.is_finite() || radius <= 0.0 => {
                Err(MapError::InvalidParameter(format!(
                    "uniform-mass radius must be a positive finite number, got {}",
                    radius
                )))
            }
            _ => Ok(()),
        }
    }
}
