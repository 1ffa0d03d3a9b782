//! Data structures for parsed particles and mapped radii
//!
//! These structures carry no renderer state and are shared between the
//! library API and the CLI.

use serde::{Deserialize, Serialize};
use tracing::trace;

pub type Vec3 = [f64; 3];

/// Mass assumed for a record whose mass column is absent
pub const DEFAULT_MASS: f64 = 1.0;

/// Velocity assumed for a record whose velocity columns are absent
pub const DEFAULT_VELOCITY: Vec3 = [0.0, 0.0, 0.0];

/// One particle from a snapshot line
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    /// 1-based line in the source text
    pub line: usize,
    pub position: Vec3,
    velocity: Option<Vec3>,
    mass: Option<f64>,
}

impl ParticleRecord {
    pub fn new(line: usize, position: Vec3, velocity: Option<Vec3>, mass: Option<f64>) -> Self {
        Self {
            line,
            position,
            velocity,
            mass,
        }
    }

    /// Velocity, or (0,0,0) when the line had no velocity columns
    pub fn velocity(&self) -> Vec3 {
        self.velocity.unwrap_or(DEFAULT_VELOCITY)
    }

    /// Mass, or 1.0 when the line had no mass column
    pub fn mass(&self) -> f64 {
        self.mass.unwrap_or(DEFAULT_MASS)
    }

    pub fn has_velocity(&self) -> bool {
        self.velocity.is_some()
    }

    pub fn has_mass(&self) -> bool {
        self.mass.is_some()
    }

    pub fn speed(&self) -> f64 {
        let [vx, vy, vz] = self.velocity();
        (vx * vx + vy * vy + vz * vz).sqrt()
    }
}

/// Smallest and largest mass over a set of records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassRange {
    pub min: f64,
    pub max: f64,
}

impl MassRange {
    /// Track (min, max) over the effective masses. `None` for an empty set.
    pub fn scan<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ParticleRecord>,
    {
        Self::from_values(records.into_iter().map(ParticleRecord::mass))
    }

    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |acc, m| match acc {
            None => Some(Self { min: m, max: m }),
            Some(r) => Some(Self {
                min: r.min.min(m),
                max: r.max.max(m),
            }),
        })
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True when every mass is the same value
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0
    }
}

/// Which per-particle value is handed to the renderer for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarSource {
    None,
    #[default]
    Mass,
    /// The normalized radius itself ("MassNorm")
    Radius,
    /// Velocity magnitude
    Speed,
}

impl ScalarSource {
    pub const ALL: &'static [ScalarSource] = &[
        ScalarSource::None,
        ScalarSource::Mass,
        ScalarSource::Radius,
        ScalarSource::Speed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScalarSource::None => "none",
            ScalarSource::Mass => "mass",
            ScalarSource::Radius => "radius",
            ScalarSource::Speed => "speed",
        }
    }
}

impl std::fmt::Display for ScalarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ScalarSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarSource::ALL
            .iter()
            .copied()
            .find(|source| source.label() == s)
            .ok_or_else(|| format!("unknown scalar source {:?}", s))
    }
}

/// What a renderer needs per particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub position: Vec3,
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scalar: Option<f64>,
}

/// Parallel records/radii produced by the mapper, in input order
#[derive(Debug, Clone, Default)]
pub struct MappedParticles {
    pub records: Vec<ParticleRecord>,
    pub radii: Vec<f64>,
    /// Mass range the radii were computed against (`None` for empty input)
    pub range: Option<MassRange>,
}

impl MappedParticles {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-particle scalar for coloring, aligned with `records`
    pub fn scalars(&self, source: ScalarSource) -> Vec<Option<f64>> {
        self.records
            .iter()
            .zip(&self.radii)
            .map(|(record, &radius)| match source {
                ScalarSource::None => None,
                ScalarSource::Mass => Some(record.mass()),
                ScalarSource::Radius => Some(radius),
                ScalarSource::Speed => Some(record.speed()),
            })
            .collect()
    }

    /// Zip positions, radii and scalars into renderer glyphs
    pub fn glyphs(&self, source: ScalarSource) -> Vec<Glyph> {
        let glyphs: Vec<Glyph> = self
            .records
            .iter()
            .zip(&self.radii)
            .zip(self.scalars(source))
            .map(|((record, &radius), scalar)| Glyph {
                position: record.position,
                radius,
                scalar,
            })
            .collect();

        trace!(count = glyphs.len(), %source, "Glyphs assembled");
        glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mass: Option<f64>) -> ParticleRecord {
        ParticleRecord::new(1, [0.0, 0.0, 0.0], None, mass)
    }

    #[test]
    fn test_record_defaults() {
        let r = record(None);
        assert_eq!(r.mass(), 1.0);
        assert_eq!(r.velocity(), [0.0, 0.0, 0.0]);
        assert!(!r.has_mass());
        assert!(!r.has_velocity());
        assert_eq!(r.speed(), 0.0);
    }

    #[test]
    fn test_speed_is_velocity_magnitude() {
        let r = ParticleRecord::new(1, [0.0; 3], Some([3.0, 4.0, 0.0]), None);
        assert_eq!(r.speed(), 5.0);
    }

    #[test]
    fn test_mass_range_scan() {
        let records = vec![record(Some(10.0)), record(None), record(Some(20.0))];
        let range = MassRange::scan(&records).unwrap();
        assert_eq!(range, MassRange { min: 1.0, max: 20.0 });
        assert!(!range.is_degenerate());
        assert_eq!(range.width(), 19.0);
    }

    #[test]
    fn test_mass_range_empty_and_uniform() {
        assert_eq!(MassRange::scan(&Vec::<ParticleRecord>::new()), None);

        let range = MassRange::scan(&[record(Some(5.0)), record(Some(5.0))]).unwrap();
        assert!(range.is_degenerate());
    }

    #[test]
    fn test_scalar_source_names() {
        for &source in ScalarSource::ALL {
            assert_eq!(source.label().parse::<ScalarSource>(), Ok(source));
        }
        assert!("velocity".parse::<ScalarSource>().is_err());
        assert_eq!(ScalarSource::default(), ScalarSource::Mass);
    }

    #[test]
    fn glyphs_follow_scalar_source() {
        let mapped = MappedParticles {
            records: vec![
                ParticleRecord::new(1, [1.0, 2.0, 3.0], Some([0.0, 0.0, 2.0]), Some(10.0)),
                ParticleRecord::new(2, [4.0, 5.0, 6.0], None, Some(20.0)),
            ],
            radii: vec![2.0, 4.0],
            range: Some(MassRange { min: 10.0, max: 20.0 }),
        };

        let none = mapped.glyphs(ScalarSource::None);
        assert_eq!(none[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(none[1].radius, 4.0);
        assert!(none.iter().all(|g| g.scalar.is_none()));

        assert_eq!(mapped.scalars(ScalarSource::Mass), vec![Some(10.0), Some(20.0)]);
        assert_eq!(mapped.scalars(ScalarSource::Radius), vec![Some(2.0), Some(4.0)]);
        assert_eq!(mapped.scalars(ScalarSource::Speed), vec![Some(2.0), Some(0.0)]);
    }
}
