//! ParticleRadiusMapper - snapshot lines in, per-particle radii out
//!
//! Two passes over the parsed records: the first tracks the mass range, the
//! second applies the configured [`NormalizationPolicy`].

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use super::data::{MappedParticles, MassRange, ParticleRecord};
use super::error::{MapError, MapResult};
use super::parser::{parse_lines, parse_reader, HeaderMode};
use super::policy::{NormalizationPolicy, UniformMass};

/// Everything that decides how a snapshot becomes radii
///
/// Absent keys in a JSON config fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub header: HeaderMode,
    pub policy: NormalizationPolicy,
    pub uniform_mass: UniformMass,
    /// Fail with `MissingMassArray` when no line carries a mass column
    pub require_mass: bool,
}

impl MapperConfig {
    pub fn from_json_str(json: &str) -> MapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> MapResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        debug!(path = %path.display(), ?config, "Mapper config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> MapResult<()> {
        self.policy.validate()?;
        self.uniform_mass.validate()
    }
}

pub struct ParticleRadiusMapper {
    config: MapperConfig,
}

impl ParticleRadiusMapper {
    pub fn new(config: MapperConfig) -> MapResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn map_lines<I, S>(&self, lines: I) -> MapResult<MappedParticles>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = parse_lines(lines, self.config.header)?;
        self.map_records(records)
    }

    pub fn map_reader<R: BufRead>(&self, reader: R) -> MapResult<MappedParticles> {
        let records = parse_reader(reader, self.config.header)?;
        self.map_records(records)
    }

    /// Read the whole file, close it, then map
    pub fn map_file(&self, path: &Path) -> MapResult<MappedParticles> {
        let records = {
            let reader = BufReader::new(File::open(path)?);
            parse_reader(reader, self.config.header)?
        };
        info!(path = %path.display(), particles = records.len(), "Snapshot read");
        self.map_records(records)
    }

    pub fn map_records(&self, records: Vec<ParticleRecord>) -> MapResult<MappedParticles> {
        if self.config.require_mass && !records.iter().any(ParticleRecord::has_mass) {
            return Err(MapError::MissingMassArray);
        }

        // Pass 1: mass range
        let Some(range) = MassRange::scan(&records) else {
            warn!("Snapshot holds no particles");
            return Ok(MappedParticles::default());
        };

        // Pass 2: radii
        let radii = self.radii(&records, range)?;

        debug!(
            particles = records.len(),
            mass_min = range.min,
            mass_max = range.max,
            policy = %self.config.policy.kind(),
            "Radii computed"
        );

        Ok(MappedParticles {
            records,
            radii,
            range: Some(range),
        })
    }

    fn radii(&self, records: &[ParticleRecord], range: MassRange) -> MapResult<Vec<f64>> {
        if !range.is_degenerate() {
            let policy = self.config.policy;
            return records
                .iter()
                .map(|r| {
                    let radius = policy.radius(r.mass(), range);
                    if radius.is_finite() {
                        Ok(radius)
                    } else {
                        Err(MapError::NonFiniteRadius {
                            line: r.line,
                            mass: r.mass(),
                        })
                    }
                })
                .collect();
        }

        match self.config.uniform_mass {
            UniformMass::Reject => Err(MapError::DegenerateRange { mass: range.max }),
            UniformMass::Constant { radius } => {
                warn!(mass = range.max, radius, "Uniform mass, using constant radius");
                Ok(vec![radius; records.len()])
            }
        }
    }
}
