//! Platform-agnostic core - shared between the library API and the CLI

pub mod data;
pub mod error;
pub mod histogram;
pub mod mapper;
pub mod output;
pub mod parser;
pub mod policy;
pub mod scene;

pub use data::{Glyph, MappedParticles, MassRange, ParticleRecord, ScalarSource, Vec3};
pub use error::{MapError, MapResult};
pub use histogram::Histogram;
pub use mapper::{MapperConfig, ParticleRadiusMapper};
pub use output::{image_name, output_name};
pub use parser::{parse_line, parse_lines, parse_reader, HeaderMode};
pub use policy::{NormalizationPolicy, PolicyKind, UniformMass};
pub use scene::{Camera, JsonSceneWriter, Scene, SceneOptions, SceneSink, SphereGlyph};
