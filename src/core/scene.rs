//! Renderer-neutral scene description
//!
//! A [`Scene`] carries everything an external renderer needs: camera,
//! glyph template, per-particle glyphs and the image name to write. It is
//! handed explicitly to a [`SceneSink`]; nothing here keeps an "active" view.

use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, info};

use super::data::{Glyph, MappedParticles, ScalarSource, Vec3};
use super::error::MapResult;
use super::histogram::Histogram;

pub const DEFAULT_EYE: Vec3 = [-2000.0, 100.0, 70000.0];
pub const DEFAULT_FOCAL_POINT: Vec3 = [-4000.246, 600.739, -523.349];
pub const DEFAULT_VIEW_UP: Vec3 = [0.0, 1.0, 0.0];
pub const DEFAULT_MAGNIFICATION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
    pub focal_point: Vec3,
    pub view_up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: DEFAULT_EYE,
            focal_point: DEFAULT_FOCAL_POINT,
            view_up: DEFAULT_VIEW_UP,
        }
    }
}

/// Sphere tessellation used for every particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SphereGlyph {
    pub theta_resolution: u32,
    pub phi_resolution: u32,
}

impl Default for SphereGlyph {
    fn default() -> Self {
        Self {
            theta_resolution: 180,
            phi_resolution: 90,
        }
    }
}

/// Presentation knobs that are not part of radius mapping
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    pub camera: Camera,
    pub axes_visible: bool,
    pub magnification: u32,
    pub glyph: SphereGlyph,
    pub color_by: ScalarSource,
    /// Bin count for the companion histogram, `None` to skip it
    pub histogram_bins: Option<usize>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            axes_visible: false,
            magnification: DEFAULT_MAGNIFICATION,
            glyph: SphereGlyph::default(),
            color_by: ScalarSource::default(),
            histogram_bins: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// PNG a renderer should write
    pub image: String,
    pub magnification: u32,
    pub axes_visible: bool,
    pub camera: Camera,
    pub glyph: SphereGlyph,
    pub color_by: ScalarSource,
    pub particles: Vec<Glyph>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub histogram: Option<Histogram>,
}

impl Scene {
    pub fn from_mapped(
        image: impl Into<String>,
        mapped: &MappedParticles,
        options: &SceneOptions,
    ) -> MapResult<Self> {
        let particles = mapped.glyphs(options.color_by);

        // Histogram over the coloring scalar, or the radii when uncolored
        let histogram = match options.histogram_bins {
            Some(bins) => {
                let values: Vec<f64> = match options.color_by {
                    ScalarSource::None => mapped.radii.clone(),
                    _ => particles.iter().filter_map(|g| g.scalar).collect(),
                };
                Some(Histogram::build(values, bins, None)?)
            }
            None => None,
        };

        let scene = Self {
            image: image.into(),
            magnification: options.magnification,
            axes_visible: options.axes_visible,
            camera: options.camera,
            glyph: options.glyph,
            color_by: options.color_by,
            particles,
            histogram,
        };

        debug!(
            image = %scene.image,
            particles = scene.particles.len(),
            histogram = scene.histogram.is_some(),
            "Scene assembled"
        );
        Ok(scene)
    }
}

/// Receiver of finished scenes (a renderer, a file writer, ...)
pub trait SceneSink {
    fn present(&mut self, scene: &Scene) -> MapResult<()>;
}

/// Writes each scene as one JSON document
pub struct JsonSceneWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSceneWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    pub fn compact(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SceneSink for JsonSceneWriter<W> {
    fn present(&mut self, scene: &Scene) -> MapResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, scene)?;
        } else {
            serde_json::to_writer(&mut self.writer, scene)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;

        info!(image = %scene.image, particles = scene.particles.len(), "Scene written");
        Ok(())
    }
}
