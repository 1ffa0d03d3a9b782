//! N-body snapshot glyph mapping
//!
//! Reads particle snapshots (`x,y,z[,vx,vy,vz[,mass]]` CSV), turns each
//! particle's mass into a display radius and describes the result as a
//! renderer-neutral scene:
//! - [`core::parser`]: snapshot lines to typed records, two header modes
//! - [`core::policy`]: mass → radius normalization policies
//! - [`core::mapper`]: the two-pass radius mapper
//! - [`core::scene`]: camera, glyphs and the sink that receives them

pub mod core;
