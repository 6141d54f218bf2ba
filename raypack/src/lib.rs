//! Asset pipeline for a GPU ray tracer: loads Wavefront meshes and material
//! libraries, builds a BVH per model and packs whole scenes into flat,
//! device-ready buffers.
//!
//! ```no_run
//! # fn main() -> Result<(), raypack::Error> {
//! use raypack::{LoaderConfig, Scene, TextureCache};
//!
//! let config = LoaderConfig::default();
//! let mut textures = TextureCache::new();
//! let scene = Scene::load(&config, &mut textures, ["crate", "floor"])?;
//!
//! println!("{} node(s)", scene.buffers().nodes().len());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::len_without_is_empty)]

mod bvh;
mod config;
mod error;
mod geometry;
mod loader;
mod material;
mod materials;
mod model;
mod scene;
mod textures;
mod upload;
mod utils;

pub use raypack_gpu as gpu;

pub use self::bvh::*;
pub use self::config::*;
pub use self::error::*;
pub use self::geometry::*;
pub use self::loader::*;
pub use self::material::*;
pub use self::materials::*;
pub use self::model::*;
pub use self::scene::*;
pub use self::textures::*;
pub use self::upload::*;
pub use self::utils::{Axis, BoundingBox};
