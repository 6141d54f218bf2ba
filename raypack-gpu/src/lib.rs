//! Flat, `#[repr(C)]` structs shared between the asset pipeline and the
//! ray-intersection stage.
//!
//! Everything here is `Pod`, so the merged scene can be handed over to the
//! device as plain byte slices (see `bytemuck::cast_slice()`).

#![allow(clippy::len_without_is_empty)]

mod bvh_node;
mod bvh_range;
mod material;
mod triangle;
mod vertex;

pub use self::bvh_node::*;
pub use self::bvh_range::*;
pub use self::material::*;
pub use self::triangle::*;
pub use self::vertex::*;
