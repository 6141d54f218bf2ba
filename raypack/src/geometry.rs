//! Intermediate, CPU-side representation of a parsed mesh.

mod face;
mod mtl_parser;
mod obj_parser;
mod tokens;

use glam::{Vec2, Vec3};

pub use self::face::*;
pub use self::mtl_parser::*;
pub use self::obj_parser::*;

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub(crate) name: String,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) texcoords: Vec<Vec2>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) sub_geometries: Vec<SubGeometry>,
    pub(crate) material_libraries: Vec<String>,
}

impl Geometry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn sub_geometries(&self) -> &[SubGeometry] {
        &self.sub_geometries
    }

    /// Names of the material libraries referenced through `mtllib`, in the
    /// order of appearance.
    pub fn material_libraries(&self) -> &[String] {
        &self.material_libraries
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.sub_geometries
            .iter()
            .map(|sub_geometry| sub_geometry.faces.len())
            .sum()
    }
}

/// Run of faces sharing the same material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubGeometry {
    pub(crate) material: Option<String>,
    pub(crate) faces: Vec<Face>,
}

impl SubGeometry {
    /// Returns the material's name, or `None` for faces declared before
    /// any `usemtl`.
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }
}
