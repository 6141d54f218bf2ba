use fxhash::FxHashMap;

use crate::{material, Material, TextureCache, TextureError};

/// Name-to-material table, remembering the order in which materials were
/// declared.
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<(String, Material)>,
    index: FxHashMap<String, usize>,
}

impl MaterialLibrary {
    /// Adds a new material; returns `false` (leaving the library untouched)
    /// if a material with this name already exists.
    pub fn insert(&mut self, name: impl Into<String>, material: Material) -> bool {
        let name = name.into();

        if self.index.contains_key(&name) {
            return false;
        }

        self.index.insert(name.clone(), self.materials.len());
        self.materials.push((name, material));

        true
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.position(name).map(|idx| &self.materials[idx].1)
    }

    /// Returns the declaration order of given material.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Material)> + '_ {
        self.materials
            .iter()
            .map(|(name, material)| (name.as_str(), material))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Releases textures acquired while parsing this library; call it when
    /// the library gets discarded instead of being turned into a model.
    pub fn release_textures(
        &self,
        textures: &mut TextureCache,
    ) -> Result<(), TextureError> {
        material::release_textures(
            self.materials.iter().map(|(_, material)| material),
            textures,
        )
    }

    pub(crate) fn get_at_mut(&mut self, idx: usize) -> &mut Material {
        &mut self.materials[idx].1
    }
}
