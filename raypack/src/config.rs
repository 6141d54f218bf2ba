use std::path::{Path, PathBuf};

/// Tells the loader where to look for meshes and textures.
///
/// Model `name` lives at `<object root>/<name>/<name>.<mesh extension>`,
/// next to its material libraries; textures live at
/// `<texture root>/<material library's file stem>/<file>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    object_root: PathBuf,
    texture_root: PathBuf,
    mesh_extension: String,
}

impl LoaderConfig {
    pub fn with_object_root(mut self, object_root: impl Into<PathBuf>) -> Self {
        self.object_root = object_root.into();
        self
    }

    pub fn with_texture_root(
        mut self,
        texture_root: impl Into<PathBuf>,
    ) -> Self {
        self.texture_root = texture_root.into();
        self
    }

    pub fn with_mesh_extension(
        mut self,
        mesh_extension: impl Into<String>,
    ) -> Self {
        self.mesh_extension = mesh_extension.into();
        self
    }

    pub fn object_root(&self) -> &Path {
        &self.object_root
    }

    pub fn texture_root(&self) -> &Path {
        &self.texture_root
    }

    pub fn mesh_extension(&self) -> &str {
        &self.mesh_extension
    }

    pub fn model_dir(&self, name: &str) -> PathBuf {
        self.object_root.join(name)
    }

    pub fn mesh_path(&self, name: &str) -> PathBuf {
        self.model_dir(name)
            .join(format!("{}.{}", name, self.mesh_extension))
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            object_root: PathBuf::from("./objects/"),
            texture_root: PathBuf::from("./textures/"),
            mesh_extension: "obj".into(),
        }
    }
}
