use std::path::Path;

use log::{debug, warn};

use crate::{
    Error, Geometry, LoaderConfig, MaterialLibrary, Model, ModelBuilder,
    MtlParser, ObjParser, TextureCache,
};

/// Loads model `name`, together with its materials and textures.
///
/// Material libraries are parsed in the order they're referenced by the
/// mesh, into one shared table - so if two libraries define a material with
/// the same name, the first definition wins.
///
/// The returned model holds a reference to each of its textures (see
/// [`Model::release_textures()`]); if loading fails, whatever's been acquired
/// so far is released before returning.
pub fn load_model(
    config: &LoaderConfig,
    textures: &mut TextureCache,
    name: &str,
) -> Result<Model, Error> {
    let mesh_path = config.mesh_path(name);

    debug!("Loading model `{}` from `{}`", name, mesh_path.display());

    let geometry = ObjParser::parse(&mesh_path)?;
    let mut library = MaterialLibrary::default();

    let model = parse_libraries(
        &geometry,
        &config.model_dir(name),
        config.texture_root(),
        textures,
        &mut library,
    )
    .and_then(|()| {
        ModelBuilder::new(&geometry, &library)
            .build()
            .map_err(Error::from)
    });

    if model.is_err() {
        if let Err(err) = library.release_textures(textures) {
            warn!("Couldn't release textures of `{}`: {}", name, err);
        }
    }

    model
}

fn parse_libraries(
    geometry: &Geometry,
    model_dir: &Path,
    texture_root: &Path,
    textures: &mut TextureCache,
    library: &mut MaterialLibrary,
) -> Result<(), Error> {
    let mut parser = MtlParser::new(textures, texture_root);

    for material_library in geometry.material_libraries() {
        parser.parse(&model_dir.join(material_library), library)?;
    }

    Ok(())
}
