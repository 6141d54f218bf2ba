use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::{Path, PathBuf};

use fxhash::FxHashSet;
use glam::Vec3;
use log::{debug, warn};

use super::tokens::{self, parse_floats};
use crate::{
    Material, MaterialLibrary, MaterialTexture, ParseError, TextureCache,
};

/// Parser for Wavefront `.mtl` material libraries.
///
/// Diffuse textures (`map_Kd`) are loaded through the [`TextureCache`] from
/// `<texture root>/<library's file stem>/<file>`.
#[derive(Debug)]
pub struct MtlParser<'a> {
    textures: &'a mut TextureCache,
    texture_root: PathBuf,
}

impl<'a> MtlParser<'a> {
    pub fn new(textures: &'a mut TextureCache, texture_root: &Path) -> Self {
        Self {
            textures,
            texture_root: texture_root.to_owned(),
        }
    }

    /// Parses the library at `path`, adding its materials into `library`.
    ///
    /// Materials already present in `library` are kept, so when the same
    /// name gets declared twice, the first definition wins.
    pub fn parse(
        &mut self,
        path: &Path,
        library: &mut MaterialLibrary,
    ) -> Result<(), ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_owned(),
            source,
        })?;

        self.parse_reader(path, BufReader::new(file), library)
    }

    /// Same as [`Self::parse()`], but reads from `reader`; `path` is used
    /// for diagnostics and to locate the textures.
    pub fn parse_reader(
        &mut self,
        path: &Path,
        reader: impl BufRead,
        library: &mut MaterialLibrary,
    ) -> Result<(), ParseError> {
        let texture_dir = self.texture_root.join(
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let mut target = Target::None;
        let mut unknown_properties = FxHashSet::default();
        let mut declared = 0;

        for line in tokens::lines(path, reader) {
            let (line, content) = line?;
            let mut tokens = content.split_whitespace();

            let Some(property) = tokens.next() else {
                continue;
            };

            if property == "newmtl" {
                let name = tokens.next().ok_or(ParseError::MissingComponents {
                    line,
                    directive: "newmtl",
                    expected: 1,
                })?;

                if library.insert(name, Default::default()) {
                    declared += 1;
                    target = Target::Material(library.len() - 1);
                } else {
                    warn!(
                        "Material `{}` is declared more than once (line {} of `{}`) - skipping",
                        name,
                        line,
                        path.display()
                    );

                    target = Target::Skipping;
                }

                continue;
            }

            let idx = match target {
                Target::Material(idx) => idx,
                Target::Skipping => continue,

                Target::None => {
                    warn!(
                        "Property `{}` appears before any `newmtl` (line {} of `{}`) - skipping",
                        property,
                        line,
                        path.display()
                    );

                    continue;
                }
            };

            match property {
                "Kd" => {
                    let [r, g, b] = parse_floats(line, "Kd", &mut tokens)?;

                    update(library, idx, |material| {
                        material.with_diffuse(Vec3::new(r, g, b))
                    });
                }

                "Ks" => {
                    let [r, g, b] = parse_floats(line, "Ks", &mut tokens)?;

                    update(library, idx, |material| {
                        material.with_specular(Vec3::new(r, g, b))
                    });
                }

                "Ns" => {
                    let [exponent] = parse_floats(line, "Ns", &mut tokens)?;

                    update(library, idx, |material| {
                        material.with_specular_exponent(exponent)
                    });
                }

                "map_Kd" => {
                    // Options (e.g. `-bm 1.0`) go first, file name goes last
                    let file =
                        tokens.last().ok_or(ParseError::MissingComponents {
                            line,
                            directive: "map_Kd",
                            expected: 1,
                        })?;

                    let handle = self.textures.acquire(texture_dir.join(file))?;
                    let id = self.textures.id(handle)?;
                    let prev = library.get_at_mut(idx).texture();

                    update(library, idx, |material| {
                        material.with_texture(Some(MaterialTexture { handle, id }))
                    });

                    // Redefined texture; the material holds only the latest
                    // reference
                    if let Some(prev) = prev {
                        self.textures.release(prev.handle)?;
                    }
                }

                "Ka" | "Ke" | "Tf" | "Ni" | "d" | "Tr" | "illum" => {
                    //
                }

                property => {
                    if unknown_properties.insert(property.to_owned()) {
                        warn!(
                            "Unhandled MTL property `{}` (line {} of `{}`) - skipping",
                            property,
                            line,
                            path.display()
                        );
                    }
                }
            }
        }

        debug!(
            "Parsed `{}`: {} material(s)",
            path.display(),
            declared
        );

        Ok(())
    }
}

fn update(
    library: &mut MaterialLibrary,
    idx: usize,
    f: impl FnOnce(Material) -> Material,
) {
    let material = library.get_at_mut(idx);

    *material = f(mem::take(material));
}

#[derive(Clone, Copy, Debug)]
enum Target {
    /// No `newmtl` seen yet
    None,

    /// Inside a duplicated material
    Skipping,

    Material(usize),
}
