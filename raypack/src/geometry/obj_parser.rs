use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::SplitWhitespace;

use fxhash::FxHashSet;
use glam::{vec2, Vec3};
use log::{debug, warn};

use super::tokens::{self, parse_f32, parse_floats};
use super::{Face, Geometry, SubGeometry};
use crate::ParseError;

/// Parser for Wavefront `.obj` meshes.
///
/// Supports positions, texture coordinates, normals, triangular and quad
/// faces (quads get fan-split), `usemtl` and `mtllib`; anything else is
/// logged and skipped.
#[derive(Debug)]
pub struct ObjParser {
    line: usize,
    geometry: Geometry,
    current: SubGeometry,
    unknown_prefixes: FxHashSet<String>,
}

impl ObjParser {
    pub fn parse(path: &Path) -> Result<Geometry, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_owned(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::parse_reader(name, path, BufReader::new(file))
    }

    /// Parses a mesh out of `reader`; `path` is used only for diagnostics.
    pub fn parse_reader(
        name: impl Into<String>,
        path: &Path,
        reader: impl BufRead,
    ) -> Result<Geometry, ParseError> {
        let mut this = Self {
            line: 0,
            geometry: Geometry {
                name: name.into(),
                ..Default::default()
            },
            current: Default::default(),
            unknown_prefixes: Default::default(),
        };

        for line in tokens::lines(path, reader) {
            let (line, content) = line?;

            this.line = line;
            this.process(&content)?;
        }

        Ok(this.finish())
    }

    fn process(&mut self, content: &str) -> Result<(), ParseError> {
        let mut tokens = content.split_whitespace();

        let Some(prefix) = tokens.next() else {
            return Ok(());
        };

        match prefix {
            "v" => {
                let [x, y, z] = parse_floats(self.line, "v", &mut tokens)?;

                self.geometry.positions.push(Vec3::new(x, y, z));
            }

            "vt" => {
                let [u] = parse_floats(self.line, "vt", &mut tokens)?;

                let v = match tokens.next() {
                    Some(token) => parse_f32(self.line, token)?,
                    None => 0.0,
                };

                self.geometry.texcoords.push(vec2(u, v));
            }

            "vn" => {
                let [x, y, z] = parse_floats(self.line, "vn", &mut tokens)?;

                self.geometry.normals.push(Vec3::new(x, y, z));
            }

            "f" => {
                self.process_face(tokens)?;
            }

            "usemtl" => {
                let material = tokens.next().ok_or(
                    ParseError::MissingComponents {
                        line: self.line,
                        directive: "usemtl",
                        expected: 1,
                    },
                )?;

                self.close_sub_geometry();
                self.current.material = Some(material.to_owned());
            }

            "mtllib" => {
                self.geometry
                    .material_libraries
                    .extend(tokens.map(ToOwned::to_owned));
            }

            "s" | "o" | "g" => {
                //
            }

            prefix => {
                if self.unknown_prefixes.insert(prefix.to_owned()) {
                    warn!(
                        "Unhandled OBJ prefix `{}` (line {}) - skipping",
                        prefix, self.line
                    );
                }
            }
        }

        Ok(())
    }

    fn process_face(
        &mut self,
        tokens: SplitWhitespace<'_>,
    ) -> Result<(), ParseError> {
        let corners = tokens
            .map(|token| self.parse_corner(token))
            .collect::<Result<Vec<_>, _>>()?;

        let fan: &[[usize; 3]] = match corners.len() {
            3 => &[[0, 1, 2]],
            4 => &[[0, 1, 2], [0, 2, 3]],

            len => {
                warn!(
                    "Unexpected face vertex count: {} (line {}) - skipping",
                    len, self.line
                );

                return Ok(());
            }
        };

        for &[a, b, c] in fan {
            let [a, b, c] = [&corners[a], &corners[b], &corners[c]];
            let mut face = Face::new([a.position, b.position, c.position]);

            if let (Some(a), Some(b), Some(c)) =
                (a.texcoord, b.texcoord, c.texcoord)
            {
                face = face.with_texcoords([a, b, c]);
            }

            if let (Some(a), Some(b), Some(c)) = (a.normal, b.normal, c.normal)
            {
                face = face.with_normals([a, b, c]);
            }

            self.current.faces.push(face);
        }

        Ok(())
    }

    /// Parses `v`, `v/vt`, `v//vn` or `v/vt/vn`.
    fn parse_corner(&self, token: &str) -> Result<Corner, ParseError> {
        let mut parts = token.split('/');

        let position = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or(ParseError::MissingVertexIndex { line: self.line })?;

        let position =
            self.resolve(position, "vertex", self.geometry.positions.len())?;

        let texcoord = match parts.next().filter(|part| !part.is_empty()) {
            Some(part) => Some(self.resolve(
                part,
                "texcoord",
                self.geometry.texcoords.len(),
            )?),
            None => None,
        };

        let normal = match parts.next().filter(|part| !part.is_empty()) {
            Some(part) => Some(self.resolve(
                part,
                "normal",
                self.geometry.normals.len(),
            )?),
            None => None,
        };

        Ok(Corner {
            position,
            texcoord,
            normal,
        })
    }

    /// Converts a 1-based (or negative, i.e. relative) index into a 0-based
    /// one, making sure it points at something that's been already declared.
    fn resolve(
        &self,
        token: &str,
        kind: &'static str,
        len: usize,
    ) -> Result<u32, ParseError> {
        let invalid = || ParseError::InvalidIndex {
            line: self.line,
            index: token.to_owned(),
        };

        let index: i64 = token.parse().map_err(|_| invalid())?;

        let resolved = match index {
            0 => return Err(invalid()),
            index if index > 0 => index - 1,
            index => (len as i64) + index,
        };

        if resolved < 0 || resolved >= (len as i64) {
            return Err(ParseError::IndexOutOfBounds {
                line: self.line,
                kind,
                index,
                len,
            });
        }

        Ok(resolved as u32)
    }

    fn close_sub_geometry(&mut self) {
        let current = std::mem::take(&mut self.current);

        if !current.faces.is_empty() {
            self.geometry.sub_geometries.push(current);
        }
    }

    fn finish(mut self) -> Geometry {
        self.close_sub_geometry();

        debug!(
            "Parsed `{}`: {} position(s), {} texcoord(s), {} normal(s), {} face(s) in {} group(s)",
            self.geometry.name,
            self.geometry.positions.len(),
            self.geometry.texcoords.len(),
            self.geometry.normals.len(),
            self.geometry.face_count(),
            self.geometry.sub_geometries.len(),
        );

        self.geometry
    }
}

#[derive(Clone, Copy, Debug)]
struct Corner {
    position: u32,
    texcoord: Option<u32>,
    normal: Option<u32>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use glam::vec3;

    use super::*;
    use crate::FaceAttributes;

    fn parse(source: &str) -> Result<Geometry, ParseError> {
        ObjParser::parse_reader("test", Path::new("test.obj"), source.as_bytes())
    }

    const SQUARE: &str = "
        v 0 0 0
        v 1 0 0
        v 1 1 0
        v 0 1 0
    ";

    #[test]
    fn single_triangle() {
        let geometry = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        assert_eq!(3, geometry.positions().len());
        assert_eq!(1, geometry.sub_geometries().len());
        assert_eq!(None, geometry.sub_geometries()[0].material());

        let face = geometry.sub_geometries()[0].faces()[0];

        assert_eq!([0, 1, 2], face.position_ids);
        assert_eq!(FaceAttributes::POSITIONS, face.attributes);
    }

    #[test]
    fn quad_is_fan_split() {
        let geometry = parse(&format!("{SQUARE}\nf 1 2 3 4")).unwrap();
        let faces = geometry.sub_geometries()[0].faces();

        assert_eq!(2, faces.len());
        assert_eq!([0, 1, 2], faces[0].position_ids);
        assert_eq!([0, 2, 3], faces[1].position_ids);
    }

    #[test]
    fn corner_attributes() {
        let geometry = parse(&format!(
            "{SQUARE}
            vt 0 0
            vt 1 0
            vt 1 1
            vn 0 0 1
            f 1/1/1 2/2/1 3/3/1
            f 1//1 3//1 4//1
            f 1/1 2/2 3/3
            f 1/1/1 2/2/1 3/3/1 4//1
            "
        ))
        .unwrap();

        let faces = geometry.sub_geometries()[0].faces();

        assert_eq!(5, faces.len());

        assert!(faces[0].has_texcoords() && faces[0].has_normals());
        assert_eq!([0, 1, 2], faces[0].texcoord_ids);
        assert_eq!([0, 0, 0], faces[0].normal_ids);

        assert!(!faces[1].has_texcoords() && faces[1].has_normals());
        assert!(faces[2].has_texcoords() && !faces[2].has_normals());

        // Second half of the quad touches the corner without a texcoord
        assert!(faces[3].has_texcoords() && faces[3].has_normals());
        assert!(!faces[4].has_texcoords() && faces[4].has_normals());

        assert!(geometry.has_texcoords());
        assert!(geometry.has_normals());
    }

    #[test]
    fn single_component_texcoord() {
        let geometry = parse("vt 0.25\nvt 0.5 0.75 0.0").unwrap();

        assert_eq!(&[vec2(0.25, 0.0), vec2(0.5, 0.75)], geometry.texcoords());
    }

    #[test]
    fn negative_indices() {
        let geometry = parse(&format!("{SQUARE}\nf -3 -2 -1")).unwrap();

        assert_eq!(
            [1, 2, 3],
            geometry.sub_geometries()[0].faces()[0].position_ids
        );
    }

    #[test]
    fn material_groups() {
        let geometry = parse(&format!(
            "{SQUARE}
            mtllib a.mtl b.mtl
            f 1 2 3
            usemtl red
            f 1 2 3
            f 2 3 4
            usemtl unused
            usemtl blue
            f 1 3 4
            mtllib c.mtl
            "
        ))
        .unwrap();

        let groups = geometry.sub_geometries();

        assert_eq!(3, groups.len());
        assert_eq!(None, groups[0].material());
        assert_eq!(1, groups[0].faces().len());
        assert_eq!(Some("red"), groups[1].material());
        assert_eq!(2, groups[1].faces().len());
        assert_eq!(Some("blue"), groups[2].material());
        assert_eq!(1, groups[2].faces().len());
        assert_eq!(4, geometry.face_count());

        assert_eq!(
            &["a.mtl", "b.mtl", "c.mtl"],
            geometry.material_libraries()
        );
    }

    #[test]
    fn ignored_and_unknown_lines() {
        let geometry = parse(&format!(
            "# comment
            o cube
            g side
            s off
            {SQUARE}
            vp 0.1 0.2
            cstype bezier
            f 1 2 3
            "
        ))
        .unwrap();

        assert_eq!(1, geometry.face_count());
        assert_eq!(vec3(1.0, 1.0, 0.0), geometry.positions()[2]);
    }

    #[test]
    fn unsupported_polygons_are_skipped() {
        let geometry = parse(&format!(
            "{SQUARE}
            v 2 2 0
            f 1 2 3 4 5
            f 1 2
            f 1 2 3
            "
        ))
        .unwrap();

        assert_eq!(1, geometry.face_count());
    }

    #[test]
    fn malformed_number() {
        let err = parse("v 0 0 0\nv 1 zero 0").unwrap_err();

        assert!(
            matches!(err, ParseError::InvalidNumber { line: 2, ref token } if token == "zero"),
            "{err:?}"
        );
    }

    #[test]
    fn missing_components() {
        let err = parse("v 0 0").unwrap_err();

        assert!(
            matches!(
                err,
                ParseError::MissingComponents {
                    line: 1,
                    directive: "v",
                    expected: 3
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn out_of_bounds_index() {
        let err = parse(&format!("{SQUARE}\nf 1 2 5")).unwrap_err();

        assert!(
            matches!(
                err,
                ParseError::IndexOutOfBounds {
                    kind: "vertex",
                    index: 5,
                    len: 4,
                    ..
                }
            ),
            "{err:?}"
        );

        let err = parse(&format!("{SQUARE}\nf 1/1 2/1 3/1")).unwrap_err();

        assert!(
            matches!(err, ParseError::IndexOutOfBounds { kind: "texcoord", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn invalid_index() {
        let err = parse(&format!("{SQUARE}\nf 0 1 2")).unwrap_err();

        assert!(matches!(err, ParseError::InvalidIndex { .. }), "{err:?}");

        let err = parse(&format!("{SQUARE}\nf 1 x 2")).unwrap_err();

        assert!(matches!(err, ParseError::InvalidIndex { .. }), "{err:?}");

        let err = parse(&format!("{SQUARE}\nf 1 /1 2")).unwrap_err();

        assert!(
            matches!(err, ParseError::MissingVertexIndex { .. }),
            "{err:?}"
        );
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();
        drop(file);

        let geometry = ObjParser::parse(&path).unwrap();

        assert_eq!("tri", geometry.name());
        assert_eq!(1, geometry.face_count());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ObjParser::parse(&dir.path().join("nope.obj")).unwrap_err();

        assert!(matches!(err, ParseError::Io { .. }), "{err:?}");
    }
}
