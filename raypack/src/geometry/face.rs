/// Triangle as referenced by a mesh file - before it gets its own vertices.
///
/// All indices are 0-based; only the attributes present in `attributes` carry
/// meaningful values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub position_ids: [u32; 3],
    pub texcoord_ids: [u32; 3],
    pub normal_ids: [u32; 3],
    pub attributes: FaceAttributes,
}

impl Face {
    pub fn new(position_ids: [u32; 3]) -> Self {
        Self {
            position_ids,
            attributes: FaceAttributes::POSITIONS,
            ..Default::default()
        }
    }

    pub fn with_texcoords(mut self, texcoord_ids: [u32; 3]) -> Self {
        self.texcoord_ids = texcoord_ids;
        self.attributes.insert(FaceAttributes::TEXCOORDS);
        self
    }

    pub fn with_normals(mut self, normal_ids: [u32; 3]) -> Self {
        self.normal_ids = normal_ids;
        self.attributes.insert(FaceAttributes::NORMALS);
        self
    }

    pub fn has_texcoords(&self) -> bool {
        self.attributes.contains(FaceAttributes::TEXCOORDS)
    }

    pub fn has_normals(&self) -> bool {
        self.attributes.contains(FaceAttributes::NORMALS)
    }
}

/// Bitmask telling which per-corner attributes a face carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceAttributes(u8);

impl FaceAttributes {
    pub const POSITIONS: Self = Self(1);
    pub const TEXCOORDS: Self = Self(1 << 1);
    pub const NORMALS: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}
