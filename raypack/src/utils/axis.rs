use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// Returns the axis along which `extent` is the largest.
    ///
    /// Ties go to the earlier axis (x before y before z).
    pub fn widest(extent: Vec3) -> Self {
        let mut axis = Axis::X;

        if extent.y > extent.x {
            axis = Axis::Y;
        }

        if extent.z > extent[axis as usize] {
            axis = Axis::Z;
        }

        axis
    }
}
