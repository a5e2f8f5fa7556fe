//! Planar points and bit-exact coordinate keys.

/// Spatial dimensionality of every mesh Brine handles.
///
/// The geometry, probing, and cross-section analyses are specific to
/// triangulated planar meshes, so the dimension is fixed rather than
/// carried as a latent parameter.
pub const DIM: usize = 2;

/// A point in the mesh plane.
pub type Point = [f64; DIM];

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Hashable key over the raw bit patterns of a coordinate.
///
/// Lookup is exact-match: two points collide only when every component
/// is bit-identical. No rounding or snapping is applied, so `-0.0` and
/// `0.0` are distinct keys. This is sound because both sides of every
/// lookup (archive node coordinates and DOF coordinates) originate from
/// the same stored values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordKey([u64; DIM]);

impl CoordKey {
    /// Key a point by its component bit patterns.
    pub fn new(point: Point) -> Self {
        Self([point[0].to_bits(), point[1].to_bits()])
    }

    /// Recover the point this key was built from.
    pub fn point(&self) -> Point {
        [f64::from_bits(self.0[0]), f64::from_bits(self.0[1])]
    }

    /// The raw bit patterns, in component order.
    pub fn bits(&self) -> [u64; DIM] {
        self.0
    }

    /// Rebuild a key from raw bit patterns.
    pub fn from_bits(bits: [u64; DIM]) -> Self {
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_recovers_point_exactly() {
        let p = [0.1 + 0.2, -3.5e-17];
        assert_eq!(CoordKey::new(p).point(), p);
    }

    #[test]
    fn signed_zero_keys_differ() {
        assert_ne!(CoordKey::new([0.0, 0.0]), CoordKey::new([-0.0, 0.0]));
    }

    #[test]
    fn distance_along_axis() {
        assert_eq!(distance([0.0, 0.0], [3.0, 4.0]), 5.0);
    }

    proptest! {
        #[test]
        fn bits_round_trip(x in proptest::num::f64::ANY, y in proptest::num::f64::ANY) {
            let key = CoordKey::new([x, y]);
            prop_assert_eq!(CoordKey::from_bits(key.bits()), key);
        }
    }
}
