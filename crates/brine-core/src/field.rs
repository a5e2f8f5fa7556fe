//! Field kinds and per-node storage layout.

/// Classification of a stored field's shape at each node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A single floating-point value per node.
    Scalar,
    /// A fixed-size vector of floating-point values per node.
    Vector {
        /// Number of components in the vector (2 for planar velocity).
        dims: u32,
    },
}

impl FieldKind {
    /// Number of f64 storage slots this kind occupies per node.
    pub fn components(&self) -> u32 {
        match self {
            Self::Scalar => 1,
            Self::Vector { dims } => *dims,
        }
    }

    /// Whether the kind carries more than one component.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }
}

/// Conventional letter for a vector component, used in table headers
/// (`u_x`, `u_y`). Components beyond the third have no letter.
pub fn axis_letter(component: usize) -> Option<char> {
    match component {
        0 => Some('x'),
        1 => Some('y'),
        2 => Some('z'),
        _ => None,
    }
}
