//! Strongly-typed identifiers for nodes, DOFs, and boundary markers.

use std::fmt;

/// Global index of a mesh node in the archive's canonical numbering.
///
/// Node order is fixed by the payload store and shared by every frame;
/// `NodeId(n)` is the n-th row of the node coordinate table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node's position as a container index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Global degree-of-freedom index within a function space.
///
/// DOF numbering is a permutation of node order decided by the space,
/// so a `DofId` and a [`NodeId`] with the same value are unrelated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DofId(pub u32);

impl DofId {
    /// The DOF's position as a container index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DofId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Marker assigned to a boundary within a marking pass.
///
/// Markers start at 1 and follow the supplied boundary order; 0 is
/// reserved for unmarked facets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u32);

impl MarkerId {
    /// The reserved marker for facets no boundary claimed.
    pub const UNMARKED: MarkerId = MarkerId(0);
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MarkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
