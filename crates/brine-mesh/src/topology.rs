//! Immutable triangulated mesh topology.

use indexmap::IndexMap;
use smallvec::SmallVec;

use brine_core::Point;

use crate::error::MeshError;

/// An edge of the triangulation together with its adjacent cells.
///
/// Exterior facets have exactly one adjacent cell; interior facets have
/// two. Facet node pairs are stored with the smaller index first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Facet {
    /// The facet's endpoints, ordered by node index.
    pub nodes: [u32; 2],
    /// Cells sharing this facet, in first-touch order.
    pub cells: SmallVec<[u32; 2]>,
}

impl Facet {
    /// Whether this facet lies on the mesh exterior.
    pub fn is_exterior(&self) -> bool {
        self.cells.len() == 1
    }
}

/// A shared, immutable triangulated mesh.
///
/// Node order is the archive's canonical global numbering; every field
/// frame is stored against it. The topology never changes after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshTopology {
    nodes: Vec<Point>,
    elements: Vec<[u32; 3]>,
}

impl MeshTopology {
    /// Validate and freeze a node table and element list.
    ///
    /// Rejects empty meshes, out-of-range node references, and cells
    /// with numerically zero area (either orientation is accepted).
    pub fn new(nodes: Vec<Point>, elements: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if nodes.is_empty() || elements.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        for (cell, element) in elements.iter().enumerate() {
            for &node in element {
                if node as usize >= nodes.len() {
                    return Err(MeshError::NodeOutOfRange { cell, node });
                }
            }
            let [a, b, c] = element.map(|n| nodes[n as usize]);
            let doubled = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            if doubled == 0.0 {
                return Err(MeshError::DegenerateCell { cell });
            }
        }
        Ok(Self { nodes, elements })
    }

    /// Node coordinates in canonical order.
    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    /// Element node triples.
    pub fn elements(&self) -> &[[u32; 3]] {
        &self.elements
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Corner coordinates of a cell.
    pub fn cell_corners(&self, cell: u32) -> [Point; 3] {
        self.elements[cell as usize].map(|n| self.nodes[n as usize])
    }

    /// Axis-aligned bounding box of the node set, as `(min, max)`.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = self.nodes[0];
        let mut max = self.nodes[0];
        for p in &self.nodes[1..] {
            for axis in 0..2 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        (min, max)
    }

    /// All facets of the triangulation with their cell adjacency, in
    /// first-touch order over the element list.
    pub fn facets(&self) -> Vec<Facet> {
        let mut by_pair: IndexMap<[u32; 2], SmallVec<[u32; 2]>> =
            IndexMap::with_capacity(self.elements.len() * 2);
        for (cell, &[a, b, c]) in self.elements.iter().enumerate() {
            for pair in [[a, b], [b, c], [c, a]] {
                let key = if pair[0] <= pair[1] {
                    pair
                } else {
                    [pair[1], pair[0]]
                };
                by_pair.entry(key).or_default().push(cell as u32);
            }
        }
        by_pair
            .into_iter()
            .map(|(nodes, cells)| Facet { nodes, cells })
            .collect()
    }

}
