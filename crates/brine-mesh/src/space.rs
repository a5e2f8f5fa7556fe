//! Piecewise-linear function space with distributed DOF ownership.

use std::sync::Arc;

use brine_core::{Communicator, DofId, NodeId, Point};

use crate::topology::MeshTopology;

/// A continuous piecewise-linear (one DOF per node) function space.
///
/// DOF numbering is the element-first-touch permutation of node order:
/// walking the element list, each vertex is assigned the next DOF the
/// first time it appears. This matches how a discretization's dofmap
/// orders unknowns and keeps DOF order genuinely distinct from archive
/// node order, so value placement must go through coordinates rather
/// than assume matching indices.
///
/// Ownership splits `0..n_dofs` into contiguous per-rank ranges: with
/// `n = base * size + rem`, the first `rem` ranks own `base + 1` DOFs.
/// Every rank computes the same partition.
#[derive(Clone, Debug)]
pub struct FunctionSpace {
    topology: Arc<MeshTopology>,
    dof_of_node: Vec<u32>,
    node_of_dof: Vec<u32>,
    ranges: Vec<(usize, usize)>,
    rank: usize,
}

impl FunctionSpace {
    /// Number the DOFs and partition ownership across the group.
    pub fn build(topology: Arc<MeshTopology>, comm: &dyn Communicator) -> Self {
        let n = topology.n_nodes();
        let unset = u32::MAX;
        let mut dof_of_node = vec![unset; n];
        let mut node_of_dof = Vec::with_capacity(n);
        for element in topology.elements() {
            for &node in element {
                if dof_of_node[node as usize] == unset {
                    dof_of_node[node as usize] = node_of_dof.len() as u32;
                    node_of_dof.push(node);
                }
            }
        }
        // Nodes no element touches still get trailing DOFs.
        for node in 0..n {
            if dof_of_node[node] == unset {
                dof_of_node[node] = node_of_dof.len() as u32;
                node_of_dof.push(node as u32);
            }
        }

        let size = comm.size();
        let base = n / size;
        let rem = n % size;
        let mut ranges = Vec::with_capacity(size);
        let mut start = 0;
        for r in 0..size {
            let len = base + usize::from(r < rem);
            ranges.push((start, start + len));
            start += len;
        }

        Self {
            topology,
            dof_of_node,
            node_of_dof,
            ranges,
            rank: comm.rank(),
        }
    }

    /// The underlying mesh.
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// Total number of DOFs (one per node).
    pub fn n_dofs(&self) -> usize {
        self.node_of_dof.len()
    }

    /// The DOF assigned to a node.
    pub fn dof_of_node(&self, node: NodeId) -> DofId {
        DofId(self.dof_of_node[node.index()])
    }

    /// The node a DOF was assigned from.
    pub fn node_of_dof(&self, dof: DofId) -> NodeId {
        NodeId(self.node_of_dof[dof.index()])
    }

    /// Ownership range of an arbitrary rank, as `[start, end)`.
    pub fn ownership_range(&self, rank: usize) -> (usize, usize) {
        self.ranges[rank]
    }

    /// The calling rank's ownership range.
    pub fn owned_range(&self) -> (usize, usize) {
        self.ranges[self.rank]
    }

    /// All per-rank ownership ranges, indexed by rank.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }

    /// Coordinates of the calling rank's owned DOFs, in DOF order.
    pub fn dof_coordinates(&self) -> impl Iterator<Item = (DofId, Point)> + '_ {
        let (start, end) = self.owned_range();
        self.node_of_dof[start..end]
            .iter()
            .enumerate()
            .map(move |(offset, &node)| {
                let dof = DofId((start + offset) as u32);
                (dof, self.topology.nodes()[node as usize])
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_core::SoloComm;
    use proptest::prelude::*;

    fn square() -> Arc<MeshTopology> {
        Arc::new(
            MeshTopology::new(
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                vec![[3, 2, 0], [1, 0, 2]],
            )
            .unwrap(),
        )
    }

    #[test]
    fn first_touch_numbering_differs_from_node_order() {
        let space = FunctionSpace::build(square(), &SoloComm);
        // Element walk touches nodes 3, 2, 0, then 1.
        assert_eq!(space.dof_of_node(NodeId(3)), DofId(0));
        assert_eq!(space.dof_of_node(NodeId(2)), DofId(1));
        assert_eq!(space.dof_of_node(NodeId(0)), DofId(2));
        assert_eq!(space.dof_of_node(NodeId(1)), DofId(3));
    }

    #[test]
    fn numbering_is_a_bijection() {
        let space = FunctionSpace::build(square(), &SoloComm);
        for n in 0..space.n_dofs() as u32 {
            assert_eq!(space.node_of_dof(space.dof_of_node(NodeId(n))), NodeId(n));
        }
    }

    #[test]
    fn solo_rank_owns_everything() {
        let space = FunctionSpace::build(square(), &SoloComm);
        assert_eq!(space.owned_range(), (0, 4));
        assert_eq!(space.dof_coordinates().count(), 4);
    }

    #[test]
    fn dof_coordinates_follow_the_permutation() {
        let space = FunctionSpace::build(square(), &SoloComm);
        let coords: Vec<_> = space.dof_coordinates().collect();
        assert_eq!(coords[0], (DofId(0), [0.0, 1.0])); // node 3
        assert_eq!(coords[2], (DofId(2), [0.0, 0.0])); // node 0
    }

    /// A stand-in group for partition tests; no collectives are used
    /// by `FunctionSpace::build`.
    struct FixedRank {
        rank: usize,
        size: usize,
    }

    impl Communicator for FixedRank {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
        fn broadcast(
            &self,
            _root: usize,
            payload: Vec<u8>,
        ) -> Result<Vec<u8>, brine_core::CommError> {
            Ok(payload)
        }
        fn gather(
            &self,
            _root: usize,
            payload: Vec<u8>,
        ) -> Result<Option<Vec<Vec<u8>>>, brine_core::CommError> {
            Ok(Some(vec![payload]))
        }
    }

    fn strip(n_nodes: u32) -> Arc<MeshTopology> {
        // A strip of triangles over n_nodes >= 3 collinear-free points.
        let nodes: Vec<[f64; 2]> = (0..n_nodes)
            .map(|i| [i as f64, if i % 2 == 0 { 0.0 } else { 1.0 }])
            .collect();
        let elements: Vec<[u32; 3]> = (0..n_nodes - 2).map(|i| [i, i + 1, i + 2]).collect();
        Arc::new(MeshTopology::new(nodes, elements).unwrap())
    }

    proptest! {
        #[test]
        fn ownership_ranges_partition_the_dof_set(
            n_nodes in 3u32..40,
            size in 1usize..8,
        ) {
            let topology = strip(n_nodes);
            let space = FunctionSpace::build(topology, &FixedRank { rank: 0, size });
            let ranges = space.ranges();
            prop_assert_eq!(ranges.len(), size);
            prop_assert_eq!(ranges[0].0, 0);
            prop_assert_eq!(ranges[size - 1].1, space.n_dofs());
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].1, pair[1].0); // contiguous, no gap or overlap
            }
            // Sizes differ by at most one, larger ranks first.
            let lens: Vec<usize> = ranges.iter().map(|(s, e)| e - s).collect();
            for pair in lens.windows(2) {
                prop_assert!(pair[0] >= pair[1]);
                prop_assert!(pair[0] - pair[1] <= 1);
            }
        }
    }
}
