//! Coordinate-matched transfer of archive frames into functions.

use brine_core::Communicator;
use brine_mesh::{CoordinateIndex, Function, FunctionSpace};

use crate::error::AnalysisError;

/// Places archive frame values into a [`Function`] by coordinate.
///
/// Frames are stored in archive node order (node-major, components
/// interleaved for vectors); the function is stored in DOF order. The
/// updater never assumes the two orders match: each owned DOF's
/// coordinate is looked up in the shared index to find its node, and
/// an unmatched coordinate is fatal. After the owned range is filled
/// the function is synchronized across the group.
pub struct FieldUpdater<'a> {
    space: &'a FunctionSpace,
    index: &'a CoordinateIndex,
}

impl<'a> FieldUpdater<'a> {
    /// Bind to a space and its shared coordinate index.
    pub fn new(space: &'a FunctionSpace, index: &'a CoordinateIndex) -> Self {
        Self { space, index }
    }

    /// Fill the owned DOF range from a frame, then synchronize.
    pub fn update(
        &self,
        function: &mut Function,
        frame: &[f64],
        comm: &dyn Communicator,
    ) -> Result<(), AnalysisError> {
        let components = function.kind().components() as usize;
        for (dof, point) in self.space.dof_coordinates() {
            let node = self
                .index
                .lookup(point)
                .ok_or(AnalysisError::CoordinateNotIndexed { point })?;
            for c in 0..components {
                function.set_value(dof.index(), c, frame[node.index() * components + c]);
            }
        }
        function.synchronize(self.space, comm)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_core::{FieldKind, SoloComm};
    use brine_mesh::MeshTopology;
    use std::sync::Arc;

    fn space() -> FunctionSpace {
        // Element order makes DOF numbering differ from node order.
        let topology = Arc::new(
            MeshTopology::new(
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                vec![[3, 2, 0], [1, 0, 2]],
            )
            .unwrap(),
        );
        FunctionSpace::build(topology, &SoloComm)
    }

    #[test]
    fn scalar_frames_land_by_coordinate_not_index() {
        let space = space();
        let index = CoordinateIndex::build(space.topology());
        let updater = FieldUpdater::new(&space, &index);
        let mut f = Function::new("phi", FieldKind::Scalar, space.n_dofs());

        // Frame in node order: node i carries 10 * i.
        let frame = [0.0, 10.0, 20.0, 30.0];
        updater.update(&mut f, &frame, &SoloComm).unwrap();

        // Reading back in node order reproduces the frame.
        assert_eq!(f.node_values(&space, 0), frame.to_vec());
        // DOF 0 was assigned from node 3.
        assert_eq!(f.value(0, 0), 30.0);
    }

    #[test]
    fn vector_frames_deinterleave_components() {
        let space = space();
        let index = CoordinateIndex::build(space.topology());
        let updater = FieldUpdater::new(&space, &index);
        let mut f = Function::new("u", FieldKind::Vector { dims: 2 }, space.n_dofs());

        // Node-major interleaved: node i carries (i, -i).
        let frame = [0.0, 0.0, 1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        updater.update(&mut f, &frame, &SoloComm).unwrap();

        assert_eq!(f.node_values(&space, 0), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(f.node_values(&space, 1), vec![0.0, -1.0, -2.0, -3.0]);
    }

    #[test]
    fn unindexed_coordinate_is_fatal() {
        let space = space();
        // Index built over a different mesh, missing this one's nodes.
        let other = MeshTopology::new(
            vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let index = CoordinateIndex::build(&other);
        let updater = FieldUpdater::new(&space, &index);
        let mut f = Function::new("phi", FieldKind::Scalar, space.n_dofs());
        assert!(matches!(
            updater.update(&mut f, &[0.0; 4], &SoloComm),
            Err(AnalysisError::CoordinateNotIndexed { .. })
        ));
    }
}
