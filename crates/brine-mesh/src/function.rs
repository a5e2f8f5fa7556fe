//! Field storage over a function space.

use brine_core::{Communicator, FieldKind, NodeId};

use crate::error::MeshError;
use crate::space::FunctionSpace;

/// A scalar or vector field over a [`FunctionSpace`].
///
/// Storage is component-major: component `c` occupies the contiguous
/// sub-block `values[c * n_dofs .. (c + 1) * n_dofs]`, indexed by DOF.
/// Each rank writes its owned range; [`Function::synchronize`] then
/// completes the unowned entries so every rank holds the full field.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    name: String,
    kind: FieldKind,
    n_dofs: usize,
    values: Vec<f64>,
}

impl Function {
    /// A zero-initialized field over a space of `n_dofs` DOFs.
    pub fn new(name: &str, kind: FieldKind, n_dofs: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            n_dofs,
            values: vec![0.0; n_dofs * kind.components() as usize],
        }
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of DOFs per component.
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// Read one component of one DOF.
    pub fn value(&self, dof: usize, component: usize) -> f64 {
        self.values[component * self.n_dofs + dof]
    }

    /// Write one component of one DOF.
    pub fn set_value(&mut self, dof: usize, component: usize, value: f64) {
        self.values[component * self.n_dofs + dof] = value;
    }

    /// One component's full DOF-indexed sub-block.
    pub fn component(&self, component: usize) -> &[f64] {
        &self.values[component * self.n_dofs..(component + 1) * self.n_dofs]
    }

    /// Mutable access to one component's sub-block.
    pub fn component_mut(&mut self, component: usize) -> &mut [f64] {
        &mut self.values[component * self.n_dofs..(component + 1) * self.n_dofs]
    }

    /// One component re-ordered to archive node numbering.
    pub fn node_values(&self, space: &FunctionSpace, component: usize) -> Vec<f64> {
        let block = self.component(component);
        (0..self.n_dofs)
            .map(|node| block[space.dof_of_node(NodeId(node as u32)).index()])
            .collect()
    }

    /// Complete unowned entries by all-gathering owned blocks.
    ///
    /// Each rank contributes the owned slice of every component; the
    /// gathered blocks are copied back into place by ownership range.
    /// With a single rank this copies the field over itself.
    pub fn synchronize(
        &mut self,
        space: &FunctionSpace,
        comm: &dyn Communicator,
    ) -> Result<(), MeshError> {
        let components = self.kind.components() as usize;
        let (start, end) = space.owned_range();
        let mut payload = Vec::with_capacity((end - start) * components * 8);
        for c in 0..components {
            for &v in &self.component(c)[start..end] {
                payload.extend_from_slice(&v.to_le_bytes());
            }
        }
        let parts = comm.all_gather(payload)?;
        for (rank, part) in parts.iter().enumerate() {
            let (start, end) = space.ownership_range(rank);
            let len = end - start;
            if part.len() != len * components * 8 {
                return Err(MeshError::FrameSizeMismatch { rank });
            }
            for c in 0..components {
                let block = self.component_mut(c);
                for (offset, chunk) in part[c * len * 8..(c + 1) * len * 8]
                    .chunks_exact(8)
                    .enumerate()
                {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(chunk);
                    block[start + offset] = f64::from_le_bytes(buf);
                }
            }
        }
        Ok(())
    }
}
