//! Error types for mesh construction and distributed sharing.

use std::error::Error;
use std::fmt;

use brine_core::CommError;

/// Errors from mesh construction, indexing, and synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh had no nodes or no elements.
    EmptyMesh,
    /// An element referenced a node index outside the node table.
    NodeOutOfRange {
        /// Index of the offending element.
        cell: usize,
        /// The out-of-range node index.
        node: u32,
    },
    /// An element had (numerically) zero area.
    DegenerateCell {
        /// Index of the offending element.
        cell: usize,
    },
    /// A broadcast coordinate-index frame did not decode cleanly.
    MalformedIndexFrame,
    /// A synchronization frame had the wrong length for the space.
    FrameSizeMismatch {
        /// Rank whose frame was malformed.
        rank: usize,
    },
    /// A collective failed underneath a mesh operation.
    Comm(CommError),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMesh => write!(f, "mesh has no nodes or no elements"),
            Self::NodeOutOfRange { cell, node } => {
                write!(f, "element {cell} references out-of-range node {node}")
            }
            Self::DegenerateCell { cell } => write!(f, "element {cell} has zero area"),
            Self::MalformedIndexFrame => write!(f, "malformed coordinate index frame"),
            Self::FrameSizeMismatch { rank } => {
                write!(f, "synchronization frame from rank {rank} has wrong length")
            }
            Self::Comm(e) => write!(f, "collective failed: {e}"),
        }
    }
}

impl Error for MeshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for MeshError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}
