//! Mesh structures for the Brine post-processor.
//!
//! This crate adapts an archive's shared triangulated mesh into the
//! structures the analyses need: an immutable [`MeshTopology`], a
//! piecewise-linear [`FunctionSpace`] with contiguous per-rank DOF
//! ownership, the broadcast [`CoordinateIndex`] that maps coordinates
//! back to archive node numbering, and [`Function`] storage for fields
//! over the space.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord_index;
pub mod error;
pub mod function;
pub mod geometry;
pub mod space;
pub mod topology;

pub use coord_index::CoordinateIndex;
pub use error::MeshError;
pub use function::Function;
pub use geometry::{
    barycentric, cell_area, facet_length, facet_normal, interpolate, p1_gradient, PointLocator,
};
pub use space::FunctionSpace;
pub use topology::{Facet, MeshTopology};
