//! Brine: post-processing for checkpointed two-phase flow archives.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Brine sub-crates. For most users, adding `brine` as a
//! single dependency is sufficient: load a results folder into a
//! [`archive::TimeSeries`], bind it to a rank group with
//! [`analysis::Session`], and run the analysis drivers.
//!
//! # Quick start
//!
//! ```rust
//! use brine::analysis::flux::{Coeff, FieldValues, FluxExpr, FluxTerm};
//! use brine::prelude::*;
//!
//! // The unit square split along its diagonal.
//! let topology = MeshTopology::new(
//!     vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )?;
//!
//! // Mark the right wall and integrate u · n through it.
//! let registry = BoundaryRegistry::build(
//!     &topology,
//!     &[(
//!         "right".to_string(),
//!         BoundarySpec::Planes(vec![PlaneSpec { axis: 0, value: 1.0 }]),
//!     )],
//! )?;
//!
//! // u = (x, 0): the outflow through x = 1 is 1.
//! let mut values = FieldValues::new();
//! values.insert(
//!     "u",
//!     vec![
//!         topology.nodes().iter().map(|p| p[0]).collect(),
//!         vec![0.0; topology.n_nodes()],
//!     ],
//! );
//! let flux = FluxExpr {
//!     terms: vec![FluxTerm::Advect {
//!         coeff: Coeff::Constant(1.0),
//!         field: "u".to_string(),
//!     }],
//! };
//! let provider = resolve_provider("simple")?;
//! let measure = registry.measure("right").expect("registered above");
//! let total = flux.integrate(&topology, measure, &values, provider)?;
//! assert!((total - 1.0).abs() < 1e-12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `brine-core` | IDs, field kinds, parameters, communicators |
//! | [`mesh`] | `brine-mesh` | Topology, function space, coordinate index |
//! | [`archive`] | `brine-archive` | Layout, payload codec, merged time series |
//! | [`analysis`] | `brine-analysis` | Session, boundaries, analysis drivers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, parameters, and communicators (`brine-core`).
///
/// Contains the strongly-typed IDs, [`types::FieldKind`], the
/// `key=value` parameter model, and the [`types::Communicator`] trait
/// with its [`types::SoloComm`] and [`types::ThreadComm`] groups.
pub use brine_core as types;

/// Mesh structures (`brine-mesh`).
///
/// The immutable [`mesh::MeshTopology`], the distributed
/// [`mesh::FunctionSpace`], the broadcast [`mesh::CoordinateIndex`],
/// and [`mesh::Function`] field storage.
pub use brine_mesh as mesh;

/// Archive reading and the merged series (`brine-archive`).
///
/// [`archive::ArchiveLayout`] resolves the folder convention;
/// [`archive::TimeSeries::load`] merges every checkpoint onto one time
/// axis.
pub use brine_archive as archive;

/// Analyses over a loaded series (`brine-analysis`).
///
/// [`analysis::Session`] binds a series to a rank group; the drivers
/// [`analysis::flux_in_time`], [`analysis::geometry_in_time`],
/// [`analysis::line_probe`], and [`analysis::render_animation`]
/// produce the derived outputs.
pub use brine_analysis as analysis;

/// Common imports for typical Brine usage.
///
/// ```rust
/// use brine::prelude::*;
/// ```
pub mod prelude {
    // Core types and communicators
    pub use brine_core::{
        Communicator, FieldKind, MarkerId, NodeId, ParameterSet, Point, SoloComm, ThreadComm,
    };

    // Mesh
    pub use brine_mesh::{CoordinateIndex, Function, FunctionSpace, MeshTopology};

    // Archive
    pub use brine_archive::{ArchiveLayout, TimeSeries};

    // Analysis
    pub use brine_analysis::{
        flux_in_time, geometry_in_time, line_probe, render_animation, resolve_provider,
        BoundaryRegistry, BoundarySpec, FluxOptions, PlaneSpec, ProbeOptions, Session, Side,
        Table,
    };

    // Errors
    pub use brine_analysis::AnalysisError;
    pub use brine_archive::ArchiveError;
    pub use brine_core::{CommError, ParamError};
    pub use brine_mesh::MeshError;
}
