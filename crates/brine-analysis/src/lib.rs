//! Analyses over a loaded time series.
//!
//! The crate ties the archive and mesh layers together: a
//! [`Session`] holds the merged series, the function space built over
//! its mesh, and the shared coordinate index; [`FieldUpdater`] places
//! archive snapshots into functions through exact coordinate matching;
//! [`BoundaryRegistry`] marks boundaries for integration; and the
//! drivers ([`flux_in_time`], [`geometry_in_time`], [`line_probe`],
//! [`render_animation`]) produce the derived tables.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod flux;
pub mod geometry;
pub mod probe;
pub mod provider;
pub mod render;
pub mod session;
pub mod table;
pub mod update;

pub use boundary::{BoundaryRegistry, BoundarySpec, Measure, PlaneSpec, Side};
pub use error::AnalysisError;
pub use flux::{flux_in_time, Coeff, FluxExpr, FluxOptions, FluxTerm};
pub use geometry::{geometry_in_time, round_robin};
pub use probe::{line_probe, ProbeOptions};
pub use provider::{resolve_provider, ProblemProvider, Solute};
pub use render::{render_animation, AnimationRenderer, FrameSource};
pub use session::{steps_by_interval, Session};
pub use table::Table;
pub use update::FieldUpdater;
