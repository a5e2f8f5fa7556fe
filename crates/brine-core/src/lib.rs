//! Core types for the Brine post-processor.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Brine workspace:
//! strongly-typed identifiers, field kinds, bit-exact coordinate keys,
//! the `key=value` parameter record model, and the rank communicator
//! that every distributed operation flows through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod comm;
pub mod error;
pub mod field;
pub mod id;
pub mod params;
pub mod point;

pub use comm::{Communicator, SoloComm, ThreadComm};
pub use error::{CommError, ParamError};
pub use field::{axis_letter, FieldKind};
pub use id::{DofId, MarkerId, NodeId};
pub use params::{ParamValue, ParameterSet};
pub use point::{distance, CoordKey, Point, DIM};
