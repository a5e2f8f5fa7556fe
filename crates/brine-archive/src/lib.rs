//! Archive loading for the Brine post-processor.
//!
//! A simulation run leaves behind a results folder with a fixed shape:
//! per-checkpoint parameter records under `settings/`, and per-field
//! index documents plus binary payload stores under `timeseries/`.
//! This crate discovers the checkpoints, decodes the payload stores,
//! and merges everything into a queryable [`TimeSeries`].
//!
//! # Format
//!
//! ```text
//! settings/parameters_from_step_<N>.dat    key=value record
//! timeseries/<field>_from_step_<N>.idx     "time \t dataset" lines
//! timeseries/<field>_from_step_<N>.bin     payload store
//! ```
//!
//! A payload store carries the shared mesh once, then one flat value
//! array per listed dataset. All integers are little-endian; strings
//! are length-prefixed. The writer half exists so the originating
//! simulator (and the test suites) can produce archives.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checkpoint;
pub mod codec;
pub mod error;
pub mod index_doc;
pub mod layout;
pub mod series;
pub mod store;

pub use checkpoint::Checkpoint;
pub use error::ArchiveError;
pub use index_doc::IndexEntry;
pub use layout::ArchiveLayout;
pub use series::{FieldSeries, FrameStats, TimeSeries};
pub use store::{PayloadReader, PayloadWriter};

/// Magic bytes at the start of every payload store.
pub const MAGIC: [u8; 4] = *b"BRNE";

/// Current payload store format version.
pub const FORMAT_VERSION: u8 = 1;
