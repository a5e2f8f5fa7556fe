//! Error types for the core crate, organized by subsystem:
//! communicator collectives and parameter records.

use std::error::Error;
use std::fmt;

/// Errors from collective operations on a [`Communicator`](crate::Communicator).
///
/// Collectives are blocking and matched-order; any failure is fatal to
/// the run and propagates without retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A peer's channel endpoint was dropped mid-collective.
    PeerDisconnected {
        /// Rank of the unreachable peer.
        rank: usize,
    },
    /// A root argument named a rank outside the group.
    RankOutOfRange {
        /// The offending rank argument.
        rank: usize,
        /// Size of the group.
        size: usize,
    },
    /// A collective frame did not decode to the expected shape.
    MalformedFrame,
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerDisconnected { rank } => write!(f, "rank {rank} disconnected"),
            Self::RankOutOfRange { rank, size } => {
                write!(f, "rank {rank} out of range for group of {size}")
            }
            Self::MalformedFrame => write!(f, "malformed collective frame"),
        }
    }
}

impl Error for CommError {}

/// Errors from parsing or querying `key=value` parameter records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// A non-comment line had no `=` separator.
    MalformedLine {
        /// 1-based line number within the record.
        line: usize,
        /// The offending line text.
        content: String,
    },
    /// A required key was absent from the record.
    MissingKey {
        /// The key that was looked up.
        key: String,
    },
    /// A key was present but its value had the wrong type.
    WrongType {
        /// The key that was looked up.
        key: String,
        /// The type the caller required.
        expected: &'static str,
        /// Display form of the stored value.
        found: String,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine { line, content } => {
                write!(f, "malformed parameter line {line}: '{content}'")
            }
            Self::MissingKey { key } => write!(f, "missing parameter '{key}'"),
            Self::WrongType {
                key,
                expected,
                found,
            } => {
                write!(f, "parameter '{key}' is not {expected} (found '{found}')")
            }
        }
    }
}

impl Error for ParamError {}
