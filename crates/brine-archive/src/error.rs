//! Error types for archive discovery, decoding, and merging.

use std::fmt;
use std::io;
use std::path::PathBuf;

use brine_core::ParamError;
use brine_mesh::MeshError;

/// Errors from opening, decoding, or merging an archive.
#[derive(Debug)]
pub enum ArchiveError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A required part of the fixed folder layout is absent.
    MissingLayout {
        /// The path that was expected to exist.
        path: PathBuf,
    },
    /// A payload store does not start with the expected `b"BRNE"` magic.
    InvalidMagic,
    /// The payload store format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the store.
        found: u8,
    },
    /// A payload store record could not be decoded.
    MalformedRecord {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An index document line was not a `time \t dataset` pair.
    MalformedIndexLine {
        /// 1-based line number within the document.
        line: usize,
        /// The offending line text.
        content: String,
    },
    /// An index document referenced a dataset the store does not hold.
    MissingDataset {
        /// The referenced dataset name.
        dataset: String,
    },
    /// A checkpoint parameter record failed to parse.
    Param(ParamError),
    /// The mesh block failed validation.
    Mesh(MeshError),
    /// Two payload stores disagree about the shared mesh.
    MeshMismatch {
        /// The store that disagreed with the first mesh seen.
        path: PathBuf,
    },
    /// A field's kind differs between checkpoints.
    FieldKindMismatch {
        /// The field whose kind changed.
        field: String,
    },
    /// A dataset's length does not match the mesh and field kind.
    FrameLengthMismatch {
        /// The dataset whose length was wrong.
        dataset: String,
        /// Expected value count.
        expected: usize,
        /// Actual value count.
        found: usize,
    },
    /// A field's frame count does not match the series time axis.
    FrameCountMismatch {
        /// The field whose frame count disagrees.
        field: String,
        /// Length of the time axis.
        expected: usize,
        /// Number of frames the field carries.
        found: usize,
    },
    /// No checkpoints were found under `settings/`.
    NoCheckpoints,
    /// None of the sought fields were present in any checkpoint.
    NoFieldsLoaded,
    /// A field name was looked up that the series does not carry.
    UnknownField {
        /// The missing field name.
        field: String,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingLayout { path } => {
                write!(f, "archive layout incomplete: missing {}", path.display())
            }
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"BRNE\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported payload store version {found}")
            }
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
            Self::MalformedIndexLine { line, content } => {
                write!(f, "malformed index line {line}: '{content}'")
            }
            Self::MissingDataset { dataset } => {
                write!(f, "index references missing dataset '{dataset}'")
            }
            Self::Param(e) => write!(f, "parameter record: {e}"),
            Self::Mesh(e) => write!(f, "mesh block: {e}"),
            Self::MeshMismatch { path } => {
                write!(f, "mesh in {} disagrees with the shared mesh", path.display())
            }
            Self::FieldKindMismatch { field } => {
                write!(f, "field '{field}' changes kind between checkpoints")
            }
            Self::FrameLengthMismatch {
                dataset,
                expected,
                found,
            } => write!(
                f,
                "dataset '{dataset}' has {found} values, expected {expected}"
            ),
            Self::FrameCountMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{field}' has {found} frames, time axis has {expected}"
            ),
            Self::NoCheckpoints => write!(f, "no checkpoints found under settings/"),
            Self::NoFieldsLoaded => write!(f, "none of the sought fields are present"),
            Self::UnknownField { field } => write!(f, "unknown field '{field}'"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Param(e) => Some(e),
            Self::Mesh(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParamError> for ArchiveError {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}

impl From<MeshError> for ArchiveError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}
