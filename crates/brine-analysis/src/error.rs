//! Error types for the analysis layer.

use std::fmt;
use std::io;

use brine_archive::ArchiveError;
use brine_core::{CommError, ParamError, Point};
use brine_mesh::MeshError;

/// Errors from session setup, field updating, and the analysis drivers.
#[derive(Debug)]
pub enum AnalysisError {
    /// An I/O error occurred while writing analysis output.
    Io(io::Error),
    /// An owned DOF's coordinate has no match in the coordinate index.
    ///
    /// This means the space and the archive disagree about the mesh;
    /// it is fatal and never skipped.
    CoordinateNotIndexed {
        /// The unmatched coordinate.
        point: Point,
    },
    /// A probe segment string was not `x0,y0--x1,y1`.
    MalformedSegment {
        /// The offending input.
        input: String,
    },
    /// A probe spacing was zero, negative, or non-finite.
    InvalidSpacing {
        /// The offending spacing.
        spacing: f64,
    },
    /// No compiled-in problem provider has the requested name.
    UnknownProvider {
        /// The requested provider name.
        name: String,
    },
    /// A field was requested that the session does not carry.
    UnknownField {
        /// The missing field name.
        field: String,
    },
    /// A flux term needed vector components from a scalar field.
    NotAVectorField {
        /// The offending field name.
        field: String,
    },
    /// A probe point fell outside the triangulation.
    PointOutsideMesh {
        /// The offending point.
        point: Point,
    },
    /// A written table could not be parsed back.
    MalformedTable {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The archive layer failed underneath an analysis.
    Archive(ArchiveError),
    /// The mesh layer failed underneath an analysis.
    Mesh(MeshError),
    /// A collective failed underneath an analysis.
    Comm(CommError),
    /// A parameter record was missing or mistyped a key.
    Param(ParamError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::CoordinateNotIndexed { point } => {
                write!(f, "coordinate ({}, {}) not in index", point[0], point[1])
            }
            Self::MalformedSegment { input } => {
                write!(f, "malformed probe segment '{input}' (use 'x0,y0--x1,y1')")
            }
            Self::InvalidSpacing { spacing } => {
                write!(f, "invalid probe spacing {spacing} (must be positive)")
            }
            Self::UnknownProvider { name } => write!(f, "unknown problem provider '{name}'"),
            Self::UnknownField { field } => write!(f, "unknown field '{field}'"),
            Self::NotAVectorField { field } => {
                write!(f, "field '{field}' has no vector components")
            }
            Self::PointOutsideMesh { point } => {
                write!(f, "point ({}, {}) outside the mesh", point[0], point[1])
            }
            Self::MalformedTable { detail } => write!(f, "malformed table: {detail}"),
            Self::Archive(e) => write!(f, "archive: {e}"),
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Comm(e) => write!(f, "collective failed: {e}"),
            Self::Param(e) => write!(f, "parameters: {e}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Archive(e) => Some(e),
            Self::Mesh(e) => Some(e),
            Self::Comm(e) => Some(e),
            Self::Param(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AnalysisError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ArchiveError> for AnalysisError {
    fn from(e: ArchiveError) -> Self {
        Self::Archive(e)
    }
}

impl From<MeshError> for AnalysisError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<CommError> for AnalysisError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<ParamError> for AnalysisError {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}
