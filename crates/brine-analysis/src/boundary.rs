//! Boundary registry: named boundaries marked onto mesh facets, each
//! with an integration measure.

use indexmap::IndexMap;

use brine_core::{MarkerId, Point};
use brine_mesh::{facet_length, facet_normal, MeshTopology};

use crate::error::AnalysisError;

/// Facets are matched to a plane when both endpoints lie within this
/// distance of it.
const PLANE_TOL: f64 = 1e-9;

/// An axis-aligned plane: points whose `axis` coordinate equals `value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneSpec {
    /// 0 for x, 1 for y.
    pub axis: usize,
    /// Coordinate of the plane.
    pub value: f64,
}

/// A bounding-box side for cross-section requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Minimum x.
    Left,
    /// Maximum x.
    Right,
    /// Minimum y.
    Bottom,
    /// Maximum y.
    Top,
}

impl Side {
    /// The axis the side constrains.
    pub fn axis(&self) -> usize {
        match self {
            Self::Left | Self::Right => 0,
            Self::Bottom | Self::Top => 1,
        }
    }

    /// The side's plane coordinate within a bounding box.
    pub fn plane(&self, bbox: (Point, Point)) -> f64 {
        let (min, max) = bbox;
        match self {
            Self::Left => min[0],
            Self::Right => max[0],
            Self::Bottom => min[1],
            Self::Top => max[1],
        }
    }

    /// The lowercase name used in output files.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Top => "top",
        }
    }
}

/// How a named boundary claims facets.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundarySpec {
    /// Exterior facets on any of the listed planes.
    Planes(Vec<PlaneSpec>),
    /// A periodic pairing along an axis; marks the master plane (the
    /// axis minimum), matching how a constrained domain is declared.
    Periodic {
        /// The paired axis.
        axis: usize,
    },
    /// Facets on a bounding-box side, integrated with the +axis
    /// normal regardless of cell orientation.
    CrossSection(Side),
}

/// Geometry of one marked facet, ready for integration.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetGeom {
    /// Endpoint node indices.
    pub nodes: [u32; 2],
    /// First endpoint coordinates.
    pub a: Point,
    /// Second endpoint coordinates.
    pub b: Point,
    /// The adjacent cell gradients are taken from.
    pub cell: u32,
    /// Unit normal used for `flux · n`.
    pub normal: [f64; 2],
    /// Facet length.
    pub length: f64,
}

/// An integration measure restricted to one boundary's facets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Measure {
    /// The boundary's facets.
    pub facets: Vec<FacetGeom>,
}

struct Entry {
    pass: usize,
    marker: MarkerId,
    measure: Measure,
}

/// Named boundaries resolved against a mesh.
///
/// Boundaries are marked in two passes: pass 0 holds the periodic
/// pairing (first, when present) and the named exterior boundaries;
/// pass 1 holds the cross-sections. Within each pass markers count
/// from 1 in supplied order, overwriting earlier claims on contested
/// facets; 0 stays reserved for unmarked facets.
pub struct BoundaryRegistry {
    entries: IndexMap<String, Entry>,
}

impl BoundaryRegistry {
    /// Mark the supplied boundaries onto a mesh.
    pub fn build(
        topology: &MeshTopology,
        specs: &[(String, BoundarySpec)],
    ) -> Result<Self, AnalysisError> {
        let facets = topology.facets();
        let bbox = topology.bounding_box();

        // Split into passes, keeping supplied order within each.
        let mut passes: [Vec<(usize, &str, &BoundarySpec)>; 2] = [Vec::new(), Vec::new()];
        for (slot, (name, spec)) in specs.iter().enumerate() {
            let pass = match spec {
                BoundarySpec::Planes(_) | BoundarySpec::Periodic { .. } => 0,
                BoundarySpec::CrossSection(_) => 1,
            };
            passes[pass].push((slot, name.as_str(), spec));
        }

        let mut entries: IndexMap<String, Entry> = IndexMap::new();
        for (pass, boundaries) in passes.iter().enumerate() {
            let mut markers = vec![MarkerId::UNMARKED; facets.len()];
            for (i, &(_, name, spec)) in boundaries.iter().enumerate() {
                let marker = MarkerId(i as u32 + 1);
                for (fi, facet) in facets.iter().enumerate() {
                    let a = topology.nodes()[facet.nodes[0] as usize];
                    let b = topology.nodes()[facet.nodes[1] as usize];
                    if claims(spec, bbox, a, b, facet.is_exterior()) {
                        markers[fi] = marker;
                    }
                }
                entries.insert(
                    name.to_string(),
                    Entry {
                        pass,
                        marker,
                        measure: Measure::default(),
                    },
                );
            }
            // Build measures from the settled marker array.
            for (i, &(_, name, spec)) in boundaries.iter().enumerate() {
                let marker = MarkerId(i as u32 + 1);
                let mut measure = Measure::default();
                for (fi, facet) in facets.iter().enumerate() {
                    if markers[fi] != marker {
                        continue;
                    }
                    let a = topology.nodes()[facet.nodes[0] as usize];
                    let b = topology.nodes()[facet.nodes[1] as usize];
                    let cell = facet.cells[0];
                    let normal = match spec {
                        BoundarySpec::CrossSection(side) => {
                            let mut n = [0.0, 0.0];
                            n[side.axis()] = 1.0;
                            n
                        }
                        _ => {
                            let corners = topology.cell_corners(cell);
                            let opposite = corners
                                .into_iter()
                                .find(|&c| c != a && c != b)
                                .unwrap_or(corners[0]);
                            facet_normal(a, b, opposite)
                        }
                    };
                    measure.facets.push(FacetGeom {
                        nodes: facet.nodes,
                        a,
                        b,
                        cell,
                        normal,
                        length: facet_length(a, b),
                    });
                }
                if let Some(entry) = entries.get_mut(name) {
                    entry.measure = measure;
                }
            }
        }

        Ok(Self { entries })
    }

    /// Assemble a problem's boundaries plus cross-section requests:
    /// the periodic pairing first (when the problem has one), then the
    /// problem's named boundaries, then `extra_<side>` cross-sections.
    pub fn from_problem(
        topology: &MeshTopology,
        provider: &dyn crate::provider::ProblemProvider,
        extra: &[Side],
    ) -> Result<Self, AnalysisError> {
        let bbox = topology.bounding_box();
        let mut specs = Vec::new();
        if let Some(periodic) = provider.periodic(bbox) {
            specs.push(("periodic".to_string(), periodic));
        }
        specs.extend(provider.boundaries(bbox));
        for side in extra {
            specs.push((
                format!("extra_{}", side.label()),
                BoundarySpec::CrossSection(*side),
            ));
        }
        Self::build(topology, &specs)
    }

    /// Boundary names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// A boundary's `(pass, marker)` assignment.
    pub fn marker(&self, name: &str) -> Option<(usize, MarkerId)> {
        self.entries.get(name).map(|e| (e.pass, e.marker))
    }

    /// A boundary's integration measure.
    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.entries.get(name).map(|e| &e.measure)
    }
}

fn near(v: f64, plane: f64) -> bool {
    (v - plane).abs() <= PLANE_TOL
}

fn on_plane(spec: &PlaneSpec, a: Point, b: Point) -> bool {
    near(a[spec.axis], spec.value) && near(b[spec.axis], spec.value)
}

fn claims(
    spec: &BoundarySpec,
    bbox: (Point, Point),
    a: Point,
    b: Point,
    exterior: bool,
) -> bool {
    match spec {
        BoundarySpec::Planes(planes) => {
            exterior && planes.iter().any(|plane| on_plane(plane, a, b))
        }
        BoundarySpec::Periodic { axis } => {
            let master = PlaneSpec {
                axis: *axis,
                value: bbox.0[*axis],
            };
            exterior && on_plane(&master, a, b)
        }
        BoundarySpec::CrossSection(side) => {
            let plane = PlaneSpec {
                axis: side.axis(),
                value: side.plane(bbox),
            };
            on_plane(&plane, a, b)
        }
    }
}
