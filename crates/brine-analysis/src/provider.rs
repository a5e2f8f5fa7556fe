//! Problem providers: the per-problem knowledge analyses need.
//!
//! Each simulated problem contributes its boundary map, an optional
//! periodic pairing, its solute roster, and its phase-field mobility
//! function. Providers are compiled in and resolved by the `problem`
//! name carried in the checkpoint parameter record.

use brine_core::Point;

use crate::boundary::{BoundarySpec, PlaneSpec};
use crate::error::AnalysisError;

/// A dissolved species: its concentration field, valency, and
/// per-phase diffusivities and solubility energies.
#[derive(Clone, Debug, PartialEq)]
pub struct Solute {
    /// Name of the concentration field in the archive.
    pub name: String,
    /// Charge valency z.
    pub valency: f64,
    /// Diffusivity in each phase.
    pub diffusivity: [f64; 2],
    /// Solubility energy (beta) in each phase.
    pub beta: [f64; 2],
}

/// Per-problem knowledge required by the analyses.
///
/// `bbox` is the mesh bounding box as `(min, max)`; providers place
/// their boundaries against it rather than hard-coding extents.
pub trait ProblemProvider: Send + Sync {
    /// The provider's registry name.
    fn name(&self) -> &'static str;

    /// Named exterior boundaries, in marking order. The periodic
    /// pairing, if any, is returned separately and marked first.
    fn boundaries(&self, bbox: (Point, Point)) -> Vec<(String, BoundarySpec)>;

    /// Periodic pairing, if the problem has one.
    fn periodic(&self, bbox: (Point, Point)) -> Option<BoundarySpec>;

    /// The problem's solute roster.
    fn solutes(&self) -> Vec<Solute>;

    /// Phase-field mobility at a nodal `phi` value.
    fn mobility(&self, phi: f64, coeff: f64) -> f64;
}

/// Resolve a provider by the name recorded in the parameters.
pub fn resolve_provider(name: &str) -> Result<&'static dyn ProblemProvider, AnalysisError> {
    match name {
        "simple" => Ok(&Simple),
        "channel" => Ok(&Channel),
        _ => Err(AnalysisError::UnknownProvider {
            name: name.to_string(),
        }),
    }
}

/// The electrowetting box: periodic in x, electrode plates at the top
/// and bottom walls, one symmetric solute pair.
struct Simple;

impl ProblemProvider for Simple {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn boundaries(&self, bbox: (Point, Point)) -> Vec<(String, BoundarySpec)> {
        let (min, max) = bbox;
        vec![
            (
                "top".to_string(),
                BoundarySpec::Planes(vec![PlaneSpec {
                    axis: 1,
                    value: max[1],
                }]),
            ),
            (
                "bottom".to_string(),
                BoundarySpec::Planes(vec![PlaneSpec {
                    axis: 1,
                    value: min[1],
                }]),
            ),
        ]
    }

    fn periodic(&self, _bbox: (Point, Point)) -> Option<BoundarySpec> {
        Some(BoundarySpec::Periodic { axis: 0 })
    }

    fn solutes(&self) -> Vec<Solute> {
        vec![
            Solute {
                name: "c_p".to_string(),
                valency: 1.0,
                diffusivity: [1.0, 1.0],
                beta: [1.0, 1.0],
            },
            Solute {
                name: "c_m".to_string(),
                valency: -1.0,
                diffusivity: [1.0, 1.0],
                beta: [1.0, 1.0],
            },
        ]
    }

    fn mobility(&self, phi: f64, coeff: f64) -> f64 {
        // Mobility vanishes outside the interfacial region.
        let func = 1.0 - phi * phi;
        0.75 * coeff * 0.5 * (1.0 + func.signum()) * func
    }
}

/// A straight channel: inlet left, outlet right, solid walls at the
/// top and bottom, no periodicity, constant mobility.
struct Channel;

impl ProblemProvider for Channel {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn boundaries(&self, bbox: (Point, Point)) -> Vec<(String, BoundarySpec)> {
        let (min, max) = bbox;
        vec![
            (
                "inlet".to_string(),
                BoundarySpec::Planes(vec![PlaneSpec {
                    axis: 0,
                    value: min[0],
                }]),
            ),
            (
                "outlet".to_string(),
                BoundarySpec::Planes(vec![PlaneSpec {
                    axis: 0,
                    value: max[0],
                }]),
            ),
            (
                "walls".to_string(),
                BoundarySpec::Planes(vec![
                    PlaneSpec {
                        axis: 1,
                        value: min[1],
                    },
                    PlaneSpec {
                        axis: 1,
                        value: max[1],
                    },
                ]),
            ),
        ]
    }

    fn periodic(&self, _bbox: (Point, Point)) -> Option<BoundarySpec> {
        None
    }

    fn solutes(&self) -> Vec<Solute> {
        vec![
            Solute {
                name: "c_p".to_string(),
                valency: 1.0,
                diffusivity: [1.0, 0.1],
                beta: [1.0, 2.0],
            },
            Solute {
                name: "c_m".to_string(),
                valency: -1.0,
                diffusivity: [1.0, 0.1],
                beta: [1.0, 2.0],
            },
        ]
    }

    fn mobility(&self, _phi: f64, coeff: f64) -> f64 {
        coeff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_providers() {
        assert_eq!(resolve_provider("simple").unwrap().name(), "simple");
        assert_eq!(resolve_provider("channel").unwrap().name(), "channel");
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        assert!(matches!(
            resolve_provider("taylor_green"),
            Err(AnalysisError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn simple_mobility_vanishes_in_the_bulk() {
        let p = resolve_provider("simple").unwrap();
        assert_eq!(p.mobility(1.5, 1.0), 0.0);
        assert_eq!(p.mobility(-1.5, 1.0), 0.0);
        // At phi = 0 the factor is 0.75 * coeff.
        assert!((p.mobility(0.0, 2.0) - 1.5).abs() < 1e-14);
    }

    #[test]
    fn simple_is_periodic_in_x_only() {
        let p = resolve_provider("simple").unwrap();
        let bbox = ([0.0, 0.0], [1.0, 2.0]);
        assert!(matches!(
            p.periodic(bbox),
            Some(BoundarySpec::Periodic { axis: 0 })
        ));
        assert!(resolve_provider("channel").unwrap().periodic(bbox).is_none());
    }
}
