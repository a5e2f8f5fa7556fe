//! Boundary flux accounting.
//!
//! A flux is a sum of advective and gradient terms with scalar
//! coefficients; the coefficient grammar covers everything the
//! two-phase electrohydrodynamics model transports (phase ramps,
//! mobility, valency-weighted concentrations). Integration over a
//! boundary measure is linear in the expression by construction.

use indexmap::IndexMap;

use brine_core::ParameterSet;
use brine_mesh::{p1_gradient, MeshTopology};

use crate::boundary::{BoundaryRegistry, FacetGeom, Measure, Side};
use crate::error::AnalysisError;
use crate::provider::{resolve_provider, ProblemProvider};
use crate::session::{steps_by_interval, Session};
use crate::table::Table;

/// Phase-weighted average of a per-phase pair:
/// `ramp(phi, [a, b]) = 0.5 (a (1 + phi) + b (1 - phi))`.
pub fn ramp(phi: f64, pair: [f64; 2]) -> f64 {
    0.5 * (pair[0] * (1.0 + phi) + pair[1] * (1.0 - phi))
}

/// Derivative of [`ramp`] with respect to phi.
pub fn dramp(pair: [f64; 2]) -> f64 {
    0.5 * (pair[0] - pair[1])
}

/// Node-ordered values of every session field, one array per
/// component, used as the evaluation context for flux coefficients.
#[derive(Clone, Debug, Default)]
pub struct FieldValues {
    map: IndexMap<String, Vec<Vec<f64>>>,
}

impl FieldValues {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field's per-component node arrays.
    pub fn insert(&mut self, name: &str, components: Vec<Vec<f64>>) {
        self.map.insert(name.to_string(), components);
    }

    fn components(&self, name: &str) -> Result<&[Vec<f64>], AnalysisError> {
        self.map
            .get(name)
            .map(|c| c.as_slice())
            .ok_or_else(|| AnalysisError::UnknownField {
                field: name.to_string(),
            })
    }

    fn scalar(&self, name: &str) -> Result<&[f64], AnalysisError> {
        Ok(&self.components(name)?[0])
    }

    /// One component's node-ordered values.
    pub fn component(&self, name: &str, component: usize) -> Result<&[f64], AnalysisError> {
        let components = self.components(name)?;
        if component >= components.len() {
            return Err(AnalysisError::NotAVectorField {
                field: name.to_string(),
            });
        }
        Ok(&components[component])
    }

    fn vector(&self, name: &str, node: usize) -> Result<[f64; 2], AnalysisError> {
        let components = self.components(name)?;
        if components.len() < 2 {
            return Err(AnalysisError::NotAVectorField {
                field: name.to_string(),
            });
        }
        Ok([components[0][node], components[1][node]])
    }
}

/// A nodal scalar coefficient.
#[derive(Clone, Debug, PartialEq)]
pub enum Coeff {
    /// A constant.
    Constant(f64),
    /// The nodal value of a scalar field.
    Field(String),
    /// `ramp(phi, pair)` with `phi` a scalar field.
    Ramp {
        /// The phase field name.
        phi: String,
        /// The per-phase pair.
        pair: [f64; 2],
    },
    /// `dramp(pair)`, a constant derived from a per-phase pair.
    DRamp {
        /// The per-phase pair.
        pair: [f64; 2],
    },
    /// The problem's phase-field mobility at the nodal phi value.
    Mobility {
        /// The phase field name.
        phi: String,
        /// The mobility coefficient from the parameters.
        coeff: f64,
    },
    /// The product of two coefficients.
    Product(Box<Coeff>, Box<Coeff>),
}

impl Coeff {
    /// Multiply by a constant.
    pub fn scaled(self, s: f64) -> Coeff {
        Coeff::Product(Box::new(Coeff::Constant(s)), Box::new(self))
    }

    fn eval(
        &self,
        node: usize,
        values: &FieldValues,
        provider: &dyn ProblemProvider,
    ) -> Result<f64, AnalysisError> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Field(name) => Ok(values.scalar(name)?[node]),
            Self::Ramp { phi, pair } => Ok(ramp(values.scalar(phi)?[node], *pair)),
            Self::DRamp { pair } => Ok(dramp(*pair)),
            Self::Mobility { phi, coeff } => {
                Ok(provider.mobility(values.scalar(phi)?[node], *coeff))
            }
            Self::Product(a, b) => {
                Ok(a.eval(node, values, provider)? * b.eval(node, values, provider)?)
            }
        }
    }
}

/// One term of a flux expression.
#[derive(Clone, Debug, PartialEq)]
pub enum FluxTerm {
    /// `coeff * field`, with `field` a vector field (advection).
    Advect {
        /// The scalar coefficient.
        coeff: Coeff,
        /// The advecting vector field.
        field: String,
    },
    /// `coeff * grad(field)`, with `field` a scalar field.
    Grad {
        /// The scalar coefficient.
        coeff: Coeff,
        /// The differentiated scalar field.
        field: String,
    },
}

/// A flux: the sum of its terms. An empty expression integrates to 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxExpr {
    /// The summed terms.
    pub terms: Vec<FluxTerm>,
}

impl FluxExpr {
    /// Integrate `flux · n` over a boundary measure.
    ///
    /// Nodal traces use the two-endpoint trapezoid rule per facet;
    /// gradients are the adjacent cell's P1 gradient. Both are exact
    /// for the piecewise-linear representation.
    pub fn integrate(
        &self,
        topology: &MeshTopology,
        measure: &Measure,
        values: &FieldValues,
        provider: &dyn ProblemProvider,
    ) -> Result<f64, AnalysisError> {
        let mut total = 0.0;
        for facet in &measure.facets {
            let va = self.normal_value(topology, facet, 0, values, provider)?;
            let vb = self.normal_value(topology, facet, 1, values, provider)?;
            total += facet.length * 0.5 * (va + vb);
        }
        Ok(total)
    }

    /// `flux · n` at one facet endpoint.
    fn normal_value(
        &self,
        topology: &MeshTopology,
        facet: &FacetGeom,
        endpoint: usize,
        values: &FieldValues,
        provider: &dyn ProblemProvider,
    ) -> Result<f64, AnalysisError> {
        let node = facet.nodes[endpoint] as usize;
        let n = facet.normal;
        let mut out = 0.0;
        for term in &self.terms {
            match term {
                FluxTerm::Advect { coeff, field } => {
                    let u = values.vector(field, node)?;
                    out += coeff.eval(node, values, provider)? * (u[0] * n[0] + u[1] * n[1]);
                }
                FluxTerm::Grad { coeff, field } => {
                    let corners = topology.cell_corners(facet.cell);
                    let element = topology.elements()[facet.cell as usize];
                    let nodal = values.scalar(field)?;
                    let grad = p1_gradient(
                        &corners,
                        [
                            nodal[element[0] as usize],
                            nodal[element[1] as usize],
                            nodal[element[2] as usize],
                        ],
                    );
                    out += coeff.eval(node, values, provider)? * (grad[0] * n[0] + grad[1] * n[1]);
                }
            }
        }
        Ok(out)
    }
}

/// Build the model's flux table from the parameters in force.
///
/// The expression set mirrors what the solver transports, gated by the
/// `enable_ns` / `enable_pf` / `enable_ec` flags: bulk velocity, phase
/// flux with its mobility correction, mass flux, one diffusive plus
/// electromigrative flux per solute, and the electric field.
pub fn build_fluxes(
    params: &ParameterSet,
    provider: &dyn ProblemProvider,
) -> Result<IndexMap<String, FluxExpr>, AnalysisError> {
    let enable_ns = params.require_bool("enable_ns")?;
    let enable_pf = params.require_bool("enable_pf")?;
    let enable_ec = params.require_bool("enable_ec")?;

    let mut fluxes = IndexMap::new();

    let mut velocity = FluxExpr::default();
    if enable_ns {
        velocity.terms.push(FluxTerm::Advect {
            coeff: Coeff::Constant(1.0),
            field: "u".to_string(),
        });
    }
    fluxes.insert("Velocity".to_string(), velocity);

    let mobility = |params: &ParameterSet| -> Result<Coeff, AnalysisError> {
        Ok(Coeff::Mobility {
            phi: "phi".to_string(),
            coeff: params.require_float("pf_mobility_coeff")?,
        })
    };

    let mut phase = FluxExpr::default();
    if enable_ns {
        let coeff = if enable_pf {
            Coeff::Field("phi".to_string())
        } else {
            // With the phase field disabled phi is identically 1.
            Coeff::Constant(1.0)
        };
        phase.terms.push(FluxTerm::Advect {
            coeff,
            field: "u".to_string(),
        });
    }
    if enable_pf {
        phase.terms.push(FluxTerm::Grad {
            coeff: mobility(params)?.scaled(-1.0),
            field: "g".to_string(),
        });
    }
    fluxes.insert("Phase".to_string(), phase);

    let mut mass = FluxExpr::default();
    if enable_ns || enable_pf {
        let density = [
            params.require_float("density_1")?,
            params.require_float("density_2")?,
        ];
        if enable_ns {
            let rho = if enable_pf {
                Coeff::Ramp {
                    phi: "phi".to_string(),
                    pair: density,
                }
            } else {
                Coeff::Constant(density[0])
            };
            mass.terms.push(FluxTerm::Advect {
                coeff: rho,
                field: "u".to_string(),
            });
        }
        if enable_pf {
            mass.terms.push(FluxTerm::Grad {
                coeff: mobility(params)?.scaled(-dramp(density)),
                field: "g".to_string(),
            });
        }
    }
    fluxes.insert("Mass".to_string(), mass);

    if enable_ec {
        for solute in provider.solutes() {
            let k = if enable_pf {
                Coeff::Ramp {
                    phi: "phi".to_string(),
                    pair: solute.diffusivity,
                }
            } else {
                Coeff::Constant(solute.diffusivity[0])
            };
            let mut terms = vec![
                FluxTerm::Grad {
                    coeff: k.clone(),
                    field: solute.name.clone(),
                },
                FluxTerm::Grad {
                    coeff: Coeff::Product(
                        Box::new(k.clone()),
                        Box::new(
                            Coeff::Field(solute.name.clone()).scaled(solute.valency),
                        ),
                    ),
                    field: "V".to_string(),
                },
            ];
            if enable_pf {
                terms.push(FluxTerm::Grad {
                    coeff: Coeff::Product(
                        Box::new(k),
                        Box::new(Coeff::DRamp { pair: solute.beta }),
                    ),
                    field: "phi".to_string(),
                });
            }
            fluxes.insert(format!("Solute {}", solute.name), FluxExpr { terms });
        }
        fluxes.insert(
            "E-field".to_string(),
            FluxExpr {
                terms: vec![FluxTerm::Grad {
                    coeff: Coeff::Constant(-1.0),
                    field: "V".to_string(),
                }],
            },
        );
    }

    Ok(fluxes)
}

/// Options for [`flux_in_time`].
#[derive(Clone, Debug, Default)]
pub struct FluxOptions {
    /// Minimum time between analyzed steps; 0 analyzes every step.
    pub interval: f64,
    /// Cross-section requests added after the problem's boundaries.
    pub cross_sections: Vec<Side>,
}

/// Integrate every model flux over every registered boundary, per
/// analyzed step, and write one table per boundary
/// (`flux_in_time_<boundary>.dat`, columns `Step`, `Time`, then flux
/// names in lexicographic order). All ranks compute; rank 0 writes.
pub fn flux_in_time(session: &mut Session, options: &FluxOptions) -> Result<(), AnalysisError> {
    let first_time = session.series().times().first().copied().unwrap_or(0.0);
    let params = session.series().parameters_at(first_time).clone();
    let provider = resolve_provider(params.require_str("problem")?)?;
    let registry =
        BoundaryRegistry::from_problem(session.topology(), provider, &options.cross_sections)?;
    let fluxes = build_fluxes(&params, provider)?;

    let mut flux_names: Vec<String> = fluxes.keys().cloned().collect();
    flux_names.sort();
    let mut columns = vec!["Step".to_string(), "Time".to_string()];
    columns.extend(flux_names.iter().cloned());

    let mut tables: IndexMap<String, Table> = registry
        .names()
        .map(|name| (name.to_string(), Table::new(columns.clone())))
        .collect();

    let steps = steps_by_interval(session.series().times(), options.interval);
    for &step in &steps {
        session.update_all(step)?;
        let values = session.field_values();
        let time = session.series().times()[step];
        for (boundary, table) in tables.iter_mut() {
            let measure = match registry.measure(boundary) {
                Some(m) => m,
                None => continue,
            };
            let mut row = Vec::with_capacity(columns.len());
            row.push(step as f64);
            row.push(time);
            for name in &flux_names {
                row.push(fluxes[name].integrate(
                    session.topology(),
                    measure,
                    &values,
                    provider,
                )?);
            }
            table.push_row(row)?;
        }
    }

    if session.comm().rank() == 0 {
        let dir = session.series().layout().analysis_dir()?;
        for (boundary, table) in &tables {
            table.write(&dir.join(format!("flux_in_time_{boundary}.dat")))?;
        }
    }
    Ok(())
}
