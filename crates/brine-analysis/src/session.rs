//! An analysis session: a loaded series bound to a function space.

use std::sync::Arc;

use indexmap::IndexMap;

use brine_archive::TimeSeries;
use brine_core::Communicator;
use brine_mesh::{CoordinateIndex, Function, FunctionSpace, MeshTopology};

use crate::error::AnalysisError;
use crate::flux::FieldValues;
use crate::update::FieldUpdater;

/// Select the analyzed steps: every step when `interval <= 0`, else
/// step 0 and then each next step at least `interval` after the last
/// selected one (with a small slack for accumulated rounding).
pub fn steps_by_interval(times: &[f64], interval: f64) -> Vec<usize> {
    if interval <= 0.0 {
        return (0..times.len()).collect();
    }
    let mut selected = Vec::new();
    let mut last = f64::NEG_INFINITY;
    for (step, &t) in times.iter().enumerate() {
        if selected.is_empty() || t >= last + interval - 1e-12 {
            selected.push(step);
            last = t;
        }
    }
    selected
}

/// A loaded [`TimeSeries`] bound to a function space, a shared
/// coordinate index, and one [`Function`] per loaded field.
///
/// The session is the working state of every analysis driver: pick a
/// step, update the functions from that step's frames, evaluate.
pub struct Session<'c> {
    comm: &'c dyn Communicator,
    series: TimeSeries,
    space: FunctionSpace,
    index: CoordinateIndex,
    functions: IndexMap<String, Function>,
}

impl<'c> Session<'c> {
    /// Bind a loaded series to a group: build the space, share the
    /// coordinate index from rank 0, and allocate a zeroed function
    /// per loaded field.
    pub fn new(series: TimeSeries, comm: &'c dyn Communicator) -> Result<Self, AnalysisError> {
        let topology = Arc::clone(series.topology());
        let space = FunctionSpace::build(topology, comm);
        let index = CoordinateIndex::build_and_share(space.topology(), comm)?;
        let functions = series
            .field_names()
            .map(|name| {
                let kind = series
                    .field(name)
                    .map(|f| f.kind())
                    .unwrap_or(brine_core::FieldKind::Scalar);
                (
                    name.to_string(),
                    Function::new(name, kind, space.n_dofs()),
                )
            })
            .collect();
        Ok(Self {
            comm,
            series,
            space,
            index,
            functions,
        })
    }

    /// The session's group.
    pub fn comm(&self) -> &dyn Communicator {
        self.comm
    }

    /// The loaded series.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// Mutable access to the series, for derived-field registration.
    pub fn series_mut(&mut self) -> &mut TimeSeries {
        &mut self.series
    }

    /// The function space.
    pub fn space(&self) -> &FunctionSpace {
        &self.space
    }

    /// The shared coordinate index.
    pub fn index(&self) -> &CoordinateIndex {
        &self.index
    }

    /// The mesh.
    pub fn topology(&self) -> &MeshTopology {
        self.space.topology()
    }

    /// One field's current function state.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Load one field's frame at a step into its function.
    pub fn update(&mut self, name: &str, step: usize) -> Result<(), AnalysisError> {
        let frame = self
            .series
            .frame(name, step)
            .ok_or_else(|| AnalysisError::UnknownField {
                field: name.to_string(),
            })?
            .to_vec();
        let function = self
            .functions
            .get_mut(name)
            .ok_or_else(|| AnalysisError::UnknownField {
                field: name.to_string(),
            })?;
        let updater = FieldUpdater::new(&self.space, &self.index);
        updater.update(function, &frame, self.comm)
    }

    /// Load every field's frame at a step.
    pub fn update_all(&mut self, step: usize) -> Result<(), AnalysisError> {
        let names: Vec<String> = self.functions.keys().cloned().collect();
        for name in names {
            self.update(&name, step)?;
        }
        Ok(())
    }

    /// Snapshot the current function state as node-ordered values,
    /// one array per component, for coefficient evaluation.
    pub fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        for (name, function) in &self.functions {
            let components = (0..function.kind().components() as usize)
                .map(|c| function.node_values(&self.space, c))
                .collect();
            values.insert(name, components);
        }
        values
    }
}
