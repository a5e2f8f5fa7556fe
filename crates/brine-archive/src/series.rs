//! The merged time series: every checkpoint's snapshots on one axis.

use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use brine_core::{FieldKind, ParameterSet};
use brine_mesh::MeshTopology;

use crate::checkpoint::{discover, Checkpoint};
use crate::error::ArchiveError;
use crate::index_doc;
use crate::layout::ArchiveLayout;
use crate::store::PayloadReader;

/// One field's snapshots along the merged time axis.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSeries {
    kind: FieldKind,
    frames: Vec<Vec<f64>>,
}

impl FieldSeries {
    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of frames.
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// The flat value array of one step.
    pub fn frame(&self, step: usize) -> &[f64] {
        &self.frames[step]
    }
}

/// Per-frame reductions of a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    /// Snapshot time.
    pub time: f64,
    /// Smallest value in the frame.
    pub min: f64,
    /// Largest value in the frame.
    pub max: f64,
    /// Arithmetic mean over the frame.
    pub mean: f64,
}

/// A results folder merged into a single queryable series.
///
/// Checkpoints are merged by a stable sort on snapshot time with no
/// deduplication: when a restart re-emits a time already covered by
/// the previous segment, both entries survive, earlier checkpoint
/// first. The time axis is taken from the first loaded field; every
/// other field must carry the same number of frames.
#[derive(Clone, Debug)]
pub struct TimeSeries {
    layout: ArchiveLayout,
    checkpoints: Vec<Checkpoint>,
    topology: Arc<MeshTopology>,
    times: Vec<f64>,
    /// Index into `checkpoints` for each step.
    step_checkpoint: Vec<usize>,
    fields: IndexMap<String, FieldSeries>,
}

impl TimeSeries {
    /// Open an archive and load the sought fields.
    ///
    /// A field absent from every checkpoint is omitted silently; a
    /// series with no loaded field at all is an error, as is a layout
    /// with no checkpoints.
    pub fn load(root: &Path, sought_fields: &[&str]) -> Result<Self, ArchiveError> {
        let layout = ArchiveLayout::open(root)?;
        let checkpoints = discover(&layout)?;

        let mut topology: Option<Arc<MeshTopology>> = None;
        let mut times: Vec<f64> = Vec::new();
        let mut step_checkpoint: Vec<usize> = Vec::new();
        let mut fields: IndexMap<String, FieldSeries> = IndexMap::new();

        for &field in sought_fields {
            let mut kind: Option<FieldKind> = None;
            let mut entries: Vec<(f64, usize, Vec<f64>)> = Vec::new();

            for (ci, checkpoint) in checkpoints.iter().enumerate() {
                let idx_path = layout.index_path(field, checkpoint.start_step);
                let bin_path = layout.store_path(field, checkpoint.start_step);
                if !idx_path.is_file() || !bin_path.is_file() {
                    continue;
                }

                let doc = index_doc::parse(&fs::read_to_string(&idx_path)?)?;
                let reader = PayloadReader::open(BufReader::new(fs::File::open(&bin_path)?))?;
                match kind {
                    None => kind = Some(reader.kind()),
                    Some(kind) if kind != reader.kind() => {
                        return Err(ArchiveError::FieldKindMismatch {
                            field: field.to_string(),
                        })
                    }
                    Some(_) => {}
                }
                let (mesh, mut datasets) = reader.read_all()?;
                match &topology {
                    None => topology = Some(Arc::new(mesh)),
                    Some(shared) => {
                        if shared.as_ref() != &mesh {
                            return Err(ArchiveError::MeshMismatch { path: bin_path });
                        }
                    }
                }

                for entry in doc {
                    let frame = datasets.shift_remove(&entry.dataset).ok_or_else(|| {
                        ArchiveError::MissingDataset {
                            dataset: entry.dataset.clone(),
                        }
                    })?;
                    entries.push((entry.time, ci, frame));
                }
            }

            let Some(kind) = kind else {
                // Field absent everywhere: not an error, just not loaded.
                continue;
            };
            // Stable by construction: equal times keep checkpoint order.
            entries.sort_by(|a, b| a.0.total_cmp(&b.0));

            if fields.is_empty() {
                times = entries.iter().map(|e| e.0).collect();
                step_checkpoint = entries.iter().map(|e| e.1).collect();
            } else if entries.len() != times.len() {
                return Err(ArchiveError::FrameCountMismatch {
                    field: field.to_string(),
                    expected: times.len(),
                    found: entries.len(),
                });
            }

            fields.insert(
                field.to_string(),
                FieldSeries {
                    kind,
                    frames: entries.into_iter().map(|e| e.2).collect(),
                },
            );
        }

        let Some(topology) = topology else {
            return Err(ArchiveError::NoFieldsLoaded);
        };

        Ok(Self {
            layout,
            checkpoints,
            topology,
            times,
            step_checkpoint,
            fields,
        })
    }

    /// The archive's folder layout.
    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// The discovered checkpoints, ordered by start step.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// The shared mesh.
    pub fn topology(&self) -> &Arc<MeshTopology> {
        &self.topology
    }

    /// The merged time axis.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of steps on the time axis.
    pub fn n_steps(&self) -> usize {
        self.times.len()
    }

    /// Names of the loaded fields, in load order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// One field's series, if loaded.
    pub fn field(&self, name: &str) -> Option<&FieldSeries> {
        self.fields.get(name)
    }

    /// One field's frame at a step, if loaded.
    pub fn frame(&self, name: &str, step: usize) -> Option<&[f64]> {
        self.fields.get(name).map(|f| f.frame(step))
    }

    /// The parameter record in force at a time: the record of the
    /// checkpoint that produced the last snapshot at or before `time`
    /// (the first checkpoint's record before any snapshot).
    pub fn parameters_at(&self, time: f64) -> &ParameterSet {
        let mut ci = 0;
        for (step, &t) in self.times.iter().enumerate() {
            if t <= time {
                ci = self.step_checkpoint[step];
            } else {
                break;
            }
        }
        &self.checkpoints[ci].parameters
    }

    /// Per-frame min/max/mean reductions of a loaded field.
    pub fn statistics(&self, name: &str) -> Result<Vec<FrameStats>, ArchiveError> {
        let series = self.fields.get(name).ok_or_else(|| ArchiveError::UnknownField {
            field: name.to_string(),
        })?;
        Ok(series
            .frames
            .iter()
            .zip(&self.times)
            .map(|(frame, &time)| {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                let mut sum = 0.0;
                for &v in frame {
                    min = min.min(v);
                    max = max.max(v);
                    sum += v;
                }
                FrameStats {
                    time,
                    min,
                    max,
                    mean: sum / frame.len() as f64,
                }
            })
            .collect())
    }

    /// Register a derived field computed outside the archive.
    pub fn add_field(
        &mut self,
        name: &str,
        kind: FieldKind,
        frames: Vec<Vec<f64>>,
    ) -> Result<(), ArchiveError> {
        if frames.len() != self.times.len() {
            return Err(ArchiveError::FrameCountMismatch {
                field: name.to_string(),
                expected: self.times.len(),
                found: frames.len(),
            });
        }
        let expected = self.topology.n_nodes() * kind.components() as usize;
        for (step, frame) in frames.iter().enumerate() {
            if frame.len() != expected {
                return Err(ArchiveError::FrameLengthMismatch {
                    dataset: format!("{name}/{step}"),
                    expected,
                    found: frame.len(),
                });
            }
        }
        self.fields.insert(name.to_string(), FieldSeries { kind, frames });
        Ok(())
    }

    /// Derive the free charge field from solute concentrations:
    /// the valency-weighted sum over `(concentration field, valency)`
    /// pairs, registered as `"charge"`.
    pub fn add_charge_field(&mut self, solutes: &[(String, f64)]) -> Result<(), ArchiveError> {
        let n = self.topology.n_nodes();
        let mut frames = vec![vec![0.0; n]; self.times.len()];
        for (field, valency) in solutes {
            let series = self.fields.get(field).ok_or_else(|| ArchiveError::UnknownField {
                field: field.clone(),
            })?;
            if series.kind != FieldKind::Scalar {
                return Err(ArchiveError::FieldKindMismatch {
                    field: field.clone(),
                });
            }
            for (frame, concentration) in frames.iter_mut().zip(&series.frames) {
                for (out, &c) in frame.iter_mut().zip(concentration) {
                    *out += valency * c;
                }
            }
        }
        self.add_field("charge", FieldKind::Scalar, frames)
    }
}
