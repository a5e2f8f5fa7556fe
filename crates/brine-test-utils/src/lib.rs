//! Test fixtures for Brine development.
//!
//! Provides the shared unit-square mesh and an [`ArchiveBuilder`] that
//! writes a complete on-disk results folder for integration tests.
//! Everything here panics on failure; it is test scaffolding, not
//! production code.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fs;
use std::path::{Path, PathBuf};

use brine_archive::PayloadWriter;
use brine_core::FieldKind;
use brine_mesh::MeshTopology;

/// The unit square split along the (0,0)-(1,1) diagonal: four nodes,
/// two cells. The workhorse mesh of the test suite.
pub fn unit_square() -> MeshTopology {
    MeshTopology::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
}

/// Builds an on-disk results folder: parameter records under
/// `settings/`, index documents and payload stores under `timeseries/`.
///
/// The target directory is wiped on construction, so each test should
/// use its own root.
pub struct ArchiveBuilder {
    root: PathBuf,
    mesh: MeshTopology,
}

impl ArchiveBuilder {
    /// Start a fresh archive at `root` over the unit-square mesh.
    pub fn new(root: &Path) -> Self {
        Self::with_mesh(root, unit_square())
    }

    /// Start a fresh archive at `root` over a custom mesh.
    pub fn with_mesh(root: &Path, mesh: MeshTopology) -> Self {
        let _ = fs::remove_dir_all(root);
        fs::create_dir_all(root.join("settings")).unwrap();
        fs::create_dir_all(root.join("timeseries")).unwrap();
        Self {
            root: root.to_path_buf(),
            mesh,
        }
    }

    /// Write a checkpoint's parameter record.
    pub fn checkpoint(self, start_step: u64, params: &str) -> Self {
        fs::write(
            self.root
                .join(format!("settings/parameters_from_step_{start_step}.dat")),
            params,
        )
        .unwrap();
        self
    }

    /// Write one field's payload store and index document for a
    /// checkpoint. Snapshots are `(time, frame)` pairs; vector frames
    /// are node-major with interleaved components.
    pub fn field(
        self,
        name: &str,
        kind: FieldKind,
        start_step: u64,
        snapshots: &[(f64, Vec<f64>)],
    ) -> Self {
        let bin = fs::File::create(
            self.root
                .join(format!("timeseries/{name}_from_step_{start_step}.bin")),
        )
        .unwrap();
        let mut writer = PayloadWriter::new(bin, name, kind, &self.mesh).unwrap();
        let mut idx = String::new();
        for (i, (time, values)) in snapshots.iter().enumerate() {
            let dataset = format!("{name}/{i}");
            writer.write_dataset(&dataset, values).unwrap();
            idx.push_str(&format!("{time}\t{dataset}\n"));
        }
        fs::write(
            self.root
                .join(format!("timeseries/{name}_from_step_{start_step}.idx")),
            idx,
        )
        .unwrap();
        self
    }

    /// [`field`](Self::field) for a scalar.
    pub fn scalar_field(self, name: &str, start_step: u64, snapshots: &[(f64, Vec<f64>)]) -> Self {
        self.field(name, FieldKind::Scalar, start_step, snapshots)
    }

    /// [`field`](Self::field) for a 2-component vector.
    pub fn vector_field(self, name: &str, start_step: u64, snapshots: &[(f64, Vec<f64>)]) -> Self {
        self.field(name, FieldKind::Vector { dims: 2 }, start_step, snapshots)
    }

    /// The archive root, ready to load.
    pub fn build(self) -> PathBuf {
        self.root
    }
}
