//! The fixed archive folder convention.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;

/// Resolves paths inside a results folder.
///
/// `settings/` and `timeseries/` are inputs and must exist when the
/// archive is opened. `analysis/`, `statistics/`, and `plots/` are
/// output areas created on first use.
#[derive(Clone, Debug)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    /// Bind to a results folder, validating the input substructure.
    pub fn open(root: &Path) -> Result<Self, ArchiveError> {
        let layout = Self {
            root: root.to_path_buf(),
        };
        for dir in [layout.settings_dir(), layout.timeseries_dir()] {
            if !dir.is_dir() {
                return Err(ArchiveError::MissingLayout { path: dir });
            }
        }
        Ok(layout)
    }

    /// The archive root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-checkpoint parameter records.
    pub fn settings_dir(&self) -> PathBuf {
        self.root.join("settings")
    }

    /// Index documents and payload stores.
    pub fn timeseries_dir(&self) -> PathBuf {
        self.root.join("timeseries")
    }

    /// Analysis output area, created on demand.
    pub fn analysis_dir(&self) -> Result<PathBuf, ArchiveError> {
        self.output_dir("analysis")
    }

    /// Statistics output area, created on demand.
    pub fn statistics_dir(&self) -> Result<PathBuf, ArchiveError> {
        self.output_dir("statistics")
    }

    /// Plot/frame output area, created on demand.
    pub fn plots_dir(&self) -> Result<PathBuf, ArchiveError> {
        self.output_dir("plots")
    }

    /// Scratch area for intermediate frames, created on demand.
    pub fn tmp_dir(&self) -> Result<PathBuf, ArchiveError> {
        self.output_dir(".tmp")
    }

    /// Parameter record path for a checkpoint.
    pub fn parameters_path(&self, start_step: u64) -> PathBuf {
        self.settings_dir()
            .join(format!("parameters_from_step_{start_step}.dat"))
    }

    /// Index document path for a field within a checkpoint.
    pub fn index_path(&self, field: &str, start_step: u64) -> PathBuf {
        self.timeseries_dir()
            .join(format!("{field}_from_step_{start_step}.idx"))
    }

    /// Payload store path for a field within a checkpoint.
    pub fn store_path(&self, field: &str, start_step: u64) -> PathBuf {
        self.timeseries_dir()
            .join(format!("{field}_from_step_{start_step}.bin"))
    }

    fn output_dir(&self, name: &str) -> Result<PathBuf, ArchiveError> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_timeseries_is_rejected() {
        let root = std::env::temp_dir().join("brine-layout-test-missing");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("settings")).unwrap();
        let err = ArchiveLayout::open(&root).unwrap_err();
        match err {
            ArchiveError::MissingLayout { path } => {
                assert!(path.ends_with("timeseries"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn paths_follow_the_convention() {
        let root = std::env::temp_dir().join("brine-layout-test-paths");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("settings")).unwrap();
        fs::create_dir_all(root.join("timeseries")).unwrap();
        let layout = ArchiveLayout::open(&root).unwrap();
        assert!(layout
            .parameters_path(200)
            .ends_with("settings/parameters_from_step_200.dat"));
        assert!(layout
            .index_path("phi", 0)
            .ends_with("timeseries/phi_from_step_0.idx"));
        assert!(layout
            .store_path("u", 400)
            .ends_with("timeseries/u_from_step_400.bin"));
        let _ = fs::remove_dir_all(&root);
    }
}
