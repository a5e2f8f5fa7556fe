//! Checkpoint discovery from the settings folder.

use std::fs;

use brine_core::ParameterSet;

use crate::error::ArchiveError;
use crate::layout::ArchiveLayout;

/// One restart segment of a run: the step it resumed from and the
/// parameter record in force for its snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    /// The simulation step this segment started from.
    pub start_step: u64,
    /// The segment's parameter record.
    pub parameters: ParameterSet,
}

/// Scan `settings/` for `parameters_from_step_<N>.dat` records.
///
/// Files not matching the naming convention are ignored. Checkpoints
/// are returned ordered by `start_step`; an empty settings folder is
/// [`ArchiveError::NoCheckpoints`].
pub fn discover(layout: &ArchiveLayout) -> Result<Vec<Checkpoint>, ArchiveError> {
    let mut checkpoints = Vec::new();
    for entry in fs::read_dir(layout.settings_dir())? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(start_step) = parse_start_step(&name.to_string_lossy()) else {
            continue;
        };
        let text = fs::read_to_string(entry.path())?;
        checkpoints.push(Checkpoint {
            start_step,
            parameters: ParameterSet::parse(&text)?,
        });
    }
    if checkpoints.is_empty() {
        return Err(ArchiveError::NoCheckpoints);
    }
    checkpoints.sort_by_key(|c| c.start_step);
    Ok(checkpoints)
}

/// Extract `N` from `parameters_from_step_<N>.dat`.
fn parse_start_step(name: &str) -> Option<u64> {
    name.strip_prefix("parameters_from_step_")?
        .strip_suffix(".dat")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_step_extraction() {
        assert_eq!(parse_start_step("parameters_from_step_0.dat"), Some(0));
        assert_eq!(parse_start_step("parameters_from_step_400.dat"), Some(400));
        assert_eq!(parse_start_step("parameters_from_step_.dat"), None);
        assert_eq!(parse_start_step("notes.txt"), None);
        assert_eq!(parse_start_step("parameters_from_step_4.bak"), None);
    }

    #[test]
    fn discovery_orders_by_start_step() {
        let root = std::env::temp_dir().join("brine-checkpoint-test");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("settings")).unwrap();
        fs::create_dir_all(root.join("timeseries")).unwrap();
        fs::write(
            root.join("settings/parameters_from_step_400.dat"),
            "dt=0.08\n",
        )
        .unwrap();
        fs::write(
            root.join("settings/parameters_from_step_0.dat"),
            "dt=0.04\n",
        )
        .unwrap();
        fs::write(root.join("settings/README"), "not a record").unwrap();

        let layout = ArchiveLayout::open(&root).unwrap();
        let checkpoints = discover(&layout).unwrap();
        assert_eq!(checkpoints.len(), 2);
        assert_eq!(checkpoints[0].start_step, 0);
        assert_eq!(checkpoints[0].parameters.get_float("dt"), Some(0.04));
        assert_eq!(checkpoints[1].start_step, 400);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn empty_settings_is_an_error() {
        let root = std::env::temp_dir().join("brine-checkpoint-test-empty");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("settings")).unwrap();
        fs::create_dir_all(root.join("timeseries")).unwrap();
        let layout = ArchiveLayout::open(&root).unwrap();
        assert!(matches!(
            discover(&layout),
            Err(ArchiveError::NoCheckpoints)
        ));
        let _ = fs::remove_dir_all(&root);
    }
}
