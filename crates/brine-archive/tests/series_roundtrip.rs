//! End-to-end archive loading: write a two-checkpoint archive to disk,
//! load it back, and check the merge semantics.

use std::fs;
use std::path::{Path, PathBuf};

use brine_archive::{ArchiveError, PayloadWriter, TimeSeries};
use brine_core::FieldKind;
use brine_mesh::MeshTopology;

fn square() -> MeshTopology {
    MeshTopology::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
}

fn write_field(
    root: &Path,
    field: &str,
    kind: FieldKind,
    start_step: u64,
    snapshots: &[(f64, Vec<f64>)],
) {
    let mesh = square();
    let bin = fs::File::create(
        root.join(format!("timeseries/{field}_from_step_{start_step}.bin")),
    )
    .unwrap();
    let mut writer = PayloadWriter::new(bin, field, kind, &mesh).unwrap();
    let mut idx = String::new();
    for (i, (time, values)) in snapshots.iter().enumerate() {
        let dataset = format!("{field}/{i}");
        writer.write_dataset(&dataset, values).unwrap();
        idx.push_str(&format!("{time}\t{dataset}\n"));
    }
    fs::write(
        root.join(format!("timeseries/{field}_from_step_{start_step}.idx")),
        idx,
    )
    .unwrap();
}

fn build_archive(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("settings")).unwrap();
    fs::create_dir_all(root.join("timeseries")).unwrap();

    fs::write(
        root.join("settings/parameters_from_step_0.dat"),
        "problem=simple\ndt=0.04\nenable_ns=True\n",
    )
    .unwrap();
    fs::write(
        root.join("settings/parameters_from_step_400.dat"),
        "problem=simple\ndt=0.08\nenable_ns=True\n",
    )
    .unwrap();

    // Checkpoint 0 covers t = 0, 0.08, 0.16; the restart re-emits
    // t = 0.16 before continuing.
    write_field(
        &root,
        "phi",
        FieldKind::Scalar,
        0,
        &[
            (0.0, vec![0.0, 0.0, 0.0, 0.0]),
            (0.08, vec![0.5, -0.5, 0.5, -0.5]),
            (0.16, vec![1.0, 1.0, 1.0, 1.0]),
        ],
    );
    write_field(
        &root,
        "phi",
        FieldKind::Scalar,
        400,
        &[
            (0.16, vec![2.0, 2.0, 2.0, 2.0]),
            (0.24, vec![1.0, -1.0, 1.0, -1.0]),
        ],
    );
    for start in [0u64, 400] {
        let n = if start == 0 { 3 } else { 2 };
        let snapshots: Vec<(f64, Vec<f64>)> = (0..n)
            .map(|i| {
                let t = if start == 0 { 0.08 * i as f64 } else { 0.16 + 0.08 * i as f64 };
                (t, vec![t; 8])
            })
            .collect();
        write_field(&root, "u", FieldKind::Vector { dims: 2 }, start, &snapshots);
        let scalar: Vec<(f64, Vec<f64>)> = snapshots
            .iter()
            .map(|(t, _)| (*t, vec![*t + 1.0; 4]))
            .collect();
        write_field(&root, "c_p", FieldKind::Scalar, start, &scalar);
    }
    root
}

#[test]
fn merge_keeps_duplicates_in_checkpoint_order() {
    let root = build_archive("brine-series-test-merge");
    let series = TimeSeries::load(&root, &["phi", "u", "c_p", "ghost"]).unwrap();

    assert_eq!(series.times(), &[0.0, 0.08, 0.16, 0.16, 0.24]);
    // Stable merge: the earlier checkpoint's 0.16 frame comes first.
    assert_eq!(series.frame("phi", 2).unwrap(), &[1.0, 1.0, 1.0, 1.0]);
    assert_eq!(series.frame("phi", 3).unwrap(), &[2.0, 2.0, 2.0, 2.0]);

    // Absent field is omitted, not an error.
    assert!(series.field("ghost").is_none());
    let names: Vec<&str> = series.field_names().collect();
    assert_eq!(names, ["phi", "u", "c_p"]);

    assert_eq!(series.field("u").unwrap().kind(), FieldKind::Vector { dims: 2 });
    assert_eq!(series.topology().n_nodes(), 4);
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn parameters_follow_the_producing_checkpoint() {
    let root = build_archive("brine-series-test-params");
    let series = TimeSeries::load(&root, &["phi"]).unwrap();

    assert_eq!(series.parameters_at(0.0).get_float("dt"), Some(0.04));
    assert_eq!(series.parameters_at(0.1).get_float("dt"), Some(0.04));
    // At the restart overlap the restarted record is in force.
    assert_eq!(series.parameters_at(0.16).get_float("dt"), Some(0.08));
    assert_eq!(series.parameters_at(9.0).get_float("dt"), Some(0.08));
    // Before any snapshot the first record applies.
    assert_eq!(series.parameters_at(-1.0).get_float("dt"), Some(0.04));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn statistics_and_derived_fields() {
    let root = build_archive("brine-series-test-stats");
    let mut series = TimeSeries::load(&root, &["phi", "c_p"]).unwrap();

    let stats = series.statistics("phi").unwrap();
    assert_eq!(stats.len(), 5);
    let last = stats[4];
    assert_eq!(last.time, 0.24);
    assert_eq!(last.min, -1.0);
    assert_eq!(last.max, 1.0);
    assert_eq!(last.mean, 0.0);

    series
        .add_charge_field(&[("c_p".to_string(), 2.0)])
        .unwrap();
    let charge = series.frame("charge", 0).unwrap();
    assert_eq!(charge, &[2.0, 2.0, 2.0, 2.0]); // 2 * (t + 1) at t = 0

    assert!(matches!(
        series.statistics("nope"),
        Err(ArchiveError::UnknownField { .. })
    ));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn no_loaded_fields_is_an_error() {
    let root = build_archive("brine-series-test-none");
    assert!(matches!(
        TimeSeries::load(&root, &["ghost"]),
        Err(ArchiveError::NoFieldsLoaded)
    ));
    let _ = fs::remove_dir_all(&root);
}
