//! End-to-end runs of the analysis drivers against on-disk archives.

use std::fs;
use std::thread;

use brine_analysis::{
    flux_in_time, geometry_in_time, line_probe, AnalysisError, FluxOptions, ProbeOptions,
    Session, Side, Table,
};
use brine_archive::TimeSeries;
use brine_core::{SoloComm, ThreadComm};
use brine_mesh::CoordinateIndex;
use brine_test_utils::{unit_square, ArchiveBuilder};

/// u = (x, 0) on the unit square, node-major interleaved.
fn shear_u() -> Vec<f64> {
    vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]
}

#[test]
fn shared_coordinate_index_is_identical_across_ranks() {
    let topology = unit_square();
    let comms = ThreadComm::group(3);
    let handles: Vec<_> = comms
        .into_iter()
        .map(|comm| {
            let topology = topology.clone();
            thread::spawn(move || {
                let index = CoordinateIndex::build_and_share(&topology, &comm).unwrap();
                assert_eq!(index.lookup([1.0, 1.0]).unwrap().index(), 2);
                index.encoded().to_vec()
            })
        })
        .collect();
    let frames: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(frames[0], frames[1]);
    assert_eq!(frames[1], frames[2]);
}

#[test]
fn updated_functions_reproduce_the_archive_frame() {
    let root = std::env::temp_dir().join("brine-drivers-update");
    let archive = ArchiveBuilder::new(&root)
        .checkpoint(0, "problem=simple\ndt=0.08\n")
        .scalar_field(
            "phi",
            0,
            &[
                (0.0, vec![0.0, 0.0, 0.0, 0.0]),
                (0.08, vec![1.0, -1.0, 0.5, -0.5]),
            ],
        )
        .build();
    let series = TimeSeries::load(&archive, &["phi"]).unwrap();
    let comm = SoloComm;
    let mut session = Session::new(series, &comm).unwrap();

    session.update_all(1).unwrap();
    let phi = session.function("phi").unwrap();
    assert_eq!(
        phi.node_values(session.space(), 0),
        vec![1.0, -1.0, 0.5, -0.5]
    );
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn geometry_in_time_tracks_a_real_interface() {
    let root = std::env::temp_dir().join("brine-drivers-geometry");
    let archive = ArchiveBuilder::new(&root)
        .checkpoint(0, "problem=simple\ndt=0.08\n")
        .scalar_field(
            "phi",
            0,
            &[
                (0.0, vec![1.0, -1.0, 1.0, -1.0]),
                (0.08, vec![-1.0, -1.0, -1.0, -1.0]),
            ],
        )
        .build();
    let series = TimeSeries::load(&archive, &["phi"]).unwrap();
    let comm = SoloComm;
    let session = Session::new(series, &comm).unwrap();

    geometry_in_time(&session).unwrap();

    let time_data = Table::read(&root.join("analysis/time_data.dat")).unwrap();
    assert_eq!(
        time_data.columns(),
        &["Time", "Circ.", "Area", "CoM_x", "CoM_y"]
    );
    assert_eq!(time_data.n_rows(), 2);

    // A sign change produces a contour with positive length and a
    // phase area strictly inside the square.
    let circ = time_data.column("Circ.").unwrap();
    let area = time_data.column("Area").unwrap();
    assert!(circ[0] > 0.0);
    assert!(area[0] > 0.0 && area[0] < 1.0);
    // The fully negative frame covers everything and has no contour.
    assert_eq!(circ[1], 0.0);
    assert!((area[1] - 1.0).abs() < 1e-12);

    // The owning rank wrote one contour file per step.
    let contour = Table::read(&root.join("analysis/contour_0.dat")).unwrap();
    assert_eq!(contour.columns(), &["x", "y"]);
    assert!(contour.n_rows() > 0);
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn line_probe_samples_linear_fields_exactly() {
    let root = std::env::temp_dir().join("brine-drivers-probe");
    // c = x at the nodes; u = (x, 0).
    let archive = ArchiveBuilder::new(&root)
        .checkpoint(0, "problem=simple\ndt=0.08\n")
        .scalar_field("c", 0, &[(0.0, vec![0.0, 1.0, 1.0, 0.0])])
        .vector_field("u", 0, &[(0.0, shear_u())])
        .build();
    let series = TimeSeries::load(&archive, &["c", "u"]).unwrap();
    let comm = SoloComm;
    let mut session = Session::new(series, &comm).unwrap();

    line_probe(
        &mut session,
        &ProbeOptions {
            spacing: 0.5,
            line: "0,0--1,0".to_string(),
        },
    )
    .unwrap();

    let probes = Table::read(&root.join("analysis/probes_0.dat")).unwrap();
    assert_eq!(probes.columns(), &["x", "y", "c", "u_x", "u_y"]);
    assert_eq!(probes.n_rows(), 3);
    let c = probes.column("c").unwrap();
    for (got, want) in c.iter().zip([0.0, 0.5, 1.0]) {
        assert!((got - want).abs() < 1e-12);
    }
    assert_eq!(probes.column("u_x").unwrap(), c);
    assert!(probes.column("u_y").unwrap().iter().all(|&v| v == 0.0));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn zero_probe_spacing_is_a_configuration_error() {
    let root = std::env::temp_dir().join("brine-drivers-probe-spacing");
    let archive = ArchiveBuilder::new(&root)
        .checkpoint(0, "problem=simple\ndt=0.08\n")
        .scalar_field("c", 0, &[(0.0, vec![0.0, 1.0, 1.0, 0.0])])
        .build();
    let series = TimeSeries::load(&archive, &["c"]).unwrap();
    let comm = SoloComm;
    let mut session = Session::new(series, &comm).unwrap();

    let result = line_probe(
        &mut session,
        &ProbeOptions {
            spacing: 0.0,
            line: "0,0--1,0".to_string(),
        },
    );
    assert!(matches!(
        result,
        Err(AnalysisError::InvalidSpacing { .. })
    ));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn flux_tables_reparse_with_the_selected_steps() {
    let root = std::env::temp_dir().join("brine-drivers-flux");
    let u = shear_u();
    let archive = ArchiveBuilder::new(&root)
        .checkpoint(
            0,
            "problem=simple\ndt=0.08\nenable_ns=True\nenable_pf=False\nenable_ec=False\n\
             density_1=2\ndensity_2=1\n",
        )
        .vector_field(
            "u",
            0,
            &[(0.0, u.clone()), (0.08, u.clone()), (0.16, u)],
        )
        .build();
    let series = TimeSeries::load(&archive, &["u"]).unwrap();
    let comm = SoloComm;
    let mut session = Session::new(series, &comm).unwrap();

    flux_in_time(
        &mut session,
        &FluxOptions {
            interval: 0.16,
            cross_sections: vec![Side::Right],
        },
    )
    .unwrap();

    // One table per boundary: the periodic pairing, the problem's
    // walls, and the requested cross-section.
    for boundary in ["periodic", "top", "bottom", "extra_right"] {
        assert!(root
            .join(format!("analysis/flux_in_time_{boundary}.dat"))
            .is_file());
    }

    let table = Table::read(&root.join("analysis/flux_in_time_extra_right.dat")).unwrap();
    // Flux columns come lexicographically after Step and Time.
    assert_eq!(
        table.columns(),
        &["Step", "Time", "Mass", "Phase", "Velocity"]
    );
    // The 0.16 interval selects steps 0 and 2 of the three.
    assert_eq!(table.column("Step").unwrap(), vec![0.0, 2.0]);
    assert_eq!(table.column("Time").unwrap(), vec![0.0, 0.16]);

    // u · n = 1 along the section at x = 1, so the velocity flux is
    // its length; the mass flux scales by density_1.
    for v in table.column("Velocity").unwrap() {
        assert!((v - 1.0).abs() < 1e-12);
    }
    for v in table.column("Mass").unwrap() {
        assert!((v - 2.0).abs() < 1e-12);
    }

    // Nothing flows through the solid walls.
    let top = Table::read(&root.join("analysis/flux_in_time_top.dat")).unwrap();
    for v in top.column("Velocity").unwrap() {
        assert!(v.abs() < 1e-12);
    }
    let _ = fs::remove_dir_all(&root);
}
