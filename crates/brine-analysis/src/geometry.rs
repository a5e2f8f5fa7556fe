//! Interface geometry in time: contour, circumference, area, center
//! of mass of the phase marked by `phi < 0`.

use std::collections::HashSet;

use brine_core::{distance, Point};
use brine_mesh::{cell_area, MeshTopology};

use crate::error::AnalysisError;
use crate::session::Session;
use crate::table::Table;

/// The steps a rank owns under round-robin assignment: `rank`,
/// `rank + size`, and so on.
pub fn round_robin(len: usize, rank: usize, size: usize) -> impl Iterator<Item = usize> {
    (rank..len).step_by(size.max(1))
}

/// Indicator of the `phi < 0` phase at a nodal value. The zero level
/// itself counts half.
fn mask(phi: f64) -> f64 {
    let sign = if phi > 0.0 {
        1.0
    } else if phi < 0.0 {
        -1.0
    } else {
        0.0
    };
    0.5 * (1.0 - sign)
}

/// Zero-level-set segments of a nodal scalar, one per cell the level
/// set crosses: each cell edge with a sign change contributes one
/// linearly interpolated crossing point, and the cell's two crossing
/// points join into a segment. An edge lying entirely on the level set
/// is emitted once, even when two cells share it.
fn contour_segments(topology: &MeshTopology, values: &[f64]) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    let mut zero_edges: HashSet<(usize, usize)> = HashSet::new();
    for element in topology.elements() {
        let mut crossings: Vec<Point> = Vec::with_capacity(2);
        for e in 0..3 {
            let i = element[e] as usize;
            let j = element[(e + 1) % 3] as usize;
            let (vi, vj) = (values[i], values[j]);
            if vi == 0.0 && vj == 0.0 {
                // The edge itself lies on the level set.
                if zero_edges.insert((i.min(j), i.max(j))) {
                    segments.push((topology.nodes()[i], topology.nodes()[j]));
                }
                crossings.clear();
                break;
            }
            if (vi < 0.0) == (vj < 0.0) && vi != 0.0 && vj != 0.0 {
                continue;
            }
            let t = vi / (vi - vj);
            let a = topology.nodes()[i];
            let b = topology.nodes()[j];
            crossings.push([a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]);
        }
        crossings.dedup_by(|a, b| a == b);
        if crossings.len() >= 2 {
            segments.push((crossings[0], crossings[1]));
        }
    }
    segments
}

/// One analyzed step's scalar outputs.
struct StepGeometry {
    step: usize,
    time: f64,
    circumference: f64,
    area: f64,
    com: Point,
}

fn measure_step(topology: &MeshTopology, phi: &[f64]) -> (Vec<(Point, Point)>, f64, f64, Point) {
    let segments = contour_segments(topology, phi);
    let circumference: f64 = segments.iter().map(|(a, b)| distance(*a, *b)).sum();

    let mut area = 0.0;
    let mut weighted = [0.0, 0.0];
    for (cell, element) in topology.elements().iter().enumerate() {
        let ca = cell_area(&topology.cell_corners(cell as u32));
        let mut m = 0.0;
        let mut mx = [0.0, 0.0];
        for &node in element {
            let w = mask(phi[node as usize]);
            let p = topology.nodes()[node as usize];
            m += w;
            mx[0] += w * p[0];
            mx[1] += w * p[1];
        }
        area += ca * m / 3.0;
        weighted[0] += ca * mx[0] / 3.0;
        weighted[1] += ca * mx[1] / 3.0;
    }
    let com = if area > 0.0 {
        [weighted[0] / area, weighted[1] / area]
    } else {
        [f64::NAN, f64::NAN]
    };
    (segments, circumference, area, com)
}

/// Track the `phi < 0` phase through time.
///
/// Steps are distributed round-robin across the group. Each owning
/// rank extracts the zero-level contour and writes it to
/// `contour_<step>.dat`; the per-step scalars are gathered to rank 0,
/// sorted by step, and written as `time_data.dat` with columns `Time`,
/// `Circ.`, `Area`, `CoM_x`, `CoM_y`.
pub fn geometry_in_time(session: &Session) -> Result<(), AnalysisError> {
    let series = session.series();
    let phi = series
        .field("phi")
        .ok_or_else(|| AnalysisError::UnknownField {
            field: "phi".to_string(),
        })?;
    let dir = series.layout().analysis_dir()?;
    let comm = session.comm();
    let topology = session.topology();

    let mut rows: Vec<StepGeometry> = Vec::new();
    for step in round_robin(series.n_steps(), comm.rank(), comm.size()) {
        let (segments, circumference, area, com) = measure_step(topology, phi.frame(step));

        let mut contour = Table::new(vec!["x".to_string(), "y".to_string()]);
        for (a, b) in &segments {
            contour.push_row(vec![a[0], a[1]])?;
            contour.push_row(vec![b[0], b[1]])?;
        }
        contour.write(&dir.join(format!("contour_{step}.dat")))?;

        rows.push(StepGeometry {
            step,
            time: series.times()[step],
            circumference,
            area,
            com,
        });
    }

    let mut payload = Vec::with_capacity(rows.len() * 48);
    for row in &rows {
        for v in [
            row.step as f64,
            row.time,
            row.circumference,
            row.area,
            row.com[0],
            row.com[1],
        ] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
    }
    let Some(parts) = comm.gather(0, payload)? else {
        return Ok(());
    };

    let mut merged: Vec<[f64; 6]> = Vec::new();
    for part in parts {
        for record in part.chunks_exact(48) {
            let mut row = [0.0; 6];
            for (v, chunk) in row.iter_mut().zip(record.chunks_exact(8)) {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                *v = f64::from_le_bytes(buf);
            }
            merged.push(row);
        }
    }
    merged.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let mut table = Table::new(
        ["Time", "Circ.", "Area", "CoM_x", "CoM_y"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    for row in merged {
        table.push_row(row[1..].to_vec())?;
    }
    table.write(&dir.join("time_data.dat"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> MeshTopology {
        MeshTopology::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn mask_marks_the_negative_phase() {
        assert_eq!(mask(1.0), 0.0);
        assert_eq!(mask(-1.0), 1.0);
        assert_eq!(mask(0.0), 0.5);
    }

    #[test]
    fn uniform_sign_has_no_contour() {
        let topology = square();
        assert!(contour_segments(&topology, &[1.0, 1.0, 1.0, 1.0]).is_empty());
        assert!(contour_segments(&topology, &[-1.0, -2.0, -1.0, -0.5]).is_empty());
    }

    #[test]
    fn sign_change_produces_a_contour_with_positive_length() {
        let topology = square();
        // phi = x - 0.5 has its zero level at x = 0.5, a vertical line
        // of length 1 crossing both cells.
        let phi = [-0.5, 0.5, 0.5, -0.5];
        let (_, circumference, area, com) = measure_step(&topology, &phi);
        assert!(circumference > 0.0);
        assert!((circumference - 1.0).abs() < 1e-12);
        // Half the square is in the negative phase.
        assert!((area - 0.5).abs() < 1e-12);
        assert!(com[0] < 0.5);
    }

    #[test]
    fn a_shared_zero_edge_is_counted_once() {
        let topology = square();
        // phi vanishes on the diagonal both cells share; the contour is
        // that single edge, not two copies of it.
        let phi = [0.0, 1.0, 0.0, -1.0];
        let segments = contour_segments(&topology, &phi);
        assert_eq!(segments.len(), 1);
        let (_, circumference, _, _) = measure_step(&topology, &phi);
        assert!((circumference - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn fully_negative_phase_covers_the_whole_area() {
        let topology = square();
        let (_, _, area, com) = measure_step(&topology, &[-1.0; 4]);
        assert!((area - 1.0).abs() < 1e-12);
        assert!((com[0] - 0.5).abs() < 1e-12);
        assert!((com[1] - 0.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn round_robin_partitions_the_steps(len in 0usize..40, size in 1usize..8) {
            let mut seen = vec![0usize; len];
            for rank in 0..size {
                for step in round_robin(len, rank, size) {
                    seen[step] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&n| n == 1));
        }
    }
}
