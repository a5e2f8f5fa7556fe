//! Field sampling along a line of evenly spaced probe points.

use brine_core::{axis_letter, distance, Point};
use brine_mesh::{interpolate, PointLocator};

use crate::error::AnalysisError;
use crate::session::Session;
use crate::table::Table;

/// Options for [`line_probe`].
#[derive(Clone, Debug)]
pub struct ProbeOptions {
    /// Distance between consecutive probe points.
    pub spacing: f64,
    /// The probed segment, written `x0,y0--x1,y1`.
    pub line: String,
}

fn parse_point(text: &str, input: &str) -> Result<Point, AnalysisError> {
    let malformed = || AnalysisError::MalformedSegment {
        input: input.to_string(),
    };
    let (x, y) = text.split_once(',').ok_or_else(malformed)?;
    Ok([
        x.trim().parse().map_err(|_| malformed())?,
        y.trim().parse().map_err(|_| malformed())?,
    ])
}

/// Parse a probed segment of the form `x0,y0--x1,y1`.
pub fn parse_segment(input: &str) -> Result<(Point, Point), AnalysisError> {
    let (a, b) = input
        .split_once("--")
        .ok_or_else(|| AnalysisError::MalformedSegment {
            input: input.to_string(),
        })?;
    Ok((parse_point(a, input)?, parse_point(b, input)?))
}

/// Evenly spaced points along `a -> b`: every multiple of `spacing`
/// from `a` up to and including the segment length (with a small slack
/// so an endpoint landing on a multiple is kept).
///
/// The spacing must be finite and positive; anything else is a
/// configuration error, not a degenerate point count.
pub fn line_points(a: Point, b: Point, spacing: f64) -> Result<Vec<Point>, AnalysisError> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(AnalysisError::InvalidSpacing { spacing });
    }
    let length = distance(a, b);
    if length == 0.0 {
        return Ok(vec![a]);
    }
    let direction = [(b[0] - a[0]) / length, (b[1] - a[1]) / length];
    let count = (length / spacing + 1e-9).floor() as usize;
    Ok((0..=count)
        .map(|i| {
            let d = i as f64 * spacing;
            [a[0] + d * direction[0], a[1] + d * direction[1]]
        })
        .collect())
}

/// Sample every loaded field along a line, one table per step.
///
/// All ranks update collectively; rank 0 writes `probes_<step>.dat`
/// with columns `x`, `y`, then one column per scalar field and one per
/// vector component (suffixed `_x`, `_y`). A probe point outside the
/// triangulation is fatal.
pub fn line_probe(session: &mut Session, options: &ProbeOptions) -> Result<(), AnalysisError> {
    let (a, b) = parse_segment(&options.line)?;
    let points = line_points(a, b, options.spacing)?;
    let locator = PointLocator::new(session.topology());

    // Resolve cells once; the mesh is shared across steps.
    let mut located = Vec::with_capacity(points.len());
    for &p in &points {
        let (cell, bary) = locator
            .locate(session.topology(), p)
            .ok_or(AnalysisError::PointOutsideMesh { point: p })?;
        located.push((p, cell, bary));
    }

    let mut columns = vec!["x".to_string(), "y".to_string()];
    let fields: Vec<(String, usize)> = session
        .series()
        .field_names()
        .map(|name| {
            let components = session
                .series()
                .field(name)
                .map(|f| f.kind().components() as usize)
                .unwrap_or(1);
            (name.to_string(), components)
        })
        .collect();
    for (name, components) in &fields {
        if *components == 1 {
            columns.push(name.clone());
        } else {
            for c in 0..*components {
                match axis_letter(c) {
                    Some(letter) => columns.push(format!("{name}_{letter}")),
                    None => columns.push(format!("{name}_{c}")),
                }
            }
        }
    }

    for step in 0..session.series().n_steps() {
        session.update_all(step)?;
        let values = session.field_values();
        let mut table = Table::new(columns.clone());
        for &(p, cell, bary) in &located {
            let element = session.topology().elements()[cell as usize];
            let mut row = vec![p[0], p[1]];
            for (name, components) in &fields {
                for c in 0..*components {
                    let nodal = values.component(name, c)?;
                    row.push(interpolate(
                        [
                            nodal[element[0] as usize],
                            nodal[element[1] as usize],
                            nodal[element[2] as usize],
                        ],
                        bary,
                    ));
                }
            }
            table.push_row(row)?;
        }
        if session.comm().rank() == 0 {
            let dir = session.series().layout().analysis_dir()?;
            table.write(&dir.join(format!("probes_{step}.dat")))?;
        }
    }
    Ok(())
}
