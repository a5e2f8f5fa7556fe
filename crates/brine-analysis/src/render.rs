//! Animation assembly from per-step rendered frames.
//!
//! Rendering backends live behind two traits so the driver stays
//! backend-agnostic: a [`FrameSource`] rasterizes one step, an
//! [`AnimationRenderer`] composes the finished frames. The driver owns
//! the distribution, naming, and cleanup.

use std::fs;
use std::path::{Path, PathBuf};

use brine_archive::TimeSeries;

use crate::error::AnalysisError;
use crate::geometry::round_robin;
use crate::session::Session;

/// Rasterizes one step of a series into an image file.
pub trait FrameSource {
    /// Render the frame for `step` to `path`.
    fn render_frame(
        &mut self,
        series: &TimeSeries,
        step: usize,
        path: &Path,
    ) -> Result<(), AnalysisError>;
}

/// Composes finished frames into an animation file.
pub trait AnimationRenderer {
    /// Compose `frames`, in order, into `output`.
    fn compose(&mut self, frames: &[PathBuf], output: &Path) -> Result<(), AnalysisError>;
}

/// Render every step to an intermediate frame and compose them into
/// `plots/animation.gif`.
///
/// Steps are rendered round-robin across the group into the archive's
/// scratch area as `animation_<step:06>.png`. After a barrier, rank 0
/// composes the full frame sequence and removes the intermediates.
pub fn render_animation(
    session: &Session,
    source: &mut dyn FrameSource,
    renderer: &mut dyn AnimationRenderer,
) -> Result<(), AnalysisError> {
    let series = session.series();
    let comm = session.comm();
    let tmp = series.layout().tmp_dir()?;

    let frame_path = |step: usize| tmp.join(format!("animation_{step:06}.png"));
    for step in round_robin(series.n_steps(), comm.rank(), comm.size()) {
        source.render_frame(series, step, &frame_path(step))?;
    }

    // Every frame must exist before rank 0 composes.
    comm.barrier()?;
    if comm.rank() != 0 {
        return Ok(());
    }

    let frames: Vec<PathBuf> = (0..series.n_steps()).map(frame_path).collect();
    let output = series.layout().plots_dir()?.join("animation.gif");
    renderer.compose(&frames, &output)?;
    for frame in &frames {
        fs::remove_file(frame)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Writes the step number as the frame content.
    struct StubSource;

    impl FrameSource for StubSource {
        fn render_frame(
            &mut self,
            _series: &TimeSeries,
            step: usize,
            path: &Path,
        ) -> Result<(), AnalysisError> {
            fs::write(path, step.to_string())?;
            Ok(())
        }
    }

    /// Concatenates frame contents in order.
    struct StubRenderer;

    impl AnimationRenderer for StubRenderer {
        fn compose(&mut self, frames: &[PathBuf], output: &Path) -> Result<(), AnalysisError> {
            let mut out = String::new();
            for frame in frames {
                out.push_str(&fs::read_to_string(frame)?);
                out.push('\n');
            }
            fs::write(output, out)?;
            Ok(())
        }
    }

    #[test]
    fn frames_compose_in_step_order_and_are_cleaned_up() {
        let root = std::env::temp_dir().join("brine-render-test");
        let _ = fs::remove_dir_all(&root);
        let archive = brine_test_utils::ArchiveBuilder::new(&root)
            .checkpoint(0, "dt=0.08\nproblem=simple\n")
            .scalar_field("phi", 0, &[(0.0, vec![1.0, -1.0, 1.0, -1.0])])
            .build();
        let series = TimeSeries::load(&archive, &["phi"]).unwrap();
        let comm = brine_core::SoloComm;
        let session = Session::new(series, &comm).unwrap();

        render_animation(&session, &mut StubSource, &mut StubRenderer).unwrap();

        let gif = root.join("plots/animation.gif");
        assert_eq!(fs::read_to_string(&gif).unwrap(), "0\n");
        // Intermediates are removed after composition.
        assert!(fs::read_dir(root.join(".tmp")).unwrap().next().is_none());
        let _ = fs::remove_dir_all(&root);
    }
}
