//! Lookdown Report Engine
//!
//! Renders analysis results as PNG charts:
//! - **Timeline:** per-identity look-down ticks against frame index
//! - **Bar chart:** concentration rate per identity
//! - **Trajectories:** keypoint coordinates against frame index
//!
//! Rendering is pure (`RgbImage` in memory); only [`ReportRenderer`]'s
//! `write_*` methods touch the filesystem.

pub mod bar_chart;
pub mod canvas;
pub mod colormap;
pub mod font;
pub mod timeline;
pub mod trajectory;

use std::path::{Path, PathBuf};

use image::RgbImage;

use lookdown_analysis_core::{IdentityStats, IdentityTimeline, KeypointTrajectory};
use lookdown_common::config::ReportConfig;
use lookdown_common::error::LookdownResult;

pub use font::ChartFont;

/// File name used for the all-keypoints chart inside an output directory.
pub fn all_keypoints_file_name(tracking_id: u64) -> String {
    format!("all_keypoints_tracking_id_{tracking_id}.png")
}

/// Renders and saves charts with one configuration and font.
#[derive(Debug)]
pub struct ReportRenderer {
    config: ReportConfig,
    font: ChartFont,
}

impl ReportRenderer {
    /// Use the configured font, or the bundled one when none is set.
    pub fn new(config: ReportConfig) -> LookdownResult<Self> {
        let font = match &config.font_path {
            Some(path) => ChartFont::load(path)?,
            None => ChartFont::bundled()?,
        };
        Ok(Self { config, font })
    }

    pub fn timeline(&self, timelines: &[IdentityTimeline]) -> RgbImage {
        timeline::render_timeline(
            timelines,
            self.config.timeline_width,
            self.config.timeline_height,
            Some(&self.font),
        )
    }

    pub fn bar_chart(&self, stats: &[IdentityStats]) -> RgbImage {
        bar_chart::render_bar_chart(
            stats,
            self.config.bar_chart_width,
            self.config.bar_chart_height,
            Some(&self.font),
        )
    }

    pub fn trajectory(&self, trajectory: &KeypointTrajectory) -> RgbImage {
        trajectory::render_trajectory(
            trajectory,
            self.config.trajectory_width,
            self.config.trajectory_height,
            Some(&self.font),
        )
    }

    /// The two-panel chart is twice the configured trajectory height.
    pub fn all_trajectories(&self, trajectories: &[KeypointTrajectory]) -> RgbImage {
        trajectory::render_all_trajectories(
            trajectories,
            self.config.trajectory_width,
            self.config.trajectory_height * 2,
            Some(&self.font),
        )
    }

    pub fn write_timeline(&self, timelines: &[IdentityTimeline], path: &Path) -> LookdownResult<()> {
        canvas::save_png(&self.timeline(timelines), path)
    }

    pub fn write_bar_chart(&self, stats: &[IdentityStats], path: &Path) -> LookdownResult<()> {
        canvas::save_png(&self.bar_chart(stats), path)
    }

    pub fn write_trajectory(
        &self,
        trajectory: &KeypointTrajectory,
        path: &Path,
    ) -> LookdownResult<()> {
        canvas::save_png(&self.trajectory(trajectory), path)
    }

    /// Write the all-keypoints chart into `dir` and return the file path.
    pub fn write_all_trajectories(
        &self,
        trajectories: &[KeypointTrajectory],
        tracking_id: u64,
        dir: &Path,
    ) -> LookdownResult<PathBuf> {
        let path = dir.join(all_keypoints_file_name(tracking_id));
        canvas::save_png(&self.all_trajectories(trajectories), &path)?;
        Ok(path)
    }
}
