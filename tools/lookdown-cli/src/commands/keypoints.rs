//! List tracking ids or plot keypoint trajectories.

use std::path::PathBuf;

use lookdown_analysis_core::trajectory::{
    all_keypoint_trajectories, available_identities, complete_rows, keypoint_trajectory,
};
use lookdown_common::config::AppConfig;
use lookdown_common::error::LookdownError;
use lookdown_pose_model::keypoint::KeypointName;
use lookdown_pose_model::table::read_table;
use lookdown_report_engine::ReportRenderer;

use super::print_identities;

pub struct KeypointsArgs {
    pub csv: PathBuf,
    pub tracking_id: Option<u64>,
    pub keypoint: KeypointName,
    pub output: Option<PathBuf>,
    pub all: bool,
    pub list_ids: bool,
}

fn default_output(keypoint: KeypointName, tracking_id: u64) -> PathBuf {
    PathBuf::from(format!("keypoint_{keypoint}_tracking_id_{tracking_id}.png"))
}

pub fn run(args: KeypointsArgs, config: &AppConfig) -> anyhow::Result<()> {
    let csv = LookdownError::require_file(&args.csv)?;
    println!("Loading table: {}", csv.display());

    let rows = complete_rows(&read_table(&csv)?)?;
    if rows.is_empty() {
        return Err(LookdownError::EmptyTable { path: csv }.into());
    }
    let ids = available_identities(&rows);

    if args.list_ids {
        print_identities(&ids);
        return Ok(());
    }

    let Some(tracking_id) = args.tracking_id else {
        println!("No tracking id given.");
        print_identities(&ids);
        println!();
        println!("Usage:");
        println!("  lookdown keypoints --tracking-id <ID> --keypoint <KEYPOINT>");
        println!();
        println!("Example:");
        println!("  lookdown keypoints --tracking-id 1 --keypoint nose");
        return Ok(());
    };

    let renderer = ReportRenderer::new(config.report.clone())?;

    let written = if args.all {
        let trajectories = match all_keypoint_trajectories(&rows, tracking_id) {
            Ok(t) => t,
            Err(err) => return Err(report_missing(err)),
        };
        println!("\nPlotting all keypoints for tracking_id={tracking_id}");
        let dir = args.output.unwrap_or_else(|| PathBuf::from("."));
        renderer.write_all_trajectories(&trajectories, tracking_id, &dir)?
    } else {
        let trajectory = match keypoint_trajectory(&rows, tracking_id, args.keypoint) {
            Ok(t) => t,
            Err(err) => return Err(report_missing(err)),
        };
        println!(
            "\nPlotting tracking_id={tracking_id}, keypoint={}",
            args.keypoint
        );
        let path = args
            .output
            .unwrap_or_else(|| default_output(args.keypoint, tracking_id));
        renderer.write_trajectory(&trajectory, &path)?;
        path
    };

    println!("Plot saved to: {}", written.display());
    Ok(())
}

/// Print the identity list for an unknown id before handing the error back.
fn report_missing(err: LookdownError) -> anyhow::Error {
    if let LookdownError::IdentityNotFound { id, available } = &err {
        println!("tracking_id {id} does not exist");
        print_identities(available);
    }
    err.into()
}
