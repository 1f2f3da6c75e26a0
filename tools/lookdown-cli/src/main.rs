//! lookdown CLI: pose tables in, concentration statistics and charts out.
//!
//! Usage:
//!   lookdown encode <DETECTIONS>   Turn a tracker detection stream into a pose table
//!   lookdown analyze [CSV]         Concentration statistics, timeline, and bar chart
//!   lookdown keypoints [OPTIONS]   List identities or plot keypoint trajectories

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use lookdown_common::config::AppConfig;
use lookdown_pose_model::keypoint::KeypointName;

mod commands;

#[derive(Parser)]
#[command(
    name = "lookdown",
    about = "Look-down detection and concentration analysis for tracked pose keypoints",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/lookdown/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a detection stream into a pose table
    Encode {
        /// JSONL detection stream exported by the pose/tracker stage
        detections: PathBuf,

        /// Output table (default: pose_output.csv, or pose_output_selected.csv with --ids)
        #[arg(short, long)]
        csv: Option<PathBuf>,

        /// Write look_down overlay labels as JSONL
        #[arg(short, long)]
        overlay: Option<PathBuf>,

        /// Only keep these tracking ids, e.g. 1,3,5
        #[arg(short, long)]
        ids: Option<String>,

        /// Tracker detection threshold
        #[arg(long)]
        detection_threshold: Option<f64>,

        /// Tracker distance threshold
        #[arg(long)]
        distance_threshold: Option<f64>,

        /// Frames before a new track is confirmed
        #[arg(long)]
        initialization_delay: Option<u32>,

        /// Frames a track survives without detections
        #[arg(long)]
        hit_counter_max: Option<u32>,

        /// Frames a keypoint survives without detections
        #[arg(long)]
        pointwise_hit_counter_max: Option<u32>,
    },

    /// Compute concentration statistics from a pose table
    Analyze {
        /// Pose table
        #[arg(default_value = "pose_output_selected.csv")]
        csv: PathBuf,

        /// Write the timeline chart here
        #[arg(long)]
        timeline: Option<PathBuf>,

        /// Write the concentration bar chart here
        #[arg(long)]
        bar_chart: Option<PathBuf>,

        /// Write the rows that were aggregated to this CSV
        #[arg(long)]
        cleaned_csv: Option<PathBuf>,

        /// Print statistics as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Use legacy truthiness for the look_down column
        #[arg(long)]
        permissive_look_down: bool,

        /// nose_y value treated as "no nose"
        #[arg(long)]
        nose_sentinel: Option<f64>,

        /// Distance from the sentinel still treated as "no nose"
        #[arg(long)]
        nose_tolerance: Option<f64>,
    },

    /// List tracking ids or plot keypoint trajectories
    Keypoints {
        /// Pose table
        #[arg(short, long, default_value = "pose_output.csv")]
        csv: PathBuf,

        /// Tracking id to plot
        #[arg(short, long)]
        tracking_id: Option<u64>,

        /// Keypoint to plot
        #[arg(short, long, default_value = "nose")]
        keypoint: KeypointName,

        /// Output image (a directory with --all)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plot all keypoints in two panels
        #[arg(long)]
        all: bool,

        /// Print the available tracking ids and exit
        #[arg(long)]
        list_ids: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    lookdown_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Encode {
            detections,
            csv,
            overlay,
            ids,
            detection_threshold,
            distance_threshold,
            initialization_delay,
            hit_counter_max,
            pointwise_hit_counter_max,
        } => {
            commands::encode::run(
                commands::encode::EncodeArgs {
                    detections,
                    csv,
                    overlay,
                    ids,
                    detection_threshold,
                    distance_threshold,
                    initialization_delay,
                    hit_counter_max,
                    pointwise_hit_counter_max,
                },
                &config,
            )
            .await
        }
        Commands::Analyze {
            csv,
            timeline,
            bar_chart,
            cleaned_csv,
            json,
            permissive_look_down,
            nose_sentinel,
            nose_tolerance,
        } => commands::analyze::run(
            commands::analyze::AnalyzeArgs {
                csv,
                timeline,
                bar_chart,
                cleaned_csv,
                json,
                permissive_look_down,
                nose_sentinel,
                nose_tolerance,
            },
            &config,
        ),
        Commands::Keypoints {
            csv,
            tracking_id,
            keypoint,
            output,
            all,
            list_ids,
        } => commands::keypoints::run(
            commands::keypoints::KeypointsArgs {
                csv,
                tracking_id,
                keypoint,
                output,
                all,
                list_ids,
            },
            &config,
        ),
    }
}
