//! Encode a detection stream into a pose table.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;

use lookdown_common::config::{AppConfig, TrackerParams};
use lookdown_record_encoder::{
    DetectionStreamSource, EncodingSession, FrameSource, IdentityFilter, OverlayWriter,
    RecordEncoder, RecordWriter,
};

pub struct EncodeArgs {
    pub detections: PathBuf,
    pub csv: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub ids: Option<String>,
    pub detection_threshold: Option<f64>,
    pub distance_threshold: Option<f64>,
    pub initialization_delay: Option<u32>,
    pub hit_counter_max: Option<u32>,
    pub pointwise_hit_counter_max: Option<u32>,
}

impl EncodeArgs {
    fn tracker_params(&self, base: TrackerParams) -> TrackerParams {
        TrackerParams {
            detection_threshold: self.detection_threshold.unwrap_or(base.detection_threshold),
            distance_threshold: self.distance_threshold.unwrap_or(base.distance_threshold),
            initialization_delay: self
                .initialization_delay
                .unwrap_or(base.initialization_delay),
            hit_counter_max: self.hit_counter_max.unwrap_or(base.hit_counter_max),
            pointwise_hit_counter_max: self
                .pointwise_hit_counter_max
                .unwrap_or(base.pointwise_hit_counter_max),
        }
    }

    fn table_path(&self) -> PathBuf {
        match (&self.csv, &self.ids) {
            (Some(path), _) => path.clone(),
            (None, Some(_)) => PathBuf::from("pose_output_selected.csv"),
            (None, None) => PathBuf::from("pose_output.csv"),
        }
    }
}

pub async fn run(args: EncodeArgs, config: &AppConfig) -> anyhow::Result<()> {
    // Validate everything the user typed before touching any file.
    let filter = match &args.ids {
        Some(ids) => IdentityFilter::parse(ids)?,
        None => IdentityFilter::all(),
    };
    let tracker = args.tracker_params(config.encoder.tracker);
    tracker.validate()?;

    let table_path = args.table_path();
    let source = DetectionStreamSource::open(&args.detections)?;
    let size = source.frame_size();

    tracing::info!(
        detection_threshold = tracker.detection_threshold,
        distance_threshold = tracker.distance_threshold,
        initialization_delay = tracker.initialization_delay,
        hit_counter_max = tracker.hit_counter_max,
        pointwise_hit_counter_max = tracker.pointwise_hit_counter_max,
        keypoint_distance_threshold = TrackerParams::keypoint_distance_threshold(size.height),
        "Tracker parameters"
    );
    source.check_tracker_params(&tracker);

    println!("Encoding: {}", args.detections.display());
    println!("  Frame size: {}x{}", size.width, size.height);
    if let Some(selected) = filter.selected() {
        let ids: Vec<String> = selected.iter().map(u64::to_string).collect();
        println!("  Tracking ids: {}", ids.join(", "));
        if args.overlay.is_some() {
            tracing::warn!("Selection runs burn no look_down labels; the overlay stays empty");
        }
    }
    println!("  Table: {}", table_path.display());

    let writer = RecordWriter::new(table_path.clone())
        .with_context(|| format!("Failed to create {}", table_path.display()))?;
    let mut session = EncodingSession::new(
        Box::new(source),
        RecordEncoder::new(size).with_identity_filter(filter),
        writer,
    )
    .with_progress_interval(config.encoder.progress_interval_frames);

    if let Some(overlay) = &args.overlay {
        println!("  Overlay: {}", overlay.display());
        session = session.with_overlay(
            OverlayWriter::new(overlay.clone())
                .with_context(|| format!("Failed to create {}", overlay.display()))?,
        );
    }

    println!("Press Ctrl+C to stop early...");
    println!();

    let stop_flag = session.stop_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_flag.store(true, Ordering::SeqCst);
        }
    });

    let summary = tokio::task::spawn_blocking(move || session.run())
        .await
        .context("Encoding task panicked")??;
    ctrl_c.abort();

    if summary.cancelled {
        println!("Stopped early; the table holds every frame encoded so far.");
    }
    println!("Frames: {}", summary.frames);
    println!("Rows: {} ({} empty frames)", summary.rows, summary.placeholder_rows);
    if summary.filtered_out > 0 {
        println!("Observations skipped by --ids: {}", summary.filtered_out);
    }
    if args.overlay.is_some() {
        println!("Overlay labels: {}", summary.annotations);
    }
    println!("Table saved to: {}", table_path.display());

    Ok(())
}
