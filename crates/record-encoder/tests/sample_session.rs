use std::path::PathBuf;

use lookdown_common::config::TrackerParams;
use lookdown_pose_model::table::read_table;
use lookdown_record_encoder::{
    DetectionStreamSource, EncodingSession, FrameSource, IdentityFilter, OverlayAnnotation,
    OverlayWriter, RecordEncoder, RecordWriter,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join(name)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn encoding_fixture_stream_reproduces_fixture_table() {
    let dir = scratch_dir("lookdown_it_encode_fixture");
    let table = dir.join("pose_output.csv");
    let overlay = dir.join("overlay.jsonl");

    let source = DetectionStreamSource::open(&fixture("detections.jsonl")).unwrap();
    assert!(source.check_tracker_params(&TrackerParams::default()));
    let encoder = RecordEncoder::new(source.frame_size());

    let summary = EncodingSession::new(
        Box::new(source),
        encoder,
        RecordWriter::new(table.clone()).unwrap(),
    )
    .with_overlay(OverlayWriter::new(overlay.clone()).unwrap())
    .run()
    .unwrap();

    assert_eq!(summary.frames, 13);
    assert_eq!(summary.rows, 24);
    assert_eq!(summary.placeholder_rows, 1);
    // Identity 2 lost an ear on frame 9, so it gets no label there.
    assert_eq!(summary.annotations, 22);

    let expected = read_table(&fixture("pose_output.csv")).unwrap();
    let actual = read_table(&table).unwrap();
    assert_eq!(actual, expected);

    let labels: Vec<OverlayAnnotation> = std::fs::read_to_string(&overlay)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(labels.len(), 22);
    assert_eq!(labels[0].text, "look_down: True");
    assert_eq!(labels[0].y, 190.0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn identity_filter_keeps_frames_but_drops_other_people() {
    let dir = scratch_dir("lookdown_it_encode_selected");
    let table = dir.join("pose_output_selected.csv");
    let overlay = dir.join("overlay_selected.jsonl");

    let source = DetectionStreamSource::open(&fixture("detections.jsonl")).unwrap();
    let encoder = RecordEncoder::new(source.frame_size())
        .with_identity_filter(IdentityFilter::parse("2").unwrap());

    let summary = EncodingSession::new(
        Box::new(source),
        encoder,
        RecordWriter::new(table.clone()).unwrap(),
    )
    .with_overlay(OverlayWriter::new(overlay.clone()).unwrap())
    .run()
    .unwrap();

    assert_eq!(summary.frames, 13);
    assert_eq!(summary.annotations, 0);
    assert!(std::fs::read_to_string(&overlay).unwrap().is_empty());
    // Ten frames with identity 2, three placeholder frames.
    assert_eq!(summary.rows, 13);
    assert_eq!(summary.placeholder_rows, 3);
    assert_eq!(summary.filtered_out, 13);

    let rows = read_table(&table).unwrap();
    assert!(rows
        .iter()
        .all(|r| r.tracking_id.is_none() || r.tracking_id.as_deref() == Some("2")));

    std::fs::remove_dir_all(&dir).ok();
}
