//! Table and overlay writers.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::record::FrameRecord;
use lookdown_pose_model::table::{table_header, TableRow};

use crate::encoder::OverlayAnnotation;

/// Flush to disk every N rows.
const FLUSH_EVERY: u64 = 1000;

fn create_truncated(path: &Path) -> LookdownResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?)
}

/// Streams frame records into a pose table.
pub struct RecordWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: u64,
}

impl RecordWriter {
    /// Create the table (replacing any existing file) and write the header.
    pub fn new(path: PathBuf) -> LookdownResult<Self> {
        let file = create_truncated(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(table_header())?;

        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    /// Append one row.
    pub fn write_record(&mut self, record: &FrameRecord) -> LookdownResult<()> {
        self.writer
            .write_record(TableRow::from(record).to_fields())
            .map_err(|e| LookdownError::encode(format!("Failed to write row: {e}")))?;
        self.rows_written += 1;

        if self.rows_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> LookdownResult<()> {
        self.writer
            .flush()
            .map_err(|e| LookdownError::encode(format!("Failed to flush table: {e}")))?;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Writes overlay annotations as JSONL, one object per line.
pub struct OverlayWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    annotations_written: u64,
}

impl OverlayWriter {
    pub fn new(path: PathBuf) -> LookdownResult<Self> {
        let file = create_truncated(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            annotations_written: 0,
        })
    }

    pub fn write_annotation(&mut self, annotation: &OverlayAnnotation) -> LookdownResult<()> {
        let json = serde_json::to_string(annotation)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| LookdownError::encode(format!("Failed to write overlay: {e}")))?;
        self.annotations_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> LookdownResult<()> {
        self.writer
            .flush()
            .map_err(|e| LookdownError::encode(format!("Failed to flush overlay: {e}")))?;
        Ok(())
    }

    pub fn annotations_written(&self) -> u64 {
        self.annotations_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for OverlayWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookdown_pose_model::keypoint::{KeypointName, KeypointSet};
    use lookdown_pose_model::observation::{FrameSize, TrackedObservation};
    use lookdown_pose_model::table::read_table;

    const SIZE: FrameSize = FrameSize {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn record_writer_produces_readable_table() {
        let dir = std::env::temp_dir().join("lookdown_test_record_writer");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("pose_output.csv");

        let obs = TrackedObservation {
            id: 3,
            keypoints: KeypointSet::empty()
                .with(KeypointName::Nose, 10.0, 120.0)
                .with(KeypointName::LeftEar, 5.0, 100.0)
                .with(KeypointName::RightEar, 15.0, 101.0),
        };

        {
            let mut writer = RecordWriter::new(path.clone()).unwrap();
            writer
                .write_record(&FrameRecord::placeholder(0, SIZE))
                .unwrap();
            writer
                .write_record(&FrameRecord::from_observation(1, SIZE, &obs))
                .unwrap();
            assert_eq!(writer.rows_written(), 2);
        }

        let rows = read_table(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tracking_id, None);
        assert_eq!(rows[0].frame_width, 1920);
        assert_eq!(rows[1].tracking_id.as_deref(), Some("3"));
        assert_eq!(rows[1].dist_ear_nose, Some(19.0));
        assert_eq!(rows[1].look_down.as_deref(), Some("True"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn overlay_writer_emits_jsonl() {
        let dir = std::env::temp_dir().join("lookdown_test_overlay_writer");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("overlay.jsonl");

        {
            let mut writer = OverlayWriter::new(path.clone()).unwrap();
            writer
                .write_annotation(&OverlayAnnotation {
                    frame: 2,
                    tracking_id: 1,
                    x: 10.0,
                    y: 20.0,
                    text: "look_down: False".to_string(),
                })
                .unwrap();
            assert_eq!(writer.annotations_written(), 1);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: OverlayAnnotation = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.frame, 2);
        assert_eq!(parsed.text, "look_down: False");

        std::fs::remove_dir_all(&dir).ok();
    }
}
