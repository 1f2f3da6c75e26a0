//! Lookdown Record Encoder
//!
//! Pulls per-frame tracker output from a [`FrameSource`], turns every
//! tracked person into a pose table row (or one placeholder row for an
//! empty frame), and optionally writes overlay labels for an external
//! video writer.
//!
//! Sources are pull-based: the session asks for the next frame only after
//! the previous one is written, and checks its stop flag in between.

pub mod encoder;
pub mod sources;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::observation::{FrameObservations, FrameSize};

pub use encoder::{EncodedFrame, IdentityFilter, OverlayAnnotation, RecordEncoder};
pub use sources::{CannedFrameSource, DetectionStreamSource};
pub use writer::{OverlayWriter, RecordWriter};

/// A lazy, finite, single-pass sequence of tracked frames.
pub trait FrameSource: Send {
    /// Pixel size of every frame in the sequence.
    fn frame_size(&self) -> FrameSize;

    /// The next frame, or `None` once the sequence is exhausted.
    fn next_frame(&mut self) -> LookdownResult<Option<FrameObservations>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingSummary {
    pub frames: u64,
    pub rows: u64,
    pub placeholder_rows: u64,
    pub annotations: u64,
    pub filtered_out: u64,
    /// The stop flag ended the run before the source was exhausted.
    pub cancelled: bool,
}

/// Drives a source through the encoder into the table (and overlay) writers.
pub struct EncodingSession {
    source: Box<dyn FrameSource>,
    encoder: RecordEncoder,
    writer: RecordWriter,
    overlay: Option<OverlayWriter>,
    stop_flag: Arc<AtomicBool>,
    progress_interval: u64,
}

impl EncodingSession {
    pub fn new(source: Box<dyn FrameSource>, encoder: RecordEncoder, writer: RecordWriter) -> Self {
        Self {
            source,
            encoder,
            writer,
            overlay: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            progress_interval: 30,
        }
    }

    pub fn with_overlay(mut self, overlay: OverlayWriter) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Log progress every `frames` frames; 0 disables progress lines.
    pub fn with_progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = frames;
        self
    }

    /// Encode until the source is exhausted or the stop flag is set.
    ///
    /// Frame indices must strictly increase. Both writers are flushed
    /// before returning, including after cancellation.
    pub fn run(mut self) -> LookdownResult<EncodingSummary> {
        let size = self.source.frame_size();
        if size != self.encoder.frame_size() {
            return Err(LookdownError::encode(format!(
                "source frames are {}x{} but the encoder expects {}x{}",
                size.width,
                size.height,
                self.encoder.frame_size().width,
                self.encoder.frame_size().height
            )));
        }

        tracing::info!(
            source = %self.source.name(),
            width = size.width,
            height = size.height,
            table = %self.writer.path().display(),
            "Encoding started"
        );

        let mut summary = EncodingSummary::default();
        let mut last_frame: Option<u64> = None;

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                summary.cancelled = true;
                tracing::warn!(frames = summary.frames, "Encoding cancelled");
                break;
            }

            let Some(frame) = self.source.next_frame()? else {
                break;
            };

            if let Some(prev) = last_frame {
                if frame.frame <= prev {
                    return Err(LookdownError::encode(format!(
                        "frame {} follows frame {prev}; frame indices must increase",
                        frame.frame
                    )));
                }
            }
            last_frame = Some(frame.frame);

            if self.progress_interval > 0 && summary.frames % self.progress_interval == 0 {
                tracing::info!(frame = frame.frame, "Encoding progress");
            }

            let encoded = self.encoder.encode_frame(&frame);
            for record in &encoded.records {
                self.writer.write_record(record)?;
            }
            if let Some(overlay) = self.overlay.as_mut() {
                for annotation in &encoded.annotations {
                    overlay.write_annotation(annotation)?;
                }
            }

            summary.frames += 1;
            summary.rows += encoded.records.len() as u64;
            if encoded.is_placeholder() {
                summary.placeholder_rows += 1;
            }
            summary.annotations += encoded.annotations.len() as u64;
            summary.filtered_out += encoded.filtered_out as u64;
        }

        self.writer.flush()?;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.flush()?;
        }

        tracing::info!(
            frames = summary.frames,
            rows = summary.rows,
            placeholders = summary.placeholder_rows,
            filtered_out = summary.filtered_out,
            "Encoding finished"
        );
        Ok(summary)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }
}
