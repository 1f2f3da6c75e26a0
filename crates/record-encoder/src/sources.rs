//! Frame source implementations.
//!
//! - **Detection stream:** JSONL exported by the external pose/tracker stage
//! - **Canned:** in-memory frames, for tests and dry runs

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lookdown_common::config::TrackerParams;
use lookdown_common::error::{LookdownError, LookdownResult};
use lookdown_pose_model::observation::{
    parse_frame_line, parse_header_line, DetectionStreamHeader, FrameObservations, FrameSize,
    DETECTION_STREAM_SCHEMA,
};

use crate::FrameSource;

/// Reads a detection stream line by line. Nothing is buffered beyond the
/// current line, so arbitrarily long videos stream in constant memory.
pub struct DetectionStreamSource<R: BufRead + Send> {
    reader: R,
    name: String,
    header: DetectionStreamHeader,
    line_no: usize,
    buf: String,
}

impl DetectionStreamSource<BufReader<File>> {
    /// Open a detection stream file and read its header.
    pub fn open(path: &Path) -> LookdownResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LookdownError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => LookdownError::Io(e),
        })?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
    }
}

impl<R: BufRead + Send> DetectionStreamSource<R> {
    /// Wrap a reader positioned at the start of a stream.
    pub fn from_reader(reader: R, name: impl Into<String>) -> LookdownResult<Self> {
        let mut source = Self {
            reader,
            name: name.into(),
            header: DetectionStreamHeader {
                schema_version: String::new(),
                frame_width: 0,
                frame_height: 0,
                tracker: None,
            },
            line_no: 0,
            buf: String::new(),
        };

        let first = source
            .next_content_line()?
            .ok_or_else(|| LookdownError::encode(format!("{}: empty detection stream", source.name)))?;
        if !first.starts_with('#') {
            return Err(LookdownError::encode(format!(
                "{}: first line must be a '# {{header}}' line",
                source.name
            )));
        }
        source.header = parse_header_line(&first).map_err(|e| {
            LookdownError::encode(format!("{}: invalid header: {e}", source.name))
        })?;

        if source.header.schema_version != DETECTION_STREAM_SCHEMA {
            tracing::warn!(
                found = %source.header.schema_version,
                expected = DETECTION_STREAM_SCHEMA,
                "Unexpected detection stream schema version"
            );
        }
        if source.header.frame_width == 0 || source.header.frame_height == 0 {
            return Err(LookdownError::encode(format!(
                "{}: frame size {}x{} is empty",
                source.name, source.header.frame_width, source.header.frame_height
            )));
        }

        Ok(source)
    }

    pub fn header(&self) -> &DetectionStreamHeader {
        &self.header
    }

    /// Compare the tracker settings recorded in the header with the ones
    /// this run was configured with. Returns `false` and logs each
    /// difference on mismatch; a header without settings always matches.
    pub fn check_tracker_params(&self, expected: &TrackerParams) -> bool {
        let Some(recorded) = self.header.tracker else {
            return true;
        };
        if recorded == *expected {
            return true;
        }
        tracing::warn!(
            ?recorded,
            ?expected,
            "Detection stream was produced with different tracker settings"
        );
        false
    }

    /// Next non-empty line, trimmed. Header-style comment lines are kept so
    /// the caller can decide what they mean.
    fn next_content_line(&mut self) -> LookdownResult<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }
}

impl<R: BufRead + Send> FrameSource for DetectionStreamSource<R> {
    fn frame_size(&self) -> FrameSize {
        self.header.frame_size()
    }

    fn next_frame(&mut self) -> LookdownResult<Option<FrameObservations>> {
        while let Some(line) = self.next_content_line()? {
            if line.starts_with('#') {
                continue;
            }
            let frame = parse_frame_line(&line).map_err(|e| {
                LookdownError::encode(format!("{}:{}: {e}", self.name, self.line_no))
            })?;
            return Ok(Some(frame));
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Replays a fixed list of frames.
pub struct CannedFrameSource {
    frame_size: FrameSize,
    frames: VecDeque<FrameObservations>,
}

impl CannedFrameSource {
    pub fn new(frame_size: FrameSize, frames: impl IntoIterator<Item = FrameObservations>) -> Self {
        Self {
            frame_size,
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for CannedFrameSource {
    fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    fn next_frame(&mut self) -> LookdownResult<Option<FrameObservations>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"# {"schema_version":"1.0","frame_width":640,"frame_height":480}"#;

    fn stream(body: &str) -> String {
        format!("{HEADER}\n{body}")
    }

    #[test]
    fn reads_header_and_frames() {
        let text = stream("{\"frame\":0}\n\n{\"frame\":1,\"objects\":[]}\n");
        let mut source = DetectionStreamSource::from_reader(text.as_bytes(), "test").unwrap();

        assert_eq!(
            source.frame_size(),
            FrameSize {
                width: 640,
                height: 480
            }
        );
        assert_eq!(source.next_frame().unwrap().unwrap().frame, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().frame, 1);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = DetectionStreamSource::from_reader("{\"frame\":0}\n".as_bytes(), "test")
            .err()
            .unwrap();
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert!(DetectionStreamSource::from_reader("".as_bytes(), "test").is_err());
    }

    #[test]
    fn bad_frame_line_names_position() {
        let text = stream("{\"frame\":0}\nnot json\n");
        let mut source = DetectionStreamSource::from_reader(text.as_bytes(), "cam").unwrap();
        source.next_frame().unwrap();
        let err = source.next_frame().unwrap_err().to_string();
        assert!(err.contains("cam:3"), "{err}");
    }

    #[test]
    fn tracker_params_mismatch_is_detected() {
        let text = r#"# {"schema_version":"1.0","frame_width":640,"frame_height":480,"tracker":{"hit_counter_max":15}}"#;
        let source = DetectionStreamSource::from_reader(text.as_bytes(), "test").unwrap();
        assert!(!source.check_tracker_params(&TrackerParams::default()));

        let expected = TrackerParams {
            hit_counter_max: 15,
            ..Default::default()
        };
        assert!(source.check_tracker_params(&expected));
    }

    #[test]
    fn header_without_tracker_always_matches() {
        let source = DetectionStreamSource::from_reader(HEADER.as_bytes(), "test").unwrap();
        assert!(source.check_tracker_params(&TrackerParams::default()));
    }

    #[test]
    fn canned_source_replays_in_order() {
        let size = FrameSize {
            width: 10,
            height: 10,
        };
        let mut source = CannedFrameSource::new(
            size,
            [FrameObservations::empty(0), FrameObservations::empty(1)],
        );
        assert_eq!(source.next_frame().unwrap().unwrap().frame, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().frame, 1);
        assert!(source.next_frame().unwrap().is_none());
    }
}
