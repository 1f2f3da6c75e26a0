//! The pose table: the CSV file handed from encoding to analysis.
//!
//! Column order is fixed: `frame`, then `<keypoint>_x`/`<keypoint>_y` for the
//! 17 keypoints, then `frame_height`, `frame_width`, `tracking_id`,
//! `dist_ear_nose`, `look_down`. Missing values are empty fields.
//!
//! Readers locate columns by header name and keep `tracking_id` and
//! `look_down` as raw text; turning them into typed values is the job of the
//! analysis preprocessing steps.

use std::io;
use std::path::Path;

use lookdown_common::error::{LookdownError, LookdownResult};

use crate::keypoint::{KeypointName, KeypointSet, Point, KEYPOINT_COUNT};
use crate::record::FrameRecord;

pub const FRAME_COLUMN: &str = "frame";
pub const FRAME_HEIGHT_COLUMN: &str = "frame_height";
pub const FRAME_WIDTH_COLUMN: &str = "frame_width";
pub const TRACKING_ID_COLUMN: &str = "tracking_id";
pub const DIST_EAR_NOSE_COLUMN: &str = "dist_ear_nose";
pub const LOOK_DOWN_COLUMN: &str = "look_down";

/// Number of columns in a pose table.
pub const TABLE_WIDTH: usize = 1 + 2 * KEYPOINT_COUNT + 5;

/// Header row in column order.
pub fn table_header() -> Vec<String> {
    let mut header = Vec::with_capacity(TABLE_WIDTH);
    header.push(FRAME_COLUMN.to_string());
    for name in KeypointName::ALL {
        header.push(name.x_column());
        header.push(name.y_column());
    }
    header.extend(
        [
            FRAME_HEIGHT_COLUMN,
            FRAME_WIDTH_COLUMN,
            TRACKING_ID_COLUMN,
            DIST_EAR_NOSE_COLUMN,
            LOOK_DOWN_COLUMN,
        ]
        .map(String::from),
    );
    header
}

/// A table row as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub frame: u64,
    pub keypoints: KeypointSet,
    /// The `nose_y` cell, kept even when `nose_x` is empty. Equal to the
    /// nose keypoint's `y` whenever that keypoint is present.
    pub nose_y: Option<f64>,
    pub frame_height: u32,
    pub frame_width: u32,
    /// Raw identity text, e.g. `"3"` or `"3.0"`.
    pub tracking_id: Option<String>,
    pub dist_ear_nose: Option<f64>,
    /// Raw flag text, e.g. `"True"`, `"false"`, `"1"`.
    pub look_down: Option<String>,
}

impl TableRow {
    /// Whether every field, keypoints included, holds a value.
    pub fn is_complete(&self) -> bool {
        self.keypoints.is_complete()
            && self.tracking_id.is_some()
            && self.dist_ear_nose.is_some()
            && self.look_down.is_some()
    }

    /// Fields in column order.
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(TABLE_WIDTH);
        fields.push(self.frame.to_string());
        for (name, point) in self.keypoints.iter() {
            let x = point.map(|p| p.x);
            let y = match name {
                KeypointName::Nose => self.nose_y,
                _ => point.map(|p| p.y),
            };
            fields.push(x.map(format_float).unwrap_or_default());
            fields.push(y.map(format_float).unwrap_or_default());
        }
        fields.push(self.frame_height.to_string());
        fields.push(self.frame_width.to_string());
        fields.push(self.tracking_id.clone().unwrap_or_default());
        fields.push(self.dist_ear_nose.map(format_float).unwrap_or_default());
        fields.push(self.look_down.clone().unwrap_or_default());
        fields
    }
}

impl From<&FrameRecord> for TableRow {
    fn from(record: &FrameRecord) -> Self {
        Self {
            frame: record.frame,
            keypoints: record.keypoints,
            nose_y: record.keypoints.nose().map(|p| p.y),
            frame_height: record.frame_size.height,
            frame_width: record.frame_size.width,
            tracking_id: record.tracking_id.map(|id| id.to_string()),
            dist_ear_nose: record.dist_ear_nose(),
            look_down: record.look_down_flag().map(format_flag),
        }
    }
}

/// Boolean spelling used in the `look_down` column.
pub fn format_flag(flag: bool) -> String {
    let text = if flag { "True" } else { "False" };
    text.to_string()
}

/// Floats always carry a fractional part (`100.0`, not `100`).
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Read a pose table from disk.
pub fn read_table(path: &Path) -> LookdownResult<Vec<TableRow>> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LookdownError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LookdownError::Io(e),
    })?;
    read_table_from(io::BufReader::new(file))
}

/// Read a pose table from any reader.
pub fn read_table_from<R: io::Read>(reader: R) -> LookdownResult<Vec<TableRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = i + 2;
        rows.push(columns.parse_row(&record, line)?);
    }
    Ok(rows)
}

/// Write a complete pose table, replacing any existing file.
pub fn write_table(path: &Path, rows: &[TableRow]) -> LookdownResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table_header())?;
    for row in rows {
        writer.write_record(row.to_fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Header positions of every column the reader needs.
struct ColumnIndex {
    frame: usize,
    keypoints: [(usize, usize); KEYPOINT_COUNT],
    frame_height: usize,
    frame_width: usize,
    tracking_id: usize,
    dist_ear_nose: usize,
    look_down: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> LookdownResult<Self> {
        let find = |name: &str| -> LookdownResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LookdownError::table(format!("missing column '{name}'")))
        };

        let mut keypoints = [(0, 0); KEYPOINT_COUNT];
        for name in KeypointName::ALL {
            keypoints[name.index()] = (find(&name.x_column())?, find(&name.y_column())?);
        }

        Ok(Self {
            frame: find(FRAME_COLUMN)?,
            keypoints,
            frame_height: find(FRAME_HEIGHT_COLUMN)?,
            frame_width: find(FRAME_WIDTH_COLUMN)?,
            tracking_id: find(TRACKING_ID_COLUMN)?,
            dist_ear_nose: find(DIST_EAR_NOSE_COLUMN)?,
            look_down: find(LOOK_DOWN_COLUMN)?,
        })
    }

    fn parse_row(&self, record: &csv::StringRecord, line: usize) -> LookdownResult<TableRow> {
        let cell = |idx: usize| value(record.get(idx));

        let mut keypoints = KeypointSet::empty();
        let mut nose_y = None;
        for name in KeypointName::ALL {
            let (x_idx, y_idx) = self.keypoints[name.index()];
            let x = parse_float(cell(x_idx), &name.x_column(), line)?;
            let y = parse_float(cell(y_idx), &name.y_column(), line)?;
            if name == KeypointName::Nose {
                nose_y = y;
            }
            // A point needs both coordinates; `nose_y` is also kept on its own.
            if let (Some(x), Some(y)) = (x, y) {
                keypoints.set(name, Some(Point::new(x, y)));
            }
        }

        let frame = required(
            parse_integral(cell(self.frame), FRAME_COLUMN, line)?,
            FRAME_COLUMN,
            line,
        )?;
        let frame_height = required(
            parse_integral(cell(self.frame_height), FRAME_HEIGHT_COLUMN, line)?,
            FRAME_HEIGHT_COLUMN,
            line,
        )?;
        let frame_width = required(
            parse_integral(cell(self.frame_width), FRAME_WIDTH_COLUMN, line)?,
            FRAME_WIDTH_COLUMN,
            line,
        )?;

        Ok(TableRow {
            frame,
            keypoints,
            nose_y,
            frame_height: to_u32(frame_height, FRAME_HEIGHT_COLUMN, line)?,
            frame_width: to_u32(frame_width, FRAME_WIDTH_COLUMN, line)?,
            tracking_id: cell(self.tracking_id).map(str::to_string),
            dist_ear_nose: parse_float(cell(self.dist_ear_nose), DIST_EAR_NOSE_COLUMN, line)?,
            look_down: cell(self.look_down).map(str::to_string),
        })
    }
}

/// Empty cells and NaN spellings are missing values.
fn value(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
}

fn parse_float(raw: Option<&str>, column: &str, line: usize) -> LookdownResult<Option<f64>> {
    raw.map(|s| {
        s.parse::<f64>().map_err(|_| {
            LookdownError::table(format!("line {line}: '{s}' in column '{column}' is not a number"))
        })
    })
    .transpose()
}

/// Accepts `12` as well as float renderings such as `12.0`.
fn parse_integral(raw: Option<&str>, column: &str, line: usize) -> LookdownResult<Option<u64>> {
    let Some(s) = raw else {
        return Ok(None);
    };
    if let Ok(v) = s.parse::<u64>() {
        return Ok(Some(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(Some(v as u64))
        }
        _ => Err(LookdownError::table(format!(
            "line {line}: '{s}' in column '{column}' is not a non-negative integer"
        ))),
    }
}

fn required<T>(value: Option<T>, column: &str, line: usize) -> LookdownResult<T> {
    value.ok_or_else(|| LookdownError::table(format!("line {line}: column '{column}' is empty")))
}

fn to_u32(value: u64, column: &str, line: usize) -> LookdownResult<u32> {
    u32::try_from(value).map_err(|_| {
        LookdownError::table(format!("line {line}: {value} in column '{column}' is too large"))
    })
}
