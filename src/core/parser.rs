//! Snapshot line parser
//!
//! Turns comma separated `x,y,z[,vx,vy,vz[,mass]]` lines into
//! [`ParticleRecord`]s. Header detection comes in two named flavours, see
//! [`HeaderMode`].

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, trace};

use super::data::{ParticleRecord, Vec3};
use super::error::{MapError, MapResult};

const DELIMITER: char = ',';

/// First field of a header line in [`HeaderMode::HeaderToken`] mode
pub const HEADER_TOKEN: &str = "x";

const POSITION_COLUMNS: usize = 3;
const VELOCITY_COLUMNS: usize = 3;
const MASS_COLUMN: usize = POSITION_COLUMNS + VELOCITY_COLUMNS;

/// How non-data lines are recognised. Blank lines are skipped in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum HeaderMode {
    /// Skip lines whose first non-blank character is `marker`
    CommentMarker { marker: char },
    /// Skip lines whose first field is the literal `x`
    #[default]
    HeaderToken,
}

impl HeaderMode {
    pub fn is_header(&self, line: &str) -> bool {
        let line = line.trim_start();
        match *self {
            HeaderMode::CommentMarker { marker } => line.starts_with(marker),
            HeaderMode::HeaderToken => line
                .split(DELIMITER)
                .next()
                .is_some_and(|first| first.trim() == HEADER_TOKEN),
        }
    }
}

/// Parse a single line
///
/// Returns `Ok(None)` for blank and header lines. `line_no` is 1-based and
/// only used for error reporting.
pub fn parse_line(line: &str, line_no: usize, mode: HeaderMode) -> MapResult<Option<ParticleRecord>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if mode.is_header(line) {
        trace!(line_no, ?mode, "Header line skipped");
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();

    if fields.len() > MASS_COLUMN + 1 {
        trace!(line_no, extra = fields.len() - MASS_COLUMN - 1, "Extra columns ignored");
    }

    let position = match parse_position(&fields) {
        Some(position) => position,
        None => {
            return Err(MapError::MalformedRecord {
                line: line_no,
                fields: fields.iter().filter(|f| parse_number(f).is_some()).count(),
            })
        }
    };

    let values = fields
        .iter()
        .enumerate()
        .take(MASS_COLUMN + 1)
        .skip(POSITION_COLUMNS)
        .map(|(column, raw)| parse_field(raw, line_no, column))
        .collect::<MapResult<Vec<Option<f64>>>>()?;

    let column = |i: usize| values.get(i - POSITION_COLUMNS).copied().flatten();

    let velocity_fields: Vec<Option<f64>> = (POSITION_COLUMNS..MASS_COLUMN).map(column).collect();
    let velocity = if velocity_fields.iter().any(Option::is_some) {
        let mut v: Vec3 = [0.0; 3];
        for (slot, value) in v.iter_mut().zip(&velocity_fields) {
            *slot = value.unwrap_or(0.0);
        }
        Some(v)
    } else {
        None
    };

    let mass = column(MASS_COLUMN);
    if let Some(mass) = mass {
        if mass < 0.0 {
            return Err(MapError::NegativeMass { line: line_no, mass });
        }
    }

    let record = ParticleRecord::new(line_no, position, velocity, mass);
    trace!(line_no, position = ?record.position, mass = record.mass(), "Particle parsed");
    Ok(Some(record))
}

/// x, y and z, or `None` unless all three are finite numbers
fn parse_position(fields: &[&str]) -> Option<Vec3> {
    let mut position: Vec3 = [0.0; 3];
    for (slot, raw) in position.iter_mut().zip(fields.get(..POSITION_COLUMNS)?) {
        *slot = parse_number(raw)?;
    }
    Some(position)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Optional column: empty means absent, anything else must be a finite number
fn parse_field(raw: &str, line_no: usize, column: usize) -> MapResult<Option<f64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    match parse_number(raw) {
        Some(value) => Ok(Some(value)),
        None => Err(MapError::InvalidNumber {
            line: line_no,
            column: column + 1,
            value: raw.to_string(),
        }),
    }
}

/// Parse every line in order, skipping blank and header lines
pub fn parse_lines<I, S>(lines: I, mode: HeaderMode) -> MapResult<Vec<ParticleRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in lines.into_iter().enumerate() {
        match parse_line(line.as_ref(), idx + 1, mode)? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(records = records.len(), skipped, ?mode, "Snapshot lines parsed");
    Ok(records)
}

/// Like [`parse_lines`], reading from a buffered source until EOF
pub fn parse_reader<R: BufRead>(reader: R, mode: HeaderMode) -> MapResult<Vec<ParticleRecord>> {
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;
    parse_lines(lines, mode)
}
