//! Error taxonomy for snapshot parsing and radius mapping
//!
//! Every variant is fatal to a mapping run: there is no partial output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// A data line carried fewer than three numeric fields
    #[error("line {line}: expected at least 3 numeric fields (x,y,z), found {fields}")]
    MalformedRecord { line: usize, fields: usize },

    #[error("line {line}: column {column} is not a finite number: {value:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("line {line}: mass must be non-negative, got {mass}")]
    NegativeMass { line: usize, mass: f64 },

    /// All particles share one mass, so a range-based policy has nothing to spread over
    #[error("mass range is degenerate: every particle has mass {mass}")]
    DegenerateRange { mass: f64 },

    #[error("line {line}: mass {mass} maps to a non-finite radius")]
    NonFiniteRadius { line: usize, mass: f64 },

    #[error("mass array is missing")]
    MissingMassArray,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MapResult<T> = Result<T, MapError>;
