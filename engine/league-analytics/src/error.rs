//! Parameter validation errors

use thiserror::Error;

/// Result type for parameter validation
pub type Result<T> = std::result::Result<T, ParamError>;

/// Rejected user parameters; raised before any provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Season {year} is outside {min}-{max}")]
    SeasonOutOfRange { year: u16, min: u16, max: u16 },

    #[error("Week {week} is outside {min}-{max}")]
    WeekOutOfRange { week: u8, min: u8, max: u8 },

    #[error("End week {end} is before start week {start}")]
    InvertedRange { start: u8, end: u8 },

    #[error("Minimum points must be a finite number >= 0, got {0}")]
    InvalidMinPoints(f64),
}
