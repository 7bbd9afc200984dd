//! Configuration validation errors.
//!
//! Tuning constants are checked once when the owning system is built. The
//! checks return `ConfigError` so the binary can report a bad `config.ron`
//! cleanly; constructors treat an `Err` as a fatal contract violation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite number (got {value})")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} must be >= 0 (got {value})")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} must be > 0 (got {value})")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name}: min ({min}) must not exceed max ({max})")]
    InvertedRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{name}: {value} lies outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{name} must hold at least one element")]
    Empty { name: &'static str },
}

pub fn ensure_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

pub fn ensure_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

pub fn ensure_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

/// Both bounds non-negative and `min <= max`.
pub fn ensure_range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    ensure_non_negative(name, min)?;
    ensure_non_negative(name, max)?;
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

pub fn ensure_within(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

pub fn ensure_non_empty(name: &'static str, len: usize) -> Result<(), ConfigError> {
    if len > 0 {
        Ok(())
    } else {
        Err(ConfigError::Empty { name })
    }
}
