//! Shared parameter validation helpers.
//!
//! Small guard functions used by configuration types and the pipeline to
//! fail fast with a [`WsiError::Config`] before any tile work begins.

use crate::core::errors::WsiError;

/// Validates that a numeric value is strictly positive.
pub fn validate_positive<T>(value: T, name: &str) -> Result<(), WsiError>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(WsiError::config_detailed(
            "parameter validation",
            format!("{name} must be positive, got {value}"),
        ));
    }
    Ok(())
}

/// Validates that a fraction lies in `[0, 1]`.
pub fn validate_unit_range(value: f32, name: &str) -> Result<(), WsiError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(WsiError::config_detailed(
            "parameter validation",
            format!("{name} must be in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Validates that a value is finite and not negative.
pub fn validate_non_negative(value: f32, name: &str) -> Result<(), WsiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(WsiError::config_detailed(
            "parameter validation",
            format!("{name} must be a non-negative finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Validates that a slice is not empty.
pub fn validate_non_empty<T>(items: &[T], name: &str) -> Result<(), WsiError> {
    if items.is_empty() {
        return Err(WsiError::config_detailed(
            "parameter validation",
            format!("{name} must not be empty"),
        ));
    }
    Ok(())
}
