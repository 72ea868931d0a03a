//! Common validation utilities.

use validator::ValidationError;

/// Maximum number of points a balance may hold.
pub const MAX_POINTS: i64 = 1_000_000_000;

/// Normalizes an email address for storage and comparison (trim + lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that a point balance is within range.
pub fn validate_points(points: i64) -> Result<(), ValidationError> {
    if (0..=MAX_POINTS).contains(&points) {
        Ok(())
    } else {
        let mut err = ValidationError::new("points_range");
        err.message = Some("Points must be between 0 and 1000000000".into());
        Err(err)
    }
}

/// Validates that a price in points is non-negative and bounded.
pub fn validate_price(price: i64) -> Result<(), ValidationError> {
    if (0..=MAX_POINTS).contains(&price) {
        Ok(())
    } else {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Price must be between 0 and 1000000000".into());
        Err(err)
    }
}

/// Validates that a string is not blank after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
