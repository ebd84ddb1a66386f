//! Result type alias for mwf-deid

use super::errors::DeidError;

/// Result type alias for mwf-deid operations
///
/// # Examples
///
/// ```
/// use mwf_deid::domain::result::Result;
/// use mwf_deid::domain::errors::DeidError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DeidError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DeidError>;
