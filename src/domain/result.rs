//! Result type alias for hms-export

use super::errors::HmsExportError;

/// Result type alias for hms-export operations
///
/// # Examples
///
/// ```
/// use hms_export::domain::result::Result;
/// use hms_export::domain::errors::HmsExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HmsExportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HmsExportError>;
