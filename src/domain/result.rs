//! Result type alias for Conflux
//!
//! This module provides a convenient Result type alias that uses ConfluxError
//! as the error type.

use super::errors::ConfluxError;

/// Result type alias for Conflux operations
///
/// # Examples
///
/// ```
/// use conflux::domain::result::Result;
/// use conflux::domain::errors::ConfluxError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ConfluxError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ConfluxError>;
