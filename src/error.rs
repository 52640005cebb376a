//! Error types for the service registry.

use std::fmt;

/// Registry errors
///
/// Represents the failures that can surface while resolving a service.
/// Registration and reset never fail.
///
/// # Examples
///
/// ```rust
/// use injectable::DiError;
///
/// let not_found = DiError::NotFound("MyService");
/// let mismatch = DiError::ArgumentMismatch { service: "Widget", expected: "u32" };
///
/// assert_eq!(not_found.to_string(), "Service not found: MyService");
/// assert_eq!(mismatch.to_string(), "Argument for Widget is not a u32");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No override and no default binding for the service
    NotFound(&'static str),
    /// A stored value failed to downcast to the requested type
    TypeMismatch(&'static str),
    /// The opaque construction argument has the wrong type
    ArgumentMismatch {
        service: &'static str,
        expected: &'static str,
    },
    /// A constructor that needs an argument was given none
    MissingArgument(&'static str),
    /// A self-constructing type refused to build itself
    Construction {
        service: &'static str,
        reason: String,
    },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(name) => write!(f, "Service not found: {}", name),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::ArgumentMismatch { service, expected } => {
                write!(f, "Argument for {} is not a {}", service, expected)
            }
            DiError::MissingArgument(name) => write!(f, "Missing construction argument for: {}", name),
            DiError::Construction { service, reason } => {
                write!(f, "Failed to construct {}: {}", service, reason)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for registry operations
///
/// A convenience alias for `Result<T, DiError>`.
///
/// # Examples
///
/// ```rust
/// use injectable::{DiResult, DiError};
///
/// fn lookup() -> DiResult<u32> {
///     Err(DiError::NotFound("u32"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
