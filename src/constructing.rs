//! Services that know how to build themselves from an optional argument.

use std::any::Any;

use crate::error::{DiError, DiResult};

/// Opaque construction argument passed through argument-aware resolution.
pub type Argument = dyn Any + Send + Sync;

/// A service able to produce its own default instance.
///
/// This is the fallback used by [`Container::resolve_with`](crate::Container::resolve_with)
/// when no argument-aware override is registered for the type. The argument
/// is passed through untouched; a constructor that receives an argument of
/// the wrong type must report [`DiError::ArgumentMismatch`] rather than panic.
/// The [`argument`](Self::argument) and [`argument_or`](Self::argument_or)
/// helpers do exactly that.
///
/// # Examples
///
/// ```
/// use injectable::{container, Argument, DiError, DiResult, SelfConstructing};
///
/// struct Pool {
///     size: usize,
/// }
///
/// impl SelfConstructing for Pool {
///     fn construct(arg: Option<&Argument>) -> DiResult<Self> {
///         Ok(Pool { size: Self::argument_or(arg, 4usize)? })
///     }
/// }
///
/// let pool: Pool = container().resolve_with(Some(&16usize)).unwrap();
/// assert_eq!(pool.size, 16);
///
/// let pool: Pool = container().resolve_with(None).unwrap();
/// assert_eq!(pool.size, 4);
///
/// let err = container().resolve_with::<Pool>(Some(&"sixteen")).err().unwrap();
/// assert!(matches!(err, DiError::ArgumentMismatch { .. }));
/// ```
pub trait SelfConstructing: Sized + Send + 'static {
    /// Builds an instance from the optional argument.
    fn construct(arg: Option<&Argument>) -> DiResult<Self>;

    /// Borrows a required argument of type `T`.
    fn argument<T: Any>(arg: Option<&Argument>) -> DiResult<&T> {
        let arg = arg.ok_or(DiError::MissingArgument(std::any::type_name::<Self>()))?;
        arg.downcast_ref::<T>().ok_or(DiError::ArgumentMismatch {
            service: std::any::type_name::<Self>(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Reads an optional argument of type `T`, using `fallback` when none was given.
    fn argument_or<T: Any + Clone>(arg: Option<&Argument>, fallback: T) -> DiResult<T> {
        match arg {
            None => Ok(fallback),
            Some(_) => Self::argument::<T>(arg).cloned(),
        }
    }
}
