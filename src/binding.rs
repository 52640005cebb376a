//! Named default bindings.

use crate::container::Container;

/// A named accessor mapping a service handle to its default construction.
///
/// Each binding is a marker type; its `make` is the default expression used
/// whenever no override is registered for [`Binding::Service`]. The expression
/// usually routes through one of the container's scopes.
///
/// Overrides are keyed by the service handle type, not by the marker, so
/// registering a mock for `Arc<dyn Greeter>` replaces every binding that
/// produces `Arc<dyn Greeter>`.
///
/// # Examples
///
/// ```
/// use injectable::{container, Binding, Container};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct SystemClock;
/// impl Clock for SystemClock {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// struct ClockBinding;
///
/// impl Binding for ClockBinding {
///     type Service = Arc<dyn Clock>;
///
///     fn make(c: &Container) -> Self::Service {
///         c.shared().obtain(|| Arc::new(SystemClock) as Arc<dyn Clock>)
///     }
/// }
///
/// let clock = container().resolve_binding::<ClockBinding>();
/// assert_eq!(clock.now(), 42);
/// ```
pub trait Binding: 'static {
    /// The handle type consumers receive, usually `Arc<dyn Trait>`.
    type Service: Send + 'static;

    /// Builds the default service.
    fn make(container: &Container) -> Self::Service;
}
