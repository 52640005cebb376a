//! Field wrappers that pull their value from a named binding.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use once_cell::sync::OnceCell;

use crate::binding::Binding;
use crate::container::container;

/// A service resolved from binding `B` when the wrapper is created.
///
/// The value can be replaced afterwards, which is handy for tests that
/// build an object and then swap one collaborator.
///
/// # Examples
///
/// ```
/// use injectable::{Binding, Container, Injected};
/// use std::sync::Arc;
///
/// struct Config { retries: u8 }
/// struct ConfigBinding;
///
/// impl Binding for ConfigBinding {
///     type Service = Arc<Config>;
///     fn make(c: &Container) -> Self::Service {
///         c.application().obtain(|| Arc::new(Config { retries: 3 }))
///     }
/// }
///
/// struct Uploader {
///     config: Injected<ConfigBinding>,
/// }
///
/// let uploader = Uploader { config: Injected::new() };
/// assert_eq!(uploader.config.retries, 3);
/// ```
pub struct Injected<B: Binding> {
    service: B::Service,
}

impl<B: Binding> Injected<B> {
    /// Resolves `B` from the global container.
    pub fn new() -> Self {
        Self {
            service: container().resolve_binding::<B>(),
        }
    }

    /// Replaces the held service.
    pub fn set(&mut self, service: B::Service) {
        self.service = service;
    }

    /// Consumes the wrapper, returning the service.
    pub fn into_inner(self) -> B::Service {
        self.service
    }
}

impl<B: Binding> Default for Injected<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Binding> Deref for Injected<B> {
    type Target = B::Service;

    fn deref(&self) -> &Self::Target {
        &self.service
    }
}

impl<B: Binding> DerefMut for Injected<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.service
    }
}

impl<B: Binding> fmt::Debug for Injected<B>
where
    B::Service: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Injected").field(&self.service).finish()
    }
}

/// A service resolved from binding `B` on first access.
///
/// Resolution happens at most once per wrapper, even when several threads
/// reach the first access together.
///
/// # Examples
///
/// ```
/// use injectable::{Binding, Container, LazyInjected};
///
/// struct ExpensiveBinding;
///
/// impl Binding for ExpensiveBinding {
///     type Service = u64;
///     fn make(_: &Container) -> u64 { 7 }
/// }
///
/// let lazy: LazyInjected<ExpensiveBinding> = LazyInjected::new();
/// assert!(!lazy.is_resolved());
/// assert_eq!(*lazy, 7);
/// assert!(lazy.is_resolved());
/// ```
pub struct LazyInjected<B: Binding> {
    service: OnceCell<B::Service>,
    _binding: PhantomData<fn() -> B>,
}

impl<B: Binding> LazyInjected<B> {
    pub fn new() -> Self {
        Self {
            service: OnceCell::new(),
            _binding: PhantomData,
        }
    }

    /// Returns the service, resolving it on first call.
    pub fn get(&self) -> &B::Service {
        self.service.get_or_init(|| container().resolve_binding::<B>())
    }

    /// Returns true once the service has been resolved or set.
    pub fn is_resolved(&self) -> bool {
        self.service.get().is_some()
    }

    /// Replaces the service; later accesses never consult the container.
    pub fn set(&mut self, service: B::Service) {
        self.service = OnceCell::with_value(service);
    }
}

impl<B: Binding> Default for LazyInjected<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Binding> Deref for LazyInjected<B> {
    type Target = B::Service;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<B: Binding> fmt::Debug for LazyInjected<B>
where
    B::Service: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyInjected").field(&self.service.get()).finish()
    }
}
