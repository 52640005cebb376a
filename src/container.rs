//! The process-wide service registry.
//!
//! The container resolves a service handle by checking its override tables
//! first and falling back to a default binding supplied by the caller. It
//! also owns the three named scopes default bindings route through.
//!
//! # Precedence
//!
//! 1. A zero-argument override registered for the handle type always wins,
//!    before any scope is consulted.
//! 2. Otherwise the caller's default expression runs.
//! 3. Argument-aware resolution uses only the argument-aware table, then the
//!    type's [`SelfConstructing::construct`]. The two tables are independent:
//!    a zero-argument override never answers `resolve_with`, and vice versa.
//!
//! # Known limitations
//!
//! Cyclic factories (A's factory resolves B, B's resolves A) are not
//! detected and recurse until the stack overflows. `reset` racing with an
//! in-flight `resolve` on another thread is safe with respect to the tables
//! only; instances already returned stay valid.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::ReentrantMutex;

use crate::binding::Binding;
use crate::constructing::{Argument, SelfConstructing};
use crate::error::{DiError, DiResult};
use crate::key::{key_of_type, Key, KeyMap};
use crate::observer::{Observers, ResolutionObserver, ResolutionSource};
use crate::scope::{CachedScope, Scope, SharedScope, SingletonScope};
use crate::snapshot::RegistrySnapshot;

type AnySend = Box<dyn Any + Send>;
type Factory = Arc<dyn Fn() -> AnySend + Send + Sync>;
type ArgFactory = Arc<dyn Fn(Option<&Argument>) -> DiResult<AnySend> + Send + Sync>;

#[derive(Default)]
struct Overrides {
    factories: KeyMap<Factory>,
    arg_factories: KeyMap<ArgFactory>,
}

// The one and only container, created on first access.
static CONTAINER: Lazy<Container> = Lazy::new(Container::new);

/// Returns the global container.
///
/// # Examples
///
/// ```
/// use injectable::container;
///
/// struct Greeting(&'static str);
///
/// container().register(|| Greeting("mock"));
/// let greeting = container().resolve(|| Greeting("default"));
/// assert_eq!(greeting.0, "mock");
///
/// container().reset();
/// let greeting = container().resolve(|| Greeting("default"));
/// assert_eq!(greeting.0, "default");
/// ```
pub fn container() -> &'static Container {
    &CONTAINER
}

/// Service registry holding override factories and the named scopes.
///
/// Every table access goes through one re-entrant lock, held only while a
/// table is read or written. Factories always run after it is released.
pub struct Container {
    overrides: ReentrantMutex<RefCell<Overrides>>,
    application: SingletonScope,
    cached: CachedScope,
    shared: SharedScope,
    observers: Observers,
}

impl Container {
    fn new() -> Self {
        Self {
            overrides: ReentrantMutex::new(RefCell::new(Overrides::default())),
            application: SingletonScope::new(),
            cached: CachedScope::new(),
            shared: SharedScope::new(),
            observers: Observers::default(),
        }
    }

    /// Returns the global container. Same as [`container()`].
    pub fn global() -> &'static Container {
        &CONTAINER
    }

    // ===== Scopes =====

    /// Scope for services that live for the whole process.
    pub fn application(&self) -> &SingletonScope {
        &self.application
    }

    /// Scope for services kept until [`Scope::reset`] is called on it.
    pub fn cached(&self) -> &CachedScope {
        &self.cached
    }

    /// Scope for services kept while some caller still holds them.
    pub fn shared(&self) -> &SharedScope {
        &self.shared
    }

    // ===== Registration =====

    /// Installs a zero-argument override for `S`, replacing any previous one.
    ///
    /// The factory is not called until `S` is resolved, and it is called on
    /// every resolution. Route it through a scope to cache the result:
    ///
    /// ```
    /// use injectable::container;
    /// use std::sync::Arc;
    ///
    /// trait Api: Send + Sync {}
    /// struct MockApi;
    /// impl Api for MockApi {}
    ///
    /// let c = container();
    /// c.register(move || c.shared().obtain(|| Arc::new(MockApi) as Arc<dyn Api>));
    /// # c.reset();
    /// ```
    pub fn register<S, F>(&self, factory: F)
    where
        S: Send + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let key = key_of_type::<S>();
        let erased = erase(factory);

        let guard = self.overrides.lock();
        let previous = guard.borrow_mut().factories.insert(key, erased);
        drop(guard);

        tracing::debug!(service = key.display_name(), replaced = previous.is_some(), "override registered");
    }

    /// Installs an argument-aware override for `S`, replacing any previous one.
    ///
    /// Used only by [`resolve_with`](Self::resolve_with); it is stored apart
    /// from the zero-argument table.
    pub fn register_with<S, F>(&self, factory: F)
    where
        S: Send + 'static,
        F: Fn(Option<&Argument>) -> DiResult<S> + Send + Sync + 'static,
    {
        let key = key_of_type::<S>();
        let erased = erase_with(factory);

        let guard = self.overrides.lock();
        let previous = guard.borrow_mut().arg_factories.insert(key, erased);
        drop(guard);

        tracing::debug!(service = key.display_name(), replaced = previous.is_some(), "argument override registered");
    }

    /// Removes the zero-argument override for `S`. Returns whether one existed.
    pub fn unregister<S: 'static>(&self) -> bool {
        let key = key_of_type::<S>();
        let guard = self.overrides.lock();
        let previous = guard.borrow_mut().factories.remove(&key);
        drop(guard);
        previous.is_some()
    }

    /// Returns true if a zero-argument override exists for `S`.
    pub fn is_registered<S: 'static>(&self) -> bool {
        self.overrides.lock().borrow().factories.contains_key(&key_of_type::<S>())
    }

    /// Returns true if an argument-aware override exists for `S`.
    pub fn is_registered_with<S: 'static>(&self) -> bool {
        self.overrides.lock().borrow().arg_factories.contains_key(&key_of_type::<S>())
    }

    /// Stages registrations in a [`Batch`] and installs them together.
    ///
    /// `f` runs without any container lock held, so it may resolve services
    /// or touch scopes. Other threads see either none or all of the batch.
    ///
    /// ```
    /// use injectable::container;
    ///
    /// struct Host(&'static str);
    /// struct Port(u16);
    ///
    /// container().configure(|batch| {
    ///     batch.register(|| Host("localhost"));
    ///     batch.register(|| Port(8080));
    /// });
    /// assert_eq!(container().resolve(|| Port(80)).0, 8080);
    /// # container().reset();
    /// ```
    pub fn configure<R>(&self, f: impl FnOnce(&mut Batch) -> R) -> R {
        let mut batch = Batch::default();
        let result = f(&mut batch);
        let staged = batch.staged;
        let (overrides, argument_overrides) = (staged.factories.len(), staged.arg_factories.len());

        let guard = self.overrides.lock();
        let displaced = {
            let mut tables = guard.borrow_mut();
            let mut displaced = Overrides::default();
            for (key, factory) in staged.factories {
                if let Some(previous) = tables.factories.insert(key, factory) {
                    displaced.factories.insert(key, previous);
                }
            }
            for (key, factory) in staged.arg_factories {
                if let Some(previous) = tables.arg_factories.insert(key, factory) {
                    displaced.arg_factories.insert(key, previous);
                }
            }
            displaced
        };
        drop(guard);
        let replaced = displaced.factories.len() + displaced.arg_factories.len();
        drop(displaced);

        tracing::debug!(overrides, argument_overrides, replaced, "batch applied");
        result
    }

    /// Clears both override tables.
    ///
    /// Scope caches are untouched; reset them through their own
    /// [`Scope::reset`].
    pub fn reset(&self) {
        let guard = self.overrides.lock();
        let cleared = std::mem::take(&mut *guard.borrow_mut());
        drop(guard);

        tracing::debug!(
            overrides = cleared.factories.len(),
            argument_overrides = cleared.arg_factories.len(),
            "overrides reset"
        );
    }

    // ===== Resolution =====

    fn override_for(&self, key: &Key) -> Option<Factory> {
        self.overrides.lock().borrow().factories.get(key).cloned()
    }

    fn arg_override_for(&self, key: &Key) -> Option<ArgFactory> {
        self.overrides.lock().borrow().arg_factories.get(key).cloned()
    }

    /// Returns the override for `S` if one is registered, otherwise `default()`.
    ///
    /// The override factory runs after the table lock is released, so it may
    /// itself resolve other services from any thread.
    pub fn resolve<S, D>(&self, default: D) -> S
    where
        S: Send + 'static,
        D: FnOnce() -> S,
    {
        let key = key_of_type::<S>();
        match self.override_for(&key) {
            Some(factory) => self
                .observers
                .observe(&key, ResolutionSource::Override, || downcast::<S>(&key, factory())),
            None => self.observers.observe(&key, ResolutionSource::Default, default),
        }
    }

    /// Resolves the service of a named binding, honoring overrides.
    pub fn resolve_binding<B: Binding>(&self) -> B::Service {
        self.resolve(|| B::make(self))
    }

    /// Like [`resolve`](Self::resolve) for services whose default may be absent.
    ///
    /// The override is keyed by `S`, the service itself, not `Option<S>`.
    pub fn optional<S, D>(&self, default: D) -> Option<S>
    where
        S: Send + 'static,
        D: FnOnce() -> Option<S>,
    {
        let key = key_of_type::<S>();
        match self.override_for(&key) {
            Some(factory) => Some(
                self.observers
                    .observe(&key, ResolutionSource::Override, || downcast::<S>(&key, factory())),
            ),
            None => self.observers.observe(&key, ResolutionSource::Default, default),
        }
    }

    /// Returns the override for `S`, or [`DiError::NotFound`] when there is none.
    ///
    /// Use this where no sensible default exists.
    pub fn get<S: Send + 'static>(&self) -> DiResult<S> {
        let key = key_of_type::<S>();
        match self.override_for(&key) {
            Some(factory) => Ok(self
                .observers
                .observe(&key, ResolutionSource::Override, || downcast::<S>(&key, factory()))),
            None => {
                let error = DiError::NotFound(key.display_name());
                self.observers.failed(&key, &error);
                Err(error)
            }
        }
    }

    /// Resolves a self-constructing service with an optional argument.
    ///
    /// An argument-aware override wins; otherwise `S::construct(arg)` runs.
    /// Errors from either are returned unchanged.
    pub fn resolve_with<S: SelfConstructing>(&self, arg: Option<&Argument>) -> DiResult<S> {
        let key = key_of_type::<S>();
        match self.arg_override_for(&key) {
            Some(factory) => self
                .observers
                .observe_result(&key, ResolutionSource::ArgumentOverride, || {
                    factory(arg).map(|service| downcast::<S>(&key, service))
                }),
            None => self
                .observers
                .observe_result(&key, ResolutionSource::SelfConstructed, || S::construct(arg)),
        }
    }

    // ===== Diagnostics =====

    /// Installs an observer notified on every resolution.
    pub fn add_observer(&self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.add(observer);
    }

    /// Removes every observer.
    pub fn clear_observers(&self) {
        self.observers.clear();
    }

    /// Captures the registered overrides and the live entry count of each scope.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let (mut overrides, mut argument_overrides) = {
            let guard = self.overrides.lock();
            let tables = guard.borrow();
            (
                tables.factories.keys().map(Key::display_name).collect::<Vec<_>>(),
                tables.arg_factories.keys().map(Key::display_name).collect::<Vec<_>>(),
            )
        };
        overrides.sort_unstable();
        argument_overrides.sort_unstable();

        RegistrySnapshot {
            overrides,
            argument_overrides,
            application: self.application.len(),
            cached: self.cached.len(),
            shared: self.shared.len(),
        }
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let snapshot = self.snapshot();
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Overrides:\n");
        for name in &snapshot.overrides {
            s.push_str(&format!("  {}\n", name));
        }
        s.push_str("Argument Overrides:\n");
        for name in &snapshot.argument_overrides {
            s.push_str(&format!("  {}\n", name));
        }
        s.push_str(&format!(
            "Scopes: application={} cached={} shared={}\n",
            snapshot.application, snapshot.cached, snapshot.shared
        ));
        s
    }
}

fn erase<S, F>(factory: F) -> Factory
where
    S: Send + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    Arc::new(move || Box::new(factory()) as AnySend)
}

fn erase_with<S, F>(factory: F) -> ArgFactory
where
    S: Send + 'static,
    F: Fn(Option<&Argument>) -> DiResult<S> + Send + Sync + 'static,
{
    Arc::new(move |arg: Option<&Argument>| factory(arg).map(|service| Box::new(service) as AnySend))
}

/// Registrations staged by [`Container::configure`].
///
/// Nothing is visible to resolvers until the closure passed to `configure`
/// returns. Within one batch the last registration for a type wins.
#[derive(Default)]
pub struct Batch {
    staged: Overrides,
}

impl Batch {
    /// Stages a zero-argument override for `S`.
    pub fn register<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: Send + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.staged.factories.insert(key_of_type::<S>(), erase(factory));
        self
    }

    /// Stages an argument-aware override for `S`.
    pub fn register_with<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: Send + 'static,
        F: Fn(Option<&Argument>) -> DiResult<S> + Send + Sync + 'static,
    {
        self.staged.arg_factories.insert(key_of_type::<S>(), erase_with(factory));
        self
    }

    /// Number of staged overrides across both tables.
    pub fn len(&self) -> usize {
        self.staged.factories.len() + self.staged.arg_factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Tables are keyed by the stored type, so a failed downcast means they are corrupt.
fn downcast<S: 'static>(key: &Key, service: AnySend) -> S {
    match service.downcast::<S>() {
        Ok(service) => *service,
        Err(_) => panic!("{}", DiError::TypeMismatch(key.display_name())),
    }
}
