//! Factory traits and adapters.

use crate::core::{Identifier, Instance};
use crate::error::ResolveError;
use crate::locator::ServiceLocator;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Produces instances of `T`.
///
/// A factory may call back into `locator` (with `get` or `build`) to resolve
/// its own dependencies. It must not cache anything itself; caching belongs to
/// the [`ServiceManager`](crate::ServiceManager). When construction cannot
/// proceed it returns an error.
pub trait Factory<T: ?Sized>: Send + Sync {
  fn create(
    &self,
    identifier: &Identifier,
    locator: &dyn ServiceLocator,
  ) -> Result<Arc<T>, ResolveError>;
}

/// The type-erased form of [`Factory`], as stored by the manager.
///
/// Implement this directly for factories that can build more than one type,
/// such as [`AutowireFactory`](crate::AutowireFactory).
pub trait DynFactory: Send + Sync {
  fn create_instance(
    &self,
    identifier: &Identifier,
    locator: &dyn ServiceLocator,
  ) -> Result<Instance, ResolveError>;
}

/// Erases the produced type of a typed factory.
pub(crate) struct Erased<T: ?Sized, F> {
  factory: F,
  _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized, F> Erased<T, F> {
  pub(crate) fn new(factory: F) -> Self {
    Self {
      factory,
      _marker: PhantomData,
    }
  }
}

impl<T, F> DynFactory for Erased<T, F>
where
  T: ?Sized + Any + Send + Sync,
  F: Factory<T>,
{
  fn create_instance(
    &self,
    identifier: &Identifier,
    locator: &dyn ServiceLocator,
  ) -> Result<Instance, ResolveError> {
    self.factory.create(identifier, locator).map(Instance::new)
  }
}

/// A factory backed by a closure.
///
/// ```
/// use fibre_locator::{FnFactory, ServiceManager};
/// use std::sync::Arc;
///
/// let manager = ServiceManager::new();
/// manager.register_factory::<String, _>(FnFactory::new(|_| Ok(Arc::new(String::from("hi")))));
/// assert_eq!(*manager.get::<String>().unwrap(), "hi");
/// ```
pub struct FnFactory<F> {
  closure: F,
}

impl<F> FnFactory<F> {
  pub fn new<T>(closure: F) -> Self
  where
    T: ?Sized,
    F: Fn(&dyn ServiceLocator) -> Result<Arc<T>, ResolveError> + Send + Sync,
  {
    Self { closure }
  }
}

impl<F> fmt::Debug for FnFactory<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnFactory").finish_non_exhaustive()
  }
}

impl<T, F> Factory<T> for FnFactory<F>
where
  T: ?Sized,
  F: Fn(&dyn ServiceLocator) -> Result<Arc<T>, ResolveError> + Send + Sync,
{
  fn create(
    &self,
    _identifier: &Identifier,
    locator: &dyn ServiceLocator,
  ) -> Result<Arc<T>, ResolveError> {
    (self.closure)(locator)
  }
}

/// Marks a type for the offline factory generator.
///
/// `fibre_locator_codegen` scans sources for `impl FactoryGenerated for T {}`
/// and emits a `TFactory` implementing [`Factory<T>`] next to it. The trait has
/// no behavior at runtime.
pub trait FactoryGenerated {}
