//! The read-only capability handed to factories.

use crate::core::{Identifier, Instance};
use crate::error::ResolveError;

use std::any::Any;
use std::sync::Arc;

/// Locates services by identifier.
///
/// Factories receive a `&dyn ServiceLocator` and call back into it to resolve
/// their own dependencies. Both operations are total: failures come back as
/// [`ResolveError`] values.
pub trait ServiceLocator: Send + Sync {
  /// Cached resolution: returns the existing singleton if there is one,
  /// otherwise resolves, caches and returns it.
  fn get_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError>;

  /// Fresh resolution: always runs the resolution pipeline and never reads or
  /// writes the cache entry for `identifier`.
  fn build_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError>;
}

impl dyn ServiceLocator + '_ {
  /// Typed form of [`ServiceLocator::get_instance`].
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>, ResolveError> {
    let identifier = Identifier::of::<T>();
    self
      .get_instance(&identifier)?
      .downcast_for::<T>(&identifier)
  }

  /// Typed form of [`ServiceLocator::build_instance`].
  pub fn build<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>, ResolveError> {
    let identifier = Identifier::of::<T>();
    self
      .build_instance(&identifier)?
      .downcast_for::<T>(&identifier)
  }
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Arc<L> {
  fn get_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError> {
    (**self).get_instance(identifier)
  }

  fn build_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError> {
    (**self).build_instance(identifier)
  }
}

/// Backs the `resolve!` and `resolve_from!` macros.
#[doc(hidden)]
#[track_caller]
pub fn resolve_required<T, L>(locator: &L) -> Arc<T>
where
  T: ?Sized + Any + Send + Sync,
  L: ServiceLocator + ?Sized,
{
  let identifier = Identifier::of::<T>();
  match locator
    .get_instance(&identifier)
    .and_then(|instance| instance.downcast_for::<T>(&identifier))
  {
    Ok(service) => service,
    Err(error) => panic!(
      "Failed to resolve required service {}: {}",
      identifier, error
    ),
  }
}
