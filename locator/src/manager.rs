//! The `ServiceManager`: the registry and resolution engine.

use crate::builder::ServiceManagerBuilder;
use crate::core::{Identifier, Instance, ResolutionGuard};
use crate::error::ResolveError;
use crate::factory::{DynFactory, Erased, Factory, FnFactory};
use crate::introspect::{ConstructorTable, Introspect};
use crate::locator::ServiceLocator;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

static NEXT_MANAGER_ID: AtomicUsize = AtomicUsize::new(1);

type Upcast = dyn Fn(Instance) -> Result<Instance, ResolveError> + Send + Sync;

#[derive(Clone)]
struct Alias {
  target: Identifier,
  upcast: Arc<Upcast>,
}

/// The dependency-injection container.
///
/// The manager owns the factory bindings, the alias bindings and the singleton
/// cache. It is thread-safe: registration and resolution may happen from any
/// thread, and concurrent `get` calls for the same unresolved service run its
/// factory once.
///
/// The manager always resolves itself, both as `ServiceManager` and as
/// `dyn ServiceLocator`.
pub struct ServiceManager {
  id: usize,
  this: Weak<ServiceManager>,
  factories: DashMap<Identifier, Arc<dyn DynFactory>>,
  aliases: DashMap<Identifier, Alias>,
  services: DashMap<Identifier, Arc<OnceCell<Instance>>>,
  constructors: Arc<ConstructorTable>,
  default_factory: Arc<dyn DynFactory>,
}

impl ServiceManager {
  /// Creates a manager whose default factory is an
  /// [`AutowireFactory`](crate::AutowireFactory) with the default policy.
  pub fn new() -> Arc<Self> {
    ServiceManagerBuilder::new().build()
  }

  pub fn builder() -> ServiceManagerBuilder {
    ServiceManagerBuilder::new()
  }

  pub(crate) fn from_parts(
    constructors: Arc<ConstructorTable>,
    default_factory: Arc<dyn DynFactory>,
  ) -> Arc<Self> {
    Arc::new_cyclic(|this| Self {
      id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
      this: this.clone(),
      factories: DashMap::new(),
      aliases: DashMap::new(),
      services: DashMap::new(),
      constructors,
      default_factory,
    })
  }

  // --- Registration ---

  /// Describes `T` and binds it to the default factory.
  pub fn register<T: Introspect>(&self) -> &Self {
    self.constructors.describe::<T>();
    self.register_identifier(Identifier::of::<T>())
  }

  /// Binds `identifier` to the default factory without describing it.
  pub fn register_identifier(&self, identifier: Identifier) -> &Self {
    self.bind(identifier, Arc::clone(&self.default_factory))
  }

  /// Binds `T` to an explicit factory. The last registration wins.
  pub fn register_factory<T, F>(&self, factory: F) -> &Self
  where
    T: ?Sized + Any + Send + Sync,
    F: Factory<T> + 'static,
  {
    self.bind(Identifier::of::<T>(), Arc::new(Erased::<T, F>::new(factory)))
  }

  /// Binds `T` to a closure factory.
  pub fn register_fn<T, F>(&self, closure: F) -> &Self
  where
    T: ?Sized + Any + Send + Sync,
    F: Fn(&dyn ServiceLocator) -> Result<Arc<T>, ResolveError> + Send + Sync + 'static,
  {
    self.register_factory::<T, _>(FnFactory::new(closure))
  }

  /// Binds `identifier` to a type-erased factory.
  pub fn register_dyn(&self, identifier: Identifier, factory: Arc<dyn DynFactory>) -> &Self {
    self.bind(identifier, factory)
  }

  /// Makes `I` resolve through `T`.
  ///
  /// `upcast` turns the replacement into the alias type, typically an unsizing
  /// cast such as `|file| file as Arc<dyn Storage>`, so both identifiers share
  /// one allocation.
  pub fn alias<I, T, F>(&self, upcast: F) -> &Self
  where
    I: ?Sized + Any + Send + Sync,
    T: ?Sized + Any + Send + Sync,
    F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
  {
    let identifier = Identifier::of::<I>();
    let target = Identifier::of::<T>();
    let convert: Arc<Upcast> = Arc::new(move |instance: Instance| {
      let replacement = instance.downcast_for::<T>(&target)?;
      Ok(Instance::new(upcast(replacement)))
    });
    tracing::trace!(service = %identifier, replacement = %target, "registered alias");
    self.aliases.insert(
      identifier,
      Alias {
        target,
        upcast: convert,
      },
    );
    self
  }

  /// Records the constructors of `T` without binding it.
  pub fn describe<T: Introspect>(&self) -> &Self {
    self.constructors.describe::<T>();
    self
  }

  /// The introspection table read by the default autowire factory.
  pub fn constructors(&self) -> &Arc<ConstructorTable> {
    &self.constructors
  }

  fn bind(&self, identifier: Identifier, factory: Arc<dyn DynFactory>) -> &Self {
    tracing::trace!(service = %identifier, "registered factory");
    self.factories.insert(identifier, factory);
    self
  }

  // --- Resolution ---

  /// Cached, typed resolution.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>, ResolveError> {
    (self as &dyn ServiceLocator).get::<T>()
  }

  /// Fresh, typed resolution.
  pub fn build<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>, ResolveError> {
    (self as &dyn ServiceLocator).build::<T>()
  }

  /// Whether a `get` for `identifier` would be served from the cache.
  pub fn is_cached(&self, identifier: &Identifier) -> bool {
    Self::is_bootstrap(identifier)
      || self
        .services
        .get(identifier)
        .map_or(false, |cell| cell.value().get().is_some())
  }

  fn is_bootstrap(identifier: &Identifier) -> bool {
    *identifier == Identifier::of::<ServiceManager>()
      || *identifier == Identifier::of::<dyn ServiceLocator>()
  }

  // The manager is seeded under its own identifier and under the locator
  // capability. These entries always hit and are never replaced.
  fn bootstrap(&self, identifier: &Identifier) -> Option<Instance> {
    if *identifier == Identifier::of::<ServiceManager>() {
      return self.this.upgrade().map(Instance::new);
    }
    if *identifier == Identifier::of::<dyn ServiceLocator>() {
      return self
        .this
        .upgrade()
        .map(|manager| Instance::new(manager as Arc<dyn ServiceLocator>));
    }
    None
  }

  // Cells are only created for bound identifiers, so lookups of unknown
  // services leave the cache untouched.
  fn cell(&self, identifier: &Identifier) -> Option<Arc<OnceCell<Instance>>> {
    if let Some(cell) = self.services.get(identifier) {
      return Some(Arc::clone(cell.value()));
    }
    if !self.factories.contains_key(identifier) && !self.aliases.contains_key(identifier) {
      return None;
    }
    Some(Arc::clone(self.services.entry(*identifier).or_default().value()))
  }

  // Map guards are released before any factory runs, since factories call
  // back into the manager.
  fn resolve(&self, identifier: &Identifier, allow_existing: bool) -> Result<Instance, ResolveError> {
    let factory = self
      .factories
      .get(identifier)
      .map(|entry| Arc::clone(entry.value()));
    if let Some(factory) = factory {
      tracing::debug!(service = %identifier, allow_existing, "invoking factory");
      return factory.create_instance(identifier, self);
    }

    let alias = self.aliases.get(identifier).map(|entry| entry.value().clone());
    if let Some(alias) = alias {
      tracing::debug!(service = %identifier, replacement = %alias.target, allow_existing, "following alias");
      let replacement = if allow_existing {
        self.get_instance(&alias.target)?
      } else {
        self.build_instance(&alias.target)?
      };
      return (alias.upcast)(replacement);
    }

    Err(ResolveError::NotFound(*identifier))
  }
}

impl ServiceLocator for ServiceManager {
  fn get_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError> {
    if let Some(manager) = self.bootstrap(identifier) {
      return Ok(manager);
    }

    let Some(cell) = self.cell(identifier) else {
      let error = ResolveError::NotFound(*identifier);
      tracing::debug!(service = %identifier, %error, "resolution failed");
      return Err(error);
    };
    if let Some(existing) = cell.get() {
      tracing::trace!(service = %identifier, "cache hit");
      return Ok(existing.clone());
    }

    let _guard = ResolutionGuard::enter(self.id, *identifier)?;
    cell
      .get_or_try_init(|| self.resolve(identifier, true))
      .cloned()
      .map_err(|error| {
        tracing::debug!(service = %identifier, %error, "resolution failed");
        error
      })
  }

  fn build_instance(&self, identifier: &Identifier) -> Result<Instance, ResolveError> {
    let _guard = ResolutionGuard::enter(self.id, *identifier)?;
    self
      .resolve(identifier, false)
      .map_err(|error| {
        tracing::debug!(service = %identifier, %error, "build failed");
        error
      })
  }
}

impl fmt::Debug for ServiceManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceManager")
      .field("id", &self.id)
      .field("factories", &self.factories.len())
      .field("aliases", &self.aliases.len())
      .field("services", &self.services.len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Unbound;
  struct Bound;

  #[test]
  fn unknown_lookups_do_not_grow_the_cache() {
    let manager = ServiceManager::new();
    for _ in 0..3 {
      assert_eq!(
        manager.get::<Unbound>().err(),
        Some(ResolveError::NotFound(Identifier::of::<Unbound>()))
      );
    }
    assert_eq!(manager.services.len(), 0);

    manager.register_fn(|_| Ok(Arc::new(Bound)));
    assert!(manager.get::<Bound>().is_ok());
    assert_eq!(manager.services.len(), 1);
  }

  #[test]
  fn binding_after_a_miss_still_resolves() {
    let manager = ServiceManager::new();
    assert!(manager.get::<Unbound>().is_err());

    manager.register_fn(|_| Ok(Arc::new(Unbound)));
    assert!(manager.get::<Unbound>().is_ok());
    assert!(manager.is_cached(&Identifier::of::<Unbound>()));
  }
}
