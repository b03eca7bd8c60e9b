use crate::autowire::{AutowireFactory, FailurePolicy};
use crate::factory::DynFactory;
use crate::introspect::{ConstructorTable, Introspect};
use crate::manager::ServiceManager;

use std::fmt;
use std::sync::Arc;

/// A builder for configuring a [`ServiceManager`].
///
/// ```
/// use fibre_locator::{FailurePolicy, ServiceManager};
///
/// let manager = ServiceManager::builder()
///   .failure_policy(FailurePolicy::FailFast)
///   .build();
/// # let _ = manager;
/// ```
pub struct ServiceManagerBuilder {
  failure_policy: FailurePolicy,
  constructors: Arc<ConstructorTable>,
  default_factory: Option<Arc<dyn DynFactory>>,
}

impl fmt::Debug for ServiceManagerBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceManagerBuilder")
      .field("failure_policy", &self.failure_policy)
      .field("constructors", &self.constructors)
      .field("has_default_factory", &self.default_factory.is_some())
      .finish()
  }
}

impl Default for ServiceManagerBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl ServiceManagerBuilder {
  pub fn new() -> Self {
    Self {
      failure_policy: FailurePolicy::default(),
      constructors: Arc::new(ConstructorTable::new()),
      default_factory: None,
    }
  }

  /// How the default autowire factory reports unresolvable parameters.
  ///
  /// Ignored when a custom default factory is set.
  pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
    self.failure_policy = policy;
    self
  }

  /// Describes `T` up front, so it can later be bound with
  /// [`ServiceManager::register_identifier`].
  pub fn describe<T: Introspect>(self) -> Self {
    self.constructors.describe::<T>();
    self
  }

  /// Shares an existing introspection table instead of starting empty.
  pub fn constructors(mut self, table: Arc<ConstructorTable>) -> Self {
    self.constructors = table;
    self
  }

  /// Replaces the autowire factory used by [`ServiceManager::register`].
  pub fn default_factory(mut self, factory: impl DynFactory + 'static) -> Self {
    self.default_factory = Some(Arc::new(factory));
    self
  }

  pub fn build(self) -> Arc<ServiceManager> {
    let default_factory: Arc<dyn DynFactory> = match self.default_factory {
      Some(factory) => factory,
      None => Arc::new(
        AutowireFactory::new(self.constructors.clone()).with_policy(self.failure_policy),
      ),
    };
    ServiceManager::from_parts(self.constructors, default_factory)
  }
}
