//! Automatic construction through type introspection.

use crate::core::{Identifier, Instance};
use crate::error::ResolveError;
use crate::factory::DynFactory;
use crate::introspect::{Constructor, TypeIntrospection};
use crate::locator::ServiceLocator;

use std::fmt;
use std::sync::Arc;

/// How a factory reports constructor parameters that fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
  /// Attempt every parameter and report all failures in one
  /// [`ResolveError::DependencyResolution`].
  #[default]
  Aggregate,
  /// Stop at the first failing parameter and report it as a
  /// [`ResolveError::UnresolvedParameter`]. This is what generated factories do.
  FailFast,
}

/// Builds any type with exactly one described constructor, resolving each
/// constructor parameter through the locator.
pub struct AutowireFactory {
  introspection: Arc<dyn TypeIntrospection>,
  policy: FailurePolicy,
}

impl AutowireFactory {
  pub fn new(introspection: Arc<dyn TypeIntrospection>) -> Self {
    Self {
      introspection,
      policy: FailurePolicy::default(),
    }
  }

  pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> FailurePolicy {
    self.policy
  }

  fn resolve_arguments(
    &self,
    identifier: &Identifier,
    constructor: &Constructor,
    locator: &dyn ServiceLocator,
  ) -> Result<Vec<Instance>, ResolveError> {
    let mut arguments = Vec::with_capacity(constructor.parameters().len());
    let mut failures = Vec::new();

    for parameter in constructor.parameters() {
      match locator.get_instance(parameter.identifier()) {
        Ok(argument) => arguments.push(argument),
        Err(error) => match self.policy {
          FailurePolicy::FailFast => {
            return Err(ResolveError::UnresolvedParameter {
              parameter: parameter.name(),
              owner: identifier.type_name(),
              source: Box::new(error),
            });
          }
          FailurePolicy::Aggregate => failures.push(error),
        },
      }
    }

    if !failures.is_empty() {
      return Err(ResolveError::DependencyResolution {
        identifier: *identifier,
        failures,
      });
    }
    Ok(arguments)
  }
}

impl DynFactory for AutowireFactory {
  fn create_instance(
    &self,
    identifier: &Identifier,
    locator: &dyn ServiceLocator,
  ) -> Result<Instance, ResolveError> {
    let constructors = self.introspection.public_constructors(identifier);
    let [constructor] = &constructors[..] else {
      return Err(ResolveError::NoMatchingConstructor {
        identifier: *identifier,
        candidates: constructors.len(),
      });
    };

    tracing::debug!(
      service = %identifier,
      constructor = constructor.name(),
      parameters = constructor.parameters().len(),
      "autowiring service"
    );

    let arguments = self.resolve_arguments(identifier, constructor, locator)?;
    constructor
      .invoke(arguments)
      .map_err(|error| ResolveError::Invocation {
        identifier: *identifier,
        message: error.to_string(),
      })
  }
}

impl fmt::Debug for AutowireFactory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AutowireFactory")
      .field("policy", &self.policy)
      .finish_non_exhaustive()
  }
}
