use crate::core::Identifier;

use thiserror::Error;

/// Errors produced while resolving a service.
///
/// Every resolution path returns these as values; nothing panics across the
/// [`ServiceLocator`](crate::ServiceLocator) boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// Neither a factory nor an alias is bound to the identifier.
  #[error("No factory found for {0}.")]
  NotFound(Identifier),

  /// The autowired type does not have exactly one constructor.
  #[error("No matching constructor was found for {identifier}: expected exactly one constructor, found {candidates}.")]
  NoMatchingConstructor {
    identifier: Identifier,
    candidates: usize,
  },

  /// One or more constructor parameters could not be resolved. The message is
  /// every failure message, in parameter order, joined by a space.
  #[error("{}", join_messages(.failures))]
  DependencyResolution {
    identifier: Identifier,
    failures: Vec<ResolveError>,
  },

  /// The first constructor parameter that could not be resolved.
  #[error("Could not resolve parameter \"{parameter}\" for {owner} due to: {source}")]
  UnresolvedParameter {
    parameter: &'static str,
    owner: &'static str,
    source: Box<ResolveError>,
  },

  /// The constructor itself failed.
  #[error("Could not construct {identifier}: {message}")]
  Invocation {
    identifier: Identifier,
    message: String,
  },

  /// A factory or alias produced a value of the wrong type.
  #[error("Resolved {identifier} as {found}, expected {expected}.")]
  TypeMismatch {
    identifier: Identifier,
    expected: &'static str,
    found: &'static str,
  },

  /// The identifier is already being resolved further up on this thread.
  #[error("Circular resolution detected: {}", join_chain(.chain))]
  Cycle { chain: Vec<Identifier> },
}

impl ResolveError {
  /// The identifier the error is about, when it names a single one.
  pub fn identifier(&self) -> Option<&Identifier> {
    match self {
      ResolveError::NotFound(identifier)
      | ResolveError::NoMatchingConstructor { identifier, .. }
      | ResolveError::DependencyResolution { identifier, .. }
      | ResolveError::Invocation { identifier, .. }
      | ResolveError::TypeMismatch { identifier, .. } => Some(identifier),
      ResolveError::UnresolvedParameter { .. } | ResolveError::Cycle { .. } => None,
    }
  }
}

fn join_messages(failures: &[ResolveError]) -> String {
  failures
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(" ")
}

fn join_chain(chain: &[Identifier]) -> String {
  chain
    .iter()
    .map(Identifier::type_name)
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// Error raised by a constructor shim while building an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvocationError {
  message: String,
}

impl InvocationError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl From<String> for InvocationError {
  fn from(message: String) -> Self {
    Self::new(message)
  }
}

impl From<&str> for InvocationError {
  fn from(message: &str) -> Self {
    Self::new(message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  struct Logger;
  struct Clock;

  #[test]
  fn aggregated_message_joins_every_failure() {
    let error = ResolveError::DependencyResolution {
      identifier: Identifier::of::<String>(),
      failures: vec![
        ResolveError::NotFound(Identifier::of::<Logger>()),
        ResolveError::NotFound(Identifier::of::<Clock>()),
      ],
    };
    assert_eq!(
      error.to_string(),
      format!(
        "No factory found for {}. No factory found for {}.",
        std::any::type_name::<Logger>(),
        std::any::type_name::<Clock>()
      )
    );
  }

  #[test]
  fn unresolved_parameter_names_parameter_and_owner() {
    let error = ResolveError::UnresolvedParameter {
      parameter: "clock",
      owner: "app::Scheduler",
      source: Box::new(ResolveError::NotFound(Identifier::of::<Clock>())),
    };
    assert_eq!(
      error.to_string(),
      format!(
        "Could not resolve parameter \"clock\" for app::Scheduler due to: No factory found for {}.",
        std::any::type_name::<Clock>()
      )
    );
    assert!(error.identifier().is_none());
  }
}
