//! Type introspection through explicit constructor shims.
//!
//! Rust has no runtime reflection over constructors, so types describe their
//! constructors themselves, either by implementing [`Introspect`] by hand or
//! with the [`introspect!`](crate::introspect) macro. The descriptions are kept
//! in a [`ConstructorTable`], which is what the
//! [`AutowireFactory`](crate::AutowireFactory) consults.

use crate::core::{Identifier, Instance};
use crate::error::InvocationError;

use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Invoker = dyn Fn(Arguments) -> Result<Instance, InvocationError> + Send + Sync;

/// One named constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
  name: &'static str,
  identifier: Identifier,
}

impl Parameter {
  /// A parameter receiving an `Arc<T>`.
  pub fn of<T: ?Sized + Any>(name: &'static str) -> Self {
    Self {
      name,
      identifier: Identifier::of::<T>(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn identifier(&self) -> &Identifier {
    &self.identifier
  }
}

/// A constructor handle: its name, ordered parameters and an invoker.
#[derive(Clone)]
pub struct Constructor {
  name: &'static str,
  parameters: Arc<[Parameter]>,
  invoker: Arc<Invoker>,
}

impl Constructor {
  /// Describes a constructor of `T`.
  ///
  /// `invoke` receives the resolved arguments in parameter order.
  pub fn new<T, F>(name: &'static str, parameters: Vec<Parameter>, invoke: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Arguments) -> Result<T, InvocationError> + Send + Sync + 'static,
  {
    Self {
      name,
      parameters: parameters.into(),
      invoker: Arc::new(move |arguments| invoke(arguments).map(|value| Instance::new(Arc::new(value)))),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  /// The parameter identifiers, in declaration order.
  pub fn parameter_types(&self) -> impl Iterator<Item = Identifier> + '_ {
    self.parameters.iter().map(|parameter| parameter.identifier)
  }

  /// Invokes the constructor with positional arguments.
  pub fn invoke(&self, arguments: Vec<Instance>) -> Result<Instance, InvocationError> {
    if arguments.len() != self.parameters.len() {
      return Err(InvocationError::new(format!(
        "constructor `{}` takes {} argument(s) but {} were supplied",
        self.name,
        self.parameters.len(),
        arguments.len()
      )));
    }
    (self.invoker)(Arguments::new(arguments))
  }
}

impl fmt::Debug for Constructor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Constructor")
      .field("name", &self.name)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

/// Positional arguments handed to a constructor shim.
#[derive(Debug)]
pub struct Arguments {
  values: std::vec::IntoIter<Instance>,
  position: usize,
}

impl Arguments {
  pub(crate) fn new(values: Vec<Instance>) -> Self {
    Self {
      values: values.into_iter(),
      position: 0,
    }
  }

  /// Takes the next argument as an `Arc<T>`.
  pub fn take<T: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<T>, InvocationError> {
    let position = self.position;
    self.position += 1;
    let value = self
      .values
      .next()
      .ok_or_else(|| InvocationError::new(format!("missing argument #{}", position)))?;
    value.downcast::<T>().ok_or_else(|| {
      InvocationError::new(format!(
        "argument #{} is a {}, expected {}",
        position,
        value.type_name(),
        std::any::type_name::<T>()
      ))
    })
  }

  /// Number of arguments not taken yet.
  pub fn remaining(&self) -> usize {
    self.values.len()
  }
}

/// Types that can list their constructors.
pub trait Introspect: Any + Send + Sync {
  fn constructors() -> Vec<Constructor>;
}

/// The type-introspection capability used by autowiring.
pub trait TypeIntrospection: Send + Sync {
  /// The publicly invocable constructors of `identifier`. Unknown identifiers
  /// have none.
  fn public_constructors(&self, identifier: &Identifier) -> Arc<[Constructor]>;
}

/// A concurrent table of described types.
#[derive(Default)]
pub struct ConstructorTable {
  types: DashMap<Identifier, Arc<[Constructor]>>,
}

impl ConstructorTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records the constructors of `T`, replacing any earlier description.
  pub fn describe<T: Introspect>(&self) {
    self.describe_with(Identifier::of::<T>(), T::constructors());
  }

  /// Records `constructors` under an arbitrary identifier.
  pub fn describe_with(&self, identifier: Identifier, constructors: Vec<Constructor>) {
    tracing::trace!(service = %identifier, constructors = constructors.len(), "describing type");
    self.types.insert(identifier, constructors.into());
  }

  pub fn is_described(&self, identifier: &Identifier) -> bool {
    self.types.contains_key(identifier)
  }
}

impl TypeIntrospection for ConstructorTable {
  fn public_constructors(&self, identifier: &Identifier) -> Arc<[Constructor]> {
    self
      .types
      .get(identifier)
      .map(|entry| Arc::clone(entry.value()))
      .unwrap_or_else(|| Arc::from(Vec::new()))
  }
}

impl fmt::Debug for ConstructorTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConstructorTable")
      .field("types", &self.types.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Engine;
  struct Car {
    engine: Arc<Engine>,
  }

  fn car_constructor() -> Constructor {
    Constructor::new::<Car, _>("new", vec![Parameter::of::<Engine>("engine")], |mut args| {
      Ok(Car {
        engine: args.take::<Engine>()?,
      })
    })
  }

  #[test]
  fn invoke_passes_positional_arguments() {
    let engine = Arc::new(Engine);
    let car = car_constructor()
      .invoke(vec![Instance::new(engine.clone())])
      .unwrap()
      .downcast::<Car>()
      .unwrap();
    assert!(Arc::ptr_eq(&car.engine, &engine));
  }

  #[test]
  fn invoke_checks_arity() {
    let error = car_constructor().invoke(Vec::new()).unwrap_err();
    assert!(error.message().contains("takes 1 argument(s) but 0 were supplied"));
  }

  #[test]
  fn take_reports_wrongly_typed_arguments() {
    let error = car_constructor()
      .invoke(vec![Instance::new(Arc::new(String::from("diesel")))])
      .unwrap_err();
    assert!(error.message().contains("argument #0"));
  }

  #[test]
  fn undescribed_types_have_no_constructors() {
    let table = ConstructorTable::new();
    assert!(table.public_constructors(&Identifier::of::<Car>()).is_empty());

    table.describe_with(Identifier::of::<Car>(), vec![car_constructor()]);
    let constructors = table.public_constructors(&Identifier::of::<Car>());
    assert_eq!(constructors.len(), 1);
    assert_eq!(
      constructors[0].parameter_types().collect::<Vec<_>>(),
      vec![Identifier::of::<Engine>()]
    );
  }
}
