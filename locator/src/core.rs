//! Core data structures shared by the locator, the manager and the factories.

use crate::error::ResolveError;

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

thread_local! {
  // The services currently being resolved on this thread, in resolution order.
  // Entries are tagged with the owning manager so that two managers never
  // mistake each other's work for a cycle.
  static RESOLVING_STACK: RefCell<Vec<(usize, Identifier)>> = const { RefCell::new(Vec::new()) };
}

/// A type token identifying a kind of service.
///
/// Identifiers compare by `TypeId` only. The type name is carried along for
/// diagnostics and is what `Display` prints.
#[derive(Clone, Copy)]
pub struct Identifier {
  type_id: TypeId,
  type_name: &'static str,
}

impl Identifier {
  /// The identifier of `T`, which may be a concrete type or a `dyn Trait`.
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }
}

impl PartialEq for Identifier {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for Identifier {}

impl Hash for Identifier {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Identifier({})", self.type_name)
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name)
  }
}

/// A type-erased, shared service value.
///
/// An `Instance` always wraps an `Arc<T>`; cloning it clones that `Arc`, so
/// every clone refers to the same service allocation.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Instance {
  pub fn new<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value: Arc::new(value),
      type_name: type_name::<T>(),
    }
  }

  /// Recovers the shared service if it was created as an `Arc<T>`.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  /// Like [`Instance::downcast`], reporting a mismatch against `identifier`.
  pub fn downcast_for<T: ?Sized + Any + Send + Sync>(
    &self,
    identifier: &Identifier,
  ) -> Result<Arc<T>, ResolveError> {
    self.downcast::<T>().ok_or(ResolveError::TypeMismatch {
      identifier: *identifier,
      expected: type_name::<T>(),
      found: self.type_name,
    })
  }

  /// Name of the type the instance was created from.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("type_name", &self.type_name)
      .finish_non_exhaustive()
  }
}

/// An RAII guard that detects re-entrant resolution of the same service.
///
/// Entering pushes the identifier on the thread-local resolution stack and
/// fails with [`ResolveError::Cycle`] if the same manager is already resolving
/// it on this thread. Dropping the guard pops the entry.
pub(crate) struct ResolutionGuard {
  entry: (usize, Identifier),
}

impl ResolutionGuard {
  pub(crate) fn enter(owner: usize, identifier: Identifier) -> Result<Self, ResolveError> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|entry| *entry == (owner, identifier)) {
        let mut chain: Vec<Identifier> = stack[start..]
          .iter()
          .filter(|(entry_owner, _)| *entry_owner == owner)
          .map(|(_, id)| *id)
          .collect();
        chain.push(identifier);
        return Err(ResolveError::Cycle { chain });
      }
      stack.push((owner, identifier));
      Ok(Self {
        entry: (owner, identifier),
      })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(index) = stack.iter().rposition(|entry| *entry == self.entry) {
        stack.remove(index);
      }
    });
  }
}
