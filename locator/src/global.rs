//! The process-wide service manager.

use crate::manager::ServiceManager;
use once_cell::sync::Lazy;
use std::sync::Arc;

// Created on first access and never torn down.
static GLOBAL_MANAGER: Lazy<Arc<ServiceManager>> = Lazy::new(ServiceManager::new);

/// Provides a reference to the global manager.
///
/// # Examples
///
/// ```
/// use fibre_locator::global;
/// use std::sync::Arc;
///
/// struct Greeting(&'static str);
///
/// global().register_fn(|_| Ok(Arc::new(Greeting("Hello from global!"))));
/// assert_eq!(global().get::<Greeting>().unwrap().0, "Hello from global!");
/// ```
pub fn global() -> &'static ServiceManager {
  &GLOBAL_MANAGER
}
