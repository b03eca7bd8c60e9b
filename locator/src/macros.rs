//! Public macros for describing constructors and resolving services.

/// Resolves a service from the global manager, panicking if it cannot be
/// resolved.
///
/// The panic message carries the resolution error. For a non-panicking version
/// use `global().get::<T>()` directly.
///
/// # Examples
///
/// ```
/// use fibre_locator::{global, resolve};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// global().register_fn(|_| Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>));
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // resolve!(trait MyTrait)
  (trait $trait_ident:ident) => {
    $crate::resolve_required::<dyn $trait_ident, _>($crate::global())
  };

  // resolve!(MyService)
  ($type:ty) => {
    $crate::resolve_required::<$type, _>($crate::global())
  };
}

/// Resolves a service from an explicit locator, panicking if it cannot be
/// resolved.
///
/// ```
/// use fibre_locator::{resolve_from, ServiceLocator, ServiceManager};
/// use std::sync::Arc;
///
/// struct Port(u16);
/// struct Address(String);
///
/// let manager = ServiceManager::new();
/// manager.register_fn(|_| Ok(Arc::new(Port(8080))));
/// manager.register_fn(|locator: &dyn ServiceLocator| {
///   let port = resolve_from!(locator, Port);
///   Ok(Arc::new(Address(format!("127.0.0.1:{}", port.0))))
/// });
///
/// assert_eq!(resolve_from!(&manager, Address).0, "127.0.0.1:8080");
/// ```
#[macro_export]
macro_rules! resolve_from {
  ($locator:expr, trait $trait_ident:ident) => {
    $crate::resolve_required::<dyn $trait_ident, _>($locator)
  };

  ($locator:expr, $type:ty) => {
    $crate::resolve_required::<$type, _>($locator)
  };
}

/// Implements [`Introspect`](crate::Introspect) from constructor signatures.
///
/// Each parameter is written with the type it is resolved as; the constructor
/// receives it as an `Arc` of that type. Listing more than one constructor
/// makes the type ambiguous for autowiring, exactly as a type with several
/// public constructors would be.
///
/// ```
/// use fibre_locator::{introspect, ServiceManager};
/// use std::sync::Arc;
///
/// struct Config;
/// impl Config { fn new() -> Self { Config } }
///
/// struct App { config: Arc<Config> }
/// impl App { fn new(config: Arc<Config>) -> Self { App { config } } }
///
/// introspect!(Config => new());
/// introspect!(App => new(config: Config));
///
/// let manager = ServiceManager::new();
/// manager.register::<Config>().register::<App>();
/// let app = manager.get::<App>().unwrap();
/// assert!(Arc::ptr_eq(&app.config, &manager.get::<Config>().unwrap()));
/// ```
#[macro_export]
macro_rules! introspect {
  ($type:ty => $($constructor:ident ( $($param:ident : $param_type:ty),* $(,)? )),+ $(,)?) => {
    impl $crate::Introspect for $type {
      fn constructors() -> ::std::vec::Vec<$crate::Constructor> {
        ::std::vec![$(
          $crate::Constructor::new::<$type, _>(
            ::core::stringify!($constructor),
            ::std::vec![$($crate::Parameter::of::<$param_type>(::core::stringify!($param))),*],
            |#[allow(unused_mut, unused_variables)] mut args: $crate::Arguments| {
              ::core::result::Result::Ok(<$type>::$constructor($(args.take::<$param_type>()?),*))
            },
          )
        ),+]
      }
    }
  };
}
