use fibre_locator::{Factory, Identifier, ResolveError, ServiceManager};
use fibre_locator_demo::register_services;
use fibre_locator_demo::services::{
  Mailer, MailerFactory, Newsletter, Outbox, OutboxSettings, Templates, TemplatesFactory,
  Transport,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn not_found<T: ?Sized + 'static>() -> String {
  format!("No factory found for {}.", std::any::type_name::<T>())
}

#[test]
fn test_generated_factories_build_the_object_graph() {
  let manager = ServiceManager::new();
  register_services(&manager).register_fn(|_| Ok(Arc::new(OutboxSettings { capacity: 16 })));

  let outbox = manager.get::<Outbox>().unwrap();
  assert_eq!(outbox.capacity(), 16);
  assert_eq!(
    outbox.mailer().send_welcome("ada"),
    "smtp://smtp.example.com -> ada: Welcome, ada!"
  );
  assert!(Arc::ptr_eq(outbox.mailer(), &manager.get::<Mailer>().unwrap()));
}

#[test]
fn test_generated_factory_reports_only_the_first_failure() {
  // Neither dependency of Mailer is registered.
  let manager = ServiceManager::new();
  manager.register_factory::<Mailer, _>(MailerFactory);

  let error = manager.get::<Mailer>().err().unwrap();
  assert_eq!(
    error,
    ResolveError::UnresolvedParameter {
      parameter: "transport",
      owner: std::any::type_name::<Mailer>(),
      source: Box::new(ResolveError::NotFound(Identifier::of::<dyn Transport>())),
    }
  );
  assert_eq!(
    error.to_string(),
    format!(
      "Could not resolve parameter \"transport\" for {} due to: {}",
      std::any::type_name::<Mailer>(),
      not_found::<dyn Transport>()
    )
  );
  assert!(!error.to_string().contains("Templates"));
}

#[test]
fn test_autowiring_the_same_type_aggregates_every_failure() {
  let manager = ServiceManager::new();
  manager.register::<Mailer>();

  let error = manager.get::<Mailer>().err().unwrap();
  assert_eq!(
    error.to_string(),
    format!("{} {}", not_found::<dyn Transport>(), not_found::<Templates>())
  );
}

#[test]
fn test_generated_factory_can_be_called_directly() {
  let manager = ServiceManager::new();
  let templates = TemplatesFactory
    .create(&Identifier::of::<Templates>(), &*manager)
    .unwrap();
  assert_eq!(templates.welcome("grace"), "Welcome, grace!");
}

#[test]
fn test_fallible_constructor_becomes_an_invocation_error() {
  let manager = ServiceManager::new();
  register_services(&manager).register_fn(|_| Ok(Arc::new(OutboxSettings { capacity: 0 })));

  assert_eq!(
    manager.get::<Outbox>().err(),
    Some(ResolveError::Invocation {
      identifier: Identifier::of::<Outbox>(),
      message: "outbox capacity must be positive".to_string(),
    })
  );
  // The failure is not cached; the dependencies that did resolve are.
  assert!(!manager.is_cached(&Identifier::of::<Outbox>()));
  assert!(manager.is_cached(&Identifier::of::<Mailer>()));
}

#[test]
fn test_trait_impls_do_not_count_as_constructors() {
  // `Default` sits next to the single public constructor; the generated
  // factory and the default agree.
  let manager = ServiceManager::new();
  manager.register_factory::<Templates, _>(TemplatesFactory);
  assert_eq!(
    manager.get::<Templates>().unwrap().welcome("lin"),
    Templates::default().welcome("lin")
  );
  assert_eq!(Newsletter::default().subject, "News");
}
