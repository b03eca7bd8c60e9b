//! Services wired with factories generated at build time by
//! `fibre_locator_codegen`.

pub mod services;

use fibre_locator::ServiceManager;
use services::{
  Mailer, MailerFactory, Outbox, OutboxFactory, SmtpTransport, Templates, TemplatesFactory,
  Transport,
};
use std::sync::Arc;

/// Registers the mail services with their generated factories. Outbox settings
/// are left to the caller.
pub fn register_services(manager: &ServiceManager) -> &ServiceManager {
  manager
    .register_fn(|_| Ok(Arc::new(SmtpTransport::new("smtp.example.com")) as Arc<dyn Transport>))
    .register_factory::<Templates, _>(TemplatesFactory)
    .register_factory::<Mailer, _>(MailerFactory)
    .register_factory::<Outbox, _>(OutboxFactory)
}
