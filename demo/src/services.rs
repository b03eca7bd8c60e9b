//! Mail delivery services. Every type marked `FactoryGenerated` gets a
//! `<Type>Factory` generated by the build script and included right after it.

use fibre_locator::{introspect, FactoryGenerated};
use std::sync::Arc;
use thiserror::Error;

pub trait Transport: Send + Sync {
  fn deliver(&self, to: &str, body: &str) -> String;
}

#[derive(Debug)]
pub struct SmtpTransport {
  host: String,
}

impl SmtpTransport {
  pub fn new(host: impl Into<String>) -> Self {
    Self { host: host.into() }
  }
}

impl Transport for SmtpTransport {
  fn deliver(&self, to: &str, body: &str) -> String {
    format!("smtp://{} -> {}: {}", self.host, to, body)
  }
}

#[derive(Debug)]
pub struct Templates {
  greeting: &'static str,
}

impl Templates {
  pub fn new() -> Self {
    Self { greeting: "Welcome" }
  }

  pub fn welcome(&self, name: &str) -> String {
    format!("{}, {}!", self.greeting, name)
  }
}

impl Default for Templates {
  fn default() -> Self {
    Self::new()
  }
}

impl FactoryGenerated for Templates {}

include!(concat!(env!("OUT_DIR"), "/templates_factory.rs"));

pub struct Mailer {
  transport: Arc<dyn Transport>,
  templates: Arc<Templates>,
}

impl Mailer {
  pub fn new(transport: Arc<dyn Transport>, templates: Arc<Templates>) -> Self {
    Self {
      transport,
      templates,
    }
  }

  pub fn send_welcome(&self, to: &str) -> String {
    self.transport.deliver(to, &self.templates.welcome(to))
  }
}

impl FactoryGenerated for Mailer {}

include!(concat!(env!("OUT_DIR"), "/mailer_factory.rs"));

// The same constructor, described for autowiring.
introspect!(Mailer => new(transport: dyn Transport, templates: Templates));

#[derive(Debug)]
pub struct OutboxSettings {
  pub capacity: usize,
}

#[derive(Debug, Error)]
pub enum OutboxError {
  #[error("outbox capacity must be positive")]
  ZeroCapacity,
}

pub struct Outbox {
  mailer: Arc<Mailer>,
  capacity: usize,
}

impl Outbox {
  pub fn open(mailer: Arc<Mailer>, settings: Arc<OutboxSettings>) -> Result<Self, OutboxError> {
    if settings.capacity == 0 {
      return Err(OutboxError::ZeroCapacity);
    }
    Ok(Self {
      mailer,
      capacity: settings.capacity,
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn mailer(&self) -> &Arc<Mailer> {
    &self.mailer
  }
}

impl FactoryGenerated for Outbox {}

include!(concat!(env!("OUT_DIR"), "/outbox_factory.rs"));

/// Two public constructors: the generator skips this type with a warning, so
/// there is no `NewsletterFactory`.
pub struct Newsletter {
  pub subject: String,
}

impl Newsletter {
  pub fn new() -> Self {
    Self::with_subject("News")
  }

  pub fn with_subject(subject: &str) -> Newsletter {
    Self {
      subject: subject.to_string(),
    }
  }
}

impl Default for Newsletter {
  fn default() -> Self {
    Self::new()
  }
}

impl FactoryGenerated for Newsletter {}
