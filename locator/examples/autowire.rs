use fibre_locator::{global, introspect, resolve, FailurePolicy, ServiceManager};
use std::sync::Arc;

trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[console] {}", message);
  }
}

struct Config {
  greeting: String,
}

struct App {
  logger: Arc<dyn Logger>,
  config: Arc<Config>,
}

impl App {
  fn new(logger: Arc<dyn Logger>, config: Arc<Config>) -> Self {
    Self { logger, config }
  }

  fn run(&self) {
    self.logger.log(&self.config.greeting);
  }
}

introspect!(App => new(logger: dyn Logger, config: Config));

fn main() {
  // --- Autowiring through the global manager ---
  global()
    .register_fn(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>))
    .register_fn(|_| {
      Ok(Arc::new(Config {
        greeting: "Hello from an autowired App".to_string(),
      }))
    })
    .register::<App>();

  let app = resolve!(App);
  app.run();
  assert!(Arc::ptr_eq(&app, &resolve!(App)));

  // --- Failure reporting ---
  // Nothing is registered here, so both parameters fail.
  let aggregate = ServiceManager::new();
  aggregate.register::<App>();
  match aggregate.get::<App>() {
    Ok(_) => unreachable!(),
    Err(error) => println!("Aggregate: {}", error),
  }

  let fail_fast = ServiceManager::builder()
    .failure_policy(FailurePolicy::FailFast)
    .build();
  fail_fast.register::<App>();
  match fail_fast.get::<App>() {
    Ok(_) => unreachable!(),
    Err(error) => println!("Fail fast: {}", error),
  }
}
