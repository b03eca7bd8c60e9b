use fibre_locator::{resolve_from, ServiceLocator, ServiceManager};
use std::sync::Arc;

trait Storage: Send + Sync {
  fn describe(&self) -> String;
}

struct DiskStorage {
  root: String,
}

impl Storage for DiskStorage {
  fn describe(&self) -> String {
    format!("disk at {}", self.root)
  }
}

struct Uploader {
  storage: Arc<dyn Storage>,
}

fn main() {
  let manager = ServiceManager::new();

  // `dyn Storage` resolves by resolving `DiskStorage` and upcasting it.
  manager
    .register_fn(|_| {
      println!("Creating DiskStorage...");
      Ok(Arc::new(DiskStorage {
        root: "/var/uploads".to_string(),
      }))
    })
    .alias::<dyn Storage, DiskStorage, _>(|disk| disk as Arc<dyn Storage>)
    .register_fn(|locator: &dyn ServiceLocator| {
      Ok(Arc::new(Uploader {
        storage: locator.get::<dyn Storage>()?,
      }))
    });

  let uploader = resolve_from!(&manager, Uploader);
  println!("Uploader writes to {}", uploader.storage.describe());

  // The alias shares the instance cached for the concrete type.
  let disk = resolve_from!(&manager, DiskStorage);
  assert_eq!(
    Arc::as_ptr(&uploader.storage) as *const u8,
    Arc::as_ptr(&disk) as *const u8
  );

  // `build` bypasses the cache and creates a fresh one.
  let fresh = manager.build::<dyn Storage>().unwrap();
  println!("Fresh instance: {}", fresh.describe());
}
