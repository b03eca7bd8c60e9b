use crate::error::GenerationError;
use crate::generator::GeneratedFactory;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Writes generated factories into a directory, touching a file only when its
/// content changed so that dependent builds are not invalidated needlessly.
#[derive(Debug, Clone)]
pub struct FactoryWriter {
  out_dir: PathBuf,
}

impl FactoryWriter {
  pub fn new(out_dir: impl Into<PathBuf>) -> Self {
    Self {
      out_dir: out_dir.into(),
    }
  }

  pub fn out_dir(&self) -> &Path {
    &self.out_dir
  }

  /// Writes one factory. Returns `true` if the file was created or replaced.
  pub fn write(&self, factory: &GeneratedFactory) -> Result<bool, GenerationError> {
    let path = self.out_dir.join(&factory.file_name);
    let written = write_if_changed(&path, &factory.source).map_err(|source| GenerationError::Io {
      path: path.clone(),
      source,
    })?;
    trace!(path = %path.display(), written, "Wrote generated factory.");
    Ok(written)
  }

  /// Writes every factory and returns how many files changed.
  pub fn write_all<'a>(
    &self,
    factories: impl IntoIterator<Item = &'a GeneratedFactory>,
  ) -> Result<usize, GenerationError> {
    let mut changed = 0;
    for factory in factories {
      if self.write(factory)? {
        changed += 1;
      }
    }
    Ok(changed)
  }
}

fn write_if_changed(path: &Path, content: &str) -> io::Result<bool> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }

  if path.exists() && fs::read_to_string(path)? == content {
    return Ok(false);
  }

  fs::write(path, content)?;
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn factory(source: &str) -> GeneratedFactory {
    GeneratedFactory {
      type_name: "Clock".to_string(),
      factory_name: "ClockFactory".to_string(),
      file_name: "clock_factory.rs".to_string(),
      source: source.to_string(),
    }
  }

  #[test]
  fn unchanged_content_is_not_rewritten() {
    let out_dir = std::env::temp_dir().join(format!("fibre_locator_writer_{}", std::process::id()));
    let writer = FactoryWriter::new(&out_dir);

    assert!(writer.write(&factory("// one")).unwrap());
    assert!(!writer.write(&factory("// one")).unwrap());
    assert!(writer.write(&factory("// two")).unwrap());
    assert_eq!(
      fs::read_to_string(out_dir.join("clock_factory.rs")).unwrap(),
      "// two"
    );

    fs::remove_dir_all(&out_dir).unwrap();
  }
}
