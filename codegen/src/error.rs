use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a marked type could not get a generated factory, or a source could
/// not be scanned at all.
///
/// Errors are collected per type; one failing type never stops the rest of a
/// batch from being generated.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("{type_name} is abstract and therefore cannot be instantiated.")]
  Abstract { type_name: String },

  #[error("{type_name} needs exactly one public constructor, found {found}.")]
  ConstructorCount { type_name: String, found: usize },

  #[error("{type_name} cannot have a generated factory: {reason}.")]
  UnsupportedType {
    type_name: String,
    reason: &'static str,
  },

  #[error("Parameter \"{parameter}\" of {type_name}::{constructor} must be an Arc<_> to be resolved.")]
  UnsupportedParameter {
    type_name: String,
    constructor: String,
    parameter: String,
  },

  #[error("{type_name} would overwrite {file_name}, already generated for another marked type of the same name.")]
  DuplicateArtifact {
    type_name: String,
    file_name: String,
  },

  #[error("Failed to parse {source_name}: {source}")]
  Parse {
    source_name: String,
    #[source]
    source: syn::Error,
  },

  #[error("I/O error on {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl GenerationError {
  /// The marked type the error is about, if it concerns a single type.
  pub fn type_name(&self) -> Option<&str> {
    match self {
      GenerationError::Abstract { type_name }
      | GenerationError::ConstructorCount { type_name, .. }
      | GenerationError::UnsupportedType { type_name, .. }
      | GenerationError::UnsupportedParameter { type_name, .. }
      | GenerationError::DuplicateArtifact { type_name, .. } => Some(type_name),
      GenerationError::Parse { .. } | GenerationError::Io { .. } => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_type() {
    let error = GenerationError::ConstructorCount {
      type_name: "Mailer".to_string(),
      found: 2,
    };
    assert_eq!(
      error.to_string(),
      "Mailer needs exactly one public constructor, found 2."
    );
    assert_eq!(error.type_name(), Some("Mailer"));

    let error = GenerationError::Abstract {
      type_name: "dyn Storage".to_string(),
    };
    assert_eq!(
      error.to_string(),
      "dyn Storage is abstract and therefore cannot be instantiated."
    );
  }

  #[test]
  fn io_errors_have_no_type() {
    let error = GenerationError::Io {
      path: PathBuf::from("src/missing.rs"),
      source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    };
    assert_eq!(error.type_name(), None);
    assert_eq!(error.to_string(), "I/O error on src/missing.rs: gone");
  }
}
