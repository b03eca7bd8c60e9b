//! # Fibre Locator Codegen
//!
//! Ahead-of-time factory generation for `fibre_locator`.
//!
//! Mark a type with an empty `impl FactoryGenerated for T {}` next to its
//! declaration. The generator scans the source, finds the type's single public
//! constructor (an associated function returning `Self` or `Result<Self, E>`
//! whose parameters are all `Arc<_>`), and emits `TFactory`, a unit struct
//! implementing `fibre_locator::Factory<T>`. Generated factories resolve each
//! parameter in order and stop at the first one that fails.
//!
//! Types that cannot get a factory (trait objects, generic types, zero or
//! several public constructors, non-`Arc` parameters) are reported and skipped;
//! the rest of the batch is still generated.
//!
//! ## Build script usage
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!   let out_dir = std::env::var("OUT_DIR").unwrap();
//!   fibre_locator_codegen::generate_for_build(["src/services.rs"], out_dir).unwrap();
//! }
//! ```
//!
//! and in `src/services.rs`, after the marked type:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/mailer_factory.rs"));
//! ```

mod error;
mod generator;
mod scan;
mod writer;

pub use error::GenerationError;
pub use generator::{FactoryGenerator, GeneratedFactory, GenerationReport, HEADER};
pub use writer::FactoryWriter;

use std::path::Path;

/// Generates factories for every marked type in `sources` and writes them to
/// `out_dir`.
///
/// Prints `cargo:rerun-if-changed` for every source and a `cargo:warning` for
/// every skipped type. Skipped types do not fail the build; only writing the
/// artifacts can.
pub fn generate_for_build<I, P>(
  sources: I,
  out_dir: impl AsRef<Path>,
) -> Result<GenerationReport, GenerationError>
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  let mut generator = FactoryGenerator::new();
  for source in sources {
    let source = source.as_ref();
    println!("cargo:rerun-if-changed={}", source.display());
    generator = generator.file(source);
  }

  let report = generator.generate();
  report.emit_cargo_warnings();
  FactoryWriter::new(out_dir.as_ref()).write_all(&report.generated)?;
  Ok(report)
}
