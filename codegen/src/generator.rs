//! Turns scanned targets into factory source files.

use crate::error::GenerationError;
use crate::scan::{scan, Dependency, Target};

use std::fs;
use std::path::PathBuf;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use tracing::{debug, warn};

/// First line of every generated file.
pub const HEADER: &str = "// @generated by fibre_locator_codegen. Do not edit.";

/// The source of one generated factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFactory {
  /// The marked type, e.g. `Mailer`.
  pub type_name: String,
  /// The emitted factory, e.g. `MailerFactory`.
  pub factory_name: String,
  /// Deterministic file name, e.g. `mailer_factory.rs`, or
  /// `mail_mailer_factory.rs` for a type declared in an inline `mod mail`.
  /// Include it in the module that declares the marked type.
  pub file_name: String,
  pub source: String,
}

impl GeneratedFactory {
  fn from_target(target: &Target) -> Self {
    let type_name = target.name.to_string();
    let stem: Vec<_> = target
      .module
      .iter()
      .map(|module| snake_case(&module.unraw().to_string()))
      .chain(Some(snake_case(&type_name)))
      .collect();
    Self {
      factory_name: format!("{}Factory", type_name),
      file_name: format!("{}_factory.rs", stem.join("_")),
      source: format!("{}\n{}\n", HEADER, emit(target)),
      type_name,
    }
  }
}

/// The outcome of a generation batch: every factory that could be generated
/// and every type or source that was skipped.
#[derive(Debug, Default)]
pub struct GenerationReport {
  pub generated: Vec<GeneratedFactory>,
  pub errors: Vec<GenerationError>,
}

impl GenerationReport {
  /// `true` if nothing was skipped.
  pub fn is_complete(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn factory(&self, type_name: &str) -> Option<&GeneratedFactory> {
    self
      .generated
      .iter()
      .find(|factory| factory.type_name == type_name)
  }

  /// Surfaces every skipped type as a `cargo:warning` line. Only meaningful
  /// from a build script.
  pub fn emit_cargo_warnings(&self) {
    for error in &self.errors {
      println!("cargo:warning={}", error);
    }
  }
}

#[derive(Debug, Clone)]
enum Input {
  Text { name: String, text: String },
  File(PathBuf),
}

/// Scans Rust sources for `impl FactoryGenerated for T {}` markers and emits a
/// fail-fast `TFactory` for each marked type.
///
/// ```
/// use fibre_locator_codegen::FactoryGenerator;
///
/// let report = FactoryGenerator::new()
///   .source(
///     "services.rs",
///     r#"
///       pub struct Mailer;
///       impl Mailer {
///         pub fn new(transport: Arc<dyn Transport>) -> Self { Mailer }
///       }
///       impl FactoryGenerated for Mailer {}
///     "#,
///   )
///   .generate();
///
/// assert!(report.is_complete());
/// let factory = report.factory("Mailer").unwrap();
/// assert_eq!(factory.factory_name, "MailerFactory");
/// assert_eq!(factory.file_name, "mailer_factory.rs");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FactoryGenerator {
  inputs: Vec<Input>,
}

impl FactoryGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds an in-memory source. `name` is only used in diagnostics.
  pub fn source(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
    self.inputs.push(Input::Text {
      name: name.into(),
      text: text.into(),
    });
    self
  }

  /// Adds a source file, read when [`generate`](Self::generate) runs.
  pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
    self.inputs.push(Input::File(path.into()));
    self
  }

  /// Processes every source in the order added. A source that cannot be read
  /// or parsed, and a marked type that cannot be generated, are recorded in
  /// the report; processing always continues with the rest.
  pub fn generate(&self) -> GenerationReport {
    let mut report = GenerationReport::default();
    for input in &self.inputs {
      match load(input) {
        Ok((name, text)) => generate_source(&name, &text, &mut report),
        Err(error) => {
          warn!(error = %error, "Skipping unreadable source.");
          report.errors.push(error);
        }
      }
    }
    report
  }
}

fn load(input: &Input) -> Result<(String, String), GenerationError> {
  match input {
    Input::Text { name, text } => Ok((name.clone(), text.clone())),
    Input::File(path) => fs::read_to_string(path)
      .map(|text| (path.display().to_string(), text))
      .map_err(|source| GenerationError::Io {
        path: path.clone(),
        source,
      }),
  }
}

fn generate_source(name: &str, text: &str, report: &mut GenerationReport) {
  let file = match syn::parse_file(text) {
    Ok(file) => file,
    Err(source) => {
      let error = GenerationError::Parse {
        source_name: name.to_string(),
        source,
      };
      warn!(error = %error, "Skipping unparsable source.");
      report.errors.push(error);
      return;
    }
  };

  for outcome in scan(&file) {
    match outcome {
      Ok(target) => {
        let factory = GeneratedFactory::from_target(&target);
        if report.generated.iter().any(|other| other.file_name == factory.file_name) {
          let error = GenerationError::DuplicateArtifact {
            type_name: factory.type_name,
            file_name: factory.file_name,
          };
          warn!(source = name, error = %error, "Skipping marked type.");
          report.errors.push(error);
          continue;
        }
        debug!(
          source = name,
          type_name = %factory.type_name,
          file_name = %factory.file_name,
          "Generated factory."
        );
        report.generated.push(factory);
      }
      Err(error) => {
        warn!(source = name, error = %error, "Skipping marked type.");
        report.errors.push(error);
      }
    }
  }
}

/// Emits the factory for `target`: every parameter is resolved in order and
/// the first failure is returned as `UnresolvedParameter`.
fn emit(target: &Target) -> TokenStream {
  let Target {
    name,
    visibility,
    constructor,
    parameters,
    fallible,
    ..
  } = target;

  let factory = format_ident!("{}Factory", name);
  let doc = format!(" Generated factory for [`{}`].", name);
  let bindings: Vec<_> = (0..parameters.len())
    .map(|index| format_ident!("dependency_{}", index))
    .collect();

  let resolutions = parameters.iter().zip(&bindings).map(|(parameter, binding)| {
    let Dependency {
      name: parameter_name,
      ty,
    } = parameter;
    quote! {
      let #binding = match locator.get::<#ty>() {
        ::core::result::Result::Ok(value) => value,
        ::core::result::Result::Err(error) => {
          return ::core::result::Result::Err(::fibre_locator::ResolveError::UnresolvedParameter {
            parameter: #parameter_name,
            owner: ::core::any::type_name::<#name>(),
            source: ::std::boxed::Box::new(error),
          });
        }
      };
    }
  });

  let locator_arg = if parameters.is_empty() {
    format_ident!("_locator")
  } else {
    format_ident!("locator")
  };
  let (identifier_arg, construct) = if *fallible {
    (
      format_ident!("identifier"),
      quote! {
        #name::#constructor(#(#bindings),*).map_err(|error| {
          ::fibre_locator::ResolveError::Invocation {
            identifier: *identifier,
            message: ::std::string::ToString::to_string(&error),
          }
        })?
      },
    )
  } else {
    (
      format_ident!("_identifier"),
      quote! { #name::#constructor(#(#bindings),*) },
    )
  };

  quote! {
    #[doc = #doc]
    #[derive(Debug, Default, Clone, Copy)]
    #visibility struct #factory;

    impl ::fibre_locator::Factory<#name> for #factory {
      fn create(
        &self,
        #identifier_arg: &::fibre_locator::Identifier,
        #locator_arg: &dyn ::fibre_locator::ServiceLocator,
      ) -> ::core::result::Result<::std::sync::Arc<#name>, ::fibre_locator::ResolveError> {
        #(#resolutions)*
        ::core::result::Result::Ok(::std::sync::Arc::new(#construct))
      }
    }
  }
}

/// `HttpServer` and `HTTPServer` both become `http_server`.
pub(crate) fn snake_case(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  let mut snake = String::with_capacity(name.len() + 4);
  for (index, &ch) in chars.iter().enumerate() {
    if !ch.is_uppercase() {
      snake.push(ch);
      continue;
    }
    let boundary = match index.checked_sub(1).map(|previous| chars[previous]) {
      Some(previous) if previous.is_lowercase() || previous.is_ascii_digit() => true,
      Some(previous) if previous.is_uppercase() => chars
        .get(index + 1)
        .map_or(false, |next| next.is_lowercase()),
      _ => false,
    };
    if boundary {
      snake.push('_');
    }
    snake.extend(ch.to_lowercase());
  }
  snake
}
