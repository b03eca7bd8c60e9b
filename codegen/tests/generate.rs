use fibre_locator_codegen::{generate_for_build, FactoryGenerator, GenerationError, HEADER};
use pretty_assertions::assert_eq;
use std::fs;

const SERVICES: &str = r#"
use fibre_locator::FactoryGenerated;
use std::sync::Arc;

pub struct Transport;

pub(crate) struct Mailer {
  transport: Arc<Transport>,
  clock: Arc<dyn Clock>,
}

impl Mailer {
  pub fn new(transport: Arc<Transport>, clock: Arc<dyn Clock>) -> Self {
    Mailer { transport, clock }
  }
}

impl FactoryGenerated for Mailer {}

pub struct Report;

impl Report {
  pub fn new() -> Self { Report }
  pub fn empty() -> Report { Report }
}

impl FactoryGenerated for Report {}

impl FactoryGenerated for dyn Clock {}

pub struct Pool;

impl Pool {
  pub fn connect(transport: Arc<Transport>) -> Result<Self, String> {
    Ok(Pool)
  }
}

impl FactoryGenerated for Pool {}
"#;

fn item_struct<'a>(file: &'a syn::File, name: &str) -> &'a syn::ItemStruct {
  file
    .items
    .iter()
    .find_map(|item| match item {
      syn::Item::Struct(item) if item.ident == name => Some(item),
      _ => None,
    })
    .unwrap()
}

#[test]
fn test_batch_continues_past_skipped_types() {
  let report = FactoryGenerator::new().source("services.rs", SERVICES).generate();

  let generated: Vec<_> = report
    .generated
    .iter()
    .map(|factory| factory.type_name.as_str())
    .collect();
  assert_eq!(generated, vec!["Mailer", "Pool"]);

  assert!(!report.is_complete());
  let messages: Vec<_> = report.errors.iter().map(ToString::to_string).collect();
  assert_eq!(
    messages,
    vec![
      "Report needs exactly one public constructor, found 2.".to_string(),
      "dyn Clock is abstract and therefore cannot be instantiated.".to_string(),
    ]
  );
}

#[test]
fn test_generated_factory_names_and_files() {
  let report = FactoryGenerator::new().source("services.rs", SERVICES).generate();
  let mailer = report.factory("Mailer").unwrap();

  assert_eq!(mailer.factory_name, "MailerFactory");
  assert_eq!(mailer.file_name, "mailer_factory.rs");
  assert!(mailer.source.starts_with(HEADER));
}

#[test]
fn test_generated_factory_fails_fast_in_parameter_order() {
  let report = FactoryGenerator::new().source("services.rs", SERVICES).generate();
  let source = &report.factory("Mailer").unwrap().source;

  // One early return per parameter, in declaration order.
  assert_eq!(source.matches("UnresolvedParameter").count(), 2);
  let transport = source.find("\"transport\"").unwrap();
  let clock = source.find("\"clock\"").unwrap();
  assert!(transport < clock);
  assert!(!source.contains("DependencyResolution"));
}

#[test]
fn test_generated_source_is_valid_rust_with_the_types_visibility() {
  let report = FactoryGenerator::new().source("services.rs", SERVICES).generate();

  let mailer: syn::File = syn::parse_file(&report.factory("Mailer").unwrap().source).unwrap();
  assert!(matches!(
    item_struct(&mailer, "MailerFactory").vis,
    syn::Visibility::Restricted(_)
  ));

  let pool: syn::File = syn::parse_file(&report.factory("Pool").unwrap().source).unwrap();
  assert!(matches!(
    item_struct(&pool, "PoolFactory").vis,
    syn::Visibility::Public(_)
  ));
}

#[test]
fn test_fallible_constructors_map_to_invocation_errors() {
  let report = FactoryGenerator::new().source("services.rs", SERVICES).generate();

  assert!(report.factory("Pool").unwrap().source.contains("Invocation"));
  assert!(!report.factory("Mailer").unwrap().source.contains("Invocation"));
}

#[test]
fn test_unparsable_and_missing_sources_are_reported() {
  let report = FactoryGenerator::new()
    .source("broken.rs", "impl FactoryGenerated for {")
    .file("does/not/exist.rs")
    .source("services.rs", SERVICES)
    .generate();

  assert!(matches!(
    report.errors[0],
    GenerationError::Parse { ref source_name, .. } if source_name == "broken.rs"
  ));
  assert!(matches!(report.errors[1], GenerationError::Io { .. }));
  assert_eq!(report.generated.len(), 2);
}

#[test]
fn test_generate_for_build_writes_every_factory() {
  let root = std::env::temp_dir().join(format!("fibre_locator_codegen_{}", std::process::id()));
  let source = root.join("services.rs");
  let out_dir = root.join("out");
  fs::create_dir_all(&root).unwrap();
  fs::write(&source, SERVICES).unwrap();

  let report = generate_for_build([&source], &out_dir).unwrap();
  assert_eq!(report.generated.len(), 2);
  assert!(out_dir.join("mailer_factory.rs").exists());
  assert!(out_dir.join("pool_factory.rs").exists());
  assert!(!out_dir.join("report_factory.rs").exists());

  fs::remove_dir_all(&root).unwrap();
}

const CONFIG_A: &str = "pub struct Config; impl Config { pub fn new() -> Self { Config } } impl FactoryGenerated for Config {}";
const CONFIG_B: &str = "pub struct Config; impl Config { pub fn load(_: Arc<Env>) -> Self { Config } } impl FactoryGenerated for Config {}";

#[test]
fn test_same_named_types_do_not_share_an_artifact() {
  let report = FactoryGenerator::new()
    .source("a.rs", CONFIG_A)
    .source("b.rs", CONFIG_B)
    .generate();

  assert_eq!(report.generated.len(), 1);
  assert!(!report.generated[0].source.contains("load"));
  assert_eq!(
    report.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
    vec![
      "Config would overwrite config_factory.rs, already generated for another marked type of the same name."
        .to_string()
    ]
  );
  assert!(matches!(
    report.errors[0],
    GenerationError::DuplicateArtifact { .. }
  ));
}

#[test]
fn test_generate_for_build_keeps_the_first_of_two_colliding_types() {
  let root = std::env::temp_dir().join(format!("fibre_locator_codegen_dup_{}", std::process::id()));
  let out_dir = root.join("out");
  fs::create_dir_all(&root).unwrap();
  fs::write(root.join("a.rs"), CONFIG_A).unwrap();
  fs::write(root.join("b.rs"), CONFIG_B).unwrap();

  let report = generate_for_build([root.join("a.rs"), root.join("b.rs")], &out_dir).unwrap();
  assert_eq!(report.errors.len(), 1);

  let written = fs::read_to_string(out_dir.join("config_factory.rs")).unwrap();
  assert_eq!(written, report.generated[0].source);
  assert!(!written.contains("load"));

  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_marked_types_in_inline_modules_are_generated() {
  let report = FactoryGenerator::new()
    .source(
      "svc.rs",
      "pub mod mail { pub struct Mailer; impl Mailer { pub fn new() -> Self { Mailer } } impl FactoryGenerated for Mailer {} }",
    )
    .generate();

  assert!(report.is_complete());
  assert_eq!(
    report.factory("Mailer").unwrap().file_name,
    "mail_mailer_factory.rs"
  );
}
