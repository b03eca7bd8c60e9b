use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
  let out_dir = env::var("OUT_DIR")?;
  fibre_locator_codegen::generate_for_build(["src/services.rs"], out_dir)?;
  Ok(())
}
