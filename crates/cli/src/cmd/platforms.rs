use anyhow::{Context, Result};

use clocker_lib::platform::resolve_platforms;

use crate::output::{OutputFormat, print_json};

pub fn cmd_platforms(spec: Option<&str>, output: OutputFormat) -> Result<()> {
  let platforms = resolve_platforms(spec).context("Failed to resolve platforms")?;

  if output.is_json() {
    print_json(&platforms)?;
  } else {
    for platform in &platforms {
      println!("{}", platform);
    }
  }

  Ok(())
}
