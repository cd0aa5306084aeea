use std::path::Path;

use anyhow::Result;
use cradle_lib::platform::paths::{builds_dir, store_dir};
use cradle_lib::platform::platform_triple;

use crate::output::{OutputFormat, emit_json, field};

pub fn cmd_info(format: OutputFormat) -> Result<()> {
  let triple = platform_triple();
  let store = store_dir().ok();
  let builds = builds_dir().ok();

  if format.is_json() {
    return emit_json(&serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "platform": triple,
      "store": store,
      "builds": builds,
    }));
  }

  println!("cradle v{}", env!("CARGO_PKG_VERSION"));
  match triple {
    Some(triple) => field("Platform", &triple),
    None => field("Platform", "could not detect platform"),
  }
  field("Store", &describe_dir(store.as_deref()));
  field("Builds", &describe_dir(builds.as_deref()));

  Ok(())
}

fn describe_dir(dir: Option<&Path>) -> String {
  match dir {
    Some(dir) => dir.display().to_string(),
    None => "unknown (set CRADLE_STORE and CRADLE_CACHE or HOME)".to_string(),
  }
}
