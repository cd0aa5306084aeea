//! Terminal output for cradle commands.
//!
//! Commands report progress as status lines, summarize a result as aligned
//! `label: value` fields, and switch to JSON with `--format json`.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

/// Width labels are padded to, so field values line up.
const LABEL_WIDTH: usize = 11;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kind of a status line. `Failed` and `Warning` go to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Step,
  Done,
  Warning,
  Failed,
}

impl Status {
  pub fn symbol(self) -> &'static str {
    match self {
      Status::Step => "•",
      Status::Done => "✓",
      Status::Warning => "⚠",
      Status::Failed => "✗",
    }
  }
}

pub fn status(kind: Status, message: &str) {
  match kind {
    Status::Step => println!(
      "{} {message}",
      kind.symbol().if_supports_color(Stream::Stdout, |s| s.blue())
    ),
    Status::Done => println!(
      "{} {message}",
      kind.symbol().if_supports_color(Stream::Stdout, |s| s.green())
    ),
    Status::Warning => eprintln!(
      "{} {}",
      kind.symbol().if_supports_color(Stream::Stderr, |s| s.yellow()),
      message.if_supports_color(Stream::Stderr, |s| s.yellow())
    ),
    Status::Failed => eprintln!(
      "{} {}",
      kind.symbol().if_supports_color(Stream::Stderr, |s| s.red()),
      message.if_supports_color(Stream::Stderr, |s| s.red())
    ),
  }
}

/// One `label: value` line of a result summary.
pub fn field(label: &str, value: &str) {
  let padded = format!("{label}:{:width$}", "", width = LABEL_WIDTH.saturating_sub(label.len()));
  println!("  {} {value}", padded.if_supports_color(Stream::Stdout, |s| s.dimmed()));
}

/// Heading of a list printed with [`item`].
pub fn section(title: &str) {
  println!();
  println!("{}", title.if_supports_color(Stream::Stdout, |s| s.bold()));
}

pub fn item(text: &str) {
  println!("  - {text}");
}

/// Files of a package, relative to its root.
pub fn file_list<'a>(files: impl IntoIterator<Item = &'a String>) {
  for file in files {
    println!("  → {file}");
  }
}

/// Echo the tail of a failed build tool run before the error itself.
pub fn tool_output(tail: &str) {
  status(Status::Warning, "build tool output:");
  for line in tail.lines() {
    eprintln!("  {}", line.if_supports_color(Stream::Stderr, |s| s.dimmed()));
  }
}

/// CMake spelling of a boolean.
pub fn on_off(value: bool) -> &'static str {
  if value { "ON" } else { "OFF" }
}

/// Wall time of a build, coarse enough for a summary line.
pub fn elapsed(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{:.1}s", duration.as_secs_f64()),
    _ => format!("{}m {:02}s", secs / 60, secs % 60),
  }
}

pub fn emit_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?;
  println!("{json}");
  Ok(())
}
