//! Recipe options: declared defaults, user overrides, and resolution.
//!
//! The option set is fixed: `shared`, `fPIC`, `test` and `example`, all
//! boolean. Overrides arrive as `name=value` strings (CLI) or as a profile
//! table, and are folded over the recipe defaults by [`resolve`].

mod resolve;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use resolve::{Linkage, OptionDomain, ResolvedOptions, resolve};

/// Errors raised while reading option overrides.
#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("unknown option '{0}' (available: shared, fPIC, test, example)")]
  UnknownOption(String),

  #[error("invalid value '{value}' for option '{name}' (expected true or false)")]
  InvalidValue { name: String, value: String },

  #[error("invalid option assignment '{0}' (expected name=value)")]
  Malformed(String),
}

/// Names of the options a recipe declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionName {
  Shared,
  Fpic,
  Test,
  Example,
}

impl OptionName {
  pub const ALL: [OptionName; 4] = [Self::Shared, Self::Fpic, Self::Test, Self::Example];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Shared => "shared",
      Self::Fpic => "fPIC",
      Self::Test => "test",
      Self::Example => "example",
    }
  }
}

impl fmt::Display for OptionName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for OptionName {
  type Err = OptionsError;

  // Option names are case-sensitive, as they are in recipes.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|name| name.as_str() == s)
      .ok_or_else(|| OptionsError::UnknownOption(s.to_string()))
  }
}

/// Parse an option value. Accepts `true/false`, `1/0`, `yes/no`, `on/off`,
/// case-insensitively.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, OptionsError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    _ => Err(OptionsError::InvalidValue {
      name: name.to_string(),
      value: value.to_string(),
    }),
  }
}

/// Default values a recipe declares for its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultOptions {
  pub shared: bool,
  #[serde(rename = "fPIC")]
  pub fpic: bool,
  pub test: bool,
  pub example: bool,
}

impl Default for DefaultOptions {
  fn default() -> Self {
    Self {
      shared: false,
      fpic: true,
      test: true,
      example: false,
    }
  }
}

impl DefaultOptions {
  pub fn get(&self, name: OptionName) -> bool {
    match name {
      OptionName::Shared => self.shared,
      OptionName::Fpic => self.fpic,
      OptionName::Test => self.test,
      OptionName::Example => self.example,
    }
  }
}

/// A literal option value as it appears in a TOML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionLiteral {
  Bool(bool),
  Text(String),
}

/// User-supplied option values, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides(BTreeMap<OptionName, bool>);

impl OptionOverrides {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a single `name=value` assignment.
  pub fn parse_assignment(assignment: &str) -> Result<(OptionName, bool), OptionsError> {
    let (name, value) = assignment
      .split_once('=')
      .ok_or_else(|| OptionsError::Malformed(assignment.to_string()))?;
    let name = name.trim();
    let option: OptionName = name.parse()?;
    Ok((option, parse_bool(name, value)?))
  }

  /// Build overrides from `name=value` strings; later assignments win.
  pub fn from_assignments<'a, I>(assignments: I) -> Result<Self, OptionsError>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut overrides = Self::new();
    for assignment in assignments {
      let (name, value) = Self::parse_assignment(assignment)?;
      overrides.set(name, value);
    }
    Ok(overrides)
  }

  /// Build overrides from a profile `[options]` table.
  pub fn from_table(table: &BTreeMap<String, OptionLiteral>) -> Result<Self, OptionsError> {
    let mut overrides = Self::new();
    for (name, literal) in table {
      let option: OptionName = name.parse()?;
      let value = match literal {
        OptionLiteral::Bool(value) => *value,
        OptionLiteral::Text(text) => parse_bool(name, text)?,
      };
      overrides.set(option, value);
    }
    Ok(overrides)
  }

  pub fn set(&mut self, name: OptionName, value: bool) {
    self.0.insert(name, value);
  }

  pub fn get(&self, name: OptionName) -> Option<bool> {
    self.0.get(&name).copied()
  }

  /// Layer `other` on top of `self`; values in `other` win.
  pub fn merged_with(mut self, other: &OptionOverrides) -> Self {
    for (name, value) in other.iter() {
      self.set(name, value);
    }
    self
  }

  pub fn iter(&self) -> impl Iterator<Item = (OptionName, bool)> + '_ {
    self.0.iter().map(|(name, value)| (*name, *value))
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
