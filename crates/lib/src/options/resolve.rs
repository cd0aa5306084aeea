use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::{DefaultOptions, OptionName, OptionOverrides};
use crate::platform::os::Os;

/// The options available for one `(os, shared)` combination.
///
/// Computed once, before any value is read, so later stages never have to
/// remove entries from a live option collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDomain {
  /// Every declared option, `fPIC` included.
  Full,
  /// `fPIC` is absent: the target has no such concept, or the build is shared.
  WithoutFpic,
}

impl OptionDomain {
  /// Domain after the platform rule: Windows drops `fPIC`.
  pub fn for_platform(os: Os) -> Self {
    if os.supports_fpic() { Self::Full } else { Self::WithoutFpic }
  }

  /// Domain after the linkage rule: a shared build drops `fPIC`.
  pub fn configure(self, shared: bool) -> Self {
    if shared { Self::WithoutFpic } else { self }
  }

  pub fn for_target(os: Os, shared: bool) -> Self {
    Self::for_platform(os).configure(shared)
  }

  pub fn allows(&self, name: OptionName) -> bool {
    match self {
      Self::Full => true,
      Self::WithoutFpic => name != OptionName::Fpic,
    }
  }

  pub fn names(&self) -> &'static [OptionName] {
    match self {
      Self::Full => &OptionName::ALL,
      Self::WithoutFpic => &[OptionName::Shared, OptionName::Test, OptionName::Example],
    }
  }
}

/// How the library is linked.
///
/// `fPIC` lives inside the static variant only, so a shared build carrying
/// `fPIC` cannot be expressed. `None` means the target lacks the concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
  Static { fpic: Option<bool> },
  Shared,
}

/// The option values one build runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
  pub linkage: Linkage,
  pub test: bool,
  pub example: bool,
}

impl ResolvedOptions {
  pub fn shared(&self) -> bool {
    matches!(self.linkage, Linkage::Shared)
  }

  pub fn fpic(&self) -> Option<bool> {
    match self.linkage {
      Linkage::Static { fpic } => fpic,
      Linkage::Shared => None,
    }
  }

  /// Value of an option, or `None` when it is not part of the resolved set.
  pub fn get(&self, name: OptionName) -> Option<bool> {
    match name {
      OptionName::Shared => Some(self.shared()),
      OptionName::Fpic => self.fpic(),
      OptionName::Test => Some(self.test),
      OptionName::Example => Some(self.example),
    }
  }

  pub fn contains(&self, name: OptionName) -> bool {
    self.get(name).is_some()
  }

  /// Present options in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = (OptionName, bool)> + '_ {
    OptionName::ALL
      .into_iter()
      .filter_map(|name| self.get(name).map(|value| (name, value)))
  }

  pub fn to_map(&self) -> BTreeMap<&'static str, bool> {
    self.iter().map(|(name, value)| (name.as_str(), value)).collect()
  }
}

impl Serialize for ResolvedOptions {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_map().serialize(serializer)
  }
}

/// Resolve the option set for a target OS.
///
/// Applies the platform rule (`config_options`) and then the linkage rule
/// (`configure`). Overrides for options outside the resulting domain are
/// dropped.
pub fn resolve(defaults: &DefaultOptions, overrides: &OptionOverrides, os: Os) -> ResolvedOptions {
  let value = |name: OptionName| overrides.get(name).unwrap_or_else(|| defaults.get(name));

  let platform_domain = OptionDomain::for_platform(os);
  debug!(os = %os, options = ?platform_domain.names(), "config_options");

  let shared = value(OptionName::Shared);
  let domain = platform_domain.configure(shared);
  debug!(shared, options = ?domain.names(), "configure");

  for (name, _) in overrides.iter().filter(|(name, _)| !domain.allows(*name)) {
    debug!(option = %name, os = %os, shared, "ignoring override for removed option");
  }

  let linkage = if shared {
    Linkage::Shared
  } else {
    Linkage::Static {
      fpic: domain.allows(OptionName::Fpic).then(|| value(OptionName::Fpic)),
    }
  };

  ResolvedOptions {
    linkage,
    test: value(OptionName::Test),
    example: value(OptionName::Example),
  }
}
