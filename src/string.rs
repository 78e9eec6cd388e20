// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::borrow::Borrow;
use std::ops::Deref;

use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use serde::Deserialize;
use serde::Serialize;

/// A 16 byte string that uses the stack when < 16 bytes.
///
/// Prerelease identifiers such as `preview`, `rc` or `23455` are almost
/// always short, so they live inline.
#[derive(
  Debug,
  Default,
  Clone,
  PartialOrd,
  Ord,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
pub struct SmallStackString(ecow::EcoString);

impl SmallStackString {
  #[inline(always)]
  pub fn from_static(s: &'static str) -> Self {
    Self(ecow::EcoString::from(s))
  }

  /// Creates a `SmallStackString` from a `&str`.
  #[allow(clippy::should_implement_trait)]
  #[inline(always)]
  pub fn from_str(s: &str) -> Self {
    Self(ecow::EcoString::from(s))
  }

  #[inline(always)]
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }

  /// Parses the identifier as a number when it only contains digits.
  pub fn as_numeric(&self) -> Option<u64> {
    if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
      return None;
    }
    self.0.parse::<u64>().ok()
  }
}

impl std::fmt::Display for SmallStackString {
  #[inline(always)]
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl Deref for SmallStackString {
  type Target = str;

  #[inline(always)]
  fn deref(&self) -> &Self::Target {
    self.0.as_str()
  }
}

impl Borrow<str> for SmallStackString {
  #[inline(always)]
  fn borrow(&self) -> &str {
    self.as_str()
  }
}

impl PartialEq<str> for SmallStackString {
  #[inline(always)]
  fn eq(&self, other: &str) -> bool {
    self.0.as_str() == other
  }
}

impl PartialEq<&str> for SmallStackString {
  #[inline(always)]
  fn eq(&self, other: &&str) -> bool {
    self.0.as_str() == *other
  }
}

impl<'a> StringAppendable<'a> for &'a SmallStackString {
  #[inline(always)]
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    builder.append(self.0.as_str())
  }
}

impl StringType for SmallStackString {
  type MutType = ecow::EcoString;

  #[inline(always)]
  fn with_capacity(
    size: usize,
  ) -> Result<Self::MutType, std::collections::TryReserveError> {
    Ok(ecow::EcoString::with_capacity(size))
  }

  #[inline(always)]
  fn from_mut(inner: Self::MutType) -> Self {
    Self(inner)
  }
}

// Note: Do NOT implement `From<String>`. Identifiers come out of the parser
// as borrowed slices of the input.
impl From<&str> for SmallStackString {
  #[inline(always)]
  fn from(s: &str) -> Self {
    Self(ecow::EcoString::from(s))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn numeric_identifiers() {
    assert_eq!(SmallStackString::from_str("23455").as_numeric(), Some(23455));
    assert_eq!(SmallStackString::from_str("0").as_numeric(), Some(0));
    assert_eq!(SmallStackString::from_str("rc").as_numeric(), None);
    assert_eq!(SmallStackString::from_str("1a").as_numeric(), None);
    assert_eq!(SmallStackString::from_str("").as_numeric(), None);
  }

  #[test]
  fn compares_with_str() {
    let value = SmallStackString::from_static("preview");
    assert_eq!(value, "preview");
    assert_eq!(value.len(), 7);
    assert_eq!(value.to_string(), "preview");
  }
}
