// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::borrow::Cow;
use std::cmp::Ordering;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use deno_error::JsError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::parse;
use crate::PrereleaseParseError;
use crate::SdkRangeParseError;
use crate::SmallStackString;
use crate::Version;
use crate::FEATURE_BAND_SIZE;

/// Minor used by a floating range that doesn't specify one.
pub const DEFAULT_MINOR: u64 = 0;
/// Patch used by a floating range that doesn't specify one (feature band 0).
pub const DEFAULT_PATCH: u64 = 0;

/// Snaps a minor or patch hint down to the closest multiple of ten.
///
/// Missing and zero components become `0`.
pub fn coerce_floating_component(component: Option<u64>) -> u64 {
  match component {
    Some(component) => component / 10 * 10,
    None => 0,
  }
}

/// The granularity a floating range is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatingKind {
  /// `6.x`
  Major,
  /// `6.0.x`
  Minor,
  /// `6.0.1xx`
  Feature,
}

#[derive(Error, Debug, Clone, JsError, PartialEq, Eq)]
#[class(type)]
#[error(
  "Unknown floating kind '{text}'. Expected 'major', 'minor' or 'feature'."
)]
pub struct FloatingKindParseError {
  pub text: String,
}

impl FloatingKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Major => "major",
      Self::Minor => "minor",
      Self::Feature => "feature",
    }
  }

  #[allow(clippy::should_implement_trait)]
  pub fn from_str(text: &str) -> Result<Self, FloatingKindParseError> {
    match text {
      "major" => Ok(Self::Major),
      "minor" => Ok(Self::Minor),
      "feature" => Ok(Self::Feature),
      _ => Err(FloatingKindParseError {
        text: text.to_string(),
      }),
    }
  }
}

/// A range that floats on the major, the minor or the feature band.
///
/// Components finer than `kind` are kept on the value but have no effect on
/// matching or formatting.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, CapacityDisplay,
)]
pub struct FloatingRange {
  pub kind: FloatingKind,
  pub major: u64,
  pub minor: Option<u64>,
  pub patch: Option<u64>,
  /// When empty the range only matches releases.
  #[serde(deserialize_with = "deserialize_pre")]
  pub pre: Vec<SmallStackString>,
}

fn deserialize_pre<'de, D>(
  deserializer: D,
) -> Result<Vec<SmallStackString>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let parts = Vec::<SmallStackString>::deserialize(deserializer)?;
  for part in &parts {
    // each entry must be exactly one identifier of the qualifier grammar
    let parsed =
      parse::parse_prerelease(part).map_err(serde::de::Error::custom)?;
    if parsed.len() != 1 {
      return Err(serde::de::Error::custom(format!(
        "Invalid prerelease identifier '{part}'."
      )));
    }
  }
  Ok(parts)
}

impl<'a> StringAppendable<'a> for &'a FloatingRange {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    builder.append(self.major);
    builder.append('.');
    match self.kind {
      FloatingKind::Major => {}
      FloatingKind::Minor => {
        builder.append(self.minor_or_default());
        builder.append('.');
      }
      FloatingKind::Feature => {
        builder.append(self.minor_or_default());
        builder.append('.');
        builder.append(self.feature_band());
        builder.append('x');
      }
    }
    builder.append('x');
  }
}

impl FloatingRange {
  pub fn new(
    kind: FloatingKind,
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
  ) -> Self {
    Self {
      kind,
      major,
      minor,
      patch,
      pre: Vec::new(),
    }
  }

  /// Gates the range on a prerelease, e.g. `rc` for `8.0.1xx-rc`.
  pub fn with_pre(self, text: &str) -> Result<Self, PrereleaseParseError> {
    let pre = parse::parse_prerelease(text)?;
    Ok(Self { pre, ..self })
  }

  pub fn minor_or_default(&self) -> u64 {
    self.minor.unwrap_or(DEFAULT_MINOR)
  }

  pub fn patch_or_default(&self) -> u64 {
    self.patch.unwrap_or(DEFAULT_PATCH)
  }

  pub fn feature_band(&self) -> u64 {
    self.patch_or_default() / FEATURE_BAND_SIZE
  }

  /// The lowest version this range accepts.
  ///
  /// Components that the range doesn't pin are zero and the range's
  /// prerelease is carried over, so `8.0.1xx-rc` starts at `8.0.100-rc`.
  pub fn lower_bound(&self) -> Version {
    let (minor, patch) = match self.kind {
      FloatingKind::Major => (0, 0),
      FloatingKind::Minor => (self.minor_or_default(), 0),
      FloatingKind::Feature => (
        self.minor_or_default(),
        self.feature_band() * FEATURE_BAND_SIZE,
      ),
    };
    Version {
      major: self.major,
      minor,
      patch,
      pre: self.pre.clone(),
    }
  }

  /// Gets if the version is at or above the lower bound within the same
  /// major.
  ///
  /// There is no upper bound: `6.0.3xx` accepts `6.0.401` and `6.1.100`
  /// since the newest installed SDK of a major always wins. Use
  /// [`FloatingRange::is_same_family`] to also require the pinned
  /// components to be equal.
  pub fn matches(&self, version: &Version) -> bool {
    if self.pre.is_empty() && !version.pre.is_empty() {
      return false;
    }
    if version.major != self.major {
      return false;
    }
    version.cmp(&self.lower_bound()) != Ordering::Less
  }

  /// Gets if every component pinned by this range equals the version's.
  pub fn is_same_family(&self, version: &Version) -> bool {
    if version.major != self.major {
      return false;
    }
    match self.kind {
      FloatingKind::Major => true,
      FloatingKind::Minor => version.minor == self.minor_or_default(),
      FloatingKind::Feature => {
        version.minor == self.minor_or_default()
          && version.feature_band() == self.feature_band()
      }
    }
  }
}

/// A .NET SDK version range.
///
/// Displays in its canonical form: `6.0.100`, `6.x`, `6.0.x` or `6.0.1xx`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, CapacityDisplay,
)]
pub enum SdkRange {
  Exact(Version),
  Floating(FloatingRange),
}

impl<'a> StringAppendable<'a> for &'a SdkRange {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    match self {
      SdkRange::Exact(version) => builder.append(version),
      SdkRange::Floating(range) => builder.append(range),
    }
  }
}

impl SdkRange {
  /// Parse a range such as `6.0.100`, `6.x`, `6.0.x` or `8.0.1xx-rc`.
  pub fn parse(text: &str) -> Result<SdkRange, SdkRangeParseError> {
    parse::parse_range(text)
  }

  pub fn as_floating(&self) -> Option<&FloatingRange> {
    match self {
      SdkRange::Exact(_) => None,
      SdkRange::Floating(range) => Some(range),
    }
  }

  pub fn is_exact(&self) -> bool {
    matches!(self, SdkRange::Exact(_))
  }

  pub fn matches(&self, version: &Version) -> bool {
    match self {
      SdkRange::Exact(exact) => version.cmp(exact) == Ordering::Equal,
      SdkRange::Floating(range) => range.matches(version),
    }
  }

  /// Picks the text to write for a dependency after it resolved to `version`.
  ///
  /// Keeps the canonical range when it still accepts the version, otherwise
  /// returns `fallback` untouched.
  pub fn prefer_range_string<'a>(
    &self,
    version: &Version,
    fallback: &'a str,
  ) -> Cow<'a, str> {
    if self.matches(version) {
      log::trace!("{} satisfies {}", version, self);
      Cow::Owned(self.to_string())
    } else {
      log::debug!(
        "{} does not satisfy {}, keeping '{}'",
        version,
        self,
        fallback
      );
      Cow::Borrowed(fallback)
    }
  }
}
