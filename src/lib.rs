// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

//! Versions and version ranges for .NET SDKs.
//!
//! SDK versions look like `8.0.204` or `9.0.100-rc.1.24452.12`. The hundreds
//! digits of the third component are the *feature band* (`2xx` above) and the
//! last two digits count builds within that band. Ranges float on the major
//! (`8.x`), the minor (`8.0.x`) or the feature band (`8.0.2xx`), or name a
//! single exact version.

use std::cmp::Ordering;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use serde::Deserialize;
use serde::Serialize;

mod parse;
mod range;
mod string;

pub use self::parse::PrereleaseParseError;
pub use self::parse::SdkRangeParseError;
pub use self::parse::VersionParseError;

pub use self::range::coerce_floating_component;
pub use self::range::FloatingKind;
pub use self::range::FloatingKindParseError;
pub use self::range::FloatingRange;
pub use self::range::SdkRange;
pub use self::range::DEFAULT_MINOR;
pub use self::range::DEFAULT_PATCH;

pub use self::string::SmallStackString;

/// Number of builds that make up one feature band.
pub const FEATURE_BAND_SIZE: u64 = 100;

/// A .NET SDK version.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash, CapacityDisplay)]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  /// Feature band and build combined, e.g. `204` is band 2, build 4.
  pub patch: u64,
  /// Prerelease identifiers. Empty for a release.
  pub pre: Vec<SmallStackString>,
}

impl<'a> StringAppendable<'a> for &'a Version {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    builder.append(self.major);
    builder.append('.');
    builder.append(self.minor);
    builder.append('.');
    builder.append(self.patch);
    if !self.pre.is_empty() {
      builder.append('-');
      for (i, part) in self.pre.iter().enumerate() {
        if i > 0 {
          builder.append('.');
        }
        builder.append(part);
      }
    }
  }
}

impl Serialize for Version {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Version {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let text = String::deserialize(deserializer)?;
    match Version::parse(&text) {
      Ok(version) => Ok(version),
      Err(err) => Err(serde::de::Error::custom(err)),
    }
  }
}

impl Version {
  /// Creates a release version.
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self {
      major,
      minor,
      patch,
      pre: Vec::new(),
    }
  }

  /// Parse an SDK version such as `6.0.100` or `8.0.100-rc.1.23455.8`.
  pub fn parse(text: &str) -> Result<Version, VersionParseError> {
    parse::parse_version(text)
  }

  /// Returns a copy of this version with the provided prerelease.
  pub fn with_pre(self, text: &str) -> Result<Version, PrereleaseParseError> {
    let pre = parse::parse_prerelease(text)?;
    Ok(Version { pre, ..self })
  }

  /// The feature band, e.g. `4` for `6.0.418`.
  pub fn feature_band(&self) -> u64 {
    self.patch / FEATURE_BAND_SIZE
  }

  /// The build within the feature band, e.g. `18` for `6.0.418`.
  pub fn build(&self) -> u64 {
    self.patch % FEATURE_BAND_SIZE
  }

  pub fn is_prerelease(&self) -> bool {
    !self.pre.is_empty()
  }
}

impl std::cmp::PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl std::cmp::Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    let cmp_result = self.major.cmp(&other.major);
    if cmp_result != Ordering::Equal {
      return cmp_result;
    }

    let cmp_result = self.minor.cmp(&other.minor);
    if cmp_result != Ordering::Equal {
      return cmp_result;
    }

    let cmp_result = self.patch.cmp(&other.patch);
    if cmp_result != Ordering::Equal {
      return cmp_result;
    }

    // a prerelease sorts before the release it leads up to
    match (self.pre.is_empty(), other.pre.is_empty()) {
      (true, true) => Ordering::Equal,
      (false, true) => Ordering::Less,
      (true, false) => Ordering::Greater,
      (false, false) => compare_pre(&self.pre, &other.pre),
    }
  }
}

fn compare_pre(a: &[SmallStackString], b: &[SmallStackString]) -> Ordering {
  let mut i = 0;
  loop {
    let (a, b) = match (a.get(i), b.get(i)) {
      (None, None) => return Ordering::Equal,
      (None, Some(_)) => return Ordering::Less,
      (Some(_), None) => return Ordering::Greater,
      (Some(a), Some(b)) => (a, b),
    };

    // numeric identifiers have lower precedence than alphanumeric ones
    let cmp_result = match (a.as_numeric(), b.as_numeric()) {
      // `01` and `1` are equal numerically, fall back to the text so that
      // `cmp` only returns `Equal` for identical identifiers
      (Some(a_num), Some(b_num)) => a_num
        .cmp(&b_num)
        .then_with(|| a.as_str().cmp(b.as_str())),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => a.as_str().cmp(b.as_str()),
    };
    if cmp_result != Ordering::Equal {
      return cmp_result;
    }
    i += 1;
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;

  use super::*;

  fn version(text: &str) -> Version {
    Version::parse(text).unwrap()
  }

  #[test]
  fn serialize_deserialize() {
    let text = "8.0.100-rc.1.23455.8";
    let version: Version =
      serde_json::from_str(&format!("\"{text}\"")).unwrap();
    assert_eq!(version.major, 8);
    assert_eq!(version.patch, 100);
    assert_eq!(version.pre.len(), 4);
    let serialized_version = serde_json::to_string(&version).unwrap();
    assert_eq!(serialized_version, format!("\"{text}\""));

    let err = serde_json::from_str::<Version>("\"8.0\"").unwrap_err();
    assert!(err.to_string().starts_with("Invalid SDK version."), "{err}");
  }

  #[test]
  fn display() {
    assert_eq!(Version::new(6, 0, 100).to_string(), "6.0.100");
    assert_eq!(
      Version::new(9, 0, 100)
        .with_pre("preview.7.24407.12")
        .unwrap()
        .to_string(),
      "9.0.100-preview.7.24407.12"
    );
  }

  #[test]
  fn feature_band_and_build() {
    let v = version("6.0.418");
    assert_eq!(v.feature_band(), 4);
    assert_eq!(v.build(), 18);
    let v = version("6.0.99");
    assert_eq!(v.feature_band(), 0);
    assert_eq!(v.build(), 99);
    assert!(!v.is_prerelease());
    assert!(version("6.0.100-rc.1").is_prerelease());
  }

  #[test]
  fn with_pre_rejects_invalid() {
    assert!(Version::new(6, 0, 100).with_pre("").is_err());
    assert!(Version::new(6, 0, 100).with_pre("rc..1").is_err());
    assert!(Version::new(6, 0, 100).with_pre("rc_1").is_err());
  }

  macro_rules! assert_cmp {
    ($a:expr, $b:expr, $expected:expr) => {
      assert_eq!(
        version($a).cmp(&version($b)),
        $expected,
        "expected {} to be {:?} {}",
        $a,
        $expected,
        $b,
      );
    };
  }

  #[test]
  fn version_cmp() {
    assert_cmp!("6.0.100", "6.0.100", Ordering::Equal);
    assert_cmp!("6.0.100", "6.0.101", Ordering::Less);
    assert_cmp!("6.0.200", "6.0.199", Ordering::Greater);
    assert_cmp!("6.1.100", "6.0.999", Ordering::Greater);
    assert_cmp!("7.0.100", "6.9.999", Ordering::Greater);
    assert_cmp!("6.0.100-rc.1", "6.0.100", Ordering::Less);
    assert_cmp!("6.0.100", "6.0.100-rc.1", Ordering::Greater);
    assert_cmp!("6.0.101-rc.1", "6.0.100", Ordering::Greater);
    assert_cmp!("6.0.100-preview.7", "6.0.100-rc.1", Ordering::Less);
    assert_cmp!("6.0.100-rc.1", "6.0.100-rc.2", Ordering::Less);
    assert_cmp!("6.0.100-rc.2", "6.0.100-rc.10", Ordering::Less);
    assert_cmp!("6.0.100-rc", "6.0.100-rc.1", Ordering::Less);
    assert_cmp!("6.0.100-1", "6.0.100-alpha", Ordering::Less);
    assert_cmp!("6.0.100-rc.1", "6.0.100-rc.1", Ordering::Equal);
    assert_cmp!("6.0.100-rc.01", "6.0.100-rc.1", Ordering::Less);
    assert_cmp!("6.0.100-rc.1", "6.0.100-rc.01", Ordering::Greater);
    assert_cmp!("6.0.100-rc.01", "6.0.100-rc.2", Ordering::Less);
  }

  #[test]
  fn version_eq_agrees_with_cmp() {
    use std::collections::BTreeSet;
    use std::collections::HashSet;

    let a = version("6.0.100-rc.01");
    let b = version("6.0.100-rc.1");
    assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
    assert_ne!(a, b);

    let btree = [a.clone(), b.clone()].into_iter().collect::<BTreeSet<_>>();
    let hash = [a.clone(), b.clone()].into_iter().collect::<HashSet<_>>();
    assert_eq!(btree.len(), 2);
    assert_eq!(hash.len(), 2);

    assert!(!SdkRange::Exact(a.clone()).matches(&b));
    assert!(SdkRange::Exact(a.clone()).matches(&a));
  }

  #[test]
  fn version_sort() {
    let mut versions = vec![
      version("8.0.100"),
      version("6.0.100"),
      version("8.0.100-rc.2.23502.2"),
      version("6.0.400"),
      version("8.0.100-rc.1.23455.8"),
      version("6.0.321"),
    ];
    versions.sort();
    assert_eq!(
      versions.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
      vec![
        "6.0.100",
        "6.0.321",
        "6.0.400",
        "8.0.100-rc.1.23455.8",
        "8.0.100-rc.2.23502.2",
        "8.0.100",
      ]
    );
  }
}
