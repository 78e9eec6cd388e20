// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use deno_error::JsError;
use monch::*;
use thiserror::Error;

use crate::FloatingKind;
use crate::FloatingRange;
use crate::SdkRange;
use crate::SmallStackString;
use crate::Version;
use crate::FEATURE_BAND_SIZE;

#[derive(Error, Debug, Clone, JsError)]
#[class(type)]
#[error("Invalid SDK version. {source}")]
pub struct VersionParseError {
  #[source]
  source: ParseErrorFailureError,
}

#[derive(Error, Debug, Clone, JsError)]
#[class(type)]
#[error("Invalid SDK version range. {source}")]
pub struct SdkRangeParseError {
  #[source]
  source: ParseErrorFailureError,
}

#[derive(Error, Debug, Clone, JsError)]
#[class(type)]
#[error("Invalid prerelease. {source}")]
pub struct PrereleaseParseError {
  #[source]
  source: ParseErrorFailureError,
}

// version   ::= nr '.' nr '.' nr qualifier?
// range     ::= nr ( '.' ( x | nr ( '.' ( x | band | nr ) )? ) )? qualifier?
// band      ::= nr 'xx'
// x         ::= 'x' | 'X'
// qualifier ::= '-' parts
// parts     ::= part ( '.' part ) *
// part      ::= [-0-9A-Za-z]+
// nr        ::= [0-9]+

pub(crate) fn parse_version(text: &str) -> Result<Version, VersionParseError> {
  let text = text.trim();
  with_failure_handling(version)(text)
    .map_err(|err| VersionParseError { source: err })
}

pub(crate) fn parse_range(text: &str) -> Result<SdkRange, SdkRangeParseError> {
  let text = text.trim();
  with_failure_handling(range)(text)
    .map_err(|err| SdkRangeParseError { source: err })
}

pub(crate) fn parse_prerelease(
  text: &str,
) -> Result<Vec<SmallStackString>, PrereleaseParseError> {
  with_failure_handling(parts)(text)
    .map_err(|err| PrereleaseParseError { source: err })
}

fn version(input: &str) -> ParseResult<Version> {
  let (input, major) = nr(input)?;
  let (input, _) = ch('.')(input)?;
  let (input, minor) = nr(input)?;
  let (input, _) = ch('.')(input)?;
  let (input, patch) = nr(input)?;
  let (input, pre) = maybe(qualifier)(input)?;

  Ok((
    input,
    Version {
      major,
      minor,
      patch,
      pre: pre.unwrap_or_default(),
    },
  ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
  Wildcard,
  Band(u64),
  Val(u64),
}

fn range(input: &str) -> ParseResult<SdkRange> {
  let (input, major) = nr(input)?;
  let (input, minor) = maybe(preceded(ch('.'), component))(input)?;
  let (input, patch) = match minor {
    Some(Component::Val(_)) => maybe(preceded(ch('.'), component))(input)?,
    _ => (input, None),
  };
  let (input, pre) = maybe(qualifier)(input)?;
  let pre = pre.unwrap_or_default();

  let (kind, minor, patch) = match (minor, patch) {
    (None | Some(Component::Wildcard), _) => (FloatingKind::Major, None, None),
    (Some(Component::Band(_)), _) => {
      return ParseError::fail(
        input,
        "Feature bands are only allowed in the third component.".to_string(),
      );
    }
    (Some(Component::Val(minor)), None | Some(Component::Wildcard)) => {
      (FloatingKind::Minor, Some(minor), None)
    }
    (Some(Component::Val(minor)), Some(Component::Band(band))) => {
      let Some(patch) = band.checked_mul(FEATURE_BAND_SIZE) else {
        return ParseError::fail(
          input,
          format!("Feature band '{band}' is too large."),
        );
      };
      (FloatingKind::Feature, Some(minor), Some(patch))
    }
    (Some(Component::Val(minor)), Some(Component::Val(patch))) => {
      return Ok((
        input,
        SdkRange::Exact(Version {
          major,
          minor,
          patch,
          pre,
        }),
      ));
    }
  };

  Ok((
    input,
    SdkRange::Floating(FloatingRange {
      kind,
      major,
      minor,
      patch,
      pre,
    }),
  ))
}

// component ::= x | band | nr
fn component(input: &str) -> ParseResult<Component> {
  or(map(or(ch('x'), ch('X')), |_| Component::Wildcard), band_or_nr)(input)
}

fn band_or_nr(input: &str) -> ParseResult<Component> {
  let (input, value) = nr(input)?;
  let (input, band_suffix) = maybe(tag("xx"))(input)?;
  match band_suffix {
    Some(_) => Ok((input, Component::Band(value))),
    None => Ok((input, Component::Val(value))),
  }
}

// nr ::= [0-9]+
fn nr(input: &str) -> ParseResult<u64> {
  // leading zeros are accepted, the sdk never emits them but users do
  let (input, result) =
    if_not_empty(substring(skip_while(|c| c.is_ascii_digit())))(input)?;
  let val = match result.parse::<u64>() {
    Ok(val) => val,
    Err(err) => {
      return ParseError::fail(
        input,
        format!("Error parsing '{result}' to u64.\n\n{err:#}"),
      )
    }
  };
  Ok((input, val))
}

// qualifier ::= '-' parts
fn qualifier(input: &str) -> ParseResult<Vec<SmallStackString>> {
  preceded(ch('-'), parts)(input)
}

// parts ::= part ( '.' part ) *
fn parts(input: &str) -> ParseResult<Vec<SmallStackString>> {
  if_true(
    map(separated_list(part, ch('.')), |text| {
      text
        .into_iter()
        .map(SmallStackString::from_str)
        .collect::<Vec<_>>()
    }),
    |items| !items.is_empty(),
  )(input)
}

// part ::= [-0-9A-Za-z]+
fn part(input: &str) -> ParseResult<&str> {
  if_true(
    take_while(|c| c.is_ascii_alphanumeric() || c == '-'),
    |result| !result.is_empty(),
  )(input)
}
