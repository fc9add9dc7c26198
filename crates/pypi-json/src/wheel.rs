//! Wheel filename parsing and compatibility tag expansion.
//!
//! A wheel filename has the shape
//! `{distribution}-{version}(-{build tag})?-{python tag}-{abi tag}-{platform tag}.whl`.
//! Each of the three tag fields may be a dot-separated set ("compressed tag
//! set"), e.g. `py2.py3-none-any`, which stands for every combination of its
//! members.

use crate::error::{PypiJsonError, Result};
use crate::name::canonicalize_name;
use itertools::iproduct;
use once_cell::sync::Lazy;
use pep440_rs::Version;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// File extension of wheel archives.
pub const WHEEL_EXTENSION: &str = ".whl";

/// A single compatibility tag: (python tag, ABI tag, platform tag).
///
/// All three parts are stored lowercase.
///
/// # Examples
///
/// ```
/// use pypi_json::WheelTag;
///
/// let tag = WheelTag::new("CP39", "cp39", "manylinux2014_x86_64");
/// assert_eq!(tag.to_string(), "cp39-cp39-manylinux2014_x86_64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WheelTag {
    pub interpreter: String,
    pub abi: String,
    pub platform: String,
}

impl WheelTag {
    pub fn new(interpreter: &str, abi: &str, platform: &str) -> Self {
        Self {
            interpreter: interpreter.to_lowercase(),
            abi: abi.to_lowercase(),
            platform: platform.to_lowercase(),
        }
    }
}

impl fmt::Display for WheelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.interpreter, self.abi, self.platform)
    }
}

/// Parses the `python-abi-platform` form produced by `Display`.
impl FromStr for WheelTag {
    type Err = PypiJsonError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [python, abi, platform] if parts.iter().all(|part| !part.is_empty()) => {
                Ok(Self::new(python, abi, platform))
            }
            _ => Err(PypiJsonError::InvalidTag { tag: s.to_string() }),
        }
    }
}

/// Optional build tag of a wheel: a leading number and an arbitrary suffix.
///
/// The number keeps every digit of the filename (date stamps such as
/// `202401011200` overflow fixed-width integers), minus leading zeros.
/// Ordering follows the number numerically, then the suffix.
///
/// # Examples
///
/// ```
/// use pypi_json::BuildTag;
///
/// let tag = BuildTag::new("00202401011200", "nightly");
/// assert_eq!(tag.number(), "202401011200");
/// assert!(BuildTag::new("9", "") < BuildTag::new("10", ""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildTag {
    number: String,
    pub suffix: String,
}

impl BuildTag {
    /// Creates a build tag from its digit run and suffix.
    pub fn new(digits: &str, suffix: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self {
            number: if trimmed.is_empty() { "0" } else { trimmed }.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Decimal digits of the build number, without leading zeros.
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl Ord for BuildTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .len()
            .cmp(&other.number.len())
            .then_with(|| self.number.cmp(&other.number))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for BuildTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Expand three tag sets into every (python, abi, platform) combination.
///
/// # Examples
///
/// ```
/// use pypi_json::{WheelTag, expand_tags};
///
/// let tags = expand_tags(&["py2", "py3"], &["none"], &["any"]);
/// assert_eq!(
///     tags,
///     vec![WheelTag::new("py2", "none", "any"), WheelTag::new("py3", "none", "any")]
/// );
/// ```
pub fn expand_tags<S: AsRef<str>>(python: &[S], abi: &[S], platform: &[S]) -> Vec<WheelTag> {
    iproduct!(python, abi, platform)
        .map(|(python, abi, platform)| WheelTag::new(python.as_ref(), abi.as_ref(), platform.as_ref()))
        .collect()
}

/// A parsed wheel filename.
///
/// # Examples
///
/// ```
/// use pypi_json::WheelFilename;
///
/// let wheel = WheelFilename::parse("pkg-1.0-py2.py3-none-any.whl").unwrap();
/// assert_eq!(wheel.name, "pkg");
/// assert_eq!(wheel.tags().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    /// Canonicalized distribution name
    pub name: String,
    pub version: Version,
    pub build_tag: Option<BuildTag>,
    pub python_tags: Vec<String>,
    pub abi_tags: Vec<String>,
    pub platform_tags: Vec<String>,
}

impl WheelFilename {
    /// Parse a wheel filename such as `numpy-1.20.3-cp39-cp39-win_amd64.whl`.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::FilenameParse`] when:
    /// - the extension is not `.whl`
    /// - the stem does not have 5 or 6 dash-separated fields
    /// - the distribution name is empty, contains `__` or other invalid characters
    /// - the version is not PEP 440
    /// - the build tag does not start with a digit
    /// - a tag set contains an empty member
    pub fn parse(filename: &str) -> Result<Self> {
        static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.]+$").unwrap());
        static BUILD_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)(.*)$").unwrap());

        let invalid = |reason: String| PypiJsonError::filename_parse(filename, reason);

        let stem = filename
            .strip_suffix(WHEEL_EXTENSION)
            .ok_or_else(|| invalid("extension must be '.whl'".into()))?;

        let dashes = stem.matches('-').count();
        if dashes != 4 && dashes != 5 {
            return Err(invalid(format!(
                "expected 5 or 6 dash-separated parts, found {}",
                dashes + 1
            )));
        }

        // The last field keeps its two inner dashes: "python-abi-platform".
        let parts: Vec<&str> = stem.splitn(dashes - 1, '-').collect();

        let name_part = parts[0];
        if name_part.contains("__") || !NAME.is_match(name_part) {
            return Err(invalid(format!("invalid project name '{}'", name_part)));
        }

        let version = Version::from_str(parts[1])
            .map_err(|e| invalid(format!("invalid version '{}': {}", parts[1], e)))?;

        let build_tag = if dashes == 5 {
            let captures = BUILD_TAG
                .captures(parts[2])
                .ok_or_else(|| invalid(format!("invalid build number '{}'", parts[2])))?;
            Some(BuildTag::new(&captures[1], &captures[2]))
        } else {
            None
        };

        let mut tag_fields = parts[parts.len() - 1].split('-');
        let (Some(python), Some(abi), Some(platform)) =
            (tag_fields.next(), tag_fields.next(), tag_fields.next())
        else {
            return Err(invalid("missing compatibility tags".into()));
        };

        Ok(Self {
            name: canonicalize_name(name_part),
            version,
            build_tag,
            python_tags: split_tag_set(python).map_err(invalid)?,
            abi_tags: split_tag_set(abi).map_err(invalid)?,
            platform_tags: split_tag_set(platform).map_err(invalid)?,
        })
    }

    /// Every compatibility tag this wheel supports, without duplicates.
    pub fn tags(&self) -> BTreeSet<WheelTag> {
        expand_tags(&self.python_tags, &self.abi_tags, &self.platform_tags)
            .into_iter()
            .collect()
    }
}

impl FromStr for WheelFilename {
    type Err = PypiJsonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Returns `true` if `filename` names a wheel archive.
pub fn is_wheel_filename(filename: &str) -> bool {
    filename.ends_with(WHEEL_EXTENSION)
}

fn split_tag_set(field: &str) -> std::result::Result<Vec<String>, String> {
    field
        .split('.')
        .map(|tag| {
            if tag.is_empty() {
                Err(format!("empty tag in '{}'", field))
            } else {
                Ok(tag.to_lowercase())
            }
        })
        .collect()
}
