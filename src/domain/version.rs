//! Release versions as published by Python package indexes
//!
//! Handles the PEP 440 subset seen in practice on PyPI and in Poetry
//! manifests:
//! - Release segments of any length: `3`, `3.8`, `1.24.4`
//! - Pre-releases: `1.0a1`, `1.0b2`, `2.0.0rc1`
//! - Post and dev releases: `1.0.post1`, `1.0-1`, `1.0.dev3`
//! - Epochs and local labels: `1!2.0`, `1.0+ubuntu1`

use crate::error::ConstraintError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_kind>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_num>\d+)?)?
        (?:-(?P<post_implicit>\d+)|[-_.]?(?P<post_marker>post|rev|r)[-_.]?(?P<post_num>\d+)?)?
        (?:[-_.]?(?P<dev>dev)[-_.]?(?P<dev_num>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .unwrap()
});

/// Pre-release phase, ordered alpha < beta < release candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseKind {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreReleaseKind {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreReleaseKind::Alpha,
            "b" | "beta" => PreReleaseKind::Beta,
            _ => PreReleaseKind::ReleaseCandidate,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PreReleaseKind::Alpha => "a",
            PreReleaseKind::Beta => "b",
            PreReleaseKind::ReleaseCandidate => "rc",
        }
    }
}

/// Pre-release marker with its number (`rc1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: u64,
}

/// A totally ordered release version.
///
/// Equality follows ordering, so `3.8` and `3.8.0` are the same version even
/// though their text differs.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl Version {
    /// Creates a final release from its numeric components
    pub fn from_release(release: impl Into<Vec<u64>>) -> Self {
        let mut release = release.into();
        if release.is_empty() {
            release.push(0);
        }
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Parses a version string
    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        text.parse()
    }

    /// The numeric release components as written
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns true for alpha, beta, rc and dev releases
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Returns the final release this version belongs to (`2.0rc1` -> `2.0`)
    pub fn base(&self) -> Version {
        Self {
            epoch: self.epoch,
            ..Self::from_release(self.release.clone())
        }
    }

    /// Increments the release component at `index` and drops everything after it
    ///
    /// `1.2.3` bumped at 0 is `2`, at 1 is `1.3`. Returns `None` when the
    /// component is already `u64::MAX`.
    pub fn bumped(&self, index: usize) -> Option<Version> {
        let mut release: Vec<u64> = (0..=index).map(|i| self.component(i)).collect();
        release[index] = release[index].checked_add(1)?;
        Some(Self {
            epoch: self.epoch,
            ..Self::from_release(release)
        })
    }

    /// First version of the next major series (`1.24.4` -> `2`)
    pub fn next_major(&self) -> Option<Version> {
        self.bumped(0)
    }

    /// Returns true if the release segment starts with `prefix`, zero-padded
    pub fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, part)| self.release.get(i).copied().unwrap_or(0) == *part)
    }

    fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    fn compare_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    // dev-only releases sort before every pre-release of the same base
    fn pre_rank(&self) -> (u8, Option<PreRelease>) {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => (0, None),
            (Some(pre), _, _) => (1, Some(pre)),
            (None, _, _) => (2, None),
        }
    }

    fn dev_rank(&self) -> (bool, u64) {
        (self.dev.is_none(), self.dev.unwrap_or(0))
    }
}

impl FromStr for Version {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| ConstraintError::invalid_version(trimmed, "not a valid version"))?;

        let number = |name: &str| -> Result<Option<u64>, ConstraintError> {
            caps.name(name)
                .map(|m| {
                    m.as_str().parse::<u64>().map_err(|e| {
                        ConstraintError::invalid_version(trimmed, format!("{}: {}", name, e))
                    })
                })
                .transpose()
        };

        let release = caps["release"]
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|e| ConstraintError::invalid_version(trimmed, e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match caps.name("pre_kind") {
            Some(kind) => Some(PreRelease {
                kind: PreReleaseKind::from_label(kind.as_str()),
                number: number("pre_num")?.unwrap_or(0),
            }),
            None => None,
        };

        let post = match (number("post_implicit")?, caps.name("post_marker")) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => Some(number("post_num")?.unwrap_or(0)),
            (None, None) => None,
        };

        let dev = match caps.name("dev") {
            Some(_) => Some(number("dev_num")?.unwrap_or(0)),
            None => None,
        };

        Ok(Self {
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.compare_release(other))
            .then_with(|| self.pre_rank().cmp(&other.pre_rank()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_rank().cmp(&other.dev_rank()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(pre) = self.pre {
            write!(f, "{}{}", pre.kind.label(), pre.number)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if let Some(ref local) = self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_release() {
        assert_eq!(v("1.24.4").release(), &[1, 24, 4]);
        assert_eq!(v("3.8").release(), &[3, 8]);
        assert_eq!(v("v2.0.0").release(), &[2, 0, 0]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("not-a-version").is_err());
        assert!(Version::parse("1.2.x").is_err());
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("3.8"), v("3.8.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("10.0.0") > v("9.9.9"));
        assert!(v("3.8") < v("3.10"));
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(v("2.0.0a1") < v("2.0.0b1"));
        assert!(v("2.0.0b1") < v("2.0.0rc1"));
        assert!(v("2.0.0rc1") < v("2.0.0"));
        assert!(v("2.0.0rc1") > v("1.26.4"));
        assert_eq!(v("1.0alpha1"), v("1.0a1"));
        assert_eq!(v("1.0c1"), v("1.0rc1"));
    }

    #[test]
    fn test_dev_and_post_ordering() {
        assert!(v("1.0.dev0") < v("1.0a1"));
        assert!(v("1.0a1.dev0") < v("1.0a1"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(v("1.0.post1.dev0") < v("1.0.post1"));
        assert_eq!(v("1.0-1"), v("1.0.post1"));
        assert!(v("1.0.post1") < v("1.0.1"));
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1!1.0") > v("2.0"));
        assert_eq!(v("1!1.0").epoch(), 1);
    }

    #[test]
    fn test_is_prerelease() {
        assert!(v("1.0rc1").is_prerelease());
        assert!(v("1.0.dev1").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
        assert!(!v("1.0").is_prerelease());
    }

    #[test]
    fn test_bumped() {
        assert_eq!(v("1.2.3").bumped(0), Some(v("2")));
        assert_eq!(v("1.2.3").bumped(1), Some(v("1.3")));
        assert_eq!(v("0.0.3").bumped(2), Some(v("0.0.4")));
        assert_eq!(v("1.24.4").next_major(), Some(v("2.0.0")));
        assert_eq!(v("3").bumped(1), Some(v("3.1")));
    }

    #[test]
    fn test_bumped_overflow() {
        assert_eq!(v("18446744073709551615").bumped(0), None);
        assert_eq!(v("1.18446744073709551615").bumped(1), None);
        assert_eq!(v("1.18446744073709551615").bumped(0), Some(v("2")));
    }

    #[test]
    fn test_base_drops_qualifiers() {
        assert_eq!(v("2.0rc1").base(), v("2.0"));
        assert_eq!(v("1.0.post2+local").base(), v("1.0"));
    }

    #[test]
    fn test_release_starts_with() {
        assert!(v("3.0.1").release_starts_with(&[3, 0]));
        assert!(v("3").release_starts_with(&[3, 0]));
        assert!(!v("3.1").release_starts_with(&[3, 0]));
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(v("1.24.4").to_string(), "1.24.4");
        assert_eq!(v("1.0-alpha-1").to_string(), "1.0a1");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1!2.0.DEV3+Ubuntu").to_string(), "1!2.0.dev3+ubuntu");
    }
}
