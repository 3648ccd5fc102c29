use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Directory name reserved for the development build.
pub const DEVELOPMENT_DIR_NAME: &str = "tip";

/// Pre-release classification of a [`GoVersion`].
///
/// The declaration order is the rank order used when major and minor are
/// equal: an invalid identifier ranks lowest, a final release highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrereleaseKind {
    Invalid,
    Beta,
    ReleaseCandidate,
    Final,
}

impl PrereleaseKind {
    fn marker(self) -> Option<&'static str> {
        match self {
            Self::Beta => Some("beta"),
            Self::ReleaseCandidate => Some("rc"),
            Self::Final | Self::Invalid => None,
        }
    }
}

impl fmt::Display for PrereleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid"),
            Self::Beta => write!(f, "beta"),
            Self::ReleaseCandidate => write!(f, "rc"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// A Go release identifier such as `1.21.0`, `1.22rc1` or `1.12beta2`.
///
/// Parsing never fails: text that does not follow the release naming scheme
/// is kept with [`PrereleaseKind::Invalid`] and sorts below every well-formed
/// identifier. The raw text is preserved and used for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct GoVersion {
    major: u32,
    minor: u32,
    kind: PrereleaseKind,
    prerelease: u32,
    patch: u32,
    raw: String,
}

impl GoVersion {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut version = Self::invalid(text);
        version.kind = PrereleaseKind::Final;
        if version.read_components(text).is_none() {
            return Self::invalid(text);
        }
        version
    }

    fn invalid(text: &str) -> Self {
        Self {
            major: 0,
            minor: 0,
            kind: PrereleaseKind::Invalid,
            prerelease: 0,
            patch: 0,
            raw: text.to_string(),
        }
    }

    fn read_components(&mut self, text: &str) -> Option<()> {
        let mut tokens = text.split('.');
        self.major = parse_number(tokens.next()?)?;
        if let Some(token) = tokens.next() {
            self.read_minor(token)?;
        }
        if let Some(token) = tokens.next() {
            self.patch = parse_number(token)?;
        }
        Some(())
    }

    fn read_minor(&mut self, token: &str) -> Option<()> {
        let split = [PrereleaseKind::Beta, PrereleaseKind::ReleaseCandidate]
            .into_iter()
            .find_map(|kind| {
                token
                    .split_once(kind.marker()?)
                    .map(|(minor, number)| (kind, minor, number))
            });

        match split {
            Some((kind, minor, number)) => {
                self.minor = parse_number(minor)?;
                self.prerelease = parse_number(number)?;
                self.kind = kind;
            }
            None => self.minor = parse_number(token)?,
        }
        Some(())
    }

    #[must_use]
    pub fn major(&self) -> u32 {
        self.major
    }

    #[must_use]
    pub fn minor(&self) -> u32 {
        self.minor
    }

    #[must_use]
    pub fn kind(&self) -> PrereleaseKind {
        self.kind
    }

    #[must_use]
    pub fn prerelease(&self) -> u32 {
        self.prerelease
    }

    #[must_use]
    pub fn patch(&self) -> u32 {
        self.patch
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind != PrereleaseKind::Invalid
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.kind == PrereleaseKind::Final
    }
}

fn parse_number(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => self
                .major
                .cmp(&other.major)
                .then(self.minor.cmp(&other.minor))
                .then(self.kind.cmp(&other.kind))
                .then(self.prerelease.cmp(&other.prerelease))
                .then(self.patch.cmp(&other.patch)),
        }
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GoVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GoVersion {}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for GoVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for GoVersion {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for GoVersion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<GoVersion> for String {
    fn from(value: GoVersion) -> Self {
        value.raw
    }
}

/// What the user asked to activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    Release(GoVersion),
    /// The development branch, refetched on every request.
    Development,
}

impl VersionRequest {
    /// Name of the installation directory under the SDK root.
    #[must_use]
    pub fn dir_name(&self) -> &str {
        match self {
            Self::Release(version) => version.as_str(),
            Self::Development => DEVELOPMENT_DIR_NAME,
        }
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Progress reported while an archive is fetched and unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireProgress {
    /// `total` is 0 when the server sent no length.
    Downloading { downloaded: u64, total: u64 },
    Verifying,
    Extracting { extracted: u64, total: u64 },
}

impl From<GoVersion> for VersionRequest {
    fn from(version: GoVersion) -> Self {
        Self::Release(version)
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release(version) => write!(f, "{version}"),
            Self::Development => write!(f, "development build ({DEVELOPMENT_DIR_NAME})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> GoVersion {
        GoVersion::parse(text)
    }

    #[test]
    fn parse_keeps_raw_text() {
        for text in ["1.12", "1.12.1", "1.12beta1", "1.12rc2", "1.9rc1.3", "", "abc"] {
            assert_eq!(v(text).as_str(), text);
            assert_eq!(v(text).to_string(), text);
        }
    }

    #[test]
    fn parse_final_release() {
        let version = v("1.21.4");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 21);
        assert_eq!(version.patch(), 4);
        assert_eq!(version.kind(), PrereleaseKind::Final);
    }

    #[test]
    fn parse_prerelease_splits_minor_token() {
        let beta = v("1.12beta2");
        assert_eq!(beta.minor(), 12);
        assert_eq!(beta.kind(), PrereleaseKind::Beta);
        assert_eq!(beta.prerelease(), 2);
        assert_eq!(beta.patch(), 0);

        let rc = v("1.22rc1");
        assert_eq!(rc.minor(), 22);
        assert_eq!(rc.kind(), PrereleaseKind::ReleaseCandidate);
        assert_eq!(rc.prerelease(), 1);
    }

    #[test]
    fn parse_major_only_defaults_minor_and_patch() {
        let version = v("2");
        assert!(version.is_final());
        assert_eq!(version.minor(), 0);
        assert_eq!(version.patch(), 0);
    }

    #[test]
    fn malformed_text_is_invalid() {
        for text in ["", "abc", "1.x", "1.12beta", "1.12rc", "rc1.2", "1.2.z", "-1.2", "1..2"] {
            assert_eq!(v(text).kind(), PrereleaseKind::Invalid, "{text:?}");
        }
    }

    #[test]
    fn overflowing_component_is_invalid() {
        assert!(!v("1.99999999999").is_valid());
    }

    #[test]
    fn minor_is_compared_numerically() {
        assert!(v("1.8") < v("1.9"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.8") < v("1.10"));
    }

    #[test]
    fn prerelease_rank_is_beta_then_rc_then_final() {
        let beta = v("1.12beta1");
        let rc = v("1.12rc1");
        let final_release = v("1.12");

        assert!(beta < rc);
        assert!(rc < final_release);
        assert!(beta < final_release);
        assert_ne!(beta, rc);
        assert_ne!(rc, final_release);
        assert!(final_release < v("1.12.1"));
    }

    #[test]
    fn invalid_sorts_below_everything_and_equals_other_invalid() {
        assert_eq!(v(""), v("abc"));
        assert!(v("") < v("0.0"));
        assert!(v("abc") < v("1.0beta1"));
        assert!(v("1.21.0") > v("abc"));
    }

    #[test]
    fn different_major_wins_over_prerelease() {
        assert!(v("1.12.1") < v("2.0beta1"));
        assert!(v("1.8") < v("2.0beta1"));
        assert!(v("1.11.6") < v("1.12.1"));
        assert!(v("1.11.0") < v("1.11.6"));
    }

    #[test]
    fn ordering_is_total_and_transitive() {
        let samples: Vec<GoVersion> = [
            "", "abc", "1.8", "1.9", "1.10", "1.12beta1", "1.12beta2", "1.12rc1", "1.12",
            "1.12.0", "1.12.1", "2.0beta1", "2", "1.21rc1.1",
        ]
        .into_iter()
        .map(v)
        .collect();

        for a in &samples {
            for b in &samples {
                let forward = a.cmp(b);
                assert_eq!(forward, b.cmp(a).reverse(), "{a} vs {b}");
                for c in &samples {
                    if a < b && b < c {
                        assert!(a < c, "{a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn sorting_orders_catalog_entries() {
        let mut versions: Vec<GoVersion> = ["1.10", "1.9", "1.12rc1", "abc", "1.12", "1.12beta1"]
            .into_iter()
            .map(v)
            .collect();
        versions.sort();

        let raw: Vec<&str> = versions.iter().map(GoVersion::as_str).collect();
        assert_eq!(raw, ["abc", "1.9", "1.10", "1.12beta1", "1.12rc1", "1.12"]);
    }

    #[test]
    fn serde_uses_raw_text() {
        let json = serde_json::to_string(&v("1.22rc2")).expect("serialize");
        assert_eq!(json, "\"1.22rc2\"");

        let back: GoVersion = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.kind(), PrereleaseKind::ReleaseCandidate);
        assert_eq!(back.as_str(), "1.22rc2");
    }

    #[test]
    fn request_dir_name() {
        assert_eq!(VersionRequest::from(v("1.21.0")).dir_name(), "1.21.0");
        assert_eq!(VersionRequest::Development.dir_name(), DEVELOPMENT_DIR_NAME);
        assert!(VersionRequest::Development.is_development());
    }
}
