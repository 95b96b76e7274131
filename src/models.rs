use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Bytes handed to the hash accumulator per read.
pub const CHUNK_SIZE: usize = 8192;

/// The fixed allow-list of digest algorithms. The first entry is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha1,
    Md5,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Sha256,
        Algorithm::Sha1,
        Algorithm::Md5,
        Algorithm::Sha512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha1 => "sha1",
            Algorithm::Md5 => "md5",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Length of the rendered digest in hex characters.
    pub fn hex_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha1 => 40,
            Algorithm::Sha256 => 64,
            Algorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| Error::UnsupportedAlgorithm {
                name: s.to_string(),
            })
    }
}

/// One verification request. Consumed by a single [`crate::Verifier::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashJob {
    pub file_path: PathBuf,
    pub algorithm: Algorithm,
    pub expected_digest: Option<String>,
}

impl HashJob {
    pub fn new(file_path: impl Into<PathBuf>, algorithm: Algorithm) -> Self {
        HashJob {
            file_path: file_path.into(),
            algorithm,
            expected_digest: None,
        }
    }

    /// Build a job from an algorithm name, case-insensitively.
    pub fn parse(file_path: impl Into<PathBuf>, algorithm: &str) -> Result<Self, Error> {
        Ok(HashJob::new(file_path, algorithm.parse()?))
    }

    /// Attach the digest to compare against. Blank text counts as none.
    pub fn with_expected(mut self, expected: impl AsRef<str>) -> Self {
        let trimmed = expected.as_ref().trim();
        self.expected_digest = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

/// Percent of the file consumed so far, in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: f64,
}

/// Terminal output of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestResult {
    pub hex_digest: String,
    /// `None` when no expected digest was supplied.
    pub matched: Option<bool>,
}

impl DigestResult {
    /// Compare `hex_digest` against `expected`, ignoring case and surrounding whitespace.
    pub fn compare(hex_digest: String, expected: Option<&str>) -> Self {
        let matched = expected.map(|e| e.trim().eq_ignore_ascii_case(&hex_digest));
        DigestResult {
            hex_digest,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_are_case_insensitive() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("Md5".parse::<Algorithm>().unwrap(), Algorithm::Md5);
        assert_eq!("Sha1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert!(" sha1 ".parse::<Algorithm>().is_err());

        let err = "blake3".parse::<Algorithm>().unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedAlgorithm {
                name: "blake3".into()
            }
        );
    }

    #[test]
    fn allow_list_order_and_default() {
        let names: Vec<_> = Algorithm::ALL.iter().map(Algorithm::name).collect();
        assert_eq!(names, ["sha256", "sha1", "md5", "sha512"]);
        assert_eq!(Algorithm::default(), Algorithm::ALL[0]);
    }

    #[test]
    fn algorithm_serializes_lowercase() {
        let json = serde_json::to_string(&Algorithm::Sha512).unwrap();
        assert_eq!(json, "\"sha512\"");
        let back: Algorithm = serde_json::from_str("\"md5\"").unwrap();
        assert_eq!(back, Algorithm::Md5);
    }

    #[test]
    fn blank_expected_digest_is_absent() {
        let job = HashJob::new("a.iso", Algorithm::Sha256).with_expected("   ");
        assert_eq!(job.expected_digest, None);

        let job = HashJob::new("a.iso", Algorithm::Sha256).with_expected(" ABC \n");
        assert_eq!(job.expected_digest.as_deref(), Some("ABC"));
    }

    #[test]
    fn compare_ignores_case() {
        let r = DigestResult::compare("abcdef".into(), Some("ABCDEF"));
        assert_eq!(r.matched, Some(true));
        let r = DigestResult::compare("abcdef".into(), Some("abcdee"));
        assert_eq!(r.matched, Some(false));
        let r = DigestResult::compare("abcdef".into(), None);
        assert_eq!(r.matched, None);
    }
}
