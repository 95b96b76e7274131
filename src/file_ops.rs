use std::fs::{self, File};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hashers::{self, ProgressSink};
use crate::models::{Algorithm, DigestResult};

/// Compute the checksum of the file at `path` with the named algorithm.
///
/// The name is matched case-insensitively against [`Algorithm::ALL`] before
/// any filesystem access. Blocking; run it off the UI thread.
pub fn compute_checksum(
    path: impl AsRef<Path>,
    algorithm: &str,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<String> {
    let algorithm: Algorithm = algorithm.parse()?;
    hash_file(path.as_ref(), algorithm, progress)
}

/// Typed form of [`compute_checksum`].
pub fn hash_file(
    path: &Path,
    algorithm: Algorithm,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<String> {
    let meta = fs::metadata(path).map_err(|e| Error::from_io(&e, path))?;
    if !meta.is_file() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let total = meta.len();
    debug!(path = %path.display(), %algorithm, total, "hashing file");

    let f = File::open(path).map_err(|e| Error::from_io(&e, path))?;
    let hex = hashers::digest_reader(f, algorithm, total, progress)
        .map_err(|e| Error::from_io(&e, path))?;

    debug!(path = %path.display(), %algorithm, digest = %hex, "hash complete");
    Ok(hex)
}

/// Compute and compare in one step. Returns `(matched, computed)`.
pub fn verify_checksum(
    path: impl AsRef<Path>,
    expected: &str,
    algorithm: &str,
) -> Result<(bool, String)> {
    let computed = compute_checksum(path, algorithm, None)?;
    let result = DigestResult::compare(computed, Some(expected));
    Ok((result.matched == Some(true), result.hex_digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ProgressEvent;
    use std::io::Write;

    fn temp_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn empty_file_md5() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = compute_checksum(f.path(), "md5", None).unwrap();
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn empty_file_every_algorithm_has_fixed_length() {
        let f = tempfile::NamedTempFile::new().unwrap();
        for algorithm in Algorithm::ALL {
            let digest = hash_file(f.path(), algorithm, None).unwrap();
            assert_eq!(digest.len(), algorithm.hex_len());
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn hello_md5() {
        let f = temp_with(b"hello");
        let digest = compute_checksum(f.path(), "MD5", None).unwrap();
        assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn hello_newline_sha256() {
        let f = temp_with(b"hello\n");
        let digest = compute_checksum(f.path(), "sha256", None).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn unsupported_algorithm_is_rejected_before_io() {
        // The path does not exist: an I/O attempt would surface as FileNotFound.
        let err = compute_checksum("/definitely/not/here.bin", "crc32", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.iso");
        let err = compute_checksum(&path, "sha256", None).unwrap_err();
        assert_eq!(
            err,
            Error::FileNotFound {
                path: path.display().to_string()
            }
        );
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_checksum(dir.path(), "sha1", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();
        let err = compute_checksum(&link, "sha1", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let f = temp_with(b"secret");
        fs::set_permissions(f.path(), fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(f.path()).is_ok() {
            // Running with privileges that bypass file modes.
            return;
        }
        let err = compute_checksum(f.path(), "sha256", None).unwrap_err();
        assert_eq!(
            err,
            Error::PermissionDenied {
                path: f.path().display().to_string()
            }
        );
    }

    #[test]
    fn wrong_expected_still_returns_digest() {
        let f = temp_with(b"data");
        let (matched, computed) = verify_checksum(f.path(), "wrongchecksum", "md5").unwrap();
        assert!(!matched);
        assert_eq!(computed, compute_checksum(f.path(), "md5", None).unwrap());
    }

    #[test]
    fn verify_ignores_case() {
        let f = temp_with(b"hello");
        let (matched, _) =
            verify_checksum(f.path(), "5D41402ABC4B2A76B9719D911017C592", "md5").unwrap();
        assert!(matched);
    }

    #[test]
    fn repeated_hash_is_stable() {
        let f = temp_with(&vec![0xabu8; 50_000]);
        let a = compute_checksum(f.path(), "sha512", None).unwrap();
        let b = compute_checksum(f.path(), "sha512", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn progress_reaches_100_for_real_file() {
        let f = temp_with(&vec![1u8; 20_000]);
        let mut seen = Vec::new();
        let mut sink = |e: ProgressEvent| seen.push(e.percent);
        compute_checksum(f.path(), "sha1", Some(&mut sink)).unwrap();

        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!((seen.last().unwrap() - 100.0).abs() < 1e-9);
    }
}
