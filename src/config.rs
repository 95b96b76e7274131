use serde::Deserialize;

use crate::models::Algorithm;

/// Calling policy for a [`crate::Verifier`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Fail with `MissingExpectedDigest` when a job carries no expected digest.
    pub require_expected_digest: bool,
    /// Algorithm preselected by front-ends.
    pub default_algorithm: Algorithm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: VerifierConfig =
            serde_json::from_str(r#"{ "require_expected_digest": true }"#).unwrap();
        assert!(cfg.require_expected_digest);
        assert_eq!(cfg.default_algorithm, Algorithm::Sha256);
    }
}
