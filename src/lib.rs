//! File checksum computation and verification.
//!
//! [`compute_checksum`] streams a file through one of the allow-listed
//! algorithms. [`Verifier`] runs that work on a background thread and hands
//! progress and the outcome back to the thread that owns the UI.

pub mod config;
pub mod error;
pub mod file_ops;
pub mod hashers;
pub mod logging;
pub mod models;
pub mod utils;
pub mod verifier;

pub use config::VerifierConfig;
pub use error::{Error, ErrorKind, Result};
pub use file_ops::{compute_checksum, hash_file, verify_checksum};
pub use hashers::{digest_reader, ProgressSink};
pub use models::{Algorithm, DigestResult, HashJob, ProgressEvent, CHUNK_SIZE};
pub use utils::parse_expected_digest;
pub use verifier::{sink_fn, Verification, Verifier, VerifyEvent, VerifySink};
