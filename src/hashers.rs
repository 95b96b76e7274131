//! Incremental hash accumulators and the chunked read loop.

use std::io::{ErrorKind, Read};

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use tracing::trace;

use crate::models::{Algorithm, ProgressEvent, CHUNK_SIZE};

/// Receives progress while a file is being digested.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Running hash state for one algorithm.
pub enum Accumulator {
    Sha256(Sha256),
    Sha1(Sha1),
    Md5(md5::Context),
    Sha512(Sha512),
}

impl Accumulator {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha256 => Accumulator::Sha256(Sha256::new()),
            Algorithm::Sha1 => Accumulator::Sha1(Sha1::new()),
            Algorithm::Md5 => Accumulator::Md5(md5::Context::new()),
            Algorithm::Sha512 => Accumulator::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Accumulator::Sha256(h) => h.update(chunk),
            Accumulator::Sha1(h) => h.update(chunk),
            Accumulator::Md5(ctx) => ctx.consume(chunk),
            Accumulator::Sha512(h) => h.update(chunk),
        }
    }

    /// Lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        match self {
            Accumulator::Sha256(h) => hex::encode(h.finalize()),
            Accumulator::Sha1(h) => hex::encode(h.finalize()),
            Accumulator::Md5(ctx) => format!("{:x}", ctx.finalize()),
            Accumulator::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Turns byte counts into non-decreasing percentages.
///
/// Only [`finish`](Self::finish) reports 100: a file can grow past its
/// recorded size, so reaching the size is not the end of the read.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    read: u64,
    last: Option<f64>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        ProgressTracker {
            total,
            read: 0,
            last: None,
        }
    }

    /// Record `n` more bytes. Returns the percentage to report, if any.
    pub fn advance(&mut self, n: usize) -> Option<f64> {
        self.read = self.read.saturating_add(n as u64);
        if self.read >= self.total {
            return None;
        }
        let percent = self.read as f64 / self.total as f64 * 100.0;
        self.emit(percent)
    }

    /// The read is complete: report 100 unless it was already reported.
    pub fn finish(&mut self) -> Option<f64> {
        self.emit(100.0)
    }

    fn emit(&mut self, percent: f64) -> Option<f64> {
        match self.last {
            Some(last) if last >= 100.0 => None,
            Some(last) if percent < last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }
}

/// Feed `reader` through `algorithm` in [`CHUNK_SIZE`] pieces.
///
/// `total_len` only drives progress; the digest covers whatever the reader yields.
pub fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: Algorithm,
    total_len: u64,
    mut progress: Option<&mut dyn ProgressSink>,
) -> std::io::Result<String> {
    let mut acc = Accumulator::new(algorithm);
    let mut tracker = ProgressTracker::new(total_len);
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        acc.update(&buf[..n]);
        trace!(bytes = n, "chunk hashed");
        if let Some(percent) = tracker.advance(n) {
            if let Some(sink) = progress.as_deref_mut() {
                sink.on_progress(ProgressEvent { percent });
            }
        }
    }
    if let Some(percent) = tracker.finish() {
        if let Some(sink) = progress.as_deref_mut() {
            sink.on_progress(ProgressEvent { percent });
        }
    }
    Ok(acc.finalize_hex())
}
