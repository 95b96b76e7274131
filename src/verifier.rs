//! Background verification jobs.
//!
//! A [`Verifier`] runs one job at a time on a dedicated worker thread. The
//! worker owns no caller state: it only sends [`VerifyEvent`]s down a
//! channel. The owning thread drains that channel on its own schedule
//! through the returned [`Verification`] handle, so sinks always run on the
//! owner's thread and do not need to be `Send`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use futures::stream::{self, Stream};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::file_ops;
use crate::models::{DigestResult, HashJob, ProgressEvent};

/// Message from a worker to the owning thread.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyEvent {
    Progress(ProgressEvent),
    /// Exactly one per job, always last.
    Finished(Result<DigestResult>),
}

impl VerifyEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VerifyEvent::Finished(_))
    }

    /// Route this event to the matching sink method.
    pub fn deliver<S: VerifySink + ?Sized>(self, sink: &mut S) {
        match self {
            VerifyEvent::Progress(p) => sink.progress(p),
            VerifyEvent::Finished(outcome) => sink.complete(outcome),
        }
    }
}

/// Caller-side receiver of a job's progress and outcome.
pub trait VerifySink {
    fn progress(&mut self, event: ProgressEvent);
    fn complete(&mut self, outcome: Result<DigestResult>);
}

/// [`VerifySink`] made of two closures. See [`sink_fn`].
pub struct FnSink<P, C> {
    on_progress: P,
    on_complete: C,
}

pub fn sink_fn<P, C>(on_progress: P, on_complete: C) -> FnSink<P, C>
where
    P: FnMut(ProgressEvent),
    C: FnMut(Result<DigestResult>),
{
    FnSink {
        on_progress,
        on_complete,
    }
}

impl<P, C> VerifySink for FnSink<P, C>
where
    P: FnMut(ProgressEvent),
    C: FnMut(Result<DigestResult>),
{
    fn progress(&mut self, event: ProgressEvent) {
        (self.on_progress)(event)
    }

    fn complete(&mut self, outcome: Result<DigestResult>) {
        (self.on_complete)(outcome)
    }
}

/// Clears the verifier's busy flag when dropped.
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts verification jobs, one in flight at a time.
#[derive(Debug, Default)]
pub struct Verifier {
    config: VerifierConfig,
    busy: Arc<AtomicBool>,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        Verifier {
            config,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// True from a successful [`start`](Self::start) until that job's
    /// terminal event has been handed over (or its handle dropped).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Submit a job.
    ///
    /// Returns `Err(Busy)` while another job is in flight. Input problems are
    /// not returned here: they arrive as the job's terminal event, and no
    /// worker is started for them.
    pub fn start(&self, job: HashJob) -> Result<Verification> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(path = %job.file_path.display(), "verification rejected: busy");
            return Err(Error::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        match self.validate(&job) {
            Ok(()) => {
                info!(job = %id, path = %job.file_path.display(), algorithm = %job.algorithm, "verification started");
                spawn_worker(id, job, tx);
            }
            Err(err) => {
                debug!(job = %id, error = %err, "verification refused");
                // rx is alive, send cannot fail
                let _ = tx.send(VerifyEvent::Finished(Err(err)));
            }
        }

        Ok(Verification {
            id,
            rx,
            busy: Some(guard),
            finished: false,
        })
    }

    fn validate(&self, job: &HashJob) -> Result<()> {
        if job.file_path.as_os_str().is_empty() {
            return Err(Error::MissingInput);
        }
        if self.config.require_expected_digest && job.expected_digest.is_none() {
            return Err(Error::MissingExpectedDigest);
        }
        Ok(())
    }
}

fn spawn_worker(id: Uuid, job: HashJob, tx: UnboundedSender<VerifyEvent>) {
    let fallback = tx.clone();
    let spawned = thread::Builder::new()
        .name(format!("sumcheck-{}", id.simple()))
        .spawn(move || {
            let span = info_span!("verify", job = %id);
            let _enter = span.enter();

            let mut forward = |event: ProgressEvent| {
                let _ = tx.send(VerifyEvent::Progress(event));
            };
            let outcome = file_ops::hash_file(&job.file_path, job.algorithm, Some(&mut forward))
                .map(|hex| DigestResult::compare(hex, job.expected_digest.as_deref()));

            match &outcome {
                Ok(result) => info!(digest = %result.hex_digest, matched = ?result.matched, "verification complete"),
                Err(err) => warn!(error = %err, "verification failed"),
            }
            if tx.send(VerifyEvent::Finished(outcome)).is_err() {
                debug!("handle dropped before completion");
            }
        });

    if let Err(e) = spawned {
        warn!(job = %id, error = %e, "failed to spawn worker");
        let _ = fallback.send(VerifyEvent::Finished(Err(Error::WorkerLost {
            message: e.to_string(),
        })));
    }
}

/// Handle to one in-flight job, held by the owning thread.
#[derive(Debug)]
pub struct Verification {
    id: Uuid,
    rx: UnboundedReceiver<VerifyEvent>,
    busy: Option<BusyGuard>,
    finished: bool,
}

impl Verification {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// True once the terminal event has been taken off the channel.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Deliver every event already queued, without blocking.
    ///
    /// Returns true once the terminal event has been delivered.
    pub fn pump<S: VerifySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        while let Some(event) = self.try_next() {
            self.deliver(event, sink);
        }
        self.finished
    }

    /// Deliver events as they arrive until the terminal one.
    pub async fn run<S: VerifySink + ?Sized>(mut self, sink: &mut S) {
        while let Some(event) = self.next().await {
            self.deliver(event, sink);
        }
    }

    /// The job's events as a stream that ends after the terminal event,
    /// for event loops that consume streams of messages.
    ///
    /// The busy flag is cleared as the terminal event is yielded, before the
    /// consumer handles it; consumers that queue events should tag them with
    /// [`id`](Self::id) and treat themselves as busy until they see it.
    pub fn into_stream(self) -> impl Stream<Item = VerifyEvent> + Send + 'static {
        stream::unfold(self, |mut v| async move {
            let event = v.next().await?;
            if event.is_terminal() {
                v.busy.take();
            }
            Some((event, v))
        })
    }

    fn deliver<S: VerifySink + ?Sized>(&mut self, event: VerifyEvent, sink: &mut S) {
        let terminal = event.is_terminal();
        event.deliver(sink);
        if terminal {
            self.busy.take();
        }
    }

    fn try_next(&mut self) -> Option<VerifyEvent> {
        if self.finished {
            return None;
        }
        let event = match self.rx.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => worker_lost(),
        };
        self.finished = event.is_terminal();
        Some(event)
    }

    async fn next(&mut self) -> Option<VerifyEvent> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().await.unwrap_or_else(worker_lost);
        self.finished = event.is_terminal();
        Some(event)
    }
}

/// The channel closed with no terminal event: the worker panicked.
fn worker_lost() -> VerifyEvent {
    warn!("worker exited without a result");
    VerifyEvent::Finished(Err(Error::WorkerLost {
        message: "worker exited without a result".to_string(),
    }))
}
