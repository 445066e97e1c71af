//! Background worker for note fetch and persist jobs.
//!
//! # Responsibility
//! - Run repository calls off the interactive thread.
//! - Report each finished job back as a `Completion` keyed by ticket.
//!
//! # Invariants
//! - Jobs run strictly in submission order, so a load submitted after a
//!   persist observes the persisted value.
//! - Queued jobs are never cancelled; dropping the worker drains the queue
//!   and joins the thread.
//! - Completions for a dropped receiver are discarded.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoResult};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Identifies one submitted job.
pub type Ticket = u64;

/// Worker lifecycle errors.
#[derive(Debug)]
pub enum WorkerError {
    Spawn(io::Error),
    /// The worker thread has exited and accepts no more jobs.
    Disconnected,
}

impl Display for WorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn note worker: {err}"),
            Self::Disconnected => write!(f, "note worker is no longer running"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Disconnected => None,
        }
    }
}

enum Job {
    Load { ticket: Ticket, note_id: NoteId },
    Persist { ticket: Ticket, note: Note, value: String },
}

/// Result of one finished job.
#[derive(Debug)]
pub enum Completion {
    Loaded {
        ticket: Ticket,
        result: RepoResult<Option<Note>>,
    },
    Persisted {
        ticket: Ticket,
        result: RepoResult<()>,
    },
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Loaded { ticket, .. } | Self::Persisted { ticket, .. } => *ticket,
        }
    }
}

/// Single background thread serving one checklist session.
pub struct NoteWorker {
    jobs: Option<Sender<Job>>,
    completions: Receiver<Completion>,
    next_ticket: Ticket,
    handle: Option<JoinHandle<()>>,
}

impl NoteWorker {
    /// Starts the worker thread over `repo`.
    pub fn spawn(repo: Arc<dyn NoteRepository>) -> Result<Self, WorkerError> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<Completion>();

        let handle = thread::Builder::new()
            .name("checklist-note-worker".to_string())
            .spawn(move || run_jobs(repo.as_ref(), job_rx, done_tx))
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
            next_ticket: 1,
            handle: Some(handle),
        })
    }

    /// Queues a note lookup.
    pub fn submit_load(&mut self, note_id: NoteId) -> Result<Ticket, WorkerError> {
        let ticket = self.allocate_ticket();
        self.send(Job::Load { ticket, note_id })?;
        Ok(ticket)
    }

    /// Queues a stored-value write for `note`.
    pub fn submit_persist(&mut self, note: Note, value: String) -> Result<Ticket, WorkerError> {
        let ticket = self.allocate_ticket();
        self.send(Job::Persist {
            ticket,
            note,
            value,
        })?;
        Ok(ticket)
    }

    /// Returns a finished job without blocking.
    pub fn try_completion(&self) -> Result<Option<Completion>, WorkerError> {
        match self.completions.try_recv() {
            Ok(completion) => Ok(Some(completion)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Blocks until the next job finishes.
    pub fn wait_completion(&self) -> Result<Completion, WorkerError> {
        self.completions
            .recv()
            .map_err(|_| WorkerError::Disconnected)
    }

    fn allocate_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn send(&self, job: Job) -> Result<(), WorkerError> {
        self.jobs
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(job)
            .map_err(|_| WorkerError::Disconnected)
    }
}

impl Drop for NoteWorker {
    fn drop(&mut self) {
        // Closing the job channel lets the thread finish queued writes and exit.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=note_worker_stop module=service status=error reason=worker_panicked");
            }
        }
    }
}

fn run_jobs(repo: &dyn NoteRepository, jobs: Receiver<Job>, done: Sender<Completion>) {
    for job in jobs {
        let started_at = Instant::now();
        let completion = match job {
            Job::Load { ticket, note_id } => {
                let result = repo.get_note_by_id(note_id);
                debug!(
                    "event=note_load module=service status={} note_id={} duration_ms={}",
                    if result.is_ok() { "ok" } else { "error" },
                    note_id,
                    started_at.elapsed().as_millis()
                );
                Completion::Loaded { ticket, result }
            }
            Job::Persist {
                ticket,
                note,
                value,
            } => {
                let result = repo.persist_note_value(&note, &value);
                debug!(
                    "event=note_persist module=service status={} note_id={} bytes={} duration_ms={}",
                    if result.is_ok() { "ok" } else { "error" },
                    note.id,
                    value.len(),
                    started_at.elapsed().as_millis()
                );
                Completion::Persisted { ticket, result }
            }
        };

        // The session may be gone; the write already happened either way.
        let _ = done.send(completion);
    }
}
