//! Sandboxed execution of preview documents.
//!
//! The [`Executor`] owns an [`IsolationBoundary`] and drives it:
//! - every render replaces the whole isolated context with a fresh document
//! - every render attempt gets a new [`Generation`], failed ones included
//! - diagnostics flow one way, boundary -> host, through an [`Outbox`]
//! - a failed replacement leaves the previous preview in place and is
//!   reported as [`PreviewStatus::Failed`]
//!
//! Boundaries:
//! - [`ProcessBoundary`]: a runner process per render, cleared environment,
//!   fresh scratch directory, relay messages read from its stdout
//! - [`SnapshotBoundary`]: an atomically replaced file on disk

mod process;
mod snapshot;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

pub use process::ProcessBoundary;
pub use snapshot::SnapshotBoundary;

use crate::compose::RenderDocument;
use crate::diagnostics::{DiagnosticEvent, DiagnosticLog, Envelope, Generation, RelayMessage};

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("runner command is empty")]
    EmptyCommand,
    #[error("failed to start runner `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to hand document to runner: {0}")]
    Deliver(#[source] io::Error),
    #[error("failed to prepare scratch directory {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write preview {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sending half of the diagnostic relay, stamped with one generation.
#[derive(Debug, Clone)]
pub struct Outbox {
    generation: Generation,
    tx: Sender<Envelope>,
}

impl Outbox {
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Post a message to the host. Returns false once the host is gone.
    pub fn post(&self, message: RelayMessage) -> bool {
        self.tx
            .send(Envelope {
                generation: self.generation,
                message,
            })
            .is_ok()
    }
}

/// Capability to run a document isolated from the host.
///
/// Implementations must share no mutable state with the host, emit
/// diagnostics only through the [`Outbox`], and replace the whole context
/// on every call to [`replace`](Self::replace).
pub trait IsolationBoundary {
    /// Swap in a fresh context running `document`, discarding the old one.
    ///
    /// On error the previous context must still be in place.
    ///
    /// # Errors
    /// Returns an error if the new context could not be created.
    fn replace(&mut self, document: &RenderDocument, outbox: Outbox) -> Result<(), BoundaryError>;

    /// Discard the current context, if any.
    fn shutdown(&mut self) {}

    /// Short human-readable description for the status bar.
    fn describe(&self) -> String;
}

impl<B: IsolationBoundary + ?Sized> IsolationBoundary for Box<B> {
    fn replace(&mut self, document: &RenderDocument, outbox: Outbox) -> Result<(), BoundaryError> {
        (**self).replace(document, outbox)
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Nothing rendered yet.
    Idle,
    /// The given generation is live.
    Live { generation: Generation },
    /// The last update failed; `last_good` is still showing, if any.
    Failed {
        message: String,
        last_good: Option<Generation>,
    },
}

impl PreviewStatus {
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

type DiagnosticHandler = Box<dyn FnMut(&DiagnosticEvent)>;

/// Drives an isolation boundary and collects what it relays back.
pub struct Executor<B: IsolationBoundary> {
    boundary: B,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    generation: Generation,
    live: Option<Generation>,
    status: PreviewStatus,
    log: DiagnosticLog,
    handlers: Vec<DiagnosticHandler>,
}

impl<B: IsolationBoundary> std::fmt::Debug for Executor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("boundary", &self.boundary.describe())
            .field("generation", &self.generation)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<B: IsolationBoundary> Executor<B> {
    pub fn new(boundary: B, log_cap: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            boundary,
            tx,
            rx,
            generation: 0,
            live: None,
            status: PreviewStatus::Idle,
            log: DiagnosticLog::new(log_cap),
            handlers: Vec::new(),
        }
    }

    /// Replace the isolated context with `document`.
    ///
    /// Never fails outward: a boundary error becomes
    /// [`PreviewStatus::Failed`] and the previous preview stays up.
    pub fn render(&mut self, document: &RenderDocument) -> &PreviewStatus {
        let _scope = crate::perf::scope("executor.render");
        let next = self.generation + 1;
        // Every attempt consumes its id, so output from a failed attempt can
        // never pass for the next live context.
        self.generation = next;
        self.log.begin_generation(next);
        let outbox = Outbox {
            generation: next,
            tx: self.tx.clone(),
        };
        match self.boundary.replace(document, outbox) {
            Ok(()) => {
                self.live = Some(next);
                self.status = PreviewStatus::Live { generation: next };
                tracing::debug!(generation = next, bytes = document.len(), "preview replaced");
                crate::perf::log_event(
                    "executor.render",
                    format!("generation={next} bytes={}", document.len()),
                );
            }
            Err(err) => {
                tracing::warn!(generation = next, error = %err, "preview failed to update");
                crate::perf::log_event("executor.render.error", format!("generation={next} {err}"));
                self.status = PreviewStatus::Failed {
                    message: err.to_string(),
                    last_good: self.live,
                };
            }
        }
        &self.status
    }

    /// Register a handler called for every diagnostic drained by
    /// [`pump`](Self::pump), stale ones included.
    pub fn on_diagnostic(&mut self, handler: impl FnMut(&DiagnosticEvent) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn clear_diagnostics(&mut self) {
        self.log.clear();
    }

    /// Move every relayed message into the log. Returns how many arrived.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            let event = self.log.push(envelope);
            for handler in &mut self.handlers {
                handler(event);
            }
            count += 1;
        }
        count
    }

    pub const fn status(&self) -> &PreviewStatus {
        &self.status
    }

    /// Most recent generation handed out, zero before the first render.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Generation of the context currently showing, if any.
    pub const fn live(&self) -> Option<Generation> {
        self.live
    }

    pub const fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub const fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn describe(&self) -> String {
        self.boundary.describe()
    }
}

impl<B: IsolationBoundary> Drop for Executor<B> {
    fn drop(&mut self) {
        self.boundary.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Shared view into what a [`FakeBoundary`] received.
    #[derive(Debug, Default)]
    pub struct FakeState {
        pub documents: Vec<String>,
        pub outboxes: Vec<Outbox>,
        pub fail_next: bool,
        pub shutdowns: usize,
    }

    /// In-memory boundary that records documents and hands out outboxes.
    #[derive(Debug, Clone, Default)]
    pub struct FakeBoundary {
        pub state: Rc<RefCell<FakeState>>,
    }

    impl FakeBoundary {
        pub fn emit(&self, index: usize, message: RelayMessage) {
            let state = self.state.borrow();
            state.outboxes[index].post(message);
        }
    }

    impl IsolationBoundary for FakeBoundary {
        fn replace(
            &mut self,
            document: &RenderDocument,
            outbox: Outbox,
        ) -> Result<(), BoundaryError> {
            let mut state = self.state.borrow_mut();
            if state.fail_next {
                state.fail_next = false;
                return Err(BoundaryError::Deliver(io::Error::other("fake failure")));
            }
            state.documents.push(document.as_str().to_string());
            state.outboxes.push(outbox);
            Ok(())
        }

        fn shutdown(&mut self) {
            self.state.borrow_mut().shutdowns += 1;
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }
}
