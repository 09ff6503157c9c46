//! Review loading lifecycle.
//!
//! [`LoadMachine`] is the synchronous state machine: it decides when a fetch
//! is issued and whether a completion still belongs to the active subject.
//! [`ReviewLoader`] drives it on tokio against a [`ReviewSource`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::{Review, SubjectId};
use crate::source::ReviewSource;

pub const NO_RUNTIME_MESSAGE: &str = "no async runtime available to fetch reviews";

/// The one visible state of a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Failed { message: String },
    Loaded { reviews: Vec<Review> },
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

/// Identity of one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    subject: SubjectId,
    epoch: u64,
}

impl FetchTicket {
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Synchronous loader state machine
#[derive(Debug)]
pub struct LoadMachine {
    active: Option<FetchTicket>,
    state: LoadState,
    next_epoch: u64,
}

impl Default for LoadMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadMachine {
    pub fn new() -> Self {
        Self {
            active: None,
            state: LoadState::Loading,
            next_epoch: 0,
        }
    }

    /// Observe a subject. Returns a ticket when a fetch must be issued.
    ///
    /// Re-observing the active subject is a no-op, whether its fetch is
    /// still outstanding or already settled.
    pub fn start(&mut self, subject: SubjectId) -> Option<FetchTicket> {
        if self.active.as_ref().map(FetchTicket::subject) == Some(&subject) {
            return None;
        }

        self.next_epoch += 1;
        let ticket = FetchTicket {
            subject,
            epoch: self.next_epoch,
        };
        self.active = Some(ticket.clone());
        self.state = LoadState::Loading;

        Some(ticket)
    }

    /// Apply a successful fetch. Returns false when the ticket is stale.
    pub fn on_success(&mut self, ticket: &FetchTicket, reviews: Vec<Review>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = LoadState::Loaded { reviews };
        true
    }

    /// Apply a failed fetch. Returns false when the ticket is stale.
    pub fn on_error(&mut self, ticket: &FetchTicket, error: &FetchError) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = LoadState::Failed {
            message: error.user_message(),
        };
        true
    }

    fn accepts(&self, ticket: &FetchTicket) -> bool {
        // A settled subject only changes through `start`
        self.active.as_ref() == Some(ticket) && !self.state.is_terminal()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn subject(&self) -> Option<&SubjectId> {
        self.active.as_ref().map(FetchTicket::subject)
    }

    pub fn is_in_flight(&self) -> bool {
        self.active.is_some() && !self.state.is_terminal()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        LoaderSnapshot {
            subject: self.subject().cloned(),
            state: self.state.clone(),
        }
    }
}

/// State published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderSnapshot {
    pub subject: Option<SubjectId>,
    #[serde(flatten)]
    pub state: LoadState,
}

/// Outcome of [`ReviewLoader::load_in_sequence`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    /// Subjects as they stood when the next one replaced them
    pub superseded: Vec<LoaderSnapshot>,
    pub settled: LoaderSnapshot,
}

struct Shared {
    machine: Mutex<LoadMachine>,
    state_tx: watch::Sender<LoaderSnapshot>,
}

impl Shared {
    fn machine(&self) -> MutexGuard<'_, LoadMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, ticket: &FetchTicket, result: Result<Vec<Review>, FetchError>) {
        let mut machine = self.machine();

        let applied = match result {
            Ok(reviews) => {
                let count = reviews.len();
                let applied = machine.on_success(ticket, reviews);
                if applied {
                    info!(subject = %ticket.subject, count, "Reviews loaded");
                }
                applied
            }
            Err(err) => {
                let applied = machine.on_error(ticket, &err);
                if applied {
                    warn!(subject = %ticket.subject, error = %err, "Review fetch failed");
                }
                applied
            }
        };

        if applied {
            self.state_tx.send_replace(machine.snapshot());
        } else {
            debug!(subject = %ticket.subject, "Discarding stale review result");
        }
    }
}

/// Loads reviews for one subject at a time
pub struct ReviewLoader {
    source: Arc<dyn ReviewSource>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReviewLoader {
    pub fn new(source: Arc<dyn ReviewSource>) -> Self {
        let machine = LoadMachine::new();
        let (state_tx, _) = watch::channel(machine.snapshot());

        Self {
            source,
            shared: Arc::new(Shared {
                machine: Mutex::new(machine),
                state_tx,
            }),
            task: Mutex::new(None),
        }
    }

    /// Switch to `subject`, fetching its reviews unless it is already active.
    ///
    /// A fetch still running for a previous subject is aborted and its result
    /// discarded. Outside a tokio runtime the subject fails immediately.
    pub fn start(&self, subject: SubjectId) {
        // Held throughout so concurrent starts replace tasks in ticket order
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);

        let ticket = {
            let mut machine = self.shared.machine();
            let ticket = machine.start(subject.clone());
            if ticket.is_some() {
                self.shared.state_tx.send_replace(machine.snapshot());
            }
            ticket
        };

        let Some(ticket) = ticket else {
            debug!(subject = %subject, "Subject already active, not refetching");
            return;
        };

        info!(subject = %subject, source = self.source.name(), "Fetching reviews");

        let Ok(runtime) = Handle::try_current() else {
            self.shared.complete(
                &ticket,
                Err(FetchError::Unavailable(NO_RUNTIME_MESSAGE.to_string())),
            );
            if let Some(previous) = task.take() {
                previous.abort();
            }
            return;
        };

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let handle = runtime.spawn(async move {
            let result = source.fetch(ticket.subject()).await;
            shared.complete(&ticket, result);
        });

        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    pub fn state(&self) -> LoadState {
        self.shared.machine().state().clone()
    }

    pub fn subject(&self) -> Option<SubjectId> {
        self.shared.machine().subject().cloned()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        self.shared.machine().snapshot()
    }

    /// Stream of published snapshots
    pub fn subscribe(&self) -> watch::Receiver<LoaderSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// Start each subject in turn, each superseding the one before, and wait
    /// for the last to settle. Returns `None` for an empty list.
    pub async fn load_in_sequence(&self, subjects: Vec<SubjectId>) -> Option<SequenceReport> {
        let count = subjects.len();
        let mut superseded = Vec::with_capacity(count.saturating_sub(1));

        for (index, subject) in subjects.into_iter().enumerate() {
            self.start(subject.clone());

            if index + 1 < count {
                // Let the fetch begin before it is superseded
                tokio::task::yield_now().await;
                let snapshot = self.snapshot();
                info!(subject = %subject, state = ?snapshot.state, "Superseding subject");
                superseded.push(snapshot);
            }
        }

        if count == 0 {
            return None;
        }

        self.settled().await;

        Some(SequenceReport {
            superseded,
            settled: self.snapshot(),
        })
    }

    /// Wait until the active subject reaches `Failed` or `Loaded`.
    ///
    /// If the subject changes while waiting, waits for the new one. Never
    /// resolves if no subject has been started.
    pub async fn settled(&self) -> LoadState {
        let mut rx = self.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.state.is_terminal() {
                return snapshot.state;
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }
}

impl Drop for ReviewLoader {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}
