//! Registry of in-flight clone operations
//!
//! Tracks zero or more concurrently running clones, keeps the latest
//! progress snapshot per operation, and signals every state transition
//! to subscribers. Notifications carry no payload on purpose: a
//! subscriber re-reads [`CloneService::list`] and
//! [`CloneService::state_of`] for current data, so it can never act on a
//! stale copy delivered alongside the signal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::git::clone::{clone, CloneOptions};
use crate::models::{Operation, OperationKind, ProgressState};

/// Capacity of the notification channel. Signals are coalescable (they
/// carry nothing), so a lagging subscriber that misses some only needs
/// one more to reconcile.
const NOTIFY_CAPACITY: usize = 64;

/// Handle returned by [`CloneService::start`].
///
/// The service keeps tracking the operation regardless of what the
/// caller does with the handle; awaiting the task yields the final
/// outcome of the underlying git process.
pub struct CloneHandle {
    pub operation: Operation,
    pub task: JoinHandle<Result<()>>,
}

struct Inner {
    next_id: u64,
    operations: Vec<Operation>,
    states: HashMap<u64, ProgressState>,
}

/// Tracks the set of in-flight clone operations.
///
/// Cloning the service is cheap and every clone observes the same
/// registry. List and state map are mutated together under one lock, so
/// an observer woken by a notification always sees a consistent pair:
/// an operation either has a state entry or is not listed at all.
#[derive(Clone)]
pub struct CloneService {
    inner: Arc<Mutex<Inner>>,
    notifications: broadcast::Sender<()>,
    git_executable: Option<PathBuf>,
    network_args: Vec<String>,
    recurse_submodules: bool,
}

impl CloneService {
    pub fn new() -> Self {
        let (notifications, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                operations: Vec::new(),
                states: HashMap::new(),
            })),
            notifications,
            git_executable: None,
            network_args: Vec::new(),
            recurse_submodules: true,
        }
    }

    /// Use a specific git executable for operations started after this
    /// call, instead of resolving `git` on the PATH.
    pub fn with_git_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.git_executable = Some(path.into());
        self
    }

    /// Network-related base arguments (credential wiring and the like)
    /// passed to every started operation.
    pub fn with_network_args(mut self, args: Vec<String>) -> Self {
        self.network_args = args;
        self
    }

    pub fn with_recurse_submodules(mut self, recurse: bool) -> Self {
        self.recurse_submodules = recurse;
        self
    }

    /// Subscribe to change notifications.
    ///
    /// A signal means "something changed", nothing more; re-read
    /// `list()` and `state_of()` for the canonical state. Subscribers
    /// may come and go at any time.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notifications.subscribe()
    }

    /// Start cloning `url` into `target_path` and track it.
    ///
    /// Returns immediately; the clone runs on a spawned task. A failure
    /// of the underlying process is delivered through the handle's task,
    /// never through the notification channel, and the operation is
    /// removed from tracking either way.
    pub fn start(&self, url: &str, target_path: &Path) -> CloneHandle {
        let operation = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;

            let operation = Operation {
                id,
                target_path: target_path.to_path_buf(),
                kind: OperationKind::Clone {
                    remote_url: url.to_string(),
                },
            };
            inner.operations.push(operation.clone());
            // Seed with a synthetic first line so the UI has something
            // to show before git says anything.
            inner.states.insert(
                id,
                ProgressState::indeterminate(format!("Cloning into '{}'...", target_path.display())),
            );
            operation
        };
        self.notify();

        tracing::info!(id = operation.id, url, path = %target_path.display(), "starting clone");

        let service = self.clone();
        let id = operation.id;
        let url = url.to_string();
        let path = target_path.to_path_buf();
        let options = CloneOptions {
            network_args: self.network_args.clone(),
            recurse_submodules: self.recurse_submodules,
            git_executable: self.git_executable.clone(),
        };

        let task = tokio::spawn(async move {
            let result = clone(
                &url,
                &path,
                &options,
                Some(&mut |state: ProgressState| service.update_state(id, state)),
            )
            .await;

            match &result {
                Ok(()) => tracing::info!(id, "clone finished"),
                Err(err) => tracing::warn!(id, %err, "clone failed"),
            }
            // Tracking ends when the process settles, success or not.
            service.remove(id);
            result
        });

        CloneHandle { operation, task }
    }

    /// Snapshot of the currently tracked operations, insertion-ordered.
    pub fn list(&self) -> Vec<Operation> {
        self.lock().operations.clone()
    }

    /// Latest progress snapshot for an operation. `None` is a normal
    /// outcome for finished, removed, or never-seen ids, not an error.
    pub fn state_of(&self, id: u64) -> Option<ProgressState> {
        self.lock().states.get(&id).cloned()
    }

    /// Stop tracking an operation.
    ///
    /// Idempotent: removing an unknown or already-removed id is a no-op
    /// that still notifies, so subscribers can reconcile. This does not
    /// terminate the underlying git process, it only stops tracking it.
    pub fn remove(&self, id: u64) {
        {
            let mut inner = self.lock();
            inner.operations.retain(|op| op.id != id);
            inner.states.remove(&id);
        }
        self.notify();
    }

    fn update_state(&self, id: u64, state: ProgressState) {
        let replaced = {
            let mut inner = self.lock();
            match inner.states.get_mut(&id) {
                Some(slot) => {
                    *slot = state;
                    true
                }
                // Removed while the process was still producing output.
                None => false,
            }
        };
        if replaced {
            self.notify();
        }
    }

    fn notify(&self) {
        // No subscribers is fine.
        let _ = self.notifications.send(());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The lock is only held for plain field updates, never across an
        // await, so poisoning would mean a panic in this module itself.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CloneService {
    fn default() -> Self {
        Self::new()
    }
}
