//! Latest committed snapshot.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{CaptureLabel, CaptureStatus, SharedSnapshot, Snapshot};

/// Holds the current snapshot for any number of readers.
///
/// Writers swap in a whole new `Arc<Snapshot>`, so a reader sees either the
/// previous snapshot or the new one, never a mix. Reads take no lock that a
/// refresh cycle could hold.
#[derive(Clone)]
pub struct TrainRegistry {
    tx: Arc<watch::Sender<SharedSnapshot>>,
}

impl TrainRegistry {
    /// Registry holding an empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty(CaptureLabel::now(CaptureStatus::Ok)))
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current snapshot wholesale.
    pub fn replace(&self, snapshot: Snapshot) -> SharedSnapshot {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub fn current(&self) -> SharedSnapshot {
        Arc::clone(&self.tx.borrow())
    }

    /// Receiver that is notified after every replacement.
    pub fn subscribe(&self) -> watch::Receiver<SharedSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for TrainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
