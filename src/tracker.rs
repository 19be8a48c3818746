//! Query surface for front ends.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{FeedClient, FeedSource};
use crate::config::{SearchPolicy, TrackerConfig};
use crate::error::ConfigError;
use crate::models::{SharedSnapshot, Train};
use crate::registry::TrainRegistry;
use crate::scheduler::RefreshScheduler;
use crate::search::search_with;

/// Live train list: a refresh scheduler plus the registry it writes to.
///
/// Front ends pull from it; it never calls back into them.
pub struct Tracker<S = FeedClient> {
    scheduler: RefreshScheduler<S>,
    search: SearchPolicy,
}

impl Tracker<FeedClient> {
    /// Tracker polling the configured upstream feed.
    pub fn new(config: &TrackerConfig) -> Result<Self, ConfigError> {
        let client = FeedClient::new(&config.feed)?;
        Ok(Self::with_source(client, config))
    }
}

impl<S: FeedSource + 'static> Tracker<S> {
    pub fn with_source(source: S, config: &TrackerConfig) -> Self {
        Self {
            scheduler: RefreshScheduler::new(source, TrainRegistry::new(), config.refresh_interval),
            search: config.search,
        }
    }

    pub fn get_snapshot(&self) -> SharedSnapshot {
        self.scheduler.registry().current()
    }

    /// Trains in the current snapshot matching `text`, ordered by id.
    pub fn search(&self, text: &str) -> Vec<Train> {
        let snapshot = self.get_snapshot();
        search_with(&self.search, &snapshot.trains, text)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run a cycle now, queued behind any cycle already in flight.
    pub async fn refresh_now(&self) -> SharedSnapshot {
        self.scheduler.refresh().await
    }

    pub fn subscribe(&self) -> watch::Receiver<SharedSnapshot> {
        self.scheduler.registry().subscribe()
    }

    pub fn spawn_periodic(&self) -> JoinHandle<()> {
        self.scheduler.spawn_periodic()
    }
}
