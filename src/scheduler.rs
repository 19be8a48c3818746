//! Fetch → normalize → store cycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::FeedSource;
use crate::models::{SharedSnapshot, Snapshot};
use crate::normalize::normalize_all;
use crate::registry::TrainRegistry;

/// Runs refresh cycles one at a time.
///
/// Periodic ticks and manual triggers share one cycle lock: a trigger that
/// arrives while a cycle is in flight waits for it and then runs its own,
/// so fetches never overlap and snapshots are committed in order.
pub struct RefreshScheduler<S> {
    source: Arc<S>,
    registry: TrainRegistry,
    cycle: Arc<Mutex<()>>,
    period: Duration,
}

impl<S> Clone for RefreshScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            registry: self.registry.clone(),
            cycle: Arc::clone(&self.cycle),
            period: self.period,
        }
    }
}

impl<S: FeedSource + 'static> RefreshScheduler<S> {
    pub fn new(source: S, registry: TrainRegistry, period: Duration) -> Self {
        Self {
            source: Arc::new(source),
            registry,
            cycle: Arc::new(Mutex::new(())),
            period,
        }
    }

    pub fn registry(&self) -> &TrainRegistry {
        &self.registry
    }

    /// Run one full cycle and return the snapshot it committed.
    pub async fn refresh(&self) -> SharedSnapshot {
        let _cycle = self.cycle.lock().await;

        let (records, label) = self.source.fetch().await;
        let trains = normalize_all(&records);

        tracing::info!(
            trains = trains.len(),
            records = records.len(),
            label = %label,
            "Refresh cycle complete"
        );

        self.registry.replace(Snapshot::new(trains, label))
    }

    /// Refresh every `period`, starting immediately.
    pub fn spawn_periodic(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                period_secs = scheduler.period.as_secs(),
                "Starting polling loop"
            );

            loop {
                interval.tick().await;
                scheduler.refresh().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FeedSource;
    use crate::gtfs_realtime::{Position, VehicleDescriptor, VehiclePosition};
    use crate::models::{CaptureLabel, CaptureStatus};
    use crate::normalize::RawVehicleRecord;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    fn vehicle(id: &str, with_position: bool) -> RawVehicleRecord {
        VehiclePosition {
            vehicle: Some(VehicleDescriptor {
                id: Some(id.to_string()),
                ..Default::default()
            }),
            position: with_position.then(|| Position {
                latitude: 60.0,
                longitude: 24.0,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Scripted source that takes `latency` per fetch and records overlap.
    struct ScriptedSource {
        responses: StdMutex<VecDeque<(Vec<RawVehicleRecord>, CaptureStatus)>>,
        latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        started: StdMutex<Vec<Instant>>,
    }

    impl ScriptedSource {
        fn new(latency: Duration, responses: Vec<(Vec<RawVehicleRecord>, CaptureStatus)>) -> Self {
            Self {
                responses: StdMutex::new(responses.into()),
                latency,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                started: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        async fn fetch(&self) -> (Vec<RawVehicleRecord>, CaptureLabel) {
            self.started.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let (records, status) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Vec::new(), CaptureStatus::Ok));
            (records, CaptureLabel::now(status))
        }
    }

    fn scheduler(source: ScriptedSource) -> RefreshScheduler<ScriptedSource> {
        RefreshScheduler::new(source, TrainRegistry::new(), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_normalizes_and_stores() {
        let sched = scheduler(ScriptedSource::new(
            Duration::from_millis(100),
            vec![(
                vec![vehicle("9", true), vehicle("ghost", false), vehicle("149", true)],
                CaptureStatus::Ok,
            )],
        ));

        let snapshot = sched.refresh().await;
        let ids: Vec<_> = snapshot.trains.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "149"]);
        assert_eq!(sched.registry().current(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_replaces_previous_trains() {
        let sched = scheduler(ScriptedSource::new(
            Duration::from_millis(10),
            vec![
                (vec![vehicle("1", true), vehicle("2", true)], CaptureStatus::Ok),
                (Vec::new(), CaptureStatus::HttpStatus(503)),
            ],
        ));

        assert_eq!(sched.refresh().await.len(), 2);
        let failed = sched.refresh().await;
        assert!(failed.is_empty());
        assert!(failed.label.to_string().contains("503"));
        assert!(sched.registry().current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_triggers_are_serialized() {
        let latency = Duration::from_secs(2);
        let sched = scheduler(ScriptedSource::new(latency, Vec::new()));

        let a = sched.clone();
        let b = sched.clone();
        let (first, second) = tokio::join!(a.refresh(), b.refresh());
        assert!(!Arc::ptr_eq(&first, &second));

        let source = &sched.source;
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        let started = source.started.lock().unwrap().clone();
        assert_eq!(started.len(), 2);
        assert!(started[1] - started[0] >= latency);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_loop_fires_immediately_then_every_period() {
        let sched = scheduler(ScriptedSource::new(Duration::from_millis(10), Vec::new()));
        let handle = sched.spawn_periodic();

        tokio::time::sleep(Duration::from_secs(65)).await;
        handle.abort();

        // Ticks at 0s, 30s and 60s.
        assert_eq!(sched.source.started.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_wait_for_a_cycle() {
        let sched = scheduler(ScriptedSource::new(
            Duration::from_secs(10),
            vec![(vec![vehicle("5", true)], CaptureStatus::Ok)],
        ));
        let registry = sched.registry().clone();

        let background = sched.clone();
        let cycle = tokio::spawn(async move { background.refresh().await });
        tokio::task::yield_now().await;

        // Mid-cycle the previous (empty) snapshot is still served.
        assert!(registry.current().is_empty());

        cycle.await.unwrap();
        assert_eq!(registry.current().trains[0].id, "5");
    }
}
