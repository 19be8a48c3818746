//! Real-time train tracker.
//!
//! Polls the Digitraffic GTFS-Realtime train location feed, normalizes the
//! vehicle positions into [`Train`](models::Train) records and serves the
//! latest snapshot for list/map front ends, with id search.

pub mod api;
pub mod config;
pub mod error;
pub mod gtfs_realtime;
pub mod models;
pub mod normalize;
pub mod rate_limit;
pub mod registry;
pub mod scheduler;
pub mod search;
pub mod tracker;

pub use api::{FeedClient, FeedSource};
pub use config::TrackerConfig;
pub use models::{CaptureLabel, CaptureStatus, Snapshot, Train};
pub use tracker::Tracker;
