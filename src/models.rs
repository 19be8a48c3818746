use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Identifier used when the feed carries no vehicle descriptor id.
pub const UNKNOWN_TRAIN_ID: &str = "Unknown";

/// A single train's latest known position and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    /// Vehicle identifier (train number), `"Unknown"` if the feed omits it
    pub id: String,

    /// Current latitude
    pub latitude: f64,

    /// Current longitude
    pub longitude: f64,

    /// Speed in kilometers per hour; `None` means unknown, not stationary
    pub speed_kmh: Option<f64>,

    /// When the vehicle reported this position
    pub timestamp: Option<DateTime<Utc>>,

    /// Trip ID from GTFS
    pub trip_id: Option<String>,

    /// Route ID from GTFS
    pub route_id: Option<String>,
}

impl Train {
    /// Create a train at a position with every optional field absent
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            speed_kmh: None,
            timestamp: None,
            trip_id: None,
            route_id: None,
        }
    }

    /// A train counts as moving only when it reports a positive speed.
    pub fn is_moving(&self) -> bool {
        self.speed_kmh.is_some_and(|s| s > 0.0)
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Train {}", self.id)?;
        match self.speed_kmh {
            Some(speed) => write!(f, "  {:.1} km/h", speed)?,
            None => write!(f, "  N/A")?,
        }
        write!(
            f,
            "  {}  {:.4}, {:.4}",
            if self.is_moving() { "Moving" } else { "Stopped" },
            self.latitude,
            self.longitude
        )?;
        if let Some(route) = &self.route_id {
            write!(f, "  route {}", route)?;
        }
        Ok(())
    }
}

/// How a snapshot was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    Ok,
    /// Upstream answered with a non-200 status
    HttpStatus(u16),
    Connection,
    Timeout,
    Api,
    Request,
    Error,
}

/// Time-of-day stamp of a fetch cycle, annotated with its failure category.
///
/// Renders as `HH:MM:SS` on success and e.g. `HH:MM:SS (Error: 503)` or
/// `HH:MM:SS (Timeout)` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLabel {
    pub time: NaiveTime,
    pub status: CaptureStatus,
}

impl CaptureLabel {
    pub fn new(time: NaiveTime, status: CaptureStatus) -> Self {
        Self { time, status }
    }

    /// Label stamped with the current local time of day
    pub fn now(status: CaptureStatus) -> Self {
        Self::new(Local::now().time(), status)
    }

    pub fn is_error(&self) -> bool {
        self.status != CaptureStatus::Ok
    }
}

impl fmt::Display for CaptureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S"))?;
        match self.status {
            CaptureStatus::Ok => Ok(()),
            CaptureStatus::HttpStatus(code) => write!(f, " (Error: {})", code),
            CaptureStatus::Connection => write!(f, " (Connection Error)"),
            CaptureStatus::Timeout => write!(f, " (Timeout)"),
            CaptureStatus::Api => write!(f, " (API Error)"),
            CaptureStatus::Request => write!(f, " (Request Error)"),
            CaptureStatus::Error => write!(f, " (Error)"),
        }
    }
}

impl Serialize for CaptureLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The complete set of trains from one fetch cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub trains: Vec<Train>,
    pub label: CaptureLabel,
}

impl Snapshot {
    pub fn new(trains: Vec<Train>, label: CaptureLabel) -> Self {
        Self { trains, label }
    }

    /// Snapshot with no trains, e.g. before the first fetch
    pub fn empty(label: CaptureLabel) -> Self {
        Self::new(Vec::new(), label)
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    pub fn moving_count(&self) -> usize {
        self.trains.iter().filter(|t| t.is_moving()).count()
    }
}

/// Shared handle to a committed snapshot
pub type SharedSnapshot = Arc<Snapshot>;
