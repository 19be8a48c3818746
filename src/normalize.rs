//! Raw GTFS-RT vehicle records to [`Train`]s.

use chrono::{DateTime, Utc};

use crate::gtfs_realtime::VehiclePosition;
use crate::models::{Train, UNKNOWN_TRAIN_ID};

/// A vehicle position exactly as decoded from the feed.
pub type RawVehicleRecord = VehiclePosition;

const MPS_TO_KMH: f64 = 3.6;

/// Convert one raw record, or `None` when it has no usable position.
pub fn normalize(raw: &RawVehicleRecord) -> Option<Train> {
    let position = raw.position.as_ref()?;
    let latitude = f64::from(position.latitude);
    let longitude = f64::from(position.longitude);
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }

    let id = raw
        .vehicle
        .as_ref()
        .and_then(|v| v.id.clone())
        .unwrap_or_else(|| UNKNOWN_TRAIN_ID.to_string());

    let speed_kmh = position.speed.map(|mps| f64::from(mps) * MPS_TO_KMH);

    let timestamp = raw
        .timestamp
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    let (trip_id, route_id) = match &raw.trip {
        Some(trip) => (trip.trip_id.clone(), trip.route_id.clone()),
        None => (None, None),
    };

    Some(Train {
        id,
        latitude,
        longitude,
        speed_kmh,
        timestamp,
        trip_id,
        route_id,
    })
}

/// Normalize a batch, dropping records without position and keeping order.
pub fn normalize_all(records: &[RawVehicleRecord]) -> Vec<Train> {
    let trains: Vec<Train> = records.iter().filter_map(normalize).collect();

    let skipped = records.len() - trains.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Dropped vehicle records without position");
    }

    trains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_realtime::{Position, TripDescriptor, VehicleDescriptor};
    use proptest::prelude::*;

    fn record(id: Option<&str>, position: Option<(f32, f32)>) -> RawVehicleRecord {
        RawVehicleRecord {
            vehicle: id.map(|id| VehicleDescriptor {
                id: Some(id.to_string()),
                ..Default::default()
            }),
            position: position.map(|(latitude, longitude)| Position {
                latitude,
                longitude,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn drops_record_without_position() {
        assert_eq!(normalize(&record(Some("8"), None)), None);
    }

    #[test]
    fn drops_non_finite_coordinates() {
        assert_eq!(normalize(&record(Some("8"), Some((f32::NAN, 24.0)))), None);
        assert_eq!(normalize(&record(Some("8"), Some((60.0, f32::INFINITY)))), None);
    }

    #[test]
    fn minimal_record() {
        let train = normalize(&record(None, Some((60.5, 24.25)))).unwrap();
        assert_eq!(train.id, "Unknown");
        assert_eq!(train.latitude, 60.5);
        assert_eq!(train.longitude, 24.25);
        assert_eq!(train.speed_kmh, None);
        assert_eq!(train.timestamp, None);
        assert_eq!(train.trip_id, None);
        assert_eq!(train.route_id, None);
    }

    #[test]
    fn vehicle_without_id_is_unknown() {
        let mut raw = record(None, Some((60.0, 24.0)));
        raw.vehicle = Some(VehicleDescriptor {
            label: Some("IC 27".to_string()),
            ..Default::default()
        });
        assert_eq!(normalize(&raw).unwrap().id, "Unknown");
    }

    #[test]
    fn full_record() {
        let mut raw = record(Some("27"), Some((61.5, 23.75)));
        raw.position.as_mut().unwrap().speed = Some(10.0);
        raw.timestamp = Some(1_700_000_000);
        raw.trip = Some(TripDescriptor {
            trip_id: Some("27_20231114".to_string()),
            route_id: Some("IC".to_string()),
            ..Default::default()
        });

        let train = normalize(&raw).unwrap();
        assert_eq!(train.id, "27");
        assert_eq!(train.speed_kmh, Some(36.0));
        assert_eq!(
            train.timestamp,
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
        );
        assert_eq!(train.trip_id.as_deref(), Some("27_20231114"));
        assert_eq!(train.route_id.as_deref(), Some("IC"));
    }

    #[test]
    fn zero_speed_is_kept() {
        let mut raw = record(Some("1"), Some((60.0, 24.0)));
        raw.position.as_mut().unwrap().speed = Some(0.0);
        assert_eq!(normalize(&raw).unwrap().speed_kmh, Some(0.0));
    }

    #[test]
    fn trip_fields_are_independent() {
        let mut raw = record(Some("1"), Some((60.0, 24.0)));
        raw.trip = Some(TripDescriptor {
            route_id: Some("Z".to_string()),
            ..Default::default()
        });
        let train = normalize(&raw).unwrap();
        assert_eq!(train.trip_id, None);
        assert_eq!(train.route_id.as_deref(), Some("Z"));
    }

    #[test]
    fn out_of_range_timestamp_is_absent() {
        let mut raw = record(Some("1"), Some((60.0, 24.0)));
        raw.timestamp = Some(u64::MAX);
        assert_eq!(normalize(&raw).unwrap().timestamp, None);
    }

    #[test]
    fn normalize_all_keeps_order() {
        let records = vec![
            record(Some("3"), Some((60.0, 24.0))),
            record(Some("skip"), None),
            record(Some("1"), Some((61.0, 25.0))),
        ];
        let ids: Vec<_> = normalize_all(&records).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    proptest! {
        #[test]
        fn speed_converted_or_absent(speed in proptest::option::of(0.0f32..100.0)) {
            let mut raw = record(Some("1"), Some((60.0, 24.0)));
            raw.position.as_mut().unwrap().speed = speed;
            let train = normalize(&raw).unwrap();
            prop_assert_eq!(train.speed_kmh, speed.map(|s| f64::from(s) * 3.6));
        }

        #[test]
        fn positionless_records_never_survive(
            entries in proptest::collection::vec(proptest::bool::ANY, 0..20)
        ) {
            let records: Vec<_> = entries
                .iter()
                .map(|has_pos| record(Some("x"), has_pos.then_some((60.0, 24.0))))
                .collect();
            let expected = entries.iter().filter(|b| **b).count();
            prop_assert_eq!(normalize_all(&records).len(), expected);
        }
    }
}
