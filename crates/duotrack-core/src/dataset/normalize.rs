//! Dataset normalizer
//!
//! Turns loosely typed JSON records into a [`Dataset`]. Normalization is
//! non-destructive: it only borrows the caller's records and builds new owned
//! samples.
//!
//! Field names follow the processing backend's output (`track_a.speeds.vertical`,
//! `comparison.height_diff`, ...) and also accept flat/camelCase spellings.
//! Anything missing, null, non-numeric or non-finite becomes `None`.

use serde_json::{Map, Value};

use super::timestamp::{parse_time_label, SYNTHETIC_SPACING_MS};
use super::Dataset;
use crate::types::{meters_to_feet, Sample, TrackPoint};

type Record = Map<String, Value>;

/// Normalize raw records into a time-ordered dataset
///
/// Timestamps are resolved as follows:
/// - If no record carries a usable `timestamp`, each sample gets its parsed
///   `time` field, or `index * 100` ms when that is missing or unparseable.
/// - Otherwise records lacking a timestamp use their parsed `time` field,
///   falling back to the previous resolved timestamp (or the first known one
///   for leading records).
///
/// Empty or non-sequence input yields an empty dataset.
pub fn normalize(raw: &Value) -> Dataset {
    let Some(records) = records_of(raw) else {
        log::warn!("normalize: Input is not a sequence of records, using empty dataset");
        return Dataset::empty();
    };

    if records.is_empty() {
        log::warn!("normalize: Input has no records, using empty dataset");
        return Dataset::empty();
    }

    let explicit: Vec<Option<i64>> = records
        .iter()
        .map(|r| r.as_object().and_then(|o| number(o.get("timestamp"))).map(round_ms))
        .collect();
    let labels: Vec<Option<String>> = records
        .iter()
        .map(|r| {
            r.as_object()
                .and_then(|o| o.get("time"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .collect();

    let timestamps = resolve_timestamps(&explicit, &labels);

    let samples: Vec<Sample> = records
        .iter()
        .zip(timestamps)
        .zip(labels)
        .map(|((record, timestamp_ms), time_label)| match record.as_object() {
            Some(obj) => sample_from(obj, timestamp_ms, time_label),
            None => {
                log::debug!("normalize: Non-object record at {}ms, all fields absent", timestamp_ms);
                Sample {
                    time_label,
                    ..Sample::empty(timestamp_ms)
                }
            }
        })
        .collect();

    log::info!("normalize: {} samples normalized", samples.len());
    Dataset::from_samples(samples)
}

/// Accept a bare array, an index-keyed object, or a processing response
fn records_of(raw: &Value) -> Option<Vec<&Value>> {
    match raw {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(obj) => match obj.get("visualization_data") {
            Some(inner) => records_of(inner),
            None if !obj.is_empty() && obj.keys().all(|k| k.parse::<usize>().is_ok()) => {
                let mut keyed: Vec<(usize, &Value)> = obj
                    .iter()
                    .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                    .collect();
                keyed.sort_by_key(|(i, _)| *i);
                Some(keyed.into_iter().map(|(_, v)| v).collect())
            }
            None => None,
        },
        _ => None,
    }
}

fn resolve_timestamps(explicit: &[Option<i64>], labels: &[Option<String>]) -> Vec<i64> {
    let parsed = |i: usize| labels[i].as_deref().and_then(parse_time_label);

    if explicit.iter().all(Option::is_none) {
        log::info!("normalize: No timestamps found, synthesizing from time fields");
        return (0..explicit.len())
            .map(|i| parsed(i).unwrap_or(i as i64 * SYNTHETIC_SPACING_MS))
            .collect();
    }

    let first_known = explicit.iter().flatten().copied().next().unwrap_or(0);
    let mut previous: Option<i64> = None;
    explicit
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            let resolved = ts
                .or_else(|| parsed(i))
                .or(previous)
                .unwrap_or(first_known);
            previous = Some(resolved);
            resolved
        })
        .collect()
}

fn sample_from(obj: &Record, timestamp_ms: i64, time_label: Option<String>) -> Sample {
    let track_a = track_from(field(obj, &["track_a", "trackA"]));
    let track_b = track_from(field(obj, &["track_b", "trackB"]));

    let distance_3d = number(field(obj, &["distance_3d", "distance3D", "distance3d"]))
        .or_else(|| number(nested(obj, "comparison", "distance_3d")));

    let altitude_difference = number(field(obj, &["altitude_difference", "altitudeDifference"]))
        .or_else(|| number(nested(obj, "comparison", "height_diff")))
        .or_else(|| {
            let a = track_a.as_ref()?.altitude?;
            let b = track_b.as_ref()?.altitude?;
            Some(a - b)
        });
    let altitude_difference_ft =
        number(field(obj, &["altitude_difference_ft", "altitudeDifferenceFt"]))
            .or_else(|| number(nested(obj, "comparison", "height_diff_ft")))
            .or_else(|| altitude_difference.map(meters_to_feet));

    Sample {
        timestamp_ms,
        time_label,
        track_a,
        track_b,
        distance_3d,
        altitude_difference,
        altitude_difference_ft,
    }
}

fn track_from(value: Option<&Value>) -> Option<TrackPoint> {
    let obj = value?.as_object()?;
    let altitude = number(field(obj, &["altitude", "ele"]));
    Some(TrackPoint {
        lat: number(field(obj, &["lat", "latitude"])),
        lon: number(field(obj, &["lon", "lng", "longitude"])),
        altitude,
        altitude_ft: number(field(obj, &["altitude_ft", "altitudeFt", "ele_ft"]))
            .or_else(|| altitude.map(meters_to_feet)),
        vertical_speed: number(field(obj, &["vertical_speed", "verticalSpeed"]))
            .or_else(|| number(nested(obj, "speeds", "vertical"))),
        horizontal_speed: number(field(obj, &["horizontal_speed", "horizontalSpeed"]))
            .or_else(|| number(nested(obj, "speeds", "horizontal"))),
        speed_3d: number(field(obj, &["speed_3d", "speed3D", "speed3d"]))
            .or_else(|| number(nested(obj, "speeds", "speed_3d"))),
        vertical_accel: number(field(obj, &["vertical_accel", "verticalAccel"]))
            .or_else(|| number(nested(obj, "accelerations", "vertical"))),
        horizontal_accel: number(field(obj, &["horizontal_accel", "horizontalAccel"]))
            .or_else(|| number(nested(obj, "accelerations", "horizontal"))),
        accel_3d: number(field(obj, &["accel_3d", "accel3D", "accel3d"]))
            .or_else(|| number(nested(obj, "accelerations", "accel_3d"))),
    })
}

/// First present, non-null value among `names`
fn field<'a>(obj: &'a Record, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn nested<'a>(obj: &'a Record, group: &str, name: &str) -> Option<&'a Value> {
    obj.get(group)?.as_object()?.get(name)
}

/// Finite number from a JSON number or numeric string
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn round_ms(ms: f64) -> i64 {
    ms.round() as i64
}
