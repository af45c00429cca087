use serde::Serialize;
use tracing::debug;

use crate::error::{NeoError, Result};
use crate::feed::{AsteroidRecord, RawFeedResponse};

/// Headline numbers for one feed response.
///
/// Each float is rounded to two decimals, half away from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_count: u64,
    /// Fastest first-approach relative velocity, km/h.
    pub max_speed: f64,
    /// Closest first-approach miss distance, km.
    pub min_distance: f64,
    /// Mean of the diameter midpoints over the declared count, km.
    pub avg_size: f64,
}

impl StatsSummary {
    /// Aggregates a feed response.
    ///
    /// Only the first approach event of each asteroid counts, and the mean size
    /// divides by the declared `element_count` rather than the records visited.
    ///
    /// # Errors
    ///
    /// [`NeoError::EmptyDataset`] when there are no dates or the first date has
    /// no asteroids. [`NeoError::MalformedRecord`] when any record has no
    /// approach data or a non-finite value, or when records are present but
    /// the declared count is zero. One bad record fails the whole summary.
    pub fn from_feed(feed: &RawFeedResponse) -> Result<Self> {
        let (first_date, first_records) = feed
            .near_earth_objects
            .first()
            .ok_or(NeoError::EmptyDataset("response contains no dates"))?;
        let seed = first_records
            .first()
            .ok_or(NeoError::EmptyDataset("first date has no asteroids"))?;
        let (mut max_speed, mut min_distance) = approach_of(first_date, 0, seed)?;
        let mut size_sum = 0.0;

        for (date, records) in feed.near_earth_objects.iter() {
            for (index, record) in records.iter().enumerate() {
                let (speed, distance) = approach_of(date, index, record)?;
                max_speed = max_speed.max(speed);
                min_distance = min_distance.min(distance);

                let size = record.mean_diameter_km();
                if !size.is_finite() {
                    return Err(NeoError::malformed(
                        location(date, index, record),
                        "estimated diameter is not a finite number",
                    ));
                }
                size_sum += size;
            }
        }

        if feed.element_count == 0 {
            return Err(NeoError::malformed(
                "element_count",
                "declared count is zero but records are present",
            ));
        }

        let summary = Self {
            total_count: feed.element_count,
            max_speed: round2(max_speed),
            min_distance: round2(min_distance),
            avg_size: round2(size_sum / feed.element_count as f64),
        };
        debug!(
            total_count = summary.total_count,
            records = feed.near_earth_objects.record_count(),
            max_speed = summary.max_speed,
            min_distance = summary.min_distance,
            avg_size = summary.avg_size,
            "Feed aggregated"
        );
        Ok(summary)
    }
}

/// Velocity and miss distance of the record's first approach.
fn approach_of(date: &str, index: usize, record: &AsteroidRecord) -> Result<(f64, f64)> {
    let approach = record
        .first_approach()
        .ok_or_else(|| NeoError::malformed(location(date, index, record), "no close approach data"))?;
    let speed = approach.relative_velocity.kilometers_per_hour;
    let distance = approach.miss_distance.kilometers;
    if !speed.is_finite() || !distance.is_finite() {
        return Err(NeoError::malformed(
            location(date, index, record),
            "velocity or miss distance is not a finite number",
        ));
    }
    Ok((speed, distance))
}

fn location(date: &str, index: usize, record: &AsteroidRecord) -> String {
    match &record.name {
        Some(name) => format!("{date}[{index}] ({name})"),
        None => format!("{date}[{index}]"),
    }
}

/// Rounds to two decimals, half away from zero, judged on the exact binary
/// value: `1.115` is stored just below the midpoint and becomes `1.11`.
pub fn round2(value: f64) -> f64 {
    // Past 2^52 / 100 every f64 already has at most two decimals.
    if !value.is_finite() || value.abs() >= 4.5e13 {
        return value;
    }
    let magnitude = value.abs();

    // `mul_add` rounds once, so the sign of `magnitude * n - k` is exact.
    let mut cents = (magnitude * 100.0).floor();
    if magnitude.mul_add(100.0, -cents) < 0.0 {
        cents -= 1.0;
    } else if magnitude.mul_add(100.0, -(cents + 1.0)) >= 0.0 {
        cents += 1.0;
    }
    if magnitude.mul_add(200.0, -(2.0 * cents + 1.0)) >= 0.0 {
        cents += 1.0;
    }

    (cents / 100.0).copysign(value)
}
