//! Typed model of the NeoWs feed response.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::error::Result;

/// Body of a `/neo/rest/v1/feed` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeedResponse {
    pub element_count: u64,
    pub near_earth_objects: NearEarthObjects,
}

impl RawFeedResponse {
    /// Decodes a feed response from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::NeoError::MalformedRecord`] when the body is not
    /// valid JSON or a record lacks a field or holds an unparsable number.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Asteroids grouped by ISO date, in the order the upstream document lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearEarthObjects(Vec<(String, Vec<AsteroidRecord>)>);

impl NearEarthObjects {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AsteroidRecord])> {
        self.0.iter().map(|(date, records)| (date.as_str(), records.as_slice()))
    }

    pub fn get(&self, date: &str) -> Option<&[AsteroidRecord]> {
        self.iter().find(|(key, _)| *key == date).map(|(_, records)| records)
    }

    pub fn first(&self) -> Option<(&str, &[AsteroidRecord])> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.0.iter().map(|(_, records)| records.len()).sum()
    }
}

impl From<Vec<(String, Vec<AsteroidRecord>)>> for NearEarthObjects {
    fn from(groups: Vec<(String, Vec<AsteroidRecord>)>) -> Self {
        Self(groups)
    }
}

impl<'de> Deserialize<'de> for NearEarthObjects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = NearEarthObjects;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from dates to lists of asteroids")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(8));
                while let Some((date, records)) = map.next_entry::<String, Vec<AsteroidRecord>>()? {
                    // A repeated date keeps its first position but takes the later records.
                    match groups.iter_mut().find(|(seen, _)| *seen == date) {
                        Some((_, existing)) => *existing = records,
                        None => groups.push((date, records)),
                    }
                }
                Ok(NearEarthObjects(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AsteroidRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub estimated_diameter: EstimatedDiameter,
    pub close_approach_data: Vec<ApproachEvent>,
}

impl AsteroidRecord {
    /// Only the first approach event feeds the statistics.
    pub fn first_approach(&self) -> Option<&ApproachEvent> {
        self.close_approach_data.first()
    }

    pub fn mean_diameter_km(&self) -> f64 {
        let km = &self.estimated_diameter.kilometers;
        (km.estimated_diameter_max + km.estimated_diameter_min) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EstimatedDiameter {
    pub kilometers: DiameterRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DiameterRange {
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApproachEvent {
    pub relative_velocity: RelativeVelocity,
    pub miss_distance: MissDistance,
}

// NeoWs sends these as decimal strings; plain numbers are accepted too.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RelativeVelocity {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub kilometers_per_hour: f64,
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MissDistance {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub kilometers: f64,
}


#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "element_count": 2,
        "near_earth_objects": {
            "2023-01-02": [{
                "id": "2465633",
                "name": "465633 (2009 JR5)",
                "estimated_diameter": {"kilometers": {"estimated_diameter_min": 0.2, "estimated_diameter_max": 0.4}},
                "close_approach_data": [{
                    "relative_velocity": {"kilometers_per_hour": "65260.6688"},
                    "miss_distance": {"kilometers": "45290298.225725659"}
                }]
            }],
            "2023-01-01": [{
                "estimated_diameter": {"kilometers": {"estimated_diameter_min": 0.1, "estimated_diameter_max": 0.3}},
                "close_approach_data": [{
                    "relative_velocity": {"kilometers_per_hour": 1000.5},
                    "miss_distance": {"kilometers": 50000}
                }]
            }]
        }
    }"#;

    #[test]
    fn test_parse_coerces_numeric_strings() {
        let feed = RawFeedResponse::from_slice(BODY.as_bytes()).unwrap();
        let (_, records) = feed.near_earth_objects.first().unwrap();
        let approach = records[0].first_approach().unwrap();

        assert_eq!(approach.relative_velocity.kilometers_per_hour, 65260.6688);
        assert_eq!(approach.miss_distance.kilometers, 45290298.225725659);
        assert_eq!(records[0].name.as_deref(), Some("465633 (2009 JR5)"));
    }

    #[test]
    fn test_parse_accepts_plain_numbers() {
        let feed = RawFeedResponse::from_slice(BODY.as_bytes()).unwrap();
        let records = feed.near_earth_objects.get("2023-01-01").unwrap();
        let approach = records[0].first_approach().unwrap();

        assert_eq!(approach.relative_velocity.kilometers_per_hour, 1000.5);
        assert_eq!(approach.miss_distance.kilometers, 50000.0);
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let feed = RawFeedResponse::from_slice(BODY.as_bytes()).unwrap();
        let dates: Vec<_> = feed.near_earth_objects.iter().map(|(date, _)| date).collect();
        assert_eq!(dates, vec!["2023-01-02", "2023-01-01"]);
    }

    #[test]
    fn test_parse_rejects_unparsable_velocity() {
        let body = BODY.replace("\"65260.6688\"", "\"fast\"");
        let error = RawFeedResponse::from_slice(body.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), crate::error::FailureKind::MalformedRecord);
    }

    #[test]
    fn test_parse_rejects_missing_diameter() {
        let body = r#"{"element_count": 1, "near_earth_objects": {"2023-01-01": [{
            "close_approach_data": []
        }]}}"#;
        assert!(RawFeedResponse::from_slice(body.as_bytes()).is_err());
    }

    #[test]
    fn test_repeated_date_keeps_last_records_in_first_position() {
        let record = |velocity: u32| {
            format!(
                r#"[{{"estimated_diameter": {{"kilometers": {{"estimated_diameter_min": 0.1, "estimated_diameter_max": 0.3}}}},
                    "close_approach_data": [{{"relative_velocity": {{"kilometers_per_hour": "{velocity}"}},
                                              "miss_distance": {{"kilometers": "1000"}}}}]}}]"#
            )
        };
        let body = format!(
            r#"{{"element_count": 2, "near_earth_objects": {{
                "2023-01-01": {a}, "2023-01-02": {b}, "2023-01-01": {c}
            }}}}"#,
            a = record(10),
            b = record(20),
            c = record(30),
        );
        let feed = RawFeedResponse::from_slice(body.as_bytes()).unwrap();

        let dates: Vec<_> = feed.near_earth_objects.iter().map(|(date, _)| date).collect();
        assert_eq!(dates, vec!["2023-01-01", "2023-01-02"]);
        assert_eq!(feed.near_earth_objects.record_count(), 2);
        let records = feed.near_earth_objects.get("2023-01-01").unwrap();
        assert_eq!(records[0].first_approach().unwrap().relative_velocity.kilometers_per_hour, 30.0);
    }

    #[test]
    fn test_mean_diameter() {
        let record = fixtures::asteroid(0.0, 0.0, 0.1, 0.3);
        assert!((record.mean_diameter_km() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_record_count() {
        let feed = fixtures::worked_example();
        assert_eq!(feed.near_earth_objects.len(), 2);
        assert_eq!(feed.near_earth_objects.record_count(), 3);
    }
}
