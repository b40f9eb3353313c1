//! Logged events.
//!
//! An [`Event`] is one tapped action: a shock, a drug, a rhythm call. Events
//! are immutable once created and identified by their id.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// What kind of action an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// A rhythm call (VF/VT, PEA, Asystole, ROSC, ...).
    Rhythm,
    /// A defibrillation shock.
    Shock,
    /// A drug administration.
    Drug,
    /// An airway step or procedure.
    Airway,
    /// A pulse or rhythm check.
    Assessment,
    /// An outcome such as ROSC.
    Outcome,
    /// Chest compressions started or stopped.
    #[serde(rename = "CPR")]
    Cpr,
    /// Free text.
    Note,
}

impl EventCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 8] = [
        Self::Rhythm,
        Self::Shock,
        Self::Drug,
        Self::Airway,
        Self::Assessment,
        Self::Outcome,
        Self::Cpr,
        Self::Note,
    ];

    /// The label used in exports and the log table.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rhythm => "Rhythm",
            Self::Shock => "Shock",
            Self::Drug => "Drug",
            Self::Airway => "Airway",
            Self::Assessment => "Assessment",
            Self::Outcome => "Outcome",
            Self::Cpr => "CPR",
            Self::Note => "Note",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single annotation value: text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    /// A JSON number.
    Number(serde_json::Number),
    /// Free text.
    Text(String),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for DetailValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Key-value annotations on an event, kept in insertion order.
///
/// Serializes as a JSON object. A missing or `null` value deserializes as
/// empty. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details(Vec<(String, DetailValue)>);

impl Details {
    /// An empty set of details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DetailValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DetailValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DetailValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as space-joined `key:value` pairs.
    #[must_use]
    pub fn render(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct DetailsVisitor;

impl<'de> Visitor<'de> for DetailsVisitor {
    type Value = Details;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of strings to strings or numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Details, A::Error> {
        let mut details = Details::new();
        while let Some((k, v)) = access.next_entry::<String, DetailValue>()? {
            details.insert(k, v);
        }
        Ok(details)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Details, E> {
        Ok(Details::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Details, E> {
        Ok(Details::new())
    }
}

impl<'de> Deserialize<'de> for Details {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DetailsVisitor)
    }
}

/// One entry in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: Uuid,

    /// When the action was recorded.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Milliseconds since the arrest timestamp, or 0 when none was set.
    #[serde(default)]
    pub relative_offset_ms: i64,

    /// What kind of action this was.
    pub category: EventCategory,

    /// Free-text label.
    pub label: String,

    /// Optional annotations.
    #[serde(default)]
    pub details: Details,
}

impl Event {
    /// Create an event with a fresh id.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        arrest_timestamp: Option<DateTime<Utc>>,
        category: EventCategory,
        label: impl Into<String>,
        details: Details,
    ) -> Self {
        let relative_offset_ms =
            arrest_timestamp.map_or(0, |arrest| crate::clock::millis_between(arrest, timestamp));
        Self {
            id: Uuid::new_v4(),
            timestamp,
            relative_offset_ms,
            category,
            label: label.into(),
            details,
        }
    }

    /// Whether this event is an epinephrine administration, by label.
    #[must_use]
    pub fn is_epinephrine(&self) -> bool {
        self.category == EventCategory::Drug && self.label.contains("Epinephrine")
    }
}
