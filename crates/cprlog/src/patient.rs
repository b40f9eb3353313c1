//! Patient and context fields.
//!
//! Stored separately from the session and never cleared by a session reset.

use serde::{Deserialize, Serialize};

/// Default location for a new record.
pub const DEFAULT_LOCATION: &str = "ED";

/// Free-form identification of the patient and the person recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientMeta {
    /// Patient identifier (MRN or similar).
    pub patient_id: String,
    /// Age, as typed.
    pub age: String,
    /// Sex, as typed.
    pub sex: String,
    /// Weight in kilograms, as typed.
    pub weight_kg: String,
    /// Where the arrest is being run.
    pub location: String,
    /// Who is recording.
    pub operator: String,
}

impl Default for PatientMeta {
    fn default() -> Self {
        Self::with_location(DEFAULT_LOCATION)
    }
}

impl PatientMeta {
    /// Empty metadata with the given location pre-filled.
    #[must_use]
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            patient_id: String::new(),
            age: String::new(),
            sex: String::new(),
            weight_kg: String::new(),
            location: location.into(),
            operator: String::new(),
        }
    }

    /// Apply a partial update; fields left as `None` are untouched.
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, update: &PatientUpdate) -> bool {
        let before = self.clone();
        let fields = [
            (&mut self.patient_id, &update.patient_id),
            (&mut self.age, &update.age),
            (&mut self.sex, &update.sex),
            (&mut self.weight_kg, &update.weight_kg),
            (&mut self.location, &update.location),
            (&mut self.operator, &update.operator),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        *self != before
    }

    /// One-line summary used by the print view and `status`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "ID: {} | Age: {} | Sex: {} | Weight: {} kg | Location: {} | Recorder: {}",
            self.patient_id, self.age, self.sex, self.weight_kg, self.location, self.operator
        )
    }
}

/// A partial change to [`PatientMeta`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientUpdate {
    /// New patient identifier.
    pub patient_id: Option<String>,
    /// New age.
    pub age: Option<String>,
    /// New sex.
    pub sex: Option<String>,
    /// New weight in kilograms.
    pub weight_kg: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New recorder name.
    pub operator: Option<String>,
}

impl PatientUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build an update for a single named field.
    ///
    /// Accepts the field names used on the command line: `id`, `age`, `sex`,
    /// `weight`, `location`, `operator` (or `recorder`).
    #[must_use]
    pub fn field(name: &str, value: impl Into<String>) -> Option<Self> {
        let value = Some(value.into());
        let update = match name.to_ascii_lowercase().as_str() {
            "id" | "patient_id" | "patient-id" => Self {
                patient_id: value,
                ..Self::default()
            },
            "age" => Self {
                age: value,
                ..Self::default()
            },
            "sex" => Self {
                sex: value,
                ..Self::default()
            },
            "weight" | "weight_kg" | "weight-kg" => Self {
                weight_kg: value,
                ..Self::default()
            },
            "location" => Self {
                location: value,
                ..Self::default()
            },
            "operator" | "recorder" => Self {
                operator: value,
                ..Self::default()
            },
            _ => return None,
        };
        Some(update)
    }
}
