//! Built-in quick-action lists: rhythms, drugs, shock energies, airway steps.

use serde::Serialize;

/// Rhythm calls offered as one-tap buttons.
pub const RHYTHMS: &[&str] = &["VF/VT", "PEA", "Asystole", "ROSC", "Unknown"];

/// Preset defibrillation energies in joules.
pub const SHOCK_LEVELS: &[f64] = &[120.0, 150.0, 200.0, 300.0, 360.0];

/// The default shock energy.
pub const DEFAULT_SHOCK_ENERGY: f64 = 200.0;

/// Airway and procedure steps offered as one-tap buttons.
pub const AIRWAY_PROCEDURES: &[&str] = &[
    "BVM",
    "OPA/NPA",
    "Supraglottic",
    "ETT placed",
    "Capnography",
    "IV/IO established",
];

/// A drug that can be logged with one tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrugDescriptor {
    /// Short code, e.g. `AMIO`.
    pub code: &'static str,
    /// Display label; falls back to the code when empty.
    pub label: &'static str,
    /// Dose recorded in the event details. May be empty.
    pub default_dose: &'static str,
}

impl DrugDescriptor {
    /// The label to log: the label, or the code if the label is empty.
    #[must_use]
    pub fn display_label(&self) -> &'static str {
        if self.label.is_empty() {
            self.code
        } else {
            self.label
        }
    }
}

/// Code of the epinephrine entry, which has its own dedicated action.
pub const EPINEPHRINE_CODE: &str = "EPI";

/// The drug catalog.
pub const DRUGS: &[DrugDescriptor] = &[
    DrugDescriptor {
        code: EPINEPHRINE_CODE,
        label: "Epinephrine 1 mg IV/IO",
        default_dose: "1 mg",
    },
    DrugDescriptor {
        code: "AMIO",
        label: "Amiodarone 300 mg IV/IO",
        default_dose: "300 mg",
    },
    DrugDescriptor {
        code: "AMIO150",
        label: "Amiodarone 150 mg",
        default_dose: "150 mg",
    },
    DrugDescriptor {
        code: "LIDO",
        label: "Lidocaine 1\u{2013}1.5 mg/kg",
        default_dose: "",
    },
    DrugDescriptor {
        code: "MgSO4",
        label: "Magnesium 1\u{2013}2 g",
        default_dose: "",
    },
    DrugDescriptor {
        code: "CaCl2",
        label: "Calcium Chloride",
        default_dose: "",
    },
    DrugDescriptor {
        code: "NaHCO3",
        label: "Sodium Bicarbonate",
        default_dose: "",
    },
];

/// Look up a drug by code, ignoring ASCII case.
#[must_use]
pub fn find_drug(code: &str) -> Option<&'static DrugDescriptor> {
    DRUGS.iter().find(|d| d.code.eq_ignore_ascii_case(code))
}

/// Drugs offered as generic quick actions (everything but epinephrine).
pub fn quick_drugs() -> impl Iterator<Item = &'static DrugDescriptor> {
    DRUGS.iter().filter(|d| d.code != EPINEPHRINE_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_drug_case_insensitive() {
        assert_eq!(find_drug("amio").map(|d| d.code), Some("AMIO"));
        assert_eq!(find_drug("mgso4").map(|d| d.code), Some("MgSO4"));
        assert!(find_drug("ATROPINE").is_none());
    }

    #[test]
    fn test_quick_drugs_exclude_epinephrine() {
        assert!(quick_drugs().all(|d| d.code != EPINEPHRINE_CODE));
        assert_eq!(quick_drugs().count(), DRUGS.len() - 1);
    }

    #[test]
    fn test_display_label_falls_back_to_code() {
        let unlabeled = DrugDescriptor {
            code: "ADEN",
            label: "",
            default_dose: "6 mg",
        };
        assert_eq!(unlabeled.display_label(), "ADEN");
        assert_eq!(DRUGS[1].display_label(), "Amiodarone 300 mg IV/IO");
    }

    #[test]
    fn test_default_energy_is_a_preset() {
        assert!(SHOCK_LEVELS.contains(&DEFAULT_SHOCK_ENERGY));
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in DRUGS.iter().enumerate() {
            for b in &DRUGS[i + 1..] {
                assert!(!a.code.eq_ignore_ascii_case(b.code));
            }
        }
    }
}
