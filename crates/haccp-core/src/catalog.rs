//! Fixed vocabularies offered by the wizard.

use serde::{Deserialize, Serialize};

/// The fourteen allergen groups of Regulation (EU) No 1169/2011, Annex II.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Allergen {
    Gluten,
    Crustaceans,
    Eggs,
    Fish,
    Peanuts,
    Soybeans,
    Milk,
    Nuts,
    Celery,
    Mustard,
    Sesame,
    Sulphites,
    Lupin,
    Molluscs,
}

impl Allergen {
    pub const ALL: [Allergen; 14] = [
        Allergen::Gluten,
        Allergen::Crustaceans,
        Allergen::Eggs,
        Allergen::Fish,
        Allergen::Peanuts,
        Allergen::Soybeans,
        Allergen::Milk,
        Allergen::Nuts,
        Allergen::Celery,
        Allergen::Mustard,
        Allergen::Sesame,
        Allergen::Sulphites,
        Allergen::Lupin,
        Allergen::Molluscs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Allergen::Gluten => "Cereals containing gluten",
            Allergen::Crustaceans => "Crustaceans",
            Allergen::Eggs => "Eggs",
            Allergen::Fish => "Fish",
            Allergen::Peanuts => "Peanuts",
            Allergen::Soybeans => "Soybeans",
            Allergen::Milk => "Milk (lactose)",
            Allergen::Nuts => "Nuts",
            Allergen::Celery => "Celery",
            Allergen::Mustard => "Mustard",
            Allergen::Sesame => "Sesame seeds",
            Allergen::Sulphites => "Sulphur dioxide and sulphites",
            Allergen::Lupin => "Lupin",
            Allergen::Molluscs => "Molluscs",
        }
    }

    /// Short name, also the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Allergen::Gluten => "gluten",
            Allergen::Crustaceans => "crustaceans",
            Allergen::Eggs => "eggs",
            Allergen::Fish => "fish",
            Allergen::Peanuts => "peanuts",
            Allergen::Soybeans => "soybeans",
            Allergen::Milk => "milk",
            Allergen::Nuts => "nuts",
            Allergen::Celery => "celery",
            Allergen::Mustard => "mustard",
            Allergen::Sesame => "sesame",
            Allergen::Sulphites => "sulphites",
            Allergen::Lupin => "lupin",
            Allergen::Molluscs => "molluscs",
        }
    }

    /// Resolve a label as typed by a user or returned by a model.
    /// Accepts the short name or the full label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Allergen> {
        let wanted = label.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        Allergen::ALL.into_iter().find(|a| {
            a.name() == wanted || a.label().to_lowercase() == wanted
        })
    }
}

/// Equipment offered as one-click choices on the equipment step.
pub const COMMON_EQUIPMENT: &[&str] = &[
    "Dishwasher",
    "Combi oven",
    "Cold room",
    "Slicer",
    "Vacuum packer",
    "Steam sterilizer",
    "Deep fryer",
    "Gas range",
    "Two-compartment sink",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_accepts_name_and_label() {
        assert_eq!(Allergen::from_label("Gluten"), Some(Allergen::Gluten));
        assert_eq!(
            Allergen::from_label("cereals containing gluten"),
            Some(Allergen::Gluten)
        );
        assert_eq!(Allergen::from_label(" MILK "), Some(Allergen::Milk));
        assert_eq!(Allergen::from_label("Milk (lactose)"), Some(Allergen::Milk));
        assert_eq!(Allergen::from_label("chocolate"), None);
        assert_eq!(Allergen::from_label(""), None);
    }

    #[test]
    fn every_allergen_resolves_from_its_own_label() {
        for a in Allergen::ALL {
            assert_eq!(Allergen::from_label(a.label()), Some(a));
            assert_eq!(Allergen::from_label(a.name()), Some(a));
        }
    }

    #[test]
    fn serialized_form_matches_name() {
        for a in Allergen::ALL {
            let json = serde_json::to_string(&a).unwrap();
            assert_eq!(json, format!("\"{}\"", a.name()));
        }
    }
}
