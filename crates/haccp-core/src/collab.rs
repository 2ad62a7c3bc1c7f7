//! Injected collaborators: report generation and best-effort suggestions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Allergen, Category, FormData, GenerateError, GeneratedResult, ProcedureBlock, ProductionStage,
};

/// Produces the report for a finished form. Calling it again with the same
/// form must be safe.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, form: &FormData) -> Result<GeneratedResult, GenerateError>;
}

/// Optional enrichments. Implementations return an empty list instead of an error.
#[async_trait]
pub trait Suggester: Send + Sync {
    async fn suggest_dishes(&self, category: Category) -> Vec<DishSuggestion>;
    async fn suggest_allergens(&self, products: &[String]) -> Vec<AllergenSuggestion>;
    async fn suggest_hazards(&self, products: &[String]) -> Vec<HazardSuggestion>;
    async fn suggest_stages(&self, category: Category) -> Vec<StageSuggestion>;
    async fn suggest_procedures(&self, category: Category) -> Vec<ProcedureBlock>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DishSuggestion {
    pub name: String,
    /// Loose grouping such as "meat", "dairy" or "vegetarian"
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllergenSuggestion {
    pub dish: String,
    #[serde(default)]
    pub allergens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HazardSuggestion {
    pub product_name: String,
    #[serde(default)]
    pub biological: String,
    #[serde(default)]
    pub chemical: String,
    #[serde(default)]
    pub physical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// --- Applying suggestions ---

impl FormData {
    /// Replace the allergen set of every matrix row that has a suggestion.
    /// Labels outside the fixed allergen list are dropped. Returns rows changed.
    pub fn apply_allergen_suggestions(&mut self, suggestions: &[AllergenSuggestion]) -> usize {
        let mut changed = 0;
        for entry in &mut self.allergen_matrix {
            let Some(s) = suggestions.iter().find(|s| s.dish == entry.product) else {
                continue;
            };
            entry.allergens = s
                .allergens
                .iter()
                .filter_map(|label| {
                    let resolved = Allergen::from_label(label);
                    if resolved.is_none() {
                        tracing::debug!(label = %label, dish = %s.dish, "unknown allergen label dropped");
                    }
                    resolved
                })
                .collect();
            changed += 1;
        }
        changed
    }

    /// Fill hazard rows for products that have a suggestion.
    pub fn apply_hazard_suggestions(&mut self, suggestions: &[HazardSuggestion]) -> usize {
        let mut changed = 0;
        for row in &mut self.product_hazards {
            if let Some(s) = suggestions.iter().find(|s| s.product_name == row.product) {
                row.biological = s.biological.clone();
                row.chemical = s.chemical.clone();
                row.physical = s.physical.clone();
                changed += 1;
            }
        }
        changed
    }

    /// Append suggested stages whose name is not already listed.
    pub fn apply_stage_suggestions(&mut self, suggestions: &[StageSuggestion]) -> usize {
        let before = self.stages.len();
        for s in suggestions {
            let name = s.name.trim();
            if name.is_empty() || self.stages.iter().any(|st| st.name.trim() == name) {
                continue;
            }
            self.stages.push(ProductionStage::new(name, s.description.trim()));
        }
        self.stages.len() - before
    }

    /// Append suggested procedures whose title is not already listed.
    pub fn apply_procedure_suggestions(&mut self, suggestions: &[ProcedureBlock]) -> usize {
        let before = self.procedures.len();
        for s in suggestions {
            let title = s.title.trim();
            if title.is_empty() || self.procedures.iter().any(|p| p.title.trim() == title) {
                continue;
            }
            self.procedures.push(ProcedureBlock {
                title: title.to_string(),
                content: s.content.clone(),
            });
        }
        self.procedures.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::sync_derived_tables;

    fn form_with(products: &[&str]) -> FormData {
        let mut form = FormData {
            products: products.iter().map(|s| s.to_string()).collect(),
            ..FormData::default()
        };
        sync_derived_tables(&mut form);
        form
    }

    #[test]
    fn allergen_suggestions_replace_matching_rows_only() {
        let mut form = form_with(&["Pierogi", "Salad"]);
        form.allergen_matrix[1].allergens.insert(Allergen::Mustard);

        let changed = form.apply_allergen_suggestions(&[AllergenSuggestion {
            dish: "Pierogi".into(),
            allergens: vec!["Gluten".into(), "Eggs".into(), "unicorn".into()],
        }]);

        assert_eq!(changed, 1);
        let pierogi = form.allergens_for("Pierogi").unwrap();
        assert_eq!(pierogi.len(), 2);
        assert!(pierogi.contains(&Allergen::Gluten));
        assert!(form.allergens_for("Salad").unwrap().contains(&Allergen::Mustard));
    }

    #[test]
    fn suggestions_for_unknown_products_are_ignored() {
        let mut form = form_with(&["Salad"]);
        let changed = form.apply_hazard_suggestions(&[HazardSuggestion {
            product_name: "Steak".into(),
            biological: "Salmonella".into(),
            chemical: String::new(),
            physical: String::new(),
        }]);
        assert_eq!(changed, 0);
        assert!(form.hazards_for("Salad").unwrap().is_blank());
        assert!(form.hazards_for("Steak").is_none());
    }

    #[test]
    fn stage_suggestions_skip_existing_names() {
        let mut form = FormData::default();
        form.stages.push(ProductionStage::new("Receiving", "Check delivery"));
        let added = form.apply_stage_suggestions(&[
            StageSuggestion {
                name: "Receiving".into(),
                description: "dup".into(),
            },
            StageSuggestion {
                name: " Storage ".into(),
                description: "Chilled".into(),
            },
            StageSuggestion {
                name: "".into(),
                description: "blank".into(),
            },
        ]);
        assert_eq!(added, 1);
        assert_eq!(form.stages[1].name, "Storage");
    }

    #[test]
    fn existing_names_are_compared_trimmed() {
        let mut form = FormData::default();
        form.stages.push(ProductionStage::new("Storage ", "Chilled"));
        form.procedures.push(ProcedureBlock {
            title: " Hand washing".into(),
            content: String::new(),
        });
        let stages = form.apply_stage_suggestions(&[StageSuggestion {
            name: "Storage".into(),
            description: "dup".into(),
        }]);
        let procedures = form.apply_procedure_suggestions(&[ProcedureBlock {
            title: "Hand washing ".into(),
            content: "dup".into(),
        }]);
        assert_eq!((stages, procedures), (0, 0));
        assert_eq!(form.stages.len(), 1);
        assert_eq!(form.procedures.len(), 1);
    }

    #[test]
    fn dish_suggestion_reads_type_field() {
        let d: DishSuggestion = serde_json::from_str(r#"{"name":"Bigos","type":"meat"}"#).unwrap();
        assert_eq!(d.kind, "meat");
    }
}
