pub mod catalog;
pub mod collab;
pub mod error;
pub mod export;
pub mod result;
pub mod session;
pub mod sync;
pub mod validate;
pub mod wizard;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

pub use catalog::Allergen;
pub use error::{ExportError, GenerateError, SettingsError};
pub use result::GeneratedResult;
pub use session::WizardSession;
pub use wizard::{Action, IgnoreReason, Outcome, Phase, Step, WizardState, TOTAL_STEPS};

// --- Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gastronomy,
    Production,
    Logistics,
    FoodTruck,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Gastronomy,
        Category::Production,
        Category::Logistics,
        Category::FoodTruck,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Gastronomy => "Gastronomy",
            Category::Production => "Food production",
            Category::Logistics => "Logistics and transport",
            Category::FoodTruck => "Mobile gastronomy (food truck)",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocType {
    #[serde(rename = "HACCP")]
    Haccp,
    #[serde(rename = "GHP")]
    Ghp,
    #[serde(rename = "GMP")]
    Gmp,
    #[serde(rename = "HACCP + GHP")]
    HaccpGhp,
}

impl DocType {
    pub const ALL: [DocType; 4] = [DocType::Haccp, DocType::Ghp, DocType::Gmp, DocType::HaccpGhp];

    pub fn label(self) -> &'static str {
        match self {
            DocType::Haccp => "HACCP",
            DocType::Ghp => "GHP",
            DocType::Gmp => "GMP",
            DocType::HaccpGhp => "HACCP + GHP",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    pub name: String,
    pub address: String,
    /// Polish NIP, ten digits without separators
    pub tax_id: String,
    pub representative: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Name,
    Address,
    TaxId,
    Representative,
}

impl BusinessDetails {
    pub fn field_mut(&mut self, field: DetailField) -> &mut String {
        match field {
            DetailField::Name => &mut self.name,
            DetailField::Address => &mut self.address,
            DetailField::TaxId => &mut self.tax_id,
            DetailField::Representative => &mut self.representative,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductionStage {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ProductionStage {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Supplier {
    pub name: String,
    /// Free text list of supplied goods
    #[serde(default)]
    pub products: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WorkingConditions {
    pub temperature: String,
    pub humidity: String,
    pub ventilation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionField {
    Temperature,
    Humidity,
    Ventilation,
}

impl WorkingConditions {
    pub fn field_mut(&mut self, field: ConditionField) -> &mut String {
        match field {
            ConditionField::Temperature => &mut self.temperature,
            ConditionField::Humidity => &mut self.humidity,
            ConditionField::Ventilation => &mut self.ventilation,
        }
    }
}

/// One row of the allergen matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergenEntry {
    pub product: String,
    #[serde(default)]
    pub allergens: BTreeSet<Allergen>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Biological,
    Chemical,
    Physical,
}

/// One row of the per-product hazard table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductHazard {
    pub product: String,
    #[serde(default)]
    pub biological: String,
    #[serde(default)]
    pub chemical: String,
    #[serde(default)]
    pub physical: String,
}

impl ProductHazard {
    pub fn empty(product: &str) -> Self {
        Self {
            product: product.to_string(),
            ..Self::default()
        }
    }

    pub fn field_mut(&mut self, kind: HazardKind) -> &mut String {
        match kind {
            HazardKind::Biological => &mut self.biological,
            HazardKind::Chemical => &mut self.chemical,
            HazardKind::Physical => &mut self.physical,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.biological.is_empty() && self.chemical.is_empty() && self.physical.is_empty()
    }
}

/// A standard operating procedure block, either entered by hand or returned by the generator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct ProcedureBlock {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Everything the wizard collects. `allergen_matrix` and `product_hazards`
/// are derived from `products`; see [`sync::sync_derived_tables`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub category: Option<Category>,
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub details: BusinessDetails,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub stages: Vec<ProductionStage>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub working_conditions: WorkingConditions,
    #[serde(default)]
    pub allergen_matrix: Vec<AllergenEntry>,
    #[serde(default)]
    pub product_hazards: Vec<ProductHazard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub procedures: Vec<ProcedureBlock>,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            category: Some(Category::Gastronomy),
            doc_type: Some(DocType::Haccp),
            details: BusinessDetails::default(),
            products: Vec::new(),
            equipment: Vec::new(),
            stages: Vec::new(),
            suppliers: Vec::new(),
            working_conditions: WorkingConditions::default(),
            allergen_matrix: Vec::new(),
            product_hazards: Vec::new(),
            procedures: Vec::new(),
        }
    }
}

impl FormData {
    pub fn has_product(&self, name: &str) -> bool {
        self.products.iter().any(|p| p == name)
    }

    pub fn allergens_for(&self, product: &str) -> Option<&BTreeSet<Allergen>> {
        self.allergen_matrix
            .iter()
            .find(|e| e.product == product)
            .map(|e| &e.allergens)
    }

    pub fn hazards_for(&self, product: &str) -> Option<&ProductHazard> {
        self.product_hazards.iter().find(|h| h.product == product)
    }

    pub fn has_equipment(&self, name: &str) -> bool {
        self.equipment.iter().any(|e| e.name == name)
    }
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// Resolve the settings directory: `$HACCP_HOME` if set, else `~/.haccp/`.
pub fn settings_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("HACCP_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".haccp")
}

fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    let path = settings_path();
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<(), SettingsError> {
    let dir = settings_dir();
    fs::create_dir_all(&dir).map_err(|source| SettingsError::Io {
        path: dir.clone(),
        source,
    })?;
    let json = serde_json::to_string_pretty(settings)?;
    let path = settings_path();
    fs::write(&path, json).map_err(|source| SettingsError::Io { path, source })
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}
