//! The report returned by the content generator.
//!
//! The wizard stores and forwards this payload; apart from [`GeneratedResult::check_shape`]
//! it never looks inside.

use serde::{Deserialize, Serialize};

use crate::{GenerateError, ProcedureBlock};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningInstruction {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub action: String,
    /// Cleaning or disinfecting agent
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub frequency: String,
}

/// A critical control point card.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlPoint {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hazard: String,
    #[serde(default)]
    pub monitoring: String,
    #[serde(default)]
    pub critical_limits: String,
    #[serde(default)]
    pub corrective_actions: String,
    /// "biological", "chemical" or "physical"
    #[serde(default)]
    pub hazard_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HazardBreakdown {
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub dish_name: String,
    #[serde(default)]
    pub biological: Vec<String>,
    #[serde(default)]
    pub chemical: Vec<String>,
    #[serde(default)]
    pub physical: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub ghp_instructions: Vec<CleaningInstruction>,
    #[serde(default)]
    pub ccps: Vec<ControlPoint>,
    #[serde(default)]
    pub hazard_analysis: Vec<HazardBreakdown>,
    #[serde(default)]
    pub sops: Vec<ProcedureBlock>,
    /// Process flow diagram as text
    #[serde(default)]
    pub flow_diagram: String,
}

impl GeneratedResult {
    /// Reject a payload in which every report section is empty.
    pub fn check_shape(&self) -> Result<(), GenerateError> {
        let empty = self.summary.trim().is_empty()
            && self.ghp_instructions.is_empty()
            && self.ccps.is_empty()
            && self.hazard_analysis.is_empty()
            && self.sops.is_empty();
        if empty {
            Err(GenerateError::InvalidPayload)
        } else {
            Ok(())
        }
    }
}
