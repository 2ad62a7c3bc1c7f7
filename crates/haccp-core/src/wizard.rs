//! Wizard progression.
//!
//! [`WizardState::apply`] is the single transition function. It never awaits:
//! advancing from the last step moves to [`Phase::Generating`] and hands a form
//! snapshot back to the caller, who runs the generator and reports back through
//! [`WizardState::complete_generation`].

use crate::sync::sync_derived_tables;
use crate::validate::{check_tax_id, has_at_least, is_filled, TaxIdCheck};
use crate::{
    Allergen, Category, ConditionField, DetailField, DocType, Equipment, FormData, GenerateError,
    GeneratedResult, HazardKind, ProcedureBlock, ProductionStage, Supplier,
};

pub const TOTAL_STEPS: usize = 8;

pub const MIN_STAGES: usize = 3;

/// Shown to the user when generation fails; details go to the log.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Generating the documentation failed. Try again or check your internet connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Profile,
    Details,
    Products,
    Equipment,
    Stages,
    Hazards,
    Allergens,
    WorkingConditions,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS] = [
        Step::Profile,
        Step::Details,
        Step::Products,
        Step::Equipment,
        Step::Stages,
        Step::Hazards,
        Step::Allergens,
        Step::WorkingConditions,
    ];

    pub const FIRST: Step = Step::Profile;
    pub const LAST: Step = Step::WorkingConditions;

    /// 1-based position.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn from_number(n: usize) -> Option<Step> {
        n.checked_sub(1).and_then(|i| Step::ALL.get(i).copied())
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        Step::from_number(self.number() - 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Profile => "Business and document type",
            Step::Details => "Business details",
            Step::Products => "Menu and products",
            Step::Equipment => "Equipment",
            Step::Stages => "Production stages",
            Step::Hazards => "Hazards and suppliers",
            Step::Allergens => "Allergen matrix",
            Step::WorkingConditions => "Working conditions",
        }
    }

    /// Gate for leaving this step forwards. Pure.
    pub fn is_complete(self, form: &FormData) -> bool {
        match self {
            Step::Profile => form.category.is_some() && form.doc_type.is_some(),
            Step::Details => {
                is_filled(&form.details.name) && check_tax_id(&form.details.tax_id).is_valid()
            }
            Step::Products => has_at_least(&form.products, 1),
            Step::Equipment => has_at_least(&form.equipment, 1),
            Step::Stages => {
                has_at_least(&form.stages, MIN_STAGES)
                    && form
                        .stages
                        .iter()
                        .all(|s| is_filled(&s.name) && is_filled(&s.description))
            }
            Step::Hazards | Step::Allergens => true,
            Step::WorkingConditions => {
                let wc = &form.working_conditions;
                is_filled(&wc.temperature) && is_filled(&wc.humidity) && is_filled(&wc.ventilation)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Step(Step),
    Generating,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCategory(Category),
    SetDocType(DocType),
    SetDetail(DetailField, String),
    AddProduct(String),
    RemoveProduct(String),
    ToggleProduct(String),
    /// Identity is by name: the old row's allergens and hazards are dropped.
    RenameProduct { from: String, to: String },
    ToggleAllergen { product: String, allergen: Allergen },
    SetHazard { product: String, kind: HazardKind, text: String },
    AddEquipment(String),
    RemoveEquipment(String),
    ToggleEquipment(String),
    SetEquipmentCount { name: String, count: u32 },
    AddStage(ProductionStage),
    UpdateStage { index: usize, stage: ProductionStage },
    RemoveStage(usize),
    AddSupplier(Supplier),
    RemoveSupplier(usize),
    SetCondition(ConditionField, String),
    AddProcedure(ProcedureBlock),
    RemoveProcedure(usize),
    Advance,
    Back,
    GoTo(Step),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetCategory(_) => "set_category",
            Action::SetDocType(_) => "set_doc_type",
            Action::SetDetail(..) => "set_detail",
            Action::AddProduct(_) => "add_product",
            Action::RemoveProduct(_) => "remove_product",
            Action::ToggleProduct(_) => "toggle_product",
            Action::RenameProduct { .. } => "rename_product",
            Action::ToggleAllergen { .. } => "toggle_allergen",
            Action::SetHazard { .. } => "set_hazard",
            Action::AddEquipment(_) => "add_equipment",
            Action::RemoveEquipment(_) => "remove_equipment",
            Action::ToggleEquipment(_) => "toggle_equipment",
            Action::SetEquipmentCount { .. } => "set_equipment_count",
            Action::AddStage(_) => "add_stage",
            Action::UpdateStage { .. } => "update_stage",
            Action::RemoveStage(_) => "remove_stage",
            Action::AddSupplier(_) => "add_supplier",
            Action::RemoveSupplier(_) => "remove_supplier",
            Action::SetCondition(..) => "set_condition",
            Action::AddProcedure(_) => "add_procedure",
            Action::RemoveProcedure(_) => "remove_procedure",
            Action::Advance => "advance",
            Action::Back => "back",
            Action::GoTo(_) => "go_to",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The current step's gate is not satisfied.
    StepIncomplete(Step),
    AtFirstStep,
    GenerationInFlight,
    /// The report has been generated; the form is closed.
    Finished,
    /// A completion arrived while no generation was running.
    NotGenerating,
    Blank,
    Duplicate,
    UnknownProduct,
    UnknownItem,
    InvalidCount,
    /// A suggestion call needs input the form does not have yet.
    NothingToSuggest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
    /// The caller must now run the generator on this snapshot exactly once.
    Generate(Box<FormData>),
    Generated,
    GenerationFailed,
}

impl Outcome {
    /// Whether the state changed. Starting a generation counts.
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            Outcome::Applied | Outcome::Generate(_) | Outcome::Generated
        )
    }
}

impl From<IgnoreReason> for Outcome {
    fn from(reason: IgnoreReason) -> Self {
        Outcome::Ignored(reason)
    }
}

#[derive(Debug, Clone)]
pub struct WizardState {
    phase: Phase,
    form: FormData,
    result: Option<GeneratedResult>,
    last_error: Option<String>,
    generation_attempts: u32,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::with_form(FormData::default())
    }

    /// Start from a prepared form. Derived tables are reconciled first.
    pub fn with_form(mut form: FormData) -> Self {
        sync_derived_tables(&mut form);
        Self {
            phase: Phase::Step(Step::FIRST),
            form,
            result: None,
            last_error: None,
            generation_attempts: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn result(&self) -> Option<&GeneratedResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation_attempts(&self) -> u32 {
        self.generation_attempts
    }

    pub fn current_step(&self) -> Option<Step> {
        match self.phase {
            Phase::Step(s) => Some(s),
            Phase::Generating | Phase::Result => None,
        }
    }

    /// 1-based index; the result view is `TOTAL_STEPS + 1`.
    pub fn current_step_index(&self) -> usize {
        match self.phase {
            Phase::Step(s) => s.number(),
            Phase::Generating => TOTAL_STEPS,
            Phase::Result => TOTAL_STEPS + 1,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Generating
    }

    /// Whether the forward control should be enabled.
    pub fn can_advance(&self) -> bool {
        match self.phase {
            Phase::Step(s) => s.is_complete(&self.form),
            Phase::Generating | Phase::Result => false,
        }
    }

    pub fn tax_id_check(&self) -> TaxIdCheck {
        check_tax_id(&self.form.details.tax_id)
    }

    pub fn apply(&mut self, action: Action) -> Outcome {
        let name = action.name();
        let outcome = match action {
            Action::Advance => self.advance(),
            Action::Back => self.back(),
            Action::GoTo(step) => self.go_to(step),
            edit => match self.editable() {
                Ok(()) => self.edit(edit),
                Err(reason) => reason.into(),
            },
        };
        match &outcome {
            Outcome::Ignored(reason) => {
                tracing::debug!(action = name, ?reason, "action ignored")
            }
            _ => tracing::debug!(action = name, step = self.current_step_index(), "action applied"),
        }
        outcome
    }

    /// Record the generator's answer. Only meaningful while generating; a late
    /// answer from an abandoned attempt is discarded.
    pub fn complete_generation(
        &mut self,
        outcome: Result<GeneratedResult, GenerateError>,
    ) -> Outcome {
        if self.phase != Phase::Generating {
            tracing::debug!("discarding generation result outside of generating phase");
            return IgnoreReason::NotGenerating.into();
        }
        match outcome.and_then(|r| r.check_shape().map(|()| r)) {
            Ok(result) => {
                tracing::info!(
                    ccps = result.ccps.len(),
                    instructions = result.ghp_instructions.len(),
                    "documentation generated"
                );
                self.result = Some(result);
                self.phase = Phase::Result;
                Outcome::Generated
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt = self.generation_attempts, "documentation generation failed");
                self.phase = Phase::Step(Step::LAST);
                self.last_error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Outcome::GenerationFailed
            }
        }
    }

    /// Return to the last step without an error, e.g. when the in-flight call
    /// was dropped.
    pub fn abandon_generation(&mut self) -> bool {
        if self.phase != Phase::Generating {
            return false;
        }
        tracing::debug!("generation abandoned");
        self.phase = Phase::Step(Step::LAST);
        true
    }

    /// Run `f` on the form if it may currently be edited.
    pub(crate) fn edit_form<T>(
        &mut self,
        f: impl FnOnce(&mut FormData) -> T,
    ) -> Result<T, IgnoreReason> {
        self.editable()?;
        Ok(f(&mut self.form))
    }

    fn editable(&self) -> Result<(), IgnoreReason> {
        match self.phase {
            Phase::Step(_) => Ok(()),
            Phase::Generating => Err(IgnoreReason::GenerationInFlight),
            Phase::Result => Err(IgnoreReason::Finished),
        }
    }

    // --- Navigation ---

    fn advance(&mut self) -> Outcome {
        let step = match self.phase {
            Phase::Step(s) => s,
            Phase::Generating => return IgnoreReason::GenerationInFlight.into(),
            Phase::Result => return IgnoreReason::Finished.into(),
        };
        if !step.is_complete(&self.form) {
            return IgnoreReason::StepIncomplete(step).into();
        }
        match step.next() {
            Some(next) => {
                self.phase = Phase::Step(next);
                Outcome::Applied
            }
            None => {
                self.phase = Phase::Generating;
                self.last_error = None;
                self.generation_attempts += 1;
                tracing::info!(attempt = self.generation_attempts, "starting documentation generation");
                Outcome::Generate(Box::new(self.form.clone()))
            }
        }
    }

    fn back(&mut self) -> Outcome {
        match self.phase {
            Phase::Step(s) => match s.prev() {
                Some(prev) => {
                    self.phase = Phase::Step(prev);
                    Outcome::Applied
                }
                None => IgnoreReason::AtFirstStep.into(),
            },
            Phase::Generating => IgnoreReason::GenerationInFlight.into(),
            Phase::Result => IgnoreReason::Finished.into(),
        }
    }

    fn go_to(&mut self, target: Step) -> Outcome {
        let current = match self.phase {
            Phase::Step(s) => s,
            Phase::Generating => return IgnoreReason::GenerationInFlight.into(),
            Phase::Result => return IgnoreReason::Finished.into(),
        };
        if target > current {
            let blocked = Step::ALL[current.number() - 1..target.number() - 1]
                .iter()
                .copied()
                .find(|s| !s.is_complete(&self.form));
            if let Some(step) = blocked {
                return IgnoreReason::StepIncomplete(step).into();
            }
        }
        self.phase = Phase::Step(target);
        Outcome::Applied
    }

    // --- Form edits ---

    fn edit(&mut self, action: Action) -> Outcome {
        let form = &mut self.form;
        match action {
            Action::SetCategory(c) => form.category = Some(c),
            Action::SetDocType(d) => form.doc_type = Some(d),
            Action::SetDetail(field, value) => *form.details.field_mut(field) = value,
            Action::AddProduct(name) => return add_product(form, &name),
            Action::RemoveProduct(name) => return remove_product(form, &name),
            Action::ToggleProduct(name) => {
                let name = name.trim();
                return if form.has_product(name) {
                    remove_product(form, name)
                } else {
                    add_product(form, name)
                };
            }
            Action::RenameProduct { from, to } => return rename_product(form, &from, &to),
            Action::ToggleAllergen { product, allergen } => {
                let product = product.trim();
                let Some(entry) = form.allergen_matrix.iter_mut().find(|e| e.product == product)
                else {
                    return IgnoreReason::UnknownProduct.into();
                };
                if !entry.allergens.remove(&allergen) {
                    entry.allergens.insert(allergen);
                }
            }
            Action::SetHazard { product, kind, text } => {
                let product = product.trim();
                let Some(row) = form.product_hazards.iter_mut().find(|h| h.product == product)
                else {
                    return IgnoreReason::UnknownProduct.into();
                };
                *row.field_mut(kind) = text;
            }
            Action::AddEquipment(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return IgnoreReason::Blank.into();
                }
                if form.has_equipment(name) {
                    return IgnoreReason::Duplicate.into();
                }
                form.equipment.push(Equipment {
                    name: name.to_string(),
                    count: 1,
                });
            }
            Action::RemoveEquipment(name) => {
                let Some(pos) = form.equipment.iter().position(|e| e.name == name.trim()) else {
                    return IgnoreReason::UnknownItem.into();
                };
                form.equipment.remove(pos);
            }
            Action::ToggleEquipment(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return IgnoreReason::Blank.into();
                }
                match form.equipment.iter().position(|e| e.name == name) {
                    Some(pos) => {
                        form.equipment.remove(pos);
                    }
                    None => form.equipment.push(Equipment {
                        name: name.to_string(),
                        count: 1,
                    }),
                }
            }
            Action::SetEquipmentCount { name, count } => {
                if count == 0 {
                    return IgnoreReason::InvalidCount.into();
                }
                let Some(item) = form.equipment.iter_mut().find(|e| e.name == name.trim()) else {
                    return IgnoreReason::UnknownItem.into();
                };
                item.count = count;
            }
            Action::AddStage(stage) => form.stages.push(stage),
            Action::UpdateStage { index, stage } => {
                let Some(slot) = form.stages.get_mut(index) else {
                    return IgnoreReason::UnknownItem.into();
                };
                *slot = stage;
            }
            Action::RemoveStage(index) => return remove_at(&mut form.stages, index),
            Action::AddSupplier(supplier) => {
                if !is_filled(&supplier.name) {
                    return IgnoreReason::Blank.into();
                }
                form.suppliers.push(supplier);
            }
            Action::RemoveSupplier(index) => return remove_at(&mut form.suppliers, index),
            Action::SetCondition(field, value) => {
                *form.working_conditions.field_mut(field) = value
            }
            Action::AddProcedure(block) => {
                if !is_filled(&block.title) {
                    return IgnoreReason::Blank.into();
                }
                form.procedures.push(block);
            }
            Action::RemoveProcedure(index) => return remove_at(&mut form.procedures, index),
            Action::Advance | Action::Back | Action::GoTo(_) => {
                unreachable!("navigation is handled by apply")
            }
        }
        Outcome::Applied
    }
}

fn add_product(form: &mut FormData, name: &str) -> Outcome {
    let name = name.trim();
    if name.is_empty() {
        return IgnoreReason::Blank.into();
    }
    if form.has_product(name) {
        return IgnoreReason::Duplicate.into();
    }
    form.products.push(name.to_string());
    sync_derived_tables(form);
    Outcome::Applied
}

fn remove_product(form: &mut FormData, name: &str) -> Outcome {
    let name = name.trim();
    let Some(pos) = form.products.iter().position(|p| p == name) else {
        return IgnoreReason::UnknownProduct.into();
    };
    form.products.remove(pos);
    sync_derived_tables(form);
    Outcome::Applied
}

fn rename_product(form: &mut FormData, from: &str, to: &str) -> Outcome {
    let (from, to) = (from.trim(), to.trim());
    let Some(pos) = form.products.iter().position(|p| p == from) else {
        return IgnoreReason::UnknownProduct.into();
    };
    if to.is_empty() {
        return IgnoreReason::Blank.into();
    }
    if from == to {
        return Outcome::Applied;
    }
    if form.has_product(to) {
        return IgnoreReason::Duplicate.into();
    }
    form.products[pos] = to.to_string();
    sync_derived_tables(form);
    Outcome::Applied
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Outcome {
    if index >= items.len() {
        return IgnoreReason::UnknownItem.into();
    }
    items.remove(index);
    Outcome::Applied
}
