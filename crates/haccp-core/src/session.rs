//! A wizard shared between UI event handlers.
//!
//! The state sits behind a mutex that is never held across an await. While the
//! generator runs the state is in `Generating`, so a second `advance` sees that
//! and is rejected instead of starting another call.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::collab::{ContentGenerator, DishSuggestion, Suggester};
use crate::export::{ReportBundle, ReportExporter};
use crate::wizard::{Action, IgnoreReason, Outcome, WizardState};
use crate::ExportError;

pub struct WizardSession<G> {
    state: Mutex<WizardState>,
    generator: Arc<G>,
}

impl<G: ContentGenerator> WizardSession<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self::with_state(WizardState::new(), generator)
    }

    pub fn with_state(state: WizardState, generator: Arc<G>) -> Self {
        Self {
            state: Mutex::new(state),
            generator,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the current state.
    pub fn with<T>(&self, f: impl FnOnce(&WizardState) -> T) -> T {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> WizardState {
        self.lock().clone()
    }

    /// Apply one action. When it starts generation, the generator is awaited
    /// here and the returned outcome is `Generated` or `GenerationFailed`.
    pub async fn dispatch(&self, action: Action) -> Outcome {
        let outcome = self.lock().apply(action);
        let snapshot = match outcome {
            Outcome::Generate(form) => form,
            other => return other,
        };

        let mut flight = InFlight { session: self, armed: true };
        let result = self.generator.generate(&snapshot).await;
        flight.armed = false;

        self.lock().complete_generation(result)
    }

    pub async fn advance(&self) -> Outcome {
        self.dispatch(Action::Advance).await
    }

    pub async fn back(&self) -> Outcome {
        self.dispatch(Action::Back).await
    }

    // --- Suggestions ---

    /// Dish ideas for the selected category. The form is not changed; the
    /// caller offers them and adds the chosen ones with `ToggleProduct`.
    pub async fn suggest_dishes<S: Suggester + ?Sized>(&self, suggester: &S) -> Vec<DishSuggestion> {
        let Some(category) = self.lock().form().category else {
            return Vec::new();
        };
        suggester.suggest_dishes(category).await
    }

    pub async fn suggest_allergens<S: Suggester + ?Sized>(&self, suggester: &S) -> Outcome {
        let products = self.lock().form().products.clone();
        if products.is_empty() {
            return IgnoreReason::NothingToSuggest.into();
        }
        let suggestions = suggester.suggest_allergens(&products).await;
        self.accept(|form| form.apply_allergen_suggestions(&suggestions))
    }

    pub async fn suggest_hazards<S: Suggester + ?Sized>(&self, suggester: &S) -> Outcome {
        let products = self.lock().form().products.clone();
        if products.is_empty() {
            return IgnoreReason::NothingToSuggest.into();
        }
        let suggestions = suggester.suggest_hazards(&products).await;
        self.accept(|form| form.apply_hazard_suggestions(&suggestions))
    }

    pub async fn suggest_stages<S: Suggester + ?Sized>(&self, suggester: &S) -> Outcome {
        let Some(category) = self.lock().form().category else {
            return IgnoreReason::NothingToSuggest.into();
        };
        let suggestions = suggester.suggest_stages(category).await;
        self.accept(|form| form.apply_stage_suggestions(&suggestions))
    }

    pub async fn suggest_procedures<S: Suggester + ?Sized>(&self, suggester: &S) -> Outcome {
        let Some(category) = self.lock().form().category else {
            return IgnoreReason::NothingToSuggest.into();
        };
        let suggestions = suggester.suggest_procedures(category).await;
        self.accept(|form| form.apply_procedure_suggestions(&suggestions))
    }

    fn accept(&self, f: impl FnOnce(&mut crate::FormData) -> usize) -> Outcome {
        match self.lock().edit_form(f) {
            Ok(changed) => {
                tracing::debug!(changed, "suggestions applied");
                Outcome::Applied
            }
            Err(reason) => reason.into(),
        }
    }

    // --- Export ---

    /// Hand the generated report to `exporter`. Failures leave the wizard as it was.
    pub fn export<E: ReportExporter + ?Sized>(&self, exporter: &E) -> Result<PathBuf, ExportError> {
        let state = self.lock();
        let result = state.result().ok_or(ExportError::NothingToExport)?;
        let bundle = ReportBundle {
            form: state.form(),
            result,
        };
        exporter.export(&bundle).inspect_err(|e| {
            tracing::warn!(error = %e, "report export failed");
        })
    }
}

/// Reverts to the last step if the generation future is dropped mid-call.
struct InFlight<'a, G> {
    session: &'a WizardSession<G>,
    armed: bool,
}

impl<G> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            self.session
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abandon_generation();
        }
    }
}
