use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use haccp_core::collab::{
    AllergenSuggestion, ContentGenerator, DishSuggestion, HazardSuggestion, StageSuggestion,
    Suggester,
};
use haccp_core::export::JsonExporter;
use haccp_core::result::ControlPoint;
use haccp_core::wizard::GENERATION_FAILED_MESSAGE;
use haccp_core::{
    Action, Allergen, Category, Equipment, ExportError, FormData, GenerateError, GeneratedResult,
    IgnoreReason, Outcome, Phase, ProcedureBlock, ProductionStage, Step, WizardSession,
    WizardState,
};
use tokio::sync::Notify;

/// Counts calls and holds each one until released.
#[derive(Default)]
struct GatedGenerator {
    calls: AtomicUsize,
    release: Notify,
    fail_first: bool,
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn generate(&self, _form: &FormData) -> Result<GeneratedResult, GenerateError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        if self.fail_first && n == 0 {
            return Err(GenerateError::Backend("connection reset".into()));
        }
        Ok(GeneratedResult {
            summary: "HACCP plan".into(),
            ccps: vec![ControlPoint {
                title: "Cooking".into(),
                ..Default::default()
            }],
            ..Default::default()
        })
    }
}

struct CannedSuggester;

#[async_trait]
impl Suggester for CannedSuggester {
    async fn suggest_dishes(&self, _category: Category) -> Vec<DishSuggestion> {
        vec![DishSuggestion {
            name: "Bigos".into(),
            kind: "meat".into(),
        }]
    }

    async fn suggest_allergens(&self, products: &[String]) -> Vec<AllergenSuggestion> {
        products
            .iter()
            .map(|p| AllergenSuggestion {
                dish: p.clone(),
                allergens: vec!["Gluten".into(), "Milk (lactose)".into()],
            })
            .collect()
    }

    async fn suggest_hazards(&self, products: &[String]) -> Vec<HazardSuggestion> {
        products
            .iter()
            .map(|p| HazardSuggestion {
                product_name: p.clone(),
                biological: "Listeria".into(),
                chemical: "Detergent residue".into(),
                physical: "Glass".into(),
            })
            .collect()
    }

    async fn suggest_stages(&self, _category: Category) -> Vec<StageSuggestion> {
        vec![StageSuggestion {
            name: "Receiving".into(),
            description: "Check delivery temperature".into(),
        }]
    }

    async fn suggest_procedures(&self, _category: Category) -> Vec<ProcedureBlock> {
        vec![ProcedureBlock {
            title: "Hand washing".into(),
            content: "Wash for 30 seconds".into(),
        }]
    }
}

fn complete_form() -> FormData {
    let mut form = FormData::default();
    form.details.name = "Bistro Pod Lipami".into();
    form.details.tax_id = "5260250274".into();
    form.products = vec!["Pierogi".into(), "Salad".into()];
    form.equipment.push(Equipment {
        name: "Slicer".into(),
        count: 1,
    });
    form.stages = vec![
        ProductionStage::new("Receiving", "Check deliveries"),
        ProductionStage::new("Storage", "Chilled at 0-4C"),
        ProductionStage::new("Cooking", "Core above 75C"),
    ];
    form.working_conditions.temperature = "18-22C".into();
    form.working_conditions.humidity = "45-60%".into();
    form.working_conditions.ventilation = "Mechanical".into();
    form
}

fn session_at_last_step(generator: Arc<GatedGenerator>) -> WizardSession<GatedGenerator> {
    let mut state = WizardState::with_form(complete_form());
    assert_eq!(state.apply(Action::GoTo(Step::LAST)), Outcome::Applied);
    WizardSession::with_state(state, generator)
}

#[tokio::test]
async fn walks_every_step_with_advance() {
    let generator = Arc::new(GatedGenerator::default());
    let session = WizardSession::with_state(WizardState::with_form(complete_form()), generator);
    for expected in 2..=Step::LAST.number() {
        assert_eq!(session.advance().await, Outcome::Applied);
        assert_eq!(session.with(|s| s.current_step_index()), expected);
    }
}

#[tokio::test]
async fn concurrent_advance_runs_generator_once() {
    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());

    let first = session.advance();
    let second = async {
        tokio::task::yield_now().await;
        let outcome = session.advance().await;
        generator.release.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, Outcome::Generated);
    assert_eq!(second, Outcome::Ignored(IgnoreReason::GenerationInFlight));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.with(|s| s.phase()), Phase::Result);
    assert_eq!(session.with(|s| s.generation_attempts()), 1);
}

#[tokio::test]
async fn state_reports_submitting_while_call_is_pending() {
    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());

    let run = session.advance();
    let observer = async {
        tokio::task::yield_now().await;
        let submitting = session.with(|s| s.is_submitting());
        let edit = session.dispatch(Action::AddProduct("Bigos".into())).await;
        generator.release.notify_one();
        (submitting, edit)
    };
    let (outcome, (submitting, edit)) = tokio::join!(run, observer);

    assert!(submitting);
    assert_eq!(edit, Outcome::Ignored(IgnoreReason::GenerationInFlight));
    assert_eq!(outcome, Outcome::Generated);
    assert!(!session.with(|s| s.form().has_product("Bigos")));
}

#[tokio::test]
async fn failure_returns_to_last_step_and_retry_succeeds() {
    let generator = Arc::new(GatedGenerator {
        fail_first: true,
        ..Default::default()
    });
    let session = session_at_last_step(generator.clone());

    generator.release.notify_one();
    assert_eq!(session.advance().await, Outcome::GenerationFailed);
    session.with(|s| {
        assert_eq!(s.phase(), Phase::Step(Step::LAST));
        assert_eq!(s.last_error(), Some(GENERATION_FAILED_MESSAGE));
        assert!(s.result().is_none());
    });

    generator.release.notify_one();
    assert_eq!(session.advance().await, Outcome::Generated);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.with(|s| s.last_error().map(str::to_owned)), None);
}

#[tokio::test]
async fn dropped_generation_reverts_to_last_step() {
    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());

    let timed_out =
        tokio::time::timeout(std::time::Duration::from_millis(20), session.advance()).await;
    assert!(timed_out.is_err());
    assert_eq!(session.with(|s| s.phase()), Phase::Step(Step::LAST));
    assert!(session.with(|s| s.last_error().is_none()));
}

#[tokio::test]
async fn snapshot_is_detached_from_session() {
    let session = WizardSession::with_state(
        WizardState::with_form(complete_form()),
        Arc::new(GatedGenerator::default()),
    );
    let before = session.snapshot();
    session.dispatch(Action::AddProduct("Bigos".into())).await;
    assert!(!before.form().has_product("Bigos"));
    assert!(session.snapshot().form().has_product("Bigos"));
    assert_eq!(before.phase(), Phase::Step(Step::FIRST));
}

#[tokio::test]
async fn incomplete_last_step_never_calls_generator() {
    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());
    session
        .dispatch(Action::SetCondition(
            haccp_core::ConditionField::Ventilation,
            String::new(),
        ))
        .await;
    assert_eq!(
        session.advance().await,
        Outcome::Ignored(IgnoreReason::StepIncomplete(Step::LAST))
    );
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn suggestions_fill_derived_tables() {
    let session = WizardSession::with_state(
        WizardState::with_form(complete_form()),
        Arc::new(GatedGenerator::default()),
    );

    assert_eq!(session.suggest_allergens(&CannedSuggester).await, Outcome::Applied);
    assert_eq!(session.suggest_hazards(&CannedSuggester).await, Outcome::Applied);
    assert_eq!(session.suggest_stages(&CannedSuggester).await, Outcome::Applied);
    assert_eq!(session.suggest_procedures(&CannedSuggester).await, Outcome::Applied);

    let dishes = session.suggest_dishes(&CannedSuggester).await;
    assert_eq!(dishes[0].name, "Bigos");

    session.with(|s| {
        let form = s.form();
        let pierogi = form.allergens_for("Pierogi").unwrap();
        assert!(pierogi.contains(&Allergen::Gluten));
        assert!(pierogi.contains(&Allergen::Milk));
        assert_eq!(form.hazards_for("Salad").unwrap().physical, "Glass");
        // "Receiving" was already listed.
        assert_eq!(form.stages.len(), 3);
        assert_eq!(form.procedures.len(), 1);
    });
}

#[tokio::test]
async fn allergen_suggestions_need_products() {
    let session = WizardSession::new(Arc::new(GatedGenerator::default()));
    assert_eq!(
        session.suggest_allergens(&CannedSuggester).await,
        Outcome::Ignored(IgnoreReason::NothingToSuggest)
    );
}

#[tokio::test]
async fn export_needs_a_result() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());
    let exporter = JsonExporter::new(dir.path());

    assert!(matches!(
        session.export(&exporter),
        Err(ExportError::NothingToExport)
    ));

    generator.release.notify_one();
    assert_eq!(session.advance().await, Outcome::Generated);
    let path = session.export(&exporter).unwrap();
    assert!(path.ends_with("HACCP_Bistro_Pod_Lipami.json"));
    assert_eq!(session.with(|s| s.phase()), Phase::Result);
}

#[tokio::test]
async fn failed_export_keeps_result() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let generator = Arc::new(GatedGenerator::default());
    let session = session_at_last_step(generator.clone());
    generator.release.notify_one();
    session.advance().await;

    let err = session.export(&JsonExporter::new(&blocker)).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(session.with(|s| s.result().is_some()));
}
