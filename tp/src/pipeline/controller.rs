//! PipelineController - sequences the stages and owns session state

use std::path::Path;
use std::sync::Arc;

use prefstore::PreferenceStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{GenerationBackend, PlanError, Stage, StageBackends, StageContext, StageContextBuilder};
use crate::conversation::{ConversationLog, PREFERENCE_NOTED_MARKER, USER_PREFERENCE_MARKER};

/// The three artifacts of one successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripResult {
    pub outline: String,
    pub detailed_itinerary: String,
    pub packing_checklist: String,
}

/// Where the current (or last) `plan_trip` call is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Stage1Running,
    Stage2Running,
    Stage3Running,
    Committed,
    Failed,
}

/// Orchestrates the three stages and owns the preference store and session log
///
/// Mutating operations take `&mut self`, so at most one `plan_trip` can be in
/// flight per controller. Share it behind a lock if several tasks need it.
pub struct PipelineController {
    store: PreferenceStore,
    log: ConversationLog,
    backends: StageBackends,
    state: PipelineState,
}

impl PipelineController {
    /// Create a controller around an already opened store
    pub fn new(store: PreferenceStore, backends: StageBackends) -> Self {
        debug!(preferences = store.len(), "PipelineController::new: called");
        Self {
            store,
            log: ConversationLog::new(),
            backends,
            state: PipelineState::Idle,
        }
    }

    /// Create a controller whose store is loaded from `path`
    pub fn open(path: impl AsRef<Path>, backends: StageBackends) -> Self {
        Self::new(PreferenceStore::open(path), backends)
    }

    /// Run outline, itinerary and packing in order
    ///
    /// On success a request/response turn pair is appended to the session log.
    /// On failure the log is left exactly as it was and the failing stage is
    /// reported.
    pub async fn plan_trip(&mut self, destination: &str, duration_days: u32) -> Result<TripResult, PlanError> {
        debug!(%destination, %duration_days, "PipelineController::plan_trip: called");

        let destination = destination.trim();
        if destination.is_empty() {
            return Err(PlanError::Validation("destination must not be empty".to_string()));
        }
        if duration_days == 0 {
            return Err(PlanError::Validation("duration must be at least one day".to_string()));
        }

        self.state = PipelineState::Idle;
        let builder = StageContextBuilder::new(&self.list_preferences(), &self.log);

        info!(%destination, %duration_days, "Planning trip");
        let outline = self.run_stage(builder.outline(destination, duration_days)).await?;
        let detailed_itinerary = self.run_stage(builder.itinerary(destination, &outline)).await?;
        let packing_checklist = self.run_stage(builder.packing(destination, &detailed_itinerary)).await?;

        self.log.user(format!("Plan trip to {} for {} days", destination, duration_days));
        self.log.system("Generated complete travel plan including outline, detailed itinerary, and packing list");
        self.state = PipelineState::Committed;
        info!(%destination, "Trip plan committed");

        Ok(TripResult {
            outline,
            detailed_itinerary,
            packing_checklist,
        })
    }

    async fn run_stage(&mut self, context: StageContext) -> Result<String, PlanError> {
        let stage: Stage = context.stage();
        self.state = stage.running_state();
        info!(%stage, "Running stage");

        let backend: Arc<dyn GenerationBackend> = Arc::clone(self.backends.get(stage));
        match backend.generate(&context).await {
            Ok(text) => {
                debug!(%stage, output_len = text.len(), "PipelineController::run_stage: succeeded");
                Ok(text)
            }
            Err(source) => {
                warn!(%stage, error = %source, "Stage failed");
                self.state = PipelineState::Failed;
                Err(PlanError::Generation { stage, source })
            }
        }
    }

    /// Store a preference durably
    ///
    /// Returns whether it was new. New preferences are also recorded in the
    /// session log using the same markers preference mining looks for.
    pub fn add_preference(&mut self, text: &str) -> Result<bool, PlanError> {
        debug!(%text, "PipelineController::add_preference: called");
        let text = text.trim();
        if text.is_empty() {
            return Err(PlanError::Validation("preference must not be empty".to_string()));
        }

        let added = self.store.add(text);
        if added {
            self.log.user(format!("{} {}", USER_PREFERENCE_MARKER, text));
            self.log.system(format!("{} {}", PREFERENCE_NOTED_MARKER, text));
            info!(preference = %text, "Preference saved");
        }
        Ok(added)
    }

    /// Drop a durable preference; the session log is never rewritten
    ///
    /// The text is trimmed the same way `add_preference` trims it.
    pub fn remove_preference(&mut self, text: &str) -> bool {
        debug!(%text, "PipelineController::remove_preference: called");
        let text = text.trim();
        let removed = self.store.remove(text);
        if removed {
            info!(preference = %text, "Preference removed");
        }
        removed
    }

    /// Durable preferences first, then preferences mined from this session
    pub fn list_preferences(&self) -> Vec<String> {
        let mut preferences = self.store.all();
        let mined = self.log.mine_session_preferences(&preferences);
        preferences.extend(mined);
        preferences
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.log
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Returns a fixed string (or fails) and records every context it saw
    struct StubBackend {
        output: Option<String>,
        seen: Mutex<Vec<StageContext>>,
    }

    impl StubBackend {
        fn ok(output: &str) -> Arc<Self> {
            Arc::new(Self {
                output: Some(output.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                output: None,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<StageContext> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn generate(&self, context: &StageContext) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(context.clone());
            self.output
                .clone()
                .ok_or_else(|| GenerationError::Backend("quota exceeded".to_string()))
        }
    }

    struct Fixture {
        _temp: TempDir,
        controller: PipelineController,
        outline: Arc<StubBackend>,
        itinerary: Arc<StubBackend>,
        packing: Arc<StubBackend>,
    }

    fn fixture(outline: Arc<StubBackend>, itinerary: Arc<StubBackend>, packing: Arc<StubBackend>) -> Fixture {
        let temp = TempDir::new().unwrap();
        let backends = StageBackends::new(outline.clone(), itinerary.clone(), packing.clone());
        let controller = PipelineController::open(temp.path().join("prefs.json"), backends);
        Fixture {
            _temp: temp,
            controller,
            outline,
            itinerary,
            packing,
        }
    }

    fn happy() -> Fixture {
        fixture(StubBackend::ok("O"), StubBackend::ok("D"), StubBackend::ok("P"))
    }

    #[tokio::test]
    async fn test_plan_trip_feeds_each_stage_the_previous_output() {
        let mut f = happy();
        let result = f.controller.plan_trip("Japan", 7).await.unwrap();

        assert_eq!(
            result,
            TripResult {
                outline: "O".to_string(),
                detailed_itinerary: "D".to_string(),
                packing_checklist: "P".to_string(),
            }
        );

        let outline = f.outline.seen();
        let itinerary = f.itinerary.seen();
        let packing = f.packing.seen();
        assert_eq!(outline.len(), 1);
        assert_eq!(itinerary.len(), 1);
        assert_eq!(packing.len(), 1);

        assert!(matches!(
            &outline[0],
            StageContext::Outline { duration_days: 7, destination, .. } if destination == "Japan"
        ));
        assert_eq!(itinerary[0].previous_output(), Some("O"));
        assert_eq!(packing[0].previous_output(), Some("D"));
        assert_eq!(packing[0].preferences(), None);
        assert_eq!(f.controller.state(), PipelineState::Committed);
    }

    #[tokio::test]
    async fn test_plan_trip_commits_one_turn_pair() {
        let mut f = happy();
        f.controller.plan_trip("Peru", 5).await.unwrap();

        let turns = f.controller.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "Plan trip to Peru for 5 days");
        assert_eq!(
            turns[1].text,
            "Generated complete travel plan including outline, detailed itinerary, and packing list"
        );
    }

    #[tokio::test]
    async fn test_stage_two_failure_leaves_log_untouched() {
        let mut f = fixture(StubBackend::ok("O"), StubBackend::failing(), StubBackend::ok("P"));
        f.controller.add_preference("love hiking").unwrap();
        let before = f.controller.conversation().clone();

        let err = f.controller.plan_trip("Japan", 7).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Itinerary));
        assert!(matches!(err, PlanError::Generation { .. }));
        assert_eq!(f.controller.conversation(), &before);
        assert_eq!(f.controller.state(), PipelineState::Failed);
        assert!(f.packing.seen().is_empty());
    }

    #[tokio::test]
    async fn test_controller_is_reusable_after_failure() {
        let mut f = fixture(StubBackend::failing(), StubBackend::ok("D"), StubBackend::ok("P"));
        assert!(f.controller.plan_trip("Japan", 7).await.is_err());

        let replacement: Arc<dyn GenerationBackend> = StubBackend::ok("O2");
        f.controller.backends.outline = replacement;
        let result = f.controller.plan_trip("Japan", 7).await.unwrap();
        assert_eq!(result.outline, "O2");
        assert_eq!(f.controller.state(), PipelineState::Committed);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_stage() {
        let mut f = happy();

        assert!(matches!(
            f.controller.plan_trip("   ", 3).await,
            Err(PlanError::Validation(_))
        ));
        assert!(matches!(
            f.controller.plan_trip("Peru", 0).await,
            Err(PlanError::Validation(_))
        ));
        assert!(f.outline.seen().is_empty());
        assert!(f.controller.conversation().is_empty());
        assert_eq!(f.controller.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_stages_see_combined_preferences() {
        let mut f = happy();
        f.controller.add_preference("love hiking").unwrap();
        f.controller.log.user("I hate crowded beaches");

        f.controller.plan_trip("Peru", 5).await.unwrap();

        let expected = "love hiking | I hate crowded beaches";
        assert_eq!(f.outline.seen()[0].preferences(), Some(expected));
        assert_eq!(f.itinerary.seen()[0].preferences(), Some(expected));
    }

    #[tokio::test]
    async fn test_stages_see_fallback_without_preferences() {
        let mut f = happy();
        f.controller.plan_trip("Peru", 5).await.unwrap();
        assert_eq!(
            f.outline.seen()[0].preferences(),
            Some("No specific preferences stored yet.")
        );
    }

    #[test]
    fn test_add_preference_is_idempotent_and_logged_once() {
        let mut f = happy();

        assert!(f.controller.add_preference("love hiking").unwrap());
        assert!(!f.controller.add_preference("love hiking").unwrap());

        assert_eq!(f.controller.store().all(), vec!["love hiking".to_string()]);
        let turns = f.controller.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "User preference: love hiking");
        assert_eq!(turns[1].text, "Preference noted: love hiking");
    }

    #[test]
    fn test_add_blank_preference_is_rejected() {
        let mut f = happy();
        assert!(matches!(f.controller.add_preference("  "), Err(PlanError::Validation(_))));
        assert!(f.controller.store().is_empty());
    }

    #[test]
    fn test_list_preferences_orders_durable_before_mined() {
        let mut f = happy();
        f.controller.log.user("I prefer trains");
        f.controller.add_preference("b-durable").unwrap();
        f.controller.add_preference("a-durable").unwrap();
        f.controller.log.user("I enjoy street food");

        assert_eq!(
            f.controller.list_preferences(),
            vec![
                "b-durable".to_string(),
                "a-durable".to_string(),
                "I prefer trains".to_string(),
                "I enjoy street food".to_string(),
            ]
        );
    }

    #[test]
    fn test_remove_preference_keeps_history() {
        let mut f = happy();
        f.controller.add_preference("love hiking").unwrap();
        let before = f.controller.conversation().clone();

        assert!(f.controller.remove_preference("love hiking"));
        assert!(!f.controller.remove_preference("love hiking"));
        assert!(f.controller.store().is_empty());
        assert_eq!(f.controller.conversation(), &before);
    }

    #[test]
    fn test_remove_preference_accepts_same_untrimmed_text() {
        let mut f = happy();
        assert!(f.controller.add_preference(" love hiking ").unwrap());
        assert_eq!(f.controller.store().all(), vec!["love hiking".to_string()]);

        assert!(f.controller.remove_preference(" love hiking "));
        assert!(f.controller.store().is_empty());
    }
}
