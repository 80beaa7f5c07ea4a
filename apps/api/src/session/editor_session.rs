//! EditorSession: the single owner of one user's resume while it is being edited.
//!
//! Edits are applied synchronously under the session lock. Each change bumps a
//! generation counter and reschedules a debounced scoring pass; a pass only
//! publishes if its generation is still current, so a stale record is never
//! shown after a newer edit. Record changes also mark the session dirty and
//! reschedule an autosave through the injected repository.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::{AnalysisSnapshot, SessionSettings};
use crate::editor::{self, Edit, MutationError, ValidationReport};
use crate::models::{AtsAnalysis, ResumeRecord};
use crate::remote::{OptimizationOptions, Optimized, ResumeOptimizer};
use crate::repository::ResumeRepository;
use crate::scoring::{self, KeywordSelection};

const OPTIMIZER_UNAVAILABLE: &str = "AI optimization is not available right now. Showing local ATS analysis instead.";

// ────────────────────────────────────────────────────────────────────────────
// Scoring inputs
// ────────────────────────────────────────────────────────────────────────────

/// Everything a scoring pass reads. Two inputs are the same when the record is
/// the same allocation and the job description and selection are equal.
#[derive(Debug, Clone)]
pub(crate) struct ScoreInputs {
    record: Arc<ResumeRecord>,
    job_description: String,
    selection: KeywordSelection,
}

impl ScoreInputs {
    fn same_as(&self, other: &ScoreInputs) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
            && self.job_description == other.job_description
            && self.selection == other.selection
    }

    fn score(&self) -> AtsAnalysis {
        scoring::score(&self.record, &self.job_description, self.selection.as_slice())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session internals
// ────────────────────────────────────────────────────────────────────────────

struct SessionState {
    record: Arc<ResumeRecord>,
    job_description: String,
    selection: KeywordSelection,
    dirty: bool,
    scoring: Debouncer,
    autosave: Debouncer,
}

impl SessionState {
    fn inputs(&self) -> ScoreInputs {
        ScoreInputs {
            record: self.record.clone(),
            job_description: self.job_description.clone(),
            selection: self.selection.clone(),
        }
    }
}

/// State shared with the debounced tasks.
struct Shared {
    user_id: String,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    analysis: watch::Sender<AnalysisSnapshot>,
    repository: Arc<dyn ResumeRepository>,
}

impl Shared {
    /// Scores `inputs` and publishes the result if `generation` is still current.
    /// Returns true when a new snapshot was published.
    fn publish(&self, inputs: ScoreInputs, generation: u64) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Scoring pass {generation} superseded for user {}", self.user_id);
            return false;
        }
        let unchanged = self
            .analysis
            .borrow()
            .inputs
            .as_ref()
            .is_some_and(|previous| previous.same_as(&inputs));
        if unchanged {
            debug!("Scoring inputs unchanged for user {}, skipping", self.user_id);
            return false;
        }

        let analysis = inputs.score();
        let band = analysis.band();
        let published = self.analysis.send_if_modified(|snapshot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *snapshot = AnalysisSnapshot {
                generation,
                analysis: Some(analysis),
                band: Some(band),
                inputs: Some(inputs),
            };
            true
        });
        if published {
            debug!("Published analysis {generation} for user {} ({band:?})", self.user_id);
        }
        published
    }

    /// Saves `record` and clears the dirty flag if it is still the current record.
    async fn persist(&self, record: Arc<ResumeRecord>) -> anyhow::Result<()> {
        self.repository.save(&self.user_id, &record).await?;
        let mut state = self.state.lock().await;
        if Arc::ptr_eq(&state.record, &record) {
            state.dirty = false;
        }
        debug!("Persisted resume for user {}", self.user_id);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public session API
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of an optimization request. When the optimizer is missing or fails,
/// `fallback` is set, `analysis` holds a local scoring pass and `message`
/// explains why.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub html: Option<String>,
    pub optimized_record: Option<ResumeRecord>,
    pub analysis: Option<AtsAnalysis>,
    pub fallback: bool,
    pub message: Option<String>,
}

pub struct EditorSession {
    shared: Arc<Shared>,
}

impl EditorSession {
    /// Starts a session over `record` and schedules the first scoring pass.
    pub async fn start(
        user_id: &str,
        record: ResumeRecord,
        repository: Arc<dyn ResumeRepository>,
        settings: SessionSettings,
    ) -> Self {
        let (analysis, _) = watch::channel(AnalysisSnapshot::default());
        let session = Self {
            shared: Arc::new(Shared {
                user_id: user_id.to_string(),
                state: Mutex::new(SessionState {
                    record: Arc::new(record),
                    job_description: String::new(),
                    selection: KeywordSelection::default(),
                    dirty: false,
                    scoring: Debouncer::new(settings.scoring_debounce),
                    autosave: Debouncer::new(settings.autosave_debounce),
                }),
                generation: AtomicU64::new(0),
                analysis,
                repository,
            }),
        };
        {
            let mut state = session.shared.state.lock().await;
            session.reschedule_scoring(&mut state);
        }
        session
    }

    pub fn user_id(&self) -> &str {
        &self.shared.user_id
    }

    pub async fn record(&self) -> Arc<ResumeRecord> {
        self.shared.state.lock().await.record.clone()
    }

    pub async fn job_description(&self) -> String {
        self.shared.state.lock().await.job_description.clone()
    }

    pub async fn selected_keywords(&self) -> Vec<String> {
        self.shared.state.lock().await.selection.as_slice().to_vec()
    }

    pub async fn is_dirty(&self) -> bool {
        self.shared.state.lock().await.dirty
    }

    pub async fn validation(&self) -> ValidationReport {
        editor::validate(&*self.record().await)
    }

    /// Applies one edit. A no-op edit leaves the session untouched.
    pub async fn apply(&self, edit: &Edit) -> Result<Arc<ResumeRecord>, MutationError> {
        let mut state = self.shared.state.lock().await;
        let next = editor::apply(&state.record, edit)?;
        if Arc::ptr_eq(&next, &state.record) {
            return Ok(next);
        }
        state.record = next.clone();
        state.dirty = true;
        self.reschedule_scoring(&mut state);
        self.schedule_autosave(&mut state);
        Ok(next)
    }

    pub async fn set_job_description(&self, job_description: &str) {
        let mut state = self.shared.state.lock().await;
        if state.job_description == job_description {
            return;
        }
        state.job_description = job_description.to_string();
        self.reschedule_scoring(&mut state);
    }

    /// Flips `keyword` in the selection. Returns true when it is now selected.
    pub async fn toggle_keyword(&self, keyword: &str) -> bool {
        let mut state = self.shared.state.lock().await;
        let selected = state.selection.toggle(keyword);
        self.reschedule_scoring(&mut state);
        selected
    }

    /// Cancels any pending pass and scores the current state right away.
    pub async fn analyze_now(&self) -> AnalysisSnapshot {
        {
            let mut state = self.shared.state.lock().await;
            state.scoring.cancel();
            let generation = self.shared.generation.load(Ordering::SeqCst);
            self.shared.publish(state.inputs(), generation);
        }
        self.latest()
    }

    pub fn latest(&self) -> AnalysisSnapshot {
        self.shared.analysis.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.shared.analysis.subscribe()
    }

    /// Cancels a pending autosave and writes the current record now.
    pub async fn save_now(&self) -> anyhow::Result<()> {
        let record = {
            let mut state = self.shared.state.lock().await;
            state.autosave.cancel();
            state.record.clone()
        };
        self.shared.persist(record).await?;
        info!("Saved resume for user {}", self.shared.user_id);
        Ok(())
    }

    /// Asks `optimizer` for an ATS-optimized version of the current record.
    /// Any failure degrades to a local scoring pass carrying the failure message.
    pub async fn optimize(
        &self,
        optimizer: Option<&dyn ResumeOptimizer>,
        options: &OptimizationOptions,
    ) -> OptimizationOutcome {
        let (record, job_description, selection) = {
            let state = self.shared.state.lock().await;
            (state.record.clone(), state.job_description.clone(), state.selection.clone())
        };

        let result = match optimizer {
            Some(optimizer) => optimizer
                .optimize(&record, &self.shared.user_id, options)
                .await
                .map_err(|e| {
                    warn!("Optimization failed for user {}: {e}", self.shared.user_id);
                    e.user_message().to_string()
                }),
            None => Err(OPTIMIZER_UNAVAILABLE.to_string()),
        };

        match result {
            Ok(Optimized::Html(html)) => OptimizationOutcome {
                html: Some(html),
                optimized_record: None,
                analysis: None,
                fallback: false,
                message: None,
            },
            Ok(Optimized::Record(optimized)) => {
                let analysis =
                    scoring::score(&optimized, &job_description, selection.as_slice());
                OptimizationOutcome {
                    html: None,
                    optimized_record: Some(optimized),
                    analysis: Some(analysis),
                    fallback: false,
                    message: None,
                }
            }
            Err(message) => OptimizationOutcome {
                html: None,
                optimized_record: None,
                analysis: self.analyze_now().await.analysis,
                fallback: true,
                message: Some(message),
            },
        }
    }

    fn reschedule_scoring(&self, state: &mut SessionState) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inputs = state.inputs();
        let shared = self.shared.clone();
        state.scoring.schedule(async move {
            shared.publish(inputs, generation);
        });
    }

    fn schedule_autosave(&self, state: &mut SessionState) {
        let record = state.record.clone();
        let shared = self.shared.clone();
        state.autosave.schedule(async move {
            if let Err(e) = shared.persist(record).await {
                warn!("Autosave failed for user {}: {e:#}", shared.user_id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::editor::{FieldPath, SectionKind};
    use crate::editor::section::{BasicDetailsField, ExperienceField};
    use crate::remote::RemoteError;
    use crate::repository::InMemoryResumeRepository;

    const SCORING: Duration = Duration::from_millis(1000);
    const AUTOSAVE: Duration = Duration::from_millis(1500);

    fn settings() -> SessionSettings {
        SessionSettings {
            scoring_debounce: SCORING,
            autosave_debounce: AUTOSAVE,
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn wait(duration: Duration) {
        settle().await;
        tokio::time::advance(duration).await;
        settle().await;
    }

    async fn session_with(repo: Arc<InMemoryResumeRepository>) -> EditorSession {
        EditorSession::start("u1", ResumeRecord::default(), repo, settings()).await
    }

    fn set_about(text: &str) -> Edit {
        Edit::Update {
            path: FieldPath::About,
            value: text.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_pass_publishes_after_debounce() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        assert!(session.latest().analysis.is_none());

        wait(SCORING).await;
        let snapshot = session.latest();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.analysis.unwrap().score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_scores_only_final_record() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        let mut rx = session.subscribe();

        for text in ["P", "Py", "Python"] {
            session.apply(&set_about(text)).await.unwrap();
            wait(Duration::from_millis(300)).await;
        }
        assert!(!rx.has_changed().unwrap());

        wait(SCORING).await;
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        let analysis = snapshot.analysis.unwrap();
        assert_eq!(analysis.keywords, vec!["Python".to_string()]);
        // start + three edits
        assert_eq!(snapshot.generation, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_edit_does_not_reschedule_or_dirty() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        wait(SCORING).await;
        let before = session.record().await;

        let after = session.apply(&set_about("")).await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(!session.is_dirty().await);
        assert_eq!(session.latest().generation, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_inputs_skip_rescoring() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        wait(SCORING).await;
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        assert!(session.toggle_keyword("Rust").await);
        assert!(!session.toggle_keyword("Rust").await);
        wait(SCORING).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_now_cancels_pending_pass() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        session
            .set_job_description("Seeking a Python developer with Docker experience")
            .await;
        session.apply(&set_about("Python")).await.unwrap();

        let snapshot = session.analyze_now().await;
        let analysis = snapshot.analysis.unwrap();
        assert_eq!(analysis.keywords, vec!["Python".to_string(), "Docker".to_string()]);
        assert!(analysis.missing_keywords.contains(&"docker".to_string()));

        let mut rx = session.subscribe();
        rx.borrow_and_update();
        wait(SCORING).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_never_publishes() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        let stale = {
            let state = session.shared.state.lock().await;
            state.inputs()
        };
        session.apply(&set_about("Python")).await.unwrap();
        assert!(!session.shared.publish(stale, 1));
        assert!(session.latest().analysis.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_after_quiet_period() {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let session = session_with(repo.clone()).await;
        session
            .apply(&Edit::Update {
                path: FieldPath::BasicDetails(BasicDetailsField::FirstName),
                value: "Ada".to_string(),
            })
            .await
            .unwrap();
        assert!(session.is_dirty().await);

        wait(Duration::from_millis(1000)).await;
        assert!(repo.load("u1").await.unwrap().is_none());

        wait(Duration::from_millis(500)).await;
        let saved = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(saved.basic_details.first_name, "Ada");
        assert!(!session.is_dirty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_flushes_and_cancels_autosave() {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let session = session_with(repo.clone()).await;
        session.apply(&Edit::Add(SectionKind::Experience)).await.unwrap();
        session
            .apply(&Edit::Update {
                path: FieldPath::Experience(0, ExperienceField::JobTitle),
                value: "Engineer".to_string(),
            })
            .await
            .unwrap();

        session.save_now().await.unwrap();
        assert!(!session.is_dirty().await);
        let saved = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(saved.experience[0].job_title, "Engineer");
        assert!(!session.shared.state.lock().await.autosave.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_description_is_not_persisted_or_dirty() {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let session = session_with(repo.clone()).await;
        session.set_job_description("Python role").await;
        assert!(!session.is_dirty().await);
        wait(AUTOSAVE).await;
        assert!(repo.load("u1").await.unwrap().is_none());
        assert_eq!(session.job_description().await, "Python role");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_edit_leaves_record_untouched() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        let before = session.record().await;
        let err = session
            .apply(&Edit::Remove {
                section: SectionKind::Education,
                index: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::IndexOutOfRange { .. }));
        assert!(Arc::ptr_eq(&before, &session.record().await));
        assert!(!session.is_dirty().await);
    }

    struct FailingOptimizer;

    #[async_trait]
    impl ResumeOptimizer for FailingOptimizer {
        async fn optimize(
            &self,
            _record: &ResumeRecord,
            _user_id: &str,
            _options: &OptimizationOptions,
        ) -> Result<Optimized, RemoteError> {
            Err(RemoteError::Network("connection refused".to_string()))
        }
    }

    struct EchoOptimizer;

    #[async_trait]
    impl ResumeOptimizer for EchoOptimizer {
        async fn optimize(
            &self,
            record: &ResumeRecord,
            _user_id: &str,
            _options: &OptimizationOptions,
        ) -> Result<Optimized, RemoteError> {
            let mut optimized = record.clone();
            optimized.skills = Arc::new(vec!["Python".to_string(), "SQL".to_string()]);
            Ok(Optimized::Record(optimized))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimize_failure_falls_back_to_local_scoring() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        session.apply(&set_about("Python")).await.unwrap();

        let outcome = session
            .optimize(Some(&FailingOptimizer), &OptimizationOptions::default())
            .await;
        assert!(outcome.fallback);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Network error - please check your connection")
        );
        assert_eq!(outcome.analysis.unwrap().keywords, vec!["Python".to_string()]);
        assert_eq!(
            session.latest().analysis.unwrap().keywords,
            vec!["Python".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimize_without_optimizer_falls_back() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        let outcome = session.optimize(None, &OptimizationOptions::default()).await;
        assert!(outcome.fallback);
        assert_eq!(outcome.message.as_deref(), Some(OPTIMIZER_UNAVAILABLE));
        assert_eq!(outcome.analysis.unwrap().score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimize_record_is_scored_but_not_applied() {
        let session = session_with(Arc::new(InMemoryResumeRepository::new())).await;
        let outcome = session
            .optimize(Some(&EchoOptimizer), &OptimizationOptions::default())
            .await;
        assert!(!outcome.fallback);
        let analysis = outcome.analysis.unwrap();
        assert_eq!(analysis.keywords, vec!["Python".to_string(), "SQL".to_string()]);
        assert!(outcome.optimized_record.is_some());
        assert!(session.record().await.skills.is_empty());
    }
}
