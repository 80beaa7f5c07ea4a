// Editing sessions.
// Owns the live record per user, debounces scoring and autosave, publishes analyses.

pub mod debounce;
pub mod editor_session;
pub mod handlers;
pub mod registry;

use std::time::Duration;

use serde::Serialize;

use crate::models::{AtsAnalysis, ScoreBand};

pub use editor_session::{EditorSession, OptimizationOutcome};
pub use registry::SessionRegistry;

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub scoring_debounce: Duration,
    pub autosave_debounce: Duration,
}

/// Latest published analysis. `generation` identifies the edit it was computed
/// from; `analysis` is `None` until the first pass completes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub generation: u64,
    pub analysis: Option<AtsAnalysis>,
    pub band: Option<ScoreBand>,
    #[serde(skip)]
    pub(crate) inputs: Option<editor_session::ScoreInputs>,
}
