//! Resume optimization: a pluggable backend that rewrites a resume for ATS parsers.
//!
//! `AppState` holds an `Option<Arc<dyn ResumeOptimizer>>`; with none configured,
//! sessions fall back to local keyword scoring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{RemoteClient, RemoteError};
use crate::models::ResumeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordDensity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    pub ats_optimization: bool,
    pub keyword_density: KeywordDensity,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            target_role: None,
            industry: None,
            experience_level: None,
            ats_optimization: true,
            keyword_density: KeywordDensity::Medium,
        }
    }
}

/// What a successful optimization produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Optimized {
    Html(String),
    Record(ResumeRecord),
}

#[async_trait]
pub trait ResumeOptimizer: Send + Sync {
    async fn optimize(
        &self,
        record: &ResumeRecord,
        user_id: &str,
        options: &OptimizationOptions,
    ) -> Result<Optimized, RemoteError>;
}

#[async_trait]
impl ResumeOptimizer for RemoteClient {
    /// Uploads the record, then asks for the ATS version of it.
    async fn optimize(
        &self,
        record: &ResumeRecord,
        user_id: &str,
        options: &OptimizationOptions,
    ) -> Result<Optimized, RemoteError> {
        self.upload_resume(record, Some(user_id)).await?;
        let response = self.generate_ats_resume(record, options).await?;

        if let Some(html) = response.html.filter(|h| !h.trim().is_empty()) {
            info!("Received optimized HTML for user {user_id} ({} bytes)", html.len());
            return Ok(Optimized::Html(html));
        }
        match response.data {
            Some(value) => {
                let optimized = ResumeRecord::from_json_value(value)
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;
                info!("Received optimized record for user {user_id}");
                Ok(Optimized::Record(optimized))
            }
            None => Err(RemoteError::Decode(
                response
                    .message
                    .unwrap_or_else(|| "optimization returned no content".to_string()),
            )),
        }
    }
}
