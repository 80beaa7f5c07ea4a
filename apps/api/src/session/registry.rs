use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{EditorSession, SessionSettings};
use crate::repository::ResumeRepository;

/// Live sessions keyed by user id. A session is created on first open,
/// seeded from the repository or with an empty record.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<EditorSession>>>,
    repository: Arc<dyn ResumeRepository>,
    settings: SessionSettings,
}

impl SessionRegistry {
    pub fn new(repository: Arc<dyn ResumeRepository>, settings: SessionSettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            repository,
            settings,
        }
    }

    pub async fn open(&self, user_id: &str) -> Result<Arc<EditorSession>> {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return Ok(session.clone());
        }

        // Load without holding the lock so a slow read only delays this user.
        let stored = self.repository.load(user_id).await?;

        let mut sessions = self.sessions.write().await;
        // Another request may have opened it while we were loading.
        if let Some(session) = sessions.get(user_id) {
            return Ok(session.clone());
        }
        let record = match stored {
            Some(record) => {
                info!("Opened session for user {user_id} from stored resume");
                record
            }
            None => {
                info!("Opened session for user {user_id} with an empty resume");
                Default::default()
            }
        };
        let session = Arc::new(
            EditorSession::start(user_id, record, self.repository.clone(), self.settings).await,
        );
        sessions.insert(user_id.to_string(), session.clone());
        Ok(session)
    }

    pub async fn open_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Saves every session with unsaved edits. Used on shutdown.
    pub async fn flush_all(&self) -> usize {
        let sessions: Vec<Arc<EditorSession>> =
            self.sessions.read().await.values().cloned().collect();
        let mut flushed = 0;
        for session in sessions {
            if !session.is_dirty().await {
                continue;
            }
            match session.save_now().await {
                Ok(()) => flushed += 1,
                Err(e) => warn!("Failed to flush session for user {}: {e:#}", session.user_id()),
            }
        }
        flushed
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::editor::{Edit, FieldPath};
    use crate::models::ResumeRecord;
    use crate::repository::InMemoryResumeRepository;

    /// Takes ten seconds to load the user "slow".
    struct SlowRepository(InMemoryResumeRepository);

    #[async_trait]
    impl ResumeRepository for SlowRepository {
        async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
            if user_id == "slow" {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            self.0.load(user_id).await
        }

        async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
            self.0.save(user_id, record).await
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            scoring_debounce: Duration::from_millis(1000),
            autosave_debounce: Duration::from_millis(1500),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_reuses_session() {
        let registry = SessionRegistry::new(Arc::new(InMemoryResumeRepository::new()), settings());
        let a = registry.open("u1").await.unwrap();
        let b = registry.open("u1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        registry.open("u2").await.unwrap();
        assert_eq!(registry.open_sessions().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_seeds_from_repository() {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let stored = ResumeRecord {
            about: Arc::new("Stored summary".to_string()),
            ..Default::default()
        };
        repo.save("u1", &stored).await.unwrap();

        let registry = SessionRegistry::new(repo, settings());
        let session = registry.open("u1").await.unwrap();
        assert_eq!(*session.record().await, stored);
        assert!(!session.is_dirty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_all_saves_only_dirty_sessions() {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let registry = SessionRegistry::new(repo.clone(), settings());
        let edited = registry.open("edited").await.unwrap();
        registry.open("idle").await.unwrap();
        edited
            .apply(&Edit::Update {
                path: FieldPath::About,
                value: "Draft".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(registry.flush_all().await, 1);
        assert_eq!(repo.load("edited").await.unwrap().unwrap().about.as_str(), "Draft");
        assert!(repo.load("idle").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_does_not_block_other_users() {
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(SlowRepository(InMemoryResumeRepository::new())),
            settings(),
        ));
        let slow = tokio::spawn({
            let registry = registry.clone();
            async move { registry.open("slow").await.map(|_| ()) }
        });
        tokio::task::yield_now().await;

        let fast = tokio::time::timeout(Duration::from_secs(1), registry.open("fast")).await;
        assert!(fast.is_ok());
        assert!(!slow.is_finished());

        slow.await.unwrap().unwrap();
        assert_eq!(registry.open_sessions().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_opens_share_one_session() {
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(SlowRepository(InMemoryResumeRepository::new())),
            settings(),
        ));
        let first = tokio::spawn({
            let registry = registry.clone();
            async move { registry.open("slow").await.unwrap() }
        });
        let second = tokio::spawn({
            let registry = registry.clone();
            async move { registry.open("slow").await.unwrap() }
        });
        let (a, b) = (first.await.unwrap(), second.await.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.open_sessions().await, 1);
    }
}
