use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::ResumeRepository;
use crate::models::ResumeRecord;

/// One pretty-printed JSON file per user under a root directory.
/// Files written by older clients are read through the legacy adapter.
pub struct FileResumeRepository {
    root: PathBuf,
}

impl FileResumeRepository {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create resume store at {}", root.display()))?;
        info!("Resume store: {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_user_id(user_id)))
    }
}

/// Maps a user id to a file stem made of `[A-Za-z0-9_-]`. Letters, digits and
/// `-` pass through; every other byte, `_` included, becomes `_XX` (uppercase
/// hex), so distinct ids never share a file. The empty id maps to `_`.
fn encode_user_id(user_id: &str) -> String {
    if user_id.is_empty() {
        return "_".to_string();
    }
    let mut encoded = String::with_capacity(user_id.len());
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("_{byte:02X}"));
        }
    }
    encoded
}

#[async_trait]
impl ResumeRepository for FileResumeRepository {
    async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
        let path = self.path_for(user_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let record = ResumeRecord::from_json_slice(&bytes)
            .with_context(|| format!("Malformed resume file {}", path.display()))?;
        debug!("Loaded resume for user {user_id} from {}", path.display());
        Ok(Some(record))
    }

    async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
        let path = self.path_for(user_id);
        let body = serde_json::to_vec_pretty(record)?;
        // Write-then-rename so a crash never leaves a half-written file behind.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!("Saved resume for user {user_id} to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::Experience;

    #[test]
    fn test_encode_user_id() {
        assert_eq!(encode_user_id("demo-user"), "demo-user");
        assert_eq!(encode_user_id("../etc/passwd"), "_2E_2E_2Fetc_2Fpasswd");
        assert_eq!(encode_user_id("a@b.com"), "a_40b_2Ecom");
        assert_eq!(encode_user_id("a_b"), "a_5Fb");
        assert_eq!(encode_user_id("é"), "_C3_A9");
        assert_eq!(encode_user_id(""), "_");
    }

    #[test]
    fn test_encode_user_id_is_one_to_one() {
        let ids = ["alice@x.com", "alice.x.com", "alice_x_com", "alice_40x_2Ecom", "_", ""];
        let stems: std::collections::HashSet<String> = ids.iter().map(|id| encode_user_id(id)).collect();
        assert_eq!(stems.len(), ids.len());
    }

    #[tokio::test]
    async fn test_similar_user_ids_do_not_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileResumeRepository::open(dir.path()).await.unwrap();
        let alice = ResumeRecord {
            about: Arc::new("alice private summary".to_string()),
            ..Default::default()
        };
        repo.save("alice@x.com", &alice).await.unwrap();

        assert!(repo.load("alice_x_com").await.unwrap().is_none());
        assert!(repo.load("alice.x.com").await.unwrap().is_none());

        let other = ResumeRecord {
            about: Arc::new("someone else".to_string()),
            ..Default::default()
        };
        repo.save("alice_x_com", &other).await.unwrap();
        assert_eq!(repo.load("alice@x.com").await.unwrap(), Some(alice));
        assert_eq!(repo.load("alice_x_com").await.unwrap(), Some(other));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileResumeRepository::open(dir.path()).await.unwrap();
        let record = ResumeRecord {
            experience: Arc::new(vec![Experience {
                job_title: "Intern".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        repo.save("demo-user", &record).await.unwrap();
        assert_eq!(repo.load("demo-user").await.unwrap(), Some(record));
        assert!(dir.path().join("demo-user.json").exists());
        assert!(!dir.path().join("demo-user.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileResumeRepository::open(dir.path()).await.unwrap();
        assert!(repo.load("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_canonicalizes_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileResumeRepository::open(dir.path()).await.unwrap();
        std::fs::write(
            dir.path().join("old.json"),
            r#"{"basicdetails": {"name": "Olivia Sanchez"}, "skills": ["Branding"],
                "experience": [{"company": "Wardiere Inc.", "role": "Manager"}]}"#,
        )
        .unwrap();
        let record = repo.load("old").await.unwrap().unwrap();
        assert_eq!(record.full_name(), "Olivia Sanchez");
        assert_eq!(record.experience[0].employer, "Wardiere Inc.");
        assert_eq!(record.skills.as_slice(), ["Branding"]);
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileResumeRepository::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(repo.load("bad").await.is_err());
    }
}
