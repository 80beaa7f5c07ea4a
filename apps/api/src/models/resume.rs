use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Contact and identity fields shown in the resume header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicDetails {
    pub first_name: String,
    pub surname: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub pin_code: String,
}

impl BasicDetails {
    /// "First Surname", trimmed. Empty when neither part is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub specialization: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub cgpa: String,
    pub percentage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub job_title: String,
    pub employer: String,
    pub city: String,
    pub country: String,
    pub start_month: String,
    pub start_year: String,
    pub end_month: String,
    pub end_year: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub tech_stack: String,
    pub description: String,
    pub link: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Award {
    pub title: String,
    pub description: String,
    pub year: String,
}

/// The canonical in-memory resume.
///
/// Every section sits behind an `Arc`: an edit clones only the section it
/// touches, so untouched sections stay pointer-equal between versions and the
/// session can cheaply tell what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    #[serde(rename = "basicdetails")]
    pub basic_details: Arc<BasicDetails>,
    pub about: Arc<String>,
    pub education: Arc<Vec<Education>>,
    pub experience: Arc<Vec<Experience>>,
    pub projects: Arc<Vec<Project>>,
    pub skills: Arc<Vec<String>>,
    pub certifications: Arc<Vec<Certification>>,
    pub awards: Arc<Vec<Award>>,
}

impl ResumeRecord {
    /// Parses any stored resume blob, legacy or canonical, into the canonical shape.
    pub fn from_json_value(value: serde_json::Value) -> serde_json::Result<Self> {
        let legacy: super::legacy::LegacyResumeRecord = serde_json::from_value(value)?;
        Ok(legacy.into())
    }

    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let legacy: super::legacy::LegacyResumeRecord = serde_json::from_slice(bytes)?;
        Ok(legacy.into())
    }

    pub fn full_name(&self) -> String {
        self.basic_details.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_and_trims() {
        let details = BasicDetails {
            first_name: " Ada ".to_string(),
            surname: "Lovelace".to_string(),
            ..Default::default()
        };
        assert_eq!(details.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_full_name_empty_when_unset() {
        assert_eq!(BasicDetails::default().full_name(), "");
    }

    #[test]
    fn test_serializes_with_basicdetails_root_key() {
        let record = ResumeRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("basicdetails").is_some());
        assert!(json["basicdetails"].get("firstName").is_some());
        assert!(json.get("certifications").unwrap().is_array());
    }

    #[test]
    fn test_clone_shares_sections() {
        let record = ResumeRecord::default();
        let copy = record.clone();
        assert!(Arc::ptr_eq(&record.education, &copy.education));
        assert!(Arc::ptr_eq(&record.basic_details, &copy.basic_details));
    }
}
