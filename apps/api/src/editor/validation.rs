use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ResumeRecord;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Field-level problems keyed by `section[.index].field`. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn require(&mut self, key: String, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.errors.insert(key, message.to_string());
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Checks required fields and formats. Never fails; problems are reported in the result.
pub fn validate(record: &ResumeRecord) -> ValidationReport {
    let mut report = ValidationReport::default();
    let details = &record.basic_details;

    report.require(
        "basicDetails.firstName".to_string(),
        &details.full_name(),
        "Name is required",
    );
    if details.email.trim().is_empty() {
        report
            .errors
            .insert("basicDetails.email".to_string(), "Email is required".to_string());
    } else if !is_valid_email(&details.email) {
        report.errors.insert(
            "basicDetails.email".to_string(),
            "Please enter a valid email address".to_string(),
        );
    }

    for (i, edu) in record.education.iter().enumerate() {
        report.require(format!("education.{i}.institution"), &edu.institution, "Institution is required");
        report.require(format!("education.{i}.degree"), &edu.degree, "Degree is required");
    }
    for (i, exp) in record.experience.iter().enumerate() {
        report.require(format!("experience.{i}.jobTitle"), &exp.job_title, "Job title is required");
        report.require(format!("experience.{i}.employer"), &exp.employer, "Employer is required");
    }
    for (i, project) in record.projects.iter().enumerate() {
        report.require(format!("projects.{i}.name"), &project.name, "Project name is required");
    }
    for (i, skill) in record.skills.iter().enumerate() {
        report.require(format!("skills.{i}"), skill, "Skill cannot be blank");
    }
    for (i, cert) in record.certifications.iter().enumerate() {
        report.require(format!("certifications.{i}.name"), &cert.name, "Certification name is required");
    }
    for (i, award) in record.awards.iter().enumerate() {
        report.require(format!("awards.{i}.title"), &award.title, "Award title is required");
    }

    report
}
