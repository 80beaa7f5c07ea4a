//! ATS scoring: keyword coverage plus section-completeness bonuses.
//!
//! Pure and deterministic: identical inputs always produce an identical
//! [`AtsAnalysis`]. Absent sections simply count as empty.
//!
//! Algorithm:
//! 1. Build a lowercase corpus from the resume (name, title, about, skills,
//!    certification names, experience role/employer/description, project
//!    name/description) followed by the job description.
//! 2. A dictionary or selected keyword is found if its lowercase form is a
//!    substring of the corpus. Substring, not word match, so short acronyms
//!    like "API" still hit.
//! 3. base = min(unique_found / 20 × 100, 100), plus 5 for each of: about
//!    longer than 50 chars, ≥ 6 skills, ≥ 2 experience entries, ≥ 1
//!    certification. Capped at 100 and rounded.
//! 4. Missing keywords: job-description tokens longer than 3 chars that do not
//!    occur in the resume text, first 10 in order, duplicates kept.

use std::sync::LazyLock;

use regex::Regex;

use super::keywords::{KeywordCorpus, DEFAULT_CORPUS};
use crate::models::{AtsAnalysis, ResumeRecord};

const KEYWORD_TARGET: f64 = 20.0;
const BONUS_POINTS: f64 = 5.0;
const MAX_SCORE: f64 = 100.0;

const MAX_FOUND_KEYWORDS: usize = 15;
const MAX_MISSING_KEYWORDS: usize = 10;
const MIN_TOKEN_CHARS: usize = 4;

const ABOUT_MIN_CHARS: usize = 50;
const MIN_SKILLS: usize = 6;
const MIN_EXPERIENCE_ENTRIES: usize = 2;
const MIN_CERTIFICATIONS: usize = 1;
const MIN_UNIQUE_KEYWORDS: usize = 10;
const DESCRIPTION_MIN_CHARS: usize = 50;

pub const SUGGEST_SUMMARY: &str = "Add a more detailed professional summary";
pub const SUGGEST_SKILLS: &str = "Include more relevant skills";
pub const SUGGEST_KEYWORDS: &str = "Include more industry-specific keywords";
pub const SUGGEST_DESCRIPTIONS: &str = "Provide more detailed job descriptions";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("tokenizer pattern is valid"));

/// Lowercase text of the resume alone, one line per part.
pub fn resume_corpus(record: &ResumeRecord) -> String {
    let skills = record.skills.join(" ");
    let certifications = record
        .certifications
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let experience = record
        .experience
        .iter()
        .map(|e| format!("{} {} {}", e.job_title, e.employer, e.description))
        .collect::<Vec<_>>()
        .join(" ");
    let projects = record
        .projects
        .iter()
        .map(|p| format!("{} {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join(" ");

    [
        format!("{} {}", record.full_name(), record.basic_details.title),
        record.about.to_string(),
        skills,
        certifications,
        experience,
        projects,
    ]
    .join("\n")
    .to_lowercase()
}

/// Scores against the built-in dictionaries.
pub fn score(record: &ResumeRecord, job_description: &str, selected_keywords: &[String]) -> AtsAnalysis {
    score_with(&DEFAULT_CORPUS, record, job_description, selected_keywords)
}

pub fn score_with(
    corpus: &KeywordCorpus,
    record: &ResumeRecord,
    job_description: &str,
    selected_keywords: &[String],
) -> AtsAnalysis {
    let resume_text = resume_corpus(record);
    let full_text = format!("{resume_text}\n{}", job_description.to_lowercase());

    let mut found: Vec<&str> = Vec::new();
    for keyword in corpus.candidates(selected_keywords) {
        if full_text.contains(&keyword.to_lowercase()) && !found.contains(&keyword) {
            found.push(keyword);
        }
    }
    let unique_count = found.len();

    let skill_count = record.skills.len();
    let about_chars = record.about.chars().count();

    let base = (unique_count as f64 / KEYWORD_TARGET * MAX_SCORE).min(MAX_SCORE);
    let bonus = [
        about_chars > ABOUT_MIN_CHARS,
        skill_count >= MIN_SKILLS,
        record.experience.len() >= MIN_EXPERIENCE_ENTRIES,
        record.certifications.len() >= MIN_CERTIFICATIONS,
    ]
    .into_iter()
    .filter(|applies| *applies)
    .count() as f64
        * BONUS_POINTS;
    let final_score = (base + bonus).min(MAX_SCORE).round() as u8;

    let mut suggestions = Vec::new();
    if about_chars < ABOUT_MIN_CHARS {
        suggestions.push(SUGGEST_SUMMARY.to_string());
    }
    if skill_count < MIN_SKILLS {
        suggestions.push(SUGGEST_SKILLS.to_string());
    }
    if unique_count < MIN_UNIQUE_KEYWORDS {
        suggestions.push(SUGGEST_KEYWORDS.to_string());
    }
    let thin_descriptions = record.experience.is_empty()
        || record
            .experience
            .iter()
            .any(|e| e.description.chars().count() < DESCRIPTION_MIN_CHARS);
    if thin_descriptions {
        suggestions.push(SUGGEST_DESCRIPTIONS.to_string());
    }

    AtsAnalysis {
        score: final_score,
        keywords: found
            .into_iter()
            .take(MAX_FOUND_KEYWORDS)
            .map(str::to_string)
            .collect(),
        suggestions,
        missing_keywords: missing_keywords(&resume_text, job_description),
    }
}

/// Job-description tokens the resume never mentions. Duplicates are kept.
fn missing_keywords(resume_text: &str, job_description: &str) -> Vec<String> {
    if job_description.trim().is_empty() {
        return Vec::new();
    }
    let lowered = job_description.to_lowercase();
    NON_WORD
        .split(&lowered)
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !resume_text.contains(token))
        .take(MAX_MISSING_KEYWORDS)
        .map(str::to_string)
        .collect()
}
