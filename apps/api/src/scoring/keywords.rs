//! Keyword dictionaries the ATS score is measured against.

use serde::{Deserialize, Serialize};

/// Static, categorized keyword dictionaries. Terms are matched case-insensitively.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeywordCorpus {
    pub technical: &'static [&'static str],
    pub soft: &'static [&'static str],
    pub industry: &'static [&'static str],
}

const TECHNICAL: &[&str] = &[
    "JavaScript",
    "Python",
    "React",
    "Node.js",
    "TypeScript",
    "HTML",
    "CSS",
    "SQL",
    "Git",
    "AWS",
    "Docker",
    "Kubernetes",
    "MongoDB",
    "PostgreSQL",
    "API",
    "REST",
    "GraphQL",
    "Machine Learning",
    "Data Analysis",
    "Excel",
    "PowerBI",
    "Tableau",
    "Agile",
    "Scrum",
];

const SOFT: &[&str] = &[
    "Leadership",
    "Communication",
    "Problem-solving",
    "Teamwork",
    "Critical thinking",
    "Creativity",
    "Adaptability",
    "Time management",
    "Project management",
    "Collaboration",
    "Analytical",
    "Strategic",
    "Innovation",
    "Mentoring",
    "Negotiation",
];

const INDUSTRY: &[&str] = &[
    "Marketing",
    "Sales",
    "Finance",
    "Operations",
    "Strategy",
    "Business development",
    "Customer service",
    "Product management",
    "Digital marketing",
    "Brand management",
    "Quality assurance",
    "Risk management",
    "Compliance",
    "Process improvement",
];

pub const DEFAULT_CORPUS: KeywordCorpus = KeywordCorpus {
    technical: TECHNICAL,
    soft: SOFT,
    industry: INDUSTRY,
};

impl Default for KeywordCorpus {
    fn default() -> Self {
        DEFAULT_CORPUS
    }
}

impl KeywordCorpus {
    /// Technical, then soft, then industry terms, then user selections, in order.
    pub fn candidates<'a>(&'a self, selected: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        self.technical
            .iter()
            .chain(self.soft)
            .chain(self.industry)
            .copied()
            .chain(selected.iter().map(String::as_str))
    }
}

/// Keywords the user picked to be scored on top of the dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSelection(Vec<String>);

impl KeywordSelection {
    /// Adds `keyword` if absent, removes it if present. Returns true when it is now selected.
    pub fn toggle(&mut self, keyword: &str) -> bool {
        match self.0.iter().position(|k| k == keyword) {
            Some(i) => {
                self.0.remove(i);
                false
            }
            None => {
                self.0.push(keyword.to_string());
                true
            }
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
