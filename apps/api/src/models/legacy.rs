//! Load-boundary adapter for stored resume blobs.
//!
//! Older clients wrote several shapes: `name`/`location` instead of split
//! name and city/country, `role`/`company` instead of `jobTitle`/`employer`,
//! a categorized skills object or separate `techSkills`/`softSkills` lists,
//! and certifications as bare strings. Everything is folded into the
//! canonical [`ResumeRecord`] here; nothing past this module sees legacy fields.
//! Canonical fields always win when both are populated.

use std::sync::Arc;

use serde::Deserialize;

use super::resume::{
    Award, BasicDetails, Certification, Education, Experience, Project, ResumeRecord,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyResumeRecord {
    #[serde(alias = "basicDetails")]
    basicdetails: LegacyBasicDetails,
    about: String,
    education: Vec<LegacyEducation>,
    experience: Vec<LegacyExperience>,
    projects: Vec<LegacyProject>,
    skills: Option<LegacySkills>,
    tech_skills: Vec<String>,
    soft_skills: Vec<String>,
    certifications: Vec<LegacyCertification>,
    awards: Vec<Award>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyBasicDetails {
    first_name: String,
    surname: String,
    title: String,
    phone: String,
    email: String,
    website: String,
    github: String,
    linkedin: String,
    address: String,
    city: String,
    country: String,
    pin_code: String,
    name: String,
    location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyEducation {
    institution: String,
    degree: String,
    specialization: String,
    start_date: String,
    end_date: String,
    location: String,
    cgpa: String,
    percentage: String,
    year: String,
    university: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyExperience {
    job_title: String,
    employer: String,
    city: String,
    country: String,
    start_month: String,
    start_year: String,
    end_month: String,
    end_year: String,
    description: String,
    year: String,
    company: String,
    location: String,
    role: String,
    position: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyProject {
    name: String,
    tech_stack: String,
    description: String,
    link: String,
    year: String,
    result: String,
    technologies: Option<StringOrList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn joined(self) -> String {
        match self {
            StringOrList::One(s) => s,
            StringOrList::Many(items) => items.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacySkills {
    Flat(Vec<String>),
    Categorized(CategorizedSkills),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CategorizedSkills {
    programming_languages: String,
    libraries_frameworks: String,
    tools_platforms: String,
    databases: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyCertification {
    Name(String),
    Full(Certification),
}

/// Returns `primary` unless it is blank, in which case `fallback`.
fn prefer(primary: String, fallback: String) -> String {
    if primary.trim().is_empty() {
        fallback
    } else {
        primary
    }
}

/// "2020 – 2023", "2022-2026" → ("2020", "2023"). A single value becomes the end.
fn split_range(range: &str) -> (String, String) {
    let parts: Vec<&str> = range
        .split(['–', '—', '-'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [start, end] => (start.to_string(), end.to_string()),
        _ => (String::new(), range.trim().to_string()),
    }
}

/// "Sydney, Australia" → ("Sydney", "Australia").
fn split_location(location: &str) -> (String, String) {
    match location.split_once(',') {
        Some((city, country)) => (city.trim().to_string(), country.trim().to_string()),
        None => (location.trim().to_string(), String::new()),
    }
}

fn split_csv(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl From<LegacyBasicDetails> for BasicDetails {
    fn from(l: LegacyBasicDetails) -> Self {
        let (mut first_name, mut surname) = (l.first_name, l.surname);
        if first_name.trim().is_empty() && surname.trim().is_empty() {
            let name = l.name.trim();
            match name.split_once(char::is_whitespace) {
                Some((first, rest)) => {
                    first_name = first.to_string();
                    surname = rest.trim().to_string();
                }
                None => first_name = name.to_string(),
            }
        }

        let (mut city, mut country) = (l.city, l.country);
        if city.trim().is_empty() && country.trim().is_empty() && !l.location.trim().is_empty() {
            (city, country) = split_location(&l.location);
        }

        BasicDetails {
            first_name,
            surname,
            title: l.title,
            phone: l.phone,
            email: l.email,
            website: l.website,
            github: l.github,
            linkedin: l.linkedin,
            address: l.address,
            city,
            country,
            pin_code: l.pin_code,
        }
    }
}

impl From<LegacyEducation> for Education {
    fn from(l: LegacyEducation) -> Self {
        let (mut start_date, mut end_date) = (l.start_date, l.end_date);
        if start_date.trim().is_empty() && end_date.trim().is_empty() && !l.year.trim().is_empty()
        {
            (start_date, end_date) = split_range(&l.year);
        }
        Education {
            institution: prefer(l.institution, l.university),
            degree: l.degree,
            specialization: l.specialization,
            start_date,
            end_date,
            location: l.location,
            cgpa: l.cgpa,
            percentage: l.percentage,
        }
    }
}

impl From<LegacyExperience> for Experience {
    fn from(l: LegacyExperience) -> Self {
        let (mut city, mut country) = (l.city, l.country);
        if city.trim().is_empty() && country.trim().is_empty() && !l.location.trim().is_empty() {
            (city, country) = split_location(&l.location);
        }
        let (mut start_year, mut end_year) = (l.start_year, l.end_year);
        if start_year.trim().is_empty() && end_year.trim().is_empty() && !l.year.trim().is_empty()
        {
            (start_year, end_year) = split_range(&l.year);
        }
        Experience {
            job_title: prefer(l.job_title, prefer(l.role, l.position)),
            employer: prefer(l.employer, l.company),
            city,
            country,
            start_month: l.start_month,
            start_year,
            end_month: l.end_month,
            end_year,
            description: l.description,
        }
    }
}

impl From<LegacyProject> for Project {
    fn from(l: LegacyProject) -> Self {
        let technologies = l.technologies.map(StringOrList::joined).unwrap_or_default();
        Project {
            name: l.name,
            tech_stack: prefer(l.tech_stack, technologies),
            description: prefer(l.description, l.result),
            link: l.link,
            year: l.year,
        }
    }
}

impl From<LegacyCertification> for Certification {
    fn from(l: LegacyCertification) -> Self {
        match l {
            LegacyCertification::Name(name) => Certification {
                name,
                ..Default::default()
            },
            LegacyCertification::Full(cert) => cert,
        }
    }
}

impl From<LegacyResumeRecord> for ResumeRecord {
    fn from(l: LegacyResumeRecord) -> Self {
        let skills: Vec<String> = match l.skills {
            Some(LegacySkills::Flat(list)) => list,
            Some(LegacySkills::Categorized(c)) => [
                &c.programming_languages,
                &c.libraries_frameworks,
                &c.tools_platforms,
                &c.databases,
            ]
            .into_iter()
            .flat_map(|category| split_csv(category))
            .collect(),
            None => l.tech_skills.into_iter().chain(l.soft_skills).collect(),
        };

        ResumeRecord {
            basic_details: Arc::new(l.basicdetails.into()),
            about: Arc::new(l.about),
            education: Arc::new(l.education.into_iter().map(Into::into).collect()),
            experience: Arc::new(l.experience.into_iter().map(Into::into).collect()),
            projects: Arc::new(l.projects.into_iter().map(Into::into).collect()),
            skills: Arc::new(skills),
            certifications: Arc::new(l.certifications.into_iter().map(Into::into).collect()),
            awards: Arc::new(l.awards),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: serde_json::Value) -> ResumeRecord {
        ResumeRecord::from_json_value(value).unwrap()
    }

    #[test]
    fn test_legacy_name_split_into_first_and_surname() {
        let record = load(json!({
            "basicdetails": { "name": "Olivia Sanchez", "location": "Sydney, Australia" }
        }));
        assert_eq!(record.basic_details.first_name, "Olivia");
        assert_eq!(record.basic_details.surname, "Sanchez");
        assert_eq!(record.basic_details.city, "Sydney");
        assert_eq!(record.basic_details.country, "Australia");
    }

    #[test]
    fn test_canonical_name_wins_over_legacy() {
        let record = load(json!({
            "basicdetails": { "firstName": "Shashank", "surname": "R Prakash", "name": "Someone Else" }
        }));
        assert_eq!(record.full_name(), "Shashank R Prakash");
    }

    #[test]
    fn test_legacy_experience_fields_canonicalized() {
        let record = load(json!({
            "experience": [{
                "year": "2020 – 2023",
                "company": "Ginyard International Co.",
                "location": "Sydney, Australia",
                "role": "Product Design Manager",
                "description": "Led product design initiatives."
            }]
        }));
        let exp = &record.experience[0];
        assert_eq!(exp.job_title, "Product Design Manager");
        assert_eq!(exp.employer, "Ginyard International Co.");
        assert_eq!(exp.city, "Sydney");
        assert_eq!(exp.start_year, "2020");
        assert_eq!(exp.end_year, "2023");
    }

    #[test]
    fn test_legacy_education_university_and_year() {
        let record = load(json!({
            "education": [{ "year": "2022-2026", "degree": "BE", "university": "VVCE" }]
        }));
        let edu = &record.education[0];
        assert_eq!(edu.institution, "VVCE");
        assert_eq!(edu.start_date, "2022");
        assert_eq!(edu.end_date, "2026");
    }

    #[test]
    fn test_categorized_skills_flattened_in_category_order() {
        let record = load(json!({
            "skills": {
                "programmingLanguages": "Python, C++",
                "librariesFrameworks": "React",
                "toolsPlatforms": "",
                "databases": "SQL, MongoDB"
            }
        }));
        assert_eq!(
            record.skills.as_slice(),
            ["Python", "C++", "React", "SQL", "MongoDB"]
        );
    }

    #[test]
    fn test_tech_and_soft_skills_concatenated_when_skills_absent() {
        let record = load(json!({
            "techSkills": ["React", "Python"],
            "softSkills": ["Leadership"]
        }));
        assert_eq!(record.skills.as_slice(), ["React", "Python", "Leadership"]);
    }

    #[test]
    fn test_string_certifications_become_records() {
        let record = load(json!({
            "certifications": ["HubSpot Inbound Marketing", { "name": "PMP", "issuer": "PMI", "year": "2021" }]
        }));
        assert_eq!(record.certifications[0].name, "HubSpot Inbound Marketing");
        assert_eq!(record.certifications[0].issuer, "");
        assert_eq!(record.certifications[1].issuer, "PMI");
    }

    #[test]
    fn test_project_result_and_technologies_fold_in() {
        let record = load(json!({
            "projects": [
                { "name": "Dashboard", "result": "Improved insights reporting", "technologies": ["React", "D3"] },
                { "name": "Chat", "description": "Real-time chat", "result": "ignored", "technologies": "Firebase" }
            ]
        }));
        assert_eq!(record.projects[0].description, "Improved insights reporting");
        assert_eq!(record.projects[0].tech_stack, "React, D3");
        assert_eq!(record.projects[1].description, "Real-time chat");
        assert_eq!(record.projects[1].tech_stack, "Firebase");
    }

    #[test]
    fn test_canonical_record_round_trips_through_adapter() {
        let mut record = ResumeRecord::default();
        record.about = Arc::new("Summary".to_string());
        record.skills = Arc::new(vec!["Rust".to_string()]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(load(value), record);
    }

    #[test]
    fn test_split_range_single_value_is_end() {
        assert_eq!(split_range("2024"), (String::new(), "2024".to_string()));
        assert_eq!(
            split_range("September - Present"),
            ("September".to_string(), "Present".to_string())
        );
    }
}
