//! Section and field addressing.
//!
//! Every editable location in a [`ResumeRecord`](crate::models::ResumeRecord)
//! is named by a [`FieldPath`]. Section kinds and their fields are closed
//! enums, so the mutator matches on them exhaustively; the string form only
//! exists at the HTTP boundary and is parsed once by [`FieldPath::parse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MutationError;
use crate::models::{Award, BasicDetails, Certification, Education, Experience, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    #[serde(alias = "basicdetails")]
    BasicDetails,
    About,
    Education,
    Experience,
    Projects,
    Skills,
    Certifications,
    Awards,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::BasicDetails,
        SectionKind::About,
        SectionKind::Education,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Certifications,
        SectionKind::Awards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::BasicDetails => "basicDetails",
            SectionKind::About => "about",
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
            SectionKind::Projects => "projects",
            SectionKind::Skills => "skills",
            SectionKind::Certifications => "certifications",
            SectionKind::Awards => "awards",
        }
    }

    /// Repeated sections are index-addressable arrays; the rest are scalars or objects.
    pub fn is_repeated(&self) -> bool {
        !matches!(self, SectionKind::BasicDetails | SectionKind::About)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = MutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "basicdetails" {
            return Ok(SectionKind::BasicDetails);
        }
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MutationError::InvalidPath(format!("unknown section '{s}'")))
    }
}

/// Declares a field enum for a section record: wire names, parsing, and
/// mutable/shared access to the backing `String`.
macro_rules! record_fields {
    ($field:ident for $record:ty { $($variant:ident => $member:ident : $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $field {
            $($variant),+
        }

        impl $field {
            pub const ALL: &'static [$field] = &[$($field::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($field::$variant => $wire),+
                }
            }

            pub fn get<'a>(&self, record: &'a $record) -> &'a str {
                match self {
                    $($field::$variant => record.$member.as_str()),+
                }
            }

            pub fn get_mut<'a>(&self, record: &'a mut $record) -> &'a mut String {
                match self {
                    $($field::$variant => &mut record.$member),+
                }
            }
        }

        impl FromStr for $field {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL.iter().copied().find(|f| f.as_str() == s).ok_or(())
            }
        }
    };
}

record_fields!(BasicDetailsField for BasicDetails {
    FirstName => first_name: "firstName",
    Surname => surname: "surname",
    Title => title: "title",
    Phone => phone: "phone",
    Email => email: "email",
    Website => website: "website",
    Github => github: "github",
    Linkedin => linkedin: "linkedin",
    Address => address: "address",
    City => city: "city",
    Country => country: "country",
    PinCode => pin_code: "pinCode",
});

record_fields!(EducationField for Education {
    Institution => institution: "institution",
    Degree => degree: "degree",
    Specialization => specialization: "specialization",
    StartDate => start_date: "startDate",
    EndDate => end_date: "endDate",
    Location => location: "location",
    Cgpa => cgpa: "cgpa",
    Percentage => percentage: "percentage",
});

record_fields!(ExperienceField for Experience {
    JobTitle => job_title: "jobTitle",
    Employer => employer: "employer",
    City => city: "city",
    Country => country: "country",
    StartMonth => start_month: "startMonth",
    StartYear => start_year: "startYear",
    EndMonth => end_month: "endMonth",
    EndYear => end_year: "endYear",
    Description => description: "description",
});

record_fields!(ProjectField for Project {
    Name => name: "name",
    TechStack => tech_stack: "techStack",
    Description => description: "description",
    Link => link: "link",
    Year => year: "year",
});

record_fields!(CertificationField for Certification {
    Name => name: "name",
    Issuer => issuer: "issuer",
    Year => year: "year",
});

record_fields!(AwardField for Award {
    Title => title: "title",
    Description => description: "description",
    Year => year: "year",
});

/// A fully-resolved edit target. Index bounds are checked when the path is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    BasicDetails(BasicDetailsField),
    About,
    Education(usize, EducationField),
    Experience(usize, ExperienceField),
    Project(usize, ProjectField),
    Skill(usize),
    Certification(usize, CertificationField),
    Award(usize, AwardField),
}

impl FieldPath {
    pub fn section(&self) -> SectionKind {
        match self {
            FieldPath::BasicDetails(_) => SectionKind::BasicDetails,
            FieldPath::About => SectionKind::About,
            FieldPath::Education(..) => SectionKind::Education,
            FieldPath::Experience(..) => SectionKind::Experience,
            FieldPath::Project(..) => SectionKind::Projects,
            FieldPath::Skill(_) => SectionKind::Skills,
            FieldPath::Certification(..) => SectionKind::Certifications,
            FieldPath::Award(..) => SectionKind::Awards,
        }
    }

    /// Resolves a wire-level `(section, index?, field?)` triple.
    ///
    /// `index` is required exactly when the section is repeated; `field` must be
    /// absent for `about` and for skills (plain strings), present everywhere else.
    pub fn parse(section: &str, index: Option<usize>, field: Option<&str>) -> Result<Self, MutationError> {
        let kind: SectionKind = section.parse()?;

        match (kind.is_repeated(), index) {
            (true, None) => {
                return Err(MutationError::InvalidPath(format!(
                    "section '{kind}' requires an index"
                )))
            }
            (false, Some(_)) => {
                return Err(MutationError::InvalidPath(format!(
                    "section '{kind}' does not take an index"
                )))
            }
            _ => {}
        }
        let index = index.unwrap_or_default();

        let needs_field = !matches!(kind, SectionKind::About | SectionKind::Skills);
        let field = match (needs_field, field) {
            (true, Some(f)) => f,
            (true, None) => {
                return Err(MutationError::InvalidPath(format!(
                    "section '{kind}' requires a field"
                )))
            }
            (false, Some(f)) => {
                return Err(MutationError::InvalidPath(format!(
                    "section '{kind}' has no field '{f}'"
                )))
            }
            (false, None) => "",
        };

        let unknown = || MutationError::InvalidPath(format!("unknown field '{kind}.{field}'"));

        Ok(match kind {
            SectionKind::BasicDetails => FieldPath::BasicDetails(field.parse().map_err(|_| unknown())?),
            SectionKind::About => FieldPath::About,
            SectionKind::Education => FieldPath::Education(index, field.parse().map_err(|_| unknown())?),
            SectionKind::Experience => FieldPath::Experience(index, field.parse().map_err(|_| unknown())?),
            SectionKind::Projects => FieldPath::Project(index, field.parse().map_err(|_| unknown())?),
            SectionKind::Skills => FieldPath::Skill(index),
            SectionKind::Certifications => {
                FieldPath::Certification(index, field.parse().map_err(|_| unknown())?)
            }
            SectionKind::Awards => FieldPath::Award(index, field.parse().map_err(|_| unknown())?),
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::BasicDetails(field) => write!(f, "basicDetails.{}", field.as_str()),
            FieldPath::About => f.write_str("about"),
            FieldPath::Education(i, field) => write!(f, "education.{i}.{}", field.as_str()),
            FieldPath::Experience(i, field) => write!(f, "experience.{i}.{}", field.as_str()),
            FieldPath::Project(i, field) => write!(f, "projects.{i}.{}", field.as_str()),
            FieldPath::Skill(i) => write!(f, "skills.{i}"),
            FieldPath::Certification(i, field) => write!(f, "certifications.{i}.{}", field.as_str()),
            FieldPath::Award(i, field) => write!(f, "awards.{i}.{}", field.as_str()),
        }
    }
}
