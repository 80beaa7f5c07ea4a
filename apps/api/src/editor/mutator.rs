//! Copy-on-write mutations over [`ResumeRecord`].
//!
//! Every operation takes the current `Arc<ResumeRecord>` and returns a new one.
//! Only the touched section is cloned (`Arc::make_mut` on a shared section),
//! so sibling sections stay pointer-equal to the previous version. An update
//! that writes the value already present returns the input `Arc` unchanged.

use std::sync::Arc;

use serde::Deserialize;

use super::section::{FieldPath, SectionKind};
use super::MutationError;
use crate::models::ResumeRecord;

/// One user edit, applied atomically by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Update { path: FieldPath, value: String },
    Add(SectionKind),
    Remove { section: SectionKind, index: usize },
}

/// Wire form of an update request: `{section, index?, field?, value}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub section: String,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub field: Option<String>,
    pub value: String,
}

impl TryFrom<FieldUpdate> for Edit {
    type Error = MutationError;

    fn try_from(update: FieldUpdate) -> Result<Self, Self::Error> {
        let path = FieldPath::parse(&update.section, update.index, update.field.as_deref())?;
        Ok(Edit::Update {
            path,
            value: update.value,
        })
    }
}

pub fn apply(record: &Arc<ResumeRecord>, edit: &Edit) -> Result<Arc<ResumeRecord>, MutationError> {
    match edit {
        Edit::Update { path, value } => update_scalar(record, *path, value),
        Edit::Add(section) => add_item(record, *section),
        Edit::Remove { section, index } => remove_item(record, *section, *index),
    }
}

fn out_of_range(section: SectionKind, index: usize, len: usize) -> MutationError {
    MutationError::IndexOutOfRange {
        section,
        index,
        len,
    }
}

fn item<T>(items: &[T], section: SectionKind, index: usize) -> Result<&T, MutationError> {
    items
        .get(index)
        .ok_or_else(|| out_of_range(section, index, items.len()))
}

fn item_mut<T: Clone>(
    items: &mut Arc<Vec<T>>,
    section: SectionKind,
    index: usize,
) -> Result<&mut T, MutationError> {
    let len = items.len();
    Arc::make_mut(items)
        .get_mut(index)
        .ok_or_else(|| out_of_range(section, index, len))
}

fn current_value(record: &ResumeRecord, path: FieldPath) -> Result<&str, MutationError> {
    let section = path.section();
    Ok(match path {
        FieldPath::BasicDetails(field) => field.get(&record.basic_details),
        FieldPath::About => record.about.as_str(),
        FieldPath::Education(i, field) => field.get(item(&record.education, section, i)?),
        FieldPath::Experience(i, field) => field.get(item(&record.experience, section, i)?),
        FieldPath::Project(i, field) => field.get(item(&record.projects, section, i)?),
        FieldPath::Skill(i) => item(&record.skills, section, i)?.as_str(),
        FieldPath::Certification(i, field) => {
            field.get(item(&record.certifications, section, i)?)
        }
        FieldPath::Award(i, field) => field.get(item(&record.awards, section, i)?),
    })
}

fn slot_mut(record: &mut ResumeRecord, path: FieldPath) -> Result<&mut String, MutationError> {
    let section = path.section();
    Ok(match path {
        FieldPath::BasicDetails(field) => field.get_mut(Arc::make_mut(&mut record.basic_details)),
        FieldPath::About => Arc::make_mut(&mut record.about),
        FieldPath::Education(i, field) => field.get_mut(item_mut(&mut record.education, section, i)?),
        FieldPath::Experience(i, field) => {
            field.get_mut(item_mut(&mut record.experience, section, i)?)
        }
        FieldPath::Project(i, field) => field.get_mut(item_mut(&mut record.projects, section, i)?),
        FieldPath::Skill(i) => item_mut(&mut record.skills, section, i)?,
        FieldPath::Certification(i, field) => {
            field.get_mut(item_mut(&mut record.certifications, section, i)?)
        }
        FieldPath::Award(i, field) => field.get_mut(item_mut(&mut record.awards, section, i)?),
    })
}

/// Sets one string field. Fails with `IndexOutOfRange` when the indexed item does not exist.
pub fn update_scalar(
    record: &Arc<ResumeRecord>,
    path: FieldPath,
    value: &str,
) -> Result<Arc<ResumeRecord>, MutationError> {
    if current_value(record, path)? == value {
        return Ok(Arc::clone(record));
    }

    let mut next = ResumeRecord::clone(record);
    *slot_mut(&mut next, path)? = value.to_string();
    Ok(Arc::new(next))
}

/// Appends a fully-defaulted item to a repeated section.
pub fn add_item(
    record: &Arc<ResumeRecord>,
    section: SectionKind,
) -> Result<Arc<ResumeRecord>, MutationError> {
    let mut next = ResumeRecord::clone(record);
    match section {
        SectionKind::Education => Arc::make_mut(&mut next.education).push(Default::default()),
        SectionKind::Experience => Arc::make_mut(&mut next.experience).push(Default::default()),
        SectionKind::Projects => Arc::make_mut(&mut next.projects).push(Default::default()),
        SectionKind::Skills => Arc::make_mut(&mut next.skills).push(String::new()),
        SectionKind::Certifications => {
            Arc::make_mut(&mut next.certifications).push(Default::default())
        }
        SectionKind::Awards => Arc::make_mut(&mut next.awards).push(Default::default()),
        SectionKind::BasicDetails | SectionKind::About => {
            return Err(MutationError::UnknownSection(section.to_string()))
        }
    }
    Ok(Arc::new(next))
}

fn remove_at<T: Clone>(
    items: &mut Arc<Vec<T>>,
    section: SectionKind,
    index: usize,
) -> Result<(), MutationError> {
    if index >= items.len() {
        return Err(out_of_range(section, index, items.len()));
    }
    Arc::make_mut(items).remove(index);
    Ok(())
}

/// Removes the item at `index`, shifting later items down. Removing the last
/// remaining item is allowed and leaves the section empty.
pub fn remove_item(
    record: &Arc<ResumeRecord>,
    section: SectionKind,
    index: usize,
) -> Result<Arc<ResumeRecord>, MutationError> {
    let mut next = ResumeRecord::clone(record);
    match section {
        SectionKind::Education => remove_at(&mut next.education, section, index)?,
        SectionKind::Experience => remove_at(&mut next.experience, section, index)?,
        SectionKind::Projects => remove_at(&mut next.projects, section, index)?,
        SectionKind::Skills => remove_at(&mut next.skills, section, index)?,
        SectionKind::Certifications => remove_at(&mut next.certifications, section, index)?,
        SectionKind::Awards => remove_at(&mut next.awards, section, index)?,
        SectionKind::BasicDetails | SectionKind::About => {
            return Err(MutationError::UnknownSection(section.to_string()))
        }
    }
    Ok(Arc::new(next))
}
