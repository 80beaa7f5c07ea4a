//! JSON export of the in-memory record.

use crate::models::ResumeRecord;

/// Exactly the pretty-printed serialization of `record`; no re-read, no canonicalization.
pub fn to_json_bytes(record: &ResumeRecord) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(record)
}

/// `<Full_Name>_Resume.json`, or `Resume.json` when no name is set.
pub fn export_file_name(record: &ResumeRecord) -> String {
    let name = record.full_name();
    if name.is_empty() {
        return "Resume.json".to_string();
    }
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{joined}_Resume.json")
}
