use crate::models::{ExperienceLevel, Profile};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while normalizing a raw profile document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document is not an object")]
    NotAnObject,

    #[error("Document has no id")]
    MissingId,

    #[error("Invalid export format: {0}")]
    InvalidExport(String),
}

const ID_KEYS: &[&str] = &["id", "$id", "userId"];

/// Build a canonical [`Profile`] from a raw profile document
///
/// Documents written by older registration flows use capitalized keys
/// ("Skills Offering") while newer ones use camelCase; both are accepted,
/// camelCase first. Values of the wrong shape degrade to empty or absent
/// rather than failing the document.
pub fn profile_from_document(doc: &Value) -> Result<Profile, DocumentError> {
    if !doc.is_object() {
        return Err(DocumentError::NotAnObject);
    }

    // Exports wrap fields in a `data` object next to the document id
    let data = doc.get("data").filter(|d| d.is_object()).unwrap_or(doc);

    let id = find_id(doc)
        .or_else(|| find_id(data))
        .ok_or(DocumentError::MissingId)?;

    Ok(Profile {
        id,
        full_name: field(data, "fullName", "Full Name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        skills_offering: field(data, "skillsOffering", "Skills Offering").map(string_list),
        skills_seeking: field(data, "skillsSeeking", "Skills Seeking").map(string_list),
        purposes: field(data, "purposes", "Purposes")
            .map(string_list)
            .unwrap_or_default(),
        business_needs: field(data, "businessNeeds", "Business Needs")
            .map(string_list)
            .unwrap_or_default(),
        experience_level: field(data, "experienceLevel", "Experience Level")
            .and_then(Value::as_str)
            .and_then(|level| match level.parse::<ExperienceLevel>() {
                Ok(level) => Some(level),
                Err(e) => {
                    tracing::debug!("Ignoring experience level: {}", e);
                    None
                }
            }),
        fcm_token: data
            .get("fcmToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string),
    })
}

/// Normalize a whole export into profiles
///
/// Accepts either a bare array of documents or an object holding a
/// `documents` array. Documents that cannot be normalized are skipped.
pub fn profiles_from_export(export: &Value) -> Result<Vec<Profile>, DocumentError> {
    let documents = match export {
        Value::Array(docs) => docs,
        Value::Object(_) => export
            .get("documents")
            .and_then(Value::as_array)
            .ok_or_else(|| DocumentError::InvalidExport("Missing documents array".into()))?,
        _ => {
            return Err(DocumentError::InvalidExport(
                "Expected an array or an object with documents".into(),
            ))
        }
    };

    let profiles: Vec<Profile> = documents
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| match profile_from_document(doc) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Skipping document {}: {}", index, e);
                None
            }
        })
        .collect();

    tracing::debug!("Normalized {} of {} documents", profiles.len(), documents.len());

    Ok(profiles)
}

fn find_id(value: &Value) -> Option<String> {
    ID_KEYS
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Look up a field under its camelCase key, then its legacy key; null counts as missing
fn field<'a>(data: &'a Value, key: &str, legacy_key: &str) -> Option<&'a Value> {
    data.get(key)
        .filter(|v| !v.is_null())
        .or_else(|| data.get(legacy_key).filter(|v| !v.is_null()))
}

/// Coerce a value into a list of distinct labels
fn string_list(value: &Value) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    if let Some(items) = value.as_array() {
        for label in items.iter().filter_map(Value::as_str) {
            if !label.is_empty() && !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }

    labels
}
