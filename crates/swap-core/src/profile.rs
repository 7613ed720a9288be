//! Student profiles and normalization of loosely typed profile documents.
//!
//! Profile documents written by older clients are not consistent: the
//! availability field is sometimes a single string, list fields are
//! sometimes missing, and keys appear both in camelCase and snake_case.
//! Everything is normalized here, once, into [`Profile`] / [`ProfileDraft`];
//! the rest of the crate only ever sees the strict types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::validation::{self, ValidationError, MAX_BIO_LENGTH};

/// A student's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Identity-provider user id.
    pub id: String,
    /// Sign-up email.
    pub email: String,
    /// Display name, if set.
    #[serde(default)]
    pub name: Option<String>,
    /// Public handle, if set.
    #[serde(default)]
    pub username: Option<String>,
    /// Skills this student can teach.
    pub skills_offered: Vec<String>,
    /// Skills this student wants to learn.
    pub skills_needed: Vec<String>,
    /// Availability slots (e.g. "Mornings", "Weekends").
    pub availability: Vec<String>,
    /// Free-text bio.
    pub bio: String,
    /// Download URL of the profile photo.
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Credit balance. Only the credit ledger changes it.
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable part of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_needed: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Errors raised while normalizing a profile document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// The document is not a JSON object.
    #[error("profile document must be an object")]
    NotAnObject,

    /// A field has a shape that cannot be coerced.
    #[error("invalid profile field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ProfileDraft {
    /// Normalize a loosely typed profile document into a draft.
    ///
    /// Missing or null list fields become empty lists, a lone string
    /// becomes a one-element list, and blank entries are dropped. Any
    /// other shape is rejected.
    pub fn from_document(doc: &Value) -> Result<Self, ProfileError> {
        let obj = doc.as_object().ok_or(ProfileError::NotAnObject)?;

        Ok(Self {
            name: optional_string(obj, "name", &["name", "displayName"])?,
            username: optional_string(obj, "username", &["username"])?,
            skills_offered: string_list(obj, "skillsOffered", &["skillsOffered", "skills_offered"])?,
            skills_needed: string_list(obj, "skillsNeeded", &["skillsNeeded", "skills_needed"])?,
            availability: string_list(obj, "availability", &["availability"])?,
            bio: optional_string(obj, "bio", &["bio"])?.unwrap_or_default(),
            photo_url: optional_string(obj, "photoURL", &["photoURL", "photoUrl", "photo_url"])?,
        })
    }

    /// Check the draft is complete enough to be saved as a profile.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_entries("skills offered", &self.skills_offered)?;
        validation::validate_entries("skills needed", &self.skills_needed)?;
        validation::validate_entries("availability", &self.availability)?;
        validation::require_text("bio", &self.bio, MAX_BIO_LENGTH)?;
        Ok(())
    }
}

impl Profile {
    /// Build a new profile at signup.
    pub fn new(id: &str, email: &str, draft: ProfileDraft, now: DateTime<Utc>) -> Self {
        let mut profile = Self {
            id: id.to_string(),
            email: email.trim().to_string(),
            name: None,
            username: None,
            skills_offered: Vec::new(),
            skills_needed: Vec::new(),
            availability: Vec::new(),
            bio: String::new(),
            photo_url: None,
            credits: 0,
            created_at: now,
            updated_at: now,
        };
        profile.apply(draft, now);
        profile
    }

    /// Normalize a stored profile document.
    ///
    /// Used when reading documents whose shape is not guaranteed, so list
    /// fields are coerced rather than validated.
    pub fn from_document(id: &str, doc: &Value, now: DateTime<Utc>) -> Result<Self, ProfileError> {
        let draft = ProfileDraft::from_document(doc)?;
        // from_document already rejected non-objects
        let obj = doc.as_object().ok_or(ProfileError::NotAnObject)?;

        let email = optional_string(obj, "email", &["email"])?.unwrap_or_default();
        let credits = credits(obj)?;

        let mut profile = Self::new(id, &email, draft, now);
        profile.credits = credits;
        Ok(profile)
    }

    /// Replace the user-editable fields with a draft.
    pub fn apply(&mut self, draft: ProfileDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.username = draft.username;
        self.skills_offered = draft.skills_offered;
        self.skills_needed = draft.skills_needed;
        self.availability = draft.availability;
        self.bio = draft.bio.trim().to_string();
        self.photo_url = draft.photo_url;
        self.updated_at = now;
    }

    /// Best available human-readable name.
    pub fn display_name(&self) -> &str {
        [self.name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or(if self.email.is_empty() { "Anonymous" } else { &self.email })
    }

    /// Case-insensitive substring match over name, username and skills.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        let hit = |value: &str| value.to_lowercase().contains(needle);

        self.name.as_deref().is_some_and(hit)
            || self.username.as_deref().is_some_and(hit)
            || self.skills_offered.iter().any(|s| hit(s))
            || self.skills_needed.iter().any(|s| hit(s))
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn optional_string(
    obj: &Map<String, Value>,
    field: &'static str,
    keys: &[&str],
) -> Result<Option<String>, ProfileError> {
    match lookup(obj, keys) {
        None => Ok(None),
        Some(Value::String(text)) => {
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
        Some(other) => Err(ProfileError::InvalidField {
            field,
            reason: format!("expected a string, got {}", kind_of(other)),
        }),
    }
}

fn string_list(
    obj: &Map<String, Value>,
    field: &'static str,
    keys: &[&str],
) -> Result<Vec<String>, ProfileError> {
    match lookup(obj, keys) {
        None => Ok(Vec::new()),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![text.to_string()])
            }
        }
        Some(Value::Array(items)) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) if text.trim().is_empty() => {}
                    Value::String(text) => entries.push(text.trim().to_string()),
                    other => {
                        return Err(ProfileError::InvalidField {
                            field,
                            reason: format!("list entries must be strings, got {}", kind_of(other)),
                        })
                    }
                }
            }
            Ok(entries)
        }
        Some(other) => Err(ProfileError::InvalidField {
            field,
            reason: format!("expected a list or a string, got {}", kind_of(other)),
        }),
    }
}

fn credits(obj: &Map<String, Value>) -> Result<i64, ProfileError> {
    let Some(value) = lookup(obj, &["credits"]) else {
        return Ok(0);
    };

    let invalid = |reason: &str| ProfileError::InvalidField {
        field: "credits",
        reason: reason.to_string(),
    };

    let credits = value
        .as_i64()
        .ok_or_else(|| invalid("expected a whole number"))?;
    if credits < 0 {
        return Err(invalid("cannot be negative"));
    }
    Ok(credits)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_missing_lists_become_empty() {
        let draft = ProfileDraft::from_document(&json!({ "bio": "hi" })).unwrap();
        assert!(draft.skills_offered.is_empty());
        assert!(draft.skills_needed.is_empty());
        assert!(draft.availability.is_empty());
        assert_eq!(draft.bio, "hi");
    }

    #[test]
    fn test_null_lists_become_empty() {
        let draft = ProfileDraft::from_document(&json!({
            "skillsOffered": null,
            "availability": null,
        }))
        .unwrap();
        assert!(draft.skills_offered.is_empty());
        assert!(draft.availability.is_empty());
    }

    #[test]
    fn test_single_string_availability_becomes_list() {
        let draft = ProfileDraft::from_document(&json!({ "availability": "Evenings" })).unwrap();
        assert_eq!(draft.availability, vec!["Evenings".to_string()]);

        let draft = ProfileDraft::from_document(&json!({ "availability": "" })).unwrap();
        assert!(draft.availability.is_empty());
    }

    #[test]
    fn test_blank_entries_dropped_and_trimmed() {
        let draft = ProfileDraft::from_document(&json!({
            "skillsNeeded": ["Python", "  ", " Go "],
        }))
        .unwrap();
        assert_eq!(draft.skills_needed, vec!["Python".to_string(), "Go".to_string()]);
    }

    #[test]
    fn test_snake_case_keys_accepted() {
        let draft = ProfileDraft::from_document(&json!({
            "skills_offered": ["Rust"],
            "photo_url": "https://cdn.example/p.jpg",
        }))
        .unwrap();
        assert_eq!(draft.skills_offered, vec!["Rust".to_string()]);
        assert_eq!(draft.photo_url.as_deref(), Some("https://cdn.example/p.jpg"));
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let err = ProfileDraft::from_document(&json!({ "availability": 3 })).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { field: "availability", .. }));

        let err = ProfileDraft::from_document(&json!({ "skillsOffered": ["Go", 1] })).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { field: "skillsOffered", .. }));

        let err = ProfileDraft::from_document(&json!({ "bio": ["a"] })).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { field: "bio", .. }));

        assert_eq!(
            ProfileDraft::from_document(&json!("nope")).unwrap_err(),
            ProfileError::NotAnObject
        );
    }

    #[test]
    fn test_profile_from_document_reads_email_and_credits() {
        let profile = Profile::from_document(
            "u1",
            &json!({ "email": "a@uni.edu", "credits": 12, "skillsOffered": ["Go"] }),
            now(),
        )
        .unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.email, "a@uni.edu");
        assert_eq!(profile.credits, 12);

        let profile = Profile::from_document("u2", &json!({}), now()).unwrap();
        assert_eq!(profile.credits, 0);
        assert_eq!(profile.email, "");
    }

    #[test]
    fn test_invalid_credits_rejected() {
        for credits in [json!(-1), json!(1.5), json!("10")] {
            let err = Profile::from_document("u", &json!({ "credits": credits }), now()).unwrap_err();
            assert!(matches!(err, ProfileError::InvalidField { field: "credits", .. }));
        }
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ProfileDraft {
            skills_offered: vec!["Go".to_string()],
            skills_needed: vec!["Python".to_string()],
            availability: vec!["Mornings".to_string()],
            bio: "CS sophomore".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.availability.clear();
        assert!(matches!(draft.validate(), Err(ValidationError::NoEntries(_))));

        draft.availability.push("Mornings".to_string());
        draft.bio = "   ".to_string();
        assert!(matches!(draft.validate(), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile = Profile::new("u1", "a@uni.edu", ProfileDraft::default(), now());
        assert_eq!(profile.display_name(), "a@uni.edu");

        profile.username = Some("ada".to_string());
        assert_eq!(profile.display_name(), "ada");

        profile.name = Some("Ada L.".to_string());
        assert_eq!(profile.display_name(), "Ada L.");

        let anonymous = Profile::new("u2", "", ProfileDraft::default(), now());
        assert_eq!(anonymous.display_name(), "Anonymous");
    }

    #[test]
    fn test_matches_search() {
        let draft = ProfileDraft {
            username: Some("GoFan".to_string()),
            skills_needed: vec!["Machine Learning".to_string()],
            ..Default::default()
        };
        let profile = Profile::new("u1", "a@uni.edu", draft, now());
        assert!(profile.matches_search("gofan"));
        assert!(profile.matches_search("learning"));
        assert!(!profile.matches_search("physics"));
    }
}
