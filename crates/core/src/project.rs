//! Project record model, wire DTOs and the form validation schema.
//!
//! Raw form input arrives as [`ProjectInput`], every field a string. [`validate`]
//! turns it into a [`ValidatedProject`] whose tags are already normalized, or
//! into [`FieldErrors`] keyed by form field. Tags are split, trimmed and
//! filtered here and nowhere else.

use std::collections::BTreeMap;
use std::fmt;

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::types::{ProjectId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_IMAGE_URL: &str = "image_url";
pub const FIELD_LINK: &str = "link";
pub const FIELD_TAGS: &str = "tags";

/// Editable fields in the order the form renders them.
pub const PROJECT_FIELDS: &[&str] = &[
    FIELD_TITLE,
    FIELD_DESCRIPTION,
    FIELD_IMAGE_URL,
    FIELD_LINK,
    FIELD_TAGS,
];

/// Separator used when a tag list is shown back in the form.
pub const TAG_DISPLAY_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Stored record and wire DTOs
// ---------------------------------------------------------------------------

/// A row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owner; rows written before ownership was tracked carry no value.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Insert payload. `user_id` comes from the current session, never from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    pub tags: Vec<String>,
    pub user_id: UserId,
}

/// Update payload. Replaces every editable field and refreshes `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectChanges {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    pub tags: Vec<String>,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Form input
// ---------------------------------------------------------------------------

/// Raw form values, exactly as typed.
///
/// `tags` is the comma-separated string from the form. JSON clients may send a
/// list instead; it is joined back so both paths share one normalization step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectInput {
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    pub title: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    #[validate(custom(function = "web_url", message = "Must be a valid URL"))]
    pub image_url: String,

    #[validate(custom(function = "web_url", message = "Must be a valid URL"))]
    pub link: String,

    #[serde(deserialize_with = "tags_from_string_or_list")]
    pub tags: String,
}

/// Absolute `http` or `https` URL. Both fields end up in `href`/`src`
/// attributes, so other schemes (`javascript:`, `data:`) are refused.
fn web_url(value: &str) -> Result<(), ValidationError> {
    let web_scheme = value
        .split_once("://")
        .is_some_and(|(scheme, _)| {
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        });
    if web_scheme && value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message(Cow::Borrowed("Must be a valid URL")))
    }
}

impl ProjectInput {
    /// Form defaults for editing an existing record.
    pub fn from_record(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            image_url: project.image_url.clone(),
            link: project.link.clone(),
            tags: project.tags.join(TAG_DISPLAY_SEPARATOR),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    Joined(String),
    List(Vec<String>),
}

fn tags_from_string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawTags::deserialize(deserializer)? {
        RawTags::Joined(raw) => raw,
        RawTags::List(list) => list.join(","),
    })
}

/// Input that passed [`validate`]; tags are already a clean sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProject {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    pub tags: Vec<String>,
}

impl ValidatedProject {
    pub fn into_new(self, user_id: UserId) -> NewProject {
        NewProject {
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            link: self.link,
            tags: self.tags,
            user_id,
        }
    }

    pub fn into_changes(self, updated_at: Timestamp) -> ProjectChanges {
        ProjectChanges {
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            link: self.link,
            tags: self.tags,
            updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Validation messages grouped by form field. Messages keep rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// All messages for `field`, empty if the field passed.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The message rendered beneath the input.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<&validator::ValidationErrors> for FieldErrors {
    fn from(errors: &validator::ValidationErrors) -> Self {
        let by_field = errors.field_errors();
        let mut out = FieldErrors::new();
        for field in PROJECT_FIELDS {
            let Some(errs) = by_field.get(*field) else {
                continue;
            };
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.push(field, message);
            }
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Split a comma-separated tag string, trim every token and drop empties.
///
/// Idempotent: `normalize_tags(&normalize_tags(s).join(","))` equals
/// `normalize_tags(s)`.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate raw form input and normalize its tags.
pub fn validate(input: &ProjectInput) -> Result<ValidatedProject, FieldErrors> {
    if let Err(errors) = input.validate() {
        return Err(FieldErrors::from(&errors));
    }

    Ok(ValidatedProject {
        title: input.title.clone(),
        description: input.description.clone(),
        image_url: input.image_url.clone(),
        link: input.link.clone(),
        tags: normalize_tags(&input.tags),
    })
}
