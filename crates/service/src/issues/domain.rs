use std::borrow::Cow;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::errors::IssueError;

/// A single tracked issue as stored and returned over the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    #[serde(default = "default_open")]
    pub open: bool,
    pub created_on: String,
    pub updated_on: String,
}

fn default_open() -> bool { true }

impl Issue {
    /// String form of a field addressed by its wire name, as used by filters.
    /// `None` for names that are not issue fields.
    pub fn field_text(&self, key: &str) -> Option<Cow<'_, str>> {
        let text = match key {
            "_id" => self.id.as_str(),
            "issue_title" => self.issue_title.as_str(),
            "issue_text" => self.issue_text.as_str(),
            "created_by" => self.created_by.as_str(),
            "assigned_to" => self.assigned_to.as_str(),
            "status_text" => self.status_text.as_str(),
            "created_on" => self.created_on.as_str(),
            "updated_on" => self.updated_on.as_str(),
            "open" => return Some(Cow::Owned(self.open.to_string())),
            _ => return None,
        };
        Some(Cow::Borrowed(text))
    }
}

/// Create input: server generates `_id`, timestamps and `open`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewIssue {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

/// Required create fields after presence checks.
#[derive(Debug)]
pub(crate) struct ValidNewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

impl NewIssue {
    pub(crate) fn validate(self) -> Result<ValidNewIssue, IssueError> {
        match (present(self.issue_title), present(self.issue_text), present(self.created_by)) {
            (Some(issue_title), Some(issue_text), Some(created_by)) => Ok(ValidNewIssue {
                issue_title,
                issue_text,
                created_by,
                assigned_to: self.assigned_to.unwrap_or_default(),
                status_text: self.status_text.unwrap_or_default(),
            }),
            _ => Err(IssueError::Validation),
        }
    }
}

/// Partial update addressed by `_id`. Keys outside the issue schema are
/// dropped during decoding; `created_on`/`updated_on` are server-owned.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuePatch {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    #[serde(deserialize_with = "bool_or_text")]
    pub open: Option<bool>,
}

impl IssuePatch {
    /// Target id, treating an empty string as absent.
    pub fn target(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn has_changes(&self) -> bool {
        self.issue_title.is_some()
            || self.issue_text.is_some()
            || self.created_by.is_some()
            || self.assigned_to.is_some()
            || self.status_text.is_some()
            || self.open.is_some()
    }

    pub(crate) fn apply_to(&self, issue: &mut Issue) {
        let text_fields = [
            (&self.issue_title, &mut issue.issue_title),
            (&self.issue_text, &mut issue.issue_text),
            (&self.created_by, &mut issue.created_by),
            (&self.assigned_to, &mut issue.assigned_to),
            (&self.status_text, &mut issue.status_text),
        ];
        for (change, field) in text_fields {
            if let Some(value) = change {
                field.clone_from(value);
            }
        }
        if let Some(open) = self.open {
            issue.open = open;
        }
    }
}

/// Delete input.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueRef {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

impl IssueRef {
    pub fn target(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Success body for update and delete.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub result: String,
    #[serde(rename = "_id")]
    pub id: String,
}

impl Acknowledgement {
    pub fn updated(id: impl Into<String>) -> Self {
        Self { result: "successfully updated".into(), id: id.into() }
    }

    pub fn deleted(id: impl Into<String>) -> Self {
        Self { result: "successfully deleted".into(), id: id.into() }
    }
}

// Form bodies carry `open=false` as text while JSON bodies send a boolean.
fn bool_or_text<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OpenVisitor;

    impl<'de> de::Visitor<'de> for OpenVisitor {
        type Value = Option<bool>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or \"true\"/\"false\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            match v {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                "" => Ok(None),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(OpenVisitor)
        }
    }

    deserializer.deserialize_any(OpenVisitor)
}
