//! User profile data used as substitution values and injected payload.
//! The data is an ordered mapping of named profile fields, loaded from JSON
//! or YAML and validated against a permissive built-in schema.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Profile fields of one user, kept in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(IndexMap<String, Value>);

impl UserData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field, returning the data for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Parses user data, trying JSON first and falling back to YAML.
    pub fn parse(content: &str) -> Result<Self> {
        let data: Self = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(_) => serde_yaml::from_str(content).map_err(|e| {
                Error::ValidationError(format!("user data is neither JSON nor YAML: {e}"))
            })?,
        };
        data.validate()?;
        Ok(data)
    }

    /// Loads user data from a file, or from stdin when the path is `-`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = if path == Path::new("-") {
            debug!("Reading user data from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            debug!("Reading user data from {}", path.display());
            std::fs::read_to_string(path)?
        };
        Self::parse(&content)
    }

    /// Checks field types against the profile schema.
    ///
    /// No field is required: absent fields fall back to substitution
    /// defaults during generation.
    pub fn validate(&self) -> Result<()> {
        let schema = profile_schema();
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::ValidationError(format!("invalid profile schema: {e}")))?;
        let instance = self.to_value();
        let errors: Vec<String> = validator
            .iter_errors(&instance)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationError(errors.join("; ")))
        }
    }

    /// Text used when substituting the field named `key`.
    ///
    /// Strings are used as-is, arrays of scalars are joined with ", " and
    /// numbers or booleans are displayed. Absent, null and empty values
    /// yield `None`.
    pub fn field_text(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    Value::Bool(_) | Value::Number(_) => Some(item.to_string()),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>()
                .join(", "),
            other @ Value::Object(_) => other.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// The user's display name, if present.
    pub fn name(&self) -> Option<String> {
        self.field_text("name")
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Compact JSON literal of the whole profile.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

fn profile_schema() -> Value {
    let string_list = serde_json::json!({ "type": "array", "items": { "type": "string" } });
    let text = serde_json::json!({ "type": ["string", "null"] });
    let text_or_list = serde_json::json!({
        "anyOf": [
            { "type": ["string", "null"] },
            { "type": "array", "items": { "type": ["string", "number", "boolean"] } }
        ]
    });

    serde_json::json!({
        "type": "object",
        "properties": {
            "name": text,
            "emailId": text,
            "phoneNo": text,
            "about": text,
            "experience": text_or_list,
            "skills": text_or_list,
            "resume": text,
            "profilePhoto": text,
            "preferredThemeName": text,
            "techStacks": string_list,
            "contactDetailsUrls": string_list,
            "codingProfilesUrls": string_list,
            "certificationsUrls": string_list,
            "projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title"],
                    "properties": {
                        "title": { "type": "string" },
                        "description": text,
                        "technologiesUsed": string_list,
                        "repoOrSiteLink": text
                    }
                }
            },
            "experiences": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["companyName", "role"],
                    "properties": {
                        "companyName": { "type": "string" },
                        "role": { "type": "string" },
                        "description": text,
                        "technologiesUsed": string_list,
                        "duration": text
                    }
                }
            },
            "achievements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title"],
                    "properties": {
                        "title": { "type": "string" },
                        "description": text
                    }
                }
            }
        }
    })
}
