use crate::projects::{ProjectError, ProjectFormat, VersionField};
use anyhow::Result;
use log::debug;
use regex::Regex;
use serde_json::Value;

const VERSION_KEY: &str = "version";

/// Legacy `project.json` descriptor with a single top-level `version` string.
pub struct ProjectJson {
    document: Value,
}

impl ProjectFormat for ProjectJson {
    fn parse(contents: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(contents)?;
        if !document.is_object() {
            debug!("project.json root is not an object");
        }
        Ok(ProjectJson { document })
    }

    fn version_fields(&self) -> Vec<VersionField> {
        match self.document.get(VERSION_KEY) {
            Some(Value::String(text)) if !text.trim().is_empty() => vec![VersionField {
                tag: VERSION_KEY.to_string(),
                text: text.clone(),
                index: 0,
            }],
            Some(other) if !other.is_string() => {
                debug!("Ignoring non-string version value: {}", other);
                vec![]
            }
            _ => vec![],
        }
    }

    fn set_field(&mut self, field: &VersionField, value: &str) -> Result<()> {
        let object = self
            .document
            .as_object_mut()
            .filter(|_| field.index == 0)
            .ok_or(ProjectError::UnknownField(field.index))?;
        object.insert(VERSION_KEY.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    fn filename_match_regex() -> Result<Regex> {
        Ok(Regex::new(r#"(?i)(?:^|[/\\])project\.json$"#)?)
    }
}
