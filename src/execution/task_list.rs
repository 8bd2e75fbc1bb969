//! Task list parsing: a sequence of `{ <ActionName>: <args> }` entries

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::execution::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskListFormat {
    Json,
    Yaml,
    Auto,
}

/// One configured action with its raw positional arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    pub args: Value,
}

impl ActionEntry {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    pub entries: Vec<ActionEntry>,
}

impl TaskList {
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content, TaskListFormat::Auto)
    }

    pub fn parse(content: &str, format: TaskListFormat) -> Result<Self, ParseError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let document = match format {
            TaskListFormat::Json => parse_json(content)?,
            TaskListFormat::Yaml => parse_yaml(content)?,
            // YAML flow style also starts with `[` or `{`
            TaskListFormat::Auto => match detect_format(content) {
                TaskListFormat::Json => parse_json(content).or_else(|_| parse_yaml(content))?,
                _ => parse_yaml(content)?,
            },
        };

        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, ParseError> {
        let items = match document {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            _ => return Err(ParseError::NotASequence),
        };

        let entries = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| entry_from_value(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn detect_format(content: &str) -> TaskListFormat {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        TaskListFormat::Json
    } else {
        TaskListFormat::Yaml
    }
}

fn parse_json(content: &str) -> Result<Value, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::InvalidJson {
        reason: e.to_string(),
    })
}

fn parse_yaml(content: &str) -> Result<Value, ParseError> {
    serde_yaml::from_str(content).map_err(|e| ParseError::InvalidYaml {
        reason: e.to_string(),
    })
}

fn entry_from_value(index: usize, item: Value) -> Result<ActionEntry, ParseError> {
    let Value::Object(map) = item else {
        return Err(ParseError::InvalidEntry {
            index,
            reason: "expected a single-key map".to_string(),
        });
    };
    if map.len() != 1 {
        return Err(ParseError::InvalidEntry {
            index,
            reason: format!("expected exactly one action, found {}", map.len()),
        });
    }

    map.into_iter()
        .next()
        .map(|(name, args)| ActionEntry { name, args })
        .ok_or(ParseError::InvalidEntry {
            index,
            reason: "empty entry".to_string(),
        })
}
