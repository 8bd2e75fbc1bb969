//! Parse-and-validate step for positional action entries
//!
//! Raw entries arrive as heterogeneous sequences (`["#script.ps1", ["-Flag"], [0]]`).
//! Each action kind gets a typed spec whose trailing slots are optional and
//! default when absent. Slot types must match exactly: a string is never a
//! sequence, a bool is never an integer.

use serde_json::Value;

use crate::modules::error::ValidationError;

/// Expected JSON type of a positional slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Str,
    StrList,
    IntList,
    Int,
    Bool,
}

impl SlotKind {
    fn describe(self) -> &'static str {
        match self {
            SlotKind::Str => "string",
            SlotKind::StrList => "list of strings",
            SlotKind::IntList => "list of integers",
            SlotKind::Int => "integer",
            SlotKind::Bool => "bool",
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Positional reader over one raw entry, bound to the action it belongs to
pub struct PositionalArgs<'a> {
    action: &'a str,
    items: &'a [Value],
}

impl<'a> PositionalArgs<'a> {
    /// Require `args` to be a sequence with `min..=max` elements
    pub fn new(
        action: &'a str,
        args: &'a Value,
        min: usize,
        max: usize,
    ) -> Result<Self, ValidationError> {
        let items = args
            .as_array()
            .ok_or_else(|| ValidationError::NotASequence {
                action: action.to_string(),
                found: json_type_name(args).to_string(),
            })?;

        if !(min..=max).contains(&items.len()) {
            return Err(ValidationError::InvalidLength {
                action: action.to_string(),
                len: items.len(),
                min,
                max,
            });
        }

        Ok(Self {
            action,
            items: items.as_slice(),
        })
    }

    fn mismatch(&self, slot: usize, kind: SlotKind, found: &Value) -> ValidationError {
        ValidationError::InvalidType {
            action: self.action.to_string(),
            slot,
            expected: kind.describe().to_string(),
            found: json_type_name(found).to_string(),
        }
    }

    pub fn invalid_value(&self, slot: usize, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidValue {
            action: self.action.to_string(),
            slot,
            reason: reason.into(),
        }
    }

    pub fn string(&self, slot: usize) -> Result<Option<String>, ValidationError> {
        match self.items.get(slot) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(slot, SlotKind::Str, other)),
        }
    }

    pub fn string_list(&self, slot: usize) -> Result<Option<Vec<String>>, ValidationError> {
        let Some(value) = self.items.get(slot) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(self.mismatch(slot, SlotKind::StrList, value));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.mismatch(slot, SlotKind::StrList, other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn int_list(&self, slot: usize) -> Result<Option<Vec<i32>>, ValidationError> {
        let Some(value) = self.items.get(slot) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(self.mismatch(slot, SlotKind::IntList, value));
        };
        items
            .iter()
            .map(|item| self.exit_code(slot, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn int(&self, slot: usize) -> Result<Option<i64>, ValidationError> {
        match self.items.get(slot) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.mismatch(slot, SlotKind::Int, &Value::Number(n.clone()))),
            Some(other) => Err(self.mismatch(slot, SlotKind::Int, other)),
        }
    }

    pub fn boolean(&self, slot: usize) -> Result<Option<bool>, ValidationError> {
        match self.items.get(slot) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(slot, SlotKind::Bool, other)),
        }
    }

    fn exit_code(&self, slot: usize, item: &Value) -> Result<i32, ValidationError> {
        let code = match item {
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        code.and_then(|c| i32::try_from(c).ok())
            .ok_or_else(|| self.mismatch(slot, SlotKind::IntList, item))
    }
}

/// `[reference, args, success_codes, reboot_codes, retry_on_reboot]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub reference: String,
    pub args: Vec<String>,
    pub success_codes: Vec<i32>,
    pub reboot_codes: Vec<i32>,
    pub retry_on_reboot: bool,
}

impl ScriptSpec {
    pub const ACTION: &'static str = "PSScript";

    pub fn parse(args: &Value) -> Result<Self, ValidationError> {
        let slots = PositionalArgs::new(Self::ACTION, args, 1, 5)?;

        let reference = slots.string(0)?.unwrap_or_default();
        let args = slots.string_list(1)?.unwrap_or_default();
        let success_codes = slots.int_list(2)?.unwrap_or_else(default_success_codes);
        let reboot_codes = slots.int_list(3)?.unwrap_or_default();
        let retry_on_reboot = slots.boolean(4)?.unwrap_or(false);

        Ok(Self {
            reference,
            args,
            success_codes,
            reboot_codes,
            retry_on_reboot,
        })
    }
}

/// `[command_line, success_codes, reboot_codes, retry_on_reboot]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command_line: String,
    pub success_codes: Vec<i32>,
    pub reboot_codes: Vec<i32>,
    pub retry_on_reboot: bool,
}

impl CommandSpec {
    pub const ACTION: &'static str = "PSCommand";

    pub fn parse(args: &Value) -> Result<Self, ValidationError> {
        let slots = PositionalArgs::new(Self::ACTION, args, 1, 4)?;

        let command_line = slots.string(0)?.unwrap_or_default();
        if command_line.trim().is_empty() {
            return Err(slots.invalid_value(0, "command line is empty"));
        }
        let success_codes = slots.int_list(1)?.unwrap_or_else(default_success_codes);
        let reboot_codes = slots.int_list(2)?.unwrap_or_default();
        let retry_on_reboot = slots.boolean(3)?.unwrap_or(false);

        Ok(Self {
            command_line,
            success_codes,
            reboot_codes,
            retry_on_reboot,
        })
    }

    /// Whitespace tokenization; backslashes are kept so Windows paths survive.
    pub fn tokens(&self) -> Vec<String> {
        self.command_line
            .split_whitespace()
            .map(String::from)
            .collect()
    }
}

fn default_success_codes() -> Vec<i32> {
    vec![0]
}
