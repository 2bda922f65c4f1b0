// Copyright (c) 2025 - Cowboy AI, Inc.
//! Validation Result Tree
//!
//! Every parameter group reports its validity as a path-addressable tree:
//! a group holds field results, nested group results and group-map results.
//! A node's status is the worst status of itself and everything below it.
//!
//! All functions here are pure: building a result never touches shared
//! state, so validating the same parameters twice renders the same text.
//!
//! # Rendering
//!
//! [`GroupValidationResult::result`] renders every non-clean node, one per
//! line, indented two spaces per level:
//!
//! ```text
//! parameter group "PluginHandler" type "PluginHandlerParameters" INVALID, parameter group has status of INVALID
//!   parameter group map "policyDecoders" INVALID, must have at least one policy decoder
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Type label used for string-valued fields
pub const STRING_TYPE: &str = "java.lang.String";

/// Type label used for integer-valued fields
pub const INT_TYPE: &str = "int";

/// Type label used for list-valued fields
pub const LIST_TYPE: &str = "java.util.List";

/// Validation status, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ValidationStatus {
    #[default]
    Clean,
    Observation,
    Warning,
    Invalid,
}

impl ValidationStatus {
    /// Is this status acceptable for starting the service?
    pub fn is_valid(self) -> bool {
        self != ValidationStatus::Invalid
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationStatus::Clean => "CLEAN",
            ValidationStatus::Observation => "OBSERVATION",
            ValidationStatus::Warning => "WARNING",
            ValidationStatus::Invalid => "INVALID",
        };
        f.write_str(text)
    }
}

/// Result of validating a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationResult {
    pub name: String,
    pub type_label: String,
    pub value: String,
    pub status: ValidationStatus,
    pub message: String,
}

impl FieldValidationResult {
    fn render(&self, indent: usize, out: &mut String) {
        if self.status == ValidationStatus::Clean {
            return;
        }
        out.push_str(&format!(
            "{:indent$}field \"{}\" type \"{}\" value \"{}\" {}, {}\n",
            "",
            self.name,
            self.type_label,
            self.value,
            self.status,
            self.message,
            indent = indent
        ));
    }
}

/// Result of validating a map of named parameter groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMapValidationResult {
    name: String,
    status: ValidationStatus,
    message: Option<String>,
    groups: Vec<(String, GroupValidationResult)>,
}

impl GroupMapValidationResult {
    /// Create a clean, empty map result
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ValidationStatus::Clean,
            message: None,
            groups: Vec::new(),
        }
    }

    /// Map parameter was absent altogether
    pub fn null(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("map parameter \"{}\" is null", name);
        let mut result = Self::new(name);
        result.set_result(ValidationStatus::Invalid, message);
        result
    }

    /// Set the status and message of the map itself
    pub fn set_result(&mut self, status: ValidationStatus, message: impl Into<String>) {
        self.status = self.status.max(status);
        self.message = Some(message.into());
    }

    /// Fold in the result of one map entry
    pub fn add(&mut self, key: impl Into<String>, result: GroupValidationResult) {
        self.status = self.status.max(result.status());
        self.groups.push((key.into(), result));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Result for a single key of the map
    pub fn get(&self, key: &str) -> Option<&GroupValidationResult> {
        self.groups.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    fn render(&self, indent: usize, out: &mut String) {
        if self.status == ValidationStatus::Clean {
            return;
        }
        let message = self.message.clone().unwrap_or_else(|| {
            format!("parameter group map has status of {}", self.status)
        });
        out.push_str(&format!(
            "{:indent$}parameter group map \"{}\" {}, {}\n",
            "",
            self.name,
            self.status,
            message,
            indent = indent
        ));
        for (_, group) in &self.groups {
            group.render(indent + 2, out);
        }
    }
}

/// One entry of a group result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationEntry {
    Field(FieldValidationResult),
    Group(GroupValidationResult),
    Map(GroupMapValidationResult),
}

impl ValidationEntry {
    fn status(&self) -> ValidationStatus {
        match self {
            ValidationEntry::Field(field) => field.status,
            ValidationEntry::Group(group) => group.status(),
            ValidationEntry::Map(map) => map.status(),
        }
    }

    fn render(&self, indent: usize, out: &mut String) {
        match self {
            ValidationEntry::Field(field) => field.render(indent, out),
            ValidationEntry::Group(group) => group.render(indent, out),
            ValidationEntry::Map(map) => map.render(indent, out),
        }
    }
}

/// Validation result of a parameter group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupValidationResult {
    name: String,
    type_label: String,
    status: ValidationStatus,
    message: Option<String>,
    entries: Vec<ValidationEntry>,
}

impl GroupValidationResult {
    /// Create a clean result for the named group
    pub fn new(name: impl Into<String>, type_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
            status: ValidationStatus::Clean,
            message: None,
            entries: Vec::new(),
        }
    }

    /// Set a status and message on the group itself
    pub fn set_result(&mut self, status: ValidationStatus, message: impl Into<String>) {
        self.status = self.status.max(status);
        self.message = Some(message.into());
    }

    /// Record the result of a single field
    pub fn set_field_result(
        &mut self,
        name: impl Into<String>,
        type_label: impl Into<String>,
        value: impl Into<String>,
        status: ValidationStatus,
        message: impl Into<String>,
    ) {
        self.push(ValidationEntry::Field(FieldValidationResult {
            name: name.into(),
            type_label: type_label.into(),
            value: value.into(),
            status,
            message: message.into(),
        }));
    }

    /// Non-null, non-blank string rule
    pub fn validate_non_blank(&mut self, name: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.set_field_result(
                name,
                STRING_TYPE,
                value.unwrap_or("null"),
                ValidationStatus::Invalid,
                "must be a non-blank string",
            );
        }
    }

    /// Fold in the result of a nested group
    pub fn set_group_result(&mut self, result: GroupValidationResult) {
        self.push(ValidationEntry::Group(result));
    }

    /// Fold in the result of a map of nested groups
    pub fn set_map_result(&mut self, result: GroupMapValidationResult) {
        self.push(ValidationEntry::Map(result));
    }

    fn push(&mut self, entry: ValidationEntry) {
        self.status = self.status.max(entry.status());
        self.entries.push(entry);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    pub fn is_clean(&self) -> bool {
        self.status == ValidationStatus::Clean
    }

    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    /// Look up a field result by name
    pub fn field(&self, name: &str) -> Option<&FieldValidationResult> {
        self.entries.iter().find_map(|entry| match entry {
            ValidationEntry::Field(field) if field.name == name => Some(field),
            _ => None,
        })
    }

    /// Look up a map result by name
    pub fn map(&self, name: &str) -> Option<&GroupMapValidationResult> {
        self.entries.iter().find_map(|entry| match entry {
            ValidationEntry::Map(map) if map.name == name => Some(map),
            _ => None,
        })
    }

    /// Render every non-clean node, or `None` if the whole tree is clean
    pub fn result(&self) -> Option<String> {
        if self.is_clean() {
            return None;
        }
        let mut out = String::new();
        self.render(0, &mut out);
        Some(out)
    }

    fn render(&self, indent: usize, out: &mut String) {
        if self.status == ValidationStatus::Clean {
            return;
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("parameter group has status of {}", self.status));
        out.push_str(&format!(
            "{:indent$}parameter group \"{}\" type \"{}\" {}, {}\n",
            "",
            self.name,
            self.type_label,
            self.status,
            message,
            indent = indent
        ));
        for entry in &self.entries {
            entry.render(indent + 2, out);
        }
    }
}

/// Validate a required map of nested groups
///
/// An absent map and an empty map are both invalid but report different
/// messages: `map parameter "<name>" is null` versus `empty_message`.
pub fn validate_group_map<T, F>(
    name: &str,
    map: Option<&BTreeMap<String, T>>,
    empty_message: &str,
    validate_entry: F,
) -> GroupMapValidationResult
where
    F: Fn(&T) -> GroupValidationResult,
{
    let Some(map) = map else {
        return GroupMapValidationResult::null(name);
    };

    let mut result = GroupMapValidationResult::new(name);
    if map.is_empty() {
        result.set_result(ValidationStatus::Invalid, empty_message);
        return result;
    }
    for (key, value) in map {
        result.add(key.clone(), validate_entry(value));
    }
    result
}
