//! Structured validation results.
//!
//! Validators collect every violated constraint instead of stopping at the
//! first one, so callers that only need a verdict can call
//! [`ValidationReport::is_valid`] while logging keeps the detail.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: ViolationRule,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Which constraint a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    /// The input as a whole was not a JSON object.
    Shape,
    Required,
    TypeCheck,
    EnumValues,
}

/// Aggregated result of validating one input value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(
        &mut self,
        field: &str,
        rule: ViolationRule,
        message: impl Into<String>,
        value: Option<&serde_json::Value>,
    ) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            rule,
            message: message.into(),
            value: value.cloned(),
        });
    }

    /// Names of the fields that failed, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }

    /// All messages joined into one line, for logs and error strings.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<ValidationReport> for CoreError {
    fn from(report: ValidationReport) -> Self {
        CoreError::Validation(report.summary())
    }
}
