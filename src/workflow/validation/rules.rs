//! Field-level schema rules shared by the per-stage validators.
//!
//! Rules accumulate violations instead of failing fast, so a rejected
//! payload reports every missing and invalid field at once.

use crate::workflow::domain::{
    FieldViolation, SchemaValidationError, Stage, TaskSourceKind, TestStatus,
};
use serde_json::{Map, Value};

/// Accumulator for missing and invalid fields of one payload.
#[derive(Debug, Default)]
pub(super) struct Violations {
    missing: Vec<String>,
    invalid: Vec<FieldViolation>,
}

impl Violations {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn missing(&mut self, field: impl Into<String>) {
        self.missing.push(field.into());
    }

    pub(super) fn invalid(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.invalid.push(FieldViolation::new(field, reason));
    }

    pub(super) fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    pub(super) fn into_error(self, stage: Stage) -> SchemaValidationError {
        SchemaValidationError::new(stage, self.missing, self.invalid)
    }
}

/// Requires the payload itself to be a JSON object.
pub(super) fn as_object<'a>(
    stage: Stage,
    payload: &'a Value,
) -> Result<&'a Map<String, Value>, SchemaValidationError> {
    payload.as_object().ok_or_else(|| {
        SchemaValidationError::new(
            stage,
            Vec::new(),
            vec![FieldViolation::new("$", "expected a JSON object")],
        )
    })
}

/// Requires `field` to be present and a string.
pub(super) fn require_string(map: &Map<String, Value>, field: &str, violations: &mut Violations) {
    match map.get(field) {
        None => violations.missing(field),
        Some(Value::String(_)) => {}
        Some(_) => violations.invalid(field, "expected a string"),
    }
}

/// Requires `field` to be present and a boolean.
pub(super) fn require_bool(map: &Map<String, Value>, field: &str, violations: &mut Violations) {
    match map.get(field) {
        None => violations.missing(field),
        Some(Value::Bool(_)) => {}
        Some(_) => violations.invalid(field, "expected a boolean"),
    }
}

/// Requires `field` to be present and a list of strings.
pub(super) fn require_string_list(
    map: &Map<String, Value>,
    field: &str,
    violations: &mut Violations,
) {
    match map.get(field) {
        None => violations.missing(field),
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    violations.invalid(format!("{field}[{index}]"), "expected a string");
                }
            }
        }
        Some(_) => violations.invalid(field, "expected a list of strings"),
    }
}

/// Requires `field` to name one of the closed task-source kinds.
pub(super) fn require_source_kind(
    map: &Map<String, Value>,
    field: &str,
    violations: &mut Violations,
) {
    match map.get(field) {
        None => violations.missing(field),
        Some(Value::String(value)) => {
            if TaskSourceKind::try_from(value.as_str()).is_err() {
                violations.invalid(
                    field,
                    format!("expected one of [local_file, github, jira, linear], got '{value}'"),
                );
            }
        }
        Some(_) => violations.invalid(field, "expected a string"),
    }
}

/// Requires `field` to be a list of test-case results.
///
/// Each entry needs a string `name` and a `status` of exactly `passed` or
/// `failed`; any other literal is an invalid-field entry naming the precise
/// path, never a coercion. `message` is optional but must be a string when
/// present.
pub(super) fn require_test_results(
    map: &Map<String, Value>,
    field: &str,
    violations: &mut Violations,
) {
    let Some(value) = map.get(field) else {
        violations.missing(field);
        return;
    };
    let Some(items) = value.as_array() else {
        violations.invalid(field, "expected a list of test results");
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let Some(entry) = item.as_object() else {
            violations.invalid(format!("{field}[{index}]"), "expected an object");
            continue;
        };
        match entry.get("name") {
            None => violations.missing(format!("{field}[{index}].name")),
            Some(Value::String(_)) => {}
            Some(_) => violations.invalid(format!("{field}[{index}].name"), "expected a string"),
        }
        match entry.get("status") {
            None => violations.missing(format!("{field}[{index}].status")),
            Some(Value::String(status)) => {
                if TestStatus::try_from(status.as_str()).is_err() {
                    violations.invalid(
                        format!("{field}[{index}].status"),
                        format!("expected 'passed' or 'failed', got '{status}'"),
                    );
                }
            }
            Some(_) => {
                violations.invalid(format!("{field}[{index}].status"), "expected a string");
            }
        }
        if let Some(message) = entry.get("message")
            && !message.is_string()
            && !message.is_null()
        {
            violations.invalid(format!("{field}[{index}].message"), "expected a string");
        }
    }
}
