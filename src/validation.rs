//! Declarative field schemas and the pure validators run by each manager before storage is touched.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

pub type Payload = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl FieldRule {
    const fn new(field: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            field,
            kind,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }
}

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const ID_PATTERN: &str = r"^[A-Za-z0-9_-]{1,64}$";

pub const CREATE_SCHOOL: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).required().length(1, 200),
    FieldRule::new("address", FieldKind::String).required().length(1, 500),
];

pub const UPDATE_SCHOOL: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).length(0, 200),
    FieldRule::new("address", FieldKind::String).length(0, 500),
];

pub const CREATE_CLASSROOM: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).required().length(1, 200),
    FieldRule::new("capacity", FieldKind::Integer).range(0.0, 10_000.0),
    FieldRule::new("school", FieldKind::String).required().pattern(ID_PATTERN),
];

pub const UPDATE_CLASSROOM: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).length(0, 200),
    FieldRule::new("capacity", FieldKind::Integer).range(0.0, 10_000.0),
];

pub const CREATE_STUDENT: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).required().length(1, 200),
    FieldRule::new("age", FieldKind::Integer).required().range(0.0, 150.0),
    FieldRule::new("classroom", FieldKind::String).required().pattern(ID_PATTERN),
];

pub const UPDATE_STUDENT: &[FieldRule] = &[
    FieldRule::new("name", FieldKind::String).length(0, 200),
    FieldRule::new("age", FieldKind::Integer).range(0.0, 150.0),
];

pub const CREATE_USER: &[FieldRule] = &[
    FieldRule::new("username", FieldKind::String).required().length(3, 50),
    FieldRule::new("email", FieldKind::String).pattern(EMAIL_PATTERN),
    FieldRule::new("password", FieldKind::String).length(0, 200),
];

pub const LOGIN: &[FieldRule] = &[
    FieldRule::new("email", FieldKind::String).required(),
    FieldRule::new("password", FieldKind::String).required(),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Structured validation failure. Serializes as the list of field errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport(pub Vec<FieldError>);

impl ValidationReport {
    pub fn single(path: &str, message: impl Into<String>) -> Self {
        ValidationReport(vec![FieldError::new(path, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check every rule; required fields must be present and non-null.
pub fn validate(payload: &Payload, rules: &[FieldRule]) -> Option<ValidationReport> {
    let mut report = ValidationReport::default();
    for rule in rules {
        match payload.get(rule.field) {
            None | Some(Value::Null) => {
                if rule.required {
                    report.0.push(FieldError::new(rule.field, format!("{} is required", rule.field)));
                }
            }
            Some(v) => {
                if let Err(e) = validate_field(rule, v) {
                    report.0.push(e);
                }
            }
        }
    }
    finish(report)
}

/// Check only the fields present in the payload (partial updates). Required is not enforced.
pub fn validate_partial(payload: &Payload, rules: &[FieldRule]) -> Option<ValidationReport> {
    let mut report = ValidationReport::default();
    for rule in rules {
        if let Some(v) = payload.get(rule.field) {
            if v.is_null() {
                continue;
            }
            if let Err(e) = validate_field(rule, v) {
                report.0.push(e);
            }
        }
    }
    finish(report)
}

fn finish(report: ValidationReport) -> Option<ValidationReport> {
    if report.is_empty() {
        None
    } else {
        Some(report)
    }
}

fn validate_field(rule: &FieldRule, v: &Value) -> Result<(), FieldError> {
    let col = rule.field;
    match rule.kind {
        FieldKind::String if !v.is_string() => {
            return Err(FieldError::new(col, format!("{} must be a string", col)));
        }
        FieldKind::Integer if !(v.is_i64() || v.is_u64()) => {
            return Err(FieldError::new(col, format!("{} must be an integer", col)));
        }
        _ => {}
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max {
                return Err(FieldError::new(col, format!("{} must be at most {} characters", col, max)));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min {
                return Err(FieldError::new(col, format!("{} must be at least {} characters", col, min)));
            }
        }
        if let Some(pattern) = rule.pattern {
            let re = Regex::new(pattern).map_err(|_| FieldError::new(col, format!("invalid pattern for {}", col)))?;
            if !re.is_match(s) {
                return Err(FieldError::new(col, format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(FieldError::new(col, format!("{} must be at least {}", col, min)));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(FieldError::new(col, format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}
