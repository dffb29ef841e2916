//! Request validation: field-level rules collected into a field -> message
//! map, surfaced as a 400 with the standard validation envelope before the
//! handler runs.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::ApiError;

/// Request payloads implement this to declare their field rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: HashMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.errors
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_error("Validation failed", Some(errors.into_map()))
    }
}

/// Accumulates rule failures per field. The first failing rule wins so the
/// client sees one message per field.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "This field is required");
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(field, format!("Must be at least {} characters", min));
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("Must be at most {} characters", max));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let valid = value.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        });
        if !valid {
            self.push(field, "Must be a valid email address");
        }
    }

    pub fn range_i64(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(field, format!("Must be between {} and {}", min, max));
        }
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) {
        if !allowed.contains(&value) {
            self.push(field, format!("Must be one of: {}", allowed.join(", ")));
        }
    }

    /// Accepts 24h wall clock times in "HH:MM" form.
    pub fn time(&mut self, field: &str, value: &str) {
        if parse_time(value).is_none() {
            self.push(field, "Must be a time in HH:MM format");
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors: self.errors })
        }
    }
}

pub fn parse_time(value: &str) -> Option<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// JSON extractor that runs `Validate::validate` before the handler sees the
/// payload. Malformed JSON and rule failures both reject with 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_json(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.require("name", "");
        errors.min_len("name", "", 2);
        let map = errors.into_result().unwrap_err().into_map();
        assert_eq!(map["name"], "This field is required");
    }

    #[test]
    fn email_rule_accepts_and_rejects() {
        let mut ok = FieldErrors::new();
        ok.email("email", "student@example.com");
        assert!(ok.into_result().is_ok());

        for bad in ["", "no-at-sign", "a@b", "a b@c.com", "x@.com"] {
            let mut errors = FieldErrors::new();
            errors.email("email", bad);
            assert!(errors.into_result().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn time_rule_requires_hh_mm() {
        let mut ok = FieldErrors::new();
        ok.time("start_time", "09:30");
        assert!(ok.into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.time("start_time", "25:00");
        errors.time("end_time", "0930");
        let map = errors.into_result().unwrap_err().into_map();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn range_and_one_of() {
        let mut errors = FieldErrors::new();
        errors.range_i64("rating", 6, 1, 5);
        errors.one_of("as", "owner", &["student", "teacher"]);
        let map = errors.into_result().unwrap_err().into_map();
        assert!(map.contains_key("rating"));
        assert!(map.contains_key("as"));
    }
}
