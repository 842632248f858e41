//! Input validation utilities
//!
//! Field validators return the message for the first rule a value breaks.
//! `ValidationErrors` gathers those messages per field so a request reports
//! every invalid field at once.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();
    if length < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if length > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Validate a person's full name
pub fn validate_full_name(full_name: &str) -> Result<(), String> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err("Full name is required".to_string());
    }

    let length = trimmed.chars().count();
    if !(2..=100).contains(&length) {
        return Err("Full name must be between 2 and 100 characters".to_string());
    }

    Ok(())
}

/// Require a non-blank text value; `label` names the field in the message
pub fn validate_required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }

    Ok(())
}

pub fn validate_latitude(latitude: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90".to_string());
    }

    Ok(())
}

pub fn validate_longitude(longitude: f64) -> Result<(), String> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180".to_string());
    }

    Ok(())
}

/// Field to message map of validation failures
///
/// Only the first failure recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a validator against `field`
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.add(field, message);
        }
        self
    }

    /// Record a failure against `field` unless one is already present
    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// `Ok` when nothing was recorded, otherwise the collected map
    pub fn into_result(self) -> Result<(), BTreeMap<String, String>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("traveller@example.com").is_ok());
        assert!(validate_email("first.last+bags@sub.example.org").is_ok());

        assert_eq!(validate_email("").unwrap_err(), "Email is required");
        assert_eq!(validate_email("no-at-sign").unwrap_err(), "Invalid email format");
        assert_eq!(validate_email("a@b").unwrap_err(), "Invalid email format");
    }

    #[test]
    fn test_password_rules_report_first_failure() {
        assert!(validate_password("Luggage#2024").is_ok());

        assert_eq!(
            validate_password("Ab1!").unwrap_err(),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            validate_password("luggage#2024").unwrap_err(),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_password("LUGGAGE#2024").unwrap_err(),
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            validate_password("Luggage#bags").unwrap_err(),
            "Password must contain at least one digit"
        );
        assert_eq!(
            validate_password("Luggage2024").unwrap_err(),
            "Password must contain at least one special character"
        );
        assert!(validate_password(&format!("Aa1!{}", "x".repeat(125))).is_err());
    }

    #[test]
    fn test_full_name_length() {
        assert!(validate_full_name("Jo").is_ok());
        assert!(validate_full_name("J").is_err());
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_coordinate_ranges_are_inclusive() {
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.5).is_err());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_errors_are_aggregated_per_field() {
        let mut errors = ValidationErrors::new();
        errors
            .check("email", validate_email("bad"))
            .check("password", validate_password("short"))
            .check("fullName", validate_full_name("Valid Name"))
            .add("email", "second message is ignored");

        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert!(errors.get("fullName").is_none());

        let map = errors.into_result().unwrap_err();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("password"));
    }

    #[test]
    fn test_empty_collector_is_ok() {
        let mut errors = ValidationErrors::new();
        errors.check("name", validate_required("Central Station", "Name"));
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }
}
