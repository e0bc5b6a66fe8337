//! Domain rules a merged deployment update must satisfy before it is stored.

use houston_core::DeploymentUpdate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

pub const MAX_LABEL_LENGTH: usize = 64;
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Variables the platform injects itself. Users may not shadow them.
pub const RESERVED_ENV_NAMES: &[&str] = &[
    "AIRFLOW__CORE__SQL_ALCHEMY_CONN",
    "AIRFLOW__CORE__FERNET_KEY",
    "AIRFLOW__CELERY__RESULT_BACKEND",
    "AIRFLOW__CELERY__BROKER_URL",
];

lazy_static! {
    static ref VERSION_REGEX: Regex =
        Regex::new(r"^\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?$").unwrap();
    static ref CONFIG_KEY_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_]+(\.[A-Za-z0-9_]+)*$").unwrap();
    static ref ENV_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Checks every rule and returns all violations at once.
pub fn validate_update(update: &DeploymentUpdate) -> Result<(), Vec<String>> {
    let mut violations = Vec::new();

    let label = update.label.trim();
    if label.is_empty() {
        violations.push("label must not be empty".to_string());
    } else if label.chars().count() > MAX_LABEL_LENGTH {
        violations.push(format!(
            "label must be at most {MAX_LABEL_LENGTH} characters"
        ));
    }

    if let Some(description) = &update.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            violations.push(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            ));
        }
    }

    if !VERSION_REGEX.is_match(&update.version) {
        violations.push(format!(
            "version '{}' is not a semantic version",
            update.version
        ));
    }

    let mut config_keys = HashSet::new();
    for entry in &update.config {
        if !CONFIG_KEY_REGEX.is_match(&entry.key) {
            violations.push(format!("config key '{}' is invalid", entry.key));
        } else if !config_keys.insert(entry.key.as_str()) {
            violations.push(format!("config key '{}' is duplicated", entry.key));
        }
    }

    // `workers` and `workers.replicas` would overwrite each other when rendered
    let mut sorted_keys: Vec<&str> = config_keys.into_iter().collect();
    sorted_keys.sort_unstable();
    for pair in sorted_keys.windows(2) {
        let (parent, child) = (pair[0], pair[1]);
        if child.starts_with(parent) && child[parent.len()..].starts_with('.') {
            violations.push(format!(
                "config key '{parent}' conflicts with nested key '{child}'"
            ));
        }
    }

    let mut env_names = HashSet::new();
    for variable in &update.env {
        if !ENV_NAME_REGEX.is_match(&variable.name) {
            violations.push(format!(
                "environment variable name '{}' is invalid",
                variable.name
            ));
        } else if RESERVED_ENV_NAMES.contains(&variable.name.as_str()) {
            violations.push(format!(
                "environment variable '{}' is reserved by the platform",
                variable.name
            ));
        } else if !env_names.insert(variable.name.as_str()) {
            violations.push(format!(
                "environment variable '{}' is duplicated",
                variable.name
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
