//! SV-006: Variables file parsing, validation and loading.
//!
//! Validates structural constraints:
//! - Version must be "1.0"
//! - Every name must be referenceable as `${name}`
//! - Values must be scalars

use super::error::VarResult;
use super::resolver::is_identifier;
use super::store::Variables;
use super::types::*;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a vars.yaml file from disk.
pub fn parse_vars_file(path: &Path) -> Result<VarsFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_vars(&content)
}

/// Parse a vars.yaml from a string.
pub fn parse_vars(yaml: &str) -> Result<VarsFile, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed file. Returns a list of errors (empty = valid).
pub fn validate_vars(file: &VarsFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if file.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", file.version),
        });
    }

    for (name, value) in &file.variables {
        if !is_identifier(name) {
            errors.push(ValidationError {
                message: format!("variable '{}' is not a valid identifier", name),
            });
        }
        if !is_scalar(value) {
            errors.push(ValidationError {
                message: format!("variable '{}' must be a scalar value", name),
            });
        }
    }

    errors
}

/// Bulk-import a file's definitions. Fails fast on the first duplicate.
pub fn load_into(file: &VarsFile, vars: &mut Variables) -> VarResult<()> {
    tracing::debug!(count = file.variables.len(), "loading variables");
    vars.add_all(file.pairs())
}
