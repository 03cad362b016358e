//! SV-005: Variables file schema.
//!
//! A `vars.yaml` declares the initial name → value table a host loads before
//! resolving. Scalars of any YAML type are accepted and stringified on load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// vars.yaml
// ============================================================================

/// Root of a variables file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarsFile {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Variable definitions (order-preserving)
    #[serde(default)]
    pub variables: IndexMap<String, serde_yaml_ng::Value>,
}

impl VarsFile {
    /// Definitions as text pairs, in file order.
    pub fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.variables
            .iter()
            .map(|(k, v)| (k.clone(), yaml_value_to_string(v)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Render a scalar YAML value as variable text. Null becomes empty.
pub fn yaml_value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

/// True for values `yaml_value_to_string` renders meaningfully.
pub fn is_scalar(val: &serde_yaml_ng::Value) -> bool {
    matches!(
        val,
        serde_yaml_ng::Value::String(_)
            | serde_yaml_ng::Value::Number(_)
            | serde_yaml_ng::Value::Bool(_)
            | serde_yaml_ng::Value::Null
    )
}

// ============================================================================
// Tests
// ============================================================================
