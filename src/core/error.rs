//! SV-001: Resolution error taxonomy.
//!
//! Every failure carries the pass history of the resolve call that raised it,
//! so the rendered message shows how expansion reached the failing state.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Category of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarErrorKind {
    /// Missing `}` or placeholder content that is neither a name nor a call.
    Syntax,
    /// Call to a name absent from the function table.
    UndefinedFunction,
    /// Reference to a name absent from the variable store.
    UndefinedVariable,
    /// Pass ceiling exceeded without reaching a fixed point.
    Recursion,
    /// `add` of a name that is already defined.
    Duplicate,
    /// A builtin function reported an error of its own.
    FunctionFailed,
}

impl VarErrorKind {
    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            Self::Syntax => 1,
            Self::UndefinedFunction => 2,
            Self::UndefinedVariable => 3,
            Self::Recursion => 4,
            Self::Duplicate => 5,
            Self::FunctionFailed => 6,
        }
    }
}

impl fmt::Display for VarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::UndefinedFunction => write!(f, "undefined_function"),
            Self::UndefinedVariable => write!(f, "undefined_variable"),
            Self::Recursion => write!(f, "recursion"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::FunctionFailed => write!(f, "function_failed"),
        }
    }
}

/// A resolution or definition failure with its pass history attached.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", render(.message, .history))]
pub struct VarError {
    pub kind: VarErrorKind,
    /// Headline, without the history listing.
    pub message: String,
    /// The text or name that triggered the failure.
    pub subject: String,
    /// Text states of the failing resolve call, oldest first.
    pub history: Vec<String>,
}

impl VarError {
    fn new(kind: VarErrorKind, message: String, subject: &str, history: &[String]) -> Self {
        Self {
            kind,
            message,
            subject: subject.to_string(),
            history: history.to_vec(),
        }
    }

    pub fn syntax(text: &str, reason: &str, history: &[String]) -> Self {
        Self::new(
            VarErrorKind::Syntax,
            format!("Syntax error ({}): {}", reason, text),
            text,
            history,
        )
    }

    pub fn undefined_function(name: &str, history: &[String]) -> Self {
        Self::new(
            VarErrorKind::UndefinedFunction,
            format!("undefined function: {}", name),
            name,
            history,
        )
    }

    pub fn undefined_variable(name: &str, history: &[String]) -> Self {
        Self::new(
            VarErrorKind::UndefinedVariable,
            format!("undefined variable: {}", name),
            name,
            history,
        )
    }

    pub fn recursion(history: &[String]) -> Self {
        let subject = history.first().map(String::as_str).unwrap_or_default();
        Self::new(
            VarErrorKind::Recursion,
            format!("Recursive stop after {} tries", history.len()),
            subject,
            history,
        )
    }

    /// Definition errors happen outside any resolve call, so the history is empty.
    pub fn duplicate(name: &str) -> Self {
        Self::new(
            VarErrorKind::Duplicate,
            format!("Duplicate variable: {}", name),
            name,
            &[],
        )
    }

    pub fn function_failed(name: &str, reason: &str, history: &[String]) -> Self {
        Self::new(
            VarErrorKind::FunctionFailed,
            format!("function {} failed: {}", name, reason),
            name,
            history,
        )
    }
}

/// Headline followed by `N) state` lines.
fn render(message: &str, history: &[String]) -> String {
    let mut lines = Vec::with_capacity(history.len() + 1);
    lines.push(message.to_string());
    for (n, state) in history.iter().enumerate() {
        lines.push(format!("{}) {}", n, state));
    }
    lines.join("\n")
}

pub type VarResult<T> = Result<T, VarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sv001_render_history() {
        let history = vec!["${A}".to_string(), "${B}".to_string()];
        let err = VarError::undefined_variable("B", &history);
        let rendered = err.to_string();
        assert_eq!(rendered, "undefined variable: B\n0) ${A}\n1) ${B}");
    }

    #[test]
    fn test_sv001_duplicate_has_no_history() {
        let err = VarError::duplicate("k");
        assert_eq!(err.kind, VarErrorKind::Duplicate);
        assert!(err.history.is_empty());
        assert_eq!(err.to_string(), "Duplicate variable: k");
    }

    #[test]
    fn test_sv001_codes_are_stable() {
        assert_eq!(VarErrorKind::Syntax.code(), 1);
        assert_eq!(VarErrorKind::UndefinedFunction.code(), 2);
        assert_eq!(VarErrorKind::UndefinedVariable.code(), 3);
        assert_eq!(VarErrorKind::Recursion.code(), 4);
        assert_eq!(VarErrorKind::Duplicate.code(), 5);
        assert_eq!(VarErrorKind::FunctionFailed.code(), 6);
    }

    #[test]
    fn test_sv001_recursion_subject_is_input() {
        let history: Vec<String> = (0..3).map(|i| format!("s{}", i)).collect();
        let err = VarError::recursion(&history);
        assert_eq!(err.subject, "s0");
        assert!(err.message.contains("3 tries"));
    }

    #[test]
    fn test_sv001_serialize_kind() {
        let err = VarError::syntax("x ${open", "unterminated placeholder", &["x ${open".to_string()]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "syntax");
        assert_eq!(json["history"][0], "x ${open");
    }
}
