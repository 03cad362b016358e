//! SV-003: Placeholder resolution.
//!
//! Expands `${NAME}` and `${name(args)}` one placeholder per pass, always
//! taking the innermost (last-opened) placeholder first, until a pass finds
//! nothing left to expand. Every intermediate text state is recorded so
//! errors can show how expansion arrived at the failure.

use super::error::{VarError, VarResult};
use super::store::Variables;
use crate::functions::FunctionTable;
use regex::Regex;
use std::sync::LazyLock;

/// Pass ceiling: history longer than this is reported as recursion.
pub const MAX_PASSES: usize = 20;

const OPEN: &str = "${";
const CLOSE: char = '}';

static BASIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
});

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<fname>[A-Za-z_][A-Za-z0-9_.]*)\((?P<params>.*)\)$")
        .expect("valid function call regex")
});

/// True if `name` can be referenced as `${name}`.
pub fn is_identifier(name: &str) -> bool {
    BASIC_NAME.is_match(name)
}

/// Split call arguments on every comma. No quoting: an argument cannot
/// contain a literal comma. Empty text means no arguments.
pub fn split_params(params: &str) -> Vec<String> {
    if params.is_empty() {
        return Vec::new();
    }
    params.split(',').map(str::to_string).collect()
}

/// What a placeholder's content turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder<'t> {
    Variable(&'t str),
    Call { name: &'t str, params: &'t str },
}

impl<'t> Placeholder<'t> {
    /// Classify trimmed placeholder content. `None` means neither form matched.
    pub fn classify(content: &'t str) -> Option<Self> {
        if is_identifier(content) {
            return Some(Self::Variable(content));
        }
        let caps = FUNCTION_CALL.captures(content)?;
        let name = caps.name("fname")?.as_str();
        let params = caps.name("params")?.as_str();
        Some(Self::Call { name, params })
    }

    /// Short label used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Variable(_) => "variable",
            Self::Call { .. } => "call",
        }
    }
}

/// Per-call expansion engine. Reads the store and function table, never writes.
#[derive(Debug)]
pub struct Resolver<'a> {
    vars: &'a Variables,
    functions: &'a FunctionTable,
    history: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(vars: &'a Variables, functions: &'a FunctionTable) -> Self {
        Self {
            vars,
            functions,
            history: Vec::new(),
        }
    }

    /// Text states seen so far, starting with the input.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Run passes until one makes no progress.
    pub fn resolve(&mut self, text: &str) -> VarResult<String> {
        tracing::debug!(input = text, "resolve");
        self.history.clear();
        self.history.push(text.to_string());

        let mut current = text.to_string();
        loop {
            let (progress, next) = self.do_pass(&current)?;
            if !progress {
                tracing::debug!(output = next.as_str(), passes = self.history.len(), "resolved");
                return Ok(next);
            }
            current = next;
        }
    }

    /// Expand exactly one placeholder. Returns `(false, text)` when none remain.
    pub fn do_pass(&mut self, text: &str) -> VarResult<(bool, String)> {
        if self.history.is_empty() {
            self.history.push(text.to_string());
        }
        if self.history.len() > MAX_PASSES {
            return Err(VarError::recursion(&self.history));
        }

        // The last opener is the innermost: nothing after it opens another.
        let Some(open) = text.rfind(OPEN) else {
            return Ok((false, text.to_string()));
        };
        let Some(close) = text[open..].find(CLOSE).map(|i| open + i) else {
            return Err(VarError::syntax(
                text,
                "unterminated placeholder",
                &self.history,
            ));
        };

        let lhs = &text[..open];
        let content = text[open + OPEN.len()..close].trim();
        let rhs = &text[close + 1..];

        let Some(placeholder) = Placeholder::classify(content) else {
            return Err(VarError::syntax(
                text,
                "unrecognized placeholder content",
                &self.history,
            ));
        };
        tracing::trace!(
            pass = self.history.len(),
            kind = placeholder.kind(),
            content,
            "expanding placeholder"
        );

        let value = match placeholder {
            Placeholder::Variable(name) => self.lookup_variable(name)?,
            Placeholder::Call { name, params } => self.call_function(name, params)?,
        };

        let result = format!("{}{}{}", lhs, value, rhs);
        self.history.push(result.clone());
        Ok((true, result))
    }

    fn lookup_variable(&self, name: &str) -> VarResult<String> {
        self.vars
            .lookup(name)
            .map(str::to_string)
            .ok_or_else(|| VarError::undefined_variable(name, &self.history))
    }

    fn call_function(&self, name: &str, params: &str) -> VarResult<String> {
        let entry = self
            .functions
            .get(name)
            .ok_or_else(|| VarError::undefined_function(name, &self.history))?;
        let args = split_params(params);
        tracing::trace!(function = name, argc = args.len(), "calling function");
        entry
            .call(&args)
            .map(|value| value.to_string())
            .map_err(|e| VarError::function_failed(name, &e.to_string(), &self.history))
    }
}
