//! SV-010: Function table: the callables reachable from `${name(args)}`.
//!
//! A table maps a dotted name to an arity descriptor and a callable. The
//! descriptor is informational; each callable checks its own arguments.
//! `builtins()` is the process-wide read-only catalog. Tests and embedders
//! can build their own table and hand it to the resolver instead.

pub mod path;
pub mod stat;
pub mod string;

use indexmap::IndexMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Value returned by a callable, stringified before splicing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(n) => write!(f, "{}", n),
            // Whole floats keep their decimal point: 3.0, not 3
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// Expected argument shape of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Single,
    Pair,
    SeparatorAndList,
    Variadic,
}

impl Arity {
    /// Compact descriptor: `""`, `"s"`, `"s,s"`, `"s,l"`, `"*"`.
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Single => "s",
            Self::Pair => "s,s",
            Self::SeparatorAndList => "s,l",
            Self::Variadic => "*",
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Single => write!(f, "single value"),
            Self::Pair => write!(f, "two values"),
            Self::SeparatorAndList => write!(f, "separator and list"),
            Self::Variadic => write!(f, "variadic"),
        }
    }
}

/// Host-level failure reported by a callable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("expected {expected} argument(s), got {got}")]
    Arguments { expected: String, got: usize },

    #[error("invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("{path}: {reason}")]
    Io { path: String, reason: String },
}

impl FunctionError {
    pub fn io(path: &str, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type FunctionResult = Result<Value, FunctionError>;

/// Boxed callable stored in a table entry.
pub type Callable = Box<dyn Fn(&[String]) -> FunctionResult + Send + Sync>;

/// Check that `args.len()` lies in `min..=max`.
pub fn check_args(args: &[String], min: usize, max: usize) -> Result<(), FunctionError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(FunctionError::Arguments {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// One registered function.
pub struct FunctionEntry {
    pub arity: Arity,
    callable: Callable,
}

impl FunctionEntry {
    pub fn call(&self, args: &[String]) -> FunctionResult {
        (self.callable)(args)
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Name → function registry. Immutable once handed to a resolver.
#[derive(Debug, Default)]
pub struct FunctionTable {
    entries: IndexMap<String, FunctionEntry>,
}

impl FunctionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table populated with the builtin catalog.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        string::register(&mut table);
        path::register(&mut table);
        stat::register(&mut table);
        table
    }

    /// Register (or overwrite) a function.
    pub fn register<F>(&mut self, name: &str, arity: Arity, callable: F)
    where
        F: Fn(&[String]) -> FunctionResult + Send + Sync + 'static,
    {
        self.entries.insert(
            name.to_string(),
            FunctionEntry {
                arity,
                callable: Box::new(callable),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static BUILTINS: LazyLock<FunctionTable> = LazyLock::new(FunctionTable::builtin);

/// The process-wide builtin table.
pub fn builtins() -> &'static FunctionTable {
    &BUILTINS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sv010_value_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Int(-1).to_string(), "-1");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(1.25).to_string(), "1.25");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_sv010_register_and_call() {
        let mut table = FunctionTable::new();
        table.register("t.count", Arity::Variadic, |args| {
            Ok(Value::Int(args.len() as i64))
        });
        let entry = table.get("t.count").unwrap();
        assert_eq!(entry.arity, Arity::Variadic);
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(entry.call(&args).unwrap(), Value::Int(2));
        assert!(table.get("t.missing").is_none());
    }

    #[test]
    fn test_sv010_builtin_catalog() {
        let table = builtins();
        for name in [
            "str.upper",
            "str.lower",
            "str.join",
            "len",
            "os.getcwd",
            "cwd",
            "os.path.join",
            "os.path.realpath",
            "pathtool.extension",
            "stat.st_mtime",
            "stat.st_size",
        ] {
            assert!(table.contains(name), "missing builtin {}", name);
        }
        assert_eq!(table.get("os.getcwd").unwrap().arity, Arity::None);
        assert_eq!(table.get("str.join").unwrap().arity.descriptor(), "s,l");
    }

    #[test]
    fn test_sv010_check_args() {
        let one = vec!["a".to_string()];
        assert!(check_args(&one, 1, 1).is_ok());
        let err = check_args(&one, 2, 2).unwrap_err();
        assert_eq!(err.to_string(), "expected 2 argument(s), got 1");
        let err = check_args(&[], 1, usize::MAX).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
        let err = check_args(&one, 2, 3).unwrap_err();
        assert!(err.to_string().contains("2 to 3"));
    }

    #[test]
    fn test_sv010_arity_descriptor() {
        assert_eq!(Arity::None.descriptor(), "");
        assert_eq!(Arity::Pair.descriptor(), "s,s");
        assert_eq!(Arity::Variadic.descriptor(), "*");
        assert_eq!(Arity::Single.to_string(), "single value");
    }
}
