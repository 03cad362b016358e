//! shvar: shell-like text variables.
//!
//! Resolves `${NAME}` and `${func(args)}` placeholders against a variable
//! table and a table of builtin functions, innermost placeholder first:
//!
//! ```
//! use shvar::Variables;
//!
//! let mut vars = Variables::new();
//! vars.add("OBJ_DIR", "build/obj").unwrap();
//! vars.add("name", "widget").unwrap();
//! let path = vars.resolve("${OBJ_DIR}/${str.upper(${name})}").unwrap();
//! assert_eq!(path, "build/obj/WIDGET");
//! ```

pub mod cli;
pub mod core;
pub mod functions;

pub use crate::core::{FailurePolicy, Resolver, VarError, VarErrorKind, VarResult, Variables};
pub use crate::functions::{builtins, FunctionTable};
