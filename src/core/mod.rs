//! Core resolution logic: variable store, resolver, errors, vars files.

pub mod error;
pub mod parser;
pub mod policy;
pub mod resolver;
pub mod store;
pub mod types;

pub use error::{VarError, VarErrorKind, VarResult};
pub use policy::FailurePolicy;
pub use resolver::{Resolver, MAX_PASSES};
pub use store::Variables;
