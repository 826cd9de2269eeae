//! Template execution
//!
//! A parsed [`DocumentNode`](crate::nodes::DocumentNode) is rendered by
//! [`SmartScriptEngine`], which walks the tree with a per-render
//! [`Multistack`] of loop variables and evaluates echo tags as postfix
//! expressions over [`Value`]s. Functions (`@name`) come from a
//! [`FunctionRegistry`]; all output and parameter access go through the
//! [`RequestContext`].

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod multistack;
pub mod value;

pub use context::RequestContext;
pub use engine::{execute, SmartScriptEngine};
pub use error::{ExecutionError, ExecutionResult, MultistackError};
pub use functions::{format_decimal, standard_registry, BuiltinFunction, FunctionRegistry};
pub use multistack::Multistack;
pub use value::Value;
