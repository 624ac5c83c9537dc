//! Front-end for a small statically-typed systems language: lexing,
//! parsing to an abstract syntax graph, conditional-compilation
//! pruning, module loading, name binding, and kind checking.
//!
//! The pipeline runs leaf-first through [`Context`]: [`Context::load_all`]
//! reads and parses the entrypoint, [`Context::bind_all`] and
//! [`Context::resolve_uses`] build per-file binding tables, and
//! [`Context::kind_check_all`]/[`Context::coarse_types_all`] finish
//! semantic analysis. Full type checking, macro expansion, code
//! generation and the HTML renderer are out of scope here; [`sinks`]
//! declares the seams they plug into.

pub mod ast;
pub mod binding;
pub mod cc;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod sinks;
pub mod span;

pub use context::Context;
pub use diagnostics::Diagnostic;
pub use error::OoError;
