//! Interfaces for the pipeline stages this crate hands off to, but
//! does not implement: the HTML renderer, full type checking/
//! inference, macro expansion, code generation and the CLI driver.
//! Declaring them as traits here - rather than leaving their existence
//! implicit - lets a downstream crate plug in a real implementation
//! against a stable seam, rather than folding every backend into this
//! one.

use crate::ast::{ExprId, File};
use crate::binding::Module;
use crate::kind::OoType;
use crate::span::SourceMap;

/// Renders a loaded, bound file to a static HTML page mirroring the
/// source tree (spec §6: "the external HTML renderer, which creates
/// `<out>/html/...`").
pub trait HtmlRenderer {
  fn render(&self, file: &File, module: &Module, map: &SourceMap) -> std::io::Result<()>;
}

/// Full type checking and inference over a kind-checked, coarse-typed
/// file - refining every [`OoType::Opaque`] this crate leaves behind
/// into a concrete type, and checking every expression against it.
pub trait TypeChecker {
  fn check(&self, file: &File, coarse: &[(usize, OoType)]) -> Result<(), Vec<String>>;
}

/// Expands a `$name(...)` macro invocation into replacement source
/// text, re-entering the parser on the result. The CC filter and
/// binding phases both walk past `MacroInv` nodes without expanding
/// them; that's this trait's job.
pub trait MacroExpander {
  fn expand(&self, name: &str, args: &str) -> Result<String, String>;
}

/// Lowers a fully checked, fully typed file to a target backend.
pub trait CodeGenerator {
  fn generate(&self, file: &File, map: &SourceMap, entry: ExprId) -> Result<Vec<u8>, String>;
}

/// The command-line entry point: argument parsing, driving the
/// `Context` phases in order, and dispatching to whichever of the
/// above a given invocation asked for.
pub trait CliDriver {
  fn run(&self, args: &[String]) -> i32;
}
