//! Every error this crate can produce, grouped by the phase that raises
//! it (spec §7). There is no panic-based error path anywhere past the
//! lexer: each phase returns `Result`, and `Context`'s batch entry points
//! collect every error a phase can produce rather than stopping at the
//! first one (see `context.rs`).
//!
//! No `thiserror`/`anyhow` here: a closed enum with a manual `Display`
//! impl, in the style of a hand-rolled error type.

use std::fmt;
use std::path::PathBuf;

use crate::lexer::TokenKind;
use crate::span::Span;

/// What a parser production expected when it failed, mirroring the
/// production names `OoTagError` used in the original (`ERR_SID`,
/// `ERR_TYPE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseProduction {
  Sid,
  Id,
  MacroInv,
  Literal,
  Repeat,
  BinOp,
  AssignOp,
  Type,
  Summand,
  Pattern,
  Expr,
  Block,
  Meta,
  UseTree,
  Item,
  File,
}

impl fmt::Display for ParseProduction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use ParseProduction::*;
    f.write_str(match self {
      Sid => "an identifier",
      Id => "a path",
      MacroInv => "a macro invocation",
      Literal => "a literal",
      Repeat => "a repeat count",
      BinOp => "a binary operator",
      AssignOp => "an assignment operator",
      Type => "a type",
      Summand => "a sum type summand",
      Pattern => "a pattern",
      Expr => "an expression",
      Block => "a block",
      Meta => "an attribute",
      UseTree => "a use tree",
      Item => "an item",
      File => "a file",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
  pub production: ParseProduction,
  pub found: TokenKind,
  pub span: Span,
}

impl ParseError {
  pub fn new(production: ParseProduction, found: TokenKind, span: Span) -> Self {
    ParseError { production, found, span }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(msg) = self.found.error_message() {
      write!(f, "while parsing {}: {}", self.production, msg)
    } else {
      write!(f, "while parsing {}: unexpected token {:?}", self.production, self.found)
    }
  }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub enum FileError {
  NotFound { path: PathBuf, source: std::io::Error },
  NotUtf8 { path: PathBuf },
}

impl fmt::Display for FileError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FileError::NotFound { path, source } => {
        write!(f, "could not read {}: {}", path.display(), source)
      }
      FileError::NotUtf8 { path } => write!(f, "{} is not valid UTF-8", path.display()),
    }
  }
}

impl std::error::Error for FileError {}

/// Raised when a `mod::`/`dep::` path can't be resolved to a file, or
/// when the id rooting it isn't one of those two keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
  NotRootedInModOrDep { span: Span },
  EmptyPath { span: Span },
  /// A `magic::…` id that doesn't name one of the closed set of
  /// compiler intrinsics (spec §9, "How `magic::…` identifiers are
  /// resolved" - unimplemented in the original, resolved here).
  UnknownMagic { span: Span },
}

impl fmt::Display for ImportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImportError::NotRootedInModOrDep { .. } => {
        write!(f, "only paths rooted in `mod::` or `dep::` can be loaded as files")
      }
      ImportError::EmptyPath { .. } => write!(f, "a module path needs at least one segment"),
      ImportError::UnknownMagic { .. } => write!(f, "unknown `magic::` intrinsic"),
    }
  }
}

impl std::error::Error for ImportError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
  DuplicateId { sid: Span, first: Span },
  DuplicateField { sid: Span, first: Span },
  NotPublic { sid: Span, definition: Span },
  Unresolved { sid: Span },
}

impl fmt::Display for BindingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BindingError::DuplicateId { .. } => write!(f, "duplicate top-level identifier"),
      BindingError::DuplicateField { .. } => write!(f, "duplicate field name"),
      BindingError::NotPublic { .. } => write!(f, "item is not `pub` and can't be imported"),
      BindingError::Unresolved { .. } => write!(f, "unresolved identifier"),
    }
  }
}

impl std::error::Error for BindingError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindError {
  WrongNumberOfTypeArgs { span: Span, expected: usize, found: usize },
  HigherOrderTypeArg { span: Span },
  NamedTypeAppSid { span: Span, sid: Span },
  /// An id used as a type-level function head resolves to a binding
  /// that isn't type-shaped (a `val`/`fn`/`ffi_val`/`use`-imported
  /// module), or doesn't resolve at all.
  BindingNotType { span: Span },
}

impl fmt::Display for KindError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      KindError::WrongNumberOfTypeArgs { expected, found, .. } => {
        write!(f, "expected {expected} type argument(s), found {found}")
      }
      KindError::HigherOrderTypeArg { .. } => {
        write!(f, "a type-level function argument can't itself take type arguments")
      }
      KindError::NamedTypeAppSid { .. } => {
        write!(f, "a named type application can't be used as the applied name")
      }
      KindError::BindingNotType { .. } => {
        write!(f, "this id does not resolve to a type")
      }
    }
  }
}

impl std::error::Error for KindError {}

/// The union of every phase's error type, as returned from `Context`'s
/// top-level entry points.
#[derive(Debug)]
pub enum OoError {
  Parse(ParseError),
  File(FileError),
  Import(ImportError),
  Binding(BindingError),
  Kind(KindError),
}

impl fmt::Display for OoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OoError::Parse(e) => e.fmt(f),
      OoError::File(e) => e.fmt(f),
      OoError::Import(e) => e.fmt(f),
      OoError::Binding(e) => e.fmt(f),
      OoError::Kind(e) => e.fmt(f),
    }
  }
}

impl std::error::Error for OoError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      OoError::Parse(e) => Some(e),
      OoError::File(e) => Some(e),
      OoError::Import(e) => Some(e),
      OoError::Binding(e) => Some(e),
      OoError::Kind(e) => Some(e),
    }
  }
}

impl From<ParseError> for OoError {
  fn from(e: ParseError) -> Self {
    OoError::Parse(e)
  }
}

impl From<FileError> for OoError {
  fn from(e: FileError) -> Self {
    OoError::File(e)
  }
}

impl From<ImportError> for OoError {
  fn from(e: ImportError) -> Self {
    OoError::Import(e)
  }
}

impl From<BindingError> for OoError {
  fn from(e: BindingError) -> Self {
    OoError::Binding(e)
  }
}

impl From<KindError> for OoError {
  fn from(e: KindError) -> Self {
    OoError::Kind(e)
  }
}
