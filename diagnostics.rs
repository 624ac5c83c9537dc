//! Turning an [`OoError`] into something printable (spec §7,
//! "User-visible behavior"): line/column are computed on demand from
//! the offending span by scanning the owning source buffer, never
//! stored on the error itself.

use crate::error::{BindingError, FileError, ImportError, KindError, OoError, ParseError};
use crate::span::{SourceMap, Span};

/// An error paired with the source location the embedder should point
/// at. `Context`'s batch entry points return bare `OoError`s; wrapping
/// them in a `Diagnostic` is the embedder's job, done once it has a
/// `SourceMap` in hand to resolve line/column from.
pub struct Diagnostic<'a> {
  pub error: &'a OoError,
  pub span: Option<Span>,
}

impl<'a> Diagnostic<'a> {
  pub fn new(error: &'a OoError) -> Self {
    Diagnostic { error, span: span_of(error) }
  }

  /// `file:line:col: message`, or just `message` for errors that carry
  /// no span (a bare file-system failure has no position in a source
  /// buffer to point at).
  pub fn render(&self, map: &SourceMap) -> String {
    match self.span {
      Some(span) => {
        let (line, col) = map.line_col(span.file, span.start);
        format!("{}:{}:{}: {}", map.path(span.file).display(), line, col, self.error)
      }
      None => self.error.to_string(),
    }
  }
}

impl<'a> std::fmt::Display for Diagnostic<'a> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.error)
  }
}

fn span_of(error: &OoError) -> Option<Span> {
  match error {
    OoError::Parse(ParseError { span, .. }) => Some(*span),
    OoError::File(FileError::NotFound { .. } | FileError::NotUtf8 { .. }) => None,
    OoError::Import(
      ImportError::NotRootedInModOrDep { span }
      | ImportError::EmptyPath { span }
      | ImportError::UnknownMagic { span },
    ) => Some(*span),
    OoError::Binding(
      BindingError::DuplicateId { sid, .. }
      | BindingError::DuplicateField { sid, .. }
      | BindingError::NotPublic { sid, .. }
      | BindingError::Unresolved { sid },
    ) => Some(*sid),
    OoError::Kind(
      KindError::WrongNumberOfTypeArgs { span, .. }
      | KindError::HigherOrderTypeArg { span }
      | KindError::NamedTypeAppSid { span, .. }
      | KindError::BindingNotType { span },
    ) => Some(*span),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_file_and_position_for_a_spanned_error() {
    let mut map = SourceMap::new();
    let file = map.add("a.oo".into(), b"type a = I32\ntype a = I64\n".to_vec());
    let err = OoError::Binding(BindingError::DuplicateId {
      sid: Span::new(file, 18, 1),
      first: Span::new(file, 5, 1),
    });
    let rendered = Diagnostic::new(&err).render(&map);
    assert!(rendered.starts_with("a.oo:2:6:"), "got {rendered:?}");
  }

  #[test]
  fn file_errors_have_no_span() {
    let err = OoError::File(FileError::NotUtf8 { path: "bad.oo".into() });
    assert!(Diagnostic::new(&err).span.is_none());
  }
}
