//! Source locations: file identifiers and byte spans.
//!
//! A [`Span`] never outlives the [`SourceMap`] that owns the buffer it
//! points into; `Context` (see `context.rs`) is the only place that
//! constructs a `SourceMap`, and it keeps every buffer alive for as long
//! as the context lives (see spec §5, Resource policy).

use std::fmt;

/// Index into a [`SourceMap`]'s list of loaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

/// A byte range into the source buffer of `file`, set once at parse time
/// and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub file: FileId,
  pub start: u32,
  pub len: u32,
}

impl Span {
  pub fn new(file: FileId, start: u32, len: u32) -> Self {
    Span { file, start, len }
  }

  /// An empty span at `start`, used while a production is still
  /// accumulating its length.
  pub fn empty_at(file: FileId, start: u32) -> Self {
    Span { file, start, len: 0 }
  }

  pub fn end(&self) -> u32 {
    self.start + self.len
  }

  pub fn range(&self) -> std::ops::Range<usize> {
    self.start as usize..self.end() as usize
  }
}

/// Owns every source buffer and path loaded during a compilation.
///
/// Buffers are append-only: a `FileId` handed out by [`SourceMap::add`] is
/// valid for the remaining lifetime of the map.
#[derive(Debug, Default)]
pub struct SourceMap {
  paths: Vec<std::path::PathBuf>,
  // Each buffer carries a trailing NUL byte, matching the sentinel the
  // lexer uses to recognize end-of-input (spec §6).
  sources: Vec<Vec<u8>>,
}

impl SourceMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, path: std::path::PathBuf, mut contents: Vec<u8>) -> FileId {
    contents.push(0);
    let id = FileId(self.sources.len() as u32);
    self.paths.push(path);
    self.sources.push(contents);
    id
  }

  pub fn source(&self, file: FileId) -> &[u8] {
    &self.sources[file.0 as usize]
  }

  pub fn path(&self, file: FileId) -> &std::path::Path {
    &self.paths[file.0 as usize]
  }

  /// The textual slice a span refers to, excluding the trailing NUL.
  pub fn text(&self, span: Span) -> &str {
    let bytes = &self.source(span.file)[span.range()];
    std::str::from_utf8(bytes).expect("source buffers are ASCII/UTF-8 by construction")
  }

  /// 1-based line and column of `offset` within `file`, computed by
  /// scanning for newlines (spec §7, "User-visible behavior").
  pub fn line_col(&self, file: FileId, offset: u32) -> (u32, u32) {
    let src = self.source(file);
    let mut line = 1u32;
    let mut col = 1u32;
    for &b in &src[..offset as usize] {
      if b == b'\n' {
        line += 1;
        col = 1;
      } else {
        col += 1;
      }
    }
    (line, col)
  }
}

impl fmt::Display for FileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}
