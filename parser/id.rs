use crate::ast::{Id, Literal, LiteralKind, MacroInv, RootKw, Sid};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
  pub fn parse_sid(&mut self) -> Result<Sid, ParseError> {
    self.expect(TokenKind::Id, ParseProduction::Sid)
  }

  /// Accepts `use`/`dep`/`mod`/`magic` in addition to a plain identifier,
  /// for the leaf of a `use` tree (`use mod::a;` imports the segment
  /// `mod` itself, not a path rooted by it).
  pub(super) fn parse_sid_or_use_kw(&mut self) -> Result<Sid, ParseError> {
    let t = self.peek();
    match t.kind {
      TokenKind::Id | TokenKind::Dep | TokenKind::Magic | TokenKind::KwMod => {
        let (_, span) = self.bump();
        Ok(span)
      }
      _ => Err(self.err_here(ParseProduction::Sid)),
    }
  }

  /// A possibly-qualified path: `mod::a::b`, `dep::pkg::item`, or a bare
  /// local `a::b`. `mod`/`dep`/`magic` may only root a path (spec §9,
  /// "Keyword segments in Id") - using one with no following `::segment`
  /// is an error, since the bare keyword isn't itself a valid
  /// identifier outside a `use` tree.
  pub fn parse_id(&mut self) -> Result<Id, ParseError> {
    let start = self.start();
    let t = self.peek();
    let root = match t.kind {
      TokenKind::KwMod => Some(RootKw::Mod),
      TokenKind::Dep => Some(RootKw::Dep),
      TokenKind::Magic => Some(RootKw::Magic),
      _ => None,
    };

    let mut sids = Vec::new();
    if let Some(_) = root {
      self.bump();
    } else {
      sids.push(self.parse_sid()?);
    }

    while self.peek().kind == TokenKind::Scope {
      self.bump();
      sids.push(self.parse_sid()?);
    }

    if root.is_some() && sids.is_empty() {
      return Err(ParseError::new(ParseProduction::Id, TokenKind::Scope, self.span_from(start)));
    }

    let span = self.span_from(start);
    Ok(match root {
      Some(kw) => Id::Rooted(kw, sids, span),
      None => Id::Local(sids, span),
    })
  }

  pub fn parse_macro_inv(&mut self) -> Result<MacroInv, ParseError> {
    let start = self.start();
    self.expect(TokenKind::Dollar, ParseProduction::MacroInv)?;
    let name = self.parse_sid()?;
    self.expect(TokenKind::LParen, ParseProduction::MacroInv)?;

    let args_start = self.pos;
    let mut nesting = 1usize;
    let mut args_end = args_start;
    loop {
      let t = self.peek();
      if t.kind.is_error() {
        return Err(self.err_here(ParseProduction::MacroInv));
      }
      if t.kind == TokenKind::End {
        return Err(self.err_here(ParseProduction::MacroInv));
      }
      let (t, _) = self.bump();
      if t.kind == TokenKind::LParen {
        nesting += 1;
      } else if t.kind == TokenKind::RParen {
        nesting -= 1;
        if nesting == 0 {
          args_end = self.pos - t.len;
          break;
        }
      }
    }

    let args = crate::span::Span::new(self.file, args_start, args_end - args_start);
    let span = self.span_from(start);
    Ok(MacroInv { span, name, args })
  }

  pub fn parse_literal(&mut self) -> Result<Literal, ParseError> {
    let (t, span) = self.bump();
    let kind = match t.kind {
      TokenKind::Int => LiteralKind::Int,
      TokenKind::Float => LiteralKind::Float,
      TokenKind::String => LiteralKind::String,
      _ => return Err(ParseError::new(ParseProduction::Literal, t.kind, span)),
    };
    Ok(Literal { span, kind })
  }
}
