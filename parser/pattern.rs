use crate::ast::{Pattern, PatternId, PatternKind};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
  fn push_pattern(&mut self, span: crate::span::Span, kind: PatternKind) -> PatternId {
    PatternId(self.ast.patterns.push(Pattern { span, kind }))
  }

  pub fn parse_pattern(&mut self) -> Result<PatternId, ParseError> {
    let start = self.start();
    let t = self.peek();

    match t.kind {
      TokenKind::Underscore => {
        self.bump();
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::Blank))
      }
      TokenKind::Mut | TokenKind::Id => {
        let is_mut = if t.kind == TokenKind::Mut {
          self.bump();
          true
        } else {
          false
        };
        let sid = self.parse_sid()?;
        let ty = if self.peek().kind == TokenKind::Colon {
          self.bump();
          Some(self.parse_type()?)
        } else {
          None
        };
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::Id { is_mut, sid, ty }))
      }
      TokenKind::Int | TokenKind::Float | TokenKind::String => {
        let lit = self.parse_literal()?;
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::Literal(lit)))
      }
      TokenKind::At => {
        self.bump();
        let inner = self.parse_pattern()?;
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::Ptr(inner)))
      }
      TokenKind::LParen => {
        self.bump();
        if self.peek().kind == TokenKind::RParen {
          self.bump();
          let span = self.span_from(start);
          return Ok(self.push_pattern(span, PatternKind::ProductAnon(Vec::new())));
        }

        let t2 = self.peek();
        if t2.kind == TokenKind::Id && self.peek2(t2).kind == TokenKind::Eq {
          let named = self.parse_named_pattern_list()?;
          self.expect(TokenKind::RParen, ParseProduction::Pattern)?;
          let span = self.span_from(start);
          return Ok(self.push_pattern(span, PatternKind::ProductNamed(named)));
        }

        let mut inners = vec![self.parse_pattern()?];
        while self.peek().kind == TokenKind::Comma {
          self.bump();
          inners.push(self.parse_pattern()?);
        }
        self.expect(TokenKind::RParen, ParseProduction::Pattern)?;
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::ProductAnon(inners)))
      }
      TokenKind::Pipe => {
        self.bump();
        let id = self.parse_id()?;

        if self.peek().kind != TokenKind::LParen {
          let span = self.span_from(start);
          return Ok(self.push_pattern(span, PatternKind::SummandAnon(id, Vec::new())));
        }
        self.bump();

        let t2 = self.peek();
        if t2.kind == TokenKind::Id && self.peek2(t2).kind == TokenKind::Eq {
          let named = self.parse_named_pattern_list()?;
          self.expect(TokenKind::RParen, ParseProduction::Pattern)?;
          let span = self.span_from(start);
          return Ok(self.push_pattern(span, PatternKind::SummandNamed(id, named)));
        }

        let mut fields = vec![self.parse_pattern()?];
        while self.peek().kind == TokenKind::Comma {
          self.bump();
          fields.push(self.parse_pattern()?);
        }
        self.expect(TokenKind::RParen, ParseProduction::Pattern)?;
        let span = self.span_from(start);
        Ok(self.push_pattern(span, PatternKind::SummandAnon(id, fields)))
      }
      _ => Err(self.err_here(ParseProduction::Pattern)),
    }
  }

  fn parse_named_pattern_list(&mut self) -> Result<Vec<(crate::ast::Sid, PatternId)>, ParseError> {
    let mut sids = vec![self.parse_sid()?];
    self.expect(TokenKind::Eq, ParseProduction::Pattern)?;
    let mut pats = vec![self.parse_pattern()?];
    while self.peek().kind == TokenKind::Comma {
      self.bump();
      sids.push(self.parse_sid()?);
      self.expect(TokenKind::Eq, ParseProduction::Pattern)?;
      pats.push(self.parse_pattern()?);
    }
    Ok(sids.into_iter().zip(pats).collect())
  }
}
