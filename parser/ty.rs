use crate::ast::{BinOp, Repeat, RepeatKind, Summand, SummandKind, Type, TypeId, TypeKind};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
  fn push_type(&mut self, span: crate::span::Span, kind: TypeKind) -> TypeId {
    TypeId(self.ast.types.push(Type { span, kind }))
  }

  pub fn parse_type(&mut self) -> Result<TypeId, ParseError> {
    let start = self.start();
    let t = self.peek();

    match t.kind {
      TokenKind::Id | TokenKind::KwMod | TokenKind::Dep | TokenKind::Magic => {
        let id = self.parse_id()?;
        if self.peek().kind == TokenKind::LAngle {
          self.bump();
          if let Some((sids, tys)) = self.try_parse_named_type_list(TokenKind::RAngle)? {
            self.expect(TokenKind::RAngle, ParseProduction::Type)?;
            let span = self.span_from(start);
            return Ok(self.push_type(span, TypeKind::AppNamed(id, sids.into_iter().zip(tys).collect())));
          }
          let mut args = vec![self.parse_type()?];
          while self.peek().kind == TokenKind::Comma {
            self.bump();
            args.push(self.parse_type()?);
          }
          self.expect(TokenKind::RAngle, ParseProduction::Type)?;
          let span = self.span_from(start);
          Ok(self.push_type(span, TypeKind::AppAnon(id, args)))
        } else {
          let span = self.span_from(start);
          Ok(self.push_type(span, TypeKind::Id(id)))
        }
      }
      TokenKind::Dollar => {
        let m = self.parse_macro_inv()?;
        let span = self.span_from(start);
        Ok(self.push_type(span, TypeKind::Macro(m)))
      }
      TokenKind::At => {
        self.bump();
        let inner = self.parse_type()?;
        let span = self.span_from(start);
        Ok(self.push_type(span, TypeKind::Ptr(inner)))
      }
      TokenKind::Tilde => {
        self.bump();
        let inner = self.parse_type()?;
        let span = self.span_from(start);
        Ok(self.push_type(span, TypeKind::PtrMut(inner)))
      }
      TokenKind::LBracket => {
        self.bump();
        let inner = self.parse_type()?;
        self.expect(TokenKind::RBracket, ParseProduction::Type)?;
        let span = self.span_from(start);
        Ok(self.push_type(span, TypeKind::Array(inner)))
      }
      TokenKind::LAngle => {
        self.bump();
        let mut args = vec![self.parse_sid()?];
        while self.peek().kind == TokenKind::Comma {
          self.bump();
          args.push(self.parse_sid()?);
        }
        self.expect(TokenKind::RAngle, ParseProduction::Type)?;
        self.expect(TokenKind::FatArrow, ParseProduction::Type)?;
        let inner = self.parse_type()?;
        let span = self.span_from(start);
        Ok(self.push_type(span, TypeKind::Generic(args, inner)))
      }
      TokenKind::LParen => self.parse_type_paren(start),
      TokenKind::Pub | TokenKind::Pipe => self.parse_type_sum(start),
      _ => Err(self.err_here(ParseProduction::Type)),
    }
  }

  /// Tries the `id = type (, id = type)*` named-list lookahead shared by
  /// type applications, products, and function signatures. Returns
  /// `None` (consuming nothing) if the next tokens don't match that
  /// shape, so the caller can fall back to the anonymous-list parse.
  fn try_parse_named_type_list(
    &mut self,
    _close: TokenKind,
  ) -> Result<Option<(Vec<crate::ast::Sid>, Vec<TypeId>)>, ParseError> {
    let t = self.peek();
    if t.kind != TokenKind::Id || self.peek2(t).kind != TokenKind::Eq {
      return Ok(None);
    }

    let mut sids = vec![self.parse_sid()?];
    self.expect(TokenKind::Eq, ParseProduction::Type)?;
    let mut types = vec![self.parse_type()?];

    while self.peek().kind == TokenKind::Comma {
      self.bump();
      sids.push(self.parse_sid()?);
      self.expect(TokenKind::Eq, ParseProduction::Type)?;
      types.push(self.parse_type()?);
    }

    Ok(Some((sids, types)))
  }

  fn parse_type_paren(&mut self, start: u32) -> Result<TypeId, ParseError> {
    self.bump(); // LParen

    if self.peek().kind == TokenKind::RParen {
      self.bump();
      if self.peek().kind == TokenKind::Arrow {
        self.bump();
        let ret = self.parse_type()?;
        let span = self.span_from(start);
        return Ok(self.push_type(span, TypeKind::FunAnon(Vec::new(), ret)));
      }
      let span = self.span_from(start);
      return Ok(self.push_type(span, TypeKind::ProductAnon(Vec::new())));
    }

    let t = self.peek();
    if t.kind == TokenKind::Id && self.peek2(t).kind == TokenKind::Colon {
      let mut sids = vec![self.parse_sid()?];
      self.expect(TokenKind::Colon, ParseProduction::Type)?;
      let mut types = vec![self.parse_type()?];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        sids.push(self.parse_sid()?);
        self.expect(TokenKind::Colon, ParseProduction::Type)?;
        types.push(self.parse_type()?);
      }
      self.expect(TokenKind::RParen, ParseProduction::Type)?;
      let named: Vec<_> = sids.into_iter().zip(types).collect();
      if self.peek().kind == TokenKind::Arrow {
        self.bump();
        let ret = self.parse_type()?;
        let span = self.span_from(start);
        return Ok(self.push_type(span, TypeKind::FunNamed(named, ret)));
      }
      let span = self.span_from(start);
      return Ok(self.push_type(span, TypeKind::ProductNamed(named)));
    }

    let mut inners = vec![self.parse_type()?];
    if self.peek().kind == TokenKind::Semi {
      self.bump();
      let repeat = self.parse_repeat()?;
      self.expect(TokenKind::RParen, ParseProduction::Type)?;
      let inner = inners.remove(0);
      let span = self.span_from(start);
      return Ok(self.push_type(span, TypeKind::ProductRepeated(inner, repeat)));
    }

    while self.peek().kind == TokenKind::Comma {
      self.bump();
      inners.push(self.parse_type()?);
    }
    self.expect(TokenKind::RParen, ParseProduction::Type)?;

    if self.peek().kind == TokenKind::Arrow {
      self.bump();
      let ret = self.parse_type()?;
      let span = self.span_from(start);
      return Ok(self.push_type(span, TypeKind::FunAnon(inners, ret)));
    }
    let span = self.span_from(start);
    Ok(self.push_type(span, TypeKind::ProductAnon(inners)))
  }

  fn parse_type_sum(&mut self, start: u32) -> Result<TypeId, ParseError> {
    let is_pub = if self.peek().kind == TokenKind::Pub {
      self.bump();
      self.expect(TokenKind::Pipe, ParseProduction::Type)?;
      true
    } else {
      false
    };

    let mut summands = vec![self.parse_summand()?];
    while self.peek().kind == TokenKind::Pipe {
      summands.push(self.parse_summand()?);
    }

    let span = self.span_from(start);
    Ok(self.push_type(span, TypeKind::Sum { is_pub, summands }))
  }

  pub fn parse_summand(&mut self) -> Result<Summand, ParseError> {
    let start = self.start();
    self.expect(TokenKind::Pipe, ParseProduction::Summand)?;
    let sid = self.parse_sid()?;

    if self.peek().kind != TokenKind::LParen {
      let span = self.span_from(start);
      return Ok(Summand { span, sid, kind: SummandKind::Anon(Vec::new()) });
    }
    self.bump();

    let t = self.peek();
    if t.kind == TokenKind::Id && self.peek2(t).kind == TokenKind::Colon {
      let mut sids = vec![self.parse_sid()?];
      self.expect(TokenKind::Colon, ParseProduction::Summand)?;
      let mut types = vec![self.parse_type()?];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        sids.push(self.parse_sid()?);
        self.expect(TokenKind::Colon, ParseProduction::Summand)?;
        types.push(self.parse_type()?);
      }
      self.expect(TokenKind::RParen, ParseProduction::Summand)?;
      let span = self.span_from(start);
      return Ok(Summand { span, sid, kind: SummandKind::Named(sids.into_iter().zip(types).collect()) });
    }

    let mut inners = vec![self.parse_type()?];
    while self.peek().kind == TokenKind::Comma {
      self.bump();
      inners.push(self.parse_type()?);
    }
    self.expect(TokenKind::RParen, ParseProduction::Summand)?;
    let span = self.span_from(start);
    Ok(Summand { span, sid, kind: SummandKind::Anon(inners) })
  }

  fn parse_size_of_or_align_of(&mut self, kw: TokenKind) -> Result<TypeId, ParseError> {
    self.expect(kw, ParseProduction::Type)?;
    self.expect(TokenKind::LParen, ParseProduction::Type)?;
    let ty = self.parse_type()?;
    self.expect(TokenKind::RParen, ParseProduction::Type)?;
    Ok(ty)
  }

  pub fn parse_size_of(&mut self) -> Result<TypeId, ParseError> {
    self.parse_size_of_or_align_of(TokenKind::Sizeof)
  }

  pub fn parse_align_of(&mut self) -> Result<TypeId, ParseError> {
    self.parse_size_of_or_align_of(TokenKind::Alignof)
  }

  /// REDESIGN: the original's equivalent check duplicated `OP_GET` in
  /// place of `OP_LET`, so a `<=` repeat expression (`(int; n <= 2)`)
  /// fell through into being treated as a valid recursive binary repeat
  /// instead of being rejected like the other comparison/logical ops.
  /// Repeat expressions are constant arithmetic, so comparisons and
  /// logical connectives never belong here.
  pub fn parse_repeat(&mut self) -> Result<Repeat, ParseError> {
    let start = self.start();
    let t = self.peek();
    let kind = match t.kind {
      TokenKind::Int => {
        let (_, span) = self.bump();
        RepeatKind::Int(span)
      }
      TokenKind::Dollar => RepeatKind::Macro(self.parse_macro_inv()?),
      TokenKind::Sizeof => RepeatKind::SizeOf(self.parse_size_of()?),
      TokenKind::Alignof => RepeatKind::AlignOf(self.parse_align_of()?),
      _ => return Err(self.err_here(ParseProduction::Repeat)),
    };

    let lhs_span = self.span_from(start);
    let save = self.pos;
    let op = match self.parse_bin_op() {
      Ok(op) => op,
      Err(_) => {
        self.pos = save;
        return Ok(Repeat { span: lhs_span, kind });
      }
    };

    if matches!(
      op,
      BinOp::And | BinOp::Or | BinOp::Eq | BinOp::Ne | BinOp::Gt | BinOp::Ge | BinOp::Lt | BinOp::Le
    ) {
      self.pos = save;
      return Ok(Repeat { span: lhs_span, kind });
    }

    let lhs = self.ast.repeats.push(Repeat { span: lhs_span, kind });
    let rhs = self.parse_repeat()?;
    let rhs_id = crate::ast::RepeatId(self.ast.repeats.push(rhs));
    let span = self.span_from(start);
    Ok(Repeat { span, kind: RepeatKind::BinOp(op, crate::ast::RepeatId(lhs), rhs_id) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::span::SourceMap;

  fn parse_repeat(map: &mut SourceMap, src: &str) -> Repeat {
    let file = map.add("test.oo".into(), src.as_bytes().to_vec());
    let mut p = Parser::new(map.source(file), file);
    p.parse_repeat().expect("parses")
  }

  #[test]
  fn comparison_operator_does_not_continue_a_repeat() {
    // REDESIGN regression: `2 <= 3` must parse as the bare repeat `2`,
    // leaving `<= 3` unconsumed, not as a recursive binary repeat - the
    // original mistakenly duplicated `OP_GET` in place of `OP_LET` here.
    let mut map = SourceMap::new();
    let repeat = parse_repeat(&mut map, "2 <= 3");
    assert!(matches!(repeat.kind, RepeatKind::Int(_)));
    assert_eq!(map.text(repeat.span), "2");
  }

  #[test]
  fn arithmetic_operator_builds_a_binary_repeat() {
    let mut map = SourceMap::new();
    let repeat = parse_repeat(&mut map, "1 + 2");
    assert!(matches!(repeat.kind, RepeatKind::BinOp(BinOp::Add, ..)));
  }

  #[test]
  fn type_application_span_excludes_leading_whitespace() {
    let mut map = SourceMap::new();
    let file = map.add("app.oo".into(), b"\t List<a>".to_vec());
    let mut p = Parser::new(map.source(file), file);
    let ty = p.parse_type().expect("parses");
    assert_eq!(map.text(p.ast.ty(ty).span), "List<a>");
  }
}
