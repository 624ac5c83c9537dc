use crate::ast::{Block, BlockStmt, Meta, MetaKind};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
  pub fn parse_meta(&mut self) -> Result<Meta, ParseError> {
    let start = self.start();
    let name = self.expect(TokenKind::Id, ParseProduction::Meta)?;

    let kind = match self.peek().kind {
      TokenKind::Eq => {
        self.bump();
        MetaKind::Unary(self.parse_literal()?)
      }
      TokenKind::LParen => {
        self.bump();
        let mut nested = vec![self.parse_meta()?];
        while self.peek().kind == TokenKind::Comma {
          self.bump();
          nested.push(self.parse_meta()?);
        }
        self.expect(TokenKind::RParen, ParseProduction::Meta)?;
        MetaKind::Nested(nested)
      }
      _ => MetaKind::Nullary,
    };

    let span = self.span_from(start);
    Ok(Meta { span, name, kind })
  }

  fn parse_attr(&mut self) -> Result<Meta, ParseError> {
    self.expect(TokenKind::BeginAttribute, ParseProduction::Meta)?;
    let meta = self.parse_meta()?;
    self.expect(TokenKind::RBracket, ParseProduction::Meta)?;
    Ok(meta)
  }

  pub fn parse_attrs(&mut self) -> Result<Vec<Meta>, ParseError> {
    let mut attrs = Vec::new();
    while self.peek().kind == TokenKind::BeginAttribute {
      attrs.push(self.parse_attr()?);
    }
    Ok(attrs)
  }

  /// A `{ }`-delimited sequence of `;`-separated statements. There is
  /// no trailing-semicolon form: `{ a; }` requires a statement after
  /// the last `;`, matching the original grammar (a semicolon always
  /// introduces another attrs+expr pair, it never just terminates one).
  pub fn parse_block(&mut self) -> Result<Block, ParseError> {
    self.expect(TokenKind::LBrace, ParseProduction::Block)?;

    if self.peek().kind == TokenKind::RBrace {
      self.bump();
      return Ok(Block::default());
    }

    let mut stmts = Vec::new();
    loop {
      let attrs = self.parse_attrs()?;
      let expr = self.parse_expr()?;
      stmts.push(BlockStmt { attrs, expr });

      if self.peek().kind == TokenKind::Semi {
        self.bump();
        continue;
      }
      break;
    }

    self.expect(TokenKind::RBrace, ParseProduction::Block)?;
    Ok(Block { stmts })
  }
}
