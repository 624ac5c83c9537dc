use crate::ast::{Item, ItemKind, Type, TypeId, TypeKind, UseTree, UseTreeKind};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::TokenKind;
use crate::span::Span;

use super::Parser;

impl<'a> Parser<'a> {
  /// A `use` path segment: a leaf (`a`), a rename (`a as b`), or a branch
  /// (`a::b`, or `a::{b, c}`).
  pub fn parse_use_tree(&mut self) -> Result<UseTree, ParseError> {
    let start = self.start();
    let sid = self.parse_sid_or_use_kw()?;

    if self.peek().kind == TokenKind::As {
      self.bump();
      let rename = self.parse_sid()?;
      let span = self.span_from(start);
      return Ok(UseTree { span, sid, kind: UseTreeKind::Rename(rename) });
    }

    if self.peek().kind != TokenKind::Scope {
      let span = self.span_from(start);
      return Ok(UseTree { span, sid, kind: UseTreeKind::Leaf });
    }
    self.bump();

    if self.peek().kind == TokenKind::LBrace {
      self.bump();
      let mut inners = vec![self.parse_use_tree()?];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        inners.push(self.parse_use_tree()?);
      }
      self.expect(TokenKind::RBrace, ParseProduction::UseTree)?;
      let span = self.span_from(start);
      return Ok(UseTree { span, sid, kind: UseTreeKind::Branch(inners) });
    }

    let inner = self.parse_use_tree()?;
    let span = self.span_from(start);
    Ok(UseTree { span, sid, kind: UseTreeKind::Branch(vec![inner]) })
  }

  pub fn parse_item(&mut self) -> Result<Item, ParseError> {
    let start = self.start();
    let is_pub = if self.peek().kind == TokenKind::Pub {
      self.bump();
      true
    } else {
      false
    };

    let t = self.peek();

    let kind = match t.kind {
      TokenKind::Use => {
        self.bump();
        let tree = self.parse_use_tree()?;
        ItemKind::Use(tree)
      }
      TokenKind::Type => {
        self.bump();
        let sid = self.parse_sid()?;
        self.expect(TokenKind::Eq, ParseProduction::Item)?;
        let ty = self.parse_type()?;
        ItemKind::Type { sid, ty }
      }
      TokenKind::Val => {
        self.bump();
        let is_mut = if self.peek().kind == TokenKind::Mut {
          self.bump();
          true
        } else {
          false
        };
        let sid = self.parse_sid()?;
        self.expect(TokenKind::Eq, ParseProduction::Item)?;
        let expr = self.parse_expr()?;
        ItemKind::Val { is_mut, sid, expr }
      }
      TokenKind::Fn => self.parse_fn_item()?,
      TokenKind::Ffi => self.parse_ffi_item()?,
      _ => return Err(self.err_here(ParseProduction::Item)),
    };

    let span = self.span_from(start);
    Ok(Item { span, is_pub, attrs: Vec::new(), kind })
  }

  fn parse_fn_item(&mut self) -> Result<ItemKind, ParseError> {
    self.bump(); // Fn
    let sid = self.parse_sid()?;
    self.expect(TokenKind::Eq, ParseProduction::Item)?;

    let type_args = if self.peek().kind == TokenKind::LAngle {
      self.bump();
      let mut args = vec![self.parse_sid()?];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        args.push(self.parse_sid()?);
      }
      self.expect(TokenKind::RAngle, ParseProduction::Item)?;
      self.expect(TokenKind::FatArrow, ParseProduction::Item)?;
      args
    } else {
      Vec::new()
    };

    self.expect(TokenKind::LParen, ParseProduction::Item)?;
    let args = if self.peek().kind == TokenKind::RParen {
      self.bump();
      Vec::new()
    } else {
      let mut sid0 = self.parse_sid()?;
      self.expect(TokenKind::Colon, ParseProduction::Item)?;
      let mut args = vec![(sid0, self.parse_type()?)];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        sid0 = self.parse_sid()?;
        self.expect(TokenKind::Colon, ParseProduction::Item)?;
        args.push((sid0, self.parse_type()?));
      }
      self.expect(TokenKind::RParen, ParseProduction::Item)?;
      args
    };

    let ret = if self.peek().kind == TokenKind::Arrow {
      self.bump();
      self.parse_type()?
    } else {
      // No return type annotation means the empty anonymous product `()`.
      let empty_span = self.span_from(self.pos);
      TypeId(self.ast.types.push(Type { span: empty_span, kind: TypeKind::ProductAnon(Vec::new()) }))
    };

    let body = self.parse_block()?;
    Ok(ItemKind::Fun { sid, type_args, args, ret, body })
  }

  fn parse_ffi_item(&mut self) -> Result<ItemKind, ParseError> {
    self.bump(); // Ffi

    if self.peek().kind == TokenKind::Use {
      self.bump();
      self.expect(TokenKind::LParen, ParseProduction::Item)?;

      let include_start = self.pos;
      loop {
        let t = self.peek();
        if t.kind == TokenKind::End || t.kind.is_error() {
          return Err(self.err_here(ParseProduction::Item));
        }
        if t.kind == TokenKind::RParen {
          break;
        }
        self.bump();
      }
      let include = Span::new(self.file, include_start, self.pos - include_start);
      self.bump(); // RParen
      return Ok(ItemKind::FfiInclude { include });
    }

    let is_mut = if self.peek().kind == TokenKind::Mut {
      self.bump();
      true
    } else {
      false
    };
    let sid = self.parse_sid()?;
    self.expect(TokenKind::Colon, ParseProduction::Item)?;
    let ty = self.parse_type()?;
    Ok(ItemKind::FfiVal { is_mut, sid, ty })
  }
}
