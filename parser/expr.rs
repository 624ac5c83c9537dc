use crate::ast::{AssignOp, BinOp, Expr, ExprId, ExprKind};
use crate::error::{ParseError, ParseProduction};
use crate::lexer::{tokenize, TokenKind};
use crate::span::Span;

use super::Parser;

/// What the next one-to-three tokens resolve to, without consuming
/// anything - callers decide whether to commit based on precedence.
enum NextOp {
  Bin(BinOp, u8, u32),
  Assign(AssignOp, u32),
  None,
}

// Precedence table per the conventional C family ordering adopted for
// the redesigned climber: unary > `* / %` > `+ -` > shifts > `&` > `^`
// > `|` > comparisons > `&&` > `||` (tightest to loosest).
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_CMP: u8 = 3;
const PREC_BIT_OR: u8 = 4;
const PREC_BIT_XOR: u8 = 5;
const PREC_BIT_AND: u8 = 6;
const PREC_SHIFT: u8 = 7;
const PREC_ADD: u8 = 8;
const PREC_MUL: u8 = 9;

impl<'a> Parser<'a> {
  fn push_expr(&mut self, span: Span, kind: ExprKind) -> ExprId {
    ExprId(self.ast.exprs.push(Expr { span, kind }))
  }

  /// Classifies the next tokens as a binary or assignment operator
  /// without moving the cursor. `<<`/`>>` need three-token lookahead to
  /// tell `<<`/`>>` (binary) apart from `<<=`/`>>=` (assignment).
  fn classify_op(&self) -> NextOp {
    let src = &self.src[self.pos as usize..];
    let t1 = tokenize(src);
    use BinOp::*;
    match t1.kind {
      TokenKind::Plus => NextOp::Bin(Add, PREC_ADD, t1.len),
      TokenKind::Minus => NextOp::Bin(Sub, PREC_ADD, t1.len),
      TokenKind::Times => NextOp::Bin(Mul, PREC_MUL, t1.len),
      TokenKind::Div => NextOp::Bin(Div, PREC_MUL, t1.len),
      TokenKind::Mod => NextOp::Bin(Mod, PREC_MUL, t1.len),
      TokenKind::Pipe => NextOp::Bin(BitOr, PREC_BIT_OR, t1.len),
      TokenKind::Ampersand => NextOp::Bin(BitAnd, PREC_BIT_AND, t1.len),
      TokenKind::Xor => NextOp::Bin(BitXor, PREC_BIT_XOR, t1.len),
      TokenKind::Land => NextOp::Bin(And, PREC_AND, t1.len),
      TokenKind::Lor => NextOp::Bin(Or, PREC_OR, t1.len),
      TokenKind::Equals => NextOp::Bin(Eq, PREC_CMP, t1.len),
      TokenKind::NotEquals => NextOp::Bin(Ne, PREC_CMP, t1.len),
      TokenKind::Eq => NextOp::Assign(AssignOp::Assign, t1.len),
      TokenKind::PlusAssign => NextOp::Assign(AssignOp::AddAssign, t1.len),
      TokenKind::MinusAssign => NextOp::Assign(AssignOp::SubAssign, t1.len),
      TokenKind::TimesAssign => NextOp::Assign(AssignOp::MulAssign, t1.len),
      TokenKind::DivAssign => NextOp::Assign(AssignOp::DivAssign, t1.len),
      TokenKind::ModAssign => NextOp::Assign(AssignOp::ModAssign, t1.len),
      TokenKind::XorAssign => NextOp::Assign(AssignOp::BitXorAssign, t1.len),
      TokenKind::AndAssign => NextOp::Assign(AssignOp::BitAndAssign, t1.len),
      TokenKind::OrAssign => NextOp::Assign(AssignOp::BitOrAssign, t1.len),
      TokenKind::LAngle => {
        let t2 = tokenize(&src[t1.len as usize..]);
        match t2.kind {
          TokenKind::LAngle => {
            let t3 = tokenize(&src[(t1.len + t2.len) as usize..]);
            if t3.kind == TokenKind::Eq {
              NextOp::Assign(AssignOp::ShlAssign, t1.len + t2.len + t3.len)
            } else {
              NextOp::Bin(Shl, PREC_SHIFT, t1.len + t2.len)
            }
          }
          TokenKind::Eq => NextOp::Bin(Le, PREC_CMP, t1.len + t2.len),
          _ => NextOp::Bin(Lt, PREC_CMP, t1.len),
        }
      }
      TokenKind::RAngle => {
        let t2 = tokenize(&src[t1.len as usize..]);
        match t2.kind {
          TokenKind::RAngle => {
            let t3 = tokenize(&src[(t1.len + t2.len) as usize..]);
            if t3.kind == TokenKind::Eq {
              NextOp::Assign(AssignOp::ShrAssign, t1.len + t2.len + t3.len)
            } else {
              NextOp::Bin(Shr, PREC_SHIFT, t1.len + t2.len)
            }
          }
          TokenKind::Eq => NextOp::Bin(Ge, PREC_CMP, t1.len + t2.len),
          _ => NextOp::Bin(Gt, PREC_CMP, t1.len),
        }
      }
      _ => NextOp::None,
    }
  }

  /// Top-level expression entry point: a precedence-climbed binary
  /// expression, optionally followed by a right-associative assignment.
  pub fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
    let start = self.start();
    let lhs = self.parse_bin_expr(1)?;
    if let NextOp::Assign(op, len) = self.classify_op() {
      self.pos += len;
      let rhs = self.parse_expr()?;
      let span = self.span_from(start);
      return Ok(self.push_expr(span, ExprKind::Assign(op, lhs, rhs)));
    }
    Ok(lhs)
  }

  fn parse_bin_expr(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
    let start = self.start();
    let mut lhs = self.parse_postfix()?;
    loop {
      match self.classify_op() {
        NextOp::Bin(op, prec, len) if prec >= min_prec => {
          self.pos += len;
          let rhs = self.parse_bin_expr(prec + 1)?;
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::BinOp(op, lhs, rhs));
        }
        _ => break,
      }
    }
    Ok(lhs)
  }

  fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
    let start = self.start();
    let mut lhs = self.parse_primary()?;
    loop {
      match self.peek().kind {
        TokenKind::At => {
          self.bump();
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::Deref(lhs));
        }
        TokenKind::Tilde => {
          self.bump();
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::DerefMut(lhs));
        }
        TokenKind::LBracket => {
          self.bump();
          let index = self.parse_expr()?;
          self.expect(TokenKind::RBracket, ParseProduction::Expr)?;
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::ArrayIndex(lhs, index));
        }
        TokenKind::Dot => {
          self.bump();
          match self.peek().kind {
            TokenKind::Int => {
              let (_, num_span) = self.bump();
              let text = std::str::from_utf8(&self.src[num_span.range()]).unwrap();
              let field: u64 = text.parse().map_err(|_| {
                ParseError::new(ParseProduction::Expr, TokenKind::Int, num_span)
              })?;
              let span = self.span_from(start);
              lhs = self.push_expr(span, ExprKind::ProductAccessAnon(lhs, field));
            }
            TokenKind::Id => {
              let field = self.parse_sid()?;
              let span = self.span_from(start);
              lhs = self.push_expr(span, ExprKind::ProductAccessNamed(lhs, field));
            }
            _ => return Err(self.err_here(ParseProduction::Expr)),
          }
        }
        TokenKind::LParen => {
          self.bump();
          if self.peek().kind == TokenKind::RParen {
            self.bump();
            let span = self.span_from(start);
            lhs = self.push_expr(span, ExprKind::FunAppAnon(lhs, Vec::new()));
            continue;
          }

          let t = self.peek();
          if t.kind == TokenKind::Id && self.peek2(t).kind == TokenKind::Eq {
            let mut sids = vec![self.parse_sid()?];
            self.expect(TokenKind::Eq, ParseProduction::Expr)?;
            let mut args = vec![self.parse_expr()?];
            while self.peek().kind == TokenKind::Comma {
              self.bump();
              sids.push(self.parse_sid()?);
              self.expect(TokenKind::Eq, ParseProduction::Expr)?;
              args.push(self.parse_expr()?);
            }
            self.expect(TokenKind::RParen, ParseProduction::Expr)?;
            let span = self.span_from(start);
            lhs = self.push_expr(span, ExprKind::FunAppNamed(lhs, sids.into_iter().zip(args).collect()));
            continue;
          }

          let mut args = vec![self.parse_expr()?];
          while self.peek().kind == TokenKind::Comma {
            self.bump();
            args.push(self.parse_expr()?);
          }
          self.expect(TokenKind::RParen, ParseProduction::Expr)?;
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::FunAppAnon(lhs, args));
        }
        TokenKind::As => {
          self.bump();
          let ty = self.parse_type()?;
          let span = self.span_from(start);
          lhs = self.push_expr(span, ExprKind::Cast(lhs, ty));
        }
        _ => break,
      }
    }
    Ok(lhs)
  }

  fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
    let start = self.start();
    let t = self.peek();

    match t.kind {
      TokenKind::Id | TokenKind::KwMod | TokenKind::Dep | TokenKind::Magic => {
        let id = self.parse_id()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Id(id)))
      }
      TokenKind::Dollar => {
        let m = self.parse_macro_inv()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Macro(m)))
      }
      TokenKind::Int | TokenKind::Float | TokenKind::String => {
        let lit = self.parse_literal()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Literal(lit)))
      }
      TokenKind::At => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Ref(inner)))
      }
      TokenKind::Tilde => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::RefMut(inner)))
      }
      TokenKind::Not => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Not(inner)))
      }
      TokenKind::Minus => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Negate(inner)))
      }
      TokenKind::LBrace => {
        let block = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Block(block)))
      }
      TokenKind::LBracket => {
        self.bump();
        let inner = self.parse_expr()?;
        self.expect(TokenKind::RBracket, ParseProduction::Expr)?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Array(inner)))
      }
      TokenKind::LParen => self.parse_expr_paren(start),
      TokenKind::Sizeof => {
        let ty = self.parse_size_of()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::SizeOf(ty)))
      }
      TokenKind::Alignof => {
        let ty = self.parse_align_of()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::AlignOf(ty)))
      }
      TokenKind::Val => {
        self.bump();
        let pat = self.parse_pattern()?;
        let pattern = self.ast.pattern(pat).clone();
        if self.peek().kind == TokenKind::Eq {
          self.bump();
          let rhs = self.parse_expr()?;
          let span = self.span_from(start);
          Ok(self.push_expr(span, ExprKind::ValAssign(pattern, rhs)))
        } else {
          let span = self.span_from(start);
          Ok(self.push_expr(span, ExprKind::Val(pattern)))
        }
      }
      TokenKind::If => self.parse_if(start),
      TokenKind::While => {
        self.bump();
        let cond = self.parse_expr()?;
        let block = self.parse_block()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::While { cond, block }))
      }
      TokenKind::Case => {
        self.bump();
        let matcher = self.parse_expr()?;
        let arms = self.parse_match_arms()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Case { matcher, arms }))
      }
      TokenKind::Loop => {
        self.bump();
        let matcher = self.parse_expr()?;
        let arms = self.parse_match_arms()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Loop { matcher, arms }))
      }
      TokenKind::Return => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Return(inner)))
      }
      TokenKind::Break => {
        self.bump();
        let inner = self.parse_expr()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Break(inner)))
      }
      TokenKind::Goto => {
        self.bump();
        let sid = self.parse_sid()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Goto(sid)))
      }
      TokenKind::Label => {
        self.bump();
        let sid = self.parse_sid()?;
        let span = self.span_from(start);
        Ok(self.push_expr(span, ExprKind::Label(sid)))
      }
      _ => Err(self.err_here(ParseProduction::Expr)),
    }
  }

  fn parse_if(&mut self, start: u32) -> Result<ExprId, ParseError> {
    self.bump(); // If
    let cond = self.parse_expr()?;
    let if_block = self.parse_block()?;

    let else_block = if self.peek().kind == TokenKind::Else {
      self.bump();
      if self.peek().kind == TokenKind::If {
        // `else if` desugars to a one-statement block, as in the
        // original grammar.
        let else_start = self.pos;
        let expr = self.parse_expr()?;
        let _ = else_start;
        crate::ast::Block { stmts: vec![crate::ast::BlockStmt { attrs: Vec::new(), expr }] }
      } else {
        self.parse_block()?
      }
    } else {
      crate::ast::Block::default()
    };

    let span = self.span_from(start);
    Ok(self.push_expr(span, ExprKind::If { cond, if_block, else_block }))
  }

  fn parse_match_arms(&mut self) -> Result<Vec<(crate::ast::Pattern, crate::ast::Block)>, ParseError> {
    self.expect(TokenKind::LBrace, ParseProduction::Expr)?;
    let mut arms = Vec::new();
    while self.peek().kind != TokenKind::RBrace {
      let pat_id = self.parse_pattern()?;
      let pattern = self.ast.pattern(pat_id).clone();
      let block = self.parse_block()?;
      arms.push((pattern, block));
    }
    self.bump(); // RBrace
    Ok(arms)
  }

  fn parse_expr_paren(&mut self, start: u32) -> Result<ExprId, ParseError> {
    self.bump(); // LParen

    if self.peek().kind == TokenKind::RParen {
      self.bump();
      let span = self.span_from(start);
      return Ok(self.push_expr(span, ExprKind::ProductAnon(Vec::new())));
    }

    let t = self.peek();
    if t.kind == TokenKind::Id && self.peek2(t).kind == TokenKind::Eq {
      let mut sids = vec![self.parse_sid()?];
      self.expect(TokenKind::Eq, ParseProduction::Expr)?;
      let mut inners = vec![self.parse_expr()?];
      while self.peek().kind == TokenKind::Comma {
        self.bump();
        sids.push(self.parse_sid()?);
        self.expect(TokenKind::Eq, ParseProduction::Expr)?;
        inners.push(self.parse_expr()?);
      }
      self.expect(TokenKind::RParen, ParseProduction::Expr)?;
      let span = self.span_from(start);
      return Ok(self.push_expr(span, ExprKind::ProductNamed(sids.into_iter().zip(inners).collect())));
    }

    let mut inners = vec![self.parse_expr()?];
    if self.peek().kind == TokenKind::Semi {
      self.bump();
      let repeat = self.parse_repeat()?;
      self.expect(TokenKind::RParen, ParseProduction::Expr)?;
      let inner = inners.remove(0);
      let span = self.span_from(start);
      return Ok(self.push_expr(span, ExprKind::ProductRepeated(inner, repeat)));
    }

    while self.peek().kind == TokenKind::Comma {
      self.bump();
      inners.push(self.parse_expr()?);
    }
    self.expect(TokenKind::RParen, ParseProduction::Expr)?;
    let span = self.span_from(start);
    Ok(self.push_expr(span, ExprKind::ProductAnon(inners)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::span::SourceMap;

  fn parse_expr(map: &mut SourceMap, src: &str) -> (crate::ast::File, ExprId) {
    let file = map.add("test.oo".into(), src.as_bytes().to_vec());
    let mut p = Parser::new(map.source(file), file);
    let id = p.parse_expr().expect("parses");
    (p.ast, id)
  }

  #[test]
  fn slash_maps_to_div_not_mul() {
    let mut map = SourceMap::new();
    let (ast, id) = parse_expr(&mut map, "a / b");
    match &ast.expr(id).kind {
      ExprKind::BinOp(BinOp::Div, ..) => {}
      other => panic!("expected BinOp::Div, got {other:?}"),
    }
  }

  #[test]
  fn slash_assign_maps_to_div_assign_not_mul_assign() {
    let mut map = SourceMap::new();
    let (ast, id) = parse_expr(&mut map, "a /= b");
    match &ast.expr(id).kind {
      ExprKind::Assign(AssignOp::DivAssign, ..) => {}
      other => panic!("expected AssignOp::DivAssign, got {other:?}"),
    }
  }

  #[test]
  fn binary_expression_is_left_associative() {
    // `a - b - c` must parse as `(a - b) - c`, not `a - (b - c)`.
    let mut map = SourceMap::new();
    let (ast, id) = parse_expr(&mut map, "a - b - c");
    match &ast.expr(id).kind {
      ExprKind::BinOp(BinOp::Sub, lhs, _) => match &ast.expr(*lhs).kind {
        ExprKind::BinOp(BinOp::Sub, ..) => {}
        other => panic!("expected the outer op's lhs to itself be a subtraction, got {other:?}"),
      },
      other => panic!("expected a top-level BinOp::Sub, got {other:?}"),
    }
  }

  #[test]
  fn expression_span_excludes_leading_whitespace_and_round_trips() {
    let mut map = SourceMap::new();
    let (ast, id) = parse_expr(&mut map, "\n\n  a + b");
    assert_eq!(map.text(ast.expr(id).span), "a + b");
  }
}
